use crate::dtos::genes::non_empty;
use crate::dtos::{IntegerInput, MultiVariantRequest, VariantOptions, VariantSearchRequest};
use crate::models::{fields, Dataset};
use crate::services::{queries, shaping};
use crate::startup::AppState;
use axum::{extract::State, Json};
use mongodb::bson::Document;
use service_core::error::AppError;
use std::collections::HashSet;

/// Variants whose `ID` contains the search text.
#[tracing::instrument(skip(state))]
pub async fn search_variants(
    State(state): State<AppState>,
    Json(body): Json<VariantSearchRequest>,
) -> Result<Json<Vec<Document>>, AppError> {
    let Some(text) = non_empty(body.search_text) else {
        return Ok(Json(Vec::new()));
    };

    let mut records = state
        .db
        .find_records(
            Dataset::Variants,
            queries::contains_filter(fields::VARIANT_ID, &text),
        )
        .await?;
    records.iter_mut().for_each(shaping::replace_nan);

    tracing::debug!(matches = records.len(), "Variant ID search");
    Ok(Json(records))
}

/// Chromosome list and the `POS` range of each chromosome.
#[tracing::instrument(skip(state))]
pub async fn variant_options(
    State(state): State<AppState>,
) -> Result<Json<VariantOptions>, AppError> {
    let (chroms, bounds) = futures::try_join!(
        state.db.distinct_values(Dataset::Variants, fields::CHROM),
        state.db.chrom_bounds(),
    )?;

    Ok(Json(shaping::assemble_variant_options(chroms, bounds)))
}

#[tracing::instrument(skip(state))]
pub async fn variant_fields(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, AppError> {
    super::sample_fields(&state, Dataset::Variants).await
}

/// Variants in a chromosome window, restricted to the chosen samples, each
/// row carrying how many of those samples hold the alternate allele.
#[tracing::instrument(skip(state))]
pub async fn multi_variant(
    State(state): State<AppState>,
    Json(body): Json<MultiVariantRequest>,
) -> Result<Json<Vec<Document>>, AppError> {
    let (Some(chrom), Some(start), Some(end)) =
        (&body.selected_option, &body.varianstart, &body.varianend)
    else {
        return Ok(Json(Vec::new()));
    };

    let chrom = parse_integer("selectedOption", chrom)?;
    let start = parse_integer("varianstart", start)?;
    let end = parse_integer("varianend", end)?;
    let requested: HashSet<String> = body.right_items.into_iter().collect();

    let records = state
        .db
        .find_records(
            Dataset::Variants,
            queries::variant_range_filter(chrom, start, end),
        )
        .await?;

    let rows: Vec<Document> = records
        .into_iter()
        .map(|record| shaping::shape_variant_row(record, &requested))
        .collect();

    tracing::debug!(
        chrom = chrom,
        start = start,
        end = end,
        samples = requested.len(),
        rows = rows.len(),
        "Multi-sample variant query"
    );
    Ok(Json(rows))
}

fn parse_integer(name: &str, input: &IntegerInput) -> Result<i64, AppError> {
    input
        .to_i64()
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("{}: {}", name, e)))
}
