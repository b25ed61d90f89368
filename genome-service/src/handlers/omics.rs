use crate::dtos::SelectionRequest;
use crate::models::{fields, Dataset};
use crate::services::shaping::{self, RecordProjector, EXPRESSION_PROJECTOR, METABOLOMICS_PROJECTOR};
use crate::services::queries;
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use mongodb::bson::Document;
use service_core::error::AppError;
use std::collections::HashSet;

/// Expression profile for the chart view.
///
/// The path segment is not used yet: the chart always shows the gene set in
/// `CHART_GENE_ID`.
#[tracing::instrument(skip(state))]
pub async fn chart_data(
    State(state): State<AppState>,
    Path(requested_gene): Path<String>,
) -> Result<Json<Vec<Document>>, AppError> {
    let gene_id = &state.config.chart.gene_id;
    if requested_gene != *gene_id {
        tracing::debug!(
            requested = %requested_gene,
            served = %gene_id,
            "Chart request answered with configured gene"
        );
    }

    let mut records = state
        .db
        .find_records(
            Dataset::Expression,
            queries::exact_filter(fields::EXPRESSION_GENE_ID, gene_id),
        )
        .await?;
    records.iter_mut().for_each(shaping::replace_nan);

    Ok(Json(records))
}

#[tracing::instrument(skip(state))]
pub async fn transcriptome_fields(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, AppError> {
    super::sample_fields(&state, Dataset::Expression).await
}

/// Expression rows for the listed genes. An empty `rightitems` returns all
/// columns.
#[tracing::instrument(skip(state))]
pub async fn transcriptome_data(
    State(state): State<AppState>,
    Json(body): Json<SelectionRequest>,
) -> Result<Json<Vec<Document>>, AppError> {
    select(
        &state,
        Dataset::Expression,
        fields::EXPRESSION_GENE_ID,
        &EXPRESSION_PROJECTOR,
        body,
    )
    .await
}

#[tracing::instrument(skip(state))]
pub async fn metabolomics_fields(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, AppError> {
    super::sample_fields(&state, Dataset::Metabolomics).await
}

/// Metabolite rows for the listed compounds: identity columns plus the
/// requested measurements.
#[tracing::instrument(skip(state))]
pub async fn metabolomics_data(
    State(state): State<AppState>,
    Json(body): Json<SelectionRequest>,
) -> Result<Json<Vec<Document>>, AppError> {
    select(
        &state,
        Dataset::Metabolomics,
        fields::COMPOUND_NAME,
        &METABOLOMICS_PROJECTOR,
        body,
    )
    .await
}

async fn select(
    state: &AppState,
    dataset: Dataset,
    key_field: &str,
    projector: &RecordProjector,
    body: SelectionRequest,
) -> Result<Json<Vec<Document>>, AppError> {
    if body.idlist.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let requested: HashSet<String> = body.rightitems.into_iter().collect();
    let records = state
        .db
        .find_records(dataset, queries::membership_filter(key_field, &body.idlist))
        .await?;

    let rows = shaping::shape_records(records, projector, &requested);
    tracing::debug!(
        dataset = %dataset,
        keys = body.idlist.len(),
        rows = rows.len(),
        "Selection query"
    );
    Ok(Json(rows))
}
