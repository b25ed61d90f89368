use crate::dtos::genes::non_empty;
use crate::dtos::{ChrInfoParams, GeneInfoParams, SearchParams};
use crate::models::{fields, Dataset};
use crate::services::shaping;
use crate::startup::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use mongodb::bson::{Bson, Document};
use service_core::error::AppError;

/// Autocomplete over `GeneID`.
#[tracing::instrument(skip(state))]
pub async fn search_gene_ids(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Bson>>, AppError> {
    suggest(&state, fields::GENE_ID, params.query).await
}

/// Autocomplete over `Chr ID`.
#[tracing::instrument(skip(state))]
pub async fn search_chr_ids(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Bson>>, AppError> {
    suggest(&state, fields::CHR_ID, params.query).await
}

#[tracing::instrument(skip(state))]
pub async fn get_gene_info(
    State(state): State<AppState>,
    Query(params): Query<GeneInfoParams>,
) -> Result<Json<Document>, AppError> {
    lookup(&state, fields::GENE_ID, params.gene_id).await
}

#[tracing::instrument(skip(state))]
pub async fn get_gene_info_by_chr(
    State(state): State<AppState>,
    Query(params): Query<ChrInfoParams>,
) -> Result<Json<Document>, AppError> {
    lookup(&state, fields::CHR_ID, params.chrid).await
}

async fn suggest(
    state: &AppState,
    field: &str,
    term: Option<String>,
) -> Result<Json<Vec<Bson>>, AppError> {
    let Some(term) = non_empty(term) else {
        return Ok(Json(Vec::new()));
    };

    let records = state.db.suggest(Dataset::Genes, field, &term).await?;
    let values = shaping::distinct_values(records, field);

    tracing::debug!(field = %field, matches = values.len(), "Gene suggestions");
    Ok(Json(values))
}

async fn lookup(
    state: &AppState,
    field: &str,
    value: Option<String>,
) -> Result<Json<Document>, AppError> {
    let Some(value) = non_empty(value) else {
        return Ok(Json(Document::new()));
    };

    let record = match state.db.find_one_by(Dataset::Genes, field, &value).await? {
        Some(mut record) => {
            shaping::replace_nan(&mut record);
            record
        }
        None => {
            tracing::debug!(field = %field, value = %value, "Gene not found");
            Document::new()
        }
    };

    Ok(Json(record))
}
