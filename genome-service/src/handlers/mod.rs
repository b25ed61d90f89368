pub mod files;
pub mod genes;
pub mod health;
pub mod omics;
pub mod variants;

pub use files::{download_file, list_files};
pub use genes::{get_gene_info, get_gene_info_by_chr, search_chr_ids, search_gene_ids};
pub use health::{health_check, metrics_endpoint, readiness_check};
pub use omics::{
    chart_data, metabolomics_data, metabolomics_fields, transcriptome_data, transcriptome_fields,
};
pub use variants::{multi_variant, search_variants, variant_fields, variant_options};

use crate::models::Dataset;
use crate::services::shaping;
use crate::startup::AppState;
use axum::Json;
use service_core::error::AppError;

/// Column names offered by the front end's field pickers, read from one
/// sample record. The datasets are loaded before the service starts, so an
/// empty collection means the service points at the wrong database.
pub(crate) async fn sample_fields(
    state: &AppState,
    dataset: Dataset,
) -> Result<Json<Vec<String>>, AppError> {
    let record = state.db.sample_record(dataset).await?.ok_or_else(|| {
        tracing::error!(dataset = %dataset, "No sample record, collection is empty");
        AppError::ConfigError(anyhow::anyhow!("{} collection is empty", dataset))
    })?;

    Ok(Json(shaping::discover_fields(dataset, &record)))
}
