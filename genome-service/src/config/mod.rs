use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Expression record key served by `/chartdata/{geneId}` regardless of the
/// path segment. Kept configurable until the front end passes real ids.
pub const DEFAULT_CHART_GENE_ID: &str = "MrScaffold_086G1";

#[derive(Debug, Clone, Deserialize)]
pub struct GenomeConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
    pub collections: CollectionConfig,
    pub files: FilesConfig,
    pub chart: ChartConfig,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    pub create_indexes: bool,
}

/// Collection names of the four datasets.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionConfig {
    pub genes: String,
    pub expression: String,
    pub variants: String,
    pub metabolomics: String,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            genes: "zju".to_string(),
            expression: "sample6_exp".to_string(),
            variants: "snp".to_string(),
            metabolomics: "meta".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    pub directory: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartConfig {
    pub gene_id: String,
}

impl GenomeConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;

        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";
        let defaults = CollectionConfig::default();

        Ok(GenomeConfig {
            common: common_config,
            mongodb: MongoConfig {
                uri: get_env("MONGODB_URI", Some("mongodb://localhost:27017"), is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("gene_data"), is_prod)?,
                create_indexes: parse_flag("MONGODB_CREATE_INDEXES")?,
            },
            collections: CollectionConfig {
                genes: get_env("GENE_COLLECTION", Some(&defaults.genes), false)?,
                expression: get_env("EXPRESSION_COLLECTION", Some(&defaults.expression), false)?,
                variants: get_env("VARIANT_COLLECTION", Some(&defaults.variants), false)?,
                metabolomics: get_env(
                    "METABOLOMICS_COLLECTION",
                    Some(&defaults.metabolomics),
                    false,
                )?,
            },
            files: FilesConfig {
                directory: get_env("FILES_DIRECTORY", Some("../files"), is_prod)?,
            },
            chart: ChartConfig {
                gene_id: get_env("CHART_GENE_ID", Some(DEFAULT_CHART_GENE_ID), false)?,
            },
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
        })
    }
}

fn parse_flag(key: &str) -> Result<bool, AppError> {
    match env::var(key) {
        Ok(val) => val.trim().parse().map_err(|_| {
            AppError::ConfigError(anyhow::anyhow!(
                "{} must be 'true' or 'false', got '{}'",
                key,
                val
            ))
        }),
        Err(_) => Ok(false),
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
