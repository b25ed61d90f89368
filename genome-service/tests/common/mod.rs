#![allow(dead_code)]

use genome_service::config::{
    ChartConfig, CollectionConfig, FilesConfig, GenomeConfig, MongoConfig, DEFAULT_CHART_GENE_ID,
};
use genome_service::models::Dataset;
use genome_service::services::{LocalFileStore, MongoDb};
use genome_service::startup::{build_router, AppState, Application};
use mongodb::bson::Document;
use service_core::axum::Router;
use service_core::config::Config as CoreConfig;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

pub const MONGO_REQUIRED: &str = "Requires MongoDB (set TEST_MONGODB_URI, default localhost:27017)";

pub fn test_config() -> GenomeConfig {
    let files_dir = std::env::temp_dir().join(format!("genome-test-files-{}", Uuid::new_v4()));

    GenomeConfig {
        common: CoreConfig {
            port: 0, // Random port for testing
            log_level: "debug".to_string(),
        },
        mongodb: MongoConfig {
            uri: std::env::var("TEST_MONGODB_URI")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            database: format!("genome_test_{}", Uuid::new_v4().simple()),
            create_indexes: false,
        },
        collections: CollectionConfig::default(),
        files: FilesConfig {
            directory: files_dir.to_string_lossy().into_owned(),
        },
        chart: ChartConfig {
            gene_id: DEFAULT_CHART_GENE_ID.to_string(),
        },
        otlp_endpoint: None,
    }
}

/// Router over a lazily connected client, for requests that never reach
/// the database.
pub async fn test_router() -> (Router, PathBuf) {
    router_for(test_config()).await
}

pub async fn router_for(config: GenomeConfig) -> (Router, PathBuf) {
    let db = MongoDb::connect(
        &config.mongodb.uri,
        &config.mongodb.database,
        config.collections.clone(),
    )
    .await
    .expect("Failed to create MongoDB client");
    let files = LocalFileStore::new(&config.files.directory)
        .await
        .expect("Failed to create download directory");
    let files_dir = files.base_path().to_path_buf();

    let state = AppState {
        config,
        db,
        files: Arc::new(files),
    };
    (build_router(state), files_dir)
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub db: MongoDb,
    pub db_name: String,
    pub files_dir: PathBuf,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let config = test_config();
        let db_name = config.mongodb.database.clone();
        let files_dir = PathBuf::from(&config.files.directory);

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let db = app.db().clone();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_with_shutdown(std::future::pending()).await.ok();
        });

        // /metrics answers without touching the database
        let client = reqwest::Client::new();
        let metrics_url = format!("{}/metrics", address);
        for _ in 0..50 {
            if client.get(&metrics_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            db,
            db_name,
            files_dir,
        }
    }

    pub async fn seed(&self, dataset: Dataset, records: Vec<Document>) {
        self.db
            .collection(dataset)
            .insert_many(records, None)
            .await
            .expect("Failed to seed test data");
    }

    pub async fn cleanup(&self) {
        self.db.database().drop(None).await.ok();
        tokio::fs::remove_dir_all(&self.files_dir).await.ok();
    }
}
