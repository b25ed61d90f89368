use crate::config::GenomeConfig;
use crate::handlers;
use crate::services::{FileStore, LocalFileStore, MongoDb};
use axum::{
    http::{Method, Request},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics::metrics_middleware, tracing::request_id_middleware};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: GenomeConfig,
    pub db: MongoDb,
    pub files: Arc<dyn FileStore>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        // Genes
        .route("/search", get(handlers::search_gene_ids))
        .route("/search2", get(handlers::search_chr_ids))
        .route("/get-gene-info", get(handlers::get_gene_info))
        .route("/get-gene-info2", get(handlers::get_gene_info_by_chr))
        // Variants
        .route("/searchvarian", post(handlers::search_variants))
        .route("/getvarianoption", get(handlers::variant_options))
        .route("/getvairanFields", get(handlers::variant_fields))
        .route("/multivarian", post(handlers::multi_variant))
        // Transcriptome
        .route("/chartdata/:gene_id", get(handlers::chart_data))
        .route("/gettranscriptomefields", get(handlers::transcriptome_fields))
        .route("/transcriptome_data", post(handlers::transcriptome_data))
        // Metabolomics
        .route("/getmetabolomicsfields", get(handlers::metabolomics_fields))
        .route("/metabolomics_data", post(handlers::metabolomics_data))
        // Files
        .route("/get-files", get(handlers::list_files))
        .route("/download/:filename", get(handlers::download_file))
        .with_state(state)
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        // The front end is served from another origin.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers(Any),
        )
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    pub async fn build(config: GenomeConfig) -> Result<Self, AppError> {
        let db = MongoDb::connect(
            &config.mongodb.uri,
            &config.mongodb.database,
            config.collections.clone(),
        )
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            e
        })?;

        if config.mongodb.create_indexes {
            db.initialize_indexes().await.map_err(|e| {
                tracing::error!("Failed to initialize database indexes: {}", e);
                e
            })?;
        }

        let files: Arc<dyn FileStore> = Arc::new(
            LocalFileStore::new(&config.files.directory)
                .await
                .map_err(|e| {
                    tracing::error!(
                        "Failed to open download directory {}: {}",
                        config.files.directory,
                        e
                    );
                    e
                })?,
        );

        let state = AppState {
            config: config.clone(),
            db,
            files,
        };

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    pub fn db(&self) -> &MongoDb {
        &self.state.db
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.run_with_shutdown(shutdown_signal()).await
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn run_with_shutdown<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = build_router(self.state);
        axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown)
            .await
    }
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
