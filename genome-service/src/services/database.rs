use crate::config::CollectionConfig;
use crate::models::{fields, Dataset};
use crate::services::queries;
use futures::TryStreamExt;
use metrics::counter;
use mongodb::{
    bson::{doc, Bson, Document},
    options::IndexOptions,
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
    collections: CollectionConfig,
}

impl MongoDb {
    pub async fn connect(
        uri: &str,
        database: &str,
        collections: CollectionConfig,
    ) -> Result<Self, AppError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self {
            client,
            db,
            collections,
        })
    }

    /// Lookup indexes for the fields the endpoints filter on. Only run when
    /// enabled in configuration; the datasets are otherwise treated as
    /// read-only.
    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for genome-service");

        let specs: [(Dataset, Document, &str); 6] = [
            (Dataset::Genes, single_key(fields::GENE_ID), "gene_id_lookup"),
            (Dataset::Genes, single_key(fields::CHR_ID), "chr_id_lookup"),
            (
                Dataset::Expression,
                single_key(fields::EXPRESSION_GENE_ID),
                "expression_gene_lookup",
            ),
            (Dataset::Variants, single_key(fields::VARIANT_ID), "variant_id_lookup"),
            (Dataset::Variants, chrom_pos_key(), "chrom_pos_range"),
            (
                Dataset::Metabolomics,
                single_key(fields::COMPOUND_NAME),
                "compound_lookup",
            ),
        ];

        for (dataset, keys, name) in specs {
            let index = IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().name(name.to_string()).build())
                .build();

            self.collection(dataset)
                .create_index(index, None)
                .await
                .map_err(|e| {
                    tracing::error!(
                        "Failed to create {} index on {} collection: {}",
                        name,
                        dataset,
                        e
                    );
                    AppError::from(e)
                })?;
            tracing::info!(dataset = %dataset, index = %name, "Created index");
        }

        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    pub fn collection(&self, dataset: Dataset) -> Collection<Document> {
        let name = match dataset {
            Dataset::Genes => &self.collections.genes,
            Dataset::Expression => &self.collections.expression,
            Dataset::Variants => &self.collections.variants,
            Dataset::Metabolomics => &self.collections.metabolomics,
        };
        self.db.collection(name)
    }

    /// Up to [`queries::SUGGESTION_LIMIT`] records whose `field` contains
    /// `term`, projected down to that field.
    pub async fn suggest(
        &self,
        dataset: Dataset,
        field: &str,
        term: &str,
    ) -> Result<Vec<Document>, AppError> {
        self.find(
            dataset,
            queries::contains_filter(field, term),
            queries::suggestion_options(field),
        )
        .await
    }

    /// First record with `field == value`, without `_id`.
    pub async fn find_one_by(
        &self,
        dataset: Dataset,
        field: &str,
        value: &str,
    ) -> Result<Option<Document>, AppError> {
        record_query(dataset, "find_one");
        self.collection(dataset)
            .find_one(
                queries::exact_filter(field, value),
                queries::single_record_options(),
            )
            .await
            .map_err(|e| {
                tracing::error!(dataset = %dataset, field = %field, "find_one failed: {}", e);
                AppError::from(e)
            })
    }

    /// All records matching `filter`, without `_id`.
    pub async fn find_records(
        &self,
        dataset: Dataset,
        filter: Document,
    ) -> Result<Vec<Document>, AppError> {
        self.find(dataset, filter, queries::record_options()).await
    }

    /// Any single record of the collection, used to read its column names.
    pub async fn sample_record(&self, dataset: Dataset) -> Result<Option<Document>, AppError> {
        record_query(dataset, "sample");
        self.collection(dataset)
            .find_one(None, None)
            .await
            .map_err(AppError::from)
    }

    pub async fn distinct_values(
        &self,
        dataset: Dataset,
        field: &str,
    ) -> Result<Vec<Bson>, AppError> {
        record_query(dataset, "distinct");
        self.collection(dataset)
            .distinct(field, None, None)
            .await
            .map_err(|e| {
                tracing::error!(dataset = %dataset, field = %field, "distinct failed: {}", e);
                AppError::from(e)
            })
    }

    /// `{_id: <chrom>, min, max}` of `POS` for every chromosome.
    pub async fn chrom_bounds(&self) -> Result<Vec<Document>, AppError> {
        record_query(Dataset::Variants, "aggregate");
        let cursor = self
            .collection(Dataset::Variants)
            .aggregate(queries::chrom_bounds_pipeline(), None)
            .await
            .map_err(AppError::from)?;
        cursor.try_collect().await.map_err(AppError::from)
    }

    async fn find(
        &self,
        dataset: Dataset,
        filter: Document,
        options: mongodb::options::FindOptions,
    ) -> Result<Vec<Document>, AppError> {
        record_query(dataset, "find");
        let cursor = self
            .collection(dataset)
            .find(filter, options)
            .await
            .map_err(|e| {
                tracing::error!(dataset = %dataset, "find failed: {}", e);
                AppError::from(e)
            })?;
        cursor.try_collect().await.map_err(AppError::from)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

fn record_query(dataset: Dataset, operation: &'static str) {
    counter!(
        "store_queries_total",
        "dataset" => dataset.as_str(),
        "operation" => operation
    )
    .increment(1);
}

fn single_key(field: &str) -> Document {
    let mut keys = Document::new();
    keys.insert(field, 1);
    keys
}

fn chrom_pos_key() -> Document {
    let mut keys = Document::new();
    keys.insert(fields::CHROM, 1);
    keys.insert(fields::POS, 1);
    keys
}
