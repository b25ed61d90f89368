pub mod database;
pub mod files;
pub mod metrics;
pub mod queries;
pub mod shaping;

pub use database::MongoDb;
pub use files::{FileStore, LocalFileStore, StoredFile};
pub use self::metrics::{get_metrics, init_metrics};
