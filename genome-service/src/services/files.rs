use async_trait::async_trait;
use service_core::error::AppError;
use std::path::{Path, PathBuf};
use tokio::fs;

/// An opened download together with what the response headers need.
pub struct StoredFile {
    pub name: String,
    pub size: u64,
    pub file: fs::File,
}

#[async_trait]
pub trait FileStore: Send + Sync {
    /// Names of all entries in the store, sorted.
    async fn list(&self) -> Result<Vec<String>, AppError>;
    async fn open(&self, name: &str) -> Result<StoredFile, AppError>;
}

/// Flat directory of downloadable files on local disk.
pub struct LocalFileStore {
    base_path: PathBuf,
}

impl LocalFileStore {
    pub async fn new(base_path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let base_path = base_path.into();
        if !base_path.exists() {
            tracing::warn!(path = %base_path.display(), "Download directory missing, creating it");
            fs::create_dir_all(&base_path).await?;
        }
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Map a client supplied name to a path inside the base directory.
    async fn resolve(&self, name: &str) -> Result<PathBuf, AppError> {
        if !is_plain_file_name(name) {
            tracing::warn!(name = %name, "Rejected download name");
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Invalid file name: {}",
                name
            )));
        }

        let base = fs::canonicalize(&self.base_path).await?;
        let candidate = match fs::canonicalize(base.join(name)).await {
            Ok(path) => path,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::NotFound(anyhow::anyhow!("File not found: {}", name)));
            }
            Err(e) => return Err(e.into()),
        };

        // Symlinks may still point elsewhere after canonicalization.
        if !candidate.starts_with(&base) {
            tracing::warn!(name = %name, "Download resolved outside of base directory");
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Invalid file name: {}",
                name
            )));
        }

        Ok(candidate)
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn list(&self) -> Result<Vec<String>, AppError> {
        let mut entries = fs::read_dir(&self.base_path).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    async fn open(&self, name: &str) -> Result<StoredFile, AppError> {
        let path = self.resolve(name).await?;
        let metadata = fs::metadata(&path).await?;
        if !metadata.is_file() {
            return Err(AppError::NotFound(anyhow::anyhow!("File not found: {}", name)));
        }
        let file = fs::File::open(&path).await?;
        Ok(StoredFile {
            name: name.to_string(),
            size: metadata.len(),
            file,
        })
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

/// Content type for a download, guessed from the extension.
pub fn content_type_for(name: &str) -> &'static str {
    let extension = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("txt") | Some("vcf") | Some("gff") | Some("gff3") | Some("gtf") | Some("fa")
        | Some("fasta") | Some("fna") | Some("faa") => "text/plain; charset=utf-8",
        Some("csv") => "text/csv",
        Some("tsv") => "text/tab-separated-values",
        Some("json") => "application/json",
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        Some("gz") => "application/gzip",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "application/octet-stream",
    }
}
