use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub url: String,
}

impl FileEntry {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let url = format!("/download/{}", name);
        Self { name, url }
    }
}
