use serde::Deserialize;

/// Body of `/transcriptome_data` and `/metabolomics_data`: the record keys
/// to fetch and the measurement columns the caller wants back.
#[derive(Debug, Default, Deserialize)]
pub struct SelectionRequest {
    #[serde(default)]
    pub idlist: Vec<String>,
    #[serde(default)]
    pub rightitems: Vec<String>,
}
