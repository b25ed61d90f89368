use serde::Deserialize;

/// `?query=` of the gene and chromosome suggestion endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeneInfoParams {
    #[serde(rename = "geneId")]
    pub gene_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChrInfoParams {
    pub chrid: Option<String>,
}

/// Treats a missing parameter and an empty one alike.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
