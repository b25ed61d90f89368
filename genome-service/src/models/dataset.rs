//! Record shapes the service reads from the genome database.
//!
//! Records themselves stay as `bson::Document`: the collections are
//! loaded from spreadsheets and carry a variable set of columns, so only
//! the identity fields below are known ahead of time.

use std::fmt;

/// The four collections served by this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    Genes,
    Expression,
    Variants,
    Metabolomics,
}

impl Dataset {
    /// Stable label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Dataset::Genes => "genes",
            Dataset::Expression => "expression",
            Dataset::Variants => "variants",
            Dataset::Metabolomics => "metabolomics",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub mod fields {
    /// Identity field assigned by the store; never returned to clients.
    pub const INTERNAL_ID: &str = "_id";

    pub const GENE_ID: &str = "GeneID";
    pub const CHR_ID: &str = "Chr ID";

    pub const EXPRESSION_GENE_ID: &str = "Gene ID";

    pub const VARIANT_ID: &str = "ID";
    pub const CHROM: &str = "#CHROM";
    pub const POS: &str = "POS";
    /// Prefix of per-sample genotype columns on variant records.
    pub const SAMPLE_PREFIX: &str = "M.";
    /// Derived field added to variant rows by the multi-sample query.
    pub const SAMPLE_COUNT: &str = "count";

    pub const COMPOUND_NAME: &str = "Compound_name";
    pub const METABOLOMICS_IDENTITY: [&str; 8] = [
        "ID",
        "Ion_mode",
        "Q1",
        "Q3",
        "RT",
        COMPOUND_NAME,
        "Class_I",
        "Class_II",
    ];
}
