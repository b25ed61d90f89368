pub mod files;
pub mod genes;
pub mod omics;
pub mod variants;

pub use files::FileEntry;
pub use genes::{ChrInfoParams, GeneInfoParams, SearchParams};
pub use omics::SelectionRequest;
pub use variants::{ChromRange, IntegerInput, MultiVariantRequest, VariantOptions, VariantSearchRequest};
