pub mod dataset;

pub use dataset::{fields, Dataset};
