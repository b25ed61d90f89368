//! HTTP backend serving gene annotations, variants, transcriptome and
//! metabolomics records from the genome database to the browser front end.
pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
