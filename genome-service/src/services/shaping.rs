//! Post-processing of raw records before they are serialized.

use crate::dtos::{ChromRange, VariantOptions};
use crate::models::{fields, Dataset};
use crate::services::queries::chrom_key;
use mongodb::bson::{Bson, Document};
use std::collections::HashSet;

/// Replacement for numeric cells the spreadsheet import left as NaN.
pub const MISSING_VALUE: &str = "-";

/// Replace every NaN double in `record` with [`MISSING_VALUE`], descending
/// into nested documents and arrays.
pub fn replace_nan(record: &mut Document) {
    for (_, value) in record.iter_mut() {
        replace_nan_in(value);
    }
}

fn replace_nan_in(value: &mut Bson) {
    match value {
        Bson::Double(v) if v.is_nan() => *value = Bson::String(MISSING_VALUE.to_string()),
        Bson::Document(inner) => replace_nan(inner),
        Bson::Array(items) => items.iter_mut().for_each(replace_nan_in),
        _ => {}
    }
}

/// Which fields of a record a [`RecordProjector`] is allowed to drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldScope {
    All,
    Prefixed(&'static str),
}

impl FieldScope {
    fn contains(&self, key: &str) -> bool {
        match self {
            FieldScope::All => true,
            FieldScope::Prefixed(prefix) => key.starts_with(prefix),
        }
    }
}

/// Restricts a record to the fields a caller asked for.
///
/// The internal `_id` is always dropped. Out of scope and mandatory fields
/// are always kept. In-scope fields survive when requested, or when nothing
/// was requested and `empty_selects_all` is set. Field order of the source
/// record is preserved.
#[derive(Debug, Clone, Copy)]
pub struct RecordProjector {
    pub mandatory: &'static [&'static str],
    pub scope: FieldScope,
    pub empty_selects_all: bool,
}

pub const EXPRESSION_PROJECTOR: RecordProjector = RecordProjector {
    mandatory: &[fields::EXPRESSION_GENE_ID],
    scope: FieldScope::All,
    empty_selects_all: true,
};

pub const METABOLOMICS_PROJECTOR: RecordProjector = RecordProjector {
    mandatory: &fields::METABOLOMICS_IDENTITY,
    scope: FieldScope::All,
    empty_selects_all: false,
};

/// Only sample genotype columns are subject to selection; position and
/// annotation columns always pass.
pub const VARIANT_PROJECTOR: RecordProjector = RecordProjector {
    mandatory: &[],
    scope: FieldScope::Prefixed(fields::SAMPLE_PREFIX),
    empty_selects_all: false,
};

impl RecordProjector {
    pub fn project(&self, record: Document, requested: &HashSet<String>) -> Document {
        record
            .into_iter()
            .filter(|(key, _)| self.keeps(key, requested))
            .collect()
    }

    fn keeps(&self, key: &str, requested: &HashSet<String>) -> bool {
        if key == fields::INTERNAL_ID {
            return false;
        }
        !self.scope.contains(key)
            || self.mandatory.contains(&key)
            || requested.contains(key)
            || (self.empty_selects_all && requested.is_empty())
    }
}

/// `"<k>/<n>"` where `n` is the number of requested sample columns and `k`
/// how many of them carry a genotype string containing `1` on `record`.
pub fn sample_count(record: &Document, requested: &HashSet<String>) -> String {
    let carriers = requested
        .iter()
        .filter(|name| matches!(record.get(name.as_str()), Some(Bson::String(gt)) if gt.contains('1')))
        .count();
    format!("{}/{}", carriers, requested.len())
}

/// Shape one variant row for the multi-sample query: drop unrequested
/// sample columns, append the carrier count, sanitize.
pub fn shape_variant_row(record: Document, requested: &HashSet<String>) -> Document {
    let mut row = VARIANT_PROJECTOR.project(record, requested);
    let count = sample_count(&row, requested);
    row.insert(fields::SAMPLE_COUNT, count);
    replace_nan(&mut row);
    row
}

/// Sanitize and restrict `records` with `projector`.
pub fn shape_records(
    records: Vec<Document>,
    projector: &RecordProjector,
    requested: &HashSet<String>,
) -> Vec<Document> {
    records
        .into_iter()
        .map(|record| {
            let mut shaped = projector.project(record, requested);
            replace_nan(&mut shaped);
            shaped
        })
        .collect()
}

/// Values of `field` across `records`, first occurrence order, no repeats.
pub fn distinct_values(records: impl IntoIterator<Item = Document>, field: &str) -> Vec<Bson> {
    let mut values: Vec<Bson> = Vec::new();
    for mut record in records {
        if let Some(value) = record.remove(field) {
            if !values.contains(&value) {
                values.push(value);
            }
        }
    }
    values
}

/// Selectable measurement columns of `dataset`, read off a sample record.
pub fn discover_fields(dataset: Dataset, record: &Document) -> Vec<String> {
    record
        .keys()
        .filter(|key| is_selectable(dataset, key))
        .cloned()
        .collect()
}

fn is_selectable(dataset: Dataset, key: &str) -> bool {
    if key == fields::INTERNAL_ID {
        return false;
    }
    match dataset {
        Dataset::Variants => key.starts_with(fields::SAMPLE_PREFIX),
        Dataset::Expression => key != fields::EXPRESSION_GENE_ID,
        Dataset::Metabolomics => !fields::METABOLOMICS_IDENTITY.contains(&key),
        Dataset::Genes => true,
    }
}

/// Pair the distinct chromosome list with the grouped `POS` bounds.
/// Chromosomes without a bounds entry are listed but get no range.
pub fn assemble_variant_options(chroms: Vec<Bson>, bounds: Vec<Document>) -> VariantOptions {
    let mut ranges = Vec::with_capacity(chroms.len());
    for chrom in &chroms {
        let found = bounds.iter().find(|b| {
            b.get(fields::INTERNAL_ID)
                .map(|id| same_chrom(id, chrom))
                .unwrap_or(false)
        });
        if let Some(bound) = found {
            ranges.push((
                chrom_key(chrom),
                ChromRange {
                    min: bound.get("min").cloned().unwrap_or(Bson::Null),
                    max: bound.get("max").cloned().unwrap_or(Bson::Null),
                },
            ));
        }
    }
    VariantOptions { chroms, ranges }
}

/// Numbers compare by value, as the store does (`1 == 1.0`).
fn same_chrom(a: &Bson, b: &Bson) -> bool {
    match (numeric(a), numeric(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn numeric(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}
