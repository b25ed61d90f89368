//! Translation of request parameters into store filters, projections and
//! pipelines. Nothing here talks to the database, so every builder is
//! checked directly in the tests below.

use crate::models::fields;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::{FindOneOptions, FindOptions};

/// Upper bound on suggestions returned by the autocomplete searches.
pub const SUGGESTION_LIMIT: i64 = 5;

/// Projection hiding the store's identity field.
pub fn without_internal_id() -> Document {
    let mut projection = Document::new();
    projection.insert(fields::INTERNAL_ID, 0);
    projection
}

/// Case-sensitive "contains" match on `field`. The term is escaped, so
/// regex metacharacters in user input match literally.
pub fn contains_filter(field: &str, term: &str) -> Document {
    let mut filter = Document::new();
    filter.insert(field, doc! { "$regex": regex::escape(term) });
    filter
}

pub fn exact_filter(field: &str, value: &str) -> Document {
    let mut filter = Document::new();
    filter.insert(field, value);
    filter
}

/// `field ∈ keys`.
pub fn membership_filter(field: &str, keys: &[String]) -> Document {
    let mut filter = Document::new();
    filter.insert(field, doc! { "$in": keys });
    filter
}

/// Variants on chromosome `chrom` with `start <= POS <= end`. A reversed
/// range is passed through unchanged and simply matches nothing.
pub fn variant_range_filter(chrom: i64, start: i64, end: i64) -> Document {
    let mut filter = Document::new();
    filter.insert(fields::CHROM, chrom);
    filter.insert(fields::POS, doc! { "$gte": start, "$lte": end });
    filter
}

/// Options for a suggestion lookup: only `field` comes back, capped at
/// [`SUGGESTION_LIMIT`] records.
pub fn suggestion_options(field: &str) -> FindOptions {
    let mut projection = without_internal_id();
    projection.insert(field, 1);

    FindOptions::builder()
        .projection(projection)
        .limit(SUGGESTION_LIMIT)
        .build()
}

pub fn record_options() -> FindOptions {
    FindOptions::builder()
        .projection(without_internal_id())
        .build()
}

pub fn single_record_options() -> FindOneOptions {
    FindOneOptions::builder()
        .projection(without_internal_id())
        .build()
}

/// One `$group` stage computing the `POS` bounds of every chromosome.
/// Output documents look like `{_id: <chrom>, min: <pos>, max: <pos>}`.
pub fn chrom_bounds_pipeline() -> Vec<Document> {
    let chrom_path = format!("${}", fields::CHROM);
    let pos_path = format!("${}", fields::POS);

    vec![doc! {
        "$group": {
            "_id": chrom_path,
            "min": { "$min": pos_path.clone() },
            "max": { "$max": pos_path },
        }
    }]
}

/// Text form of a chromosome value, as used for the keys of the variant
/// option map. Whole doubles keep their `.0` suffix.
pub fn chrom_key(value: &Bson) -> String {
    match value {
        Bson::String(s) => s.clone(),
        Bson::Int32(v) => v.to_string(),
        Bson::Int64(v) => v.to_string(),
        Bson::Double(v) if v.is_finite() && v.fract() == 0.0 => format!("{:.1}", v),
        Bson::Double(v) => v.to_string(),
        Bson::Null => "None".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_filter_escapes_metacharacters() {
        let filter = contains_filter(fields::GENE_ID, "Mr.*(G1");
        let regex = filter
            .get_document(fields::GENE_ID)
            .unwrap()
            .get_str("$regex")
            .unwrap();
        assert_eq!(regex, r"Mr\.\*\(G1");
    }

    #[test]
    fn contains_filter_keeps_plain_terms() {
        let filter = contains_filter(fields::CHR_ID, "Chr01");
        assert_eq!(filter, doc! { "Chr ID": { "$regex": "Chr01" } });
    }

    #[test]
    fn variant_range_filter_is_inclusive() {
        let filter = variant_range_filter(3, 100, 200);
        assert_eq!(
            filter,
            doc! { "#CHROM": 3_i64, "POS": { "$gte": 100_i64, "$lte": 200_i64 } }
        );
    }

    #[test]
    fn membership_filter_lists_keys() {
        let keys = vec!["a".to_string(), "b".to_string()];
        let filter = membership_filter(fields::EXPRESSION_GENE_ID, &keys);
        assert_eq!(filter, doc! { "Gene ID": { "$in": ["a", "b"] } });
    }

    #[test]
    fn suggestion_options_project_one_field_and_cap() {
        let options = suggestion_options(fields::GENE_ID);
        assert_eq!(options.limit, Some(SUGGESTION_LIMIT));
        assert_eq!(options.projection, Some(doc! { "_id": 0, "GeneID": 1 }));
    }

    #[test]
    fn record_options_hide_internal_id() {
        assert_eq!(record_options().projection, Some(doc! { "_id": 0 }));
        assert_eq!(single_record_options().projection, Some(doc! { "_id": 0 }));
    }

    #[test]
    fn chrom_bounds_pipeline_groups_on_chromosome() {
        let pipeline = chrom_bounds_pipeline();
        assert_eq!(pipeline.len(), 1);
        let group = pipeline[0].get_document("$group").unwrap();
        assert_eq!(group.get_str("_id").unwrap(), "$#CHROM");
        assert_eq!(
            group.get_document("min").unwrap(),
            &doc! { "$min": "$POS" }
        );
        assert_eq!(
            group.get_document("max").unwrap(),
            &doc! { "$max": "$POS" }
        );
    }

    #[test]
    fn chrom_key_formats_like_the_front_end_expects() {
        assert_eq!(chrom_key(&Bson::Int32(7)), "7");
        assert_eq!(chrom_key(&Bson::Int64(12)), "12");
        assert_eq!(chrom_key(&Bson::Double(3.0)), "3.0");
        assert_eq!(chrom_key(&Bson::Double(2.5)), "2.5");
        assert_eq!(chrom_key(&Bson::String("X".to_string())), "X");
        assert_eq!(chrom_key(&Bson::Null), "None");
    }
}
