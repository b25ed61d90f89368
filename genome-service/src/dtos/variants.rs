use mongodb::bson::Bson;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, Default, Deserialize)]
pub struct VariantSearchRequest {
    #[serde(rename = "searchText3")]
    pub search_text: Option<String>,
}

/// Integer supplied by the front end either as a JSON number or as the
/// text of a form field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum IntegerInput {
    Int(i64),
    Float(f64),
    Text(String),
}

impl IntegerInput {
    /// Floats are truncated toward zero; text must be a plain integer.
    pub fn to_i64(&self) -> Result<i64, String> {
        match self {
            IntegerInput::Int(v) => Ok(*v),
            IntegerInput::Float(v) if v.is_finite() => Ok(v.trunc() as i64),
            IntegerInput::Float(v) => Err(format!("'{}' is not an integer", v)),
            IntegerInput::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("'{}' is not an integer", s)),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MultiVariantRequest {
    #[serde(rename = "selectedOption")]
    pub selected_option: Option<IntegerInput>,
    pub varianstart: Option<IntegerInput>,
    pub varianend: Option<IntegerInput>,
    #[serde(rename = "rightItems", default)]
    pub right_items: Vec<String>,
}

/// Smallest and largest `POS` seen on one chromosome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChromRange {
    pub min: Bson,
    pub max: Bson,
}

/// Response of `/getvarianoption`: the chromosome list under `chrom`,
/// followed by one `{min, max}` entry per chromosome keyed by its text form.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VariantOptions {
    pub chroms: Vec<Bson>,
    pub ranges: Vec<(String, ChromRange)>,
}

impl Serialize for VariantOptions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.ranges.len() + 1))?;
        map.serialize_entry("chrom", &self.chroms)?;
        for (key, range) in &self.ranges {
            map.serialize_entry(key, range)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integer_input_accepts_numbers_and_numeric_text() {
        let body: MultiVariantRequest = serde_json::from_value(json!({
            "selectedOption": "3",
            "varianstart": 100,
            "varianend": 2500.9,
            "rightItems": ["M.a"]
        }))
        .unwrap();

        assert_eq!(body.selected_option.unwrap().to_i64(), Ok(3));
        assert_eq!(body.varianstart.unwrap().to_i64(), Ok(100));
        assert_eq!(body.varianend.unwrap().to_i64(), Ok(2500));
        assert_eq!(body.right_items, vec!["M.a".to_string()]);
    }

    #[test]
    fn integer_input_rejects_non_numeric_text() {
        assert!(IntegerInput::Text("chr1".to_string()).to_i64().is_err());
        assert!(IntegerInput::Float(f64::NAN).to_i64().is_err());
    }

    #[test]
    fn missing_right_items_default_to_empty() {
        let body: MultiVariantRequest = serde_json::from_value(json!({})).unwrap();
        assert!(body.selected_option.is_none());
        assert!(body.right_items.is_empty());
    }

    #[test]
    fn variant_options_put_chrom_list_first() {
        let options = VariantOptions {
            chroms: vec![Bson::Int32(1), Bson::Int32(2)],
            ranges: vec![
                (
                    "1".to_string(),
                    ChromRange {
                        min: Bson::Int32(10),
                        max: Bson::Int32(90),
                    },
                ),
                (
                    "2".to_string(),
                    ChromRange {
                        min: Bson::Int64(5),
                        max: Bson::Int64(7),
                    },
                ),
            ],
        };

        let text = serde_json::to_string(&options).unwrap();
        assert_eq!(
            text,
            r#"{"chrom":[1,2],"1":{"min":10,"max":90},"2":{"min":5,"max":7}}"#
        );
    }
}
