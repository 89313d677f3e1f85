//! Data types used to define the data this crate works with.

use serde::{Deserialize, Serialize};

/// A city and its population, in the shape stored in the search index.
///
/// The wire field names (`city`, `population`) are fixed for compatibility
/// with documents already in the index. Decoding is deliberately lenient:
/// missing fields fall back to their zero values so that callers can report
/// an incomplete record separately from a malformed one.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct CityRecord {
    /// The name of the city. Doubles as the document ID in the index.
    #[serde(rename = "city", default)]
    pub name: String,

    /// The population of the city. Zero means the value was not provided.
    #[serde(default)]
    pub population: u64,
}

impl CityRecord {
    /// Whether both fields were actually provided. A record with an empty
    /// name or a zero population must not reach the index.
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && self.population != 0
    }
}

/// A [`CityRecord`] wrapped in the `_source` envelope that mirrors the
/// index's native document shape. Used both for upsert request bodies and
/// for re-serializing fetched documents.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct CityEnvelope {
    /// The wrapped record.
    #[serde(rename = "_source", default)]
    pub source: CityRecord,
}

impl From<CityRecord> for CityEnvelope {
    fn from(source: CityRecord) -> Self {
        Self { source }
    }
}

#[cfg(test)]
mod tests {
    use super::{CityEnvelope, CityRecord};
    use serde_json::json;

    #[test]
    fn decodes_a_get_response_ignoring_index_metadata() {
        let envelope: CityEnvelope = serde_json::from_value(json!({
            "_index": "cities",
            "_type": "_doc",
            "_id": "Paris",
            "_version": 3,
            "found": true,
            "_source": {"city": "Paris", "population": 2_148_000},
        }))
        .unwrap();

        assert_eq!(
            envelope.source,
            CityRecord {
                name: "Paris".to_string(),
                population: 2_148_000,
            }
        );
    }

    #[test]
    fn missing_fields_decode_to_zero_values() {
        let envelope: CityEnvelope = serde_json::from_value(json!({})).unwrap();
        assert_eq!(envelope.source, CityRecord::default());
        assert!(!envelope.source.is_complete());

        let envelope: CityEnvelope =
            serde_json::from_value(json!({"_source": {"city": "Lyon"}})).unwrap();
        assert_eq!(envelope.source.population, 0);
        assert!(!envelope.source.is_complete());
    }

    #[test]
    fn mistyped_fields_fail_to_decode() {
        let result: Result<CityEnvelope, _> =
            serde_json::from_value(json!({"_source": {"city": "Lyon", "population": "lots"}}));
        assert!(result.is_err());

        // Negative populations are not representable.
        let result: Result<CityEnvelope, _> =
            serde_json::from_value(json!({"_source": {"city": "Lyon", "population": -1}}));
        assert!(result.is_err());
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let envelope = CityEnvelope::from(CityRecord {
            name: "Paris".to_string(),
            population: 2_148_000,
        });

        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"_source": {"city": "Paris", "population": 2_148_000}})
        );
    }

    #[test]
    fn quotes_in_names_stay_intact() {
        let record = CityRecord {
            name: r#"Citi"nator"#.to_string(),
            population: 1,
        };

        let encoded = serde_json::to_string(&record).unwrap();
        let decoded: CityRecord = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, record);
    }
}
