//! Bucketparse core library: LoRaWAN bucket payload decoding.
//!
//! This crate implements the transform a network-server bucket runs on
//! ingestion: the record carrying the raw uplink (`payload_raw`, `payload` or
//! `data`) is located, its hexadecimal value is decoded into bytes, fixed
//! fields are read from the buffer and the resulting labeled, unit-tagged
//! records are appended to the list. Decoding is byte-oriented and side-effect
//! free; file and stream handling belong to the CLI.
//!
//! Invariants:
//! - Decoded fields are appended after the input records, never replacing them.
//! - Any decode failure replaces the whole list with one `parse_error` record.
//! - A list without a payload record is returned unchanged.
//!
//! Version française (résumé):
//! Cette crate décode la charge utile d'un enregistrement `payload_raw`,
//! `payload` ou `data` (hexadécimal), lit les champs à position fixe et ajoute
//! les variables décodées à la liste. En cas d'erreur, la liste est remplacée
//! par un unique enregistrement `parse_error`.
//!
//! # Examples
//! ```
//! use bucketparse_core::{Record, parse_payload};
//!
//! let records = vec![Record::new("data", "0109611395")];
//! let parsed = parse_payload(records);
//! assert_eq!(parsed.len(), 2);
//! assert_eq!(parsed[1].variable, "Distance_demo");
//! assert_eq!(parsed[1].value, Some(265.into()));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

mod config;
mod fields;
mod locator;
pub mod payload;
mod transform;

pub use config::{ConfigError, ParserOptions};
pub use fields::{DISTANCE_UNIT, DISTANCE_VARIABLE, build_fields, coalesce_group};
pub use locator::{PAYLOAD_ALIASES, find_payload_record, is_payload_alias};
pub use transform::{
    ErrorKind, ParseError, ParseOutcome, ParseStatus, decode_fields, parse_payload, parse_records,
};

/// Variable name of the diagnostic record emitted when decoding fails.
pub const PARSE_ERROR_VARIABLE: &str = "parse_error";

/// One bucket variable as exchanged with the ingestion pipeline.
///
/// Keys this crate does not interpret are kept in `metadata` and written back
/// unchanged. Optional keys distinguish "absent" (`None`) from an explicit
/// JSON `null` (`Some(Value::Null)`), so records round-trip key for key.
///
/// # Examples
/// ```
/// use bucketparse_core::Record;
/// use serde_json::Value;
///
/// let record: Record = serde_json::from_str(
///     r#"{"variable":"data","value":"0961","serie":"abc","group":null,"rssi":-97}"#,
/// )?;
/// assert_eq!(record.variable, "data");
/// assert_eq!(record.group, Some(Value::Null));
/// assert_eq!(record.time, None);
/// assert_eq!(record.metadata["rssi"], -97);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Variable name (e.g., "payload_raw", "Distance_demo").
    pub variable: String,
    /// Variable value of any JSON type.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Unit label, when the variable carries one.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub unit: Option<Value>,
    /// Group label correlating variables of one ingestion event.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub group: Option<Value>,
    /// Legacy name of the group label.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub serie: Option<Value>,
    /// Measurement time as provided by the network server.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub time: Option<Value>,
    /// Any other keys of the record.
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

// A key that is present, even as `null`, deserializes to `Some`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl Record {
    /// Create a record with a variable name and value and no other keys.
    pub fn new(variable: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            variable: variable.into(),
            value: Some(value.into()),
            unit: None,
            group: None,
            serie: None,
            time: None,
            metadata: Map::new(),
        }
    }

    /// Set the unit label.
    pub fn with_unit(mut self, unit: impl Into<Value>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Set the `group` label.
    pub fn with_group(mut self, group: impl Into<Value>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Set the legacy `serie` label.
    pub fn with_serie(mut self, serie: impl Into<Value>) -> Self {
        self.serie = Some(serie.into());
        self
    }

    /// Set the measurement time.
    pub fn with_time(mut self, time: impl Into<Value>) -> Self {
        self.time = Some(time.into());
        self
    }

    /// Returns true for the diagnostic record produced on decode failure.
    pub fn is_parse_error(&self) -> bool {
        self.variable == PARSE_ERROR_VARIABLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_omits_absent_fields() {
        let record = Record::new("Distance_demo", 265).with_unit("mm");
        let value = serde_json::to_value(&record).expect("record json");
        assert_eq!(
            value,
            json!({"variable": "Distance_demo", "value": 265, "unit": "mm"})
        );
    }

    #[test]
    fn record_keeps_unknown_keys() {
        let input = json!({
            "variable": "payload",
            "value": "0961",
            "group": 42,
            "metadata": {"port": 10},
            "origin": "gateway-1"
        });
        let record: Record = serde_json::from_value(input.clone()).expect("record");
        assert_eq!(record.group, Some(json!(42)));
        assert_eq!(record.metadata.len(), 2);

        let back = serde_json::to_value(&record).expect("record json");
        assert_eq!(back, input);
    }

    #[test]
    fn record_keeps_explicit_nulls() {
        let input = json!({
            "variable": "rssi",
            "value": null,
            "group": null,
            "serie": null,
            "unit": null,
            "time": null
        });
        let record: Record = serde_json::from_value(input.clone()).expect("record");
        assert_eq!(record.value, Some(Value::Null));
        assert_eq!(record.group, Some(Value::Null));
        assert!(record.metadata.is_empty());

        let back = serde_json::to_value(&record).expect("record json");
        assert_eq!(back, input);
    }

    #[test]
    fn record_absent_keys_stay_absent() {
        let input = json!({"variable": "snr"});
        let record: Record = serde_json::from_value(input.clone()).expect("record");
        assert_eq!(record.value, None);
        assert_eq!(record.time, None);
        assert_eq!(serde_json::to_value(&record).expect("record json"), input);
    }

    #[test]
    fn parse_error_record_is_recognized() {
        assert!(Record::new(PARSE_ERROR_VARIABLE, "boom").is_parse_error());
        assert!(!Record::new("data", "00").is_parse_error());
    }
}
