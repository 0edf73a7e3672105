use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, trace};

use crate::fields::build_fields;
use crate::locator::find_payload_record;
use crate::payload::{HexError, PayloadError, decode_hex, hex_text, parse_distance};
use crate::{PARSE_ERROR_VARIABLE, ParserOptions, Record};

/// Any failure while decoding the payload record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Hex(#[from] HexError),
    #[error(transparent)]
    Payload(#[from] PayloadError),
}

/// Failure category: malformed payload text or a buffer too short for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Decode,
    Range,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Decode => f.write_str("decode"),
            ErrorKind::Range => f.write_str("range"),
        }
    }
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::Hex(_) => ErrorKind::Decode,
            ParseError::Payload(_) => ErrorKind::Range,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseStatus {
    /// No payload record; the list was left untouched.
    NoPayload,
    /// `fields` records were appended.
    Decoded { fields: usize },
    /// The list was replaced by a single `parse_error` record.
    Failed { kind: ErrorKind, message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    pub records: Vec<Record>,
    pub status: ParseStatus,
}

impl ParseOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self.status, ParseStatus::Failed { .. })
    }
}

/// Decode the fields carried by one payload record.
pub fn decode_fields(source: &Record, options: &ParserOptions) -> Result<Vec<Record>, ParseError> {
    let text = hex_text(source.value.as_ref())?;
    let bytes = decode_hex(text)?;
    let reading = parse_distance(&bytes)?;
    Ok(build_fields(&reading, source, options))
}

/// Run the bucket transform over a record list.
///
/// Without a payload record the list is returned as is. Otherwise the decoded
/// fields are appended; if decoding fails the whole list is replaced by one
/// `parse_error` record holding the error message.
pub fn parse_records(mut records: Vec<Record>, options: &ParserOptions) -> ParseOutcome {
    let decoded = match find_payload_record(&records) {
        Some(source) => {
            decode_fields(source, options).map_err(|err| (source.variable.clone(), err))
        }
        None => {
            trace!(records = records.len(), "no payload record");
            return ParseOutcome {
                records,
                status: ParseStatus::NoPayload,
            };
        }
    };

    match decoded {
        Ok(fields) => {
            let count = fields.len();
            debug!(fields = count, "payload decoded");
            records.extend(fields);
            ParseOutcome {
                records,
                status: ParseStatus::Decoded { fields: count },
            }
        }
        Err((source_variable, err)) => {
            error!(
                source_variable = %source_variable,
                kind = %err.kind(),
                error = %err,
                "payload parse failed"
            );
            let message = err.to_string();
            ParseOutcome {
                records: vec![Record::new(PARSE_ERROR_VARIABLE, message.clone())],
                status: ParseStatus::Failed {
                    kind: err.kind(),
                    message,
                },
            }
        }
    }
}

/// [`parse_records`] with default options, returning only the records.
pub fn parse_payload(records: Vec<Record>) -> Vec<Record> {
    parse_records(records, &ParserOptions::default()).records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DISTANCE_UNIT, DISTANCE_VARIABLE};
    use serde_json::json;

    fn uplink(value: &str) -> Vec<Record> {
        vec![
            Record::new("rssi", -97),
            Record::new("data", value).with_serie("1634"),
        ]
    }

    #[test]
    fn decoded_field_is_appended() {
        let input = uplink("0109611395");
        let outcome = parse_records(input.clone(), &ParserOptions::default());

        assert_eq!(outcome.status, ParseStatus::Decoded { fields: 1 });
        assert_eq!(&outcome.records[..2], &input[..]);
        let field = &outcome.records[2];
        assert_eq!(field.variable, DISTANCE_VARIABLE);
        assert_eq!(field.value, Some(json!(265)));
        assert_eq!(field.unit, Some(json!(DISTANCE_UNIT)));
        assert_eq!(field.group, Some(json!("1634")));
    }

    #[test]
    fn decode_keeps_source_null_keys() {
        let input: Vec<Record> = serde_json::from_value(json!([
            {"variable": "data", "value": "0961", "time": null, "group": null}
        ]))
        .unwrap();
        let parsed = parse_payload(input);

        assert_eq!(
            serde_json::to_value(&parsed).unwrap(),
            json!([
                {"variable": "data", "value": "0961", "time": null, "group": null},
                {"variable": "Distance_demo", "value": 2401, "unit": "mm"}
            ])
        );
    }

    #[test]
    fn missing_payload_is_noop() {
        let input = vec![Record::new("rssi", -97), Record::new("snr", 9.25)];
        let outcome = parse_records(input.clone(), &ParserOptions::default());
        assert_eq!(outcome.status, ParseStatus::NoPayload);
        assert_eq!(outcome.records, input);
    }

    #[test]
    fn invalid_hex_replaces_all_records() {
        let outcome = parse_records(uplink("ZZ"), &ParserOptions::default());
        assert!(outcome.is_failure());
        assert_eq!(outcome.records.len(), 1);

        let record = &outcome.records[0];
        assert!(record.is_parse_error());
        assert_eq!(record.value, Some(json!("invalid hex digit 'Z' at index 0")));
        assert!(matches!(
            outcome.status,
            ParseStatus::Failed {
                kind: ErrorKind::Decode,
                ..
            }
        ));
    }

    #[test]
    fn short_payload_is_range_error() {
        let outcome = parse_records(uplink("01"), &ParserOptions::default());
        assert_eq!(
            outcome.records,
            vec![Record::new(
                PARSE_ERROR_VARIABLE,
                "payload too short: need 2 bytes, got 1"
            )]
        );
        assert!(matches!(
            outcome.status,
            ParseStatus::Failed {
                kind: ErrorKind::Range,
                ..
            }
        ));
    }

    #[test]
    fn non_text_value_is_decode_error() {
        let input = vec![Record::new("payload_raw", 123)];
        let err = decode_fields(&input[0], &ParserOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);

        let parsed = parse_payload(input);
        assert_eq!(parsed.len(), 1);
        assert_eq!(
            parsed[0].value,
            Some(json!("payload value is not a hex string (found number)"))
        );
    }

    #[test]
    fn second_pass_without_source_is_noop() {
        let first = parse_payload(uplink("0961"));
        let decoded: Vec<Record> = first
            .into_iter()
            .filter(|record| record.variable != "data")
            .collect();

        let second = parse_payload(decoded.clone());
        assert_eq!(second, decoded);
        assert_eq!(parse_payload(second.clone()), second);
    }

    #[test]
    fn parse_error_output_is_stable() {
        let failed = parse_payload(uplink("01"));
        assert_eq!(parse_payload(failed.clone()), failed);
    }

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::Decode.to_string(), "decode");
        assert_eq!(
            serde_json::to_value(ErrorKind::Range).unwrap(),
            json!("range")
        );
    }
}
