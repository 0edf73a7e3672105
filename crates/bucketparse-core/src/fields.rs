use serde_json::Value;

use crate::payload::DistanceReading;
use crate::{ParserOptions, Record};

pub const DISTANCE_VARIABLE: &str = "Distance_demo";
pub const DISTANCE_UNIT: &str = "mm";

/// Build the records appended for one decoded payload.
///
/// Every field carries the source record's group label and, when
/// `copy_time` is enabled, its `time`.
pub fn build_fields(
    reading: &DistanceReading,
    source: &Record,
    options: &ParserOptions,
) -> Vec<Record> {
    let group = coalesce_group(source.serie.as_ref(), source.group.as_ref()).map(Value::String);
    let time = if options.copy_time {
        source.time.clone()
    } else {
        None
    };

    let decoded = [Record::new(DISTANCE_VARIABLE, reading.distance_mm).with_unit(DISTANCE_UNIT)];
    decoded
        .into_iter()
        .map(|mut field| {
            field.group = group.clone();
            field.time = time.clone();
            field
        })
        .collect()
}

/// Pick the group label of a source record as a string.
///
/// `serie` wins when truthy, then `group` when truthy. If neither is truthy
/// the first one present is used (e.g. a `0` serie becomes `"0"`).
///
/// # Examples
/// ```
/// use bucketparse_core::coalesce_group;
/// use serde_json::json;
///
/// assert_eq!(coalesce_group(Some(&json!("s1")), Some(&json!(2))), Some("s1".to_string()));
/// assert_eq!(coalesce_group(Some(&json!("")), Some(&json!(2))), Some("2".to_string()));
/// assert_eq!(coalesce_group(None, None), None);
/// ```
pub fn coalesce_group(serie: Option<&Value>, group: Option<&Value>) -> Option<String> {
    let present = || [serie, group].into_iter().flatten();
    present()
        .find(|value| is_truthy(value))
        .or_else(|| present().find(|value| !value.is_null()))
        .map(label_text)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn label_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serie_preferred_over_group() {
        let label = coalesce_group(Some(&json!("serie-1")), Some(&json!("group-1")));
        assert_eq!(label.as_deref(), Some("serie-1"));
    }

    #[test]
    fn falls_back_to_group() {
        assert_eq!(coalesce_group(None, Some(&json!(12))).as_deref(), Some("12"));
        assert_eq!(
            coalesce_group(Some(&json!(0)), Some(&json!("g"))).as_deref(),
            Some("g")
        );
    }

    #[test]
    fn falsy_values_still_label() {
        assert_eq!(coalesce_group(Some(&json!(0)), None).as_deref(), Some("0"));
        assert_eq!(
            coalesce_group(Some(&json!(false)), Some(&json!(""))).as_deref(),
            Some("false")
        );
    }

    #[test]
    fn structured_labels_render_as_json() {
        let label = coalesce_group(None, Some(&json!({"id": 1})));
        assert_eq!(label.as_deref(), Some(r#"{"id":1}"#));
    }

    #[test]
    fn build_fields_labels_distance() {
        let source = Record::new("data", "0109611395").with_serie("1634").with_time("t0");
        let reading = DistanceReading { distance_mm: 265 };

        let fields = build_fields(&reading, &source, &ParserOptions::default());
        assert_eq!(fields.len(), 1);
        let field = &fields[0];
        assert_eq!(field.variable, DISTANCE_VARIABLE);
        assert_eq!(field.value, Some(json!(265)));
        assert_eq!(field.unit, Some(json!(DISTANCE_UNIT)));
        assert_eq!(field.group, Some(json!("1634")));
        assert_eq!(field.time, None);
        assert!(field.metadata.is_empty());
    }

    #[test]
    fn build_fields_copies_time_when_enabled() {
        let source = Record::new("payload", "0961").with_time("2024-05-01T10:00:00Z");
        let options = ParserOptions { copy_time: true };
        let fields = build_fields(&DistanceReading { distance_mm: 2401 }, &source, &options);
        assert_eq!(fields[0].time, Some(json!("2024-05-01T10:00:00Z")));
        assert_eq!(fields[0].group, None);
    }
}
