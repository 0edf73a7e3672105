use crate::Record;

/// Variable names a network server uses for the raw uplink.
pub const PAYLOAD_ALIASES: [&str; 3] = ["payload_raw", "payload", "data"];

pub fn is_payload_alias(variable: &str) -> bool {
    PAYLOAD_ALIASES.contains(&variable)
}

/// Find the record carrying the raw uplink.
///
/// The first record in list order whose variable is one of
/// [`PAYLOAD_ALIASES`] wins, regardless of which alias it uses.
///
/// # Examples
/// ```
/// use bucketparse_core::{Record, find_payload_record};
///
/// let records = vec![Record::new("rssi", -97), Record::new("payload", "0961")];
/// let found = find_payload_record(&records).map(|record| record.variable.as_str());
/// assert_eq!(found, Some("payload"));
/// ```
pub fn find_payload_record(records: &[Record]) -> Option<&Record> {
    records
        .iter()
        .find(|record| is_payload_alias(&record.variable))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_match_exactly() {
        assert!(is_payload_alias("payload_raw"));
        assert!(is_payload_alias("data"));
        assert!(!is_payload_alias("Data"));
        assert!(!is_payload_alias("payload_raw "));
    }

    #[test]
    fn first_match_in_list_order() {
        let records = vec![
            Record::new("snr", 7.5),
            Record::new("data", "0001"),
            Record::new("payload_raw", "0002"),
        ];
        let found = find_payload_record(&records).expect("payload record");
        assert_eq!(found.variable, "data");
        assert_eq!(found.value, Some("0001".into()));
    }

    #[test]
    fn no_match_is_none() {
        let records = vec![Record::new("Distance_demo", 265), Record::new("rssi", -97)];
        assert!(find_payload_record(&records).is_none());
        assert!(find_payload_record(&[]).is_none());
    }
}
