use chrono::{DateTime, Utc};
use serde::Serialize;

/// Text produced by one scan, after optional normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionResult {
    text: String,
    length: usize,
}

impl RecognitionResult {
    pub fn new(text: String) -> Self {
        let length = text.chars().count();
        Self { text, length }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of characters (not bytes) in `text`.
    pub fn length(&self) -> usize {
        self.length
    }
}

/// One accepted scan as written to the store.
///
/// Serializes to the document shape `{ text, length?, timestamp }`, with the
/// timestamp as a BSON date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanRecord {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    #[serde(serialize_with = "bson::serde_helpers::chrono_datetime_as_bson_datetime::serialize")]
    pub timestamp: DateTime<Utc>,
}

impl ScanRecord {
    pub fn new(result: &RecognitionResult, include_length: bool) -> Self {
        Self::at(result, include_length, Utc::now())
    }

    pub fn at(result: &RecognitionResult, include_length: bool, timestamp: DateTime<Utc>) -> Self {
        Self {
            text: result.text().to_string(),
            length: include_length.then(|| result.length()),
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_counts_characters() {
        let result = RecognitionResult::new("na\u{ef}ve text".to_string());
        assert_eq!(result.length(), 10);
        assert_eq!(result.text(), "na\u{ef}ve text");
    }

    #[test]
    fn test_record_length_is_optional() {
        let result = RecognitionResult::new("twenty-one characters".to_string());

        let with_length = ScanRecord::new(&result, true);
        assert_eq!(with_length.length, Some(21));
        assert_eq!(with_length.text, "twenty-one characters");

        let without_length = ScanRecord::new(&result, false);
        assert_eq!(without_length.length, None);
    }
}
