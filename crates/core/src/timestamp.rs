//! Timestamp text encodings for rendered index documents.
//!
//! The YAML and JSON index documents carry the same creation instant in
//! two different literal encodings. Both are derived once from the archive
//! file's modification time and cached on the entry, so re-rendering never
//! changes an entry's stamps.

use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

/// Creation stamp format used in the YAML document.
const YAML_FORMAT: &[BorrowedFormatItem<'_>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]Z"
);

/// Creation stamp format used in the JSON document.
const JSON_FORMAT: &[BorrowedFormatItem<'_>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]000+00:00"
);

/// Format of the repo document's `generated` field.
const GENERATED_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]+00:00");

/// A creation instant rendered in both document encodings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatedStamps {
    /// Encoding used in the YAML index document.
    pub yaml: String,
    /// Encoding used in the JSON index document.
    pub json: String,
}

impl CreatedStamps {
    /// Render both encodings of an instant (converted to UTC).
    pub fn from_time(instant: OffsetDateTime) -> Self {
        let utc = instant.to_offset(time::UtcOffset::UTC);
        Self {
            yaml: utc
                .format(YAML_FORMAT)
                .unwrap_or_else(|_| String::from("1970-01-01T00:00:00.000000Z")),
            json: utc
                .format(JSON_FORMAT)
                .unwrap_or_else(|_| String::from("1970-01-01T00:00:00.000000000+00:00")),
        }
    }
}

/// Render the `generated` stamp for a repo document, as of now.
pub fn generated_stamp() -> String {
    OffsetDateTime::now_utc()
        .format(GENERATED_FORMAT)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00+00:00"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn both_encodings_of_one_instant() {
        let stamps = CreatedStamps::from_time(datetime!(2022-01-25 11:48:46.123456 UTC));
        assert_eq!(stamps.yaml, "2022-01-25T11:48:46.123456Z");
        assert_eq!(stamps.json, "2022-01-25T11:48:46.123456000+00:00");
    }

    #[test]
    fn non_utc_offset_is_normalized() {
        let stamps = CreatedStamps::from_time(datetime!(2022-01-25 12:48:46.0 +01:00));
        assert_eq!(stamps.yaml, "2022-01-25T11:48:46.000000Z");
    }

    #[test]
    fn generated_stamp_shape() {
        let stamp = generated_stamp();
        // YYYY-MM-DDThh:mm:ss+00:00
        assert_eq!(stamp.len(), 25);
        assert!(stamp.ends_with("+00:00"));
    }
}
