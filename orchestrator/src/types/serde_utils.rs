//! Serde helpers for timestamps stored as BSON datetimes, so range queries work on them.

pub use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;

/// Same as [`chrono_datetime_as_bson_datetime`] for optional fields.
pub mod option_chrono_datetime_as_bson_datetime {
    use chrono::{DateTime, Utc};
    use mongodb::bson;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => bson::DateTime::from_chrono(*v).serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        Ok(Option::<bson::DateTime>::deserialize(deserializer)?.map(|v| v.to_chrono()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use mongodb::bson::{self, Bson};
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Stamped {
        #[serde(with = "chrono_datetime_as_bson_datetime")]
        at: DateTime<Utc>,
        #[serde(default, with = "option_chrono_datetime_as_bson_datetime")]
        maybe: Option<DateTime<Utc>>,
    }

    #[test]
    fn timestamps_are_stored_as_bson_datetimes() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let doc = bson::to_document(&Stamped { at, maybe: Some(at) }).unwrap();
        assert!(matches!(doc.get("at"), Some(Bson::DateTime(_))));
        assert!(matches!(doc.get("maybe"), Some(Bson::DateTime(_))));

        let back: Stamped = bson::from_document(doc).unwrap();
        assert_eq!(back.maybe, Some(at));

        let doc = bson::to_document(&Stamped { at, maybe: None }).unwrap();
        assert_eq!(doc.get("maybe"), Some(&Bson::Null));
        let back: Stamped = bson::from_document(doc).unwrap();
        assert_eq!(back.maybe, None);
    }
}
