pub mod change;
mod identity;
mod shopping_item;

pub use change::{decode_envelope, encode_value, ChangeKind, Envelope};
pub use identity::Identifiable;
pub use shopping_item::ShoppingItem;

use serde::Deserializer;

/// Helper to deserialize id as either string or integer
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct IdVisitor;

    impl<'de> Visitor<'de> for IdVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or integer")
        }

        fn visit_str<E>(self, value: &str) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_string<E>(self, value: String) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value)
        }

        fn visit_i64<E>(self, value: i64) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct WithId {
        #[serde(deserialize_with = "deserialize_id")]
        id: String,
    }

    #[test]
    fn test_deserialize_id_variants() {
        let s: WithId = serde_json::from_str(r#"{"id":"abc"}"#).unwrap();
        assert_eq!(s.id, "abc");
        let n: WithId = serde_json::from_str(r#"{"id":12}"#).unwrap();
        assert_eq!(n.id, "12");
        let neg: WithId = serde_json::from_str(r#"{"id":-3}"#).unwrap();
        assert_eq!(neg.id, "-3");
        assert!(serde_json::from_str::<WithId>(r#"{"id":true}"#).is_err());
    }
}
