use serde::{Deserialize, Serialize};
use std::fmt;

use super::{deserialize_id, Identifiable};

/// Demo record served by the shopping list backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct ShoppingItem {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub bought: bool,
}

impl ShoppingItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, bought: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            bought,
        }
    }

    /// Not-yet-bought items sort before bought ones.
    pub fn bought_last(a: &ShoppingItem, b: &ShoppingItem) -> std::cmp::Ordering {
        a.bought.cmp(&b.bought)
    }
}

impl Identifiable for ShoppingItem {
    fn identity(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for ShoppingItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.bought { "x" } else { " " };
        write!(f, "[{}] {} ({})", mark, self.name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    #[test]
    fn test_deserialize_numeric_id() {
        let item: ShoppingItem =
            serde_json::from_str(r#"{"id":7,"name":"Eggs","bought":false}"#).unwrap();
        assert_eq!(item.id, "7");
    }

    #[test]
    fn test_missing_bought_defaults_false() {
        let item: ShoppingItem = serde_json::from_str(r#"{"id":"a","name":"Tea"}"#).unwrap();
        assert!(!item.bought);
    }

    #[test]
    fn test_serialize_shape() {
        let json = serde_json::to_value(ShoppingItem::new("1", "Milk", true)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "1", "name": "Milk", "bought": true})
        );
    }

    #[test]
    fn test_bought_last() {
        let open = ShoppingItem::new("1", "a", false);
        let done = ShoppingItem::new("2", "b", true);
        assert_eq!(ShoppingItem::bought_last(&open, &done), Ordering::Less);
        assert_eq!(ShoppingItem::bought_last(&done, &open), Ordering::Greater);
        assert_eq!(ShoppingItem::bought_last(&open, &open), Ordering::Equal);
    }

    #[test]
    fn test_display() {
        assert_eq!(ShoppingItem::new("1", "Milk", true).to_string(), "[x] Milk (1)");
        assert_eq!(ShoppingItem::new("2", "Tea", false).to_string(), "[ ] Tea (2)");
    }
}
