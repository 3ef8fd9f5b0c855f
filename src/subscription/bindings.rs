//! Explicit per-field edit bindings for rows.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::error::{SyncError, SyncResult};

type Setter<T> = Box<dyn Fn(&mut T, Value) -> Result<(), String> + Send + Sync>;

/// Named setters for the editable fields of a record.
///
/// # Example
///
/// ```
/// use realtime_bindings::models::ShoppingItem;
/// use realtime_bindings::subscription::RowBindings;
///
/// let bindings = RowBindings::new()
///     .field("name", |item: &mut ShoppingItem, name: String| item.name = name)
///     .field("bought", |item: &mut ShoppingItem, bought: bool| item.bought = bought);
///
/// let item = ShoppingItem::new("1", "Milk", false);
/// let edited = bindings.set(&item, "bought", true).unwrap();
/// assert!(edited.unwrap().bought);
/// assert!(bindings.set(&item, "bought", false).unwrap().is_none());
/// ```
pub struct RowBindings<T> {
    fields: Vec<(String, Setter<T>)>,
}

impl<T> RowBindings<T> {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Register a field. A later registration under the same name replaces
    /// the earlier one.
    pub fn field<A, F>(mut self, name: impl Into<String>, setter: F) -> Self
    where
        A: DeserializeOwned,
        F: Fn(&mut T, A) + Send + Sync + 'static,
    {
        let name = name.into();
        let setter: Setter<T> = Box::new(move |target, value| {
            let value: A = serde_json::from_value(value).map_err(|e| e.to_string())?;
            setter(target, value);
            Ok(())
        });
        self.fields.retain(|(existing, _)| *existing != name);
        self.fields.push((name, setter));
        self
    }

    /// Registered field names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|(name, _)| name == field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Apply an edit to a copy of `current`.
    ///
    /// Returns `Ok(None)` when the edit leaves the record unchanged, so it
    /// need not be forwarded. Unknown fields and values of the wrong type fail
    /// with [`SyncError::Encode`].
    pub fn edit(&self, current: &T, field: &str, value: Value) -> SyncResult<Option<T>>
    where
        T: Clone + PartialEq,
    {
        let (_, setter) = self
            .fields
            .iter()
            .find(|(name, _)| name == field)
            .ok_or_else(|| SyncError::Encode(format!("unknown field `{}`", field)))?;

        let mut edited = current.clone();
        setter(&mut edited, value)
            .map_err(|e| SyncError::Encode(format!("field `{}`: {}", field, e)))?;

        Ok((edited != *current).then_some(edited))
    }

    /// Typed form of [`edit`](Self::edit).
    pub fn set<A: Serialize>(&self, current: &T, field: &str, value: A) -> SyncResult<Option<T>>
    where
        T: Clone + PartialEq,
    {
        let value = serde_json::to_value(value).map_err(|e| SyncError::Encode(e.to_string()))?;
        self.edit(current, field, value)
    }
}

impl<T> Default for RowBindings<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for RowBindings<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ShoppingItem;
    use serde_json::json;

    fn bindings() -> RowBindings<ShoppingItem> {
        RowBindings::new()
            .field("name", |item: &mut ShoppingItem, name: String| item.name = name)
            .field("bought", |item: &mut ShoppingItem, bought: bool| {
                item.bought = bought
            })
    }

    #[test]
    fn test_names() {
        assert_eq!(bindings().names().collect::<Vec<_>>(), vec!["name", "bought"]);
        assert!(bindings().contains("name"));
        assert!(!bindings().contains("id"));
    }

    #[test]
    fn test_edit_changes_value() {
        let item = ShoppingItem::new("1", "Milk", false);
        let edited = bindings().edit(&item, "name", json!("Oat milk")).unwrap();
        assert_eq!(edited, Some(ShoppingItem::new("1", "Oat milk", false)));
        assert_eq!(item.name, "Milk");
    }

    #[test]
    fn test_unchanged_edit_is_none() {
        let item = ShoppingItem::new("1", "Milk", false);
        assert_eq!(bindings().edit(&item, "name", json!("Milk")).unwrap(), None);
    }

    #[test]
    fn test_unknown_field() {
        let item = ShoppingItem::new("1", "Milk", false);
        let err = bindings().edit(&item, "price", json!(3)).unwrap_err();
        assert!(matches!(err, SyncError::Encode(msg) if msg.contains("price")));
    }

    #[test]
    fn test_wrong_type() {
        let item = ShoppingItem::new("1", "Milk", false);
        let err = bindings().edit(&item, "bought", json!("yes")).unwrap_err();
        assert!(matches!(err, SyncError::Encode(msg) if msg.contains("bought")));
    }

    #[test]
    fn test_reregister_replaces() {
        let b = bindings().field("name", |item: &mut ShoppingItem, name: String| {
            item.name = name.to_uppercase()
        });
        assert_eq!(b.names().count(), 2);
        let item = ShoppingItem::new("1", "Milk", false);
        let edited = b.set(&item, "name", "tea").unwrap().unwrap();
        assert_eq!(edited.name, "TEA");
    }
}
