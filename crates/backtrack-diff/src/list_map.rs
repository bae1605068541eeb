//! Transform from a list of keyed items to a record keyed by item key.
//!
//! Items sharing a key are grouped under a [`DuplicatedKeyItems`] marker so
//! the transform stays invertible. Reversing flattens markers back into the
//! list in record order.

use crate::error::{DiffError, Result};
use crate::transform::InvertibleTransform;
use crate::value::{DuplicatedKeyItems, Fields, Value};
use std::sync::Arc;

pub type KeyOf = Arc<dyn Fn(&Value) -> String + Send + Sync>;

#[derive(Clone)]
pub struct ListToObjectMap {
    key_of: KeyOf,
}

impl ListToObjectMap {
    /// Create a transform keying list items with `key_of`.
    pub fn new<F>(key_of: F) -> Self
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
    {
        Self { key_of: Arc::new(key_of) }
    }

    /// Group list items by key. Fails on input that already contains
    /// duplicate markers.
    pub fn try_forward(&self, value: &Value) -> Result<Value> {
        let items = value.as_list().unwrap_or_default();
        let mut grouped: Vec<(String, Vec<Value>)> = Vec::new();
        let mut fields = Fields::with_capacity(items.len());
        for item in items {
            if let Some(marker) = item.as_duplicated() {
                return Err(DiffError::DuplicateMarkedItem(marker.key.clone()));
            }
            let key = (self.key_of)(item);
            match fields.get_index_of(&key) {
                Some(slot) => grouped[slot].1.push(item.clone()),
                None => {
                    fields.insert(key.clone(), Value::Null);
                    grouped.push((key, vec![item.clone()]));
                }
            }
        }
        for (key, mut group) in grouped {
            let entry = if group.len() == 1 {
                group.pop().unwrap_or_default()
            } else {
                Value::Duplicated(Arc::new(DuplicatedKeyItems { key: key.clone(), items: group }))
            };
            fields.insert(key, entry);
        }
        Ok(Value::Record(Arc::new(fields)))
    }
}

impl InvertibleTransform for ListToObjectMap {
    /// # Panics
    ///
    /// Panics when the list contains a duplicate marker; use
    /// [`ListToObjectMap::try_forward`] to check first.
    fn forward(&self, value: &Value) -> Value {
        match self.try_forward(value) {
            Ok(mapped) => mapped,
            Err(err) => panic!("{err}"),
        }
    }

    fn reverse(&self, value: &Value) -> Value {
        let Some(fields) = value.as_record() else {
            return Value::list([]);
        };
        let mut items = Vec::with_capacity(fields.len());
        for entry in fields.values() {
            match entry.as_duplicated() {
                Some(marker) => items.extend(marker.items.iter().cloned()),
                None => items.push(entry.clone()),
            }
        }
        Value::List(Arc::new(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, n: i64) -> Value {
        Value::record([("id", Value::from(id)), ("n", Value::from(n))])
    }

    fn by_id() -> ListToObjectMap {
        ListToObjectMap::new(|v: &Value| v.field("id").as_str().unwrap_or_default().to_string())
    }

    #[test]
    fn test_unique_items() {
        let list = Value::list([item("a", 1), item("b", 2)]);
        let mapped = by_id().forward(&list);
        assert_eq!(mapped.field("a"), item("a", 1));
        assert_eq!(mapped.field("b"), item("b", 2));
        assert_eq!(by_id().reverse(&mapped), list);
    }

    #[test]
    fn test_duplicates_are_grouped() {
        let list = Value::list([item("a", 1), item("b", 2), item("a", 3)]);
        let mapped = by_id().forward(&list);
        let marker = mapped.get("a").and_then(Value::as_duplicated).unwrap();
        assert_eq!(marker.key, "a");
        assert_eq!(marker.items, vec![item("a", 1), item("a", 3)]);
        assert_eq!(
            by_id().reverse(&mapped),
            Value::list([item("a", 1), item("a", 3), item("b", 2)])
        );
    }

    #[test]
    fn test_marker_input_is_rejected() {
        let marker = Value::Duplicated(Arc::new(DuplicatedKeyItems {
            key: "a".into(),
            items: vec![item("a", 1), item("a", 2)],
        }));
        let list = Value::list([marker]);
        assert_eq!(
            by_id().try_forward(&list),
            Err(DiffError::DuplicateMarkedItem("a".into()))
        );
    }

    #[test]
    #[should_panic(expected = "cannot be transformed")]
    fn test_marker_input_panics_in_forward() {
        let marker = Value::Duplicated(Arc::new(DuplicatedKeyItems { key: "k".into(), items: vec![] }));
        by_id().forward(&Value::list([marker]));
    }
}
