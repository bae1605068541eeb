//! Dynamic value model shared by every differencer.
//!
//! Containers are reference counted so clones are cheap and "same
//! reference" is observable through [`Value::ptr_eq`]. All containers keep
//! insertion order, and order participates in equality.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Field map backing [`Value::Record`].
pub type Fields = IndexMap<String, Value>;

/// Marker produced by the list-to-map transform when several list items
/// share one key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DuplicatedKeyItems {
    pub key: String,
    pub items: Vec<Value>,
}

/// A dynamically shaped host value.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(Arc<str>),
    List(Arc<Vec<Value>>),
    Set(Arc<IndexSet<Value>>),
    Map(Arc<IndexMap<Value, Value>>),
    Record(Arc<Fields>),
    Duplicated(Arc<DuplicatedKeyItems>),
}

impl Value {
    /// Build a text value.
    pub fn text(s: impl AsRef<str>) -> Self {
        Value::Text(Arc::from(s.as_ref()))
    }

    /// Build a list value.
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(Arc::new(items.into_iter().collect()))
    }

    /// Build a set value. Duplicate items collapse, first one wins.
    pub fn set(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Set(Arc::new(items.into_iter().collect()))
    }

    /// Build a map value keyed by arbitrary values.
    pub fn map(entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
        Value::Map(Arc::new(entries.into_iter().collect()))
    }

    /// Build a record from named fields, keeping their order.
    pub fn record<K: Into<String>>(fields: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Record(Arc::new(
            fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    /// A record with no fields.
    pub fn empty_record() -> Self {
        Value::Record(Arc::new(Fields::new()))
    }

    /// Check whether this is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the boolean, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the integer, if this is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the text, if this is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    /// Get the list items.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Get the set items.
    pub fn as_set(&self) -> Option<&IndexSet<Value>> {
        match self {
            Value::Set(items) => Some(items.as_ref()),
            _ => None,
        }
    }

    /// Get the map entries.
    pub fn as_map(&self) -> Option<&IndexMap<Value, Value>> {
        match self {
            Value::Map(entries) => Some(entries.as_ref()),
            _ => None,
        }
    }

    /// Get the record fields.
    pub fn as_record(&self) -> Option<&Fields> {
        match self {
            Value::Record(fields) => Some(fields.as_ref()),
            _ => None,
        }
    }

    /// Get the duplicated-key marker.
    pub fn as_duplicated(&self) -> Option<&DuplicatedKeyItems> {
        match self {
            Value::Duplicated(marker) => Some(marker.as_ref()),
            _ => None,
        }
    }

    /// Field lookup on a record. Anything else has no fields.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.as_record().and_then(|fields| fields.get(field))
    }

    /// Field value on a record, `Null` when absent.
    pub fn field(&self, field: &str) -> Value {
        self.get(field).cloned().unwrap_or_default()
    }

    /// Copy-on-write field update.
    ///
    /// Only the outer record is rebuilt; every other field keeps its
    /// reference identity. A non-record receiver is treated as an empty
    /// record.
    pub fn with_field(&self, field: impl Into<String>, value: Value) -> Value {
        let mut fields = self.as_record().cloned().unwrap_or_default();
        fields.insert(field.into(), value);
        Value::Record(Arc::new(fields))
    }

    /// Copy-on-write field removal, preserving the order of the remaining fields.
    pub fn without_field(&self, field: &str) -> Value {
        match self.as_record() {
            Some(fields) if fields.contains_key(field) => {
                let mut fields = fields.clone();
                fields.shift_remove(field);
                Value::Record(Arc::new(fields))
            }
            _ => self.clone(),
        }
    }

    /// True when both values share the same allocation (containers) or are
    /// equal (scalars).
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => Arc::ptr_eq(a, b),
            (Value::List(a), Value::List(b)) => Arc::ptr_eq(a, b),
            (Value::Set(a), Value::Set(b)) => Arc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => Arc::ptr_eq(a, b),
            (Value::Record(a), Value::Record(b)) => Arc::ptr_eq(a, b),
            (Value::Duplicated(a), Value::Duplicated(b)) => Arc::ptr_eq(a, b),
            _ => self == other,
        }
    }

    /// Lossy conversion to JSON. Sets become arrays, maps become arrays of
    /// `[key, value]` pairs and non-finite floats become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => Json::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::Text(s) => Json::String(s.to_string()),
            Value::List(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Set(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(entries) => Json::Array(
                entries
                    .iter()
                    .map(|(k, v)| Json::Array(vec![k.to_json(), v.to_json()]))
                    .collect(),
            ),
            Value::Record(fields) => Json::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Value::Duplicated(marker) => {
                Json::Array(marker.items.iter().map(Value::to_json).collect())
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::List(a), Value::List(b)) => Arc::ptr_eq(a, b) || a == b,
            (Value::Set(a), Value::Set(b)) => Arc::ptr_eq(a, b) || a.iter().eq(b.iter()),
            (Value::Map(a), Value::Map(b)) => Arc::ptr_eq(a, b) || a.iter().eq(b.iter()),
            (Value::Record(a), Value::Record(b)) => Arc::ptr_eq(a, b) || a.iter().eq(b.iter()),
            (Value::Duplicated(a), Value::Duplicated(b)) => Arc::ptr_eq(a, b) || a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Text(s) => s.hash(state),
            Value::List(items) => items.hash(state),
            Value::Set(items) => {
                state.write_usize(items.len());
                items.iter().for_each(|item| item.hash(state));
            }
            Value::Map(entries) => {
                state.write_usize(entries.len());
                for (k, v) in entries.iter() {
                    k.hash(state);
                    v.hash(state);
                }
            }
            Value::Record(fields) => {
                state.write_usize(fields.len());
                for (k, v) in fields.iter() {
                    k.hash(state);
                    v.hash(state);
                }
            }
            Value::Duplicated(marker) => marker.hash(state),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Value::text(s),
            Json::Array(items) => Value::list(items.into_iter().map(Value::from)),
            Json::Object(fields) => {
                Value::record(fields.into_iter().map(|(k, v)| (k, Value::from(v))))
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::text(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or_default()
    }
}
