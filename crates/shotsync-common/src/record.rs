//! Record model shared by every entity store.
//!
//! A [`Record`] is an opaque field map. Its identity is the store-assigned
//! `id` field; its entity type lives in the `type` field.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::EntityId;

/// Field holding the store-assigned id.
pub const ID_FIELD: &str = "id";
/// Field holding the entity type name.
pub const TYPE_FIELD: &str = "type";
/// Field holding the natural-key code.
pub const CODE_FIELD: &str = "code";

/// Link from one record to another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl EntityRef {
    /// Create an unnamed reference.
    pub fn new<T: Into<String>>(entity_type: T, id: impl Into<EntityId>) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: id.into(),
            name: None,
        }
    }

    /// Attach a display name.
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Two references point at the same record when type and id agree.
    pub fn points_to_same(&self, other: &EntityRef) -> bool {
        self.entity_type == other.entity_type && self.id == other.id
    }
}

/// A single field value.
///
/// Variant order matters for untagged deserialization: integers are tried
/// before floats and entity links before free-form maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Entity(EntityRef),
    List(Vec<FieldValue>),
    Map(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    /// Borrow the text content, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integer content; floats with no fractional part also qualify.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Borrow the entity link, if this is one.
    pub fn as_entity(&self) -> Option<&EntityRef> {
        match self {
            Self::Entity(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Equality used for filter matching.
    ///
    /// Entity links compare by type and id only, and numbers compare by value
    /// regardless of integer/float representation.
    pub fn same_as(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (Self::Entity(a), Self::Entity(b)) => a.points_to_same(b),
            (Self::Int(a), Self::Float(b)) | (Self::Float(b), Self::Int(a)) => (*a as f64) == *b,
            (Self::List(a), Self::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_as(y))
            }
            (a, b) => a == b,
        }
    }

    /// Unambiguous rendering used to build cache keys.
    pub fn canonical(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Int(n) => n.to_string(),
            Self::Float(f) => format!("{f:?}"),
            Self::Text(s) => format!("{s:?}"),
            Self::Entity(e) => format!("{}#{}", e.entity_type, e.id),
            Self::List(items) => {
                let parts: Vec<String> = items.iter().map(FieldValue::canonical).collect();
                format!("[{}]", parts.join(","))
            }
            Self::Map(map) => {
                let parts: Vec<String> = map
                    .iter()
                    .map(|(k, v)| format!("{k:?}:{}", v.canonical()))
                    .collect();
                format!("{{{}}}", parts.join(","))
            }
        }
    }
}

/// Human-facing rendering, used when a field is substituted into a name.
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
            Self::Entity(e) => match &e.name {
                Some(name) => f.write_str(name),
                None => write!(f, "{} #{}", e.entity_type, e.id),
            },
            Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Self::Map(_) => f.write_str(&self.canonical()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<f64> for FieldValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<EntityRef> for FieldValue {
    fn from(e: EntityRef) -> Self {
        Self::Entity(e)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// A row-like object held by an entity store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with<K: Into<String>, V: Into<FieldValue>>(mut self, field: K, value: V) -> Self {
        self.insert(field, value);
        self
    }

    /// Set a field, returning the previous value.
    pub fn insert<K: Into<String>, V: Into<FieldValue>>(
        &mut self,
        field: K,
        value: V,
    ) -> Option<FieldValue> {
        self.fields.insert(field.into(), value.into())
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Field value rendered as a string, or `""` when absent.
    pub fn get_string(&self, field: &str) -> String {
        self.fields
            .get(field)
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Store-assigned id, if the record has been persisted.
    pub fn id(&self) -> Option<EntityId> {
        self.get(ID_FIELD)
            .and_then(FieldValue::as_i64)
            .map(EntityId::new)
    }

    pub fn entity_type(&self) -> Option<&str> {
        self.get(TYPE_FIELD).and_then(FieldValue::as_str)
    }

    pub fn code(&self) -> Option<&str> {
        self.get(CODE_FIELD).and_then(FieldValue::as_str)
    }

    /// Link pointing at this record, named after its code when present.
    pub fn to_entity_ref(&self) -> Option<EntityRef> {
        let entity_type = self.entity_type()?;
        let id = self.id()?;
        let name = self
            .code()
            .or_else(|| self.get("name").and_then(FieldValue::as_str));
        let mut link = EntityRef::new(entity_type, id);
        link.name = name.map(str::to_string);
        Some(link)
    }

    /// Keep only the identity fields plus `fields`. An empty list keeps everything.
    pub fn project(&self, fields: &[String]) -> Record {
        if fields.is_empty() {
            return self.clone();
        }
        self.fields
            .iter()
            .filter(|(k, _)| {
                k.as_str() == ID_FIELD || k.as_str() == TYPE_FIELD || fields.iter().any(|f| f == *k)
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
