//! Scope filters and natural keys.
//!
//! A [`NaturalKey`] identifies a record by human-meaningful data: its entity
//! type, the filters that scope it (project, parent), and its code. The
//! derived [`CacheKey`] is what a session cache is indexed by.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::{FieldValue, Record, CODE_FIELD};

/// Comparison applied by a [`ScopeFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Is,
    IsNot,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Is => write!(f, "is"),
            Self::IsNot => write!(f, "is_not"),
        }
    }
}

impl std::str::FromStr for Relation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "is" => Ok(Self::Is),
            "is_not" => Ok(Self::IsNot),
            _ => Err(format!("Invalid relation: {}", s)),
        }
    }
}

/// A `(field, relation, value)` query constraint.
///
/// Serialized as a three-element array, the shape the tracking service's
/// query API expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    into = "(String, Relation, FieldValue)",
    from = "(String, Relation, FieldValue)"
)]
pub struct ScopeFilter {
    pub field: String,
    pub relation: Relation,
    pub value: FieldValue,
}

impl ScopeFilter {
    pub fn is<F: Into<String>, V: Into<FieldValue>>(field: F, value: V) -> Self {
        Self {
            field: field.into(),
            relation: Relation::Is,
            value: value.into(),
        }
    }

    pub fn is_not<F: Into<String>, V: Into<FieldValue>>(field: F, value: V) -> Self {
        Self {
            field: field.into(),
            relation: Relation::IsNot,
            value: value.into(),
        }
    }

    /// Whether `record` satisfies this filter. Absent fields compare as null.
    pub fn matches(&self, record: &Record) -> bool {
        let actual = record.get(&self.field).unwrap_or(&FieldValue::Null);
        let equal = actual.same_as(&self.value);
        match self.relation {
            Relation::Is => equal,
            Relation::IsNot => !equal,
        }
    }

    /// Field assignment implied by this filter when creating a record.
    pub fn assignment(&self) -> Option<(&str, &FieldValue)> {
        match self.relation {
            Relation::Is => Some((&self.field, &self.value)),
            Relation::IsNot => None,
        }
    }
}

impl From<ScopeFilter> for (String, Relation, FieldValue) {
    fn from(f: ScopeFilter) -> Self {
        (f.field, f.relation, f.value)
    }
}

impl From<(String, Relation, FieldValue)> for ScopeFilter {
    fn from((field, relation, value): (String, Relation, FieldValue)) -> Self {
        Self {
            field,
            relation,
            value,
        }
    }
}

impl fmt::Display for ScopeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.relation, self.value.canonical())
    }
}

/// Key of a session cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Entity type, scope filters and code used to look a record up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NaturalKey {
    pub entity_type: String,
    pub filters: Vec<ScopeFilter>,
    pub code: String,
}

impl NaturalKey {
    pub fn new<T: Into<String>, C: Into<String>>(
        entity_type: T,
        filters: Vec<ScopeFilter>,
        code: C,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            filters,
            code: code.into(),
        }
    }

    /// Cache key derived from type, filters and code.
    ///
    /// Filters are sorted, so the same scope given in a different order maps
    /// to the same entry.
    pub fn cache_key(&self) -> CacheKey {
        let mut filters: Vec<String> = self.filters.iter().map(ToString::to_string).collect();
        filters.sort();
        CacheKey(format!(
            "{}[{}] code={:?}",
            self.entity_type,
            filters.join(", "),
            self.code
        ))
    }

    /// The scope filters followed by `code is <code>`.
    pub fn query_filters(&self) -> Vec<ScopeFilter> {
        let mut filters = self.filters.clone();
        filters.push(ScopeFilter::is(CODE_FIELD, self.code.as_str()));
        filters
    }

    /// Field values for a new record: every `is` filter plus the code.
    pub fn create_fields(&self) -> Record {
        let mut fields: BTreeMap<String, FieldValue> = self
            .filters
            .iter()
            .filter_map(ScopeFilter::assignment)
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        fields.insert(CODE_FIELD.to_string(), FieldValue::from(self.code.as_str()));
        fields.into_iter().collect()
    }
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[", self.entity_type)?;
        for (i, filter) in self.filters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{filter}")?;
        }
        write!(f, "] code={:?}", self.code)
    }
}
