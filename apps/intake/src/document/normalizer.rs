//! Record Normalizer: raw applicant record → typed, label-resolved groups.
//!
//! The four repeated groups may arrive either as arrays or as JSON-encoded
//! strings (multipart forms can only carry text). They are resolved once here
//! through [`NestedField`]; nothing downstream sees the encoded form.
//!
//! Normalization never fails. Defects are recorded as [`NormalizeWarning`]s,
//! logged, and the affected section degrades to empty.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::catalog::{self, Group, Locale};
use crate::document::stringify::stringify;

// ────────────────────────────────────────────────────────────────────────────
// Input
// ────────────────────────────────────────────────────────────────────────────

/// A raw applicant submission: field name → JSON value. Borrowed read-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(Map<String, Value>);

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from multipart text fields. A repeated name keeps its last value.
    pub fn from_text_fields<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self(
            fields
                .into_iter()
                .map(|(name, value)| (name, Value::String(value)))
                .collect(),
        )
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for RawRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Output
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub label: &'static str,
    pub value: String,
}

/// Populated fields of one group instance, in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NormalizedGroup(Vec<Field>);

impl NormalizedGroup {
    pub fn fields(&self) -> &[Field] {
        &self.0
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.0.iter().map(|f| f.label).collect()
    }

    pub fn value_of(&self, label: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|f| f.label == label)
            .map(|f| f.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Field> for NormalizedGroup {
    fn from_iter<T: IntoIterator<Item = Field>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Non-fatal normalization defects. Reported back to the caller, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NormalizeWarning {
    #[error("field '{field}' could not be decoded as an array ({reason}); treated as empty")]
    MalformedInput { field: &'static str, reason: String },

    #[error("{field}[{index}] is not a record and was skipped")]
    UnsupportedValue { field: &'static str, index: usize },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedRecord {
    /// `name` and `family` joined, or empty when neither is present.
    pub applicant: String,
    pub personal: NormalizedGroup,
    pub educations: Vec<NormalizedGroup>,
    pub languages: Vec<NormalizedGroup>,
    pub work_histories: Vec<NormalizedGroup>,
    pub referees: Vec<NormalizedGroup>,
    pub additional: NormalizedGroup,
    pub warnings: Vec<NormalizeWarning>,
}

impl NormalizedRecord {
    /// Items of a repeated group; empty for Personal and Additional.
    pub fn repeated(&self, group: Group) -> &[NormalizedGroup] {
        match group {
            Group::Education => &self.educations,
            Group::Language => &self.languages,
            Group::WorkHistory => &self.work_histories,
            Group::Referee => &self.referees,
            Group::Personal | Group::Additional => &[],
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Nested array decoding
// ────────────────────────────────────────────────────────────────────────────

/// The shapes a repeated-group field can arrive in.
enum NestedField<'a> {
    Absent,
    Encoded(&'a str),
    Decoded(&'a [Value]),
    Unsupported(&'a Value),
}

impl<'a> NestedField<'a> {
    fn classify(value: Option<&'a Value>) -> Self {
        match value {
            None | Some(Value::Null) => NestedField::Absent,
            Some(Value::String(s)) => NestedField::Encoded(s),
            Some(Value::Array(items)) => NestedField::Decoded(items),
            Some(other) => NestedField::Unsupported(other),
        }
    }

    fn resolve(self, field: &'static str) -> Result<Cow<'a, [Value]>, NormalizeWarning> {
        match self {
            NestedField::Absent => Ok(Cow::Borrowed(&[])),
            NestedField::Decoded(items) => Ok(Cow::Borrowed(items)),
            NestedField::Encoded(s) if s.trim().is_empty() => Ok(Cow::Borrowed(&[])),
            NestedField::Encoded(s) => match serde_json::from_str::<Value>(s) {
                Ok(Value::Array(items)) => Ok(Cow::Owned(items)),
                Ok(Value::Null) => Ok(Cow::Borrowed(&[])),
                Ok(other) => Err(NormalizeWarning::MalformedInput {
                    field,
                    reason: format!("decoded to {} instead of an array", json_kind(&other)),
                }),
                Err(e) => Err(NormalizeWarning::MalformedInput {
                    field,
                    reason: e.to_string(),
                }),
            },
            NestedField::Unsupported(other) => Err(NormalizeWarning::MalformedInput {
                field,
                reason: format!("got {} instead of an array", json_kind(other)),
            }),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Normalization
// ────────────────────────────────────────────────────────────────────────────

/// Normalizes a raw record into label-resolved groups for `locale`.
pub fn normalize(raw: &RawRecord, locale: Locale) -> NormalizedRecord {
    let mut warnings = Vec::new();

    let mut repeated = |group: Group| -> Vec<NormalizedGroup> {
        match group.array_field() {
            Some(field) => normalize_repeated(raw, group, field, locale, &mut warnings),
            None => Vec::new(),
        }
    };
    let educations = repeated(Group::Education);
    let languages = repeated(Group::Language);
    let work_histories = repeated(Group::WorkHistory);
    let referees = repeated(Group::Referee);

    NormalizedRecord {
        applicant: applicant_name(raw),
        personal: project(&raw.0, Group::Personal, locale),
        educations,
        languages,
        work_histories,
        referees,
        additional: project(&raw.0, Group::Additional, locale),
        warnings,
    }
}

/// Filter + convert one record-shaped value against a group's catalog.
fn project(source: &Map<String, Value>, group: Group, locale: Locale) -> NormalizedGroup {
    catalog::fields(group)
        .iter()
        .filter_map(|def| {
            let value = stringify(source.get(def.key)?);
            if value.trim().is_empty() {
                return None;
            }
            Some(Field {
                label: def.label(locale),
                value,
            })
        })
        .collect()
}

fn normalize_repeated(
    raw: &RawRecord,
    group: Group,
    field: &'static str,
    locale: Locale,
    warnings: &mut Vec<NormalizeWarning>,
) -> Vec<NormalizedGroup> {
    let items = match NestedField::classify(raw.get(field)).resolve(field) {
        Ok(items) => items,
        Err(warning) => {
            warn!("{warning}");
            warnings.push(warning);
            return Vec::new();
        }
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match item {
            Value::Object(map) => Some(project(map, group, locale)),
            _ => {
                let warning = NormalizeWarning::UnsupportedValue { field, index };
                warn!("{warning}");
                warnings.push(warning);
                None
            }
        })
        .collect()
}

fn applicant_name(raw: &RawRecord) -> String {
    ["name", "family"]
        .iter()
        .filter_map(|key| raw.get(key).map(stringify))
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
