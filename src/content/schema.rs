use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_yaml::{Mapping, Value};

use crate::error::ContentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    RichText,
    DateTime,
    Number,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::RichText => "rich-text",
            FieldKind::DateTime => "datetime",
            FieldKind::Number => "number",
        }
    }
}

/// One frontmatter field. The validator and the CMS mirror both read these
/// declarations, so a field added here shows up in both places.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub is_title: bool,
}

impl FieldSpec {
    const fn required(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: true,
            is_title: false,
        }
    }

    const fn optional(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            is_title: false,
        }
    }

    const fn title() -> Self {
        Self {
            name: "title",
            label: "Title",
            kind: FieldKind::String,
            required: true,
            is_title: true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CollectionSpec {
    /// Directory name under the content root, also the collection key.
    pub name: &'static str,
    pub cms_name: &'static str,
    pub label: &'static str,
    pub fields: &'static [FieldSpec],
}

pub trait Schema: DeserializeOwned + Serialize {
    const SPEC: CollectionSpec;

    /// Display order of entries within the collection.
    fn compare(&self, other: &Self) -> Ordering;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub title: String,
    pub description: String,
    #[serde(deserialize_with = "deserialize_date")]
    pub published_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical: Option<String>,
}

impl Schema for Post {
    const SPEC: CollectionSpec = CollectionSpec {
        name: "blog",
        cms_name: "post",
        label: "Blog Posts",
        fields: &[
            FieldSpec::title(),
            FieldSpec::required("description", "Description", FieldKind::RichText),
            FieldSpec::required("publishedAt", "Published at", FieldKind::DateTime),
            FieldSpec::optional("canonical", "Canonical link", FieldKind::String),
        ],
    };

    // newest first
    fn compare(&self, other: &Self) -> Ordering {
        other.published_at.cmp(&self.published_at)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideProject {
    pub title: String,
    pub description: String,
    pub repo: String,
    pub url: String,
    pub order: i64,
}

impl Schema for SideProject {
    const SPEC: CollectionSpec = CollectionSpec {
        name: "side-projects",
        cms_name: "sideProject",
        label: "Side Projects",
        fields: &[
            FieldSpec::title(),
            FieldSpec::required("description", "Description", FieldKind::RichText),
            FieldSpec::required("repo", "Repo link", FieldKind::String),
            FieldSpec::required("url", "Link", FieldKind::String),
            FieldSpec::required("order", "Position", FieldKind::Number),
        ],
    };

    fn compare(&self, other: &Self) -> Ordering {
        self.order.cmp(&other.order)
    }
}

/// A date as it can appear in frontmatter: a date-formatted string or a
/// native date value (milliseconds since the unix epoch).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DateInput {
    Millis(i64),
    Text(String),
}

impl DateInput {
    pub fn normalize(&self) -> Result<DateTime<Utc>, ContentError> {
        match self {
            DateInput::Millis(ms) => DateTime::<Utc>::from_timestamp_millis(*ms)
                .ok_or_else(|| ContentError::InvalidDate(ms.to_string())),
            DateInput::Text(s) => parse_date(s),
        }
    }
}

impl From<DateTime<Utc>> for DateInput {
    fn from(value: DateTime<Utc>) -> Self {
        DateInput::Millis(value.timestamp_millis())
    }
}

/// Parses RFC 3339 timestamps, naive date-times and bare dates. Values
/// without an offset are taken as UTC, a bare date is UTC midnight.
pub fn parse_date(raw: &str) -> Result<DateTime<Utc>, ContentError> {
    let s = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ContentError::InvalidDate(raw.to_string()))
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let input = DateInput::deserialize(deserializer)?;
    input.normalize().map_err(serde::de::Error::custom)
}

/// Checks a frontmatter document against the collection's field
/// declarations, reporting every violation at once, then converts it into
/// the typed record.
pub fn validate<T: Schema>(frontmatter: Value) -> Result<T, ContentError> {
    let mapping = match &frontmatter {
        Value::Mapping(m) => m.clone(),
        Value::Null => Mapping::new(),
        _ => return Err(ContentError::NotAMapping),
    };

    let violations: Vec<String> = T::SPEC
        .fields
        .iter()
        .filter_map(|field| check_field(field, mapping.get(field.name)))
        .collect();

    if !violations.is_empty() {
        return Err(ContentError::Schema {
            collection: T::SPEC.name,
            violations,
        });
    }

    Ok(serde_yaml::from_value(Value::Mapping(mapping))?)
}

fn check_field(field: &FieldSpec, value: Option<&Value>) -> Option<String> {
    let value = match value {
        None | Some(Value::Null) if field.required => {
            return Some(format!("{} is required", field.name));
        }
        None | Some(Value::Null) => return None,
        Some(v) => v,
    };

    match field.kind {
        FieldKind::String | FieldKind::RichText => match value.as_str() {
            Some(s) if field.required && s.trim().is_empty() => {
                Some(format!("{} must not be empty", field.name))
            }
            Some(_) => None,
            None => Some(format!("{} must be text", field.name)),
        },
        FieldKind::DateTime => {
            let valid = match value {
                Value::String(s) => parse_date(s).is_ok(),
                Value::Number(n) => n
                    .as_i64()
                    .and_then(DateTime::<Utc>::from_timestamp_millis)
                    .is_some(),
                _ => false,
            };
            (!valid).then(|| format!("{} must be a date", field.name))
        }
        FieldKind::Number => value
            .as_i64()
            .is_none()
            .then(|| format!("{} must be an integer", field.name)),
    }
}
