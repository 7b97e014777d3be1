//! Renaming between canonical contact fields and provider columns.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::workspace_contacts;

pub const NAME: &str = "name";
pub const EMAIL: &str = "email";
pub const ROLE: &str = "role";
pub const OUTLET: &str = "outlet";
pub const GENRE_TAGS: &str = "genre_tags";
pub const LOCATION_CITY: &str = "location_city";
pub const ENRICHMENT_SOURCE: &str = "enrichment_source";

const DEFAULT_COLUMNS: [(&str, &str); 7] = [
    (NAME, "Name"),
    (EMAIL, "Email"),
    (ROLE, "Role"),
    (OUTLET, "Outlet"),
    (GENRE_TAGS, "Genres"),
    (LOCATION_CITY, "City"),
    (ENRICHMENT_SOURCE, "Source"),
];

/// Canonical field name -> provider column name.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMapping(BTreeMap<String, String>);

impl Default for FieldMapping {
    fn default() -> Self {
        Self(
            DEFAULT_COLUMNS
                .iter()
                .map(|(field, column)| (field.to_string(), column.to_string()))
                .collect(),
        )
    }
}

/// A provider record expressed in canonical fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappedContact {
    /// Lower-cased; `None` when missing or blank
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub outlet: Option<String>,
    pub genre_tags: Vec<String>,
    pub location_city: Option<String>,
    pub enrichment_source: Option<String>,
}

impl FieldMapping {
    /// Defaults with per-connection overrides applied. Unknown canonical names are ignored.
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Self {
        let mut mapping = Self::default();
        for (field, column) in overrides {
            if let Some(existing) = mapping.0.get_mut(field) {
                *existing = column.clone();
            }
        }
        mapping
    }

    pub fn column<'a>(&'a self, field: &'a str) -> &'a str {
        self.0.get(field).map(String::as_str).unwrap_or(field)
    }

    /// Provider fields for a workspace contact. Empty values are left out.
    pub fn contact_to_fields(&self, contact: &workspace_contacts::Model) -> Map<String, Value> {
        let mut fields = Map::new();
        let mut put = |field: &str, value: Option<&str>| {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                fields.insert(self.column(field).to_string(), Value::from(value));
            }
        };

        put(NAME, contact.name.as_deref());
        put(EMAIL, Some(contact.email.as_str()));
        put(ROLE, contact.job_title.as_deref());
        put(OUTLET, contact.company.as_deref());
        put(
            LOCATION_CITY,
            contact.metadata.get(LOCATION_CITY).and_then(Value::as_str),
        );
        put(
            ENRICHMENT_SOURCE,
            contact.metadata.get(ENRICHMENT_SOURCE).and_then(Value::as_str),
        );

        let tags = string_list(&contact.tags);
        if !tags.is_empty() {
            fields.insert(self.column(GENRE_TAGS).to_string(), Value::from(tags));
        }
        fields
    }

    pub fn fields_to_contact(&self, fields: &Map<String, Value>) -> MappedContact {
        let text = |field: &str| {
            fields
                .get(self.column(field))
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        MappedContact {
            email: text(EMAIL).map(|email| email.to_lowercase()),
            name: text(NAME),
            role: text(ROLE),
            outlet: text(OUTLET),
            genre_tags: fields
                .get(self.column(GENRE_TAGS))
                .map(string_list)
                .unwrap_or_default(),
            location_city: text(LOCATION_CITY),
            enrichment_source: text(ENRICHMENT_SOURCE),
        }
    }
}

/// A JSON array of strings, or a single string, as a list.
fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Value::String(single) if !single.is_empty() => vec![single.clone()],
        _ => Vec::new(),
    }
}
