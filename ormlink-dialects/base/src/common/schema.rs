use std::collections::BTreeMap;

use itertools::Itertools;
use ormlink_core::data::DataType;
use serde::{Deserialize, Serialize};

pub const TAG_TYPE: &str = "TYPE";
pub const TAG_SIZE: &str = "SIZE";
pub const TAG_PRIMARY_KEY: &str = "PRIMARY_KEY";
pub const TAG_AUTO_INCREMENT: &str = "AUTO_INCREMENT";
pub const TAG_NOT_NULL: &str = "NOT NULL";
pub const TAG_UNIQUE: &str = "UNIQUE";
pub const TAG_DEFAULT: &str = "DEFAULT";

/// Field-level settings declared as `KEY:VALUE;FLAG` pairs.
///
/// Keys are case-insensitive and stored upper-cased. A flag declared
/// without a value is stored with its own (upper-cased) key as the value,
/// so `auto_increment` reads back as `AUTO_INCREMENT`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TagSettings(BTreeMap<String, String>);

impl TagSettings {
    pub fn parse(tags: &str) -> Self {
        let mut settings = BTreeMap::new();

        for tag in tags.split(';') {
            let mut parts = tag.splitn(2, ':');
            let key = match parts.next().map(|k| k.trim().to_uppercase()) {
                Some(k) if !k.is_empty() => k,
                _ => continue,
            };
            let value = match parts.next().map(str::trim) {
                Some(v) if !v.is_empty() => v.to_string(),
                _ => key.clone(),
            };

            settings.insert(key, value);
        }

        Self(settings)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(&key.to_uppercase()).map(|s| s.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(&key.to_uppercase())
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(key.to_uppercase(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for TagSettings {
    fn from(tags: String) -> Self {
        Self::parse(&tags)
    }
}

impl From<&str> for TagSettings {
    fn from(tags: &str) -> Self {
        Self::parse(tags)
    }
}

impl From<TagSettings> for String {
    fn from(tags: TagSettings) -> Self {
        tags.0
            .into_iter()
            .map(|(k, v)| if k == v { k } else { format!("{}:{}", k, v) })
            .join(";")
    }
}

/// The schema of a single column of a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// The column name
    pub name: String,
    /// The semantic type of the column
    pub r#type: DataType,
    #[serde(default)]
    pub tags: TagSettings,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, r#type: DataType) -> Self {
        Self {
            name: name.into(),
            r#type,
            tags: TagSettings::default(),
        }
    }

    pub fn with_tags(mut self, tags: &str) -> Self {
        self.tags = TagSettings::parse(tags);
        self
    }

    /// Columns named `id` are primary keys unless declared otherwise
    pub fn is_primary_key(&self) -> bool {
        self.tags.contains(TAG_PRIMARY_KEY) || self.name.eq_ignore_ascii_case("id")
    }

    /// The value of the AUTO_INCREMENT tag, if present.
    ///
    /// This is either the `AUTO_INCREMENT` placeholder or the name of a
    /// native sequence to draw values from.
    pub fn auto_increment(&self) -> Option<&str> {
        self.tags.get(TAG_AUTO_INCREMENT)
    }

    /// An explicit SQL type overriding the dialect's mapping
    pub fn sql_type_override(&self) -> Option<&str> {
        self.tags.get(TAG_TYPE)
    }

    /// The declared size of the column, from the SIZE tag or the type's options
    pub fn size(&self) -> Option<u32> {
        self.tags
            .get(TAG_SIZE)
            .and_then(|s| s.trim().parse().ok())
            .or_else(|| self.r#type.as_utf8_string().and_then(|opts| opts.length))
    }

    /// Column constraints appended after the SQL type
    pub fn additional_type(&self) -> String {
        let mut parts = vec![];

        if self.tags.contains(TAG_NOT_NULL) {
            parts.push("NOT NULL".to_string());
        }

        if self.tags.contains(TAG_UNIQUE) {
            parts.push("UNIQUE".to_string());
        }

        if let Some(default) = self.tags.get(TAG_DEFAULT) {
            if default != TAG_DEFAULT {
                parts.push(format!("DEFAULT {}", default));
            }
        }

        parts.join(" ")
    }
}

/// The schema of a model's table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub fields: Vec<FieldSchema>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>, fields: Vec<FieldSchema>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn primary_fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields.iter().filter(|f| f.is_primary_key())
    }
}
