use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

id_newtype!(DocumentId);

/// Field carrying the human-facing document number.
pub const FIELD_DISPLAY_ID: &str = "DWDOCID";
/// Field carrying the stored size as a numeric string.
pub const FIELD_SIZE: &str = "DWDOCSIZE";

const SIZE_SCALE: f64 = 1024.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    #[serde(rename = "fieldName")]
    pub name: String,
    #[serde(rename = "item")]
    pub value: String,
}

impl Field {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A stored document as returned by the list endpoint.
///
/// Documents are never edited in place; a refresh replaces the whole list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Document {
    pub fn new(id: impl Into<DocumentId>, fields: Vec<Field>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Returns the value of the first field named exactly `name`.
    ///
    /// Matching is case-sensitive. A missing field is `None`, not an error.
    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.value.as_str())
    }

    pub fn display_id(&self) -> Option<&str> {
        self.field_value(FIELD_DISPLAY_ID)
    }

    /// Size in megabytes derived from `DWDOCSIZE`: the raw value divided by
    /// 1024 and then by 1024 again. Absent, blank or non-numeric sizes give 0.
    pub fn file_size_mb(&self) -> f64 {
        let Some(raw) = self.field_value(FIELD_SIZE) else {
            return 0.0;
        };
        match raw.trim().parse::<f64>() {
            Ok(size) if size.is_finite() => size / SIZE_SCALE / SIZE_SCALE,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
