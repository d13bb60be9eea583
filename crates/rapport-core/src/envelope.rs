//! Response envelope normalisation
//!
//! The backend is inconsistent about how it wraps collections: some
//! endpoints return a bare array, others `{ "content": [...] }` (paged
//! lists), `{ "data": [...] }` (savings reports) or a named collection such
//! as `{ "periode": "...", "mouvements": [...] }` (stock movements). Every
//! caller goes through [`Envelope`] instead of checking the shape itself.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Bare(Vec<T>),
    Content {
        content: Vec<T>,
    },
    Data {
        data: Vec<T>,
    },
    Movements {
        mouvements: Vec<T>,
        #[serde(default)]
        periode: Option<String>,
    },
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Decode a response body
    ///
    /// Malformed JSON is a [`Error::Json`]; well-formed JSON in none of the
    /// known shapes is an [`Error::InvalidData`].
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_slice(body)?;
        Self::from_value(value)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let shape = describe_shape(&value);
        serde_json::from_value(value).map_err(|e| {
            Error::InvalidData(format!(
                "unexpected response shape ({}): {}; expected an array or an object with content, data or mouvements",
                shape, e
            ))
        })
    }
}

impl<T> Envelope<T> {
    /// Label the backend attached to the collection, if any
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Movements { periode, .. } => periode.as_deref(),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    pub fn records(&self) -> &[T] {
        match self {
            Self::Bare(records)
            | Self::Content { content: records }
            | Self::Data { data: records }
            | Self::Movements {
                mouvements: records,
                ..
            } => records,
        }
    }

    pub fn into_records(self) -> Vec<T> {
        match self {
            Self::Bare(records)
            | Self::Content { content: records }
            | Self::Data { data: records }
            | Self::Movements {
                mouvements: records,
                ..
            } => records,
        }
    }
}

fn describe_shape(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Array(items) => format!("array of {}", items.len()),
        serde_json::Value::Object(map) => {
            let keys: Vec<&str> = map.keys().map(String::as_str).take(5).collect();
            format!("object with keys [{}]", keys.join(", "))
        }
        serde_json::Value::Null => "null".to_string(),
        other => format!("scalar {}", other),
    }
}
