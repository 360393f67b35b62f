//! Typed parameter files.
//!
//! Every parameter is an inline table holding its value and declared type:
//!
//! ```toml
//! [estimator.kalman]
//! dt = { val = 0.1, type = "float" }
//! ```
//!
//! Any other table is a section. Parameters are stored flat, keyed by their
//! dotted path (`estimator.kalman.dt`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use toml::{Table, Value};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Error deserializing parameters")]
    Deserialize(#[from] toml::de::Error),

    #[error("Malformed parameter '{path}'")]
    Malformed { path: String },

    #[error("Parameter '{path}' not found")]
    NotFound { path: String },

    #[error("Parameter '{path}' is {found}, expected {expected}")]
    WrongType {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("'{path}' is a section, not a parameter")]
    NotAParameter { path: String },

    #[error("'{path}' is a parameter, not a section")]
    NotASection { path: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ParameterValue {
    #[serde(rename = "bool")]
    Bool { val: bool },
    #[serde(rename = "int")]
    Int { val: i64 },
    #[serde(rename = "float")]
    Float { val: f64 },
    #[serde(rename = "float[]")]
    FloatArray { val: Vec<f64> },
}

impl ParameterValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool { .. } => bool::TYPE_NAME,
            Self::Int { .. } => i64::TYPE_NAME,
            Self::Float { .. } => f64::TYPE_NAME,
            Self::FloatArray { .. } => <Vec<f64>>::TYPE_NAME,
        }
    }
}

/// Rust types a parameter value can be read as.
pub trait FromParameter: Sized {
    const TYPE_NAME: &'static str;

    fn from_parameter(value: &ParameterValue) -> Option<Self>;
}

impl FromParameter for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_parameter(value: &ParameterValue) -> Option<Self> {
        match value {
            ParameterValue::Bool { val } => Some(*val),
            _ => None,
        }
    }
}

impl FromParameter for i64 {
    const TYPE_NAME: &'static str = "int";

    fn from_parameter(value: &ParameterValue) -> Option<Self> {
        match value {
            ParameterValue::Int { val } => Some(*val),
            _ => None,
        }
    }
}

impl FromParameter for f64 {
    const TYPE_NAME: &'static str = "float";

    fn from_parameter(value: &ParameterValue) -> Option<Self> {
        match value {
            ParameterValue::Float { val } => Some(*val),
            _ => None,
        }
    }
}

impl FromParameter for Vec<f64> {
    const TYPE_NAME: &'static str = "float[]";

    fn from_parameter(value: &ParameterValue) -> Option<Self> {
        match value {
            ParameterValue::FloatArray { val } => Some(val.clone()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterSet {
    values: BTreeMap<String, ParameterValue>,
}

impl ParameterSet {
    pub fn parse(toml_str: &str) -> Result<Self, Error> {
        let table = toml::from_str::<Table>(toml_str)?;

        let mut values = BTreeMap::new();
        flatten(table, "", &mut values)?;

        Ok(ParameterSet { values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All parameters, ordered by path.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn value(&self, path: &str) -> Result<&ParameterValue, Error> {
        match self.values.get(path) {
            Some(value) => Ok(value),
            None if self.has_section(path) => Err(Error::NotAParameter {
                path: path.to_string(),
            }),
            None => Err(Error::NotFound {
                path: path.to_string(),
            }),
        }
    }

    pub fn get<T: FromParameter>(&self, path: &str) -> Result<T, Error> {
        let value = self.value(path)?;

        T::from_parameter(value).ok_or_else(|| Error::WrongType {
            path: path.to_string(),
            expected: T::TYPE_NAME,
            found: value.type_name(),
        })
    }

    pub fn section(&self, path: &str) -> Result<Section<'_>, Error> {
        if self.values.contains_key(path) {
            return Err(Error::NotASection {
                path: path.to_string(),
            });
        }
        if !self.has_section(path) {
            return Err(Error::NotFound {
                path: path.to_string(),
            });
        }

        Ok(Section {
            set: self,
            path: path.to_string(),
        })
    }

    fn has_section(&self, path: &str) -> bool {
        let prefix = format!("{path}.");

        self.values
            .range(prefix.clone()..)
            .next()
            .is_some_and(|(key, _)| key.starts_with(&prefix))
    }
}

/// View on the parameters below a dotted path. Keys passed to a section are
/// relative to it and may themselves be dotted.
#[derive(Debug, Clone)]
pub struct Section<'a> {
    set: &'a ParameterSet,
    path: String,
}

impl Section<'_> {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn get<T: FromParameter>(&self, key: &str) -> Result<T, Error> {
        self.set.get(&self.join(key))
    }

    pub fn section(&self, key: &str) -> Result<Section<'_>, Error> {
        self.set.section(&self.join(key))
    }

    fn join(&self, key: &str) -> String {
        format!("{}.{key}", self.path)
    }
}

fn flatten(
    table: Table,
    prefix: &str,
    out: &mut BTreeMap<String, ParameterValue>,
) -> Result<(), Error> {
    for (key, val) in table {
        let path = if prefix.is_empty() {
            key
        } else {
            format!("{prefix}.{key}")
        };

        let Value::Table(inner) = val else {
            return Err(Error::Malformed { path });
        };

        if inner.contains_key("type") {
            match inner.try_into::<ParameterValue>() {
                Ok(value) => {
                    out.insert(path, value);
                }
                Err(_) => return Err(Error::Malformed { path }),
            }
        } else {
            flatten(inner, &path, out)?;
        }
    }

    Ok(())
}
