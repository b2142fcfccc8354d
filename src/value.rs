//! Typed config values and raw-string coercion.
//!
//! Every value read from the environment or the config file arrives as a raw
//! string. [`coerce`] turns it into a [`ConfigValue`] according to the key's
//! declared [`ValueType`], or rejects it with
//! [`InvalidValue`](crate::ConfigError::InvalidValue). The grammar is strict on
//! purpose: booleans accept only a small token set, integers must be all
//! digits, and a string key rejects anything that looks like a boolean so that
//! `"False"` the string can never be silently confused with `false` the bool.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::ConfigError;

/// Boolean tokens accepted (case-insensitively) as `true`.
pub const BOOL_TRUEIES: [&str; 3] = ["true", "yes", "1"];
/// Boolean tokens accepted (case-insensitively) as `false`.
pub const BOOL_FALSEIES: [&str; 3] = ["false", "no", "0"];

fn looks_like_bool(lowered: &str) -> bool {
    BOOL_TRUEIES.contains(&lowered) || BOOL_FALSEIES.contains(&lowered)
}

/// The closed set of types a declared key can carry.
///
/// A key declared *without* a type is read-only: its value always comes from
/// the default and the environment and config file are never consulted for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Bool,
    Int,
    Str,
    Path,
    List,
    Dict,
}

impl ValueType {
    /// Human-readable expectation string, used in coercion error messages.
    pub fn expected(self) -> &'static str {
        match self {
            ValueType::Bool => "a boolean: True/False",
            ValueType::Int => "an integer",
            ValueType::Str => "a string",
            ValueType::Path => "a filesystem path",
            ValueType::List => "a JSON array",
            ValueType::Dict => "a JSON object",
        }
    }
}

/// A fully-resolved, typed configuration value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Str(String),
    Path(PathBuf),
    List(Vec<serde_json::Value>),
    Dict(serde_json::Map<String, serde_json::Value>),
}

impl ConfigValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&std::path::Path> {
        match self {
            ConfigValue::Path(p) => Some(p),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Bool(b) => write!(f, "{b}"),
            ConfigValue::Int(i) => write!(f, "{i}"),
            ConfigValue::Str(s) => write!(f, "{s}"),
            ConfigValue::Path(p) => write!(f, "{}", p.display()),
            ConfigValue::List(l) => {
                write!(f, "{}", serde_json::Value::Array(l.clone()))
            }
            ConfigValue::Dict(d) => {
                write!(f, "{}", serde_json::Value::Object(d.clone()))
            }
        }
    }
}

/// Coerce a raw string into a typed value for the key named `key`.
///
/// `key` is only used to build the error; the grammar depends solely on `ty`:
///
/// - `Bool` — case-insensitive `true`/`yes`/`1` or `false`/`no`/`0`.
/// - `Int` — the trimmed value must consist solely of ASCII digits.
/// - `Str` — trimmed; rejected if it case-insensitively matches a boolean token.
/// - `Path` — any non-empty string, wrapped without an existence check.
/// - `List` / `Dict` — the value must be valid JSON of the matching shape.
pub fn coerce(key: &str, raw: &str, ty: ValueType) -> Result<ConfigValue, ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
        expected: ty.expected(),
    };

    match ty {
        ValueType::Bool => {
            let lowered = raw.trim().to_ascii_lowercase();
            if BOOL_TRUEIES.contains(&lowered.as_str()) {
                Ok(ConfigValue::Bool(true))
            } else if BOOL_FALSEIES.contains(&lowered.as_str()) {
                Ok(ConfigValue::Bool(false))
            } else {
                Err(invalid())
            }
        }
        ValueType::Str => {
            let trimmed = raw.trim();
            if looks_like_bool(&trimmed.to_ascii_lowercase()) {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: raw.to_string(),
                    expected: "a string, but value looks like a boolean",
                });
            }
            Ok(ConfigValue::Str(trimmed.to_string()))
        }
        ValueType::Int => {
            let trimmed = raw.trim();
            if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            trimmed
                .parse::<i64>()
                .map(ConfigValue::Int)
                .map_err(|_| invalid())
        }
        ValueType::Path => {
            if raw.is_empty() {
                return Err(invalid());
            }
            Ok(ConfigValue::Path(PathBuf::from(raw)))
        }
        ValueType::List => serde_json::from_str::<Vec<serde_json::Value>>(raw)
            .map(ConfigValue::List)
            .map_err(|_| invalid()),
        ValueType::Dict => {
            serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(raw)
                .map(ConfigValue::Dict)
                .map_err(|_| invalid())
        }
    }
}
