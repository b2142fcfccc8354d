//! Declared key specs: name, default, type, and alias set.
//!
//! A [`KeySpec`] is declared once by its owning section and is immutable from
//! then on. Defaults are either literals or functions computed from the
//! partially-resolved config; computed defaults name their dependencies
//! explicitly so the resolver can order keys deterministically instead of
//! relying on declaration order.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::ConfigError;
use crate::value::{ConfigValue, ValueType};

/// The flat typed mapping produced by resolution.
pub type ResolvedConfig = BTreeMap<String, ConfigValue>;

/// A default value: a literal, or a function of already-resolved keys.
#[derive(Clone)]
pub enum DefaultValue {
    Literal(ConfigValue),
    Computed {
        /// Keys this default reads from the partially-resolved config.
        /// They are guaranteed to be resolved before this one.
        depends_on: &'static [&'static str],
        compute: fn(&ResolvedConfig) -> ConfigValue,
    },
}

impl std::fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DefaultValue::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            DefaultValue::Computed { depends_on, .. } => f
                .debug_struct("Computed")
                .field("depends_on", depends_on)
                .finish_non_exhaustive(),
        }
    }
}

/// A declared configuration key.
///
/// `value_type: None` marks a read-only key: its value is always the default
/// and the environment and config file are never consulted for it.
#[derive(Debug, Clone)]
pub struct KeySpec {
    pub name: String,
    pub default: DefaultValue,
    pub value_type: Option<ValueType>,
    /// Deprecated names probed after the primary name, in declared order.
    pub aliases: Vec<String>,
}

impl KeySpec {
    /// A typed key with a literal default.
    pub fn new(name: &str, value_type: ValueType, default: ConfigValue) -> Self {
        KeySpec {
            name: name.to_string(),
            default: DefaultValue::Literal(default),
            value_type: Some(value_type),
            aliases: Vec::new(),
        }
    }

    /// A read-only key: always serves its default, never reads sources.
    pub fn read_only(name: &str, default: DefaultValue) -> Self {
        KeySpec {
            name: name.to_string(),
            default,
            value_type: None,
            aliases: Vec::new(),
        }
    }

    /// A typed key whose default is computed from other keys.
    pub fn computed(
        name: &str,
        value_type: Option<ValueType>,
        depends_on: &'static [&'static str],
        compute: fn(&ResolvedConfig) -> ConfigValue,
    ) -> Self {
        KeySpec {
            name: name.to_string(),
            default: DefaultValue::Computed {
                depends_on,
                compute,
            },
            value_type,
            aliases: Vec::new(),
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    /// Probe names in precedence order: primary name first, then aliases.
    pub fn probe_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// Order specs so every computed default's dependencies come first.
///
/// Dependencies that name no spec in the list are assumed to be satisfied
/// externally and don't constrain the order. A cycle among computed defaults
/// is a schema error.
pub fn dependency_order(specs: &[KeySpec]) -> Result<Vec<&KeySpec>, ConfigError> {
    let index: HashMap<&str, usize> = specs
        .iter()
        .enumerate()
        .map(|(i, spec)| (spec.name.as_str(), i))
        .collect();

    let mut ordered = Vec::with_capacity(specs.len());
    let mut done = vec![false; specs.len()];
    let mut in_progress = HashSet::new();

    fn visit<'a>(
        i: usize,
        specs: &'a [KeySpec],
        index: &HashMap<&str, usize>,
        done: &mut [bool],
        in_progress: &mut HashSet<usize>,
        ordered: &mut Vec<&'a KeySpec>,
    ) -> Result<(), ConfigError> {
        if done[i] {
            return Ok(());
        }
        if !in_progress.insert(i) {
            return Err(ConfigError::DependencyCycle(specs[i].name.clone()));
        }
        if let DefaultValue::Computed { depends_on, .. } = &specs[i].default {
            for dep in *depends_on {
                if let Some(&j) = index.get(dep) {
                    visit(j, specs, index, done, in_progress, ordered)?;
                }
            }
        }
        in_progress.remove(&i);
        done[i] = true;
        ordered.push(&specs[i]);
        Ok(())
    }

    for i in 0..specs.len() {
        visit(i, specs, &index, &mut done, &mut in_progress, &mut ordered)?;
    }
    Ok(ordered)
}
