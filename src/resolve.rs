//! Core resolution pipeline: walk the precedence chain for every declared key.
//!
//! Operates on pre-loaded data (`ResolveInput`) with no I/O, making the full
//! pipeline testable with synthetic inputs. Precedence is strict:
//!
//! ```text
//! Compiled defaults     literal or computed from earlier-resolved keys
//!        ↑ overridden by
//! Config file vars      probed under primary name, then each alias
//!        ↑ overridden by
//! Environment vars      probed under primary name, then each alias
//!        ↑ overridden by
//! Explicit overrides    e.g. CLI flags (highest priority)
//! ```
//!
//! Resolution is partial-failure by design: one malformed value produces a
//! per-key error and the key falls back to its default, while every other key
//! resolves normally. A typo in one setting never makes the whole tool
//! unusable.

use tracing::warn;

use crate::error::ConfigError;
use crate::schema::{dependency_order, DefaultValue, KeySpec, ResolvedConfig};
use crate::sources::RawSourceMap;
use crate::value::coerce;

/// All pre-loaded data needed to resolve a config. No I/O happens here.
#[derive(Debug, Default)]
pub struct ResolveInput {
    /// Explicit raw-string overrides, highest priority.
    pub overrides: RawSourceMap,
    /// Environment snapshot (pass [`environment_snapshot`](crate::sources::environment_snapshot)
    /// or synthetic data).
    pub env: RawSourceMap,
    /// Flattened config-file variables, keys upper-cased.
    pub file_vars: RawSourceMap,
}

/// The outcome of one resolution pass: the typed mapping plus every per-key
/// error encountered along the way.
#[derive(Debug)]
pub struct Resolution {
    pub values: ResolvedConfig,
    pub errors: Vec<ConfigError>,
}

impl Resolution {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Probe a source under each name in declared order; empty values are absent.
fn probe<'a>(source: &'a RawSourceMap, names: impl Iterator<Item = String>) -> Option<&'a str> {
    for name in names {
        if let Some(value) = source.get(&name)
            && !value.is_empty()
        {
            return Some(value);
        }
    }
    None
}

fn default_for(spec: &KeySpec, partial: &ResolvedConfig) -> crate::value::ConfigValue {
    match &spec.default {
        DefaultValue::Literal(value) => value.clone(),
        DefaultValue::Computed { compute, .. } => compute(partial),
    }
}

/// Resolve every declared key against the precedence chain.
///
/// Keys with computed defaults are resolved after their declared dependencies
/// (see [`dependency_order`]); a dependency cycle fails the whole pass since
/// it is a schema error, not a user input error. Read-only keys (no declared
/// type) are served from their default without consulting any source.
pub fn resolve(specs: &[KeySpec], input: &ResolveInput) -> Result<Resolution, ConfigError> {
    let ordered = dependency_order(specs)?;

    let mut values = ResolvedConfig::new();
    let mut errors = Vec::new();

    for spec in ordered {
        let Some(ty) = spec.value_type else {
            // read-only key: sources are never consulted
            let value = default_for(spec, &values);
            values.insert(spec.name.clone(), value);
            continue;
        };

        let exact = || spec.probe_names().map(str::to_string);
        let upper = || spec.probe_names().map(str::to_ascii_uppercase);
        let raw = probe(&input.overrides, exact())
            .or_else(|| probe(&input.env, exact()))
            .or_else(|| probe(&input.file_vars, upper()));

        let value = match raw {
            Some(raw) => match coerce(&spec.name, raw, ty) {
                Ok(value) => value,
                Err(e) => {
                    warn!(key = %spec.name, error = %e, "config value failed coercion, using default");
                    errors.push(e);
                    default_for(spec, &values)
                }
            },
            None => default_for(spec, &values),
        };
        values.insert(spec.name.clone(), value);
    }

    Ok(Resolution { values, errors })
}
