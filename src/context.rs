//! Explicit configuration context: the one object the rest of the application
//! holds to read and write config.
//!
//! Owns the section registry and the config file location, with explicit
//! construction instead of ambient process globals. Built once at startup,
//! rebuilt only on an explicit reload.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::persist;
use crate::registry::SectionRegistry;
use crate::resolve::{resolve, Resolution, ResolveInput};
use crate::schema::ResolvedConfig;
use crate::sources::{environment_snapshot, read_config_file, RawSourceMap};

/// Config file name inside the data directory.
pub const CONFIG_FILENAME: &str = "Webstash.conf";

/// Application handle for layered config resolution and persistence.
pub struct ConfigContext {
    registry: SectionRegistry,
    config_path: PathBuf,
}

impl ConfigContext {
    pub fn new(registry: SectionRegistry, config_path: impl Into<PathBuf>) -> Self {
        ConfigContext {
            registry,
            config_path: config_path.into(),
        }
    }

    /// Context rooted at the platform data directory
    /// (e.g. `~/.local/share/webstash/` on Linux).
    ///
    /// Returns `None` if no home directory can be determined.
    pub fn in_data_dir(registry: SectionRegistry) -> Option<Self> {
        let dirs = directories::ProjectDirs::from("", "", "webstash")?;
        Some(Self::new(
            registry,
            dirs.data_dir().join(CONFIG_FILENAME),
        ))
    }

    pub fn registry(&self) -> &SectionRegistry {
        &self.registry
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Resolve all declared keys from environment, config file, and defaults.
    pub fn load(&self) -> Result<Resolution, ConfigError> {
        self.load_with_overrides(RawSourceMap::new())
    }

    /// Like [`load`](Self::load), with explicit overrides at the highest
    /// precedence (e.g. values from CLI flags).
    pub fn load_with_overrides(
        &self,
        overrides: RawSourceMap,
    ) -> Result<Resolution, ConfigError> {
        let file_vars = read_config_file(&self.config_path)?.unwrap_or_default();
        let input = ResolveInput {
            overrides,
            env: environment_snapshot(),
            file_vars,
        };
        resolve(&self.registry.all_key_specs(), &input)
    }

    /// The fully-assembled default configuration: every section's current
    /// values merged into one flat mapping, later sections winning.
    pub fn load_all_defaults(&self) -> ResolvedConfig {
        let mut flat = ResolvedConfig::new();
        for section in self.registry.sections() {
            flat.extend(section.current_values());
        }
        flat
    }

    /// Persist a change set to the config file, atomically with rollback.
    ///
    /// Deprecated key names are canonicalized before writing, so
    /// `FETCH_FAVICON=no` lands in the file as its current name.
    pub fn persist(
        &self,
        changes: &BTreeMap<String, String>,
    ) -> Result<ResolvedConfig, ConfigError> {
        let canonical: BTreeMap<String, String> = changes
            .iter()
            .map(|(key, value)| (self.registry.canonical_key_name(key), value.clone()))
            .collect();
        persist::persist(
            &canonical,
            &self.registry,
            &self.config_path,
            &environment_snapshot(),
        )
    }

    /// Resolve a possibly-deprecated key name to its canonical form.
    pub fn canonical_key_name(&self, key: &str) -> String {
        self.registry.canonical_key_name(key)
    }
}
