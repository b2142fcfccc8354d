//! Config persistence: atomic, backed-up read-modify-write of the INI file.
//!
//! A change set is merged into the parsed document section by section, the
//! whole file is rewritten, and the result is validated by re-running full
//! resolution. Before any mutation the current file bytes are copied to a
//! `.bak` sibling; a failed write-and-validate cycle restores the file from
//! it byte-for-byte, so the on-disk config is never left in a state the
//! application cannot parse. On a crash mid-write the `.bak` stays behind as
//! a recovery artifact.
//!
//! There is no cross-process locking: two concurrent writers race on the
//! config file and its `.bak` sibling, last full rewrite wins. Callers that
//! need multi-process safety must hold an external lock around [`persist`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::ini::IniDocument;
use crate::registry::{ConfigSection, SectionRegistry};
use crate::resolve::{resolve, ResolveInput};
use crate::schema::ResolvedConfig;
use crate::sources::{read_config_file, RawSourceMap};

/// Comment block written when the config file is first created.
pub const CONFIG_HEADER: &str = "\
# This is the config file for your webstash archive.
#
# You can add options here manually in INI format, or automatically by running:
#    webstash config --set KEY=VALUE
#
# If you modify this file manually, make sure to reindex your archive after:
#    webstash init
#
# A list of all possible config options with documentation and examples:
#    https://github.com/webstash/webstash/wiki/Configuration

";

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> ConfigError + '_ {
    move |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// The `.bak` sibling holding the pre-write file bytes.
///
/// Created before any mutation. Removed only after a successful validated
/// write; on failure the original bytes are restored from it and the sibling
/// is left behind for inspection.
struct Backup {
    config_path: PathBuf,
    bak_path: PathBuf,
}

impl Backup {
    fn create(config_path: &Path, original: &str) -> Result<Self, ConfigError> {
        let mut bak = config_path.as_os_str().to_os_string();
        bak.push(".bak");
        let bak_path = PathBuf::from(bak);
        std::fs::write(&bak_path, original).map_err(io_err(&bak_path))?;
        Ok(Backup {
            config_path: config_path.to_path_buf(),
            bak_path,
        })
    }

    /// Restore the config file from the backup, byte-for-byte.
    fn restore(&self) -> Result<(), ConfigError> {
        let original = std::fs::read_to_string(&self.bak_path).map_err(io_err(&self.bak_path))?;
        std::fs::write(&self.config_path, original).map_err(io_err(&self.config_path))
    }

    fn remove(self) {
        if let Err(e) = std::fs::remove_file(&self.bak_path) {
            warn!(path = %self.bak_path.display(), error = %e, "failed to remove config backup");
        }
    }
}

/// Persist a set of `key -> raw value` changes to the config file.
///
/// Every change key must be owned by a registered section
/// ([`SectionNotFound`](ConfigError::SectionNotFound) otherwise, before
/// anything is touched). The file is created with [`CONFIG_HEADER`] if absent.
/// After the rewrite, the full configuration is re-resolved against `env` and
/// the new file content; any error rolls the file back and surfaces as
/// [`PersistFailed`](ConfigError::PersistFailed) wrapping the original error.
///
/// Returns the freshly re-resolved typed value for each requested key — the
/// normalized form the resolver produced, not an echo of the input string.
///
/// An empty change set returns immediately without touching the file.
pub fn persist(
    changes: &BTreeMap<String, String>,
    registry: &SectionRegistry,
    config_path: &Path,
    env: &RawSourceMap,
) -> Result<ResolvedConfig, ConfigError> {
    if changes.is_empty() {
        return Ok(ResolvedConfig::new());
    }

    // every change must have an owning section before anything is mutated
    let mut pending: Vec<(&str, &str, &Arc<dyn ConfigSection>)> = Vec::with_capacity(changes.len());
    for (key, raw) in changes {
        let section = registry
            .section_for_key(key)
            .ok_or_else(|| ConfigError::SectionNotFound(key.clone()))?;
        pending.push((key.as_str(), raw.as_str(), section));
    }

    if !config_path.exists() {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err(parent))?;
        }
        std::fs::write(config_path, CONFIG_HEADER).map_err(io_err(config_path))?;
        debug!(path = %config_path.display(), "created config file");
    }

    let original = std::fs::read_to_string(config_path).map_err(io_err(config_path))?;
    let mut doc = IniDocument::parse(&original)?;
    let backup = Backup::create(config_path, &original)?;

    for (key, raw, section) in &pending {
        doc.section_mut_or_insert(section.file_section_header())
            .set(key, raw);
        // keep in-process section state consistent with the pending file
        // content before the disk commit completes
        section.update_in_place(&BTreeMap::from([(key.to_string(), raw.to_string())]));
    }

    match write_and_validate(&doc, registry, config_path, env) {
        Ok(values) => {
            backup.remove();
            debug!(keys = changes.len(), "config changes persisted");
            Ok(changes
                .keys()
                .filter_map(|key| values.get(key).map(|v| (key.clone(), v.clone())))
                .collect())
        }
        Err(e) => {
            if let Err(restore_err) = backup.restore() {
                warn!(error = %restore_err, "failed to restore config file from backup");
            }
            Err(ConfigError::PersistFailed {
                source: Box::new(e),
            })
        }
    }
}

/// Rewrite the whole file and validate it by re-running full resolution.
fn write_and_validate(
    doc: &IniDocument,
    registry: &SectionRegistry,
    config_path: &Path,
    env: &RawSourceMap,
) -> Result<ResolvedConfig, ConfigError> {
    std::fs::write(config_path, doc.to_string()).map_err(io_err(config_path))?;

    let file_vars = read_config_file(config_path)?.unwrap_or_default();
    let input = ResolveInput {
        overrides: RawSourceMap::new(),
        env: env.clone(),
        file_vars,
    };
    let resolution = resolve(&registry.all_key_specs(), &input)?;
    if let Some(e) = resolution.errors.into_iter().next() {
        return Err(e);
    }
    Ok(resolution.values)
}
