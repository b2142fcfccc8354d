//! Section registry: maps each declared key to the section that owns it.
//!
//! Sections are external to this crate; they declare their keys, name the INI
//! section header their keys are written under, and accept in-place updates.
//! The registry is built once at startup from the registered sections and is
//! queried read-only afterwards — key ownership never involves runtime
//! reflection over section objects.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::warn;

use crate::schema::{KeySpec, ResolvedConfig};

/// A grouping of related declared keys, owned by the application.
pub trait ConfigSection: Send + Sync {
    /// The `[SECTION]` header this section's keys are written under.
    fn file_section_header(&self) -> &str;

    /// The keys this section declares. Called once at registry construction.
    fn key_specs(&self) -> Vec<KeySpec>;

    /// Deprecated-name to canonical-name pairs for backward compatibility.
    fn alias_table(&self) -> &[(&'static str, &'static str)] {
        &[]
    }

    /// Apply pending raw values to the in-process section state without
    /// touching disk. Called during persistence so in-memory state matches
    /// the pending file content before the write commits.
    fn update_in_place(&self, values: &BTreeMap<String, String>);

    /// The section's current fully-assembled values (defaults merged with any
    /// in-place updates applied so far).
    fn current_values(&self) -> ResolvedConfig;
}

/// Key-to-section lookup table, built once from the registered sections.
pub struct SectionRegistry {
    sections: Vec<Arc<dyn ConfigSection>>,
    owner_by_key: HashMap<String, usize>,
}

impl SectionRegistry {
    pub fn new(sections: Vec<Arc<dyn ConfigSection>>) -> Self {
        let mut owner_by_key = HashMap::new();
        for (i, section) in sections.iter().enumerate() {
            for spec in section.key_specs() {
                if owner_by_key.contains_key(&spec.name) {
                    warn!(
                        key = %spec.name,
                        section = section.file_section_header(),
                        "key already registered by an earlier section, keeping first owner"
                    );
                    continue;
                }
                owner_by_key.insert(spec.name, i);
            }
        }
        SectionRegistry {
            sections,
            owner_by_key,
        }
    }

    pub fn sections(&self) -> &[Arc<dyn ConfigSection>] {
        &self.sections
    }

    /// The section owning `key`, if any section declares it.
    pub fn section_for_key(&self, key: &str) -> Option<&Arc<dyn ConfigSection>> {
        self.owner_by_key.get(key).map(|&i| &self.sections[i])
    }

    /// Every declared key spec, in section registration order.
    pub fn all_key_specs(&self) -> Vec<KeySpec> {
        self.sections
            .iter()
            .flat_map(|section| section.key_specs())
            .collect()
    }

    /// Resolve a possibly-deprecated key name to its canonical form.
    ///
    /// Scans all sections' alias tables and returns the first canonical name
    /// found, or the input unchanged if no section claims it as an alias.
    pub fn canonical_key_name(&self, key: &str) -> String {
        for section in &self.sections {
            for (deprecated, canonical) in section.alias_table() {
                if *deprecated == key {
                    return canonical.to_string();
                }
            }
        }
        key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{test_registry, GeneralSection};

    #[test]
    fn section_for_key_finds_owner() {
        let registry = test_registry();
        let section = registry.section_for_key("SAVE_FAVICON").unwrap();
        assert_eq!(section.file_section_header(), "GENERAL_CONFIG");

        let section = registry.section_for_key("ARCHIVE_DIR").unwrap();
        assert_eq!(section.file_section_header(), "STORAGE_CONFIG");
    }

    #[test]
    fn unknown_key_has_no_owner() {
        let registry = test_registry();
        assert!(registry.section_for_key("NOT_A_KEY").is_none());
    }

    #[test]
    fn duplicate_registration_keeps_first_owner() {
        let registry = SectionRegistry::new(vec![
            Arc::new(GeneralSection::new()),
            Arc::new(GeneralSection::new()),
        ]);
        assert!(registry.section_for_key("SAVE_FAVICON").is_some());
        assert_eq!(registry.sections().len(), 2);
    }

    #[test]
    fn all_key_specs_covers_every_section() {
        let registry = test_registry();
        let names: Vec<String> = registry
            .all_key_specs()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert!(names.contains(&"SAVE_FAVICON".to_string()));
        assert!(names.contains(&"ARCHIVE_DIR".to_string()));
    }

    #[test]
    fn canonical_key_name_resolves_deprecated_names() {
        let registry = test_registry();
        assert_eq!(registry.canonical_key_name("FETCH_FAVICON"), "SAVE_FAVICON");
        assert_eq!(registry.canonical_key_name("URL_BLACKLIST"), "URL_DENYLIST");
    }

    #[test]
    fn canonical_key_name_passes_unknown_through() {
        let registry = test_registry();
        assert_eq!(registry.canonical_key_name("SAVE_FAVICON"), "SAVE_FAVICON");
        assert_eq!(registry.canonical_key_name("MYSTERY"), "MYSTERY");
    }
}
