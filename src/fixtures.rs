//! Shared test fixtures: a small two-section schema exercising every value
//! type, alias fallback, and computed defaults.

pub mod test {
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    use crate::registry::{ConfigSection, SectionRegistry};
    use crate::resolve::{resolve, ResolveInput};
    use crate::schema::{DefaultValue, KeySpec, ResolvedConfig};
    use crate::value::{coerce, ConfigValue, ValueType};

    /// General archiving knobs, written under `[GENERAL_CONFIG]`.
    pub struct GeneralSection {
        applied: Mutex<BTreeMap<String, String>>,
    }

    impl GeneralSection {
        #[allow(clippy::new_without_default)]
        pub fn new() -> Self {
            GeneralSection {
                applied: Mutex::new(BTreeMap::new()),
            }
        }

        /// Raw values applied via `update_in_place`, for assertions.
        pub fn applied(&self) -> BTreeMap<String, String> {
            self.applied.lock().unwrap().clone()
        }
    }

    impl ConfigSection for GeneralSection {
        fn file_section_header(&self) -> &str {
            "GENERAL_CONFIG"
        }

        fn key_specs(&self) -> Vec<KeySpec> {
            vec![
                KeySpec::new("SAVE_FAVICON", ValueType::Bool, ConfigValue::Bool(true))
                    .with_alias("FETCH_FAVICON"),
                KeySpec::new("TIMEOUT", ValueType::Int, ConfigValue::Int(60)),
                KeySpec::new(
                    "OUTPUT_PERMISSIONS",
                    ValueType::Str,
                    ConfigValue::Str("644".into()),
                ),
                KeySpec::new("URL_DENYLIST", ValueType::List, ConfigValue::List(vec![]))
                    .with_alias("URL_BLACKLIST"),
            ]
        }

        fn alias_table(&self) -> &[(&'static str, &'static str)] {
            &[
                ("FETCH_FAVICON", "SAVE_FAVICON"),
                ("URL_BLACKLIST", "URL_DENYLIST"),
            ]
        }

        fn update_in_place(&self, values: &BTreeMap<String, String>) {
            self.applied.lock().unwrap().extend(values.clone());
        }

        fn current_values(&self) -> ResolvedConfig {
            current_values_of(&self.key_specs(), &self.applied())
        }
    }

    /// Storage layout, written under `[STORAGE_CONFIG]`.
    pub struct StorageSection {
        applied: Mutex<BTreeMap<String, String>>,
    }

    impl StorageSection {
        #[allow(clippy::new_without_default)]
        pub fn new() -> Self {
            StorageSection {
                applied: Mutex::new(BTreeMap::new()),
            }
        }
    }

    impl ConfigSection for StorageSection {
        fn file_section_header(&self) -> &str {
            "STORAGE_CONFIG"
        }

        fn key_specs(&self) -> Vec<KeySpec> {
            vec![
                KeySpec::new(
                    "ARCHIVE_DIR",
                    ValueType::Path,
                    ConfigValue::Path("./archive".into()),
                ),
                KeySpec::new("USE_COLOR", ValueType::Bool, ConfigValue::Bool(true)),
                KeySpec::read_only(
                    "VERSION",
                    DefaultValue::Literal(ConfigValue::Str("0.4.0".into())),
                ),
                KeySpec::computed("INDEX_PATH", None, &["ARCHIVE_DIR"], |config| {
                    let dir = config["ARCHIVE_DIR"]
                        .as_path()
                        .unwrap_or_else(|| std::path::Path::new("."));
                    ConfigValue::Path(dir.join("index.json"))
                }),
            ]
        }

        fn update_in_place(&self, values: &BTreeMap<String, String>) {
            self.applied.lock().unwrap().extend(values.clone());
        }

        fn current_values(&self) -> ResolvedConfig {
            current_values_of(&self.key_specs(), &self.applied.lock().unwrap())
        }
    }

    /// Defaults overlaid with applied raw updates, coerced per declared type.
    fn current_values_of(
        specs: &[KeySpec],
        applied: &BTreeMap<String, String>,
    ) -> ResolvedConfig {
        let mut values = resolve(specs, &ResolveInput::default())
            .map(|resolution| resolution.values)
            .unwrap_or_default();
        for (key, raw) in applied {
            if let Some(spec) = specs.iter().find(|s| &s.name == key)
                && let Some(ty) = spec.value_type
                && let Ok(value) = coerce(key, raw, ty)
            {
                values.insert(key.clone(), value);
            }
        }
        values
    }

    /// A registry holding both fixture sections.
    pub fn test_registry() -> SectionRegistry {
        SectionRegistry::new(vec![
            Arc::new(GeneralSection::new()),
            Arc::new(StorageSection::new()),
        ])
    }
}
