//! Raw value sources: the process environment and the INI config file.
//!
//! Both readers are side-effect-free and produce plain string maps that the
//! resolver consumes. Keeping them separate from resolution means the full
//! pipeline is testable with synthetic maps and no real environment or disk.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;

use tracing::warn;

use crate::error::ConfigError;
use crate::ini::IniDocument;

/// An immutable snapshot of raw string key/value pairs from one source.
pub type RawSourceMap = HashMap<String, String>;

/// Snapshot the current process environment, keys exactly as given.
pub fn environment_snapshot() -> RawSourceMap {
    std::env::vars().collect()
}

/// Read and flatten the INI config file at `path`.
///
/// Returns `Ok(None)` if the file does not exist or is not readable. All
/// sections are flattened into one map with keys upper-cased; when the same
/// key appears in more than one section the later section wins and a warning
/// is logged.
pub fn read_config_file(path: &Path) -> Result<Option<RawSourceMap>, ConfigError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::PermissionDenied) => {
            return Ok(None);
        }
        Err(e) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    let doc = IniDocument::parse(&text)?;

    let mut vars = RawSourceMap::new();
    for section in doc.sections() {
        for (key, value) in section.entries() {
            let upper = key.to_ascii_uppercase();
            if let Some(previous) = vars.insert(upper, value.to_string())
                && previous != value
            {
                warn!(
                    key,
                    section = section.name(),
                    "config key defined in multiple sections, later section wins"
                );
            }
        }
    }

    Ok(Some(vars))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let result = read_config_file(&dir.path().join("nope.conf")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn keys_are_uppercased_and_flattened() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.conf");
        fs::write(
            &path,
            "[GENERAL]\nsave_favicon = False\n[STORAGE]\nARCHIVE_DIR = /data\n",
        )
        .unwrap();

        let vars = read_config_file(&path).unwrap().unwrap();
        assert_eq!(vars.get("SAVE_FAVICON").map(String::as_str), Some("False"));
        assert_eq!(vars.get("ARCHIVE_DIR").map(String::as_str), Some("/data"));
    }

    #[test]
    fn later_section_wins_on_collision() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.conf");
        fs::write(&path, "[A]\nTIMEOUT = 10\n[B]\nTIMEOUT = 20\n").unwrap();

        let vars = read_config_file(&path).unwrap().unwrap();
        assert_eq!(vars.get("TIMEOUT").map(String::as_str), Some("20"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.conf");
        fs::write(&path, "[A]\ngarbage line\n").unwrap();

        let err = read_config_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::IniParse { line: 2, .. }));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_file_is_none() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.conf");
        fs::write(&path, "[A]\nTIMEOUT = 10\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();

        let result = read_config_file(&path).unwrap();
        assert!(result.is_none());

        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
    }
}
