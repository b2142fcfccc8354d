//! In-memory INI document: ordered sections, ordered case-sensitive keys.
//!
//! Persistence does a full-file rewrite, so the document keeps comments and
//! blank lines in place: a user's hand-written annotations survive a
//! `config --set` round trip. Parsing accepts `key = value` and `key: value`
//! assignments and `#`/`;` comments. Keys are stored exactly as written.

use std::fmt;

use crate::error::ConfigError;

/// One line inside a section body.
#[derive(Debug, Clone, PartialEq)]
enum SectionLine {
    Entry { key: String, value: String },
    /// A comment or blank line, kept verbatim.
    Raw(String),
}

/// A named `[section]` and its body lines in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct IniSection {
    name: String,
    lines: Vec<SectionLine>,
}

impl IniSection {
    fn new(name: &str) -> Self {
        IniSection {
            name: name.to_string(),
            lines: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key/value pairs in file order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.lines.iter().filter_map(|line| match line {
            SectionLine::Entry { key, value } => Some((key.as_str(), value.as_str())),
            SectionLine::Raw(_) => None,
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Overwrite an existing entry in place, or append a new one.
    pub fn set(&mut self, key: &str, value: &str) {
        for line in &mut self.lines {
            if let SectionLine::Entry { key: k, value: v } = line
                && k.as_str() == key
            {
                *v = value.to_string();
                return;
            }
        }
        self.lines.push(SectionLine::Entry {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
}

/// A parsed INI file. Sections keep their file order; serializing writes the
/// whole document back out, comments included.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IniDocument {
    /// Comment and blank lines before the first section header.
    preamble: Vec<String>,
    sections: Vec<IniSection>,
}

impl IniDocument {
    /// Parse INI text. Assignments before any `[section]` header and lines
    /// that are neither headers, assignments, comments, nor blank are errors.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut doc = IniDocument::default();

        for (i, line) in text.lines().enumerate() {
            let trimmed = line.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
                match doc.sections.last_mut() {
                    Some(section) => section.lines.push(SectionLine::Raw(line.to_string())),
                    None => doc.preamble.push(line.to_string()),
                }
                continue;
            }

            if let Some(name) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                doc.sections.push(IniSection::new(name.trim()));
                continue;
            }

            let split = trimmed
                .split_once('=')
                .or_else(|| trimmed.split_once(':'));
            let Some((key, value)) = split else {
                return Err(ConfigError::IniParse {
                    line: i + 1,
                    text: line.to_string(),
                });
            };

            let Some(section) = doc.sections.last_mut() else {
                // assignment before any [section] header
                return Err(ConfigError::IniParse {
                    line: i + 1,
                    text: line.to_string(),
                });
            };
            section.lines.push(SectionLine::Entry {
                key: key.trim().to_string(),
                value: value.trim().to_string(),
            });
        }

        Ok(doc)
    }

    pub fn sections(&self) -> impl Iterator<Item = &IniSection> {
        self.sections.iter()
    }

    pub fn section(&self, name: &str) -> Option<&IniSection> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Get a section by name, appending an empty one if it doesn't exist yet.
    pub fn section_mut_or_insert(&mut self, name: &str) -> &mut IniSection {
        if let Some(pos) = self.sections.iter().position(|s| s.name == name) {
            return &mut self.sections[pos];
        }
        self.sections.push(IniSection::new(name));
        self.sections.last_mut().unwrap()
    }
}

impl fmt::Display for IniDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.preamble {
            writeln!(f, "{line}")?;
        }
        for section in &self.sections {
            writeln!(f, "[{}]", section.name)?;
            for line in &section.lines {
                match line {
                    SectionLine::Entry { key, value } => writeln!(f, "{key} = {value}")?,
                    SectionLine::Raw(raw) => writeln!(f, "{raw}")?,
                }
            }
        }
        Ok(())
    }
}
