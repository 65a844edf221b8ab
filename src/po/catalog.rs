use std::fmt;
use std::path::Path;

use crate::po::entry::Entry;
use crate::po::parser::{parse_entries, ParseError};

/// In-memory representation of one PO catalog file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Catalog {
    pub entries: Vec<Entry>,
}

impl Catalog {
    /// Load and parse a catalog file. Malformed input is an error, never a
    /// partial catalog.
    pub fn parse(path: &Path) -> Result<Self, ParseError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse_str(&text)
    }

    pub fn parse_str(text: &str) -> Result<Self, ParseError> {
        Ok(Self {
            entries: parse_entries(text)?,
        })
    }

    /// Indices of entries that still need a translation, in file order.
    pub fn untranslated_indices(&self) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.needs_translation())
            .map(|(i, _)| i)
            .collect()
    }

    /// Serialize and write the catalog to `path`.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.to_string())
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            entry.write_to(&mut out);
        }
        f.write_str(&out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# Sample catalog
msgid \"\"
msgstr \"\"
\"Language: fr\\n\"

#: src/app.rs:10
msgid \"Hello\"
msgstr \"Bonjour\"

msgid \"Goodbye\"
msgstr \"\"

msgid \"  \"
msgstr \"\"
";

    #[test]
    fn untranslated_selection_skips_header_and_blank_sources() {
        let catalog = Catalog::parse_str(SAMPLE).unwrap();
        assert_eq!(catalog.entries.len(), 4);
        // Only "Goodbye": the header and the translated entry are excluded,
        // as is the whitespace-only msgid.
        assert_eq!(catalog.untranslated_indices(), vec![2]);
    }

    #[test]
    fn selection_is_idempotent_after_translation() {
        let mut catalog = Catalog::parse_str(SAMPLE).unwrap();
        catalog.entries[2].set_translation("Au revoir");
        assert!(catalog.untranslated_indices().is_empty());
    }

    #[test]
    fn serialization_round_trip() {
        let catalog = Catalog::parse_str(SAMPLE).unwrap();
        let rendered = catalog.to_string();
        let reparsed = Catalog::parse_str(&rendered).unwrap();
        assert_eq!(catalog, reparsed);
    }

    #[test]
    fn round_trip_preserves_comments_and_header() {
        let catalog = Catalog::parse_str(SAMPLE).unwrap();
        let rendered = catalog.to_string();
        assert!(rendered.starts_with("# Sample catalog\n"));
        assert!(rendered.contains("#: src/app.rs:10\n"));
        assert!(rendered.contains("\"Language: fr\\n\"\n"));
    }

    #[test]
    fn round_trip_with_escapes_and_plurals() {
        let content = "msgid \"a \\\"quoted\\\" word\"\nmsgstr \"\"\n\nmsgid \"file\"\nmsgid_plural \"files\"\nmsgstr[0] \"\"\nmsgstr[1] \"\"\n";
        let catalog = Catalog::parse_str(content).unwrap();
        let reparsed = Catalog::parse_str(&catalog.to_string()).unwrap();
        assert_eq!(catalog, reparsed);
    }

    #[test]
    fn save_and_parse_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.po");
        let catalog = Catalog::parse_str(SAMPLE).unwrap();
        catalog.save(&path).unwrap();
        let loaded = Catalog::parse(&path).unwrap();
        assert_eq!(catalog, loaded);
    }

    #[test]
    fn parse_missing_file_is_io_error() {
        let err = Catalog::parse(Path::new("/nonexistent/messages.po")).unwrap_err();
        assert!(matches!(err, ParseError::Io(_)));
    }
}
