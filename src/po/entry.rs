use std::collections::BTreeMap;

use crate::po::escape::EscapePoExt;

/// One catalog entry: a source string and its translation(s), plus the
/// comment lines that precede it in the file (kept verbatim for round-trip).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Entry {
    pub comments: Vec<String>,
    pub obsolete: bool,
    pub msgctxt: Option<String>,
    pub msgid: String,
    pub msgid_plural: Option<String>,
    pub msgstr: BTreeMap<u32, String>,
}

impl Entry {
    /// Return `true` if this entry is the header entry (empty `msgid` with a
    /// non-empty translation).
    #[must_use]
    pub fn is_header(&self) -> bool {
        self.msgid.is_empty() && self.translation().is_some_and(|s| !s.is_empty())
    }

    /// The singular translation, if present.
    #[must_use]
    pub fn translation(&self) -> Option<&str> {
        self.msgstr.get(&0).map(String::as_str)
    }

    /// Replace the singular translation.
    pub fn set_translation<S: Into<String>>(&mut self, text: S) {
        self.msgstr.insert(0, text.into());
    }

    /// Return `true` if this entry still needs a translation: non-empty
    /// source, empty or whitespace-only translation, and not the header or an
    /// obsolete entry.
    #[must_use]
    pub fn needs_translation(&self) -> bool {
        !self.obsolete
            && !self.msgid.trim().is_empty()
            && self.translation().is_none_or(|s| s.trim().is_empty())
    }

    /// Serialize this entry in PO format, without the trailing blank line.
    pub(crate) fn write_to(&self, out: &mut String) {
        for comment in &self.comments {
            out.push_str(comment);
            out.push('\n');
        }
        if let Some(ctxt) = &self.msgctxt {
            self.write_field(out, "msgctxt", ctxt);
        }
        self.write_field(out, "msgid", &self.msgid);
        if let Some(plural) = &self.msgid_plural {
            self.write_field(out, "msgid_plural", plural);
        }
        if self.msgid_plural.is_some() {
            for (idx, value) in &self.msgstr {
                self.write_field(out, &format!("msgstr[{idx}]"), value);
            }
        } else {
            let empty = String::new();
            let value = self.msgstr.get(&0).unwrap_or(&empty);
            self.write_field(out, "msgstr", value);
        }
    }

    fn write_field(&self, out: &mut String, keyword: &str, value: &str) {
        let prefix = if self.obsolete { "#~ " } else { "" };
        let segments: Vec<&str> = value.split_inclusive('\n').collect();
        if segments.len() <= 1 {
            out.push_str(prefix);
            out.push_str(keyword);
            out.push_str(" \"");
            out.push_str(&value.escape_po());
            out.push_str("\"\n");
        } else {
            // Multiline value: empty first string, one continuation per line.
            out.push_str(prefix);
            out.push_str(keyword);
            out.push_str(" \"\"\n");
            for segment in segments {
                out.push_str(prefix);
                out.push('"');
                out.push_str(&segment.escape_po());
                out.push_str("\"\n");
            }
        }
    }
}
