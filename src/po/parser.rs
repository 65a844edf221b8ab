//! Line-oriented PO file parser.

use thiserror::Error;

use crate::po::entry::Entry;
use crate::po::escape::EscapePoExt;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed catalog at line {line}: {message}")]
    Syntax { line: usize, message: String },
}

impl ParseError {
    fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum Field {
    #[default]
    None,
    Ctxt,
    Id,
    IdPlural,
    Str(u32),
}

#[derive(Default)]
struct EntryBuilder {
    entry: Entry,
    field: Field,
    saw_message: bool,
}

impl EntryBuilder {
    fn in_message(&self) -> bool {
        matches!(self.field, Field::Str(_))
    }

    fn finish(self, entries: &mut Vec<Entry>) {
        // A block with comments but no message lines carries nothing to
        // translate; drop it.
        if self.saw_message {
            entries.push(self.entry);
        }
    }
}

/// Parse the full text of a PO file into entries.
pub(crate) fn parse_entries(text: &str) -> Result<Vec<Entry>, ParseError> {
    let mut entries = Vec::new();
    let mut builder = EntryBuilder::default();

    for (idx, raw_line) in text.lines().enumerate() {
        let line_number = idx + 1;
        let line = raw_line.trim_end_matches('\r').trim();

        if line.is_empty() {
            if builder.saw_message || !builder.entry.comments.is_empty() {
                std::mem::take(&mut builder).finish(&mut entries);
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix("#~") {
            // Obsolete entry: the payload after the marker is a regular
            // message or continuation line. The flag is set after parsing so
            // it lands on the right entry when the line opens a new one.
            parse_message(&mut builder, rest.trim_start(), line_number, &mut entries)?;
            builder.entry.obsolete = true;
        } else if line.starts_with('#') {
            // A comment directly following message lines opens the next entry
            // even without a separating blank line.
            if builder.saw_message {
                std::mem::take(&mut builder).finish(&mut entries);
            }
            builder.entry.comments.push(line.to_string());
        } else if line.starts_with("msg") || line.starts_with('"') {
            parse_message(&mut builder, line, line_number, &mut entries)?;
        } else {
            return Err(ParseError::syntax(line_number, "unrecognized line"));
        }
    }

    builder.finish(&mut entries);
    Ok(entries)
}

fn parse_message(
    builder: &mut EntryBuilder,
    line: &str,
    line_number: usize,
    entries: &mut Vec<Entry>,
) -> Result<(), ParseError> {
    if line.starts_with("msgctxt") || (line.starts_with("msgid") && !line.starts_with("msgid_plural"))
    {
        // A new singular id while the previous entry was already in its
        // msgstr section starts a new entry.
        if builder.in_message() {
            std::mem::take(builder).finish(entries);
        }
    }

    if line.starts_with("msgctxt") {
        builder.field = Field::Ctxt;
        builder.saw_message = true;
        builder.entry.msgctxt = Some(extract_string(line, line_number)?);
    } else if line.starts_with("msgid_plural") {
        builder.field = Field::IdPlural;
        builder.entry.msgid_plural = Some(extract_string(line, line_number)?);
    } else if line.starts_with("msgid") {
        builder.field = Field::Id;
        builder.saw_message = true;
        builder.entry.msgid = extract_string(line, line_number)?;
    } else if let Some(rest) = line.strip_prefix("msgstr[") {
        let idx_end = rest
            .find(']')
            .ok_or_else(|| ParseError::syntax(line_number, "unterminated msgstr index"))?;
        let index: u32 = rest[..idx_end]
            .parse()
            .map_err(|_| ParseError::syntax(line_number, "invalid msgstr index"))?;
        if !builder.saw_message {
            return Err(ParseError::syntax(line_number, "msgstr without msgid"));
        }
        builder.field = Field::Str(index);
        builder
            .entry
            .msgstr
            .insert(index, extract_string(line, line_number)?);
    } else if line.starts_with("msgstr") {
        if !builder.saw_message {
            return Err(ParseError::syntax(line_number, "msgstr without msgid"));
        }
        builder.field = Field::Str(0);
        builder
            .entry
            .msgstr
            .insert(0, extract_string(line, line_number)?);
    } else if line.starts_with('"') {
        let piece = extract_string(line, line_number)?;
        match builder.field {
            Field::None => {
                return Err(ParseError::syntax(
                    line_number,
                    "string continuation without a preceding keyword",
                ));
            }
            Field::Ctxt => {
                if let Some(ctxt) = &mut builder.entry.msgctxt {
                    ctxt.push_str(&piece);
                }
            }
            Field::Id => builder.entry.msgid.push_str(&piece),
            Field::IdPlural => {
                if let Some(plural) = &mut builder.entry.msgid_plural {
                    plural.push_str(&piece);
                }
            }
            Field::Str(index) => {
                if let Some(value) = builder.entry.msgstr.get_mut(&index) {
                    value.push_str(&piece);
                }
            }
        }
    } else {
        return Err(ParseError::syntax(line_number, "unrecognized message line"));
    }
    Ok(())
}

/// Extract the quoted payload of a message line and decode PO escapes.
fn extract_string(line: &str, line_number: usize) -> Result<String, ParseError> {
    let start = line
        .find('"')
        .ok_or_else(|| ParseError::syntax(line_number, "expected a quoted string"))?;
    let end = line.rfind('"').unwrap_or(start);
    if start == end {
        return Err(ParseError::syntax(line_number, "unterminated string"));
    }
    Ok(line[start + 1..end].unescape_po())
}
