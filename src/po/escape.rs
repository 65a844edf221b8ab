pub trait EscapePoExt {
    fn escape_po(&self) -> String;
    fn unescape_po(&self) -> String;
}

impl EscapePoExt for str {
    /// Escape special characters in a string for PO file format.
    fn escape_po(&self) -> String {
        let mut out = String::with_capacity(self.len() * 2);
        for ch in self.chars() {
            match ch {
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                _ => out.push(ch),
            }
        }
        out
    }

    /// Unescape special character sequences in a string from a PO file.
    fn unescape_po(&self) -> String {
        let mut out = String::with_capacity(self.len());
        let mut it = self.chars();
        while let Some(ch) = it.next() {
            if ch != '\\' {
                out.push(ch);
                continue;
            }
            match it.next() {
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('t') => out.push('\t'),
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some(other) => {
                    // Unknown escape, keep it as-is
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        }
        out
    }
}
