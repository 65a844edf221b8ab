//! Minimal gettext PO catalog support: parse a catalog, query and update
//! translations, serialize back.

mod catalog;
mod entry;
mod escape;
mod parser;

pub use catalog::Catalog;
pub use entry::Entry;
pub use escape::EscapePoExt;
pub use parser::ParseError;
