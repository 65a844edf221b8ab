//! Fill in missing translations in gettext `.po` catalogs by batching
//! untranslated entries and sending them to an LLM completion endpoint.

pub mod batch;
pub mod cli;
pub mod config;
pub mod openai;
pub mod po;
pub mod retry;
pub mod runner;
