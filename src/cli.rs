use clap::Parser;

/// Fill in missing translations in gettext .po catalogs with an LLM
/// completion endpoint.
#[derive(Debug, Parser)]
#[command(name = "po-translate", version)]
pub struct Cli {
    /// Comma-separated list of locale codes (e.g. it,es) or 'all'
    #[arg(long, value_name = "LOCALES")]
    pub langs: String,

    /// Use the creative prompt and a higher temperature
    #[arg(long)]
    pub creative: bool,
}
