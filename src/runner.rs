//! File orchestrator: walks the requested locales, drives the batch
//! reconciler per catalog, and persists results behind a backup rename.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::batch::{build_batches, translate_batch};
use crate::config::{backup_path, Config, CATALOG_FILE_NAME};
use crate::openai::CompletionClient;
use crate::po::Catalog;

/// Directory name reserved for the source-language fallback catalog; never a
/// translation target.
const DEFAULT_LOCALE_DIR: &str = "defaultLocale";

/// Scan the catalog root for locale directories containing a `messages.po`,
/// excluding the configured default locale.
pub fn discover_locales(root: &Path, default_locale: &str) -> Result<Vec<String>> {
    let dir = std::fs::read_dir(root)
        .with_context(|| format!("Failed to read catalog root: {}", root.display()))?;

    let mut locales = Vec::new();
    for entry in dir {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name == default_locale || name == DEFAULT_LOCALE_DIR {
            continue;
        }
        if path.join(CATALOG_FILE_NAME).is_file() {
            locales.push(name.to_string());
        }
    }
    locales.sort();
    Ok(locales)
}

/// Expand the requested locale spec against the discovered locales.
///
/// `all` selects every discovered locale. Otherwise the request is a
/// comma-separated list; codes are trimmed, the default locale is dropped,
/// and any residual code with no discovered catalog fails the run before any
/// file is touched.
pub fn resolve_requested_locales(
    requested: &str,
    available: &[String],
    default_locale: &str,
) -> Result<Vec<String>> {
    if requested.trim() == "all" {
        return Ok(available.to_vec());
    }

    let mut resolved = Vec::new();
    for code in requested.split(',') {
        let code = code.trim();
        if code.is_empty() || code == default_locale || code == DEFAULT_LOCALE_DIR {
            continue;
        }
        if !available.iter().any(|l| l == code) {
            anyhow::bail!("No {CATALOG_FILE_NAME} found for locale: {code}");
        }
        resolved.push(code.to_string());
    }
    // A request that names no translatable locale at all is a mistake, not a
    // no-op run.
    if resolved.is_empty() {
        anyhow::bail!("No translatable locales in request: {requested:?}");
    }
    Ok(resolved)
}

/// Translate every missing entry of one catalog file and persist the result.
///
/// The original file is renamed to `messages.po.bak` (replacing any previous
/// backup) before the updated catalog is written at the original path, so an
/// interrupted run never leaves a half-written catalog.
pub async fn process_file(
    client: &CompletionClient,
    config: &Config,
    path: &Path,
    locale: &str,
    template: &str,
    temperature: f32,
) -> Result<()> {
    let mut catalog = Catalog::parse(path)
        .with_context(|| format!("Failed to parse catalog: {}", path.display()))?;

    let indices = catalog.untranslated_indices();
    if indices.is_empty() {
        info!("'{locale}': no entries to translate");
        return Ok(());
    }
    info!("'{locale}': {} entries to translate", indices.len());

    let batches: Vec<&[usize]> = build_batches(&indices, config.batch_size).collect();
    let total = batches.len();
    let mut produced: Vec<String> = Vec::with_capacity(indices.len());
    let mut failed_batches = 0;
    let mut fallbacks = 0;

    for (n, batch) in batches.iter().enumerate() {
        info!("'{locale}': batch {}/{} ({} strings)", n + 1, total, batch.len());
        let sources: Vec<&str> = batch
            .iter()
            .map(|&i| catalog.entries[i].msgid.as_str())
            .collect();

        let outcome = translate_batch(client, &sources, locale, template, temperature).await;
        if outcome.is_failed() {
            failed_batches += 1;
        }
        fallbacks += outcome.fallback_count();
        produced.extend(outcome.into_translations());

        // Rate limit: fixed pause between consecutive requests.
        if n + 1 < total && config.batch_delay_ms > 0 {
            sleep(Duration::from_millis(config.batch_delay_ms)).await;
        }
    }

    for (&i, translation) in indices.iter().zip(produced) {
        catalog.entries[i].set_translation(translation);
    }

    if failed_batches > 0 {
        warn!("'{locale}': {failed_batches}/{total} batches failed and were left untranslated");
    }
    if fallbacks > 0 {
        warn!("'{locale}': {fallbacks} entries kept their source text and need review");
    }

    let backup = backup_path(path);
    if backup.exists() {
        std::fs::remove_file(&backup)
            .with_context(|| format!("Failed to remove old backup: {}", backup.display()))?;
    }
    std::fs::rename(path, &backup).with_context(|| {
        format!(
            "Failed to back up {} to {}",
            path.display(),
            backup.display()
        )
    })?;
    catalog
        .save(path)
        .with_context(|| format!("Failed to save translated catalog: {}", path.display()))?;
    info!("'{locale}': saved, original kept as {}", backup.display());

    Ok(())
}

/// Run a full translation pass over the requested locales.
pub async fn run(config: &Config, langs: &str, creative: bool) -> Result<()> {
    let prompt_path = config.prompt_path(creative);
    let template = std::fs::read_to_string(&prompt_path)
        .with_context(|| format!("Failed to read prompt file: {}", prompt_path.display()))?;
    let temperature = config.temperature_for(creative);

    let available = discover_locales(&config.catalog_root(), &config.default_locale)?;
    info!("Available locales: {}", available.join(", "));

    let targets = resolve_requested_locales(langs, &available, &config.default_locale)?;
    if targets.is_empty() {
        warn!("No locales selected for translation");
        return Ok(());
    }

    let client = CompletionClient::new(config);
    for locale in &targets {
        let path = config.catalog_path(locale);
        info!("Translating '{locale}' - {}", path.display());
        process_file(&client, config, &path, locale, &template, temperature).await?;
    }

    info!("Translation complete");
    Ok(())
}
