// src/commands.rs
//! Command handlers for the artifact resolver CLI

use anyhow::{Context, Result, bail};
use artifact_resolver::config::Config;
use artifact_resolver::ingest;
use artifact_resolver::record::ProviderKind;
use artifact_resolver::resolve::Params;
use artifact_resolver::snapshot::SnapshotStore;
use std::path::Path;
use tracing::info;

/// Create the record database
pub fn cmd_init(db_path: &Path) -> Result<()> {
    artifact_resolver::db::init(db_path)?;
    println!("Database initialized at: {}", db_path.display());
    Ok(())
}

/// Resolve one record and print it as JSON
pub fn cmd_find(db_path: &Path, provider: ProviderKind, params: &Params) -> Result<()> {
    let store = SnapshotStore::new(db_path, provider);
    let snapshot = store.snapshot()?;
    let record = snapshot.find(params)?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

/// Resolve every operating system and stability and print the table as JSON
pub fn cmd_find_all(db_path: &Path, provider: ProviderKind, params: &Params) -> Result<()> {
    let store = SnapshotStore::new(db_path, provider);
    let snapshot = store.snapshot()?;
    let sweep = snapshot.find_all(params)?;
    println!("{}", serde_json::to_string_pretty(&sweep)?);
    Ok(())
}

/// Print the upstream URL a local download reference redirects to
pub fn cmd_bitstream(config: &Config, item_id: &str) -> Result<()> {
    let provider = config.provider_kind()?;
    println!(
        "{}",
        provider.source_download_url(config.source_base_url(), item_id)
    );
    Ok(())
}

/// Load records from a JSON file and remove listed items
pub fn cmd_ingest(
    db_path: &Path,
    provider: ProviderKind,
    records_file: Option<&Path>,
    remove_item_ids: Option<&str>,
    skip_upsert: bool,
) -> Result<()> {
    // Validate ids before touching the database
    let to_remove = match remove_item_ids {
        Some(list) => ingest::parse_item_ids(provider, list)?,
        None => Vec::new(),
    };

    if records_file.is_none() && to_remove.is_empty() {
        bail!("No action requested, specify a records file or --remove-item-ids");
    }

    if !db_path.exists() {
        artifact_resolver::db::init(db_path)?;
    }
    let mut conn = artifact_resolver::db::open(db_path)?;

    if let Some(records_file) = records_file
        && !skip_upsert
    {
        let raws = ingest::read_records_file(records_file)
            .with_context(|| format!("Failed to load {}", records_file.display()))?;
        println!("Retrieved {} records", raws.len());

        let summary = ingest::upsert_records(&mut conn, &raws, provider)?;
        println!("Added {} rows", summary.added);
        println!("Updated {} rows", summary.updated);
        if summary.skipped > 0 {
            println!("Skipped {} records", summary.skipped);
        }
    }

    if !to_remove.is_empty() {
        println!("Removing {} rows", to_remove.len());
        let report = ingest::remove_items(&mut conn, &to_remove)?;
        for item_id in &report.not_found {
            println!("  {} (not found)", item_id);
        }
        for item_id in &report.removed {
            println!("  {}", item_id);
        }
        println!("Removed {} rows", report.removed.len());
    }

    info!("Saved {}", db_path.display());
    Ok(())
}

/// List `<revision>-<os>-<arch>` keys stored under more than one item
pub fn cmd_duplicates(
    db_path: &Path,
    provider: ProviderKind,
    records_file: Option<&Path>,
) -> Result<()> {
    if provider != ProviderKind::Girder {
        bail!("Duplicate detection needs {} records", ProviderKind::Girder);
    }

    let raws = match records_file {
        Some(path) => ingest::read_records_file(path)?,
        None => {
            let conn = artifact_resolver::db::open(db_path)?;
            ingest::stored_records(&conn)?
        }
    };

    let duplicates = ingest::duplicate_packages(&ingest::package_index(&raws));
    if duplicates.is_empty() {
        println!("No duplicate identified");
        return Ok(());
    }

    println!("|{:^24}|{:^26}|{:^26}|", "<revision>-<os>-<arch>", "itemId", "folderId");
    println!("|{}|{}|{}|", "-".repeat(24), "-".repeat(26), "-".repeat(26));
    for (key, items) in &duplicates {
        for item in items {
            println!(
                "|{:<24}|{:<26}|{:<26}|",
                key,
                item.item_id,
                item.folder_id.as_deref().unwrap_or("-")
            );
        }
    }

    Ok(())
}
