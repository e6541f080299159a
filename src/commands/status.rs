use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::groups::metric_groups;
use crate::model::{AssessRunManifest, ReportRunManifest, SheetInventoryManifest};
use crate::sheet::Sheet;
use crate::util::read_json;

pub fn run(args: StatusArgs) -> Result<()> {
    let manifest_dir = args.out_root.join("manifests");

    info!(out_root = %args.out_root.display(), "status requested");

    let inventory_path = manifest_dir.join("sheet_inventory.json");
    if inventory_path.exists() {
        let inventory: SheetInventoryManifest = read_json(&inventory_path)?;
        info!(
            generated_at = %inventory.generated_at,
            sheet_count = inventory.sheet_count,
            source = %inventory.source_directory,
            "loaded inventory manifest"
        );
    } else {
        warn!(path = %inventory_path.display(), "inventory manifest missing");
    }

    match latest_manifest(&manifest_dir, "assess_run_")? {
        Some(path) => {
            let manifest: AssessRunManifest = read_json(&path)?;
            info!(
                run_id = %manifest.run_id,
                status = %manifest.status,
                started_at = %manifest.started_at,
                warnings = manifest.warnings.len(),
                "loaded assess manifest"
            );
            for group in &manifest.groups {
                info!(
                    group = %group.group,
                    status = %group.status,
                    entities = group.entities_classified,
                    rows_skipped = group.rows_skipped_blank_key,
                    duplicate_keys = group.duplicate_keys,
                    "assess group summary"
                );
            }
        }
        None => warn!(path = %manifest_dir.display(), "no assess run manifest found"),
    }

    match latest_manifest(&manifest_dir, "report_run_")? {
        Some(path) => {
            let manifest: ReportRunManifest = read_json(&path)?;
            info!(
                run_id = %manifest.run_id,
                status = %manifest.status,
                entity_count = manifest.entity_count,
                output = %manifest.output_path,
                warnings = manifest.warnings.len(),
                "loaded report manifest"
            );
        }
        None => warn!(path = %manifest_dir.display(), "no report run manifest found"),
    }

    let groups = metric_groups()?;
    for group in &groups {
        let processed_path = args.out_root.join(&group.processed_filename);
        if processed_path.exists() {
            info!(group = %group.name, path = %processed_path.display(), "processed sheet present");
        } else {
            warn!(group = %group.name, path = %processed_path.display(), "processed sheet missing");
        }
    }

    let consolidated_path = args.out_root.join("Consolidated_Final_Health.csv");
    if consolidated_path.exists() {
        let sheet = Sheet::load(&consolidated_path)?;
        info!(
            path = %consolidated_path.display(),
            entities = sheet.rows().len(),
            columns = sheet.headers().len(),
            "consolidated report present"
        );
    } else {
        warn!(path = %consolidated_path.display(), "consolidated report missing");
    }

    Ok(())
}

fn latest_manifest(dir: &Path, prefix: &str) -> Result<Option<PathBuf>> {
    if !dir.exists() {
        return Ok(None);
    }

    let mut names = Vec::new();
    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;
    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", dir.display()))?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with(prefix) && name.ends_with(".json") {
            names.push(name);
        }
    }

    Ok(pick_latest(names).map(|name| dir.join(name)))
}

fn pick_latest(names: Vec<String>) -> Option<String> {
    names.into_iter().max()
}
