use std::path::Path;

use anyhow::{Result, bail};
use tracing::{info, warn};

use crate::cli::InventoryArgs;
use crate::groups::metric_groups;
use crate::model::{SheetEntry, SheetInventoryManifest};
use crate::util::{now_utc_string, sha256_file, write_json_pretty};

pub fn run(args: InventoryArgs) -> Result<()> {
    let manifest = build_manifest(&args.data_root)?;

    if args.dry_run {
        info!(
            sheet_count = manifest.sheet_count,
            source = %manifest.source_directory,
            "inventory dry-run complete"
        );
        return Ok(());
    }

    let manifest_path = args
        .manifest_path
        .unwrap_or_else(|| args.out_root.join("manifests").join("sheet_inventory.json"));

    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote inventory manifest");
    info!(sheet_count = manifest.sheet_count, "inventory completed");

    Ok(())
}

pub fn build_manifest(data_root: &Path) -> Result<SheetInventoryManifest> {
    let groups = metric_groups()?;

    let mut sheets = Vec::with_capacity(groups.len());
    for group in &groups {
        let path = data_root.join(&group.sheet_filename);
        if !path.exists() {
            warn!(
                group = %group.name,
                path = %path.display(),
                "metric sheet missing from data root"
            );
            continue;
        }

        let sha256 = sha256_file(&path)?;
        sheets.push(SheetEntry {
            filename: group.sheet_filename.clone(),
            group: group.name.clone(),
            sha256,
        });
    }

    if sheets.is_empty() {
        bail!("no metric sheets found in {}", data_root.display());
    }

    sheets.sort_by(|a, b| a.filename.cmp(&b.filename));

    Ok(SheetInventoryManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        source_directory: data_root.display().to_string(),
        sheet_count: sheets.len(),
        sheets,
    })
}
