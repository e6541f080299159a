use std::path::Path;

use anyhow::{Result, bail};
use chrono::Utc;
use tracing::{info, warn};

use crate::cli::AssessArgs;
use crate::groups::{ENTITY_COLUMN, GroupOutcome, MetricGroup, metric_groups, process_group};
use crate::model::{AssessRunManifest, GroupAssessSummary, SeverityTally};
use crate::sheet::{Sheet, write_csv};
use crate::util::{compact_timestamp, now_utc_string, run_id, write_json_pretty};

pub fn run(args: AssessArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = run_id(started_ts);

    let groups = metric_groups()?;

    info!(
        data_root = %args.data_root.display(),
        out_root = %args.out_root.display(),
        run_id = %run_id,
        "starting assessment"
    );

    let mut summaries = Vec::with_capacity(groups.len());
    let mut warnings = Vec::new();

    for group in &groups {
        let sheet_path = args.data_root.join(&group.sheet_filename);
        match assess_group(&sheet_path, group, &args.out_root) {
            Ok(summary) => {
                info!(
                    group = %group.name,
                    entities = summary.entities_classified,
                    rows_skipped = summary.rows_skipped_blank_key,
                    duplicate_keys = summary.duplicate_keys,
                    "group assessed"
                );
                summaries.push(summary);
            }
            Err(err) => {
                warn!(group = %group.name, reason = %format!("{err:#}"), "group unavailable");
                warnings.push(format!("{}: {err:#}", group.name));
                summaries.push(GroupAssessSummary {
                    group: group.name.clone(),
                    status: "unavailable".to_string(),
                    sheet_path: sheet_path.display().to_string(),
                    output_path: None,
                    rows_total: 0,
                    entities_classified: 0,
                    rows_skipped_blank_key: 0,
                    duplicate_keys: 0,
                    final_severities: SeverityTally::default(),
                    failure_reason: Some(format!("{err:#}")),
                });
            }
        }
    }

    if summaries
        .iter()
        .all(|summary| summary.status == "unavailable")
    {
        warnings.push("no metric group produced a processed sheet".to_string());
    }

    let manifest = AssessRunManifest {
        manifest_version: 1,
        run_id: run_id.clone(),
        status: "completed".to_string(),
        started_at,
        updated_at: now_utc_string(),
        command: render_assess_command(&args),
        data_root: args.data_root.display().to_string(),
        out_root: args.out_root.display().to_string(),
        groups: summaries,
        warnings,
    };

    let manifest_path = args.manifest_path.clone().unwrap_or_else(|| {
        args.out_root.join("manifests").join(format!(
            "assess_run_{}.json",
            compact_timestamp(started_ts)
        ))
    });

    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), run_id = %run_id, "wrote assess manifest");

    Ok(())
}

fn assess_group(
    sheet_path: &Path,
    group: &MetricGroup,
    out_root: &Path,
) -> Result<GroupAssessSummary> {
    if !sheet_path.exists() {
        bail!("sheet not found: {}", sheet_path.display());
    }

    let sheet = Sheet::load(sheet_path)?;
    let outcome = process_group(&sheet, group)?;

    let output_path = out_root.join(&group.processed_filename);
    let (headers, rows) = render_processed(group, &outcome);
    write_csv(&output_path, &headers, &rows)?;

    let mut final_severities = SeverityTally::default();
    for (_, result) in &outcome.entities {
        final_severities.record(result.aggregate);
    }

    Ok(GroupAssessSummary {
        group: group.name.clone(),
        status: "completed".to_string(),
        sheet_path: sheet_path.display().to_string(),
        output_path: Some(output_path.display().to_string()),
        rows_total: outcome.rows_total,
        entities_classified: outcome.entities.len(),
        rows_skipped_blank_key: outcome.rows_skipped_blank_key,
        duplicate_keys: outcome.duplicate_keys,
        final_severities,
        failure_reason: None,
    })
}

fn render_processed(group: &MetricGroup, outcome: &GroupOutcome) -> (Vec<String>, Vec<Vec<String>>) {
    let mut headers = Vec::with_capacity(group.columns.len() + 2);
    headers.push(ENTITY_COLUMN.to_string());
    headers.extend(group.columns.iter().map(|column| column.health_column.clone()));
    headers.push(group.final_column.clone());

    let rows = outcome
        .entities
        .iter()
        .map(|(entity, result)| {
            let mut row = Vec::with_capacity(headers.len());
            row.push(entity.clone());
            row.extend(result.severities.iter().map(|severity| severity.to_string()));
            row.push(result.aggregate.to_string());
            row
        })
        .collect();

    (headers, rows)
}

fn render_assess_command(args: &AssessArgs) -> String {
    let mut command = format!(
        "healthrollup assess --data-root {} --out-root {}",
        args.data_root.display(),
        args.out_root.display()
    );
    if let Some(path) = &args.manifest_path {
        command.push_str(&format!(" --manifest-path {}", path.display()));
    }
    command
}

#[cfg(test)]
mod tests {
    use super::render_processed;
    use crate::groups::{metric_groups, process_group};
    use crate::sheet::Sheet;

    #[test]
    fn processed_output_carries_health_columns_and_final_status() {
        let group = metric_groups()
            .expect("static groups are valid")
            .into_iter()
            .find(|group| group.name == "AWT")
            .expect("group exists");

        let sheet = Sheet::parse("ProjectName,AWT86_99Pct,AWT_100Pct\nAlpha,12%,3\nBeta,25,\n")
            .expect("sheet parses");
        let outcome = process_group(&sheet, &group).expect("group processes");

        let (headers, rows) = render_processed(&group, &outcome);
        assert_eq!(
            headers,
            [
                "ProjectName",
                "Health_99",
                "Health_100",
                "AWT_Final_Health_Status"
            ]
        );
        assert_eq!(rows[0], ["Alpha", "Average", "Average", "Average"]);
        assert_eq!(rows[1], ["Beta", "Critical", "N/A", "Critical"]);
    }
}
