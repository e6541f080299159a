use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use tracing::{info, warn};

use crate::cli::ReportArgs;
use crate::commentary::CommentaryMap;
use crate::consolidate::{ConsolidatedRecord, GroupSeverities, GroupSlot, consolidate};
use crate::groups::{ENTITY_COLUMN, MetricGroup, metric_groups};
use crate::model::{GroupReportSummary, ReportRunManifest, SeverityTally};
use crate::severity::Severity;
use crate::sheet::{Sheet, cell, write_csv};
use crate::util::{compact_timestamp, now_utc_string, run_id, write_json_pretty};

pub fn run(args: ReportArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = run_id(started_ts);

    let groups = metric_groups()?;

    info!(
        out_root = %args.out_root.display(),
        run_id = %run_id,
        "starting consolidated report"
    );

    let commentary = if args.commentary_path.exists() {
        let commentary = CommentaryMap::load(&args.commentary_path)?;
        info!(
            path = %args.commentary_path.display(),
            groups = commentary.group_count(),
            "loaded commentary map"
        );
        commentary
    } else {
        warn!(
            path = %args.commentary_path.display(),
            "commentary map missing, using fallback text"
        );
        CommentaryMap::default()
    };
    let commentary_source = args
        .commentary_path
        .exists()
        .then(|| args.commentary_path.display().to_string());

    let mut group_severities = Vec::with_capacity(groups.len());
    let mut summaries = Vec::with_capacity(groups.len());
    let mut warnings = Vec::new();

    for group in &groups {
        let processed_path = args.out_root.join(&group.processed_filename);
        match load_processed(&processed_path, group) {
            Ok(entities) => {
                let mut final_severities = SeverityTally::default();
                for (_, severity) in &entities {
                    final_severities.record(*severity);
                }
                info!(group = %group.name, entities = entities.len(), "loaded processed sheet");
                summaries.push(GroupReportSummary {
                    group: group.name.clone(),
                    status: "completed".to_string(),
                    processed_path: processed_path.display().to_string(),
                    entities: entities.len(),
                    final_severities,
                });
                group_severities.push(GroupSeverities {
                    name: group.name.clone(),
                    entities,
                });
            }
            Err(err) => {
                warn!(group = %group.name, reason = %format!("{err:#}"), "group unavailable");
                warnings.push(format!("{}: {err:#}", group.name));
                summaries.push(GroupReportSummary {
                    group: group.name.clone(),
                    status: "unavailable".to_string(),
                    processed_path: processed_path.display().to_string(),
                    entities: 0,
                    final_severities: SeverityTally::default(),
                });
                group_severities.push(GroupSeverities {
                    name: group.name.clone(),
                    entities: Vec::new(),
                });
            }
        }
    }

    let records = consolidate(&group_severities);

    let output_path = args
        .output_path
        .clone()
        .unwrap_or_else(|| args.out_root.join("Consolidated_Final_Health.csv"));

    let (headers, rows) = render_consolidated(&groups, &records, &commentary);
    write_csv(&output_path, &headers, &rows)?;

    for record in &records {
        let statuses = group_severities
            .iter()
            .zip(&record.slots)
            .map(|(group, slot)| match slot {
                GroupSlot::Classified(severity) => format!("{}={severity}", group.name),
                GroupSlot::Unavailable => format!("{}=missing", group.name),
            })
            .collect::<Vec<String>>()
            .join(" ");
        info!(entity = %record.entity, statuses = %statuses, "consolidated");
    }

    let manifest = ReportRunManifest {
        manifest_version: 1,
        run_id: run_id.clone(),
        status: "completed".to_string(),
        started_at,
        updated_at: now_utc_string(),
        command: render_report_command(&args),
        out_root: args.out_root.display().to_string(),
        commentary_source,
        entity_count: records.len(),
        groups: summaries,
        output_path: output_path.display().to_string(),
        warnings,
    };

    let manifest_path = args.manifest_path.clone().unwrap_or_else(|| {
        args.out_root.join("manifests").join(format!(
            "report_run_{}.json",
            compact_timestamp(started_ts)
        ))
    });

    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), run_id = %run_id, "wrote report manifest");
    info!(
        path = %output_path.display(),
        entities = records.len(),
        "consolidated report completed"
    );

    Ok(())
}

fn load_processed(path: &Path, group: &MetricGroup) -> Result<Vec<(String, Severity)>> {
    if !path.exists() {
        bail!("processed sheet not found: {}", path.display());
    }

    let sheet = Sheet::load(path)?;
    let entity_index = sheet
        .column_index(ENTITY_COLUMN)
        .with_context(|| format!("{} is missing column {ENTITY_COLUMN}", path.display()))?;
    let final_index = sheet.column_index(&group.final_column).with_context(|| {
        format!(
            "{} is missing column {}",
            path.display(),
            group.final_column
        )
    })?;

    let mut entities = Vec::with_capacity(sheet.rows().len());
    for row in sheet.rows() {
        let entity = cell(row, entity_index).trim();
        if entity.is_empty() {
            continue;
        }

        let severity = cell(row, final_index)
            .parse::<Severity>()
            .map_err(anyhow::Error::msg)
            .with_context(|| {
                format!("bad final status for {entity} in {}", path.display())
            })?;
        entities.push((entity.to_string(), severity));
    }

    Ok(entities)
}

fn render_consolidated(
    groups: &[MetricGroup],
    records: &[ConsolidatedRecord],
    commentary: &CommentaryMap,
) -> (Vec<String>, Vec<Vec<String>>) {
    let mut headers = Vec::with_capacity(groups.len() * 2 + 1);
    headers.push(ENTITY_COLUMN.to_string());
    headers.extend(groups.iter().map(|group| group.final_column.clone()));
    headers.extend(groups.iter().map(|group| group.commentary_column.clone()));

    let rows = records
        .iter()
        .map(|record| {
            let mut row = Vec::with_capacity(headers.len());
            row.push(record.entity.clone());
            row.extend(record.slots.iter().map(|slot| slot.render()));
            row.extend(groups.iter().zip(&record.slots).map(|(group, slot)| {
                match slot {
                    GroupSlot::Classified(severity) => commentary.resolve(&group.name, *severity),
                    GroupSlot::Unavailable => String::new(),
                }
            }));
            row
        })
        .collect();

    (headers, rows)
}

fn render_report_command(args: &ReportArgs) -> String {
    let mut command = format!(
        "healthrollup report --out-root {} --commentary-path {}",
        args.out_root.display(),
        args.commentary_path.display()
    );
    if let Some(path) = &args.output_path {
        command.push_str(&format!(" --output-path {}", path.display()));
    }
    if let Some(path) = &args.manifest_path {
        command.push_str(&format!(" --manifest-path {}", path.display()));
    }
    command
}

#[cfg(test)]
mod tests {
    use super::render_consolidated;
    use crate::commentary::CommentaryMap;
    use crate::consolidate::{GroupSeverities, consolidate};
    use crate::groups::metric_groups;
    use crate::severity::Severity;

    #[test]
    fn consolidated_rows_render_missing_groups_as_empty_cells() {
        let groups = metric_groups().expect("static groups are valid");
        let inputs = vec![
            GroupSeverities {
                name: "AWT".to_string(),
                entities: vec![("Alpha".to_string(), Severity::Average)],
            },
            GroupSeverities {
                name: "FlowControl".to_string(),
                entities: Vec::new(),
            },
            GroupSeverities {
                name: "Delay".to_string(),
                entities: vec![("Alpha".to_string(), Severity::Critical)],
            },
        ];
        let records = consolidate(&inputs);

        let (headers, rows) = render_consolidated(&groups, &records, &CommentaryMap::default());
        assert_eq!(
            headers,
            [
                "ProjectName",
                "AWT_Final_Health_Status",
                "FLOW_Final_Health_Status",
                "Delay_Final_Health_Status",
                "AWT_Commentary",
                "FLOW_Commentary",
                "Delay_Commentary"
            ]
        );
        assert_eq!(
            rows[0],
            [
                "Alpha",
                "Average",
                "",
                "Critical",
                "AWT status info",
                "",
                "Delay status info"
            ]
        );
    }

    #[test]
    fn configured_commentary_flows_into_the_commentary_columns() {
        let groups = metric_groups().expect("static groups are valid");
        let commentary: CommentaryMap = serde_json::from_str(
            r#"{"AWT": {"Average": "Wait times drifting above target."}}"#,
        )
        .expect("commentary json parses");

        let inputs = vec![
            GroupSeverities {
                name: "AWT".to_string(),
                entities: vec![("Alpha".to_string(), Severity::Average)],
            },
            GroupSeverities {
                name: "FlowControl".to_string(),
                entities: vec![("Alpha".to_string(), Severity::Good)],
            },
            GroupSeverities {
                name: "Delay".to_string(),
                entities: vec![("Alpha".to_string(), Severity::NotAvailable)],
            },
        ];
        let records = consolidate(&inputs);

        let (_, rows) = render_consolidated(&groups, &records, &commentary);
        assert_eq!(rows[0][4], "Wait times drifting above target.");
        assert_eq!(rows[0][5], "FlowControl status info");
        assert_eq!(rows[0][3], "N/A");
        assert_eq!(rows[0][6], "Delay status info");
    }
}
