use std::collections::HashMap;

use anyhow::{Context, Result, bail};

use crate::metric::normalize_cell;
use crate::severity::{Severity, worst_of};
use crate::sheet::{Sheet, cell};
use crate::threshold::ThresholdRule;

pub const ENTITY_COLUMN: &str = "ProjectName";

#[derive(Debug, Clone)]
pub struct MetricColumn {
    pub source_column: String,
    pub health_column: String,
    pub rule: ThresholdRule,
}

#[derive(Debug, Clone)]
pub struct MetricGroup {
    pub name: String,
    pub sheet_filename: String,
    pub processed_filename: String,
    pub final_column: String,
    pub commentary_column: String,
    pub columns: Vec<MetricColumn>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupResult {
    pub severities: Vec<Severity>,
    pub aggregate: Severity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupOutcome {
    pub entities: Vec<(String, GroupResult)>,
    pub rows_total: usize,
    pub rows_skipped_blank_key: usize,
    pub duplicate_keys: usize,
}

pub fn metric_groups() -> Result<Vec<MetricGroup>> {
    let awt = MetricGroup {
        name: "AWT".to_string(),
        sheet_filename: "AWT.csv".to_string(),
        processed_filename: "AWT_Processed.csv".to_string(),
        final_column: "AWT_Final_Health_Status".to_string(),
        commentary_column: "AWT_Commentary".to_string(),
        columns: vec![
            MetricColumn {
                source_column: "AWT86_99Pct".to_string(),
                health_column: "Health_99".to_string(),
                rule: ThresholdRule::new(vec![
                    (10.0, Severity::Good),
                    (15.0, Severity::Average),
                    (20.0, Severity::Degraded),
                    (f64::INFINITY, Severity::Critical),
                ])?,
            },
            MetricColumn {
                source_column: "AWT_100Pct".to_string(),
                health_column: "Health_100".to_string(),
                // zero and negative shares are healthy, the Average band opens just above zero
                rule: ThresholdRule::new(vec![
                    (f64::MIN_POSITIVE, Severity::Good),
                    (5.0, Severity::Average),
                    (10.0, Severity::Degraded),
                    (f64::INFINITY, Severity::Critical),
                ])?,
            },
        ],
    };

    let flow_control = MetricGroup {
        name: "FlowControl".to_string(),
        sheet_filename: "FlowControl.csv".to_string(),
        processed_filename: "FlowControl_Processed.csv".to_string(),
        final_column: "FLOW_Final_Health_Status".to_string(),
        commentary_column: "FLOW_Commentary".to_string(),
        columns: vec![
            MetricColumn {
                source_column: "FCTime_30_60_secs".to_string(),
                health_column: "Health_Col_D".to_string(),
                rule: ThresholdRule::new(vec![
                    (10.0, Severity::Good),
                    (15.0, Severity::Average),
                    (20.0, Severity::Degraded),
                    (f64::INFINITY, Severity::Critical),
                ])?,
            },
            MetricColumn {
                source_column: "FCTime_1_3_mins".to_string(),
                health_column: "Health_Col_E".to_string(),
                rule: ThresholdRule::new(vec![
                    (15.0, Severity::Average),
                    (20.0, Severity::Degraded),
                    (f64::INFINITY, Severity::Critical),
                ])?,
            },
            MetricColumn {
                source_column: "FCTime_3_5_mins".to_string(),
                health_column: "Health_Col_F".to_string(),
                rule: ThresholdRule::new(vec![
                    (20.0, Severity::Degraded),
                    (f64::INFINITY, Severity::Critical),
                ])?,
            },
            MetricColumn {
                source_column: "FCTime_5_mins_plus".to_string(),
                health_column: "Health_Col_G".to_string(),
                rule: ThresholdRule::new(vec![
                    (10.0, Severity::Degraded),
                    (f64::INFINITY, Severity::Critical),
                ])?,
            },
        ],
    };

    let delay = MetricGroup {
        name: "Delay".to_string(),
        sheet_filename: "Delay.csv".to_string(),
        processed_filename: "Delay_Processed.csv".to_string(),
        final_column: "Delay_Final_Health_Status".to_string(),
        commentary_column: "Delay_Commentary".to_string(),
        columns: vec![
            MetricColumn {
                source_column: "Delay_1_5_min".to_string(),
                health_column: "Health_Col_C".to_string(),
                rule: ThresholdRule::new(vec![
                    (1000.0, Severity::Good),
                    (1500.0, Severity::Average),
                    (2500.0, Severity::Degraded),
                    (f64::INFINITY, Severity::Critical),
                ])?,
            },
            MetricColumn {
                source_column: "Delay_5_10_min".to_string(),
                health_column: "Health_Col_D".to_string(),
                rule: ThresholdRule::new(vec![
                    (100.0, Severity::Good),
                    (200.0, Severity::Average),
                    (500.0, Severity::Degraded),
                    (f64::INFINITY, Severity::Critical),
                ])?,
            },
            MetricColumn {
                source_column: "Delay_10_30_min".to_string(),
                health_column: "Health_Col_E".to_string(),
                rule: ThresholdRule::new(vec![
                    (50.0, Severity::Good),
                    (100.0, Severity::Average),
                    (200.0, Severity::Degraded),
                    (f64::INFINITY, Severity::Critical),
                ])?,
            },
            MetricColumn {
                source_column: "Delay_30_60_min".to_string(),
                health_column: "Health_Col_F".to_string(),
                rule: ThresholdRule::new(vec![
                    (20.0, Severity::Good),
                    (50.0, Severity::Average),
                    (100.0, Severity::Degraded),
                    (f64::INFINITY, Severity::Critical),
                ])?,
            },
            MetricColumn {
                source_column: "Delay_60_min_plus".to_string(),
                health_column: "Health_Col_G".to_string(),
                rule: ThresholdRule::new(vec![
                    (10.0, Severity::Average),
                    (f64::INFINITY, Severity::Critical),
                ])?,
            },
        ],
    };

    let groups = vec![awt, flow_control, delay];

    for group in &groups {
        if group.columns.is_empty() {
            bail!("metric group {} declares no metric columns", group.name);
        }
    }

    Ok(groups)
}

pub fn process_group(sheet: &Sheet, group: &MetricGroup) -> Result<GroupOutcome> {
    if group.columns.is_empty() {
        bail!("metric group {} declares no metric columns", group.name);
    }

    let entity_index = sheet.column_index(ENTITY_COLUMN).with_context(|| {
        format!(
            "sheet for group {} is missing column {ENTITY_COLUMN}",
            group.name
        )
    })?;

    let mut column_indices = Vec::with_capacity(group.columns.len());
    for column in &group.columns {
        let index = sheet.column_index(&column.source_column).with_context(|| {
            format!(
                "sheet for group {} is missing column {}",
                group.name, column.source_column
            )
        })?;
        column_indices.push(index);
    }

    let mut entities: Vec<(String, GroupResult)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut rows_skipped_blank_key = 0;
    let mut duplicate_keys = 0;

    for row in sheet.rows() {
        let entity = cell(row, entity_index).trim();
        if entity.is_empty() {
            rows_skipped_blank_key += 1;
            continue;
        }

        let severities: Vec<Severity> = group
            .columns
            .iter()
            .zip(&column_indices)
            .map(|(column, index)| column.rule.classify(normalize_cell(cell(row, *index))))
            .collect();

        let aggregate = worst_of(severities.iter().copied()).with_context(|| {
            format!(
                "group {} produced no classified sub-metrics for {entity}",
                group.name
            )
        })?;

        let result = GroupResult {
            severities,
            aggregate,
        };

        match positions.get(entity).copied() {
            Some(index) => {
                entities[index].1 = result;
                duplicate_keys += 1;
            }
            None => {
                positions.insert(entity.to_string(), entities.len());
                entities.push((entity.to_string(), result));
            }
        }
    }

    Ok(GroupOutcome {
        entities,
        rows_total: sheet.rows().len(),
        rows_skipped_blank_key,
        duplicate_keys,
    })
}
