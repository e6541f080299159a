use std::collections::HashMap;

use crate::severity::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupSlot {
    Classified(Severity),
    Unavailable,
}

impl GroupSlot {
    pub fn render(self) -> String {
        match self {
            Self::Classified(severity) => severity.to_string(),
            Self::Unavailable => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupSeverities {
    pub name: String,
    pub entities: Vec<(String, Severity)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConsolidatedRecord {
    pub entity: String,
    pub slots: Vec<GroupSlot>,
}

pub fn consolidate(groups: &[GroupSeverities]) -> Vec<ConsolidatedRecord> {
    let group_count = groups.len();
    let mut records: Vec<ConsolidatedRecord> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (slot_index, group) in groups.iter().enumerate() {
        for (entity, severity) in &group.entities {
            let record_index = match positions.get(entity).copied() {
                Some(index) => index,
                None => {
                    positions.insert(entity.clone(), records.len());
                    records.push(ConsolidatedRecord {
                        entity: entity.clone(),
                        slots: vec![GroupSlot::Unavailable; group_count],
                    });
                    records.len() - 1
                }
            };
            records[record_index].slots[slot_index] = GroupSlot::Classified(*severity);
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::{GroupSeverities, GroupSlot, consolidate};
    use crate::severity::Severity;

    fn group(name: &str, entities: &[(&str, Severity)]) -> GroupSeverities {
        GroupSeverities {
            name: name.to_string(),
            entities: entities
                .iter()
                .map(|(entity, severity)| (entity.to_string(), *severity))
                .collect(),
        }
    }

    #[test]
    fn outer_join_keeps_every_entity_seen_in_any_group() {
        let groups = vec![
            group("AWT", &[("Alpha", Severity::Good)]),
            group("FlowControl", &[("Beta", Severity::Degraded)]),
            group(
                "Delay",
                &[("Alpha", Severity::Average), ("Gamma", Severity::Critical)],
            ),
        ];

        let records = consolidate(&groups);
        let entities: Vec<&str> = records.iter().map(|record| record.entity.as_str()).collect();
        assert_eq!(entities, ["Alpha", "Beta", "Gamma"]);
    }

    #[test]
    fn absent_groups_hold_the_unavailable_marker_not_a_severity() {
        let groups = vec![
            group("AWT", &[("Alpha", Severity::Good)]),
            group("FlowControl", &[]),
            group("Delay", &[("Alpha", Severity::NotAvailable)]),
        ];

        let records = consolidate(&groups);
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].slots,
            [
                GroupSlot::Classified(Severity::Good),
                GroupSlot::Unavailable,
                GroupSlot::Classified(Severity::NotAvailable),
            ]
        );
        assert_eq!(records[0].slots[1].render(), "");
        assert_eq!(records[0].slots[2].render(), "N/A");
    }

    #[test]
    fn order_is_first_appearance_across_the_group_sequence() {
        let groups = vec![
            group(
                "AWT",
                &[("Beta", Severity::Good), ("Alpha", Severity::Good)],
            ),
            group(
                "Delay",
                &[("Gamma", Severity::Good), ("Alpha", Severity::Critical)],
            ),
        ];

        let records = consolidate(&groups);
        let entities: Vec<&str> = records.iter().map(|record| record.entity.as_str()).collect();
        assert_eq!(entities, ["Beta", "Alpha", "Gamma"]);
        assert_eq!(
            records[1].slots,
            [
                GroupSlot::Classified(Severity::Good),
                GroupSlot::Classified(Severity::Critical),
            ]
        );
    }

    #[test]
    fn consolidation_is_deterministic_across_reruns() {
        let groups = vec![
            group("AWT", &[("Alpha", Severity::Good), ("Beta", Severity::Average)]),
            group("Delay", &[("Beta", Severity::Critical)]),
        ];
        assert_eq!(consolidate(&groups), consolidate(&groups));
    }

    #[test]
    fn no_groups_yield_no_records() {
        assert!(consolidate(&[]).is_empty());
    }
}
