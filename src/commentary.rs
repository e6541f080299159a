use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::severity::Severity;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentaryMap {
    #[serde(flatten)]
    groups: HashMap<String, HashMap<String, String>>,
}

impl CommentaryMap {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read(path)
            .with_context(|| format!("failed to read commentary map: {}", path.display()))?;
        serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse commentary map: {}", path.display()))
    }

    pub fn resolve(&self, group: &str, severity: Severity) -> String {
        self.groups
            .get(group)
            .and_then(|entries| entries.get(severity.label()))
            .cloned()
            .unwrap_or_else(|| format!("{group} status info"))
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

#[cfg(test)]
mod tests {
    use super::CommentaryMap;
    use crate::severity::Severity;

    fn sample() -> CommentaryMap {
        serde_json::from_str(
            r#"
            {
              "AWT": {
                "Good": "Wait times are within target.",
                "Critical": "Wait times are far beyond target."
              },
              "Delay": {
                "Average": "Delays are elevated but manageable."
              }
            }
            "#,
        )
        .expect("commentary json parses")
    }

    #[test]
    fn known_group_and_severity_resolve_to_configured_text() {
        let map = sample();
        assert_eq!(
            map.resolve("AWT", Severity::Good),
            "Wait times are within target."
        );
        assert_eq!(
            map.resolve("Delay", Severity::Average),
            "Delays are elevated but manageable."
        );
    }

    #[test]
    fn unknown_severity_falls_back_to_generic_text() {
        let map = sample();
        assert_eq!(map.resolve("AWT", Severity::Degraded), "AWT status info");
        assert_eq!(
            map.resolve("AWT", Severity::NotAvailable),
            "AWT status info"
        );
    }

    #[test]
    fn unknown_group_falls_back_to_generic_text() {
        let map = sample();
        assert_eq!(
            map.resolve("FlowControl", Severity::Critical),
            "FlowControl status info"
        );
    }

    #[test]
    fn default_map_resolves_everything_through_the_fallback() {
        let map = CommentaryMap::default();
        assert_eq!(map.group_count(), 0);
        assert_eq!(map.resolve("AWT", Severity::Good), "AWT status info");
    }
}
