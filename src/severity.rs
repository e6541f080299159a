use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    #[serde(rename = "N/A")]
    NotAvailable,
    Good,
    Average,
    Degraded,
    Critical,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Self::NotAvailable => "N/A",
            Self::Good => "Good",
            Self::Average => "Average",
            Self::Degraded => "Degraded",
            Self::Critical => "Critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "n/a" | "na" | "n/a or invalid value" => Ok(Self::NotAvailable),
            "good" => Ok(Self::Good),
            "average" => Ok(Self::Average),
            "degraded" => Ok(Self::Degraded),
            "critical" => Ok(Self::Critical),
            other => Err(format!("unrecognized severity label: {other}")),
        }
    }
}

pub fn worst_of<I>(levels: I) -> Option<Severity>
where
    I: IntoIterator<Item = Severity>,
{
    levels.into_iter().max()
}

#[cfg(test)]
mod tests {
    use super::{Severity, worst_of};

    #[test]
    fn ordinal_order_runs_from_not_available_to_critical() {
        assert!(Severity::NotAvailable < Severity::Good);
        assert!(Severity::Good < Severity::Average);
        assert!(Severity::Average < Severity::Degraded);
        assert!(Severity::Degraded < Severity::Critical);
    }

    #[test]
    fn worst_of_picks_the_maximum_severity() {
        let worst = worst_of([Severity::Good, Severity::Critical, Severity::Average]);
        assert_eq!(worst, Some(Severity::Critical));
    }

    #[test]
    fn worst_of_is_commutative_and_idempotent() {
        let forward = worst_of([Severity::Average, Severity::Degraded]);
        let reversed = worst_of([Severity::Degraded, Severity::Average]);
        assert_eq!(forward, reversed);
        assert_eq!(
            worst_of([Severity::Degraded, Severity::Degraded]),
            Some(Severity::Degraded)
        );
    }

    #[test]
    fn worst_of_single_not_available_stays_not_available() {
        assert_eq!(
            worst_of([Severity::NotAvailable]),
            Some(Severity::NotAvailable)
        );
    }

    #[test]
    fn worst_of_empty_input_yields_none() {
        assert_eq!(worst_of(Vec::new()), None);
    }

    #[test]
    fn labels_round_trip_through_from_str() {
        for severity in [
            Severity::NotAvailable,
            Severity::Good,
            Severity::Average,
            Severity::Degraded,
            Severity::Critical,
        ] {
            let parsed = severity.label().parse::<Severity>().expect("label parses");
            assert_eq!(parsed, severity);
        }
    }

    #[test]
    fn from_str_accepts_legacy_invalid_value_label() {
        assert_eq!(
            "N/A or Invalid Value".parse::<Severity>(),
            Ok(Severity::NotAvailable)
        );
        assert_eq!("  critical ".parse::<Severity>(), Ok(Severity::Critical));
        assert!("unknown".parse::<Severity>().is_err());
    }
}
