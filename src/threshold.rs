use anyhow::{Result, bail};

use crate::metric::MetricValue;
use crate::severity::Severity;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub upper_bound: f64,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdRule {
    bands: Vec<Band>,
}

impl ThresholdRule {
    pub fn new(bands: Vec<(f64, Severity)>) -> Result<Self> {
        if bands.is_empty() {
            bail!("threshold rule must declare at least one band");
        }

        for (upper_bound, _) in &bands {
            if upper_bound.is_nan() {
                bail!("threshold band upper bound must be a number");
            }
        }

        for pair in bands.windows(2) {
            if pair[0].0 >= pair[1].0 {
                bail!(
                    "threshold bands must be strictly ascending: {} then {}",
                    pair[0].0,
                    pair[1].0
                );
            }
        }

        let bands = bands
            .into_iter()
            .map(|(upper_bound, severity)| Band {
                upper_bound,
                severity,
            })
            .collect();

        Ok(Self { bands })
    }

    pub fn classify(&self, value: MetricValue) -> Severity {
        let MetricValue::Value(value) = value else {
            return Severity::NotAvailable;
        };

        for band in &self.bands {
            if value < band.upper_bound {
                return band.severity;
            }
        }

        self.bands[self.bands.len() - 1].severity
    }
}
