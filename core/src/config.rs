use serde::{Deserialize, Serialize};
use std::path::Path;

pub const RULES_FILE: &str = "rules.json";

/// Every threshold the decision rules read. Defaults are the production
/// values; a `rules.json` in the data directory may override any subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Deny when the cumulative chargeback count is strictly above this.
    pub fraud_history_limit: u32,
    /// Histories at least this long are judged only on the over-baseline ratio.
    pub high_volume_min_rows: usize,
    /// Over-baseline share of history (percent) that denies a high-volume user.
    pub repeated_over_baseline_pct: f64,
    /// Consecutive over-baseline rows that deny a low-volume user.
    pub streak_limit: u32,
    /// Minutes spanned by the last four transactions at or below which we deny.
    pub min_gap_minutes: f64,
    /// Candidate amount as a percent of baseline at or above which we deny.
    pub spike_ratio_pct: f64,
    /// With a zero baseline the ratio is undefined; when set, any positive
    /// candidate amount counts as a spike instead of skipping the rule.
    pub zero_baseline_is_spike: bool,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            fraud_history_limit:        1,
            high_volume_min_rows:       5,
            repeated_over_baseline_pct: 25.0,
            streak_limit:               3,
            min_gap_minutes:            5.0,
            spike_ratio_pct:            120.0,
            zero_baseline_is_spike:     false,
        }
    }
}

impl RuleConfig {
    /// Load `rules.json` from `data_dir`. A missing file means defaults.
    pub fn load(data_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = data_dir.as_ref().join(RULES_FILE);
        if !path.exists() {
            log::debug!("config: {} not found, using default rules", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
        let rules: RuleConfig = serde_json::from_str(&content)?;
        log::info!("config: loaded rules from {}", path.display());
        Ok(rules)
    }
}
