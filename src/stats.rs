use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::sniper::CycleOutcome;

/// Running counters across cycles, logged after each pass so a long-lived
/// process shows what it has been doing.
#[derive(Debug, Serialize)]
pub struct ScanStats {
    pub started_at: DateTime<Utc>,
    pub cycles: u64,
    pub empty_fetches: u64,
    pub filtered_out_cycles: u64,
    pub skipped_fits: u64,
    pub quiet_cycles: u64,
    pub alerts_sent: u64,
    pub alert_failures: u64,
}

impl ScanStats {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            cycles: 0,
            empty_fetches: 0,
            filtered_out_cycles: 0,
            skipped_fits: 0,
            quiet_cycles: 0,
            alerts_sent: 0,
            alert_failures: 0,
        }
    }

    pub fn record(&mut self, outcome: &CycleOutcome) {
        self.cycles += 1;
        match outcome {
            CycleOutcome::NoListings => self.empty_fetches += 1,
            CycleOutcome::NoQualityListings => self.filtered_out_cycles += 1,
            CycleOutcome::InsufficientData => self.skipped_fits += 1,
            CycleOutcome::NoNewDeals => self.quiet_cycles += 1,
            CycleOutcome::Alerted { notified, failed } => {
                self.alerts_sent += *notified as u64;
                self.alert_failures += *failed as u64;
            }
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "cycles: {} | alerts: {} ({} failed) | quiet: {} | empty fetch: {} | all filtered: {} | fit skipped: {} | up since {}",
            self.cycles,
            self.alerts_sent,
            self.alert_failures,
            self.quiet_cycles,
            self.empty_fetches,
            self.filtered_out_cycles,
            self.skipped_fits,
            self.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        )
    }
}

impl Default for ScanStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_sorts_outcomes_into_counters() {
        let mut stats = ScanStats::new();
        stats.record(&CycleOutcome::NoListings);
        stats.record(&CycleOutcome::NoQualityListings);
        stats.record(&CycleOutcome::InsufficientData);
        stats.record(&CycleOutcome::NoNewDeals);
        stats.record(&CycleOutcome::Alerted { notified: 2, failed: 1 });

        assert_eq!(stats.cycles, 5);
        assert_eq!(stats.empty_fetches, 1);
        assert_eq!(stats.filtered_out_cycles, 1);
        assert_eq!(stats.skipped_fits, 1);
        assert_eq!(stats.quiet_cycles, 1);
        assert_eq!(stats.alerts_sent, 2);
        assert_eq!(stats.alert_failures, 1);
    }

    #[test]
    fn test_summary_mentions_the_totals() {
        let mut stats = ScanStats::new();
        stats.record(&CycleOutcome::Alerted { notified: 3, failed: 0 });
        let line = stats.summary();
        assert!(line.contains("cycles: 1"));
        assert!(line.contains("alerts: 3"));
    }
}
