//! Indexing run records
//!
//! One `IndexingRun` row is created per bounded indexer execution, mutated
//! only by the orchestrator while running, and finalized at run end
//! regardless of outcome. Partial progress is never hidden: a failed run
//! still reports whatever it processed before the abort.

use chrono::{DateTime, Utc};

/// Status of an indexing run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Succeeded,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "succeeded" => Some(Self::Succeeded),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// One bounded execution of an indexer
#[derive(Debug, Clone)]
pub struct IndexingRun {
    pub id: i64,
    pub platform: String,
    pub status: RunStatus,
    pub items_processed: u64,
    pub items_failed: u64,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,

    /// Hash of the configuration that produced this run
    pub config_hash: String,
}

impl IndexingRun {
    /// Elapsed time; open runs measure against the current clock
    pub fn duration(&self) -> chrono::Duration {
        self.ended_at.unwrap_or_else(Utc::now) - self.started_at
    }

    /// Human-readable duration in seconds/minutes/hours buckets
    pub fn duration_formatted(&self) -> String {
        let secs = self.duration().num_milliseconds() as f64 / 1000.0;

        if secs < 60.0 {
            format!("{:.1}s", secs)
        } else if secs < 3600.0 {
            format!("{:.1}m", secs / 60.0)
        } else {
            format!("{:.1}h", secs / 3600.0)
        }
    }

    /// Percentage of processed items among all attempted items
    ///
    /// Guarded against divide-by-zero: a run that attempted nothing reports
    /// 0.0.
    pub fn success_rate(&self) -> f64 {
        let total = self.items_processed + self.items_failed;
        if total == 0 {
            return 0.0;
        }

        (self.items_processed as f64 / total as f64 * 1000.0).round() / 10.0
    }

    /// Whether the run has reached a terminal status
    pub fn is_finished(&self) -> bool {
        matches!(self.status, RunStatus::Succeeded | RunStatus::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn run_with(processed: u64, failed: u64) -> IndexingRun {
        IndexingRun {
            id: 1,
            platform: "gridverse".to_string(),
            status: RunStatus::Succeeded,
            items_processed: processed,
            items_failed: failed,
            started_at: Utc::now(),
            ended_at: Some(Utc::now()),
            error_message: None,
            config_hash: "hash".to_string(),
        }
    }

    #[test]
    fn test_run_status_round_trip() {
        for status in &[RunStatus::Running, RunStatus::Succeeded, RunStatus::Failed] {
            let db_str = status.to_db_string();
            let parsed = RunStatus::from_db_string(db_str);
            assert_eq!(Some(*status), parsed);
        }
    }

    #[test]
    fn test_run_status_invalid() {
        assert_eq!(RunStatus::from_db_string("invalid"), None);
    }

    #[test]
    fn test_success_rate() {
        assert_eq!(run_with(9, 1).success_rate(), 90.0);
        assert_eq!(run_with(1, 2).success_rate(), 33.3);
        assert_eq!(run_with(5, 0).success_rate(), 100.0);
    }

    #[test]
    fn test_success_rate_guards_divide_by_zero() {
        assert_eq!(run_with(0, 0).success_rate(), 0.0);
    }

    #[test]
    fn test_duration_formatted_buckets() {
        let mut run = run_with(0, 0);

        run.ended_at = Some(run.started_at + Duration::seconds(42));
        assert_eq!(run.duration_formatted(), "42.0s");

        run.ended_at = Some(run.started_at + Duration::seconds(90));
        assert_eq!(run.duration_formatted(), "1.5m");

        run.ended_at = Some(run.started_at + Duration::seconds(5400));
        assert_eq!(run.duration_formatted(), "1.5h");
    }

    #[test]
    fn test_open_run_duration_is_nonnegative() {
        let mut run = run_with(0, 0);
        run.ended_at = None;
        assert!(run.duration() >= Duration::zero());
    }

    #[test]
    fn test_is_finished() {
        let mut run = run_with(0, 0);
        assert!(run.is_finished());

        run.status = RunStatus::Running;
        assert!(!run.is_finished());

        run.status = RunStatus::Failed;
        assert!(run.is_finished());
    }
}
