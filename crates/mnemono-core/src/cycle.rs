use crate::allocator;
use crate::error::{MnemonoError, Result};
use crate::stage::{StagePlan, StageWeight};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// CyclePhase
// ---------------------------------------------------------------------------

/// Where "today" falls relative to a cycle. Always derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    NotStarted,
    Active,
    Elapsed,
}

impl CyclePhase {
    pub fn as_str(self) -> &'static str {
        match self {
            CyclePhase::NotStarted => "not_started",
            CyclePhase::Active => "active",
            CyclePhase::Elapsed => "elapsed",
        }
    }
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// StageProgress
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageProgress {
    pub label: String,
    pub days_into_stage: u32,
    pub day_count: u32,
    pub percent: u32,
}

// ---------------------------------------------------------------------------
// Cycle
// ---------------------------------------------------------------------------

/// One song's working period, partitioned into stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    #[serde(rename = "name")]
    pub project_name: Option<String>,
    pub start_date: NaiveDate,
    pub total_days: u32,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "schedule")]
    pub stages: Vec<StagePlan>,
}

impl Cycle {
    /// Build a fresh cycle starting on `start_date`. Persisting it is the
    /// caller's job.
    pub fn create(
        project_name: Option<String>,
        total_days: u32,
        start_date: NaiveDate,
        weights: &[StageWeight],
    ) -> Result<Self> {
        if total_days == 0 {
            return Err(MnemonoError::InvalidArgument(
                "total_days must be at least 1".to_string(),
            ));
        }
        if weights.is_empty() {
            return Err(MnemonoError::InvalidArgument(
                "stage table is empty".to_string(),
            ));
        }

        let allocations = allocator::allocate(total_days, weights);
        Ok(Self {
            project_name: project_name.filter(|n| !n.trim().is_empty()),
            start_date,
            total_days,
            created_at: Utc::now(),
            stages: allocator::schedule(&allocations),
        })
    }

    /// Check the schedule invariants a loaded document must satisfy: at least
    /// one day and one stage, every stage at least one day long, stages laid
    /// end to end from day 1 through `total_days`.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(MnemonoError::InvalidCycle(msg));
        if self.total_days == 0 {
            return invalid("total_days is 0".to_string());
        }
        if self.stages.is_empty() {
            return invalid("schedule is empty".to_string());
        }

        let mut expected_start = 1u64;
        for stage in &self.stages {
            if stage.day_count == 0 {
                return invalid(format!("stage «{}» has no days", stage.label));
            }
            if u64::from(stage.start_offset) != expected_start {
                return invalid(format!(
                    "stage «{}» starts on day {}, expected {expected_start}",
                    stage.label, stage.start_offset
                ));
            }
            let expected_end = expected_start + u64::from(stage.day_count) - 1;
            if u64::from(stage.end_offset) != expected_end {
                return invalid(format!(
                    "stage «{}» ends on day {}, expected {expected_end}",
                    stage.label, stage.end_offset
                ));
            }
            expected_start = expected_end + 1;
        }

        let covered = expected_start - 1;
        if covered != u64::from(self.total_days) {
            return invalid(format!(
                "schedule covers {covered} days, total_days is {}",
                self.total_days
            ));
        }
        Ok(())
    }

    // ---------------------------------------------------------------------------
    // Derived view
    // ---------------------------------------------------------------------------

    /// 1-based day of the cycle that `today` falls on. Zero or negative before
    /// the start date, greater than `total_days` once the cycle is over.
    pub fn current_day_index(&self, today: NaiveDate) -> i64 {
        (today - self.start_date).num_days() + 1
    }

    pub fn phase(&self, today: NaiveDate) -> CyclePhase {
        let day = self.current_day_index(today);
        if day < 1 {
            CyclePhase::NotStarted
        } else if day > i64::from(self.total_days) {
            CyclePhase::Elapsed
        } else {
            CyclePhase::Active
        }
    }

    pub fn locate_stage(&self, day_index: i64) -> Option<&StagePlan> {
        self.stages.iter().find(|s| s.contains(day_index))
    }

    pub fn current_stage(&self, today: NaiveDate) -> Option<&StagePlan> {
        self.locate_stage(self.current_day_index(today))
    }

    /// How far into its stage `day_index` is. `None` outside the cycle.
    pub fn progress_within_stage(&self, day_index: i64) -> Option<StageProgress> {
        let stage = self.locate_stage(day_index)?;
        let days_into_stage = (day_index - i64::from(stage.start_offset) + 1) as u32;
        let percent = u64::from(days_into_stage) * 100 / u64::from(stage.day_count.max(1));
        Some(StageProgress {
            label: stage.label.clone(),
            days_into_stage,
            day_count: stage.day_count,
            percent: percent.min(100) as u32,
        })
    }

    /// Share of the cycle's days that have started, truncated to a whole percent.
    pub fn overall_percent(&self, today: NaiveDate) -> u32 {
        let total = i64::from(self.total_days);
        if total == 0 {
            return 0;
        }
        let elapsed = self.current_day_index(today).clamp(0, total);
        (elapsed * 100 / total) as u32
    }

    pub fn completed_count(&self) -> usize {
        self.stages.iter().filter(|s| s.completed).count()
    }

    pub fn stage_labels(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.label.as_str()).collect()
    }

    // ---------------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------------

    /// Mark the first stage whose label matches (case-insensitively) as done.
    /// Returns whether any stage matched. Completion does not move the calendar.
    pub fn mark_complete(&mut self, label: &str) -> bool {
        match self.stages.iter_mut().find(|s| s.matches_label(label)) {
            Some(stage) => {
                stage.completed = true;
                true
            }
            None => false,
        }
    }

    // ---------------------------------------------------------------------------
    // Rendering
    // ---------------------------------------------------------------------------

    /// One line per stage, in schedule order.
    pub fn render_summary(&self) -> String {
        self.stages
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn display_name(&self) -> &str {
        self.project_name.as_deref().unwrap_or("без названия")
    }
}

// ---------------------------------------------------------------------------
// CycleView
// ---------------------------------------------------------------------------

/// Snapshot of a cycle as seen from a given day, for JSON consumers.
#[derive(Debug, Clone, Serialize)]
pub struct CycleView {
    pub name: Option<String>,
    pub start_date: NaiveDate,
    pub total_days: u32,
    pub day_index: i64,
    pub phase: CyclePhase,
    pub progress_percent: u32,
    pub current_stage: Option<StageProgress>,
    pub completed_stages: usize,
    pub stages: Vec<StagePlan>,
}

impl Cycle {
    pub fn view(&self, today: NaiveDate) -> CycleView {
        let day_index = self.current_day_index(today);
        CycleView {
            name: self.project_name.clone(),
            start_date: self.start_date,
            total_days: self.total_days,
            day_index,
            phase: self.phase(today),
            progress_percent: self.overall_percent(today),
            current_stage: self.progress_within_stage(day_index),
            completed_stages: self.completed_count(),
            stages: self.stages.clone(),
        }
    }
}

/// Whether replacing `existing` needs an explicit confirmation step.
/// Cycles that have not finished yet count as work in progress.
pub fn requires_confirmation(existing: Option<&Cycle>, today: NaiveDate) -> bool {
    existing.is_some_and(|c| c.phase(today) != CyclePhase::Elapsed)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
