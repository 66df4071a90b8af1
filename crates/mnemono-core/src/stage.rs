use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// StageWeight
// ---------------------------------------------------------------------------

/// A named stage and its share of the cycle. Shares across a table sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageWeight {
    pub label: &'static str,
    pub weight: f64,
}

impl StageWeight {
    pub const fn new(label: &'static str, weight: f64) -> Self {
        Self { label, weight }
    }
}

/// The five stages of writing a song, in schedule order.
pub const SONG_STAGES: [StageWeight; 5] = [
    StageWeight::new("Сочинение", 0.30),
    StageWeight::new("Демо", 0.10),
    StageWeight::new("Аранжировка", 0.25),
    StageWeight::new("Запись", 0.15),
    StageWeight::new("Сведение и мастеринг", 0.20),
];

// ---------------------------------------------------------------------------
// StagePlan
// ---------------------------------------------------------------------------

/// One stage laid out on the cycle calendar. Offsets are 1-based and inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagePlan {
    #[serde(rename = "name")]
    pub label: String,
    #[serde(rename = "days")]
    pub day_count: u32,
    pub start_offset: u32,
    pub end_offset: u32,
    #[serde(default)]
    pub completed: bool,
}

impl StagePlan {
    pub fn contains(&self, day_index: i64) -> bool {
        day_index >= i64::from(self.start_offset) && day_index <= i64::from(self.end_offset)
    }

    pub fn glyph(&self) -> &'static str {
        if self.completed {
            "✅"
        } else {
            "⬜"
        }
    }

    pub fn matches_label(&self, label: &str) -> bool {
        self.label.to_lowercase() == label.trim().to_lowercase()
    }
}

impl fmt::Display for StagePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} — дни {}–{} ({} дн.)",
            self.glyph(),
            self.label,
            self.start_offset,
            self.end_offset,
            self.day_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn song_stage_weights_sum_to_one() {
        let total: f64 = SONG_STAGES.iter().map(|s| s.weight).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(SONG_STAGES.iter().all(|s| s.weight > 0.0 && s.weight <= 1.0));
    }

    #[test]
    fn contains_is_inclusive() {
        let plan = StagePlan {
            label: "Демо".into(),
            day_count: 3,
            start_offset: 10,
            end_offset: 12,
            completed: false,
        };
        assert!(!plan.contains(9));
        assert!(plan.contains(10));
        assert!(plan.contains(12));
        assert!(!plan.contains(13));
    }

    #[test]
    fn label_match_ignores_case_and_padding() {
        let plan = StagePlan {
            label: "Аранжировка".into(),
            day_count: 8,
            start_offset: 13,
            end_offset: 20,
            completed: false,
        };
        assert!(plan.matches_label("аранжировка"));
        assert!(plan.matches_label("  АРАНЖИРОВКА "));
        assert!(!plan.matches_label("аранж"));
    }

    #[test]
    fn display_shows_glyph_range_and_count() {
        let mut plan = StagePlan {
            label: "Запись".into(),
            day_count: 4,
            start_offset: 21,
            end_offset: 24,
            completed: false,
        };
        assert_eq!(plan.to_string(), "⬜ Запись — дни 21–24 (4 дн.)");
        plan.completed = true;
        assert!(plan.to_string().starts_with("✅"));
    }
}
