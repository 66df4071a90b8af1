//! Largest-remainder (Hare–Niemeyer) apportionment of cycle days to stages.

use crate::stage::{StagePlan, StageWeight};
use serde::Serialize;

/// Products closer than this to an integer are treated as that integer.
const SNAP_EPSILON: f64 = 1e-9;

/// Days assigned to one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Allocation {
    pub label: &'static str,
    pub day_count: u32,
}

/// Split `total_days` across `weights`, preserving input order.
///
/// Every stage gets at least one day. The last stage absorbs any difference
/// left by the one-day floor; if it cannot shrink far enough, the surplus is
/// taken from the stages furthest above their proportional share. The result
/// sums to `total_days` whenever `total_days >= weights.len()`.
pub fn allocate(total_days: u32, weights: &[StageWeight]) -> Vec<Allocation> {
    if weights.is_empty() {
        return Vec::new();
    }

    let total = f64::from(total_days);
    let mut base: Vec<u32> = Vec::with_capacity(weights.len());
    let mut fractional: Vec<f64> = Vec::with_capacity(weights.len());
    for w in weights {
        let raw = snap(w.weight * total);
        let floor = raw.floor();
        base.push(floor as u32);
        fractional.push(raw - floor);
    }

    let assigned: u64 = base.iter().map(|&b| u64::from(b)).sum();
    let remainder = u64::from(total_days).saturating_sub(assigned) as usize;

    // sort_by is stable: equal remainders keep input order.
    let mut order: Vec<usize> = (0..weights.len()).collect();
    order.sort_by(|&a, &b| fractional[b].total_cmp(&fractional[a]));

    let mut days = base;
    for &i in order.iter().take(remainder) {
        days[i] += 1;
    }
    for d in days.iter_mut() {
        *d = (*d).max(1);
    }

    let sum: i64 = days.iter().map(|&d| i64::from(d)).sum();
    let diff = i64::from(total_days) - sum;
    if diff != 0 {
        if let Some(last) = days.last_mut() {
            *last = (i64::from(*last) + diff).max(1) as u32;
        }
    }

    let mut surplus =
        days.iter().map(|&d| i64::from(d)).sum::<i64>() - i64::from(total_days);
    while surplus > 0 {
        let excess = |i: usize| f64::from(days[i]) - weights[i].weight * total;
        let Some(i) = (0..days.len())
            .filter(|&i| days[i] > 1)
            .max_by(|&a, &b| excess(a).total_cmp(&excess(b)).then(a.cmp(&b)))
        else {
            break;
        };
        days[i] -= 1;
        surplus -= 1;
    }

    weights
        .iter()
        .zip(days)
        .map(|(w, day_count)| Allocation {
            label: w.label,
            day_count,
        })
        .collect()
}

/// Lay allocations end to end starting at day 1.
pub fn schedule(allocations: &[Allocation]) -> Vec<StagePlan> {
    let mut next = 1u32;
    allocations
        .iter()
        .map(|a| {
            let start_offset = next;
            let end_offset = start_offset.saturating_add(a.day_count.saturating_sub(1));
            next = end_offset.saturating_add(1);
            StagePlan {
                label: a.label.to_string(),
                day_count: a.day_count,
                start_offset,
                end_offset,
                completed: false,
            }
        })
        .collect()
}

fn snap(raw: f64) -> f64 {
    let rounded = raw.round();
    if (raw - rounded).abs() < SNAP_EPSILON {
        rounded
    } else {
        raw
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
