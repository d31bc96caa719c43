//! In-session set-by-set adjustment (§4.5 "In-session policy"):
//! `adjustDuringSession` transforms the next planned set given the set
//! the lifter just performed. Pure and total: a malformed or missing
//! observation (an aborted top set, a missing RIR report) always folds
//! into "return the plan unchanged" rather than guessing.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::model::{InSessionPolicy, RepsRange, SetPlan, SetResult};
use crate::value::{brzycki_e1rm, brzycki_working_weight};

/// `adjustDuringSession(currentResult, plannedNext) -> newPlannedNext`.
pub fn adjust_during_session(current: &SetResult, planned_next: &SetPlan) -> SetPlan {
    match planned_next.in_session_policy {
        InSessionPolicy::None => planned_next.clone(),
        InSessionPolicy::RirAutoregulation => rir_autoregulate(current, planned_next),
        InSessionPolicy::TopSetBackoff { backoff_percentage, minimum_top_set_reps, .. } => {
            top_set_backoff(current, planned_next, backoff_percentage, minimum_top_set_reps)
        }
    }
}

/// `observedRIR - targetRIR`. Fewer reps in reserve than targeted is a
/// negative delta (harder than planned); more is positive (easier).
fn rir_autoregulate(current: &SetResult, planned_next: &SetPlan) -> SetPlan {
    if !(current.completed && current.reps >= 1) {
        return planned_next.clone();
    }
    let observed_rir = match current.observed_rir {
        Some(r) => r,
        None => return planned_next.clone(),
    };

    let delta = observed_rir as i64 - current.target_rir as i64;
    let mut next = planned_next.clone();

    if delta.unsigned_abs() < 1 {
        return next;
    }
    if delta >= 2 {
        next.target_load = next.rounding_policy.round(next.target_load + next.increment);
        next.target_reps = next.rep_range.clamp(next.target_reps + 1);
    } else if delta <= -1 {
        next.target_load = next.rounding_policy.round(next.target_load - next.increment);
        next.target_reps = next.rep_range.clamp(next.target_reps.saturating_sub(1).max(next.rep_range.lo));
    }
    next
}

/// Only meaningful the set right after the top set (`setIndex == 1`).
/// An aborted, zero-rep, or sub-minimum top set must not propagate a
/// bogus daily max into the backoff sets.
fn top_set_backoff(
    current: &SetResult,
    planned_next: &SetPlan,
    backoff_percentage: Decimal,
    minimum_top_set_reps: u32,
) -> SetPlan {
    if planned_next.set_index != 1 {
        return planned_next.clone();
    }
    if !current.completed || current.reps == 0 || current.reps < minimum_top_set_reps {
        return planned_next.clone();
    }

    let daily_max_e1rm = brzycki_e1rm(current.load.value_in(planned_next.target_load.unit), current.reps);
    let backoff_working_weight = brzycki_working_weight(daily_max_e1rm, planned_next.target_reps) * backoff_percentage;

    let mut next = planned_next.clone();
    next.target_load = next
        .rounding_policy
        .round(crate::value::Load::new(backoff_working_weight, planned_next.target_load.unit));
    next.backoff_percentage = Some(backoff_percentage);
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RepsRange;
    use crate::value::{Load, LoadRoundingPolicy, RoundingMode, Unit};

    fn set_plan(set_index: u32, policy: InSessionPolicy, target_load: Decimal) -> SetPlan {
        SetPlan {
            set_index,
            target_load: Load::new(target_load, Unit::Pounds),
            target_reps: 5,
            target_rir: 2,
            rest_seconds: 120,
            is_warmup: false,
            backoff_percentage: None,
            in_session_policy: policy,
            rounding_policy: LoadRoundingPolicy { increment: dec!(5), unit: Unit::Pounds, mode: RoundingMode::Nearest },
            increment: Load::new(dec!(5), Unit::Pounds),
            rep_range: RepsRange { lo: 3, hi: 8 },
        }
    }

    fn set_result(completed: bool, reps: u32, load: Decimal, observed_rir: Option<u32>, target_rir: u32) -> SetResult {
        SetResult { set_index: 0, completed, reps, load: Load::new(load, Unit::Pounds), is_warmup: false, observed_rir, target_rir }
    }

    #[test]
    fn top_set_abort_preserves_backoff() {
        let planned = set_plan(1, InSessionPolicy::TopSetBackoff { backoff_percentage: dec!(0.85), minimum_top_set_reps: 3, use_daily_max: true }, dec!(190));
        let top = set_result(false, 0, dec!(300), None, 0);
        let adjusted = adjust_during_session(&top, &planned);
        assert_eq!(adjusted.target_load.value, dec!(190));
    }

    #[test]
    fn top_set_backoff_recomputes_from_daily_max() {
        let planned = set_plan(1, InSessionPolicy::TopSetBackoff { backoff_percentage: dec!(0.85), minimum_top_set_reps: 1, use_daily_max: true }, dec!(190));
        let top = set_result(true, 5, dec!(225), None, 0);
        let adjusted = adjust_during_session(&top, &planned);
        assert_ne!(adjusted.target_load.value, dec!(190));
    }

    #[test]
    fn rir_small_delta_is_unchanged() {
        let planned = set_plan(1, InSessionPolicy::RirAutoregulation, dec!(200));
        let result = set_result(true, 5, dec!(200), Some(2), 2);
        let adjusted = adjust_during_session(&result, &planned);
        assert_eq!(adjusted.target_load.value, dec!(200));
    }

    #[test]
    fn rir_too_easy_increases_load() {
        let planned = set_plan(1, InSessionPolicy::RirAutoregulation, dec!(200));
        let result = set_result(true, 5, dec!(200), Some(4), 2);
        let adjusted = adjust_during_session(&result, &planned);
        assert_eq!(adjusted.target_load.value, dec!(205));
        assert_eq!(adjusted.target_reps, 6);
    }

    #[test]
    fn rir_too_hard_decreases_load() {
        let planned = set_plan(1, InSessionPolicy::RirAutoregulation, dec!(200));
        let result = set_result(true, 5, dec!(200), Some(0), 2);
        let adjusted = adjust_during_session(&result, &planned);
        assert_eq!(adjusted.target_load.value, dec!(195));
        assert_eq!(adjusted.target_reps, 4);
    }
}
