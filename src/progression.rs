//! Between-session progression policies (§4.5): given a lift's current
//! state and its most recent exposure, compute the next session's base
//! working load and target reps. Set-by-set shaping (backoff sets) and
//! the material-prescription-change rebase live here too, since both are
//! inputs to the same `baseTargetLoad` computation the planner performs.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::model::{ExerciseSessionResult, LiftState, LoadRoundingPolicy, ProgressionPolicy, RepsRange, SetPrescription};
use crate::value::{brzycki_working_weight, Load, Unit};

/// `computeNextLoad`: the base working load for the next session, before
/// detraining reduction, deload reduction, or rounding are applied.
pub fn compute_next_load(
    policy: &ProgressionPolicy,
    lift_state: &LiftState,
    last_exposure: Option<&ExerciseSessionResult>,
    plan_unit: Unit,
) -> Load {
    match policy {
        ProgressionPolicy::None | ProgressionPolicy::RirAutoregulation => lift_state.last_working_weight,

        ProgressionPolicy::LinearProgression {
            success_increment,
            failure_decrement,
            deload_pct,
            failures_before_deload,
        } => {
            if *failures_before_deload > 0 && lift_state.failure_count >= *failures_before_deload {
                return lift_state.last_working_weight * (Decimal::ONE - *deload_pct);
            }
            if lift_state.last_session_date.is_none() {
                return lift_state.last_working_weight;
            }
            if lift_state.failure_count == 0 {
                lift_state.last_working_weight + *success_increment
            } else if let Some(dec) = failure_decrement {
                let reduced = lift_state.last_working_weight - *dec;
                if reduced.value < Decimal::ZERO {
                    Load::zero(reduced.unit)
                } else {
                    reduced
                }
            } else {
                lift_state.last_working_weight
            }
        }

        ProgressionPolicy::DoubleProgression {
            sessions_at_top_before_increase,
            load_increment,
            deload_pct,
            failures_before_deload,
        } => {
            if *failures_before_deload > 0 && lift_state.failure_count >= *failures_before_deload {
                return lift_state.last_working_weight * (Decimal::ONE - *deload_pct);
            }
            let at_top = at_rep_ceiling(last_exposure);
            if at_top && lift_state.success_streak >= *sessions_at_top_before_increase {
                lift_state.last_working_weight + *load_increment
            } else {
                lift_state.last_working_weight
            }
        }

        ProgressionPolicy::TopSetBackoff { load_increment, .. } => {
            // Top-set+backoff has no `failuresBeforeDeload`/`deloadPct` of its
            // own in this variant's config (§4.5); a failing top set simply
            // holds at the current load rather than advancing.
            if lift_state.last_session_date.is_some() && lift_state.failure_count == 0 {
                lift_state.last_working_weight + *load_increment
            } else {
                lift_state.last_working_weight
            }
        }

        ProgressionPolicy::PercentageE1rm => {
            // Callers resolve the percentage target separately via
            // `percentage_e1rm_load`; `None`'s fallback load is returned
            // here so a caller that forgets the percentage still gets a
            // conservative, non-panicking value (§4.5 "If e1RM is 0, fall
            // back to the default progression").
            lift_state.last_working_weight
        }
    }
}

/// The %e1RM policy needs the template's `target_percentage`, which this
/// module does not otherwise see; the planner calls this directly instead
/// of `compute_next_load` when `load_strategy == PercentageE1rm`.
pub fn percentage_e1rm_load(lift_state: &LiftState, target_percentage: Decimal, plan_unit: Unit) -> Load {
    if lift_state.rolling_e1rm.is_zero() {
        return lift_state.last_working_weight;
    }
    let unit = if lift_state.last_working_weight.value.is_zero() {
        plan_unit
    } else {
        lift_state.last_working_weight.unit
    };
    Load::new(lift_state.rolling_e1rm * target_percentage, unit)
}

/// `computeNextTargetReps`.
pub fn compute_next_target_reps(
    policy: &ProgressionPolicy,
    range: RepsRange,
    last_exposure: Option<&ExerciseSessionResult>,
) -> u32 {
    match policy {
        ProgressionPolicy::DoubleProgression { .. } => {
            if at_rep_ceiling(last_exposure) {
                range.hi
            } else {
                match last_exposure {
                    Some(ex) => {
                        let min_reps = ex.working_sets().map(|s| s.reps).min().unwrap_or(range.lo);
                        range.clamp(min_reps + 1)
                    }
                    None => range.lo,
                }
            }
        }
        _ => range.lo,
    }
}

fn at_rep_ceiling(last_exposure: Option<&ExerciseSessionResult>) -> bool {
    match last_exposure {
        Some(ex) => {
            let mut any = false;
            for set in ex.working_sets() {
                any = true;
                if set.reps < ex.prescription.target_reps_range.hi {
                    return false;
                }
            }
            any
        }
        None => false,
    }
}

/// Material-prescription-change rebase (§4.5): if the latest completed
/// exposure used a materially different prescription, rebase from
/// `rollingE1RM` at the new `targetReps.lo` rather than carrying the old
/// working weight forward, so a protocol change never reads as a failure.
pub fn material_rebase_load(
    current_rx: &SetPrescription,
    last_rx: Option<&SetPrescription>,
    rolling_e1rm: Decimal,
    unit: Unit,
    rounding: &LoadRoundingPolicy,
) -> Option<Load> {
    let last_rx = last_rx?;
    if rolling_e1rm.is_zero() || !current_rx.differs_materially_from(last_rx) {
        return None;
    }
    let working_weight = brzycki_working_weight(rolling_e1rm, current_rx.target_reps_range.lo);
    Some(rounding.round(Load::new(working_weight, unit)))
}

/// `computeSetLoad`: applies backoff shaping for set index >= 1 under
/// top-set+backoff policies; otherwise returns `base`, rounded.
pub fn compute_set_load(
    set_index: u32,
    policy: &ProgressionPolicy,
    base: Load,
    rounding: &LoadRoundingPolicy,
) -> (Load, Option<Decimal>) {
    match policy {
        ProgressionPolicy::TopSetBackoff { backoff_percentage, .. } if set_index >= 1 => {
            let backoff = base * *backoff_percentage;
            (rounding.round(backoff), Some(*backoff_percentage))
        }
        _ => (rounding.round(base), None),
    }
}

/// `failuresBeforeDeload` threshold a policy carries, if any -- used by
/// the direction/magnitude layer's "consecutive failures" rule (§4.6).
pub fn failures_before_deload(policy: &ProgressionPolicy) -> Option<u32> {
    match policy {
        ProgressionPolicy::LinearProgression { failures_before_deload, .. }
        | ProgressionPolicy::DoubleProgression { failures_before_deload, .. } => Some(*failures_before_deload),
        _ => None,
    }
}

#[allow(dead_code)]
pub(crate) fn zero_floor(load: Load) -> Load {
    if load.value < Decimal::ZERO {
        Load::zero(load.unit)
    } else {
        load
    }
}
