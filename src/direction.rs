//! Direction & magnitude (§4.6): an advisory layer that distills a
//! lift's recent signals into a human-facing `Direction` and a
//! reasoning string, surfaced on `ExercisePlan.direction`/`direction_reason`.
//! Direction decisions never depend on sex; only magnitude scaling does.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::model::{Direction, ExperienceLevel, GoalPhase, MovementPattern, Sex};
use crate::value::{Load, Trend};

/// Signals distilled from lift state, the most recent exposure,
/// readiness, and the user profile -- the sole input to direction and
/// magnitude decisions.
#[derive(Debug, Clone)]
pub struct LiftSignals {
    pub days_since_last_exposure: Option<i64>,
    pub fail_streak: u32,
    pub failures_before_deload: Option<u32>,
    pub today_readiness: i32,
    /// A hard ("grinder") set or a missed rep target on the most recent exposure.
    pub grinder_or_miss: bool,
    pub trend: Trend,
    pub is_compound: bool,
    /// `observedRIR - targetRIR` on the most recent working set, if known.
    pub rir_delta: Option<Decimal>,
    pub recent_easy_session_count: u32,
    pub reps_at_ceiling: bool,
    pub sex: Sex,
    pub experience: ExperienceLevel,
    pub goal_phase: GoalPhase,
    pub movement_pattern: MovementPattern,
}

/// `(direction, humanReadableReason)`.
pub fn decide_direction(signals: &LiftSignals) -> (Direction, String) {
    if signals.days_since_last_exposure.is_some_and(|d| d >= 21) {
        return (Direction::ResetAfterBreak, "21+ days since last exposure".to_string());
    }

    if let Some(threshold) = signals.failures_before_deload {
        if threshold > 0 && signals.fail_streak >= threshold {
            return (Direction::Deload, format!("{} consecutive failed sessions", signals.fail_streak));
        }
    }

    let severe_low_readiness = signals.today_readiness < 40;
    if severe_low_readiness {
        let corroborating = signals.grinder_or_miss || signals.trend == Trend::Declining;
        if corroborating {
            return (Direction::DecreaseSlightly, "severe low readiness with corroborating signal".to_string());
        }
        return (Direction::Hold, "severe low readiness, volume cut only".to_string());
    }

    if signals.grinder_or_miss {
        if signals.is_compound {
            return (Direction::DecreaseSlightly, "grinder or missed rep on a compound lift".to_string());
        }
        return (Direction::Hold, "isolations never decrease from a single hard set".to_string());
    }

    let easy_session = signals.rir_delta.is_some_and(|d| d >= dec!(1.0));
    if easy_session {
        let gated_ok = easy_session_gate(signals);
        if gated_ok {
            return (Direction::Increase, "easy session clears progression gates".to_string());
        }
        return (Direction::Hold, "easy session but progression gate not yet satisfied".to_string());
    }

    (Direction::Hold, "no trigger signal".to_string())
}

fn easy_session_gate(signals: &LiftSignals) -> bool {
    use MovementPattern::*;
    let is_upper_press = matches!(signals.movement_pattern, HorizontalPush | VerticalPush);
    if matches!(signals.experience, ExperienceLevel::Advanced | ExperienceLevel::Elite) && is_upper_press {
        if signals.recent_easy_session_count < 2 {
            return false;
        }
    }
    if signals.goal_phase == GoalPhase::CutFatLoss && signals.today_readiness < 75 {
        return false;
    }
    if !signals.is_compound && !signals.reps_at_ceiling {
        return false;
    }
    true
}

/// Sex-aware relative-strength scaling factor (§4.6): female thresholds
/// sit at roughly 0.62x the male figure, "other" at the midpoint.
fn sex_factor(sex: Sex) -> Decimal {
    match sex {
        Sex::Male => dec!(1.0),
        Sex::Female => dec!(0.62),
        Sex::Other => dec!(0.81),
    }
}

/// Experience dampens magnitude: beginners move in bigger jumps,
/// advanced/elite lifters in smaller ones, relative to the policy's base
/// increment.
fn experience_factor(experience: ExperienceLevel) -> Decimal {
    match experience {
        ExperienceLevel::Beginner => dec!(1.5),
        ExperienceLevel::Intermediate => dec!(1.0),
        ExperienceLevel::Advanced => dec!(0.75),
        ExperienceLevel::Elite => dec!(0.5),
    }
}

/// Output of the magnitude computation: a load delta, a hold multiplier
/// (always 1.0 outside `Hold`), and a set-count delta applied only when
/// `Hold` was triggered by severe low readiness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Magnitude {
    pub load_delta: Load,
    pub multiplier: Decimal,
    pub volume_adjustment: i32,
}

/// Compute the magnitude of an `Increase`/`DecreaseSlightly`/`Hold`
/// direction. `Deload` magnitude is handled entirely by the deload
/// policy (§4.4); callers never route a `Deload` direction here.
pub fn compute_magnitude(
    direction: Direction,
    base_increment: Load,
    signals: &LiftSignals,
    hold_from_severe_low_readiness: bool,
) -> Magnitude {
    match direction {
        Direction::Increase | Direction::DecreaseSlightly => {
            let scale = experience_factor(signals.experience) * sex_factor(signals.sex);
            let scaled = base_increment * scale;
            // Clamp from below: never propose a change smaller than the
            // gym's available step.
            let floored = if scaled.value < base_increment.value { base_increment } else { scaled };
            Magnitude { load_delta: floored, multiplier: Decimal::ONE, volume_adjustment: 0 }
        }
        Direction::Hold => Magnitude {
            load_delta: Load::zero(base_increment.unit),
            multiplier: Decimal::ONE,
            volume_adjustment: if hold_from_severe_low_readiness { -1 } else { 0 },
        },
        Direction::Deload | Direction::ResetAfterBreak => {
            Magnitude { load_delta: Load::zero(base_increment.unit), multiplier: Decimal::ONE, volume_adjustment: 0 }
        }
    }
}
