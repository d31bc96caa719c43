//! Insights (`[SUPPLEMENT]`, SPEC_FULL.md): a small, pure, typed advisory
//! payload attached to a `SessionPlan`. Advisory only -- nothing here
//! feeds back into load or rep computation.

use crate::deload::DeloadDecision;
use crate::model::{Insight, InsightKind, LiftState};
use crate::value::Trend;

/// Generate insights for a single exercise's plan from its lift state.
pub fn exercise_insights(state: &LiftState, is_new_max: bool, detraining_applied: bool) -> Vec<Insight> {
    let mut insights = Vec::new();

    if is_new_max {
        insights.push(Insight {
            kind: InsightKind::NewEstimatedMax,
            message: format!("new rolling e1RM estimate: {:.1}", state.rolling_e1rm),
        });
    }

    if detraining_applied {
        insights.push(Insight {
            kind: InsightKind::DetrainingApplied,
            message: "load reduced for time away from this lift".to_string(),
        });
    }

    if state.trend == Trend::Stable && state.e1rm_history.len() >= 6 {
        insights.push(Insight {
            kind: InsightKind::Plateau,
            message: "e1RM has been flat for several sessions".to_string(),
        });
    }

    insights
}

/// Session-level insight flagging that a deload is active this session,
/// so downstream consumers don't need to re-derive it from `is_deload`.
pub fn deload_insights(decision: &DeloadDecision) -> Vec<Insight> {
    if !decision.should_deload {
        return Vec::new();
    }
    vec![Insight {
        kind: InsightKind::ApproachingDeload,
        message: decision
            .reason
            .map(|r| format!("deload triggered: {}", r.as_str()))
            .unwrap_or_else(|| "deload triggered".to_string()),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Unit;

    #[test]
    fn new_max_produces_an_insight() {
        let state = LiftState::fresh("bench", Unit::Pounds);
        let insights = exercise_insights(&state, true, false);
        assert!(insights.iter().any(|i| i.kind == InsightKind::NewEstimatedMax));
    }

    #[test]
    fn no_signals_produces_no_insights() {
        let state = LiftState::fresh("bench", Unit::Pounds);
        let insights = exercise_insights(&state, false, false);
        assert!(insights.is_empty());
    }
}
