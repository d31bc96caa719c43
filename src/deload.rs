//! Deload policy (§4.4): evaluate the four trigger rules in order. The
//! first rule to trigger wins the reported `reason`, but every rule's
//! outcome is reported in `triggered_rules` regardless of which one
//! "wins" — callers that want to explain "why" show all of them.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::calendar::Calendar;
use crate::model::DeloadConfig;
use crate::value::{classify_trend, Trend};
use crate::WorkoutHistory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeloadTrigger {
    ScheduledDeload,
    LowReadiness,
    HighAccumulatedFatigue,
    PerformanceDecline,
}

impl DeloadTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeloadTrigger::ScheduledDeload => "scheduledDeload",
            DeloadTrigger::LowReadiness => "lowReadiness",
            DeloadTrigger::HighAccumulatedFatigue => "highAccumulatedFatigue",
            DeloadTrigger::PerformanceDecline => "performanceDecline",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggeredRule {
    pub trigger: DeloadTrigger,
    pub triggered: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeloadDecision {
    pub should_deload: bool,
    pub reason: Option<DeloadTrigger>,
    pub triggered_rules: Vec<TriggeredRule>,
}

/// Rule 1: `scheduledDeloadWeeks = N` triggers once per N-week training
/// cycle, counted from the most recent deload (or the oldest session in
/// history if none has ever happened), provided no deload session fell
/// in the trailing 14 days. This resolves the spec's open question in
/// favor of weeks-from-last-deload over weeks-from-plan-start, since the
/// engine has no explicit "plan start date" field to anchor the latter.
fn scheduled_deload_triggers(
    weeks: Option<u32>,
    date: NaiveDate,
    history: &WorkoutHistory,
    calendar: &dyn Calendar,
) -> bool {
    let weeks = match weeks {
        Some(w) if w > 0 => w,
        _ => return false,
    };

    let reference = history
        .lift_states
        .values()
        .filter_map(|s| s.last_deload_date)
        .max()
        .or_else(|| history.sessions.last().map(|s| s.date));
    let reference = match reference {
        Some(r) => r,
        None => return false,
    };

    let days = calendar.days_between(reference, date);
    if days < 0 {
        return false;
    }
    let week_number = days / 7 + 1;
    if week_number as u32 % weeks != 0 {
        return false;
    }

    let recent_deload = history
        .sessions
        .iter()
        .any(|s| s.was_deload && calendar.days_between(s.date, date) < 14);
    !recent_deload
}

/// Rule 2: consecutive low-readiness streak ending at `date`, counting
/// `today_readiness` as the score for `date` itself even if
/// `readiness_history` has no entry for it yet. A missing day breaks the
/// streak (it does not count as low, nor does it count as high).
fn low_readiness_triggers(
    required_days: u32,
    threshold: i32,
    date: NaiveDate,
    today_readiness: i32,
    readiness_history: &[crate::model::ReadinessRecord],
    calendar: &dyn Calendar,
) -> bool {
    if required_days == 0 {
        return false;
    }
    let mut streak = 0u32;
    let mut cursor = date;
    loop {
        let score = if cursor == date {
            Some(today_readiness)
        } else {
            readiness_history.iter().find(|r| r.date == cursor).map(|r| r.score)
        };
        match score {
            Some(s) if s <= threshold => {
                streak += 1;
                if streak >= required_days {
                    return true;
                }
                cursor = calendar.add_days(cursor, -1);
            }
            _ => return false,
        }
    }
}

/// Rule 3: recent (7-day) mean volume outpaces the 28-day baseline by
/// 1.35x or more, provided both windows have enough coverage to trust.
fn high_fatigue_triggers(date: NaiveDate, history: &WorkoutHistory) -> bool {
    let recent_days: Vec<NaiveDate> = (1..=7).map(|d| date - chrono::Duration::days(d)).collect();
    let baseline_days: Vec<NaiveDate> = (8..=35).map(|d| date - chrono::Duration::days(d)).collect();

    let recent_coverage = recent_days.iter().filter(|d| history.recent_volume_by_date.contains_key(d)).count();
    let baseline_coverage = baseline_days.iter().filter(|d| history.recent_volume_by_date.contains_key(d)).count();

    if recent_coverage < 7 || baseline_coverage < 21 {
        return false;
    }

    let recent_total: Decimal = recent_days.iter().filter_map(|d| history.recent_volume_by_date.get(d)).sum();
    let baseline_total: Decimal = baseline_days.iter().filter_map(|d| history.recent_volume_by_date.get(d)).sum();

    let baseline_mean = baseline_total / dec!(28);
    if baseline_mean <= Decimal::ZERO {
        return false;
    }
    let recent_mean = recent_total / dec!(7);
    recent_mean >= dec!(1.35) * baseline_mean
}

/// Rule 4: at least two lifts classify as `declining` over their last 21
/// days of e1RM samples, each with at least 4 samples in that window.
fn performance_decline_triggers(date: NaiveDate, history: &WorkoutHistory, calendar: &dyn Calendar) -> bool {
    let declining_lifts = history
        .lift_states
        .values()
        .filter(|state| {
            let windowed: Vec<Decimal> = state
                .e1rm_history
                .iter()
                .filter(|sample| calendar.days_between(sample.date, date) <= 21 && calendar.days_between(sample.date, date) >= 0)
                .map(|sample| sample.value)
                .collect();
            windowed.len() >= 4 && classify_trend(&windowed) == Trend::Declining
        })
        .count();
    declining_lifts >= 2
}

/// Evaluate all four deload triggers for `date`. A missing `deload_config`
/// conservatively disables every trigger (§7 "Not-applicable").
pub fn evaluate_deload(
    config: Option<&DeloadConfig>,
    date: NaiveDate,
    history: &WorkoutHistory,
    today_readiness: i32,
    calendar: &dyn Calendar,
) -> DeloadDecision {
    let readiness = today_readiness.clamp(0, 100);

    let (scheduled, low_readiness) = match config {
        Some(cfg) => (
            scheduled_deload_triggers(cfg.scheduled_deload_weeks, date, history, calendar),
            low_readiness_triggers(
                cfg.low_readiness_days_required,
                cfg.readiness_threshold,
                date,
                readiness,
                &history.readiness_history,
                calendar,
            ),
        ),
        None => (false, false),
    };
    let fatigue = config.is_some() && high_fatigue_triggers(date, history);
    let decline = config.is_some() && performance_decline_triggers(date, history, calendar);

    let triggered_rules = vec![
        TriggeredRule { trigger: DeloadTrigger::ScheduledDeload, triggered: scheduled },
        TriggeredRule { trigger: DeloadTrigger::LowReadiness, triggered: low_readiness },
        TriggeredRule { trigger: DeloadTrigger::HighAccumulatedFatigue, triggered: fatigue },
        TriggeredRule { trigger: DeloadTrigger::PerformanceDecline, triggered: decline },
    ];

    let reason = triggered_rules.iter().find(|r| r.triggered).map(|r| r.trigger);
    DeloadDecision {
        should_deload: reason.is_some(),
        reason,
        triggered_rules,
    }
}
