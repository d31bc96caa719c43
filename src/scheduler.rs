//! Template scheduler (§4.2): pick a `templateId` for a date given the
//! plan's schedule kind and history. Missed calendar days never advance
//! a rotation — only completed sessions whose template id is part of the
//! rotation's `order` count.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::model::{ScheduleKind, WorkoutHistory};

/// Lowercase full English weekday name, the key format `fixedWeekday`
/// mappings are expected to use.
fn weekday_key(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Resolve the template id to train on `date`. `Manual` schedules, an
/// empty rotation order, or a weekday with no mapping entry all
/// conservatively return `None` (§7 "Not-applicable").
pub fn select_template(schedule: &ScheduleKind, date: NaiveDate, history: &WorkoutHistory) -> Option<String> {
    match schedule {
        ScheduleKind::FixedWeekday { mapping } => mapping.get(weekday_key(date)).cloned(),
        ScheduleKind::Rotation { order } => {
            if order.is_empty() {
                return None;
            }
            let completed = history
                .sessions
                .iter()
                .filter(|s| s.template_id.as_ref().is_some_and(|t| order.contains(t)))
                .count();
            Some(order[completed % order.len()].clone())
        }
        ScheduleKind::Manual => None,
    }
}
