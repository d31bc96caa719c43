//! The planner (§4.7, top level): orchestrates the scheduler, the
//! deload policy, the substitution ranker, progression policies, and
//! in-session policy resolution into a `SessionPlan`. Every anomalous
//! input (missing template, no usable exercise, e1RM-less %e1RM policy)
//! folds into a conservative output rather than failing the call.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::calendar::Calendar;
use crate::deload::evaluate_deload;
use crate::direction::{compute_magnitude, decide_direction, LiftSignals};
use crate::insights::{deload_insights, exercise_insights};
use crate::model::{
    AvailableEquipment, DeloadConfig, Direction, Equipment, Exercise, ExercisePlan, ExerciseSessionResult,
    InSessionPolicy, LiftState, LoadRoundingPolicy, MovementPattern, ProgressionPolicy, SessionPlan, SetPlan,
    SetPrescription, TemplateExercise, TrainingPlan, UserProfile, WorkoutHistory, WorkoutTemplate,
};
use crate::progression::{compute_next_load, compute_next_target_reps, compute_set_load, failures_before_deload, material_rebase_load, percentage_e1rm_load};
use crate::scheduler::select_template;
use crate::substitution::{muscle_overlap, rank_substitutions};
use crate::value::{Load, Unit};

/// `recommendSession` = schedule-select + `recommendSessionForTemplate`.
pub fn recommend_session(
    date: NaiveDate,
    user: &UserProfile,
    plan: &TrainingPlan,
    history: &WorkoutHistory,
    readiness: i32,
    calendar: &dyn Calendar,
) -> SessionPlan {
    match select_template(&plan.schedule, date, history) {
        Some(template_id) => {
            recommend_session_for_template(date, &template_id, user, plan, history, readiness, &HashSet::new(), calendar)
        }
        None => empty_plan(date, None),
    }
}

fn empty_plan(date: NaiveDate, template_id: Option<String>) -> SessionPlan {
    SessionPlan {
        date,
        template_id,
        exercises: Vec::new(),
        is_deload: false,
        deload_reason: None,
        insights: Vec::new(),
    }
}

/// `recommendSessionForTemplate`.
pub fn recommend_session_for_template(
    date: NaiveDate,
    template_id: &str,
    user: &UserProfile,
    plan: &TrainingPlan,
    history: &WorkoutHistory,
    readiness: i32,
    excluding: &HashSet<String>,
    calendar: &dyn Calendar,
) -> SessionPlan {
    let template = match plan.templates.get(template_id) {
        Some(t) => t,
        None => return empty_plan(date, Some(template_id.to_string())),
    };

    let deload_decision = evaluate_deload(plan.deload_config.as_ref(), date, history, readiness, calendar);

    let exercise_by_id: HashMap<&str, &Exercise> =
        plan.substitution_pool.iter().map(|e| (e.id.as_str(), e)).collect();

    let other_originals: HashSet<&str> = template.exercises.iter().map(|te| te.exercise_id.as_str()).collect();

    let mut sorted_exercises: Vec<&TemplateExercise> = template.exercises.iter().collect();
    sorted_exercises.sort_by_key(|te| te.order);

    let mut used_this_session: HashSet<String> = HashSet::new();
    let mut exercise_plans = Vec::new();
    let mut insights = deload_insights(&deload_decision);

    for template_exercise in sorted_exercises {
        if excluding.contains(&template_exercise.id) || excluding.contains(&template_exercise.exercise_id) {
            continue;
        }
        let original = match exercise_by_id.get(template_exercise.exercise_id.as_str()) {
            Some(e) => *e,
            None => continue,
        };

        let ranked = rank_substitutions(original, &plan.substitution_pool, &user.available_equipment, plan.substitution_pool.len());
        let others_excluding_self: HashSet<&str> =
            other_originals.iter().copied().filter(|id| *id != original.id.as_str()).collect();

        let effective = match choose_exercise_to_perform(original, &ranked, &user.available_equipment, &used_this_session, &others_excluding_self) {
            Some(e) => e,
            None => continue,
        };
        used_this_session.insert(effective.id.clone());

        let lift_state = derive_effective_lift_state(&effective, original, history, &exercise_by_id, date, calendar);

        let progression_policy = plan
            .progression_policies
            .get(&template_exercise.id)
            .cloned()
            .unwrap_or(ProgressionPolicy::None);
        let (progression_policy, legacy_rir) = coerce_legacy_progression(progression_policy);

        let in_session_policy = resolve_in_session_policy(
            plan.in_session_policies.get(&template_exercise.id).copied(),
            legacy_rir,
            &progression_policy,
            &template_exercise.prescription,
        );

        let last_exposure = history.most_recent_exposure(&template_exercise.id).map(|(_, ex)| ex);
        let days_since_last_session = lift_state.last_session_date.map(|d| calendar.days_between(d, date));
        let recent_easy_sessions = recent_easy_session_count(history, &template_exercise.id);

        let plan_exercise = build_exercise_plan(
            effective.clone(),
            template_exercise.prescription.clone(),
            progression_policy,
            in_session_policy,
            &lift_state,
            last_exposure,
            deload_decision.should_deload,
            plan.deload_config.as_ref(),
            &plan.rounding_policy,
            Some(user),
            days_since_last_session,
            ranked,
            readiness,
            recent_easy_sessions,
        );

        insights.extend(exercise_insights(&lift_state, false, days_since_last_session.is_some_and(|d| d >= 28)));
        exercise_plans.push(plan_exercise);
    }

    SessionPlan {
        date,
        template_id: Some(template_id.to_string()),
        exercises: exercise_plans,
        is_deload: deload_decision.should_deload,
        deload_reason: deload_decision.reason.map(|r| r.as_str().to_string()),
        insights,
    }
}

/// `nextPrescription`: must agree exactly with the per-exercise plan
/// `recommendSessionForTemplate` would have produced given the same
/// inputs, so it shares `build_exercise_plan` with the loop above rather
/// than re-deriving the computation.
#[allow(clippy::too_many_arguments)]
pub fn next_prescription(
    exercise: Exercise,
    prescription: SetPrescription,
    progression_policy: ProgressionPolicy,
    in_session_policy: Option<InSessionPolicy>,
    history: &WorkoutHistory,
    lift_state: &LiftState,
    is_deload: bool,
    rounding_policy: &LoadRoundingPolicy,
    deload_config: Option<&DeloadConfig>,
    _user_profile: Option<&UserProfile>,
    date: NaiveDate,
    calendar: &dyn Calendar,
) -> ExercisePlan {
    let (progression_policy, legacy_rir) = coerce_legacy_progression(progression_policy);
    let in_session_policy = match in_session_policy {
        Some(p) => p,
        None => resolve_in_session_policy(None, legacy_rir, &progression_policy, &prescription),
    };
    let last_exposure = history.most_recent_exposure(&exercise.id).map(|(_, ex)| ex);
    let days_since_last_session = lift_state.last_session_date.map(|d| calendar.days_between(d, date));
    let recent_easy_sessions = recent_easy_session_count(history, &exercise.id);

    build_exercise_plan(
        exercise,
        prescription,
        progression_policy,
        in_session_policy,
        lift_state,
        last_exposure,
        is_deload,
        deload_config,
        rounding_policy,
        None,
        days_since_last_session,
        Vec::new(),
        0,
        recent_easy_sessions,
    )
}

/// Count of consecutive "easy" exposures for this exercise, newest-first,
/// stopping at the first exposure that wasn't easy -- the
/// `recentEasySessionCount` the §4.6 rule-5 gate reads (§4.6, direction's
/// `easySession` trigger: last working set's `observedRIR >= targetRIR + 1.0`).
fn recent_easy_session_count(history: &WorkoutHistory, id: &str) -> u32 {
    let mut count = 0;
    for ex in history.exposures_for(id) {
        let delta = ex
            .working_sets()
            .filter_map(|s| s.observed_rir.map(|r| Decimal::from(r as i64) - Decimal::from(s.target_rir as i64)))
            .last();
        if delta.is_some_and(|d| d >= dec!(1.0)) {
            count += 1;
        } else {
            break;
        }
    }
    count
}

/// Legacy policy ambiguity (§7): `.rirAutoregulation` stored as a
/// progression policy is coerced into an in-session role, with `None`
/// substituted as the default between-session policy.
fn coerce_legacy_progression(policy: ProgressionPolicy) -> (ProgressionPolicy, bool) {
    match policy {
        ProgressionPolicy::RirAutoregulation => (ProgressionPolicy::None, true),
        other => (other, false),
    }
}

/// In-session policy resolution order: explicit override > legacy-derived
/// > `topSetBackoff` when progression is daily-max top-set > prescription
/// default.
fn resolve_in_session_policy(
    explicit: Option<InSessionPolicy>,
    legacy_rir: bool,
    progression_policy: &ProgressionPolicy,
    prescription: &SetPrescription,
) -> InSessionPolicy {
    if let Some(p) = explicit {
        return p;
    }
    if legacy_rir {
        return InSessionPolicy::RirAutoregulation;
    }
    if let ProgressionPolicy::TopSetBackoff { backoff_percentage, use_daily_max: true, minimum_top_set_reps, .. } =
        progression_policy
    {
        return InSessionPolicy::TopSetBackoff {
            backoff_percentage: *backoff_percentage,
            minimum_top_set_reps: *minimum_top_set_reps,
            use_daily_max: true,
        };
    }
    match prescription.load_strategy {
        crate::model::LoadStrategy::RpeAutoregulated => InSessionPolicy::RirAutoregulation,
        _ => InSessionPolicy::None,
    }
}

/// Substitution selection (§4.3 "Planner use of ranker"): original if
/// available and unused, else the best usable, unused, non-colliding
/// substitute; relax the collision constraint if nothing satisfies it;
/// omit the exercise if even that fails.
fn choose_exercise_to_perform(
    original: &Exercise,
    ranked: &[Exercise],
    available: &AvailableEquipment,
    used_this_session: &HashSet<String>,
    other_originals: &HashSet<&str>,
) -> Option<Exercise> {
    if available.is_available(original.equipment) && !used_this_session.contains(&original.id) {
        return Some(original.clone());
    }
    if let Some(c) = ranked
        .iter()
        .find(|c| !used_this_session.contains(&c.id) && !other_originals.contains(c.id.as_str()))
    {
        return Some(c.clone());
    }
    ranked.iter().find(|c| !used_this_session.contains(&c.id)).cloned()
}

/// Cross-equipment load-scale heuristics (§4.7.c, Open Question: treated
/// as monotone, not exact). `from -> to` in the direction of a
/// substitution (original -> substitute); the inverse is used when
/// seeding back from a substitute to its original.
fn cross_equipment_scale(from: Equipment, to: Equipment, pattern: MovementPattern) -> Decimal {
    use Equipment::*;
    use MovementPattern::*;
    if from == to {
        return Decimal::ONE;
    }
    match (from, to) {
        (Barbell, Dumbbell) => match pattern {
            Squat | Lunge => dec!(0.35),
            HipHinge => dec!(0.55),
            HorizontalPush | VerticalPush => dec!(0.45),
            _ => dec!(0.45),
        },
        (Dumbbell, Barbell) => Decimal::ONE / cross_equipment_scale(Barbell, Dumbbell, pattern),
        (Barbell, Machine) => dec!(0.70),
        (Machine, Barbell) => Decimal::ONE / dec!(0.70),
        _ => dec!(0.90),
    }
}

/// Conservative penalty applied when refreshing an original's state from
/// a comparable substitute's more recent data (§4.7.c).
fn family_penalty(a: Equipment, b: Equipment) -> Decimal {
    use Equipment::*;
    if a == b {
        return Decimal::ONE;
    }
    match (a, b) {
        (Barbell, Dumbbell) | (Dumbbell, Barbell) => dec!(0.90),
        (Barbell, Machine) | (Machine, Barbell) => dec!(0.92),
        _ => dec!(0.90),
    }
}

/// Find the most recently trained exercise that shares the original's
/// movement pattern with >=0.60 primary-muscle overlap, trained within
/// the last 28 days -- a "comparable substitute" (§4.4 Glossary) used to
/// rebase a return to the original lift.
fn find_comparable_substitute<'a>(
    original: &Exercise,
    history: &'a WorkoutHistory,
    exercise_by_id: &HashMap<&str, &Exercise>,
    date: NaiveDate,
    calendar: &dyn Calendar,
) -> Option<(&'a LiftState, Decimal)> {
    let mut best: Option<(&LiftState, NaiveDate)> = None;
    for (id, state) in &history.lift_states {
        if id == &original.id {
            continue;
        }
        let candidate = match exercise_by_id.get(id.as_str()) {
            Some(e) => *e,
            None => continue,
        };
        if candidate.movement_pattern != original.movement_pattern {
            continue;
        }
        if muscle_overlap(&original.primary_muscles, &candidate.primary_muscles) < dec!(0.60) {
            continue;
        }
        let last_session = match state.last_session_date {
            Some(d) => d,
            None => continue,
        };
        if calendar.days_between(last_session, date) >= 28 {
            continue;
        }
        if best.is_none_or_older_than(last_session) {
            best = Some((state, last_session));
        }
    }
    best.map(|(state, last_session)| {
        let _ = last_session;
        let candidate_equipment = exercise_by_id.get(state.exercise_id.as_str()).map(|e| e.equipment).unwrap_or(original.equipment);
        (state, family_penalty(original.equipment, candidate_equipment))
    })
}

trait OlderThan {
    fn is_none_or_older_than(&self, date: NaiveDate) -> bool;
}
impl<'a> OlderThan for Option<(&'a LiftState, NaiveDate)> {
    fn is_none_or_older_than(&self, date: NaiveDate) -> bool {
        match self {
            None => true,
            Some((_, d)) => date > *d,
        }
    }
}

/// Effective lift-state derivation (§4.7.c).
fn derive_effective_lift_state(
    effective: &Exercise,
    original: &Exercise,
    history: &WorkoutHistory,
    exercise_by_id: &HashMap<&str, &Exercise>,
    date: NaiveDate,
    calendar: &dyn Calendar,
) -> LiftState {
    if let Some(state) = history.lift_states.get(&effective.id) {
        if !state.last_working_weight.is_zero() {
            let mut state = state.clone();
            if effective.id == original.id {
                let gap = state.last_session_date.map(|d| calendar.days_between(d, date));
                if gap.is_some_and(|g| g >= 28) {
                    if let Some((comparable, scale)) = find_comparable_substitute(original, history, exercise_by_id, date, calendar) {
                        state.last_working_weight = comparable.last_working_weight * scale;
                        state.rolling_e1rm = comparable.rolling_e1rm * scale;
                        state.last_session_date = Some(date);
                    }
                }
            }
            return state;
        }
    }

    if effective.id != original.id {
        if let Some(orig_state) = history.lift_states.get(&original.id) {
            if !orig_state.last_working_weight.is_zero() {
                let scale = cross_equipment_scale(original.equipment, effective.equipment, original.movement_pattern);
                let mut seeded = LiftState::fresh(effective.id.clone(), orig_state.last_working_weight.unit);
                seeded.last_working_weight = orig_state.last_working_weight * scale;
                seeded.rolling_e1rm = orig_state.rolling_e1rm * scale;
                return seeded;
            }
        }
    } else if let Some((comparable, scale)) = find_comparable_substitute(original, history, exercise_by_id, date, calendar) {
        let mut seeded = LiftState::fresh(effective.id.clone(), comparable.last_working_weight.unit);
        seeded.last_working_weight = comparable.last_working_weight * scale;
        seeded.rolling_e1rm = comparable.rolling_e1rm * scale;
        return seeded;
    }

    LiftState::fresh(effective.id.clone(), Unit::Pounds)
}

fn detraining_reduction(days_since_last_session: Option<i64>) -> Decimal {
    match days_since_last_session {
        None => Decimal::ZERO,
        Some(d) if d < 28 => Decimal::ZERO,
        Some(d) if d < 56 => dec!(0.10),
        Some(d) if d < 84 => dec!(0.20),
        _ => dec!(0.30),
    }
}

/// The shared per-exercise computation behind both `recommendSessionForTemplate`
/// and `nextPrescription` (§4.7 steps d-k).
#[allow(clippy::too_many_arguments)]
fn build_exercise_plan(
    exercise: Exercise,
    prescription: SetPrescription,
    progression_policy: ProgressionPolicy,
    in_session_policy: InSessionPolicy,
    lift_state: &LiftState,
    last_exposure: Option<&ExerciseSessionResult>,
    is_deload: bool,
    deload_config: Option<&DeloadConfig>,
    rounding_policy: &LoadRoundingPolicy,
    user: Option<&UserProfile>,
    days_since_last_session: Option<i64>,
    substitutions: Vec<Exercise>,
    readiness: i32,
    recent_easy_sessions: u32,
) -> ExercisePlan {
    let plan_unit = rounding_policy.unit;

    let mut base_load = if exercise.equipment == Equipment::Bodyweight {
        Load::zero(plan_unit)
    } else if let Some(rebased) = last_exposure.and_then(|last| {
        material_rebase_load(&prescription, Some(&last.prescription), lift_state.rolling_e1rm, lift_state.last_working_weight.unit, rounding_policy)
    }) {
        rebased
    } else if prescription.load_strategy == crate::model::LoadStrategy::PercentageE1rm {
        percentage_e1rm_load(lift_state, prescription.target_percentage.unwrap_or(Decimal::ZERO), plan_unit)
    } else {
        compute_next_load(&progression_policy, lift_state, last_exposure, plan_unit)
    };

    let detraining = detraining_reduction(days_since_last_session);
    if !detraining.is_zero() {
        base_load = base_load * (Decimal::ONE - detraining);
    }
    if is_deload {
        if let Some(cfg) = deload_config {
            base_load = base_load * (Decimal::ONE - cfg.intensity_reduction);
        }
    }

    let base_load = rounding_policy.round(base_load.convert_to(plan_unit));

    let mut target_reps = compute_next_target_reps(&progression_policy, prescription.target_reps_range, last_exposure);
    let mut set_count = prescription.set_count;
    if is_deload {
        target_reps = prescription.target_reps_range.lo;
        if let Some(cfg) = deload_config {
            set_count = set_count.saturating_sub(cfg.volume_reduction).max(1);
        }
    }

    let mut sets = Vec::with_capacity(set_count as usize);
    for set_index in 0..set_count {
        let (load, backoff_pct) = compute_set_load(set_index, &progression_policy, base_load, rounding_policy);
        sets.push(SetPlan {
            set_index,
            target_load: load,
            target_reps,
            target_rir: prescription.target_rir,
            rest_seconds: prescription.rest_seconds,
            is_warmup: false,
            backoff_percentage: backoff_pct,
            in_session_policy,
            rounding_policy: rounding_policy.clone(),
            increment: prescription.increment,
            rep_range: prescription.target_reps_range,
        });
    }

    // Direction/magnitude is advisory (§4.7.5 "Insights are a pure function
    // of state"): it annotates the plan but never feeds back into the load
    // already computed above via the progression policy.
    let (direction, direction_reason) = match user {
        Some(u) => {
            let signals = lift_signals(
                &exercise,
                lift_state,
                last_exposure,
                days_since_last_session,
                u,
                failures_before_deload(&progression_policy),
                readiness,
                recent_easy_sessions,
            );
            let (d, reason) = decide_direction(&signals);
            let _ = compute_magnitude(d, prescription.increment, &signals, matches!(d, Direction::Hold) && signals.today_readiness < 40);
            (Some(d), Some(reason))
        }
        None => (None, None),
    };

    ExercisePlan {
        exercise,
        prescription,
        sets,
        progression_policy,
        in_session_policy,
        substitutions,
        direction,
        direction_reason,
    }
}

fn lift_signals(
    exercise: &Exercise,
    lift_state: &LiftState,
    last_exposure: Option<&ExerciseSessionResult>,
    days_since_last_session: Option<i64>,
    user: &UserProfile,
    failures_threshold: Option<u32>,
    today_readiness: i32,
    recent_easy_sessions: u32,
) -> LiftSignals {
    let grinder_or_miss = last_exposure.is_some_and(|ex| ex.any_working_set_below_lower_bound());
    let rir_delta = last_exposure.and_then(|ex| {
        ex.working_sets()
            .filter_map(|s| s.observed_rir.map(|r| Decimal::from(r as i64) - Decimal::from(s.target_rir as i64)))
            .last()
    });
    let reps_at_ceiling = last_exposure.is_some_and(|ex| ex.all_working_sets_at_ceiling());

    LiftSignals {
        days_since_last_exposure: days_since_last_session,
        fail_streak: lift_state.failure_count,
        failures_before_deload: failures_threshold,
        today_readiness,
        grinder_or_miss,
        trend: lift_state.trend,
        is_compound: exercise.movement_pattern.is_compound(),
        rir_delta,
        recent_easy_session_count: recent_easy_sessions,
        reps_at_ceiling,
        sex: user.sex,
        experience: user.experience,
        goal_phase: user.goal_phase,
        movement_pattern: exercise.movement_pattern,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::GregorianCalendar;
    use crate::model::{AvailableEquipment, ExperienceLevel, GoalPhase, LoadStrategy, RepsRange, RoundingMode, ScheduleKind, Sex};
    use rust_decimal_macros::dec;
    use std::collections::HashSet as Set;

    fn bench() -> Exercise {
        Exercise {
            id: "bench".into(),
            name: "Barbell Bench Press".into(),
            equipment: Equipment::Barbell,
            primary_muscles: vec!["chest".into(), "triceps".into()],
            secondary_muscles: vec!["shoulders".into()],
            movement_pattern: MovementPattern::HorizontalPush,
        }
    }

    fn push_up() -> Exercise {
        Exercise {
            id: "push_up".into(),
            name: "Push-Up".into(),
            equipment: Equipment::Bodyweight,
            primary_muscles: vec!["chest".into(), "triceps".into()],
            secondary_muscles: vec!["shoulders".into()],
            movement_pattern: MovementPattern::HorizontalPush,
        }
    }

    fn rx() -> SetPrescription {
        SetPrescription {
            set_count: 3,
            target_reps_range: RepsRange { lo: 5, hi: 8 },
            target_rir: 2,
            rest_seconds: 120,
            load_strategy: LoadStrategy::Absolute,
            target_percentage: None,
            tempo: None,
            increment: Load::new(dec!(5), Unit::Pounds),
        }
    }

    fn plan_with(template: WorkoutTemplate, pool: Vec<Exercise>) -> TrainingPlan {
        let mut templates = HashMap::new();
        templates.insert(template.id.clone(), template);
        TrainingPlan {
            id: "p1".into(),
            name: "Plan".into(),
            templates,
            schedule: ScheduleKind::Manual,
            progression_policies: HashMap::new(),
            in_session_policies: HashMap::new(),
            substitution_pool: pool,
            deload_config: None,
            rounding_policy: LoadRoundingPolicy { increment: dec!(5), unit: Unit::Pounds, mode: RoundingMode::Nearest },
        }
    }

    fn user(equipment: Set<Equipment>) -> UserProfile {
        UserProfile {
            id: "u1".into(),
            sex: Sex::Male,
            experience: ExperienceLevel::Intermediate,
            goal_phase: GoalPhase::Hypertrophy,
            available_equipment: AvailableEquipment::new(equipment),
        }
    }

    #[test]
    fn missing_template_yields_empty_plan() {
        let plan = plan_with(WorkoutTemplate { id: "a".into(), name: "A".into(), exercises: vec![] }, vec![]);
        let history = WorkoutHistory::empty();
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let result = recommend_session_for_template(date, "missing", &user(Set::new()), &plan, &history, 70, &HashSet::new(), &GregorianCalendar);
        assert!(result.exercises.is_empty());
    }

    #[test]
    fn bodyweight_substitution_zeroes_load() {
        let template = WorkoutTemplate {
            id: "a".into(),
            name: "A".into(),
            exercises: vec![TemplateExercise { id: "te1".into(), exercise_id: "bench".into(), prescription: rx(), order: 0 }],
        };
        let plan = plan_with(template, vec![bench(), push_up()]);
        let mut history = WorkoutHistory::empty();
        history.lift_states.insert(
            "bench".into(),
            LiftState { last_working_weight: Load::new(dec!(225), Unit::Pounds), ..LiftState::fresh("bench", Unit::Pounds) },
        );
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let result = recommend_session_for_template(date, "a", &user(Set::new()), &plan, &history, 70, &HashSet::new(), &GregorianCalendar);
        assert_eq!(result.exercises.len(), 1);
        assert_eq!(result.exercises[0].exercise.id, "push_up");
        assert!(result.exercises[0].sets.iter().all(|s| s.target_load.value.is_zero()));
    }

    #[test]
    fn percentage_e1rm_rounds_to_policy_increment() {
        let mut prescription = rx();
        prescription.load_strategy = LoadStrategy::PercentageE1rm;
        prescription.target_percentage = Some(dec!(0.80));
        let template = WorkoutTemplate {
            id: "a".into(),
            name: "A".into(),
            exercises: vec![TemplateExercise { id: "te1".into(), exercise_id: "bench".into(), prescription, order: 0 }],
        };
        let plan = plan_with(template, vec![bench()]);
        let mut history = WorkoutHistory::empty();
        history.lift_states.insert(
            "bench".into(),
            LiftState { rolling_e1rm: dec!(300), last_working_weight: Load::new(dec!(200), Unit::Pounds), ..LiftState::fresh("bench", Unit::Pounds) },
        );
        let mut equipment = Set::new();
        equipment.insert(Equipment::Barbell);
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let result = recommend_session_for_template(date, "a", &user(equipment), &plan, &history, 70, &HashSet::new(), &GregorianCalendar);
        for set in &result.exercises[0].sets {
            assert_eq!(set.target_load.value, dec!(240));
        }
    }
}
