//! Domain model: exercises, movement patterns, equipment, prescriptions,
//! templates, plans, lift state, history, and session results.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{HashMap, HashSet};

pub use crate::value::{Load, LoadRoundingPolicy, RoundingMode, Trend, Unit};

/// Equipment families an exercise can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Equipment {
    Barbell,
    Dumbbell,
    Machine,
    Cable,
    Kettlebell,
    Band,
    Bodyweight,
}

impl Equipment {
    /// Equipment-family affinity used by the substitution ranker:
    /// same-family is highest, barbell<->dumbbell next, bodyweight
    /// lowest. Values are monotone, not calibrated to any external scale.
    pub fn affinity(self, other: Equipment) -> Decimal {
        use Equipment::*;
        if self == other {
            return Decimal::from(3);
        }
        match (self, other) {
            (Barbell, Dumbbell) | (Dumbbell, Barbell) => Decimal::from(2),
            (Bodyweight, _) | (_, Bodyweight) => Decimal::new(5, 1),
            _ => Decimal::from(1),
        }
    }
}

/// The equipment a user has access to. Bodyweight is always available.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AvailableEquipment(pub HashSet<Equipment>);

impl AvailableEquipment {
    pub fn new(set: HashSet<Equipment>) -> Self {
        Self(set)
    }

    pub fn is_available(&self, equipment: Equipment) -> bool {
        equipment == Equipment::Bodyweight || self.0.contains(&equipment)
    }
}

/// Movement patterns, each with a compound/isolation classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MovementPattern {
    Squat,
    HipHinge,
    HorizontalPush,
    VerticalPush,
    HorizontalPull,
    VerticalPull,
    Lunge,
    ElbowFlexion,
    ElbowExtension,
    ShoulderAbduction,
    KneeFlexion,
    KneeExtension,
    CoreFlexionStability,
    Unknown,
}

impl MovementPattern {
    pub fn is_compound(self) -> bool {
        use MovementPattern::*;
        matches!(
            self,
            Squat | HipHinge | HorizontalPush | VerticalPush | HorizontalPull | VerticalPull | Lunge
        )
    }
}

/// An exercise in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub equipment: Equipment,
    pub primary_muscles: Vec<String>,
    pub secondary_muscles: Vec<String>,
    pub movement_pattern: MovementPattern,
}

/// Inclusive rep-count range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepsRange {
    pub lo: u32,
    pub hi: u32,
}

impl RepsRange {
    pub fn clamp(&self, reps: u32) -> u32 {
        reps.clamp(self.lo, self.hi.max(self.lo))
    }
}

/// How a set's working load is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoadStrategy {
    Absolute,
    PercentageE1rm,
    RpeAutoregulated,
}

/// `{setCount>=1, targetRepsRange, targetRIR>=0, restSeconds, loadStrategy, targetPercentage?, tempo, increment}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPrescription {
    pub set_count: u32,
    pub target_reps_range: RepsRange,
    pub target_rir: u32,
    pub rest_seconds: u32,
    pub load_strategy: LoadStrategy,
    pub target_percentage: Option<Decimal>,
    pub tempo: Option<String>,
    pub increment: Load,
}

impl SetPrescription {
    /// Construct a prescription with the common fields, leaving tempo and
    /// `targetPercentage` unset and the load strategy `Absolute` -- the
    /// common case for a new template slot. Use the struct literal
    /// directly for `PercentageE1rm`/`RpeAutoregulated` prescriptions.
    pub fn new(set_count: u32, target_reps_range: RepsRange, target_rir: u32, rest_seconds: u32, increment: Load) -> Self {
        Self {
            set_count,
            target_reps_range,
            target_rir,
            rest_seconds,
            load_strategy: LoadStrategy::Absolute,
            target_percentage: None,
            tempo: None,
            increment,
        }
    }

    /// Whether the prescription differs materially from `other` —
    /// strategy, set count, rep range, RIR, tempo, or a rest delta over
    /// 15 seconds — warranting an e1RM rebase rather than a carry-forward
    /// of the last working weight (§4.5).
    pub fn differs_materially_from(&self, other: &SetPrescription) -> bool {
        self.load_strategy != other.load_strategy
            || self.set_count != other.set_count
            || self.target_reps_range != other.target_reps_range
            || self.target_rir != other.target_rir
            || self.tempo != other.tempo
            || (self.rest_seconds as i64 - other.rest_seconds as i64).abs() > 15
    }
}

/// A prescription slot within a template, keyed by a stable id so
/// substitutes can inherit the original's progression/in-session intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateExercise {
    /// Stable id of this template slot; also the key progression and
    /// in-session policies are looked up by.
    pub id: String,
    pub exercise_id: String,
    pub prescription: SetPrescription,
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutTemplate {
    pub id: String,
    pub name: String,
    pub exercises: Vec<TemplateExercise>,
}

/// Template-selection schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ScheduleKind {
    FixedWeekday { mapping: HashMap<String, String> },
    Rotation { order: Vec<String> },
    Manual,
}

/// Between-session progression policy and its configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ProgressionPolicy {
    None,
    LinearProgression {
        success_increment: Load,
        failure_decrement: Option<Load>,
        deload_pct: Decimal,
        failures_before_deload: u32,
    },
    DoubleProgression {
        sessions_at_top_before_increase: u32,
        load_increment: Load,
        deload_pct: Decimal,
        failures_before_deload: u32,
    },
    TopSetBackoff {
        backoff_set_count: u32,
        backoff_percentage: Decimal,
        load_increment: Load,
        use_daily_max: bool,
        minimum_top_set_reps: u32,
    },
    PercentageE1rm,
    /// Legacy: sometimes stored as a progression policy even though it is
    /// properly an in-session policy (§4.7.d, §7 "Policy ambiguity").
    RirAutoregulation,
}

/// In-session set-by-set adjustment policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum InSessionPolicy {
    None,
    RirAutoregulation,
    TopSetBackoff {
        backoff_percentage: Decimal,
        minimum_top_set_reps: u32,
        use_daily_max: bool,
    },
}

/// Deload trigger configuration (§4.4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeloadConfig {
    pub scheduled_deload_weeks: Option<u32>,
    pub low_readiness_days_required: u32,
    pub readiness_threshold: i32,
    pub intensity_reduction: Decimal,
    pub volume_reduction: u32,
}

/// The user's biological sex, used only for magnitude scaling (§4.6):
/// direction decisions never depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Advanced,
    Elite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GoalPhase {
    Hypertrophy,
    Strength,
    CutFatLoss,
    Maintenance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub sex: Sex,
    pub experience: ExperienceLevel,
    pub goal_phase: GoalPhase,
    pub available_equipment: AvailableEquipment,
}

impl UserProfile {
    /// Construct a profile with a freshly generated id, the way
    /// `trainrs`'s athlete config falls back to `Uuid::new_v4()` when no
    /// caller-supplied id is given.
    pub fn new(sex: Sex, experience: ExperienceLevel, goal_phase: GoalPhase, available_equipment: AvailableEquipment) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sex,
            experience,
            goal_phase,
            available_equipment,
        }
    }
}

/// A training plan: templates, schedule, per-exercise policies, a
/// substitution pool, an optional deload config, and a rounding policy.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingPlan {
    pub id: String,
    pub name: String,
    pub templates: HashMap<String, WorkoutTemplate>,
    pub schedule: ScheduleKind,
    /// Keyed by the *original* template exercise id.
    pub progression_policies: HashMap<String, ProgressionPolicy>,
    /// Keyed by the *original* template exercise id. Missing = empty (§6).
    pub in_session_policies: HashMap<String, InSessionPolicy>,
    pub substitution_pool: Vec<Exercise>,
    pub deload_config: Option<DeloadConfig>,
    pub rounding_policy: LoadRoundingPolicy,
}

/// Either a map or a legacy pair-array encoding for `templates` (§6).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TemplatesEncoding {
    Map(HashMap<String, WorkoutTemplate>),
    Pairs(Vec<(String, WorkoutTemplate)>),
}

impl From<TemplatesEncoding> for HashMap<String, WorkoutTemplate> {
    fn from(enc: TemplatesEncoding) -> Self {
        match enc {
            TemplatesEncoding::Map(m) => m,
            TemplatesEncoding::Pairs(pairs) => pairs.into_iter().collect(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrainingPlanRaw {
    id: String,
    name: String,
    templates: TemplatesEncoding,
    schedule: ScheduleKind,
    progression_policies: HashMap<String, ProgressionPolicy>,
    #[serde(default)]
    in_session_policies: HashMap<String, InSessionPolicy>,
    #[serde(default)]
    substitution_pool: Vec<Exercise>,
    #[serde(default)]
    deload_config: Option<DeloadConfig>,
    rounding_policy: LoadRoundingPolicy,
}

impl<'de> Deserialize<'de> for TrainingPlan {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = TrainingPlanRaw::deserialize(deserializer)?;
        Ok(TrainingPlan {
            id: raw.id,
            name: raw.name,
            templates: raw.templates.into(),
            schedule: raw.schedule,
            progression_policies: raw.progression_policies,
            in_session_policies: raw.in_session_policies,
            substitution_pool: raw.substitution_pool,
            deload_config: raw.deload_config,
            rounding_policy: raw.rounding_policy,
        })
    }
}

impl TrainingPlan {
    /// Start a fluent builder, in the style of `trainrs::formulas::
    /// CalculationConfig`'s `with_*` chain, so callers (including tests)
    /// can assemble a valid plan without hand-filling every field.
    pub fn builder(id: impl Into<String>, name: impl Into<String>, schedule: ScheduleKind, rounding_policy: LoadRoundingPolicy) -> TrainingPlanBuilder {
        TrainingPlanBuilder {
            plan: TrainingPlan {
                id: id.into(),
                name: name.into(),
                templates: HashMap::new(),
                schedule,
                progression_policies: HashMap::new(),
                in_session_policies: HashMap::new(),
                substitution_pool: Vec::new(),
                deload_config: None,
                rounding_policy,
            },
        }
    }
}

/// Fluent builder for `TrainingPlan`. Each `with_*` method consumes and
/// returns `self`; `build()` yields the finished plan.
pub struct TrainingPlanBuilder {
    plan: TrainingPlan,
}

impl TrainingPlanBuilder {
    pub fn with_template(mut self, template: WorkoutTemplate) -> Self {
        self.plan.templates.insert(template.id.clone(), template);
        self
    }

    pub fn with_progression_policy(mut self, template_exercise_id: impl Into<String>, policy: ProgressionPolicy) -> Self {
        self.plan.progression_policies.insert(template_exercise_id.into(), policy);
        self
    }

    pub fn with_in_session_policy(mut self, template_exercise_id: impl Into<String>, policy: InSessionPolicy) -> Self {
        self.plan.in_session_policies.insert(template_exercise_id.into(), policy);
        self
    }

    pub fn with_substitution_pool(mut self, pool: Vec<Exercise>) -> Self {
        self.plan.substitution_pool = pool;
        self
    }

    pub fn with_deload_config(mut self, config: DeloadConfig) -> Self {
        self.plan.deload_config = Some(config);
        self
    }

    pub fn build(self) -> TrainingPlan {
        self.plan
    }
}

/// A single rolling-e1RM sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct E1rmSample {
    pub date: NaiveDate,
    pub value: Decimal,
}

/// Per-exercise rolling state, created on first post-session update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiftState {
    pub exercise_id: String,
    pub last_working_weight: Load,
    pub rolling_e1rm: Decimal,
    pub failure_count: u32,
    pub high_rpe_streak: u32,
    pub success_streak: u32,
    pub successful_sessions_count: u32,
    pub last_deload_date: Option<NaiveDate>,
    pub last_session_date: Option<NaiveDate>,
    pub trend: Trend,
    /// Capped at 10, newest last.
    pub e1rm_history: Vec<E1rmSample>,
}

impl LiftState {
    pub fn fresh(exercise_id: impl Into<String>, unit: Unit) -> Self {
        Self {
            exercise_id: exercise_id.into(),
            last_working_weight: Load::zero(unit),
            rolling_e1rm: Decimal::ZERO,
            failure_count: 0,
            high_rpe_streak: 0,
            success_streak: 0,
            successful_sessions_count: 0,
            last_deload_date: None,
            last_session_date: None,
            trend: Trend::Insufficient,
            e1rm_history: Vec::new(),
        }
    }

    pub fn push_e1rm_sample(&mut self, sample: E1rmSample) {
        self.e1rm_history.push(sample);
        if self.e1rm_history.len() > 10 {
            let excess = self.e1rm_history.len() - 10;
            self.e1rm_history.drain(0..excess);
        }
    }
}

/// A single logged set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetResult {
    pub set_index: u32,
    pub completed: bool,
    pub reps: u32,
    pub load: Load,
    pub is_warmup: bool,
    /// RIR the lifter reported for this set, if collected.
    pub observed_rir: Option<u32>,
    /// RIR that was targeted for this set, for RIR-autoregulation deltas.
    pub target_rir: u32,
}

impl SetResult {
    pub fn is_working_set(&self) -> bool {
        self.completed && !self.is_warmup && self.reps > 0
    }
}

/// A logged exercise within a completed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSessionResult {
    pub exercise_id: String,
    /// Original template-exercise id this exposure counts against, for
    /// progression/rebase lookups even when a substitute was performed.
    pub template_exercise_id: Option<String>,
    pub prescription: SetPrescription,
    pub sets: Vec<SetResult>,
}

impl ExerciseSessionResult {
    pub fn working_sets(&self) -> impl Iterator<Item = &SetResult> {
        self.sets.iter().filter(|s| s.is_working_set())
    }

    pub fn all_working_sets_met_lower_bound(&self) -> bool {
        let mut any = false;
        for set in self.working_sets() {
            any = true;
            if set.reps < self.prescription.target_reps_range.lo {
                return false;
            }
        }
        any
    }

    pub fn any_working_set_below_lower_bound(&self) -> bool {
        self.working_sets().any(|s| s.reps < self.prescription.target_reps_range.lo)
    }

    /// True if every working set reached the range ceiling -- the
    /// "session at top" condition double progression and the direction
    /// layer's easy-session gate both key off.
    pub fn all_working_sets_at_ceiling(&self) -> bool {
        let mut any = false;
        for set in self.working_sets() {
            any = true;
            if set.reps < self.prescription.target_reps_range.hi {
                return false;
            }
        }
        any
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedSession {
    pub date: NaiveDate,
    pub template_id: Option<String>,
    pub was_deload: bool,
    pub exercises: Vec<ExerciseSessionResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadinessRecord {
    pub date: NaiveDate,
    pub score: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutHistory {
    /// Newest-first.
    pub sessions: Vec<CompletedSession>,
    pub lift_states: HashMap<String, LiftState>,
    pub readiness_history: Vec<ReadinessRecord>,
    pub recent_volume_by_date: HashMap<NaiveDate, Decimal>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkoutHistoryRaw {
    sessions: Vec<CompletedSession>,
    #[serde(default)]
    lift_states: HashMap<String, LiftState>,
    #[serde(default)]
    readiness_history: Vec<ReadinessRecord>,
    #[serde(default)]
    recent_volume_by_date: HashMap<NaiveDate, Decimal>,
}

impl<'de> Deserialize<'de> for WorkoutHistory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut raw = WorkoutHistoryRaw::deserialize(deserializer)?;
        // Normalize to newest-first on decode (§6). An empty `sessions` is
        // legal -- a fresh user with no logged history.
        raw.sessions.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(WorkoutHistory {
            sessions: raw.sessions,
            lift_states: raw.lift_states,
            readiness_history: raw.readiness_history,
            recent_volume_by_date: raw.recent_volume_by_date,
        })
    }
}

impl WorkoutHistory {
    pub fn empty() -> Self {
        Self {
            sessions: Vec::new(),
            lift_states: HashMap::new(),
            readiness_history: Vec::new(),
            recent_volume_by_date: HashMap::new(),
        }
    }

    /// Most recent completed exposure for the given exercise id
    /// (matched against either the performed exercise or its original
    /// template-exercise id), newest-first order assumed.
    pub fn most_recent_exposure(&self, id: &str) -> Option<(&CompletedSession, &ExerciseSessionResult)> {
        for session in &self.sessions {
            for ex in &session.exercises {
                if ex.exercise_id == id || ex.template_exercise_id.as_deref() == Some(id) {
                    return Some((session, ex));
                }
            }
        }
        None
    }

    /// All completed exposures for the given exercise id (matched against
    /// either the performed exercise or its original template-exercise
    /// id), newest-first.
    pub fn exposures_for<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a ExerciseSessionResult> + 'a {
        self.sessions.iter().flat_map(move |session| {
            session
                .exercises
                .iter()
                .filter(move |ex| ex.exercise_id == id || ex.template_exercise_id.as_deref() == Some(id))
        })
    }

    /// Sum of `recent_volume_by_date` over the `days` calendar days
    /// immediately preceding (not including) `from`. §8's "7-day volume
    /// window inclusivity": day `-days` itself is excluded.
    pub fn total_volume(&self, last_days: i64, from: NaiveDate) -> Decimal {
        let mut total = Decimal::ZERO;
        for offset in 1..=last_days {
            let day = from - chrono::Duration::days(offset);
            if let Some(v) = self.recent_volume_by_date.get(&day) {
                total += *v;
            }
        }
        total
    }
}

/// Direction a lift's load/volume should move between sessions (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Increase,
    Hold,
    DecreaseSlightly,
    Deload,
    ResetAfterBreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InsightKind {
    ApproachingDeload,
    NewEstimatedMax,
    DetrainingApplied,
    Plateau,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub kind: InsightKind,
    pub message: String,
}

/// A single planned set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPlan {
    pub set_index: u32,
    pub target_load: Load,
    pub target_reps: u32,
    pub target_rir: u32,
    pub rest_seconds: u32,
    pub is_warmup: bool,
    pub backoff_percentage: Option<Decimal>,
    pub in_session_policy: InSessionPolicy,
    pub rounding_policy: LoadRoundingPolicy,
    /// Carried from `SetPrescription.increment` so `adjustDuringSession`
    /// can shift load without a third parameter.
    pub increment: Load,
    pub rep_range: RepsRange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExercisePlan {
    pub exercise: Exercise,
    pub prescription: SetPrescription,
    pub sets: Vec<SetPlan>,
    pub progression_policy: ProgressionPolicy,
    pub in_session_policy: InSessionPolicy,
    pub substitutions: Vec<Exercise>,
    pub direction: Option<Direction>,
    pub direction_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPlan {
    pub date: NaiveDate,
    pub template_id: Option<String>,
    pub exercises: Vec<ExercisePlan>,
    pub is_deload: bool,
    pub deload_reason: Option<String>,
    pub insights: Vec<Insight>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn templates_decode_from_pair_array() {
        let json = serde_json::json!({
            "id": "p1",
            "name": "Plan",
            "templates": [["a", {"id": "a", "name": "A", "exercises": []}]],
            "schedule": {"kind": "manual"},
            "progressionPolicies": {},
            "substitutionPool": [],
            "roundingPolicy": {"increment": "5", "unit": "pounds", "mode": "nearest"}
        });
        let plan: TrainingPlan = serde_json::from_value(json).unwrap();
        assert!(plan.templates.contains_key("a"));
        assert!(plan.in_session_policies.is_empty());
    }

    #[test]
    fn templates_decode_from_map() {
        let json = serde_json::json!({
            "id": "p1",
            "name": "Plan",
            "templates": {"a": {"id": "a", "name": "A", "exercises": []}},
            "schedule": {"kind": "manual"},
            "progressionPolicies": {},
            "roundingPolicy": {"increment": "5", "unit": "pounds", "mode": "nearest"}
        });
        let plan: TrainingPlan = serde_json::from_value(json).unwrap();
        assert!(plan.templates.contains_key("a"));
    }

    #[test]
    fn history_sessions_normalize_newest_first() {
        let json = serde_json::json!({
            "sessions": [
                {"date": "2026-01-01", "templateId": null, "wasDeload": false, "exercises": []},
                {"date": "2026-01-05", "templateId": null, "wasDeload": false, "exercises": []},
                {"date": "2026-01-03", "templateId": null, "wasDeload": false, "exercises": []}
            ]
        });
        let history: WorkoutHistory = serde_json::from_value(json).unwrap();
        assert_eq!(history.sessions[0].date, NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        assert_eq!(history.sessions[2].date, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    }

    #[test]
    fn volume_window_excludes_the_boundary_day() {
        let mut history = WorkoutHistory::empty();
        let today = NaiveDate::from_ymd_opt(2026, 1, 8).unwrap();
        for offset in 0..=7i64 {
            history
                .recent_volume_by_date
                .insert(today - chrono::Duration::days(offset), dec!(1000));
        }
        assert_eq!(history.total_volume(7, today), dec!(7000));
    }

    #[test]
    fn bodyweight_is_always_available() {
        let eq = AvailableEquipment::new(HashSet::new());
        assert!(eq.is_available(Equipment::Bodyweight));
        assert!(!eq.is_available(Equipment::Barbell));
    }

    #[test]
    fn builder_assembles_a_usable_plan() {
        let template = WorkoutTemplate { id: "a".into(), name: "A".into(), exercises: vec![] };
        let plan = TrainingPlan::builder(
            "p1",
            "Plan",
            ScheduleKind::Manual,
            LoadRoundingPolicy { increment: dec!(5), unit: Unit::Pounds, mode: RoundingMode::Nearest },
        )
        .with_template(template)
        .with_progression_policy("te1", ProgressionPolicy::None)
        .build();
        assert!(plan.templates.contains_key("a"));
        assert_eq!(plan.progression_policies.get("te1"), Some(&ProgressionPolicy::None));
    }

    // Property-based tests using proptest, encoding §8's "equipment
    // availability" universal invariant.
    use proptest::prelude::*;

    fn equipment_strategy() -> impl Strategy<Value = Equipment> {
        prop_oneof![
            Just(Equipment::Barbell),
            Just(Equipment::Dumbbell),
            Just(Equipment::Machine),
            Just(Equipment::Cable),
            Just(Equipment::Kettlebell),
            Just(Equipment::Band),
            Just(Equipment::Bodyweight),
        ]
    }

    proptest! {
        #[test]
        fn bodyweight_always_available_and_membership_determines_the_rest(
            owned in prop::collection::vec(equipment_strategy(), 0..7)
        ) {
            let owned_set: HashSet<Equipment> = owned.into_iter().collect();
            let available = AvailableEquipment::new(owned_set.clone());

            prop_assert!(available.is_available(Equipment::Bodyweight));

            for candidate in [
                Equipment::Barbell,
                Equipment::Dumbbell,
                Equipment::Machine,
                Equipment::Cable,
                Equipment::Kettlebell,
                Equipment::Band,
            ] {
                prop_assert_eq!(available.is_available(candidate), owned_set.contains(&candidate));
            }
        }
    }
}
