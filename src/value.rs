//! The value kernel: `Load` arithmetic and unit conversion, rounding
//! policy, e1RM (Brzycki), and the trend classifier. Everything here is
//! a pure function over `Decimal` — no wall-clock, no I/O.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Conversion factor: 1 pound in kilograms.
pub const LB_TO_KG: Decimal = dec!(0.45359237);

/// A unit a `Load` is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Pounds,
    Kilograms,
}

/// A non-negative scalar load expressed in a unit. Zero load is
/// well-defined and is the only legal prescription for bodyweight
/// exercises.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Load {
    pub value: Decimal,
    pub unit: Unit,
}

impl Load {
    pub fn new(value: Decimal, unit: Unit) -> Self {
        Self { value, unit }
    }

    pub fn zero(unit: Unit) -> Self {
        Self { value: Decimal::ZERO, unit }
    }

    /// Convert losslessly to another unit.
    pub fn convert_to(&self, unit: Unit) -> Load {
        if self.unit == unit {
            return *self;
        }
        let value = match (self.unit, unit) {
            (Unit::Pounds, Unit::Kilograms) => self.value * LB_TO_KG,
            (Unit::Kilograms, Unit::Pounds) => self.value / LB_TO_KG,
            _ => self.value,
        };
        Load { value, unit }
    }

    /// Value expressed in the given unit, without changing `self`.
    pub fn value_in(&self, unit: Unit) -> Decimal {
        self.convert_to(unit).value
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    pub fn max(self, other: Load) -> Load {
        let other_in_self_unit = other.convert_to(self.unit);
        if other_in_self_unit.value > self.value {
            other_in_self_unit
        } else {
            self
        }
    }
}

impl std::ops::Add for Load {
    type Output = Load;
    fn add(self, rhs: Load) -> Load {
        Load::new(self.value + rhs.convert_to(self.unit).value, self.unit)
    }
}

impl std::ops::Sub for Load {
    type Output = Load;
    fn sub(self, rhs: Load) -> Load {
        Load::new(self.value - rhs.convert_to(self.unit).value, self.unit)
    }
}

impl std::ops::Mul<Decimal> for Load {
    type Output = Load;
    fn mul(self, rhs: Decimal) -> Load {
        Load::new(self.value * rhs, self.unit)
    }
}

/// Rounding mode for `LoadRoundingPolicy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundingMode {
    Nearest,
    Down,
    Up,
}

/// `{increment>0, unit, mode}`. Rounding is applied to every emitted
/// working load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadRoundingPolicy {
    pub increment: Decimal,
    pub unit: Unit,
    pub mode: RoundingMode,
}

impl LoadRoundingPolicy {
    /// `round(x) = base + step * round_mode((x - base) / step)`, base = 0.
    pub fn round(&self, load: Load) -> Load {
        let converted = load.convert_to(self.unit).value;
        if self.increment <= Decimal::ZERO {
            return Load::new(converted.max(Decimal::ZERO), self.unit);
        }
        let steps = converted / self.increment;
        let rounded_steps = match self.mode {
            RoundingMode::Nearest => steps.round(),
            RoundingMode::Down => steps.floor(),
            RoundingMode::Up => steps.ceil(),
        };
        let rounded = (rounded_steps * self.increment).max(Decimal::ZERO);
        Load::new(rounded, self.unit)
    }
}

/// Clamp a rep count into the domain the Brzycki formula is valid for.
fn clamp_reps(reps: u32) -> u32 {
    reps.clamp(1, 36)
}

/// e1RM via the Brzycki formula: `w * 36 / (37 - r)`, `1 <= r <= 36`.
/// At `r == 1` this returns `w` exactly; reps beyond 36 clamp to 36.
pub fn brzycki_e1rm(weight: Decimal, reps: u32) -> Decimal {
    let r = Decimal::from(clamp_reps(reps));
    if r == dec!(1) {
        return weight;
    }
    weight * dec!(36) / (dec!(37) - r)
}

/// Inverse Brzycki: the working weight that would produce `e1rm` for the
/// given rep count.
pub fn brzycki_working_weight(e1rm: Decimal, reps: u32) -> Decimal {
    let r = Decimal::from(clamp_reps(reps));
    e1rm * (dec!(37) - r) / dec!(36)
}

/// Trend classification over the last <=10 rolling-e1RM samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Improving,
    Stable,
    Declining,
    Insufficient,
}

/// Classify a trend from an ordered (oldest-to-newest) slice of samples.
/// Fewer than 4 samples is `Insufficient`. Otherwise fits a simple linear
/// regression of value against sample index, normalizes the slope by the
/// mean, and classifies against a +/-0.5%-per-sample threshold. Ties
/// favor `Stable`.
pub fn classify_trend(samples: &[Decimal]) -> Trend {
    if samples.len() < 4 {
        return Trend::Insufficient;
    }

    let n = samples.len() as f64;
    let xs: Vec<f64> = (0..samples.len()).map(|i| i as f64).collect();
    let ys: Vec<f64> = samples.iter().map(|d| d.to_f64().unwrap_or(0.0)).collect();

    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for i in 0..samples.len() {
        numerator += (xs[i] - mean_x) * (ys[i] - mean_y);
        denominator += (xs[i] - mean_x).powi(2);
    }

    if denominator == 0.0 || mean_y == 0.0 {
        return Trend::Stable;
    }

    let slope = numerator / denominator;
    let normalized = slope / mean_y;

    if normalized >= 0.005 {
        Trend::Improving
    } else if normalized <= -0.005 {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pound_to_kg_round_trip_within_one_increment() {
        let policy = LoadRoundingPolicy {
            increment: dec!(5),
            unit: Unit::Pounds,
            mode: RoundingMode::Nearest,
        };
        let original = Load::new(dec!(225), Unit::Pounds);
        let back = original.convert_to(Unit::Kilograms).convert_to(Unit::Pounds);
        let rounded = policy.round(back);
        assert!((rounded.value - original.value).abs() <= policy.increment);
    }

    #[test]
    fn brzycki_at_one_rep_returns_weight() {
        assert_eq!(brzycki_e1rm(dec!(300), 1), dec!(300));
    }

    #[test]
    fn brzycki_clamps_above_thirty_six_reps() {
        let at_36 = brzycki_e1rm(dec!(100), 36);
        let at_50 = brzycki_e1rm(dec!(100), 50);
        assert_eq!(at_36, at_50);
    }

    #[test]
    fn brzycki_inverse_round_trips() {
        let e1rm = brzycki_e1rm(dec!(225), 5);
        let w = brzycki_working_weight(e1rm, 5);
        assert_eq!(w.round_dp(4), dec!(225).round_dp(4));
    }

    #[test]
    fn rounding_nearest_snaps_to_increment() {
        let policy = LoadRoundingPolicy {
            increment: dec!(5),
            unit: Unit::Pounds,
            mode: RoundingMode::Nearest,
        };
        let rounded = policy.round(Load::new(dec!(242), Unit::Pounds));
        assert_eq!(rounded.value, dec!(240));
    }

    #[test]
    fn rounding_down_never_rounds_up() {
        let policy = LoadRoundingPolicy {
            increment: dec!(5),
            unit: Unit::Pounds,
            mode: RoundingMode::Down,
        };
        let rounded = policy.round(Load::new(dec!(244), Unit::Pounds));
        assert_eq!(rounded.value, dec!(240));
    }

    #[test]
    fn fewer_than_four_samples_is_insufficient() {
        assert_eq!(classify_trend(&[dec!(100), dec!(101), dec!(102)]), Trend::Insufficient);
    }

    #[test]
    fn rising_samples_are_improving() {
        let samples = vec![dec!(100), dec!(105), dec!(110), dec!(115), dec!(120)];
        assert_eq!(classify_trend(&samples), Trend::Improving);
    }

    #[test]
    fn falling_samples_are_declining() {
        let samples = vec![dec!(120), dec!(115), dec!(110), dec!(105), dec!(100)];
        assert_eq!(classify_trend(&samples), Trend::Declining);
    }

    #[test]
    fn flat_samples_are_stable() {
        let samples = vec![dec!(100), dec!(100), dec!(100), dec!(100)];
        assert_eq!(classify_trend(&samples), Trend::Stable);
    }

    // Property-based tests using proptest, encoding §8's "rounding
    // correctness" and "idempotence" universal invariants.
    use proptest::prelude::*;

    fn policy_for(mode: RoundingMode, increment_cents: i64) -> LoadRoundingPolicy {
        LoadRoundingPolicy { increment: Decimal::new(increment_cents, 2), unit: Unit::Pounds, mode }
    }

    fn rounding_mode_strategy() -> impl Strategy<Value = RoundingMode> {
        prop_oneof![Just(RoundingMode::Nearest), Just(RoundingMode::Down), Just(RoundingMode::Up)]
    }

    proptest! {
        #[test]
        fn rounded_load_is_always_a_multiple_of_the_increment(
            value_cents in 0i64..10_000_00,
            increment_cents in 1i64..2_000,
            mode in rounding_mode_strategy(),
        ) {
            let policy = policy_for(mode, increment_cents);
            let rounded = policy.round(Load::new(Decimal::new(value_cents, 2), Unit::Pounds));
            let steps = rounded.value / policy.increment;
            prop_assert_eq!(steps.round(), steps);
        }

        #[test]
        fn rounding_is_idempotent(
            value_cents in 0i64..10_000_00,
            increment_cents in 1i64..2_000,
            mode in rounding_mode_strategy(),
        ) {
            let policy = policy_for(mode, increment_cents);
            let once = policy.round(Load::new(Decimal::new(value_cents, 2), Unit::Pounds));
            let twice = policy.round(once);
            prop_assert_eq!(once.value, twice.value);
        }

        #[test]
        fn rounded_load_is_never_negative(
            value_cents in 0i64..10_000_00,
            increment_cents in 1i64..2_000,
            mode in rounding_mode_strategy(),
        ) {
            let policy = policy_for(mode, increment_cents);
            let rounded = policy.round(Load::new(Decimal::new(value_cents, 2), Unit::Pounds));
            prop_assert!(rounded.value >= Decimal::ZERO);
        }
    }
}
