//! Substitution ranker (§4.3): order candidate exercises by equipment
//! availability, movement-pattern match, muscle overlap, and equipment
//! affinity. Pure and total over its inputs — unavailable candidates are
//! discarded outright, and ties are broken by a stable id ordering so
//! results never depend on input or map iteration order.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashSet;

use crate::model::{AvailableEquipment, Exercise};

/// Jaccard overlap of two muscle-name lists: `|A \u{2229} B| / |A \u{222a} B|`.
pub fn muscle_overlap(a: &[String], b: &[String]) -> Decimal {
    let set_a: HashSet<&str> = a.iter().map(String::as_str).collect();
    let set_b: HashSet<&str> = b.iter().map(String::as_str).collect();
    let union = set_a.union(&set_b).count();
    if union == 0 {
        return Decimal::ZERO;
    }
    let intersection = set_a.intersection(&set_b).count();
    Decimal::from(intersection) / Decimal::from(union)
}

fn score(original: &Exercise, candidate: &Exercise) -> Decimal {
    let mut total = Decimal::ZERO;
    if candidate.movement_pattern == original.movement_pattern {
        total += dec!(3.0);
    }
    total += dec!(2.0) * muscle_overlap(&original.primary_muscles, &candidate.primary_muscles);
    total += dec!(0.5) * muscle_overlap(&original.secondary_muscles, &candidate.secondary_muscles);
    total += original.equipment.affinity(candidate.equipment);
    total
}

/// Rank `candidates` for substituting `original` under `available`
/// equipment, highest-scoring first, truncated to `max_results`.
/// Candidates whose equipment is unavailable are discarded outright.
pub fn rank_substitutions(
    original: &Exercise,
    candidates: &[Exercise],
    available: &AvailableEquipment,
    max_results: usize,
) -> Vec<Exercise> {
    let mut scored: Vec<(Decimal, &Exercise)> = candidates
        .iter()
        .filter(|c| c.id != original.id)
        .filter(|c| available.is_available(c.equipment))
        .map(|c| (score(original, c), c))
        .collect();

    scored.sort_by(|(score_a, a), (score_b, b)| {
        score_b.cmp(score_a).then_with(|| a.id.cmp(&b.id))
    });

    scored.into_iter().take(max_results).map(|(_, ex)| ex.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Equipment, MovementPattern};
    use std::collections::HashSet as Set;

    fn exercise(id: &str, equipment: Equipment, pattern: MovementPattern, primary: &[&str]) -> Exercise {
        Exercise {
            id: id.to_string(),
            name: id.to_string(),
            equipment,
            primary_muscles: primary.iter().map(|s| s.to_string()).collect(),
            secondary_muscles: Vec::new(),
            movement_pattern: pattern,
        }
    }

    #[test]
    fn unavailable_equipment_is_discarded() {
        let original = exercise("bench", Equipment::Barbell, MovementPattern::HorizontalPush, &["chest"]);
        let candidates = vec![exercise("db_press", Equipment::Dumbbell, MovementPattern::HorizontalPush, &["chest"])];
        let available = AvailableEquipment::new(Set::new());
        assert!(rank_substitutions(&original, &candidates, &available, 5).is_empty());
    }

    #[test]
    fn pattern_match_and_muscle_overlap_outrank_weaker_candidates() {
        let original = exercise("bench", Equipment::Barbell, MovementPattern::HorizontalPush, &["chest", "triceps"]);
        let push_up = exercise("push_up", Equipment::Bodyweight, MovementPattern::HorizontalPush, &["chest", "triceps"]);
        let curl = exercise("curl", Equipment::Dumbbell, MovementPattern::ElbowFlexion, &["biceps"]);
        let mut set = Set::new();
        set.insert(Equipment::Dumbbell);
        let ranked = rank_substitutions(&original, &[curl, push_up.clone()], &AvailableEquipment::new(set), 5);
        assert_eq!(ranked[0].id, "push_up");
    }

    #[test]
    fn ties_break_by_stable_id_order() {
        let original = exercise("bench", Equipment::Barbell, MovementPattern::HorizontalPush, &["chest"]);
        let b = exercise("b_alt", Equipment::Dumbbell, MovementPattern::VerticalPull, &[]);
        let a = exercise("a_alt", Equipment::Dumbbell, MovementPattern::VerticalPull, &[]);
        let mut set = Set::new();
        set.insert(Equipment::Dumbbell);
        let ranked = rank_substitutions(&original, &[b, a], &AvailableEquipment::new(set), 5);
        assert_eq!(ranked[0].id, "a_alt");
    }
}
