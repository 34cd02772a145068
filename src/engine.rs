//! The belief engine: posterior updates and question selection.
//!
//! Both operations are pure functions over the catalog and the
//! accumulated answers. The update recomputes the whole distribution
//! from scratch every time, which makes replaying the same answer set
//! idempotent; nothing here holds hidden state.
//!
//! The scoring model assumes characteristics are conditionally
//! independent given the entity (naive Bayes). That is a deliberate
//! simplification: it keeps the update a single product per entity.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::answer::AnswerLabel;
use crate::catalog::Catalog;

/// Normalized posterior probabilities over catalog entities.
///
/// Values are non-negative and sum to 1 (within floating tolerance)
/// after every update; the degenerate all-zero case falls back to
/// uniform instead of producing NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BeliefDistribution(BTreeMap<String, f64>);

impl BeliefDistribution {
    /// The uniform prior over all catalog entities.
    #[must_use]
    pub fn uniform(catalog: &Catalog) -> Self {
        let n = catalog.entity_count() as f64;
        Self(
            catalog
                .entity_names()
                .map(|entity| (entity.to_string(), 1.0 / n))
                .collect(),
        )
    }

    /// The probability assigned to `entity`; 0.0 for names outside the
    /// catalog.
    #[must_use]
    pub fn probability(&self, entity: &str) -> f64 {
        self.0.get(entity).copied().unwrap_or(0.0)
    }

    /// The highest-probability entity and its probability.
    ///
    /// Ties break lexicographically on the entity name, so the result
    /// is deterministic. `None` only for an empty distribution, which
    /// cannot arise from a valid catalog.
    #[must_use]
    pub fn best(&self) -> Option<(&str, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for (entity, &p) in &self.0 {
            match best {
                Some((_, best_p)) if p <= best_p => {}
                _ => best = Some((entity, p)),
            }
        }
        best
    }

    /// Iterates (entity, probability) pairs in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(entity, &p)| (entity.as_str(), p))
    }

    /// Number of entities carried by the distribution.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the distribution carries no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Recomputes the posterior over entities from the full answer history.
///
/// Every entity starts at the uniform prior `1/N`; each answered
/// characteristic contributes the blended likelihood
/// `w * L_present + (1 - w) * L_absent`, with `w` the entity's weight
/// for that characteristic (0.0 if absent from its map). Scores are
/// then normalized. If every entity scored exactly zero the result is
/// a fresh uniform distribution.
#[must_use]
pub fn update_beliefs(
    catalog: &Catalog,
    answers: &BTreeMap<String, AnswerLabel>,
) -> BeliefDistribution {
    let prior = 1.0 / catalog.entity_count() as f64;
    let mut scores = BTreeMap::new();

    for (entity, traits) in catalog.iter() {
        let mut score = prior;
        for (characteristic, label) in answers {
            let likelihood = label.likelihood();
            let w = traits.get(characteristic).copied().unwrap_or(0.0);
            score *= w * likelihood.present + (1.0 - w) * likelihood.absent;
        }
        scores.insert(entity.to_string(), score);
    }

    let total: f64 = scores.values().sum();
    if total == 0.0 {
        // All evidence contradicts every candidate; restart from the
        // prior rather than dividing by zero.
        return BeliefDistribution::uniform(catalog);
    }
    for score in scores.values_mut() {
        *score /= total;
    }
    BeliefDistribution(scores)
}

/// Selects the most informative characteristic not yet asked.
///
/// For each candidate the expected presence probability under the
/// current belief is `p = Σ P(entity) * weight(entity, char)`; the
/// candidate minimizing `|p - 0.5|` wins (a binary-entropy proxy for
/// information gain). Ties break lexicographically on the
/// characteristic name. Returns `None` iff no unasked characteristic
/// remains.
#[must_use]
pub fn choose_next_characteristic(
    distribution: &BeliefDistribution,
    catalog: &Catalog,
    asked: &BTreeSet<String>,
) -> Option<String> {
    let mut best: Option<(String, f64)> = None;

    for characteristic in catalog.characteristics() {
        if asked.contains(&characteristic) {
            continue;
        }
        let p: f64 = catalog
            .iter()
            .map(|(entity, traits)| {
                distribution.probability(entity)
                    * traits.get(&characteristic).copied().unwrap_or(0.0)
            })
            .sum();
        let uncertainty = (p - 0.5).abs();
        // Strict < keeps the lexicographically-first candidate on ties
        // (candidates arrive in ascending order).
        let improves = match &best {
            None => true,
            Some((_, best_uncertainty)) => uncertainty < *best_uncertainty,
        };
        if improves {
            best = Some((characteristic, uncertainty));
        }
    }

    best.map(|(characteristic, _)| characteristic)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(entries: &[(&str, &[(&str, f64)])]) -> Catalog {
        let mut builder = Catalog::builder();
        for (entity, traits) in entries {
            builder.entity(entity);
            for (characteristic, weight) in *traits {
                builder.weight(entity, characteristic, *weight);
            }
        }
        builder.build().unwrap()
    }

    fn answers(pairs: &[(&str, AnswerLabel)]) -> BTreeMap<String, AnswerLabel> {
        pairs
            .iter()
            .map(|(characteristic, label)| ((*characteristic).to_string(), *label))
            .collect()
    }

    fn assert_normalized(distribution: &BeliefDistribution) {
        let total: f64 = distribution.iter().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-9, "sum was {total}");
        for (entity, p) in distribution.iter() {
            assert!(p >= 0.0, "negative probability {p} for {entity}");
            assert!(!p.is_nan(), "NaN probability for {entity}");
        }
    }

    #[test]
    fn test_uniform_prior_over_all_entities() {
        let catalog = catalog(&[
            ("Cat", &[("furry", 1.0)]),
            ("Dog", &[("furry", 1.0)]),
            ("Fish", &[("furry", 0.0)]),
        ]);
        let distribution = BeliefDistribution::uniform(&catalog);
        assert_eq!(distribution.len(), 3);
        assert_normalized(&distribution);
        assert!((distribution.probability("Dog") - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_update_with_no_answers_is_uniform() {
        let catalog = catalog(&[("Cat", &[("furry", 1.0)]), ("Fish", &[("furry", 0.0)])]);
        let distribution = update_beliefs(&catalog, &BTreeMap::new());
        assert_normalized(&distribution);
        assert!((distribution.probability("Cat") - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_neutral_answer_does_not_move_distribution() {
        let catalog = catalog(&[("Cat", &[("furry", 1.0)]), ("Fish", &[("furry", 0.0)])]);
        let before = update_beliefs(&catalog, &BTreeMap::new());
        let after = update_beliefs(&catalog, &answers(&[("furry", AnswerLabel::Unknown)]));
        for (entity, p) in before.iter() {
            assert!((p - after.probability(entity)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_update_is_idempotent_over_identical_answers() {
        let catalog = catalog(&[
            ("Cat", &[("furry", 1.0), ("meows", 1.0)]),
            ("Fish", &[("furry", 0.0)]),
        ]);
        let history = answers(&[("furry", AnswerLabel::Yes), ("meows", AnswerLabel::Probably)]);
        let first = update_beliefs(&catalog, &history);
        let second = update_beliefs(&catalog, &history);
        assert_eq!(first, second);
    }

    #[test]
    fn test_strong_affirmative_converges_but_not_to_certainty() {
        let catalog = catalog(&[("A", &[("flies", 1.0)]), ("B", &[("flies", 0.0)])]);
        let distribution = update_beliefs(&catalog, &answers(&[("flies", AnswerLabel::Yes)]));
        assert_normalized(&distribution);
        let p = distribution.probability("A");
        assert!(p > 0.9, "expected P(A) > 0.9, got {p}");
        assert!(p < 1.0, "likelihoods are not absolute certainty");
    }

    #[test]
    fn test_strong_negative_mirrors_strong_affirmative() {
        let catalog = catalog(&[("A", &[("flies", 1.0)]), ("B", &[("flies", 0.0)])]);
        let distribution = update_beliefs(&catalog, &answers(&[("flies", AnswerLabel::No)]));
        let p = distribution.probability("B");
        assert!(p > 0.9 && p < 1.0);
    }

    #[test]
    fn test_all_zero_scores_fall_back_to_uniform() {
        // Both entities fully carry every trait; answering "no" to all
        // of them multiplies each score by 0.05 per answer until the
        // product underflows f64 to exactly zero. The engine must then
        // return the uniform fallback, never NaN.
        let mut builder = Catalog::builder();
        for i in 0..300 {
            builder.weight("A", &format!("trait{i:03}"), 1.0);
            builder.weight("B", &format!("trait{i:03}"), 1.0);
        }
        let catalog = builder.build().unwrap();
        let history: BTreeMap<String, AnswerLabel> = (0..300)
            .map(|i| (format!("trait{i:03}"), AnswerLabel::No))
            .collect();
        let distribution = update_beliefs(&catalog, &history);
        assert_normalized(&distribution);
        assert!((distribution.probability("A") - 0.5).abs() < 1e-12);
        assert!((distribution.probability("B") - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_choose_picks_probability_closest_to_half() {
        let catalog = catalog(&[
            ("Cat", &[("furry", 1.0), ("barks", 0.0)]),
            ("Dog", &[("furry", 1.0), ("barks", 1.0)]),
        ]);
        let distribution = BeliefDistribution::uniform(&catalog);
        // p(furry) = 1.0, p(barks) = 0.5 -> barks is more informative.
        let choice = choose_next_characteristic(&distribution, &catalog, &BTreeSet::new());
        assert_eq!(choice.as_deref(), Some("barks"));
    }

    #[test]
    fn test_choose_never_returns_asked_characteristic() {
        let catalog = catalog(&[
            ("Cat", &[("furry", 1.0), ("meows", 1.0)]),
            ("Fish", &[("furry", 0.0), ("meows", 0.0)]),
        ]);
        let distribution = BeliefDistribution::uniform(&catalog);
        let mut asked = BTreeSet::new();
        asked.insert("furry".to_string());
        let choice = choose_next_characteristic(&distribution, &catalog, &asked);
        assert_eq!(choice.as_deref(), Some("meows"));
    }

    #[test]
    fn test_choose_returns_none_iff_no_candidates_remain() {
        let catalog = catalog(&[
            ("Cat", &[("furry", 1.0)]),
            ("Fish", &[("furry", 0.0)]),
        ]);
        let distribution = BeliefDistribution::uniform(&catalog);
        let mut asked = BTreeSet::new();
        assert!(choose_next_characteristic(&distribution, &catalog, &asked).is_some());
        asked.insert("furry".to_string());
        assert!(choose_next_characteristic(&distribution, &catalog, &asked).is_none());
    }

    #[test]
    fn test_choose_tie_breaks_lexicographically() {
        // Both characteristics have expected presence 0.5.
        let catalog = catalog(&[
            ("Cat", &[("meows", 1.0), ("barks", 0.0)]),
            ("Dog", &[("meows", 0.0), ("barks", 1.0)]),
        ]);
        let distribution = BeliefDistribution::uniform(&catalog);
        let choice = choose_next_characteristic(&distribution, &catalog, &BTreeSet::new());
        assert_eq!(choice.as_deref(), Some("barks"));
    }

    #[test]
    fn test_best_tie_breaks_lexicographically() {
        let catalog = catalog(&[("Cat", &[("furry", 1.0)]), ("Ant", &[("furry", 1.0)])]);
        let distribution = BeliefDistribution::uniform(&catalog);
        let (entity, p) = distribution.best().unwrap();
        assert_eq!(entity, "Ant");
        assert!((p - 0.5).abs() < 1e-12);
    }
}
