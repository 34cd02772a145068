//! The catalog: entities, characteristics, and graded weights.
//!
//! The catalog is the immutable snapshot everything else computes over.
//! An entity carries nothing but a name and a sparse weight map; a
//! missing (entity, characteristic) pair means weight 0.0 — "does not
//! have", never "no data". Ordered maps keep every traversal
//! deterministic, which the question-selection tie-break relies on.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GuessResult, IngestError, ValidationError};

/// Reason a provisioning record was skipped (or patched up) during
/// catalog construction.
///
/// Diagnostics are collected rather than raised: one bad record must
/// not sink an otherwise usable catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestDiagnostic {
    /// An entity record with an empty name was dropped.
    EmptyEntityName,

    /// A characteristic record with an empty name was dropped.
    EmptyCharacteristicName,

    /// A weight outside [0.0, 1.0] (or NaN) was dropped.
    WeightOutOfRange {
        /// Entity the weight was registered for.
        entity: String,
        /// Characteristic the weight was registered for.
        characteristic: String,
        /// The rejected value.
        value: f64,
    },

    /// A weight link referenced an entity the provider never declared.
    UnknownEntity {
        /// The undeclared entity name.
        entity: String,
    },

    /// A weight link referenced a characteristic the provider never
    /// declared.
    UnknownCharacteristic {
        /// The undeclared characteristic name.
        characteristic: String,
    },

    /// A non-numeric weight was replaced with the default of 1.0.
    NonNumericWeight {
        /// Entity the weight was registered for.
        entity: String,
        /// Characteristic the weight was registered for.
        characteristic: String,
        /// The raw text that failed to parse.
        raw: String,
    },

    /// A line that did not match the expected record shape was dropped.
    MalformedLine {
        /// Which provisioning file the line came from.
        file: String,
        /// The offending line.
        line: String,
    },
}

impl fmt::Display for IngestDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEntityName => write!(f, "skipped entity record with empty name"),
            Self::EmptyCharacteristicName => {
                write!(f, "skipped characteristic record with empty name")
            }
            Self::WeightOutOfRange {
                entity,
                characteristic,
                value,
            } => write!(
                f,
                "skipped out-of-range weight {value} for '{entity}' / '{characteristic}'"
            ),
            Self::UnknownEntity { entity } => {
                write!(f, "skipped weight link for unknown entity '{entity}'")
            }
            Self::UnknownCharacteristic { characteristic } => write!(
                f,
                "skipped weight link for unknown characteristic '{characteristic}'"
            ),
            Self::NonNumericWeight {
                entity,
                characteristic,
                raw,
            } => write!(
                f,
                "non-numeric weight '{raw}' for '{entity}' / '{characteristic}' defaulted to 1.0"
            ),
            Self::MalformedLine { file, line } => {
                write!(f, "skipped malformed line in {file}: {line}")
            }
        }
    }
}

/// Immutable snapshot of entities, characteristics, prompts, and
/// weights.
///
/// Built once via [`CatalogBuilder`] and read-only thereafter; share it
/// across concurrently running sessions behind an `Arc` without any
/// further synchronization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    /// Entity name -> characteristic name -> weight in [0.0, 1.0].
    entities: BTreeMap<String, BTreeMap<String, f64>>,

    /// Characteristic name -> question prompt. Every characteristic in
    /// any weight map has an entry; providers that supplied no prompt
    /// get a synthesized one at build time.
    prompts: BTreeMap<String, String>,
}

impl Catalog {
    /// Starts building a catalog.
    #[must_use]
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// Loads a catalog from a JSON snapshot, re-applying every build
    /// invariant (range checks, default prompts, non-emptiness).
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON or the
    /// resulting catalog is empty.
    pub fn from_json_str(json: &str) -> GuessResult<Self> {
        let raw: Self = serde_json::from_str(json).map_err(IngestError::from)?;
        let mut builder = Self::builder();
        for (characteristic, prompt) in &raw.prompts {
            builder.characteristic(characteristic, Some(prompt));
        }
        for (entity, traits) in &raw.entities {
            builder.entity(entity);
            for (characteristic, weight) in traits {
                builder.weight(entity, characteristic, *weight);
            }
        }
        Ok(builder.build()?)
    }

    /// Number of entities in the catalog. Always at least one.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Entity names in lexicographic order.
    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    /// Iterates entities with their weight maps, in lexicographic
    /// order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, f64>)> {
        self.entities.iter().map(|(name, traits)| (name.as_str(), traits))
    }

    /// The weight of `characteristic` for `entity`; 0.0 when the pair
    /// is absent (sparse means "does not have").
    #[must_use]
    pub fn weight(&self, entity: &str, characteristic: &str) -> f64 {
        self.entities
            .get(entity)
            .and_then(|traits| traits.get(characteristic))
            .copied()
            .unwrap_or(0.0)
    }

    /// Union of every characteristic appearing in any weight map, in
    /// lexicographic order. This is the candidate set for question
    /// selection.
    #[must_use]
    pub fn characteristics(&self) -> BTreeSet<String> {
        self.entities
            .values()
            .flat_map(|traits| traits.keys().cloned())
            .collect()
    }

    /// The question prompt for a characteristic, synthesizing the
    /// default when none is registered.
    #[must_use]
    pub fn prompt(&self, characteristic: &str) -> String {
        self.prompts
            .get(characteristic)
            .cloned()
            .unwrap_or_else(|| Self::default_prompt(characteristic))
    }

    /// The prompt used when a provider supplied none.
    #[must_use]
    pub fn default_prompt(characteristic: &str) -> String {
        format!("Does it have '{characteristic}'?")
    }
}

/// Builder with skip-and-warn semantics for malformed records.
///
/// Registration methods never fail; a bad record produces an
/// [`IngestDiagnostic`] (also logged via `tracing`) and is dropped.
/// Only [`CatalogBuilder::build`] can fail, and only when the catalog
/// would end up empty.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    entities: BTreeMap<String, BTreeMap<String, f64>>,
    prompts: BTreeMap<String, String>,
    declared: BTreeSet<String>,
    diagnostics: Vec<IngestDiagnostic>,
}

impl CatalogBuilder {
    /// Registers an entity. Registering the same name twice is a no-op.
    pub fn entity(&mut self, name: &str) -> &mut Self {
        let name = name.trim();
        if name.is_empty() {
            self.skip(IngestDiagnostic::EmptyEntityName);
            return self;
        }
        self.entities.entry(name.to_string()).or_default();
        self
    }

    /// Registers a characteristic with an optional question prompt.
    pub fn characteristic(&mut self, name: &str, prompt: Option<&str>) -> &mut Self {
        let name = name.trim();
        if name.is_empty() {
            self.skip(IngestDiagnostic::EmptyCharacteristicName);
            return self;
        }
        self.declared.insert(name.to_string());
        if let Some(prompt) = prompt {
            let prompt = prompt.trim();
            if !prompt.is_empty() {
                self.prompts.insert(name.to_string(), prompt.to_string());
            }
        }
        self
    }

    /// Registers a weight link. Entities and characteristics that were
    /// not declared beforehand are registered implicitly; out-of-range
    /// or NaN weights are dropped with a diagnostic.
    pub fn weight(&mut self, entity: &str, characteristic: &str, value: f64) -> &mut Self {
        let entity = entity.trim();
        let characteristic = characteristic.trim();
        if entity.is_empty() {
            self.skip(IngestDiagnostic::EmptyEntityName);
            return self;
        }
        if characteristic.is_empty() {
            self.skip(IngestDiagnostic::EmptyCharacteristicName);
            return self;
        }
        if !(0.0..=1.0).contains(&value) {
            self.skip(IngestDiagnostic::WeightOutOfRange {
                entity: entity.to_string(),
                characteristic: characteristic.to_string(),
                value,
            });
            return self;
        }
        self.declared.insert(characteristic.to_string());
        self.entities
            .entry(entity.to_string())
            .or_default()
            .insert(characteristic.to_string(), value);
        self
    }

    /// Records a diagnostic produced outside the builder (e.g. by a
    /// file-format front-end) so callers see one consolidated list.
    pub fn note(&mut self, diagnostic: IngestDiagnostic) -> &mut Self {
        self.skip(diagnostic);
        self
    }

    /// Diagnostics accumulated so far, in registration order.
    #[must_use]
    pub fn diagnostics(&self) -> &[IngestDiagnostic] {
        &self.diagnostics
    }

    /// Finalizes the catalog, synthesizing default prompts for every
    /// characteristic that lacks one.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyCatalog`] if no entity survived
    /// registration.
    pub fn build(self) -> Result<Catalog, ValidationError> {
        if self.entities.is_empty() {
            return Err(ValidationError::EmptyCatalog);
        }
        let mut prompts = self.prompts;
        let referenced: BTreeSet<String> = self
            .declared
            .iter()
            .cloned()
            .chain(
                self.entities
                    .values()
                    .flat_map(|traits| traits.keys().cloned()),
            )
            .collect();
        for characteristic in referenced {
            prompts
                .entry(characteristic.clone())
                .or_insert_with(|| Catalog::default_prompt(&characteristic));
        }
        Ok(Catalog {
            entities: self.entities,
            prompts,
        })
    }

    fn skip(&mut self, diagnostic: IngestDiagnostic) {
        tracing::warn!(%diagnostic, "provisioning record skipped");
        self.diagnostics.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_catalog() -> Catalog {
        let mut builder = Catalog::builder();
        builder.characteristic("furry", Some("Is it furry?"));
        builder.weight("Cat", "furry", 1.0);
        builder.weight("Cat", "meows", 1.0);
        builder.weight("Fish", "furry", 0.0);
        builder.build().unwrap()
    }

    #[test]
    fn test_empty_catalog_is_rejected() {
        let err = Catalog::builder().build().unwrap_err();
        assert!(matches!(err, ValidationError::EmptyCatalog));
    }

    #[test]
    fn test_missing_pair_means_zero_weight() {
        let catalog = small_catalog();
        assert!((catalog.weight("Fish", "meows") - 0.0).abs() < f64::EPSILON);
        assert!((catalog.weight("Cat", "meows") - 1.0).abs() < f64::EPSILON);
        // Unknown entity too.
        assert!((catalog.weight("Dog", "furry") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_characteristics_is_union_of_weight_maps() {
        let catalog = small_catalog();
        let chars = catalog.characteristics();
        assert_eq!(
            chars.into_iter().collect::<Vec<_>>(),
            vec!["furry".to_string(), "meows".to_string()]
        );
    }

    #[test]
    fn test_prompt_falls_back_to_synthesized_default() {
        let catalog = small_catalog();
        assert_eq!(catalog.prompt("furry"), "Is it furry?");
        assert_eq!(catalog.prompt("meows"), "Does it have 'meows'?");
        assert_eq!(catalog.prompt("scales"), "Does it have 'scales'?");
    }

    #[test]
    fn test_out_of_range_weight_is_skipped_with_diagnostic() {
        let mut builder = Catalog::builder();
        builder.weight("Cat", "furry", 1.5);
        builder.weight("Cat", "furry", f64::NAN);
        builder.weight("Cat", "meows", 0.5);
        assert_eq!(builder.diagnostics().len(), 2);
        let catalog = builder.build().unwrap();
        assert!((catalog.weight("Cat", "furry") - 0.0).abs() < f64::EPSILON);
        assert!((catalog.weight("Cat", "meows") - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_names_are_skipped_not_fatal() {
        let mut builder = Catalog::builder();
        builder.entity("   ");
        builder.characteristic("", Some("?"));
        builder.weight("Cat", "furry", 1.0);
        let diagnostics = builder.diagnostics().to_vec();
        assert!(diagnostics.contains(&IngestDiagnostic::EmptyEntityName));
        assert!(diagnostics.contains(&IngestDiagnostic::EmptyCharacteristicName));
        let catalog = builder.build().unwrap();
        assert_eq!(catalog.entity_count(), 1);
    }

    #[test]
    fn test_later_weight_overwrites_earlier() {
        let mut builder = Catalog::builder();
        builder.weight("Cat", "furry", 0.2);
        builder.weight("Cat", "furry", 0.9);
        let catalog = builder.build().unwrap();
        assert!((catalog.weight("Cat", "furry") - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn test_json_round_trip_preserves_weights_and_prompts() {
        let catalog = small_catalog();
        let json = serde_json::to_string(&catalog).unwrap();
        let back = Catalog::from_json_str(&json).unwrap();
        assert_eq!(back.entity_count(), catalog.entity_count());
        assert!((back.weight("Cat", "furry") - 1.0).abs() < f64::EPSILON);
        assert_eq!(back.prompt("furry"), "Is it furry?");
    }

    #[test]
    fn test_from_json_rejects_empty_catalog() {
        let err = Catalog::from_json_str(r#"{"entities":{},"prompts":{}}"#).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = Catalog::from_json_str("not json").unwrap_err();
        assert!(err.is_ingest());
    }
}
