//! Flat-file provisioning.
//!
//! Reads the three-file text format the catalog data ships in:
//!
//! - entities file: one entity name per line;
//! - characteristics file: `name | question prompt` per line;
//! - weights file: `entity: char:weight, char2, char3:0.4` per line,
//!   where a missing or non-numeric weight defaults to 1.0.
//!
//! A missing file is fatal; a malformed line is skipped with a
//! diagnostic. Blank lines are ignored everywhere.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::catalog::{Catalog, IngestDiagnostic};
use crate::error::{GuessResult, IngestError};

/// Loads a catalog from the three-file text format.
///
/// Returns the catalog together with every diagnostic emitted for
/// skipped or patched-up records, in encounter order.
///
/// # Errors
///
/// Returns an error if any file cannot be read, or if no entity
/// survives ingestion.
pub fn load_from_files(
    entities: &Path,
    characteristics: &Path,
    weights: &Path,
) -> GuessResult<(Catalog, Vec<IngestDiagnostic>)> {
    let entity_text = fs::read_to_string(entities).map_err(IngestError::from)?;
    let characteristic_text = fs::read_to_string(characteristics).map_err(IngestError::from)?;
    let weight_text = fs::read_to_string(weights).map_err(IngestError::from)?;
    load_from_strings(&entity_text, &characteristic_text, &weight_text)
}

/// In-memory variant of [`load_from_files`], useful for tests and for
/// providers that already hold the file contents.
///
/// # Errors
///
/// Returns an error if no entity survives ingestion.
pub fn load_from_strings(
    entities: &str,
    characteristics: &str,
    weights: &str,
) -> GuessResult<(Catalog, Vec<IngestDiagnostic>)> {
    let mut builder = Catalog::builder();
    let mut known_entities = BTreeSet::new();
    let mut known_characteristics = BTreeSet::new();

    for line in entities.lines() {
        let name = line.trim();
        if name.is_empty() {
            continue;
        }
        known_entities.insert(name.to_string());
        builder.entity(name);
    }

    for line in characteristics.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((name, prompt)) = line.split_once('|') else {
            builder.note(IngestDiagnostic::MalformedLine {
                file: "characteristics".to_string(),
                line: line.to_string(),
            });
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            builder.note(IngestDiagnostic::EmptyCharacteristicName);
            continue;
        }
        known_characteristics.insert(name.to_string());
        builder.characteristic(name, Some(prompt));
    }

    for line in weights.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((entity, links)) = line.split_once(':') else {
            builder.note(IngestDiagnostic::MalformedLine {
                file: "weights".to_string(),
                line: line.to_string(),
            });
            continue;
        };
        let entity = entity.trim();
        if !known_entities.contains(entity) {
            builder.note(IngestDiagnostic::UnknownEntity {
                entity: entity.to_string(),
            });
            continue;
        }
        for link in links.split(',') {
            let link = link.trim();
            if link.is_empty() {
                continue;
            }
            let (characteristic, weight) = parse_link(link, entity, &mut builder);
            if !known_characteristics.contains(&characteristic) {
                builder.note(IngestDiagnostic::UnknownCharacteristic { characteristic });
                continue;
            }
            builder.weight(entity, &characteristic, weight);
        }
    }

    let diagnostics = builder.diagnostics().to_vec();
    let catalog = builder.build()?;
    Ok((catalog, diagnostics))
}

/// Splits a `char:weight` link; a bare `char` or a non-numeric weight
/// means 1.0, the latter with a diagnostic.
fn parse_link(link: &str, entity: &str, builder: &mut crate::catalog::CatalogBuilder) -> (String, f64) {
    match link.split_once(':') {
        None => (link.to_string(), 1.0),
        Some((characteristic, raw)) => {
            let characteristic = characteristic.trim().to_string();
            let raw = raw.trim();
            match raw.parse::<f64>() {
                Ok(weight) => (characteristic, weight),
                Err(_) => {
                    builder.note(IngestDiagnostic::NonNumericWeight {
                        entity: entity.to_string(),
                        characteristic: characteristic.clone(),
                        raw: raw.to_string(),
                    });
                    (characteristic, 1.0)
                }
            }
        }
    }
}
