//! # Upload & Analysis Pipeline
//!
//! Everything that talks to the anonymization service mesh: the HTTP client
//! for the four remote calls, the background runners the UI polls, and the
//! label-grouping step that turns the labelling response into displayable
//! findings.
//!
//! ## Stages
//!
//! 1. Stage the selected file on the entry service (multipart upload)
//! 2. Ask the extraction service for the document's raw text
//! 3. Ask the labelling service for recognized entities
//! 4. Group entities by label and annotate with human-readable meanings
//! 5. On user request, ask the entry service to produce a redacted copy
//!
//! Stages run strictly in sequence; a failure at any point aborts the rest.

pub mod client;
pub mod runner;

pub use client::{redacted_path, Endpoints, ServiceClient};
pub use runner::{
    spawn_analysis, spawn_anonymize, AnalysisHandle, AnalysisStatus, AnonymizeHandle,
    AnonymizeStatus,
};

use serde::Deserialize;
use std::collections::HashMap;

/// A recognized span and its category, as returned by the labelling service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Entity {
    pub text: String,
    pub label: String,
}

/// Entities aggregated by label, annotated with a human-readable meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelGroup {
    pub label: String,
    pub meaning: String,
    pub values: Vec<String>,
}

/// Group entities by label, in first-appearance order.
///
/// Each group's `values` holds the entity texts sharing that label, in input
/// order. `meaning` comes from the lookup table; unknown labels pass through
/// unchanged.
pub fn group_entities(entities: &[Entity], meanings: &HashMap<String, String>) -> Vec<LabelGroup> {
    let mut groups: Vec<LabelGroup> = Vec::new();

    for entity in entities {
        match groups.iter_mut().find(|g| g.label == entity.label) {
            Some(group) => group.values.push(entity.text.clone()),
            None => groups.push(LabelGroup {
                label: entity.label.clone(),
                meaning: meanings
                    .get(&entity.label)
                    .cloned()
                    .unwrap_or_else(|| entity.label.clone()),
                values: vec![entity.text.clone()],
            }),
        }
    }

    groups
}
