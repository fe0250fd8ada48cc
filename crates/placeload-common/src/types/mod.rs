//! Document types written to the store

use serde::{Deserialize, Serialize};

/// Latitude/longitude pair. Unparsable source values are stored as `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub long: f64,
}

impl Coordinates {
    pub fn new(lat: f64, long: f64) -> Self {
        Self { lat, long }
    }
}

/// Review workflow state attached to every place.
///
/// Ingestion always writes the default (unset) state; the review tooling
/// mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkflowState {
    pub suggesters: Vec<String>,
    pub reviewers: Vec<String>,
    pub is_merged: bool,
    pub is_suggested: bool,
    pub is_reviewed: bool,
    pub correct_count: u32,
}

/// One place, as stored in the document collection.
///
/// `place_id` is the natural key: it identifies the document in the store and
/// is the value persisted as the ingestion checkpoint.
///
/// # Examples
///
/// ```rust
/// use placeload_common::types::{Coordinates, PlaceDocument};
///
/// let doc = PlaceDocument {
///     place_id: "ChIJ-1".to_string(),
///     coordinates: Coordinates::new(23.81, 90.41),
///     ..PlaceDocument::default()
/// };
/// assert!(!doc.workflow.is_reviewed);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaceDocument {
    pub place_id: String,
    pub name: String,
    pub address: String,
    pub district: String,
    pub division: String,
    pub country: String,
    pub postal_code: String,
    /// Classification tags, e.g. `["restaurant", "food"]`
    pub types: Vec<String>,
    pub is_verified: bool,
    pub coordinates: Coordinates,
    #[serde(flatten)]
    pub workflow: WorkflowState,
}
