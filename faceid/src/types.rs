use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An enrolled individual. Field names serialize in the camelCase form the
/// HTTP clients expect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    /// Opaque unique identifier (UUID v4).
    pub id: String,

    /// Display name. Never empty; defaulted at registration.
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,

    /// Organizational role, e.g. "Employee".
    pub role: String,

    /// Relative reference to a stored image, e.g. "/public/uploads/{id}.png".
    #[serde(rename = "imageUrl", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Input for [`Gallery::register`]; blank fields fall back to defaults.
///
/// [`Gallery::register`]: crate::Gallery::register
#[derive(Debug, Clone, Default)]
pub struct NewPerson {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub role: Option<String>,
    pub image_url: Option<String>,
}

/// A face descriptor owned by exactly one person.
///
/// Descriptors are validated before they are written and never mutated in
/// place; a correction is a delete followed by a fresh enrollment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Descriptor {
    /// Opaque unique identifier (UUID v4).
    pub id: String,

    #[serde(rename = "personId")]
    pub person_id: String,

    /// Feature vector of length 128 or 256, all elements finite.
    #[serde(rename = "descriptor")]
    pub vector: Vec<f32>,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// One row of a point-in-time store snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotEntry {
    pub person_id: String,
    pub descriptor_id: String,
    pub vector: Vec<f32>,
}

/// A single accepted identification result.
#[derive(Debug, Clone)]
pub struct Match {
    /// Identifier of the winning person.
    pub person_id: String,

    /// Identifier of the winning descriptor.
    pub descriptor_id: String,

    /// Euclidean distance between the probe and the winning descriptor.
    pub distance: f32,

    /// Display score in [0, 1]; higher means closer. Derived from the
    /// distance and threshold, never used for the accept/reject decision.
    pub confidence: f32,
}
