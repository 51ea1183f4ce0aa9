use chrono::Utc;
use uuid::Uuid;

use crate::distance::is_valid_descriptor;
use crate::engine;
use crate::error::FaceIdError;
use crate::store::PersonStore;
use crate::types::{Descriptor, Match, NewPerson, Person, SnapshotEntry};

/// Enrollment and identification over a person store.
///
/// This is the only surface the service layer calls into. Thread-safe: all
/// methods can be invoked concurrently; write atomicity is delegated to the
/// underlying [`PersonStore`].
pub struct Gallery {
    store: Box<dyn PersonStore>,
}

impl Gallery {
    pub fn new(store: Box<dyn PersonStore>) -> Self {
        Self { store }
    }

    /// Creates a person record with normalized metadata and a fresh id.
    /// Blank names become "Unknown Person", blank roles "Employee".
    pub fn register(&self, new: NewPerson) -> Result<Person, FaceIdError> {
        let person = Person {
            id: Uuid::new_v4().to_string(),
            name: non_blank(new.name).unwrap_or_else(|| "Unknown Person".to_string()),
            email: non_blank(new.email),
            phone: non_blank(new.phone),
            department: non_blank(new.department),
            role: non_blank(new.role).unwrap_or_else(|| "Employee".to_string()),
            image_url: new.image_url,
            created_at: Utc::now(),
        };
        self.store.create_person(&person)?;
        Ok(person)
    }

    /// Validates and persists a descriptor for an existing person, returning
    /// the new descriptor id. Nothing is written when validation fails.
    pub fn enroll(&self, person_id: &str, vector: Vec<f32>) -> Result<String, FaceIdError> {
        if person_id.trim().is_empty() {
            return Err(FaceIdError::Validation(
                "person id must not be blank".to_string(),
            ));
        }
        if !is_valid_descriptor(&vector) {
            return Err(FaceIdError::Validation(format!(
                "descriptor must be a finite vector of length 128 or 256, got length {}",
                vector.len()
            )));
        }

        let descriptor = Descriptor {
            id: Uuid::new_v4().to_string(),
            person_id: person_id.to_string(),
            vector,
            created_at: Utc::now(),
        };
        self.store.insert_descriptor(&descriptor)?;
        Ok(descriptor.id)
    }

    /// Resolves a probe against a point-in-time snapshot of every stored
    /// descriptor. `Ok(None)` means no enrolled person was close enough.
    pub fn identify(&self, probe: &[f32], threshold: f32) -> Result<Option<Match>, FaceIdError> {
        let snapshot = self.store.snapshot()?;
        engine::identify(probe, threshold, &snapshot)
    }

    /// Deletes the person and, atomically, all owned descriptors.
    pub fn delete_person(&self, person_id: &str) -> Result<(), FaceIdError> {
        if self.store.delete_person(person_id)? {
            Ok(())
        } else {
            Err(FaceIdError::NotFound(person_id.to_string()))
        }
    }

    /// Deletes all of the person's descriptors, keeping the person record.
    /// Idempotent; returns the number removed.
    pub fn remove_descriptors(&self, person_id: &str) -> Result<usize, FaceIdError> {
        self.store.delete_descriptors(person_id)
    }

    pub fn person(&self, person_id: &str) -> Result<Option<Person>, FaceIdError> {
        self.store.get_person(person_id)
    }

    /// All people, newest first.
    pub fn people(&self) -> Result<Vec<Person>, FaceIdError> {
        self.store.list_people()
    }

    pub fn descriptors_for(&self, person_id: &str) -> Result<Vec<Descriptor>, FaceIdError> {
        self.store.descriptors_for(person_id)
    }

    pub fn snapshot(&self) -> Result<Vec<SnapshotEntry>, FaceIdError> {
        self.store.snapshot()
    }

    /// Returns (people, descriptors) counts.
    pub fn counts(&self) -> Result<(usize, usize), FaceIdError> {
        self.store.counts()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
