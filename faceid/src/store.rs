use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::FaceIdError;
use crate::types::{Descriptor, Person, SnapshotEntry};

/// Transactional person/descriptor storage.
///
/// Implementations must be safe for concurrent use. Every write is atomic
/// with respect to [`PersonStore::snapshot`]: a snapshot observes either the
/// full pre- or full post-state of a concurrent write, never a partial one.
/// Use [`MemoryStore`] for in-memory storage (testing/ephemeral).
pub trait PersonStore: Send + Sync {
    /// Inserts a person record.
    fn create_person(&self, person: &Person) -> Result<(), FaceIdError>;

    /// Returns the person, or None if the id is unknown.
    fn get_person(&self, person_id: &str) -> Result<Option<Person>, FaceIdError>;

    /// Returns all people, newest first.
    fn list_people(&self) -> Result<Vec<Person>, FaceIdError>;

    /// Deletes the person and all owned descriptors in one atomic unit.
    /// Returns false if the person did not exist.
    fn delete_person(&self, person_id: &str) -> Result<bool, FaceIdError>;

    /// Persists a descriptor. Fails with [`FaceIdError::NotFound`] if the
    /// owning person does not exist; the existence check and the insert are
    /// one atomic unit.
    fn insert_descriptor(&self, descriptor: &Descriptor) -> Result<(), FaceIdError>;

    /// Deletes all descriptors owned by the person. Idempotent; returns the
    /// number removed.
    fn delete_descriptors(&self, person_id: &str) -> Result<usize, FaceIdError>;

    /// Returns the person's descriptors in enrollment order.
    fn descriptors_for(&self, person_id: &str) -> Result<Vec<Descriptor>, FaceIdError>;

    /// Point-in-time listing of all stored descriptors. The returned
    /// sequence is unaffected by mutations after the call returns.
    fn snapshot(&self) -> Result<Vec<SnapshotEntry>, FaceIdError>;

    /// Returns (people, descriptors) counts.
    fn counts(&self) -> Result<(usize, usize), FaceIdError>;
}

/// In-memory [`PersonStore`] implementation.
/// Data is lost on restart. Suitable for testing or ephemeral use.
pub struct MemoryStore {
    inner: Mutex<MemoryStoreInner>,
}

struct MemoryStoreInner {
    people: HashMap<String, Person>,
    descriptors: Vec<Descriptor>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MemoryStoreInner {
                people: HashMap::new(),
                descriptors: Vec::new(),
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PersonStore for MemoryStore {
    fn create_person(&self, person: &Person) -> Result<(), FaceIdError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.people.contains_key(&person.id) {
            return Err(FaceIdError::Store(format!(
                "person {} already exists",
                person.id
            )));
        }
        inner.people.insert(person.id.clone(), person.clone());
        Ok(())
    }

    fn get_person(&self, person_id: &str) -> Result<Option<Person>, FaceIdError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.people.get(person_id).cloned())
    }

    fn list_people(&self) -> Result<Vec<Person>, FaceIdError> {
        let inner = self.inner.lock().unwrap();
        let mut people: Vec<Person> = inner.people.values().cloned().collect();
        people.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(people)
    }

    fn delete_person(&self, person_id: &str) -> Result<bool, FaceIdError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.people.remove(person_id).is_none() {
            return Ok(false);
        }
        inner.descriptors.retain(|d| d.person_id != person_id);
        Ok(true)
    }

    fn insert_descriptor(&self, descriptor: &Descriptor) -> Result<(), FaceIdError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.people.contains_key(&descriptor.person_id) {
            return Err(FaceIdError::NotFound(descriptor.person_id.clone()));
        }
        inner.descriptors.push(descriptor.clone());
        Ok(())
    }

    fn delete_descriptors(&self, person_id: &str) -> Result<usize, FaceIdError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.descriptors.len();
        inner.descriptors.retain(|d| d.person_id != person_id);
        Ok(before - inner.descriptors.len())
    }

    fn descriptors_for(&self, person_id: &str) -> Result<Vec<Descriptor>, FaceIdError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .descriptors
            .iter()
            .filter(|d| d.person_id == person_id)
            .cloned()
            .collect())
    }

    fn snapshot(&self) -> Result<Vec<SnapshotEntry>, FaceIdError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .descriptors
            .iter()
            .map(|d| SnapshotEntry {
                person_id: d.person_id.clone(),
                descriptor_id: d.id.clone(),
                vector: d.vector.clone(),
            })
            .collect())
    }

    fn counts(&self) -> Result<(usize, usize), FaceIdError> {
        let inner = self.inner.lock().unwrap();
        Ok((inner.people.len(), inner.descriptors.len()))
    }
}
