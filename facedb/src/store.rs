use std::path::{Path, PathBuf};

use redb::{Database, ReadableTable, TableDefinition};

use facewhiz_faceid::{Descriptor, FaceIdError, Person, PersonStore, SnapshotEntry};

use crate::keys;

const TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("facewhiz");

/// A persistent [`PersonStore`] backed by redb.
///
/// Writes are mutually exclusive (redb allows one write transaction at a
/// time) and commit atomically, so the person-plus-descriptors cascade can
/// never be observed half-applied. Snapshots read from a single read
/// transaction and are unaffected by later writes.
pub struct RedbStore {
    db: Database,
    path: PathBuf,
}

impl RedbStore {
    /// Open or create a store at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FaceIdError> {
        let path = path.as_ref().to_path_buf();
        let db = Database::create(&path).map_err(storage)?;

        // Create the table if it doesn't exist
        let tx = db.begin_write().map_err(storage)?;
        {
            let _ = tx.open_table(TABLE).map_err(storage)?;
        }
        tx.commit().map_err(storage)?;

        Ok(Self { db, path })
    }

    /// Filesystem path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn storage<E: std::fmt::Display>(err: E) -> FaceIdError {
    FaceIdError::Store(err.to_string())
}

/// All (key, value) pairs under a prefix, sorted by key.
fn scan_prefix(
    table: &impl ReadableTable<&'static str, &'static [u8]>,
    prefix: &str,
) -> Result<Vec<(String, Vec<u8>)>, FaceIdError> {
    let mut results = Vec::new();
    for item in table.iter().map_err(storage)? {
        let (key, value) = item.map_err(storage)?;
        let key_str = key.value();
        if key_str.starts_with(prefix) {
            results.push((key_str.to_string(), value.value().to_vec()));
        }
    }
    results.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(results)
}

impl PersonStore for RedbStore {
    fn create_person(&self, person: &Person) -> Result<(), FaceIdError> {
        let data = serde_json::to_vec(person).map_err(storage)?;
        let tx = self.db.begin_write().map_err(storage)?;
        {
            let mut table = tx.open_table(TABLE).map_err(storage)?;
            let key = keys::person_key(&person.id);
            if table
                .insert(key.as_str(), data.as_slice())
                .map_err(storage)?
                .is_some()
            {
                // Dropping the transaction rolls the insert back.
                return Err(FaceIdError::Store(format!(
                    "person {} already exists",
                    person.id
                )));
            }
        }
        tx.commit().map_err(storage)?;
        Ok(())
    }

    fn get_person(&self, person_id: &str) -> Result<Option<Person>, FaceIdError> {
        let tx = self.db.begin_read().map_err(storage)?;
        let table = tx.open_table(TABLE).map_err(storage)?;

        match table
            .get(keys::person_key(person_id).as_str())
            .map_err(storage)?
        {
            Some(value) => Ok(Some(
                serde_json::from_slice(value.value()).map_err(storage)?,
            )),
            None => Ok(None),
        }
    }

    fn list_people(&self) -> Result<Vec<Person>, FaceIdError> {
        let tx = self.db.begin_read().map_err(storage)?;
        let table = tx.open_table(TABLE).map_err(storage)?;

        let mut people = Vec::new();
        for (_, value) in scan_prefix(&table, keys::PERSON_PREFIX)? {
            let person: Person = serde_json::from_slice(&value).map_err(storage)?;
            people.push(person);
        }
        people.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(people)
    }

    fn delete_person(&self, person_id: &str) -> Result<bool, FaceIdError> {
        let tx = self.db.begin_write().map_err(storage)?;
        {
            let mut table = tx.open_table(TABLE).map_err(storage)?;
            if table
                .remove(keys::person_key(person_id).as_str())
                .map_err(storage)?
                .is_none()
            {
                return Ok(false);
            }

            // Cascade: sweep the person's descriptor prefix in the same
            // transaction, so the person and descriptors disappear together.
            let doomed: Vec<String> = scan_prefix(&table, &keys::descriptor_prefix(person_id))?
                .into_iter()
                .map(|(key, _)| key)
                .collect();
            for key in &doomed {
                table.remove(key.as_str()).map_err(storage)?;
            }
        }
        tx.commit().map_err(storage)?;
        Ok(true)
    }

    fn insert_descriptor(&self, descriptor: &Descriptor) -> Result<(), FaceIdError> {
        let data = serde_json::to_vec(descriptor).map_err(storage)?;
        let tx = self.db.begin_write().map_err(storage)?;
        {
            let mut table = tx.open_table(TABLE).map_err(storage)?;

            // FK check inside the write transaction: the person must still
            // exist at the moment the descriptor lands.
            if table
                .get(keys::person_key(&descriptor.person_id).as_str())
                .map_err(storage)?
                .is_none()
            {
                return Err(FaceIdError::NotFound(descriptor.person_id.clone()));
            }

            let key = keys::descriptor_key(&descriptor.person_id, &descriptor.id);
            table
                .insert(key.as_str(), data.as_slice())
                .map_err(storage)?;
        }
        tx.commit().map_err(storage)?;
        Ok(())
    }

    fn delete_descriptors(&self, person_id: &str) -> Result<usize, FaceIdError> {
        let tx = self.db.begin_write().map_err(storage)?;
        let removed;
        {
            let mut table = tx.open_table(TABLE).map_err(storage)?;
            let doomed: Vec<String> = scan_prefix(&table, &keys::descriptor_prefix(person_id))?
                .into_iter()
                .map(|(key, _)| key)
                .collect();
            for key in &doomed {
                table.remove(key.as_str()).map_err(storage)?;
            }
            removed = doomed.len();
        }
        tx.commit().map_err(storage)?;
        Ok(removed)
    }

    fn descriptors_for(&self, person_id: &str) -> Result<Vec<Descriptor>, FaceIdError> {
        let tx = self.db.begin_read().map_err(storage)?;
        let table = tx.open_table(TABLE).map_err(storage)?;

        let mut descriptors = Vec::new();
        for (_, value) in scan_prefix(&table, &keys::descriptor_prefix(person_id))? {
            let descriptor: Descriptor = serde_json::from_slice(&value).map_err(storage)?;
            descriptors.push(descriptor);
        }
        descriptors.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(descriptors)
    }

    fn snapshot(&self) -> Result<Vec<SnapshotEntry>, FaceIdError> {
        let tx = self.db.begin_read().map_err(storage)?;
        let table = tx.open_table(TABLE).map_err(storage)?;

        let mut entries = Vec::new();
        for (_, value) in scan_prefix(&table, keys::DESCRIPTOR_PREFIX)? {
            let descriptor: Descriptor = serde_json::from_slice(&value).map_err(storage)?;
            entries.push(SnapshotEntry {
                person_id: descriptor.person_id,
                descriptor_id: descriptor.id,
                vector: descriptor.vector,
            });
        }
        Ok(entries)
    }

    fn counts(&self) -> Result<(usize, usize), FaceIdError> {
        let tx = self.db.begin_read().map_err(storage)?;
        let table = tx.open_table(TABLE).map_err(storage)?;

        let mut people = 0usize;
        let mut descriptors = 0usize;
        for item in table.iter().map_err(storage)? {
            let (key, _) = item.map_err(storage)?;
            let key_str = key.value();
            if key_str.starts_with(keys::PERSON_PREFIX) {
                people += 1;
            } else if key_str.starts_with(keys::DESCRIPTOR_PREFIX) {
                descriptors += 1;
            }
        }
        Ok((people, descriptors))
    }
}
