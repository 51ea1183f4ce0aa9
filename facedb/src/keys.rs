/// Key layout for the single redb table.
///
/// Person and descriptor records share one keyspace under distinct
/// prefixes; descriptor keys embed the owning person id so a cascade
/// delete is a prefix sweep inside the same write transaction:
///
/// ```text
/// p:{personId}                 → JSON Person
/// d:{personId}:{descriptorId}  → JSON Descriptor
/// ```
///
/// Ids are UUIDs, so keys never contain an ambiguous ':'.

/// Prefix for all person records.
pub const PERSON_PREFIX: &str = "p:";

/// Prefix for all descriptor records.
pub const DESCRIPTOR_PREFIX: &str = "d:";

/// Key for a person record. Format: "p:{personId}"
pub fn person_key(person_id: &str) -> String {
    format!("p:{person_id}")
}

/// Key for a descriptor record. Format: "d:{personId}:{descriptorId}"
pub fn descriptor_key(person_id: &str, descriptor_id: &str) -> String {
    format!("d:{person_id}:{descriptor_id}")
}

/// Prefix for listing all of one person's descriptors. Format: "d:{personId}:"
pub fn descriptor_prefix(person_id: &str) -> String {
    format!("d:{person_id}:")
}
