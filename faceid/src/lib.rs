//! Face descriptor storage and nearest-neighbor identity matching.
//!
//! Associates known people with one or more face descriptors (fixed-length
//! feature vectors produced by an external embedding model) and resolves an
//! unlabeled probe vector to the closest enrolled person, or to no match.
//!
//! # Usage
//!
//! ```
//! use facewhiz_faceid::{Gallery, MemoryStore, NewPerson};
//!
//! let gallery = Gallery::new(Box::new(MemoryStore::new()));
//! let person = gallery
//!     .register(NewPerson { name: Some("Ada".into()), ..Default::default() })
//!     .unwrap();
//! let descriptor_id = gallery.enroll(&person.id, vec![0.0; 128]).unwrap();
//!
//! // Accept the closest enrolled person within the distance threshold.
//! let hit = gallery.identify(&vec![0.0; 128], 0.5).unwrap().unwrap();
//! assert_eq!(hit.person_id, person.id);
//! assert_eq!(hit.descriptor_id, descriptor_id);
//! ```
//!
//! # Design
//!
//! [`Gallery::identify`] takes a point-in-time snapshot of every stored
//! descriptor and runs a linear scan over it — O(N·D) per probe, no spatial
//! index. Intended for single-organization deployments with small enrolled
//! populations; persistence sits behind the [`PersonStore`] trait so the
//! matching path never depends on a particular backend.
//!
//! "No match" is a normal outcome (`Ok(None)`), distinct from failures such
//! as mixed descriptor lengths, which surface as [`FaceIdError`] values.

mod distance;
mod engine;
mod error;
mod gallery;
mod store;
mod types;

pub use distance::{euclidean, is_valid_descriptor, DESCRIPTOR_LENGTHS};
pub use engine::identify;
pub use error::FaceIdError;
pub use gallery::Gallery;
pub use store::{MemoryStore, PersonStore};
pub use types::{Descriptor, Match, NewPerson, Person, SnapshotEntry};
