//! Domain model for allocation runs: assignables, resources, and snapshots.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of an entity awaiting a resource.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignableId(pub String);

/// Identifier of a capacity-bounded allocation target.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub String);

/// Open category tag used for soft matching (e.g. a course code).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreferenceTag(pub String);

macro_rules! string_newtype {
    ($ty:ident) => {
        impl $ty {
            /// Build from anything string-like.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the underlying string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $ty {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_newtype!(AssignableId);
string_newtype!(ResourceId);
string_newtype!(PreferenceTag);

/// Opaque marker of persisted-state freshness.
///
/// Every committed mutation of the store advances the token; a plan computed
/// against an older token is rejected at execution time.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct VersionToken(pub u64);

impl VersionToken {
    /// The token following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// An entity needing a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignable {
    /// Identity.
    pub id: AssignableId,
    /// Category used for soft matching.
    pub preference: PreferenceTag,
    /// Resource currently referenced; `Some` means never re-planned.
    pub resource: Option<ResourceId>,
}

impl Assignable {
    /// Create an unassigned entity.
    pub fn unassigned(id: impl Into<String>, preference: impl Into<String>) -> Self {
        Self {
            id: AssignableId(id.into()),
            preference: PreferenceTag(preference.into()),
            resource: None,
        }
    }

    /// Whether this entity already references a resource.
    #[must_use]
    pub const fn is_assigned(&self) -> bool {
        self.resource.is_some()
    }
}

/// A capacity-bounded allocation target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Identity.
    pub id: ResourceId,
    /// Category this resource primarily serves.
    pub preference: PreferenceTag,
    /// Number of assignables currently referencing it.
    pub load: u32,
}

impl Resource {
    /// Create a resource with the given current load.
    pub fn new(id: impl Into<String>, preference: impl Into<String>, load: u32) -> Self {
        Self {
            id: ResourceId(id.into()),
            preference: PreferenceTag(preference.into()),
            load,
        }
    }
}

/// Consistent read of unassigned entities and all resources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Entities with no resource reference at read time.
    pub assignables: Vec<Assignable>,
    /// All resources with their load at read time.
    pub resources: Vec<Resource>,
    /// Version the read was taken at.
    pub version: VersionToken,
}

impl Snapshot {
    /// Load of a resource as of this snapshot.
    #[must_use]
    pub fn load_of(&self, id: &ResourceId) -> Option<u32> {
        self.resources.iter().find(|r| &r.id == id).map(|r| r.load)
    }
}
