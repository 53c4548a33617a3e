//! Identity types for Caseflow entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;
use uuid::Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Common behaviour of the strongly-typed entity identifiers.
///
/// Each entity gets its own newtype so an assignment id can never be passed
/// where a caseworker id is expected. All joins between entities go through
/// these identifiers; no entity embeds another.
pub trait EntityIdType:
    Copy + Eq + Hash + Ord + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    /// Human-readable entity name used in error messages.
    const ENTITY_NAME: &'static str;

    /// Wrap an existing UUID.
    fn new(uuid: Uuid) -> Self;

    /// Access the underlying UUID.
    fn as_uuid(&self) -> Uuid;

    /// Generate a fresh timestamp-sortable identifier.
    fn now_v7() -> Self {
        Self::new(Uuid::now_v7())
    }

    /// The all-zero identifier.
    fn nil() -> Self {
        Self::new(Uuid::nil())
    }

    /// Whether this is the all-zero identifier.
    fn is_nil(&self) -> bool {
        self.as_uuid().is_nil()
    }
}

macro_rules! define_entity_id {
    ($(#[$meta:meta])* $name:ident, $entity:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
        #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl EntityIdType for $name {
            const ENTITY_NAME: &'static str = $entity;

            fn new(uuid: Uuid) -> Self {
                Self(uuid)
            }

            fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

define_entity_id!(
    /// Identifier of an assignment record.
    AssignmentId,
    "Assignment"
);
define_entity_id!(
    /// Identifier of a tenant (organisation).
    TenantId,
    "Tenant"
);
define_entity_id!(
    /// Identifier of a client in the client directory.
    ClientId,
    "Client"
);
define_entity_id!(
    /// Identifier of a caseworker (team member) in the caseworker registry.
    CaseworkerId,
    "Caseworker"
);
