//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Subscribers are the only entities with generated identities; machine
//! identifiers are operator-assigned strings ("M1", "M2") and stay plain
//! `String`s on the wire. The newtype here prevents accidental mixing of
//! subscriber handles with other UUID-shaped values at compile time.
//! IDs use UUID v7 (time-ordered) so registry iteration follows join
//! order.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a live feed subscriber.
    SubscriberId
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn subscriber_ids_are_unique() {
        let a = SubscriberId::new();
        let b = SubscriberId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn subscriber_id_roundtrips_through_uuid() {
        let id = SubscriberId::new();
        let uuid: Uuid = id.into();
        assert_eq!(SubscriberId::from(uuid), id);
        assert_eq!(id.into_inner(), uuid);
    }

    #[test]
    fn subscriber_id_display_matches_uuid() {
        let id = SubscriberId::new();
        assert_eq!(id.to_string(), id.0.to_string());
    }
}
