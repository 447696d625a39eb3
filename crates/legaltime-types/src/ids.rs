//! Type-safe identifier wrappers around owned strings.
//!
//! Events, regions, and timezones are all identified by strings supplied by
//! collaborators (an opaque event id, a two-letter postal code, an IANA zone
//! name). Each gets a strongly-typed wrapper to prevent accidental mixing of
//! identifiers at compile time.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around [`String`] with standard derives.
macro_rules! define_name {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an identifier from anything convertible to a string.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Return the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Return the inner [`String`] value.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_name! {
    /// Opaque identifier for a geotagged event, supplied by the collaborator
    /// that ingested it. Used only for diagnostics and lookup caching.
    EventId
}

define_name! {
    /// Two-letter administrative region code (e.g. `CO`).
    RegionCode
}

define_name! {
    /// IANA timezone identifier (e.g. `America/Denver`).
    TzName
}
