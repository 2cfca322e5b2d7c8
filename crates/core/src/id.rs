// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifier newtypes.
//!
//! All identifiers here are assigned by external collaborators (the
//! front-end hands out job and requester ids, the messaging transport
//! hands back delivery references); none are minted locally, so these
//! are plain string wrappers rather than generated ids.

/// Define a newtype ID wrapper around `SmolStr`.
///
/// Generates `new()`, `as_str()`, `Display`, `From<&str>`, `From<String>`,
/// `PartialEq<str>`, `PartialEq<&str>` and `Borrow<str>` implementations.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub smol_str::SmolStr);

        impl $name {
            /// Create an ID from any string-like value.
            pub fn new(id: impl Into<smol_str::SmolStr>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns true if the ID is an empty string.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id! {
    /// Identifier of the source artifact a render was requested for.
    ///
    /// Assigned by the front-end collaborator when the file is first
    /// uploaded; stable across retries and re-renders of the same source.
    pub struct JobId;
}

define_id! {
    /// Routing target for final delivery (the requesting chat/user).
    pub struct RequesterId;
}

define_id! {
    /// Opaque reference returned by the messaging collaborator for a
    /// delivered artifact. Recorded per (job, percentage) so identical
    /// re-requests can be satisfied by forwarding instead of re-rendering.
    pub struct DeliveryRef;
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
