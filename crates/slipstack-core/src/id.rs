#![forbid(unsafe_code)]

//! Opaque identifiers for navigable surfaces.
//!
//! Panels and modals are identified by host-chosen strings. The controllers
//! never interpret the contents; identity is equality.

use std::fmt;

/// Identifier of one screen in a navigable panel stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PanelId(String);

/// Identifier of one overlay in a modal stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModalId(String);

macro_rules! impl_id {
    ($ty:ident) => {
        impl $ty {
            /// Create an identifier from any string-like value.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// The identifier as a string slice.
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $ty {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $ty {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

impl_id!(PanelId);
impl_id!(ModalId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_id_round_trip() {
        let id = PanelId::new("home");
        assert_eq!(id.as_str(), "home");
        assert_eq!(id.to_string(), "home");
        assert_eq!(id, PanelId::from("home"));
    }

    #[test]
    fn modal_id_equality_is_string_equality() {
        assert_eq!(ModalId::from("filters"), ModalId::new(String::from("filters")));
        assert_ne!(ModalId::from("filters"), ModalId::from("Filters"));
    }
}
