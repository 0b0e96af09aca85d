//! Strongly-typed identifiers for VPSie resources.
//!
//! VPSie addresses resources by opaque string identifiers. Wrapping each kind in
//! its own type keeps a backup identifier from being passed where a VM is
//! expected.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

macro_rules! identifier_type {
    ($(#[$meta:meta])* $name:ident, $doc:expr) => {
        $(#[$meta])*
        #[doc = $doc]
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an identifier string without checking it.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Parses an identifier, rejecting empty or blank input.
            ///
            /// # Errors
            ///
            /// Returns an error if the string is empty after trimming.
            pub fn parse_str(input: &str) -> Result<Self> {
                let trimmed = input.trim();
                if trimmed.is_empty() {
                    return Err(Error::InvalidRequest(format!(
                        "{} must not be empty",
                        stringify!($name)
                    )));
                }
                Ok(Self(trimmed.to_string()))
            }

            /// Percent-encodes the identifier as a single URL path segment.
            ///
            /// # Errors
            ///
            /// Returns an error for identifiers that would resolve to a
            /// different path: empty, `.` or `..`.
            pub fn path_segment(&self) -> Result<Cow<'_, str>> {
                if matches!(self.0.as_str(), "" | "." | "..") {
                    return Err(Error::InvalidRequest(format!(
                        "{} `{}` cannot be used in a request path",
                        stringify!($name),
                        self.0
                    )));
                }
                Ok(urlencoding::encode(&self.0))
            }

            /// Borrows the identifier string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Converts into the identifier string.
            #[must_use]
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::parse_str(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

identifier_type!(VmId, "Virtual machine (server) identifier");
identifier_type!(BackupId, "Backup identifier");
identifier_type!(BackupPolicyId, "Backup policy identifier");
identifier_type!(FirewallGroupId, "Firewall group identifier");
identifier_type!(ProjectId, "Project identifier");
