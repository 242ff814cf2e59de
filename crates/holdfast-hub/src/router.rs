//! Interface routing.
//!
//! Every request declares the interface it operates on; the declared name
//! must be one of the fixed set below, matched case-sensitively. Commit
//! queries are the exception: they are interface-agnostic and skip this
//! check entirely.

use std::fmt;

use holdfast_hub_core::{HubError, Result};

/// The fixed set of hub interfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interface {
    Collections,
    Actions,
    Permissions,
    Profile,
}

impl Interface {
    /// Parse a declared interface name.
    ///
    /// `declared_at` is the dot-path blamed when the name is not
    /// recognized: `commit.protected.interface` for writes,
    /// `query.interface` for object queries.
    pub fn parse(name: &str, declared_at: &str) -> Result<Self> {
        match name {
            "Collections" => Ok(Interface::Collections),
            "Actions" => Ok(Interface::Actions),
            "Permissions" => Ok(Interface::Permissions),
            "Profile" => Ok(Interface::Profile),
            other => Err(HubError::bad_request(
                declared_at,
                format!("unknown interface '{other}'"),
            )),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Interface::Collections => "Collections",
            Interface::Actions => "Actions",
            Interface::Permissions => "Permissions",
            Interface::Profile => "Profile",
        }
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
