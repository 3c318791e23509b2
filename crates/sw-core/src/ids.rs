//! Strongly typed, zero-cost identifier wrappers.
//!
//! Agents and targets are both nodes of the emulated session, so each has its
//! own wrapper for type safety and converts into [`NodeId`] when a
//! session-control lookup needs the raw node number.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID"; equivalent to `u32::MAX`.
            pub const INVALID: $name = $name(<$inner>::MAX);
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl TryFrom<i64> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: i64) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Session node number of a tracking agent (UAV).
    pub struct AgentId(u32);
}

typed_id! {
    /// Session node number of a trackable target.
    pub struct TargetId(u32);
}

typed_id! {
    /// Any node in the emulated session.
    pub struct NodeId(u32);
}

impl From<AgentId> for NodeId {
    #[inline(always)]
    fn from(id: AgentId) -> NodeId {
        NodeId(id.0)
    }
}

impl From<TargetId> for NodeId {
    #[inline(always)]
    fn from(id: TargetId) -> NodeId {
        NodeId(id.0)
    }
}
