//! Strongly-typed identifiers for simulation entities.

use serde::{Deserialize, Serialize};

/// Sequence number of a measurement run within a session.
///
/// Incremented every time a run is armed, whether or not it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RunId(pub u32);

impl RunId {
    /// Returns the identifier that follows this one.
    #[inline]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl From<u32> for RunId {
    fn from(val: u32) -> Self {
        Self(val)
    }
}

/// The two bodies of the pendulum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyId {
    /// Fixed pivot.
    Anchor,
    /// Swinging mass.
    Bob,
}

impl BodyId {
    pub fn name(self) -> &'static str {
        match self {
            BodyId::Anchor => "anchor",
            BodyId::Bob => "bob",
        }
    }
}
