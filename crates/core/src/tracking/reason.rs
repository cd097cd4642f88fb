//! Event reason codes written by the particle-tracking engine
//!
//! Codes are a contract with the upstream engine and are matched exactly as
//! recorded. Unknown codes are carried through untouched; [`EventReason`] is
//! only a named view of the known ones.
//!
//! | Code | Reason |
//! |------|--------|
//! | 0 | release |
//! | 1 | cell exit |
//! | 2 | time step end |
//! | 3 | termination |
//! | 4 | weak sink exit |
//! | 5 | user-specified output time |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw reason code as stored in a tracking table
pub type ReasonCode = i64;

/// Known event reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventReason {
    /// Particle released
    Release,
    /// Particle left a cell
    CellExit,
    /// End of a flow-model time step
    TimestepEnd,
    /// Particle tracking ended
    Termination,
    /// Particle exited a weak sink
    WeakSinkExit,
    /// User-specified output time reached
    UserTime,
}

impl EventReason {
    /// Integer code as written by the tracking engine
    #[inline]
    pub const fn code(self) -> ReasonCode {
        match self {
            EventReason::Release => 0,
            EventReason::CellExit => 1,
            EventReason::TimestepEnd => 2,
            EventReason::Termination => 3,
            EventReason::WeakSinkExit => 4,
            EventReason::UserTime => 5,
        }
    }

    /// Known reason for `code`, if any
    pub const fn from_code(code: ReasonCode) -> Option<Self> {
        match code {
            0 => Some(EventReason::Release),
            1 => Some(EventReason::CellExit),
            2 => Some(EventReason::TimestepEnd),
            3 => Some(EventReason::Termination),
            4 => Some(EventReason::WeakSinkExit),
            5 => Some(EventReason::UserTime),
            _ => None,
        }
    }
}

impl From<EventReason> for ReasonCode {
    fn from(r: EventReason) -> Self {
        r.code()
    }
}

impl fmt::Display for EventReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventReason::Release => "release",
            EventReason::CellExit => "cell exit",
            EventReason::TimestepEnd => "time step end",
            EventReason::Termination => "termination",
            EventReason::WeakSinkExit => "weak sink exit",
            EventReason::UserTime => "user time",
        };
        f.write_str(name)
    }
}
