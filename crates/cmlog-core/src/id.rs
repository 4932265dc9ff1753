//! Strongly-typed identifiers used by recorded commands.

use std::fmt;

/// Simulation tick counter at which a recorded command must be applied.
///
/// Stored as four bytes in the record stream, so the counter is 32 bits
/// wide. Hosts with wider clocks truncate when recording.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickCounter(pub u32);

impl fmt::Display for TickCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TickCounter {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identity (company/player) on whose behalf a command executes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(pub u8);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u8> for ActorId {
    fn from(v: u8) -> Self {
        Self(v)
    }
}

/// Network client that originally issued a command.
///
/// Informational only; replay never routes on it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(pub u16);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for ClientId {
    fn from(v: u16) -> Self {
        Self(v)
    }
}

/// Opcode selecting which operation a command performs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandId(pub u16);

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for CommandId {
    fn from(v: u16) -> Self {
        Self(v)
    }
}

/// Network frame number used to schedule a rebroadcast command on peers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub u32);

impl FrameId {
    /// Frame `lead` frames after this one, wrapping on overflow.
    pub fn ahead(self, lead: u32) -> Self {
        Self(self.0.wrapping_add(lead))
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for FrameId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}
