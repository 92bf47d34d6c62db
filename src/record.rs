//! Tagged traffic records flowing from the bus tasks to storage.

use core::fmt;

use crate::can::CanFrame;

/// Numeric source tag written to the `Bus` column of the log table.
///
/// The tag values are fixed by the log format: plain bus observations use the
/// bus number, forwarded frames use `10 + source bus` paired with the
/// destination. Unrecognised tags render as `UNKNOWN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceTag(pub u8);

impl SourceTag {
    /// Frame observed on bridge side A.
    pub const BUS_A: Self = Self(1);
    /// Frame observed on the monitored bus.
    pub const BUS_C: Self = Self(2);
    /// Frame observed on bridge side B.
    pub const BUS_B: Self = Self(3);
    /// Frame forwarded from A to B.
    pub const FORWARD_A_TO_B: Self = Self(11);
    /// Frame forwarded from B to A.
    pub const FORWARD_B_TO_A: Self = Self(13);

    /// Interface label for the `Interface` column.
    pub fn label(self) -> &'static str {
        match self {
            Self::BUS_A => "CAN1",
            Self::BUS_C => "CAN2",
            Self::BUS_B => "CAN3",
            Self::FORWARD_A_TO_B => "CAN1->CAN3",
            Self::FORWARD_B_TO_A => "CAN3->CAN1",
            _ => "UNKNOWN",
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Forwarding direction of a bridge task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Bus A (`CAN1`) to bus B (`CAN3`).
    AToB,
    /// Bus B (`CAN3`) to bus A (`CAN1`).
    BToA,
}

impl Direction {
    /// Tag attached to records of frames forwarded in this direction.
    pub fn tag(self) -> SourceTag {
        match self {
            Direction::AToB => SourceTag::FORWARD_A_TO_B,
            Direction::BToA => SourceTag::FORWARD_B_TO_A,
        }
    }

    /// Task and log name, e.g. `CAN1->CAN3`.
    pub fn name(self) -> &'static str {
        self.tag().label()
    }
}

/// One observed or forwarded frame awaiting persistence.
///
/// Created by exactly one producer and consumed exactly once by the storage
/// writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRecord {
    /// Where the frame came from
    pub source: SourceTag,
    /// The captured frame
    pub frame: CanFrame,
    /// Arrival time in monotonic microseconds
    pub timestamp_us: u64,
}

impl LogRecord {
    /// Create a record.
    pub fn new(source: SourceTag, frame: CanFrame, timestamp_us: u64) -> Self {
        Self {
            source,
            frame,
            timestamp_us,
        }
    }
}
