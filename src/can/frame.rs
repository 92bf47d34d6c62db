//! Classic CAN frame captured from a bus.

use embedded_can::{ExtendedId, Frame, Id, StandardId};

/// Maximum classic CAN payload in bytes.
pub const MAX_DATA_LEN: usize = 8;

/// A classic CAN frame (up to 8 data bytes).
///
/// Frames are plain values: once received they are copied into log records
/// and forwarded unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanFrame {
    id: Id,
    remote: bool,
    dlc: u8,
    data: [u8; MAX_DATA_LEN],
}

impl CanFrame {
    /// Create a data frame with an 11-bit identifier.
    ///
    /// Returns `None` if `id` exceeds 11 bits or `data` exceeds 8 bytes.
    pub fn standard(id: u16, data: &[u8]) -> Option<Self> {
        Self::new(StandardId::new(id)?, data)
    }

    /// Create a data frame with a 29-bit identifier.
    ///
    /// Returns `None` if `id` exceeds 29 bits or `data` exceeds 8 bytes.
    pub fn extended(id: u32, data: &[u8]) -> Option<Self> {
        Self::new(ExtendedId::new(id)?, data)
    }

    /// Numeric identifier without the format flag.
    #[inline]
    pub fn raw_id(&self) -> u32 {
        match self.id {
            Id::Standard(id) => u32::from(id.as_raw()),
            Id::Extended(id) => id.as_raw(),
        }
    }

    /// Declared data length code (0..=8).
    #[inline]
    pub fn data_len(&self) -> u8 {
        self.dlc
    }

    /// Payload byte at `index`, or 0 past the end of the payload.
    #[inline]
    pub fn byte(&self, index: usize) -> u8 {
        self.data().get(index).copied().unwrap_or(0)
    }
}

impl Frame for CanFrame {
    fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        if data.len() > MAX_DATA_LEN {
            return None;
        }
        let mut frame_data = [0u8; MAX_DATA_LEN];
        frame_data[..data.len()].copy_from_slice(data);
        Some(Self {
            id: id.into(),
            remote: false,
            dlc: data.len() as u8,
            data: frame_data,
        })
    }

    fn new_remote(id: impl Into<Id>, dlc: usize) -> Option<Self> {
        if dlc > MAX_DATA_LEN {
            return None;
        }
        Some(Self {
            id: id.into(),
            remote: true,
            dlc: dlc as u8,
            data: [0u8; MAX_DATA_LEN],
        })
    }

    fn is_extended(&self) -> bool {
        matches!(self.id, Id::Extended(_))
    }

    fn is_remote_frame(&self) -> bool {
        self.remote
    }

    fn id(&self) -> Id {
        self.id
    }

    fn dlc(&self) -> usize {
        self.dlc as usize
    }

    fn data(&self) -> &[u8] {
        if self.remote {
            &[]
        } else {
            &self.data[..self.dlc as usize]
        }
    }
}
