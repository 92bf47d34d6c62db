//! Console rendering of frame identifiers and payloads.

use core::fmt::Write;

use embedded_can::Frame;

use super::CanFrame;

/// Identifier as lowercase hex: 3 digits for standard, 8 for extended frames.
pub fn format_id(frame: &CanFrame) -> String {
    if frame.is_extended() {
        format!("{:08x}", frame.raw_id())
    } else {
        format!("{:03x}", frame.raw_id())
    }
}

/// Payload as space-separated uppercase hex bytes, without a trailing space.
pub fn format_data(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 3);
    for (i, byte) in data.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{byte:02X}");
    }
    out
}
