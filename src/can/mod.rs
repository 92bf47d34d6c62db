//! CAN frames and bus controller endpoints.
//!
//! Frames implement the [`embedded-can`](https://crates.io/crates/embedded-can)
//! [`Frame`](embedded_can::Frame) trait so that any HAL frame type can be
//! converted at the driver boundary. Controllers are consumed through
//! [`CanInterface`]; [`VirtualBus`] is the in-memory implementation used on
//! hosts and in tests.
//!
//! # Example
//!
//! ```
//! use can_bridge_logger::can::{format_data, format_id, CanFrame};
//!
//! let frame = CanFrame::extended(0x18FE_F100, &[0x01, 0x02]).unwrap();
//! assert_eq!(format_id(&frame), "18fef100");
//! assert_eq!(format_data(&[0x01, 0x02]), "01 02");
//! ```

mod display;
mod frame;
mod interface;
mod virtual_bus;

pub use display::{format_data, format_id};
pub use frame::{CanFrame, MAX_DATA_LEN};
pub use interface::CanInterface;
pub use virtual_bus::{BusWire, VirtualBus, virtual_bus};
