//! USB control transfer handling for the WebLight LED controller.
//!
//! WebLight is a small addressable-LED controller that talks to browsers over WebUSB and to
//! Windows over WinUSB without any driver installation. It uses control transfers only. This
//! crate implements the device side of those transfers: the descriptor catalog (device, BOS,
//! Microsoft OS 2.0 and WebUSB URL descriptors), the vendor request dispatcher and the small state
//! machines that stream descriptors to the host and collect RGB payloads from it.
//!
//! The low-level USB transceiver is an external collaborator. It calls into [`device::WebLight`]
//! through four entry points:
//!
//! * [`on_setup`](device::WebLight::on_setup) for every non-standard SETUP packet,
//! * [`on_descriptor_request`](device::WebLight::on_descriptor_request) for GET_DESCRIPTOR,
//! * [`on_read`](device::WebLight::on_read) to fetch a streamed IN data stage, and
//! * [`on_write`](device::WebLight::on_write) to deliver an OUT data stage.
//!
//! Hardware specific actions (driving the LEDs, persisting the LED count, blinking the status LED
//! and arming the watchdog) are provided by implementing the [`board::Board`] trait.
//!
//! For stacks that hand over raw endpoint 0 packets instead of calling the entry points above,
//! [`control_pipe::ControlPipe`] implements the packet-level SETUP/DATA/STATUS sequencing.

#![no_std]
#![warn(missing_docs)]

#[cfg(test)]
extern crate std;

/// A USB stack error.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UsbError {
    /// A SETUP packet was not exactly 8 bytes long or contained invalid fields.
    InvalidSetupPacket,

    /// A buffer too short for the data to write or read was passed, or the host sent more data
    /// than the transfer declared.
    BufferOverflow,

    /// An operation was attempted in a state of the control pipe that does not allow it.
    InvalidState,

    /// There is no data available right now. Try again later.
    WouldBlock,
}

/// Direction of USB traffic. Note that in the USB standard the direction is always indicated from
/// the perspective of the host, which is backward for devices, but the standard directions are
/// used for consistency.
#[repr(u8)]
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UsbDirection {
    /// Host to device (OUT)
    Out = 0x00,
    /// Device to host (IN)
    In = 0x80,
}

impl From<u8> for UsbDirection {
    fn from(value: u8) -> Self {
        if value & 0x80 != 0 {
            UsbDirection::In
        } else {
            UsbDirection::Out
        }
    }
}

/// Result for USB operations.
pub type Result<T> = core::result::Result<T, UsbError>;

#[macro_use]
mod macros;

/// Hardware collaborators: LED strip, status LED and watchdog.
pub mod board;

/// USB control request parsing.
pub mod control;

/// Packet-level driver for endpoint 0.
pub mod control_pipe;

/// Standard USB descriptor encoding.
pub mod descriptor;

/// Byte-exact descriptors and the runtime descriptor catalog.
pub mod catalog;

/// Counters for conditions the protocol handles silently.
pub mod diagnostics;

/// The WebLight request dispatcher.
pub mod device;

/// Vendor request codes.
pub mod request;

/// Device reset through the hardware watchdog.
pub mod reset;

/// Multi-stage data transfer state.
pub mod transfer;

mod device_builder;

/// Prelude for firmware using the WebLight handler.
pub mod prelude {
    pub use crate::board::{Board, BoardError, Rgb, WatchdogTimeout};
    pub use crate::control_pipe::ControlPipe;
    pub use crate::device::{Outcome, Payload, WebLight};
    pub use crate::device_builder::{UsbVidPid, WebLightBuilder};
    pub use crate::{UsbDirection, UsbError};
}
