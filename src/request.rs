use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Vendor request codes understood by WebLight.
///
/// The WebUSB and WinUSB codes are also advertised to the host in the BOS descriptor, and each of
/// them multiplexes several sub-requests selected by the `index` field.
#[repr(u8)]
#[derive(Copy, Clone, Eq, PartialEq, Debug, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VendorRequest {
    /// Returns the raw value and index fields. Used as a liveness check.
    Echo = 0x00,
    /// Sets the strip color. The data stage carries red, green and blue bytes.
    SetRgb = 0x01,
    /// Sets and persists the number of LEDs. The count is the low byte of `value`.
    SetLedCount = 0x02,
    /// Resets the device through the watchdog.
    ResetDevice = 0x03,
    /// WebUSB vendor code. See [`webusb_request`].
    WebUsb = 0x04,
    /// Microsoft OS 2.0 vendor code. See [`winusb_request`].
    WinUsb = 0x05,
}

/// Sub-requests of [`VendorRequest::WebUsb`], selected by the `index` field.
#[allow(missing_docs)]
pub mod webusb_request {
    pub const GET_ALLOWED_ORIGINS: u16 = 0x01;
    pub const GET_LANDING_PAGE: u16 = 0x02;
}

/// Sub-requests of [`VendorRequest::WinUsb`], selected by the `index` field.
pub mod winusb_request {
    /// MS_OS_20_DESCRIPTOR_INDEX: retrieve the Microsoft OS 2.0 descriptor set.
    pub const DESCRIPTOR: u16 = 0x07;
}
