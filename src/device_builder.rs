use crate::board::Board;
use crate::catalog::{Catalog, SERIAL_NUMBER_LEN};
use crate::device::{Config, WebLight};
use crate::Result;

/// A USB vendor ID and product ID pair.
pub struct UsbVidPid(pub u16, pub u16);

/// Used to build a [`WebLight`] request handler.
///
/// The defaults describe the stock WebLight hardware. Everything set here ends up in descriptors
/// that are encoded once by [`build`](WebLightBuilder::build) and never change afterwards.
pub struct WebLightBuilder<'a, B: Board> {
    board: B,
    serial_number: [u8; SERIAL_NUMBER_LEN],
    config: Config<'a>,
}

macro_rules! builder_fields {
    ( $( $(#[$meta:meta])* $name:ident: $type:ty, )* ) => {
        $(
            $(#[$meta])*
            pub fn $name(mut self, $name: $type) -> Self {
                self.config.$name = $name;
                self
            }
        )*
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Error type for the USB device builder
pub enum BuilderError {
    /// The provided max packet size is not valid for the control endpoint.
    InvalidPacketSize,
    /// The provided power draw exceeds what USB allows.
    PowerTooHigh,
}

impl<'a, B: Board> WebLightBuilder<'a, B> {
    /// Creates a builder for a device driving `board`. `serial_number` is the fixed-width ASCII
    /// serial read from non-volatile storage at startup.
    pub fn new(board: B, serial_number: [u8; SERIAL_NUMBER_LEN]) -> WebLightBuilder<'a, B> {
        WebLightBuilder {
            board,
            serial_number,
            config: Config::default(),
        }
    }

    /// Creates the [`WebLight`] handler with the settings in this builder.
    ///
    /// # Errors
    ///
    /// * [`BufferOverflow`](crate::UsbError::BufferOverflow) - The manufacturer or product string
    ///   is too long to fit in a string descriptor.
    pub fn build(self) -> Result<WebLight<B>> {
        let catalog = Catalog::new(&self.config, &self.serial_number)?;

        Ok(WebLight::build(self.board, catalog, &self.config))
    }

    builder_fields! {
        /// Sets the device class code assigned by USB.org. Set to `0xff` for vendor-specific
        /// devices that do not conform to any class.
        ///
        /// Default: `0xff` (vendor-specific)
        device_class: u8,

        /// Sets the device sub-class code. Depends on class.
        ///
        /// Default: `0x00`
        device_sub_class: u8,

        /// Sets the device protocol code. Depends on class and sub-class.
        ///
        /// Default: `0x00`
        device_protocol: u8,

        /// Sets the device release version in BCD. The major version tells host software which
        /// SET_RGB payload format the firmware expects.
        ///
        /// Default: `0x0200` ("2.0")
        device_release: u16,

        /// Sets the manufacturer name string descriptor.
        ///
        /// Default: `"sowbug"`
        manufacturer: &'a str,

        /// Sets the product name string descriptor.
        ///
        /// Default: `"WebLight"`
        product: &'a str,

        /// Sets whether the device may have an external power source.
        ///
        /// Default: `false`
        self_powered: bool,

        /// Sets the class code of the single interface.
        ///
        /// Default: `0xff` (vendor-specific)
        interface_class: u8,
    }

    /// Sets the vendor and product IDs.
    ///
    /// Default: `UsbVidPid(0x1209, 0xa800)`
    pub fn vid_pid(mut self, vid_pid: UsbVidPid) -> Self {
        self.config.vendor_id = vid_pid.0;
        self.config.product_id = vid_pid.1;
        self
    }

    /// Sets the maximum packet size in bytes for the control endpoint 0.
    ///
    /// Valid values are 8, 16, 32 and 64. Low-speed devices must use 8.
    ///
    /// Default: 8 bytes
    pub fn max_packet_size_0(mut self, max_packet_size_0: u8) -> core::result::Result<Self, BuilderError> {
        match max_packet_size_0 {
            8 | 16 | 32 | 64 => {}
            _ => return Err(BuilderError::InvalidPacketSize),
        }

        self.config.max_packet_size_0 = max_packet_size_0;
        Ok(self)
    }

    /// Sets the maximum current drawn from the USB bus by the device in milliamps.
    ///
    /// Default: 100mA
    pub fn max_power(mut self, max_power_ma: usize) -> core::result::Result<Self, BuilderError> {
        if max_power_ma > 500 {
            return Err(BuilderError::PowerTooHigh);
        }

        self.config.max_power = (max_power_ma / 2) as u8;
        Ok(self)
    }
}
