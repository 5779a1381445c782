/// A color for the LED strip.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Creates a color from its three channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Rgb {
        Rgb { r, g, b }
    }
}

/// A failure reported by the board while persisting configuration.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BoardError {
    /// The non-volatile storage could not be written.
    Storage,
}

/// Hardware watchdog timeouts used by the reset path.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WatchdogTimeout {
    /// 15 milliseconds, the shortest timeout the watchdog offers.
    Ms15,
}

impl WatchdogTimeout {
    /// The timeout in milliseconds.
    pub fn millis(self) -> u16 {
        match self {
            WatchdogTimeout::Ms15 => 15,
        }
    }
}

/// A trait for the hardware the request handler drives. Implement this for the board the firmware
/// runs on.
///
/// All methods are called synchronously from the USB stack's transaction processing context, so
/// implementations should return quickly. Writing to EEPROM is the slowest operation the handler
/// ever asks for.
pub trait Board {
    /// Sets the color of the LED strip.
    fn set_leds(&mut self, color: Rgb);

    /// Sets the number of LEDs on the strip.
    fn set_led_count(&mut self, count: u8);

    /// Persists the current LED count to non-volatile storage.
    ///
    /// # Errors
    ///
    /// * [`Storage`](BoardError::Storage) - The value could not be persisted. The handler counts
    ///   and logs the failure but the host is not told about it.
    fn write_led_count(&mut self) -> core::result::Result<(), BoardError>;

    /// Blinks the status LED `times` times. May block for the duration of the blinks.
    fn status_blink(&mut self, times: u8);

    /// Arms the hardware watchdog so that it resets the device after `timeout`.
    fn enable_watchdog(&mut self, timeout: WatchdogTimeout);

    /// Stops making progress until the watchdog resets the device.
    ///
    /// The default implementation spins forever.
    fn halt(&mut self) -> ! {
        loop {
            core::hint::spin_loop();
        }
    }
}
