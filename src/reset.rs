use crate::board::{Board, WatchdogTimeout};

/// Number of status LED blinks shown before a reset.
pub const RESET_BLINKS: u8 = 3;

/// Watchdog timeout used to reset the device.
pub const RESET_TIMEOUT: WatchdogTimeout = WatchdogTimeout::Ms15;

/// Reset state of the device.
#[repr(u8)]
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResetState {
    /// Normal operation.
    Running,

    /// A reset was requested. The device is waiting for the watchdog and will not process any more
    /// requests.
    Halting,
}

/// Resets the device: blinks the status LED, arms the watchdog and waits for it to fire.
///
/// There is no way back from this. The next thing the firmware sees is its own startup code.
pub fn force_reset<B: Board>(board: &mut B, state: &mut ResetState) -> ! {
    *state = ResetState::Halting;

    usb_debug!("reset requested, halting until watchdog fires");

    board.status_blink(RESET_BLINKS);
    board.enable_watchdog(RESET_TIMEOUT);
    board.halt()
}
