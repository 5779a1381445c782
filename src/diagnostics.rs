use portable_atomic::{AtomicU16, Ordering};

/// Counters for conditions the protocol deliberately doesn't report to the host.
///
/// The wire behavior never depends on these. They are updated from the USB transaction context
/// through a shared reference and can be read from the main loop at any time. All counters
/// saturate instead of wrapping.
#[derive(Debug, Default)]
pub struct Diagnostics {
    unhandled_requests: AtomicU16,
    truncated_bytes: AtomicU16,
    led_count_write_failures: AtomicU16,
    superseded_transfers: AtomicU16,
}

/// A point-in-time copy of [`Diagnostics`].
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DiagnosticsSnapshot {
    /// Requests answered with a STALL.
    pub unhandled_requests: u16,
    /// OUT data bytes dropped because they exceeded the buffer or the declared length.
    pub truncated_bytes: u16,
    /// Failed attempts to persist the LED count.
    pub led_count_write_failures: u16,
    /// Streamed transfers discarded by a new SETUP packet before they completed.
    pub superseded_transfers: u16,
}

fn bump(counter: &AtomicU16, amount: u16) {
    let _ = counter.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| {
        Some(v.saturating_add(amount))
    });
}

impl Diagnostics {
    /// Creates a set of zeroed counters.
    pub const fn new() -> Diagnostics {
        Diagnostics {
            unhandled_requests: AtomicU16::new(0),
            truncated_bytes: AtomicU16::new(0),
            led_count_write_failures: AtomicU16::new(0),
            superseded_transfers: AtomicU16::new(0),
        }
    }

    pub(crate) fn unhandled_request(&self) {
        bump(&self.unhandled_requests, 1);
    }

    pub(crate) fn truncated(&self, bytes: usize) {
        if bytes > 0 {
            bump(&self.truncated_bytes, bytes.min(u16::MAX as usize) as u16);
        }
    }

    pub(crate) fn led_count_write_failed(&self) {
        bump(&self.led_count_write_failures, 1);
    }

    pub(crate) fn transfer_superseded(&self) {
        bump(&self.superseded_transfers, 1);
    }

    /// Reads all counters.
    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot {
            unhandled_requests: self.unhandled_requests.load(Ordering::Relaxed),
            truncated_bytes: self.truncated_bytes.load(Ordering::Relaxed),
            led_count_write_failures: self.led_count_write_failures.load(Ordering::Relaxed),
            superseded_transfers: self.superseded_transfers.load(Ordering::Relaxed),
        }
    }

    /// Sets all counters back to zero.
    pub fn clear(&self) {
        self.unhandled_requests.store(0, Ordering::Relaxed);
        self.truncated_bytes.store(0, Ordering::Relaxed);
        self.led_count_write_failures.store(0, Ordering::Relaxed);
        self.superseded_transfers.store(0, Ordering::Relaxed);
    }
}
