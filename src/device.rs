use core::convert::TryFrom;

use crate::board::Board;
use crate::catalog::{
    Catalog, MS_OS_20_DESCRIPTOR_SET, WEBUSB_ALLOWED_ORIGINS, WEBUSB_LANDING_PAGE,
};
use crate::control::{Request, RequestType};
use crate::diagnostics::Diagnostics;
use crate::request::{webusb_request, winusb_request, VendorRequest};
use crate::reset::{self, ResetState};
use crate::transfer::{ReadCursor, WriteAccumulator};
pub use crate::device_builder::{BuilderError, UsbVidPid, WebLightBuilder};

/// Default USB vendor ID (pid.codes).
pub const VID: u16 = 0x1209;

/// Default USB product ID.
pub const PID: u16 = 0xa800;

/// Default device release. Host software reads the major version to pick the payload format of
/// SET_RGB: version 2 takes a bare RGB triple.
pub const DEVICE_RELEASE: u16 = 0x0200;

/// Default manufacturer string.
pub const MANUFACTURER: &str = "sowbug";

/// Default product string.
pub const PRODUCT: &str = "WebLight";

/// Value returned by [`WebLight::on_setup`] when the data stage is streamed through
/// [`WebLight::on_read`] or [`WebLight::on_write`].
pub const NO_MSG: u8 = 0xff;

#[derive(Clone, Debug)]
pub(crate) struct Config<'a> {
    pub device_class: u8,
    pub device_sub_class: u8,
    pub device_protocol: u8,
    pub max_packet_size_0: u8,
    pub vendor_id: u16,
    pub product_id: u16,
    pub device_release: u16,
    pub manufacturer: &'a str,
    pub product: &'a str,
    pub self_powered: bool,
    pub max_power: u8,
    pub interface_class: u8,
    pub interface_sub_class: u8,
}

impl Default for Config<'static> {
    fn default() -> Self {
        Config {
            device_class: 0xff,
            device_sub_class: 0x00,
            device_protocol: 0x00,
            max_packet_size_0: 8,
            vendor_id: VID,
            product_id: PID,
            device_release: DEVICE_RELEASE,
            manufacturer: MANUFACTURER,
            product: PRODUCT,
            self_powered: false,
            max_power: 50,
            interface_class: 0xff,
            interface_sub_class: 0x00,
        }
    }
}

/// Reply data for a control IN transfer that completes immediately.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload {
    /// A static blob baked into the firmware.
    Blob(&'static [u8]),
    /// A short reply computed from the request.
    Computed(heapless::Vec<u8, 4>),
}

impl Payload {
    fn computed(bytes: &[u8]) -> Payload {
        Payload::Computed(bytes.iter().copied().collect())
    }

    /// The reply bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Payload::Blob(data) => *data,
            Payload::Computed(data) => data.as_slice(),
        }
    }
}

/// What the dispatcher decided to do with a SETUP packet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Reply with these bytes. The transfer ends with them.
    Immediate(Payload),
    /// A streamed transfer was armed. The data stage is driven through
    /// [`on_read`](WebLight::on_read) or [`on_write`](WebLight::on_write).
    Deferred,
    /// The request is not supported and should be answered with a STALL.
    Unhandled,
}

#[derive(Debug)]
enum Stage {
    Idle,
    DataIn(ReadCursor),
    DataOut(WriteAccumulator),
}

impl Stage {
    fn in_progress(&self) -> bool {
        match self {
            Stage::Idle => false,
            Stage::DataIn(cursor) => !cursor.is_complete(),
            Stage::DataOut(acc) => !acc.is_complete(),
        }
    }
}

/// The WebLight control request handler.
///
/// Owns the board, the descriptor catalog and the state of the streamed transfer in progress, if
/// any. Every SETUP packet discards the previous transfer state, so an interrupted transfer never
/// leaks into the next one.
pub struct WebLight<B: Board> {
    board: B,
    catalog: Catalog,
    stage: Stage,
    message: Option<Payload>,
    reset_state: ResetState,
    diagnostics: Diagnostics,
    max_packet_size_0: u8,
}

impl<B: Board> WebLight<B> {
    pub(crate) fn build(board: B, catalog: Catalog, config: &Config) -> WebLight<B> {
        WebLight {
            board,
            catalog,
            stage: Stage::Idle,
            message: None,
            reset_state: ResetState::Running,
            diagnostics: Diagnostics::new(),
            max_packet_size_0: config.max_packet_size_0,
        }
    }

    /// Gets the board.
    pub fn board(&self) -> &B {
        &self.board
    }

    /// Gets the board mutably, e.g. to refresh the LEDs from the main loop.
    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    /// Gets the descriptor catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Gets the counters for silently handled conditions.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Gets the reset state. Only observable as [`ResetState::Running`] unless the board's
    /// [`halt`](Board::halt) hands control elsewhere.
    pub fn reset_state(&self) -> ResetState {
        self.reset_state
    }

    /// Maximum packet size of the control endpoint.
    pub fn max_packet_size_0(&self) -> u8 {
        self.max_packet_size_0
    }

    /// Dispatches a SETUP packet.
    ///
    /// Standard requests are left to the USB stack and reported as [`Outcome::Unhandled`]. A
    /// RESET_DEVICE request does not return.
    pub fn handle_setup(&mut self, req: &Request) -> Outcome {
        if self.stage.in_progress() {
            usb_debug!("streamed transfer superseded by new SETUP");
            self.diagnostics.transfer_superseded();
        }
        self.stage = Stage::Idle;

        usb_trace!("SETUP {:?}", req);

        if req.request_type == RequestType::Standard {
            return self.unhandled(req);
        }

        let code = match VendorRequest::try_from(req.request) {
            Ok(code) => code,
            Err(_) => return self.unhandled(req),
        };

        match code {
            VendorRequest::Echo => {
                let [v0, v1] = req.value_bytes();
                let [i0, i1] = req.index_bytes();

                Outcome::Immediate(Payload::computed(&[v0, v1, i0, i1]))
            },

            VendorRequest::SetRgb => {
                // Bytes past the buffer are counted as dropped when they arrive.
                let mut acc = WriteAccumulator::new();
                acc.arm(req.length);

                self.stage = Stage::DataOut(acc);
                Outcome::Deferred
            },

            VendorRequest::SetLedCount => {
                let count = req.value as u8;

                self.board.set_led_count(count);
                if self.board.write_led_count().is_err() {
                    usb_warn!("failed to persist LED count {}", count);
                    self.diagnostics.led_count_write_failed();
                }

                Outcome::Immediate(Payload::computed(&[count]))
            },

            VendorRequest::ResetDevice => reset::force_reset(&mut self.board, &mut self.reset_state),

            VendorRequest::WebUsb => match req.index {
                webusb_request::GET_ALLOWED_ORIGINS =>
                    Outcome::Immediate(Payload::Blob(&WEBUSB_ALLOWED_ORIGINS)),
                webusb_request::GET_LANDING_PAGE =>
                    Outcome::Immediate(Payload::Blob(&WEBUSB_LANDING_PAGE)),
                _ => self.unhandled(req),
            },

            VendorRequest::WinUsb => match req.index {
                winusb_request::DESCRIPTOR => {
                    // A host asking for less than the whole set is done once it has wLength
                    // bytes.
                    let mut cursor = ReadCursor::new();
                    cursor.arm(&MS_OS_20_DESCRIPTOR_SET, req.length as usize);

                    self.stage = Stage::DataIn(cursor);
                    Outcome::Deferred
                },
                _ => self.unhandled(req),
            },
        }
    }

    fn unhandled(&self, req: &Request) -> Outcome {
        usb_debug!("unhandled request {:?}", req);
        self.diagnostics.unhandled_request();
        Outcome::Unhandled
    }

    /// Stack entry point for a SETUP packet.
    ///
    /// Returns the length of the reply, which can be fetched with [`message`](WebLight::message),
    /// or [`NO_MSG`] when the data stage is streamed. Zero means the request was not handled.
    pub fn on_setup(&mut self, req: &Request) -> u8 {
        self.message = None;

        match self.handle_setup(req) {
            Outcome::Immediate(payload) => {
                let len = payload.as_bytes().len() as u8;
                self.message = Some(payload);
                len
            },
            Outcome::Deferred => NO_MSG,
            Outcome::Unhandled => 0,
        }
    }

    /// The reply armed by the last [`on_setup`](WebLight::on_setup) call.
    pub fn message(&self) -> &[u8] {
        match &self.message {
            Some(payload) => payload.as_bytes(),
            None => &[],
        }
    }

    /// Stack entry point for GET_DESCRIPTOR. `None` should be answered with a STALL.
    pub fn on_descriptor_request(&self, descriptor_type: u8, descriptor_index: u8)
        -> Option<&[u8]>
    {
        let descriptor = self.catalog.lookup_descriptor(descriptor_type, descriptor_index);

        if descriptor.is_none() {
            usb_debug!("no descriptor type {} index {}", descriptor_type, descriptor_index);
            self.diagnostics.unhandled_request();
        }

        descriptor
    }

    /// Stack entry point for a streamed IN data stage. Fills `data` with the next chunk and returns
    /// its length. A chunk shorter than `data` ends the transfer.
    pub fn on_read(&mut self, data: &mut [u8]) -> usize {
        match &mut self.stage {
            Stage::DataIn(cursor) => {
                let chunk = cursor.read(data.len());
                data[..chunk.len()].copy_from_slice(chunk);
                chunk.len()
            },
            _ => 0,
        }
    }

    /// Stack entry point for a streamed OUT data stage. Returns `true` once all expected data has
    /// arrived, at which point the color has been sent to the LEDs.
    pub fn on_write(&mut self, data: &[u8]) -> bool {
        match &mut self.stage {
            Stage::DataOut(acc) => {
                let expected = acc.remaining();
                let complete = acc.write(data);
                let accepted = expected - acc.remaining();

                self.diagnostics.truncated(data.len() - accepted);

                if complete && expected > 0 {
                    let color = acc.rgb();
                    usb_trace!("set color {:?}", color);
                    self.board.set_leds(color);
                }

                complete
            },
            _ => {
                self.diagnostics.truncated(data.len());
                true
            },
        }
    }
}
