#![allow(dead_code)]

use weblight_usb::board::{Board, BoardError, Rgb, WatchdogTimeout};
use weblight_usb::control::Request;
use weblight_usb::device::{WebLight, WebLightBuilder};
use weblight_usb::UsbDirection;

pub const SERIAL: [u8; 8] = *b"00001234";

/// Records everything the handler asks the hardware to do.
#[derive(Default, Debug)]
pub struct MockBoard {
    pub colors: Vec<Rgb>,
    pub led_count: Option<u8>,
    pub persisted: Vec<u8>,
    pub fail_persist: bool,
    pub blinks: Vec<u8>,
    pub watchdog: Option<WatchdogTimeout>,
}

impl Board for MockBoard {
    fn set_leds(&mut self, color: Rgb) {
        self.colors.push(color);
    }

    fn set_led_count(&mut self, count: u8) {
        self.led_count = Some(count);
    }

    fn write_led_count(&mut self) -> Result<(), BoardError> {
        if self.fail_persist {
            return Err(BoardError::Storage);
        }

        self.persisted.push(self.led_count.expect("count set before persisting"));
        Ok(())
    }

    fn status_blink(&mut self, times: u8) {
        self.blinks.push(times);
    }

    fn enable_watchdog(&mut self, timeout: WatchdogTimeout) {
        self.watchdog = Some(timeout);
    }

    fn halt(&mut self) -> ! {
        panic!("halted waiting for watchdog");
    }
}

pub fn weblight() -> WebLight<MockBoard> {
    WebLightBuilder::new(MockBoard::default(), SERIAL)
        .build()
        .expect("build WebLight")
}

pub fn vendor_in(request: u8, value: u16, index: u16, length: u16) -> Request {
    Request::vendor(UsbDirection::In, request, value, index, length)
}

pub fn vendor_out(request: u8, value: u16, index: u16, length: u16) -> Request {
    Request::vendor(UsbDirection::Out, request, value, index, length)
}

pub fn setup_packet(req: &Request) -> [u8; 8] {
    let mut packet = [0u8; 8];
    packet[0] = req.request_type_byte();
    packet[1] = req.request;
    packet[2..4].copy_from_slice(&req.value.to_le_bytes());
    packet[4..6].copy_from_slice(&req.index.to_le_bytes());
    packet[6..8].copy_from_slice(&req.length.to_le_bytes());
    packet
}
