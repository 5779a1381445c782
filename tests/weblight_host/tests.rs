use crate::device::*;
use rand::prelude::*;
use rusb::{request_type, Direction, Recipient, RequestType};
use weblight_usb::catalog::{
    BOS_DESCRIPTOR, MS_OS_20_DESCRIPTOR_SET, WEBUSB_ALLOWED_ORIGINS, WEBUSB_LANDING_PAGE,
};
use weblight_usb::control::Request;
use weblight_usb::device;
use weblight_usb::request::{webusb_request, winusb_request, VendorRequest};

pub type TestFn = fn(&mut DeviceHandles, &mut String) -> ();

macro_rules! tests {
    { $(fn $name:ident($dev:ident, $out:ident) $body:expr)* } => {
        pub fn get_tests() -> Vec<(&'static str, TestFn)> {
            let mut tests: Vec<(&'static str, TestFn)> = Vec::new();

            $(
                fn $name($dev: &mut DeviceHandles, $out: &mut String) {
                    $body
                }

                tests.push((stringify!($name), $name));
            )*

            tests
        }
    }
}

fn vendor_read(dev: &DeviceHandles, request: VendorRequest, value: u16, index: u16, buf: &mut [u8])
    -> rusb::Result<usize>
{
    dev.read_control(
        request_type(Direction::In, RequestType::Vendor, Recipient::Device),
        request.into(), value, index,
        buf, TIMEOUT)
}

tests! {

fn echo(dev, _out) {
    let mut rng = rand::thread_rng();

    for _ in 0..16 {
        let value: u16 = rng.gen();
        let index: u16 = rng.gen();

        let mut response = [0u8; 4];

        assert_eq!(
            vendor_read(dev, VendorRequest::Echo, value, index, &mut response)
                .expect("control read"),
            response.len());

        assert_eq!(&response[..2], &value.to_le_bytes());
        assert_eq!(&response[2..], &index.to_le_bytes());
    }
}

fn webusb_allowed_origins(dev, _out) {
    let mut response = [0u8; 255];

    let len = vendor_read(dev, VendorRequest::WebUsb, 0, webusb_request::GET_ALLOWED_ORIGINS,
        &mut response).expect("control read");

    assert_eq!(&response[..len], &WEBUSB_ALLOWED_ORIGINS[..]);
}

fn webusb_landing_page(dev, _out) {
    let mut response = [0u8; 255];

    let len = vendor_read(dev, VendorRequest::WebUsb, 0, webusb_request::GET_LANDING_PAGE,
        &mut response).expect("control read");

    assert_eq!(&response[..len], &WEBUSB_LANDING_PAGE[..]);
}

fn bos_descriptor(dev, _out) {
    let mut response = [0u8; 255];

    let len = dev.read_control(
        request_type(Direction::In, RequestType::Standard, Recipient::Device),
        Request::GET_DESCRIPTOR, 0x0f00, 0,
        &mut response, TIMEOUT).expect("read BOS descriptor");

    assert_eq!(&response[..len], &BOS_DESCRIPTOR[..]);
}

fn ms_os_20_descriptor_set(dev, _out) {
    // Short reads must be clamped, long reads end early
    for &len in &[1, 8, 16, MS_OS_20_DESCRIPTOR_SET.len(), 255] {
        let mut response = vec![0u8; len];

        let read = vendor_read(dev, VendorRequest::WinUsb, 0, winusb_request::DESCRIPTOR,
            &mut response).unwrap_or_else(|_| panic!("control read len {}", len));

        let expected = &MS_OS_20_DESCRIPTOR_SET[..len.min(MS_OS_20_DESCRIPTOR_SET.len())];
        assert_eq!(&response[..read], expected, "control read len {}", len);
    }
}

fn string_descriptors(dev, _out) {
    assert_eq!(
        dev.read_product_string(dev.en_us, &dev.device_descriptor, TIMEOUT)
            .expect("read product string"),
        device::PRODUCT);

    assert_eq!(
        dev.read_manufacturer_string(dev.en_us, &dev.device_descriptor, TIMEOUT)
            .expect("read manufacturer string"),
        device::MANUFACTURER);

    let serial = dev.read_serial_number_string(dev.en_us, &dev.device_descriptor, TIMEOUT)
        .expect("read serial number string");

    assert_eq!(serial.len(), weblight_usb::catalog::SERIAL_NUMBER_LEN);
}

fn set_rgb(dev, _out) {
    let mut rng = rand::thread_rng();

    for len in &[3, 1, 8] {
        let mut data = vec![0u8; *len];
        rng.fill(data.as_mut_slice());

        assert_eq!(
            dev.write_control(
                request_type(Direction::Out, RequestType::Vendor, Recipient::Device),
                VendorRequest::SetRgb.into(), 0, 0,
                &data, TIMEOUT).unwrap_or_else(|_| panic!("control write len {}", len)),
            data.len());
    }

    // Leave the LEDs dark
    dev.write_control(
        request_type(Direction::Out, RequestType::Vendor, Recipient::Device),
        VendorRequest::SetRgb.into(), 0, 0,
        &[0, 0, 0], TIMEOUT).expect("control write");
}

fn control_error(dev, _out) {
    let res = dev.write_control(
        request_type(Direction::Out, RequestType::Vendor, Recipient::Device),
        0x42, 0, 0,
        &[], TIMEOUT);

    if res.is_ok() {
        panic!("unknown control request succeeded");
    }

    let mut response = [0u8; 8];
    let res = vendor_read(dev, VendorRequest::WebUsb, 0, 3, &mut response);

    if res.is_ok() {
        panic!("unknown WebUSB request succeeded");
    }
}

}
