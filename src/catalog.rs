use crate::descriptor::{
    capability_type, descriptor_type, lang_id, DescriptorWriter, CONFIGURATION_DESCRIPTOR_LEN,
    DEVICE_DESCRIPTOR_LEN,
};
use crate::device::Config;
use crate::request::VendorRequest;
use crate::{Result, UsbError};

/// Number of digits in the serial number stored in EEPROM.
pub const SERIAL_NUMBER_LEN: usize = 8;

/// Length of the serial number string descriptor: a 2 byte header plus one UTF-16 code unit per
/// digit.
pub const SERIAL_DESCRIPTOR_LEN: usize = 2 + 2 * SERIAL_NUMBER_LEN;

/// Maximum length of the manufacturer and product string descriptors.
pub const MAX_STRING_DESCRIPTOR_LEN: usize = 64;

/// Length of the Microsoft OS 2.0 descriptor set.
pub const MS_OS_20_DESCRIPTOR_SET_LEN: usize = 0x1e;

const WEBUSB_VENDOR_CODE: u8 = VendorRequest::WebUsb as u8;
const WINUSB_VENDOR_CODE: u8 = VendorRequest::WinUsb as u8;

/// Binary Object Store descriptor advertising the WebUSB and Microsoft OS 2.0 platform
/// capabilities.
pub static BOS_DESCRIPTOR: [u8; 56] = [
    // BOS descriptor header
    0x05, descriptor_type::BOS,
    0x38, 0x00, // wTotalLength
    0x02,       // bNumDeviceCaps

    // WebUSB platform capability
    0x17, descriptor_type::CAPABILITY, capability_type::PLATFORM, 0x00,
    // {3408B638-09A9-47A0-8BFD-A0768815B665}
    0x38, 0xB6, 0x08, 0x34,
    0xA9, 0x09,
    0xA0, 0x47,
    0x8B, 0xFD,
    0xA0, 0x76, 0x88, 0x15, 0xB6, 0x65,
    0x00, 0x01, // bcdVersion 1.0
    WEBUSB_VENDOR_CODE,

    // Microsoft OS 2.0 platform capability
    0x1C, descriptor_type::CAPABILITY, capability_type::PLATFORM, 0x00,
    // {D8DD60DF-4589-4CC7-9CD2-659D9E648A9F}
    0xDF, 0x60, 0xDD, 0xD8,
    0x89, 0x45,
    0xC7, 0x4C,
    0x9C, 0xD2,
    0x65, 0x9D, 0x9E, 0x64, 0x8A, 0x9F,
    0x00, 0x00, 0x03, 0x06, // dwWindowsVersion 8.1
    MS_OS_20_DESCRIPTOR_SET_LEN as u8, 0x00,
    WINUSB_VENDOR_CODE,
    0x00, // bAltEnumCode: no alternate enumeration
];

/// Microsoft OS 2.0 descriptor set binding the WinUSB driver to the whole device.
pub static MS_OS_20_DESCRIPTOR_SET: [u8; MS_OS_20_DESCRIPTOR_SET_LEN] = [
    // Descriptor set header
    0x0A, 0x00,
    0x00, 0x00, // MS_OS_20_SET_HEADER_DESCRIPTOR
    0x00, 0x00, 0x03, 0x06, // dwWindowsVersion 8.1
    MS_OS_20_DESCRIPTOR_SET_LEN as u8, 0x00,

    // Compatible ID feature descriptor
    0x14, 0x00,
    0x03, 0x00, // MS_OS_20_FEATURE_COMPATIBLE_ID
    b'W', b'I', b'N', b'U', b'S', b'B', 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// WebUSB URL descriptor for the landing page.
pub static WEBUSB_LANDING_PAGE: [u8; 35] = [
    0x23, 0x03,
    b'h', b't', b't', b'p', b's', b':', b'/', b'/',
    b's', b'o', b'w', b'b', b'u', b'g', b'.', b'g', b'i', b't', b'h', b'u', b'b', b'.', b'i',
    b'o', b'/', b'w', b'e', b'b', b'l', b'i', b'g', b'h', b't',
];

/// WebUSB allowed origins: a set header followed by one URL descriptor per origin.
pub static WEBUSB_ALLOWED_ORIGINS: [u8; 53] = [
    0x04, 0x00, 0x35, 0x00,

    0x1A, 0x03,
    b'h', b't', b't', b'p', b's', b':', b'/', b'/',
    b's', b'o', b'w', b'b', b'u', b'g', b'.', b'g', b'i', b't', b'h', b'u', b'b', b'.', b'i',
    b'o',

    0x17, 0x03,
    b'h', b't', b't', b'p', b':', b'/', b'/',
    b'l', b'o', b'c', b'a', b'l', b'h', b'o', b's', b't', b':', b'8', b'0', b'0', b'0',
];

type StringDescriptor = heapless::Vec<u8, MAX_STRING_DESCRIPTOR_LEN>;

/// The descriptors the device hands out, built once at startup.
///
/// Static descriptors are shared; the serial number and the descriptors derived from the device
/// configuration are encoded into owned buffers when the catalog is created and never change
/// afterwards.
pub struct Catalog {
    device: [u8; DEVICE_DESCRIPTOR_LEN],
    configuration: [u8; CONFIGURATION_DESCRIPTOR_LEN],
    languages: [u8; 4],
    manufacturer: StringDescriptor,
    product: StringDescriptor,
    serial_number: [u8; SERIAL_DESCRIPTOR_LEN],
}

impl Catalog {
    pub(crate) fn new(config: &Config, serial: &[u8; SERIAL_NUMBER_LEN]) -> Result<Catalog> {
        let mut device = [0; DEVICE_DESCRIPTOR_LEN];
        DescriptorWriter::new(&mut device).device(config)?;

        let mut configuration = [0; CONFIGURATION_DESCRIPTOR_LEN];
        DescriptorWriter::new(&mut configuration).configuration(config)?;

        let mut languages = [0; 4];
        DescriptorWriter::new(&mut languages).languages(&[lang_id::ENGLISH_US])?;

        let mut serial_number = [0; SERIAL_DESCRIPTOR_LEN];
        DescriptorWriter::new(&mut serial_number).serial_number(serial)?;

        Ok(Catalog {
            device,
            configuration,
            languages,
            manufacturer: encode_string(config.manufacturer)?,
            product: encode_string(config.product)?,
            serial_number,
        })
    }

    /// Looks up the descriptor for a GET_DESCRIPTOR request. Returns `None` for descriptors the
    /// device doesn't have, which should be answered with a STALL.
    pub fn lookup_descriptor(&self, descriptor_type: u8, index: u8) -> Option<&[u8]> {
        match (descriptor_type, index) {
            (descriptor_type::DEVICE, 0) => Some(&self.device[..]),
            (descriptor_type::CONFIGURATION, 0) => Some(&self.configuration[..]),
            (descriptor_type::STRING, 0) => Some(&self.languages[..]),
            (descriptor_type::STRING, 1) => Some(&self.manufacturer[..]),
            (descriptor_type::STRING, 2) => Some(&self.product[..]),
            (descriptor_type::STRING, 3) => Some(&self.serial_number[..]),
            (descriptor_type::BOS, _) => Some(&BOS_DESCRIPTOR[..]),
            _ => None,
        }
    }
}

fn encode_string(s: &str) -> Result<StringDescriptor> {
    let mut buf = [0; MAX_STRING_DESCRIPTOR_LEN];
    let mut writer = DescriptorWriter::new(&mut buf);
    writer.string(s)?;
    let len = writer.position();

    StringDescriptor::from_slice(&buf[..len]).map_err(|_| UsbError::BufferOverflow)
}
