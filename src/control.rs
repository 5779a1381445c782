use crate::{Result, UsbDirection, UsbError};
use num_enum::{FromPrimitive, IntoPrimitive};

/// Control request type.
#[repr(u8)]
#[derive(Copy, Clone, Eq, PartialEq, Debug, FromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestType {
    /// Request is a USB standard request. Usually handled by the USB stack itself.
    Standard = 0,
    /// Request is intended for a USB class.
    Class = 1,
    /// Request is vendor-specific. All WebLight requests are vendor requests.
    Vendor = 2,
    /// Reserved.
    #[num_enum(default)]
    Reserved = 3,
}

/// Control request recipient.
#[repr(u8)]
#[derive(Copy, Clone, Eq, PartialEq, Debug, FromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Recipient {
    /// Request is intended for the entire device.
    Device = 0,
    /// Request is intended for an interface. Generally, the `index` field of the request specifies
    /// the interface number.
    Interface = 1,
    /// Request is intended for an endpoint. Generally, the `index` field of the request specifies
    /// the endpoint address.
    Endpoint = 2,
    /// None of the above.
    Other = 3,
    /// Reserved.
    #[num_enum(default)]
    Reserved = 4,
}

/// A control request read from a SETUP packet.
///
/// The request is an immutable view of one SETUP packet and lives for a single control transfer.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Request {
    /// Direction of the request.
    pub direction: UsbDirection,
    /// Type of the request.
    pub request_type: RequestType,
    /// Recipient of the request.
    pub recipient: Recipient,
    /// Request code. The meaning of the value depends on the previous fields.
    pub request: u8,
    /// Request value. The meaning of the value depends on the previous fields.
    pub value: u16,
    /// Request index. The meaning of the value depends on the previous fields.
    pub index: u16,
    /// Length of the DATA stage. For control OUT transfers this is the exact length of the data the
    /// host sent. For control IN transfers this is the maximum length of data the device should
    /// return.
    pub length: u16,
}

impl Request {
    /// Standard USB control request Get Status
    pub const GET_STATUS: u8 = 0;

    /// Standard USB control request Clear Feature
    pub const CLEAR_FEATURE: u8 = 1;

    /// Standard USB control request Set Feature
    pub const SET_FEATURE: u8 = 3;

    /// Standard USB control request Set Address
    pub const SET_ADDRESS: u8 = 5;

    /// Standard USB control request Get Descriptor
    pub const GET_DESCRIPTOR: u8 = 6;

    /// Standard USB control request Set Descriptor
    pub const SET_DESCRIPTOR: u8 = 7;

    /// Standard USB control request Get Configuration
    pub const GET_CONFIGURATION: u8 = 8;

    /// Standard USB control request Set Configuration
    pub const SET_CONFIGURATION: u8 = 9;

    /// Standard USB control request Get Interface
    pub const GET_INTERFACE: u8 = 10;

    /// Standard USB control request Set Interface
    pub const SET_INTERFACE: u8 = 11;

    /// Standard USB control request Synch Frame
    pub const SYNCH_FRAME: u8 = 12;

    /// Parses a SETUP packet.
    ///
    /// # Errors
    ///
    /// * [`InvalidSetupPacket`](crate::UsbError::InvalidSetupPacket) - `buf` is not exactly 8
    ///   bytes long.
    pub fn parse(buf: &[u8]) -> Result<Request> {
        if buf.len() != 8 {
            return Err(UsbError::InvalidSetupPacket);
        }

        let rt = buf[0];
        let recipient = rt & 0b11111;

        Ok(Request {
            direction: rt.into(),
            request_type: RequestType::from((rt >> 5) & 0b11),
            recipient: if recipient <= 3 {
                Recipient::from(recipient)
            } else {
                Recipient::Reserved
            },
            request: buf[1],
            value: u16::from_le_bytes([buf[2], buf[3]]),
            index: u16::from_le_bytes([buf[4], buf[5]]),
            length: u16::from_le_bytes([buf[6], buf[7]]),
        })
    }

    /// Builds a vendor request addressed to the device. Mostly useful for feeding requests to
    /// [`WebLight::handle_setup`](crate::device::WebLight::handle_setup) directly.
    pub const fn vendor(direction: UsbDirection, request: u8, value: u16, index: u16, length: u16)
        -> Request
    {
        Request {
            direction,
            request_type: RequestType::Vendor,
            recipient: Recipient::Device,
            request,
            value,
            index,
            length,
        }
    }

    /// Encodes the `bmRequestType` field of the request.
    pub fn request_type_byte(&self) -> u8 {
        let recipient = match self.recipient {
            Recipient::Reserved => 0b11111,
            r => u8::from(r),
        };

        (self.direction as u8) | (u8::from(self.request_type) << 5) | recipient
    }

    /// The value field split into its low and high bytes, in that order.
    pub fn value_bytes(&self) -> [u8; 2] {
        self.value.to_le_bytes()
    }

    /// The index field split into its low and high bytes, in that order.
    pub fn index_bytes(&self) -> [u8; 2] {
        self.index.to_le_bytes()
    }

    /// Gets the descriptor type and index from the value field of a GET_DESCRIPTOR request.
    pub fn descriptor_type_index(&self) -> (u8, u8) {
        ((self.value >> 8) as u8, self.value as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_vendor_in() {
        let req = Request::parse(&[0xc0, 0x04, 0x34, 0x12, 0x02, 0x00, 0xff, 0x00]).unwrap();

        assert_eq!(req.direction, UsbDirection::In);
        assert_eq!(req.request_type, RequestType::Vendor);
        assert_eq!(req.recipient, Recipient::Device);
        assert_eq!(req.request, 0x04);
        assert_eq!(req.value, 0x1234);
        assert_eq!(req.index, 0x0002);
        assert_eq!(req.length, 255);
        assert_eq!(req.value_bytes(), [0x34, 0x12]);
        assert_eq!(req.request_type_byte(), 0xc0);
    }

    #[test]
    fn parse_standard_get_descriptor() {
        let req = Request::parse(&[0x80, 0x06, 0x03, 0x0f, 0x00, 0x00, 0x05, 0x00]).unwrap();

        assert_eq!(req.request_type, RequestType::Standard);
        assert_eq!(req.request, Request::GET_DESCRIPTOR);
        assert_eq!(req.descriptor_type_index(), (0x0f, 0x03));
    }

    #[test]
    fn reserved_recipient() {
        let req = Request::parse(&[0x47, 0x01, 0, 0, 0, 0, 0, 0]).unwrap();

        assert_eq!(req.direction, UsbDirection::Out);
        assert_eq!(req.recipient, Recipient::Reserved);
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert_eq!(Request::parse(&[0x40, 0x01, 0, 0]), Err(UsbError::InvalidSetupPacket));
        assert_eq!(Request::parse(&[0; 9]), Err(UsbError::InvalidSetupPacket));
    }
}
