use crate::device::Config;
use crate::{Result, UsbError};

/// Standard descriptor types
#[allow(missing_docs)]
pub mod descriptor_type {
    pub const DEVICE: u8 = 1;
    pub const CONFIGURATION: u8 = 2;
    pub const STRING: u8 = 3;
    pub const INTERFACE: u8 = 4;
    pub const ENDPOINT: u8 = 5;
    pub const BOS: u8 = 15;
    pub const CAPABILITY: u8 = 16;
}

/// Device capability types carried in the BOS descriptor
#[allow(missing_docs)]
pub mod capability_type {
    pub const USB_2_0_EXTENSION: u8 = 2;
    pub const SS_USB_DEVICE: u8 = 3;
    pub const CONTAINER_ID: u8 = 4;
    pub const PLATFORM: u8 = 5;
}

/// String descriptor language IDs.
pub mod lang_id {
    /// English (US)
    ///
    /// Recommended for use as the first language ID for compatibility.
    pub const ENGLISH_US: u16 = 0x0409;
}

/// The bConfigurationValue for the single configuration supported by this device.
pub const CONFIGURATION_VALUE: u8 = 1;

/// Length of the device descriptor in bytes.
pub const DEVICE_DESCRIPTOR_LEN: usize = 18;

/// Length of the configuration descriptor set (configuration plus one interface) in bytes.
pub const CONFIGURATION_DESCRIPTOR_LEN: usize = 18;

/// Writes standard descriptors into a byte buffer. Each descriptor gets its `bLength` and
/// `bDescriptorType` header written automatically.
pub struct DescriptorWriter<'a> {
    buf: &'a mut [u8],
    position: usize,
}

impl<'a> DescriptorWriter<'a> {
    /// Creates a writer that appends to the start of `buf`.
    pub fn new(buf: &mut [u8]) -> DescriptorWriter<'_> {
        DescriptorWriter { buf, position: 0 }
    }

    /// Gets the current position in the buffer, i.e. the number of bytes written so far.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Writes an arbitrary (usually class-specific) descriptor.
    pub fn write(&mut self, descriptor_type: u8, descriptor: &[u8]) -> Result<()> {
        self.write_with(descriptor_type, |buf| {
            if descriptor.len() > buf.len() {
                return Err(UsbError::BufferOverflow);
            }

            buf[..descriptor.len()].copy_from_slice(descriptor);
            Ok(descriptor.len())
        })
    }

    /// Writes an arbitrary (usually class-specific) descriptor by using a callback function.
    ///
    /// The callback function gets a reference to the remaining buffer space, and it should write
    /// the descriptor into it and return the number of bytes written. If the descriptor doesn't
    /// fit, the function should return `Err(UsbError::BufferOverflow)`. That and any error returned
    /// by it will be propagated up.
    pub fn write_with(
        &mut self,
        descriptor_type: u8,
        f: impl FnOnce(&mut [u8]) -> Result<usize>,
    ) -> Result<()> {
        if self.position + 2 > self.buf.len() {
            return Err(UsbError::BufferOverflow);
        }

        let data_end = core::cmp::min(self.buf.len(), self.position + 256);
        let data_buf = &mut self.buf[self.position + 2..data_end];

        let total_len = f(data_buf)? + 2;

        if self.position + total_len > self.buf.len() || total_len > 255 {
            return Err(UsbError::BufferOverflow);
        }

        self.buf[self.position] = total_len as u8;
        self.buf[self.position + 1] = descriptor_type;

        self.position += total_len;

        Ok(())
    }

    /// Writes a string descriptor, encoding `string` as UTF-16LE.
    pub fn string(&mut self, string: &str) -> Result<()> {
        self.write_with(descriptor_type::STRING, |buf| {
            let mut pos = 0;

            for unit in string.encode_utf16() {
                if pos + 2 > buf.len() {
                    return Err(UsbError::BufferOverflow);
                }

                buf[pos..pos + 2].copy_from_slice(&unit.to_le_bytes());
                pos += 2;
            }

            Ok(pos)
        })
    }

    /// Writes a string descriptor for a fixed-width serial number. Each byte becomes one UTF-16
    /// code unit, so the serial must already be ASCII.
    pub fn serial_number(&mut self, serial: &[u8]) -> Result<()> {
        self.write_with(descriptor_type::STRING, |buf| {
            let len = serial.len() * 2;
            if len > buf.len() {
                return Err(UsbError::BufferOverflow);
            }

            for (unit, &b) in buf.chunks_exact_mut(2).zip(serial) {
                unit.copy_from_slice(&u16::from(b).to_le_bytes());
            }

            Ok(len)
        })
    }

    /// Writes the string descriptor zero: the list of supported languages.
    pub fn languages(&mut self, lang_ids: &[u16]) -> Result<()> {
        self.write_with(descriptor_type::STRING, |buf| {
            let len = lang_ids.len() * 2;
            if len > buf.len() {
                return Err(UsbError::BufferOverflow);
            }

            for (unit, id) in buf.chunks_exact_mut(2).zip(lang_ids) {
                unit.copy_from_slice(&id.to_le_bytes());
            }

            Ok(len)
        })
    }

    pub(crate) fn device(&mut self, config: &Config) -> Result<()> {
        let [vid_lo, vid_hi] = config.vendor_id.to_le_bytes();
        let [pid_lo, pid_hi] = config.product_id.to_le_bytes();
        let [rel_lo, rel_hi] = config.device_release.to_le_bytes();

        self.write(
            descriptor_type::DEVICE,
            &[
                0x10,
                0x02,                     // bcdUSB 2.1
                config.device_class,      // bDeviceClass
                config.device_sub_class,  // bDeviceSubClass
                config.device_protocol,   // bDeviceProtocol
                config.max_packet_size_0, // bMaxPacketSize0
                vid_lo,
                vid_hi, // idVendor
                pid_lo,
                pid_hi, // idProduct
                rel_lo,
                rel_hi, // bcdDevice
                1,      // iManufacturer
                2,      // iProduct
                3,      // iSerialNumber
                1,      // bNumConfigurations
            ],
        )
    }

    pub(crate) fn configuration(&mut self, config: &Config) -> Result<()> {
        let [total_lo, total_hi] = (CONFIGURATION_DESCRIPTOR_LEN as u16).to_le_bytes();

        self.write(
            descriptor_type::CONFIGURATION,
            &[
                total_lo,
                total_hi,            // wTotalLength
                1,                   // bNumInterfaces
                CONFIGURATION_VALUE, // bConfigurationValue
                0,                   // iConfiguration
                0x80 | if config.self_powered { 0x40 } else { 0x00 }, // bmAttributes
                config.max_power,    // bMaxPower
            ],
        )?;

        self.write(
            descriptor_type::INTERFACE,
            &[
                0,                          // bInterfaceNumber
                0,                          // bAlternateSetting
                0,                          // bNumEndpoints
                config.interface_class,     // bInterfaceClass
                config.interface_sub_class, // bInterfaceSubClass
                0,                          // bInterfaceProtocol
                0,                          // iInterface
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_is_utf16le() {
        let mut buf = [0u8; 16];
        let mut w = DescriptorWriter::new(&mut buf);
        w.string("Wé").unwrap();

        assert_eq!(w.position(), 6);
        assert_eq!(&buf[..6], &[6, 3, b'W', 0, 0xe9, 0]);
    }

    #[test]
    fn serial_number_widens_each_byte() {
        let mut buf = [0u8; 32];
        let mut w = DescriptorWriter::new(&mut buf);
        w.serial_number(b"0042").unwrap();

        assert_eq!(w.position(), 10);
        assert_eq!(&buf[..10], &[10, 3, b'0', 0, b'0', 0, b'4', 0, b'2', 0]);
    }

    #[test]
    fn overflow_is_reported() {
        let mut buf = [0u8; 5];
        let mut w = DescriptorWriter::new(&mut buf);

        assert_eq!(w.string("abc"), Err(UsbError::BufferOverflow));
        assert_eq!(w.position(), 0);
    }
}
