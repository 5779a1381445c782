use core::cmp::min;

use crate::board::Board;
use crate::control::{Recipient, Request, RequestType};
use crate::descriptor::CONFIGURATION_VALUE;
use crate::device::{Outcome, WebLight};
use crate::{Result, UsbDirection, UsbError};

/// The global state of the USB device as seen by the control pipe.
#[repr(u8)]
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UsbDeviceState {
    /// The USB device has just been created or reset.
    Default,

    /// The USB device has received an address from the host.
    Addressed,

    /// The USB device has been configured and is fully functional.
    Configured,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum InSource {
    Buffer,
    Streamed,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ControlState {
    Idle,
    DataIn(InSource),
    DataInLast,
    DataOut { streamed: bool },
    StatusIn,
    Error,
}

// Maximum length of a buffered IN data stage in bytes. Streamed transfers are not limited by it.
const CONTROL_BUF_LEN: usize = 128;

/// Sequences endpoint 0 packets into calls on a [`WebLight`] handler.
///
/// This is the glue for USB peripherals that hand over raw packets: feed it SETUP packets with
/// [`setup`](ControlPipe::setup), OUT packets with [`data_out`](ControlPipe::data_out) and ask it for
/// IN packets with [`data_in`](ControlPipe::data_in). Standard requests needed for enumeration are
/// answered here, everything else goes to the handler.
pub struct ControlPipe {
    state: ControlState,
    request: Option<Request>,
    buf: [u8; CONTROL_BUF_LEN],
    i: usize,
    len: usize,
    limit: usize,
    address: u8,
    pending_address: Option<u8>,
    configuration: u8,
}

impl Default for ControlPipe {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlPipe {
    /// Creates a control pipe for a device that was just reset.
    pub const fn new() -> ControlPipe {
        ControlPipe {
            state: ControlState::Idle,
            request: None,
            buf: [0; CONTROL_BUF_LEN],
            i: 0,
            len: 0,
            limit: 0,
            address: 0,
            pending_address: None,
            configuration: 0,
        }
    }

    /// Handles a USB bus reset.
    pub fn reset(&mut self) {
        *self = ControlPipe::new();
    }

    /// Gets the device state.
    pub fn state(&self) -> UsbDeviceState {
        if self.configuration != 0 {
            UsbDeviceState::Configured
        } else if self.address != 0 {
            UsbDeviceState::Addressed
        } else {
            UsbDeviceState::Default
        }
    }

    /// Gets the USB address assigned by the host, or 0 if none has been assigned yet.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Gets the request of the most recent SETUP packet.
    pub fn request(&self) -> Option<&Request> {
        self.request.as_ref()
    }

    /// Whether the current transfer was answered with a STALL. Cleared by the next SETUP packet.
    pub fn is_stalled(&self) -> bool {
        self.state == ControlState::Error
    }

    /// Handles a SETUP packet. A SETUP packet always aborts the transfer in progress.
    ///
    /// A RESET_DEVICE request does not return.
    ///
    /// # Errors
    ///
    /// * [`InvalidSetupPacket`](crate::UsbError::InvalidSetupPacket) - The packet is not 8 bytes
    ///   long. The pipe is stalled.
    pub fn setup<B: Board>(&mut self, dev: &mut WebLight<B>, packet: &[u8]) -> Result<()> {
        self.i = 0;
        self.len = 0;
        self.limit = 0;

        let req = match Request::parse(packet) {
            Ok(req) => req,
            Err(err) => {
                self.set_error();
                return Err(err);
            },
        };

        self.request = Some(req);

        if req.request_type == RequestType::Standard {
            self.standard_request(dev, &req);
            return Ok(());
        }

        match dev.handle_setup(&req) {
            Outcome::Immediate(payload) => {
                if req.direction == UsbDirection::In {
                    self.start_in_buffered(&req, payload.as_bytes());
                } else {
                    self.start_out(&req, false);
                }
            },
            Outcome::Deferred => {
                if req.direction == UsbDirection::In {
                    self.len = req.length as usize;
                    self.limit = self.len;
                    self.state = if self.len == 0 {
                        ControlState::DataInLast
                    } else {
                        ControlState::DataIn(InSource::Streamed)
                    };
                } else {
                    self.start_out(&req, true);
                }
            },
            Outcome::Unhandled => self.set_error(),
        }

        Ok(())
    }

    /// Handles a DATA packet sent by the host, either the data stage of an OUT transfer or the
    /// zero-length status stage of an IN transfer.
    ///
    /// # Errors
    ///
    /// * [`InvalidState`](crate::UsbError::InvalidState) - The packet was not expected. The pipe
    ///   is stalled.
    pub fn data_out<B: Board>(&mut self, dev: &mut WebLight<B>, packet: &[u8]) -> Result<()> {
        match self.state {
            ControlState::DataOut { streamed } => {
                if streamed {
                    dev.on_write(packet);
                }

                self.i += packet.len();

                if self.i >= self.len {
                    self.state = ControlState::StatusIn;
                }

                Ok(())
            },
            // The host may end an IN transfer early by moving on to the status stage.
            ControlState::DataIn(_) | ControlState::DataInLast if packet.is_empty() => {
                self.state = ControlState::Idle;
                Ok(())
            },
            _ => {
                self.set_error();
                Err(UsbError::InvalidState)
            },
        }
    }

    /// Produces the next IN packet into `packet` and returns its length. `packet` must be at least
    /// the control endpoint's max packet size long.
    ///
    /// # Errors
    ///
    /// * [`WouldBlock`](crate::UsbError::WouldBlock) - There is nothing to send (NAK).
    /// * [`InvalidState`](crate::UsbError::InvalidState) - The pipe is stalled (STALL).
    pub fn data_in<B: Board>(&mut self, dev: &mut WebLight<B>, packet: &mut [u8]) -> Result<usize> {
        let max_packet_size = dev.max_packet_size_0() as usize;

        match self.state {
            ControlState::DataIn(source) => {
                let count = min(self.len - self.i, max_packet_size);

                if packet.len() < count {
                    return Err(UsbError::BufferOverflow);
                }

                let sent = match source {
                    InSource::Buffer => {
                        packet[..count].copy_from_slice(&self.buf[self.i..self.i + count]);
                        count
                    },
                    InSource::Streamed => dev.on_read(&mut packet[..count]),
                };

                self.i += sent;

                // A short packet ends the data stage early, so one is sent even if it has to be
                // zero-length.
                if sent < max_packet_size || self.i >= self.limit {
                    self.state = ControlState::DataInLast;
                }

                Ok(sent)
            },
            ControlState::StatusIn => {
                self.state = ControlState::Idle;

                if let Some(address) = self.pending_address.take() {
                    self.address = address;
                }

                Ok(0)
            },
            ControlState::Error => Err(UsbError::InvalidState),
            _ => Err(UsbError::WouldBlock),
        }
    }

    fn standard_request<B: Board>(&mut self, dev: &mut WebLight<B>, req: &Request) {
        match (req.direction, req.recipient, req.request) {
            (UsbDirection::In, Recipient::Device, Request::GET_DESCRIPTOR) => {
                let (dtype, index) = req.descriptor_type_index();

                match dev.on_descriptor_request(dtype, index) {
                    Some(descriptor) => {
                        if descriptor.len() > self.buf.len() {
                            self.set_error();
                            return;
                        }

                        self.buf[..descriptor.len()].copy_from_slice(descriptor);
                        self.start_in(req, descriptor.len());
                    },
                    None => self.set_error(),
                }
            },

            (UsbDirection::In, Recipient::Device, Request::GET_STATUS)
            | (UsbDirection::In, Recipient::Interface, Request::GET_STATUS) => {
                self.start_in_buffered(req, &0u16.to_le_bytes());
            },

            (UsbDirection::In, Recipient::Device, Request::GET_CONFIGURATION) => {
                let configuration = self.configuration;
                self.start_in_buffered(req, &[configuration]);
            },

            (UsbDirection::In, Recipient::Interface, Request::GET_INTERFACE) => {
                self.start_in_buffered(req, &[0]);
            },

            (UsbDirection::Out, Recipient::Device, Request::SET_ADDRESS) if req.value <= 127 => {
                // The new address only takes effect after the status stage.
                self.pending_address = Some(req.value as u8);
                self.start_out(req, false);
            },

            (UsbDirection::Out, Recipient::Device, Request::SET_CONFIGURATION)
                if req.value == 0 || req.value == CONFIGURATION_VALUE as u16 =>
            {
                self.configuration = req.value as u8;
                self.start_out(req, false);
            },

            (UsbDirection::Out, Recipient::Interface, Request::SET_INTERFACE) if req.value == 0 => {
                self.start_out(req, false);
            },

            _ => {
                usb_debug!("unsupported standard request {:?}", req);
                self.set_error();
            },
        }
    }

    fn start_in_buffered(&mut self, req: &Request, data: &[u8]) {
        if data.len() > self.buf.len() {
            self.set_error();
            return;
        }

        self.buf[..data.len()].copy_from_slice(data);
        self.start_in(req, data.len());
    }

    fn start_in(&mut self, req: &Request, data_len: usize) {
        self.len = min(data_len, req.length as usize);
        self.limit = req.length as usize;
        self.i = 0;

        self.state = if self.len == 0 {
            ControlState::DataInLast
        } else {
            ControlState::DataIn(InSource::Buffer)
        };
    }

    fn start_out(&mut self, req: &Request, streamed: bool) {
        self.len = req.length as usize;
        self.i = 0;

        self.state = if self.len == 0 {
            ControlState::StatusIn
        } else {
            ControlState::DataOut { streamed }
        };
    }

    fn set_error(&mut self) {
        self.state = ControlState::Error;
    }
}
