//! Blocking driver for a gauge behind a [`Read`] + [`Write`] serial port.
//!
//! Every call is one complete request/reply exchange. Nothing is retried and
//! there are no timeouts besides those of the serial port itself. Wrap the
//! `Gauge` in a mutex if several threads need to talk to it.

use std::io::{self, Read, Write};

use log::{debug, trace, warn};
use snafu::{ensure, ResultExt};

use crate::attribute::{
    AttributeId, AttributeValue, CathodeEnabled, DeviceType, Pressure, PressureUnit, Readable,
    Writable,
};
use crate::buffer::Buffer;
use crate::error::{lossy, DeviceSnafu, Error, IoSnafu, ReadOnlySnafu, ValidationSnafu};
use crate::frame::{decode_response, encode_request, parse_reply};
use crate::types::{Address, Command, Unit};

/// A Smartline gauge at a fixed bus address.
///
/// # Example
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use smartline_proto::{addr, Gauge, Unit};
/// # let port = std::io::Cursor::new(Vec::new());
/// let mut gauge = Gauge::new(port, addr(1));
/// gauge.set_unit(Unit::Mbar)?;
/// println!("{} mbar", gauge.pressure()?);
/// # Ok(()) }
/// ```
#[derive(Debug)]
pub struct Gauge<IO> {
    io: IO,
    address: Address,
    buffer: Buffer,
}

impl<IO> Gauge<IO>
where
    IO: Read + Write,
{
    /// Create a driver for the gauge at `address`, talking through `io`.
    ///
    /// `io` must be configured for 9600 baud, 8 data bits, no parity and one stop bit.
    pub fn new(io: IO, address: Address) -> Self {
        if !address.is_supported() {
            warn!(
                "Gauge address {} is outside of the supported range {:?}",
                address,
                Address::SUPPORTED
            );
        }
        Self {
            io,
            address,
            buffer: Buffer::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Give back the serial port.
    pub fn into_inner(self) -> IO {
        self.io
    }

    /// Query an attribute.
    /// # Errors
    /// Transport errors, checksum and framing errors of the reply,
    /// [`Error::Device`] if the gauge rejects the query, or
    /// [`Error::Decode`] if the reply can't be converted.
    pub fn read<A: Readable>(&mut self) -> Result<A::Value, Error> {
        let raw = self.query(A::READ)?;
        let value = A::decode(&raw)?;
        debug!("Read {} from gauge {}: {:?}", A::NAME, self.address, value);
        Ok(value)
    }

    /// Set an attribute.
    ///
    /// The acknowledgement is only read for attributes with
    /// [`Writable::CHECK_ACK`] set, otherwise this returns as soon as the
    /// request has been sent.
    /// # Errors
    /// [`Error::Validation`] before anything is sent, transport errors, or
    /// [`Error::Device`] if the gauge rejects the command.
    pub fn write<A: Writable>(&mut self, value: A::Value) -> Result<(), Error> {
        let data = A::encode(&value)?;
        debug!("Write {} to gauge {}: {:?}", A::NAME, self.address, value);
        self.send(A::WRITE, data.as_bytes())?;
        if A::CHECK_ACK {
            self.check_errors()?;
        }
        Ok(())
    }

    /// Receive the acknowledgement of a write and check it for error flags.
    /// # Errors
    /// [`Error::FrameTooShort`] if the reply has no command echo,
    /// [`Error::Device`] if the echo is `N` or `X`.
    pub fn check_errors(&mut self) -> Result<(), Error> {
        let line = self.receive_line()?;
        let message = decode_response(&line)?;
        let reply = parse_reply(message)?;
        ensure!(
            !reply.is_error(),
            DeviceSnafu {
                reply: lossy(message)
            }
        );
        Ok(())
    }

    pub fn device_type(&mut self) -> Result<String, Error> {
        self.read::<DeviceType>()
    }

    /// Pressure in the currently selected [`unit`](Self::unit).
    pub fn pressure(&mut self) -> Result<f64, Error> {
        self.read::<Pressure>()
    }

    pub fn unit(&mut self) -> Result<Unit, Error> {
        self.read::<PressureUnit>()
    }

    pub fn set_unit(&mut self, unit: Unit) -> Result<(), Error> {
        self.write::<PressureUnit>(unit)
    }

    pub fn cathode_enabled(&mut self) -> Result<bool, Error> {
        self.read::<CathodeEnabled>()
    }

    pub fn set_cathode_enabled(&mut self, enabled: bool) -> Result<(), Error> {
        self.write::<CathodeEnabled>(enabled)
    }

    /// Query an attribute selected at runtime.
    pub fn get(&mut self, id: AttributeId) -> Result<AttributeValue, Error> {
        Ok(match id {
            AttributeId::DeviceType => AttributeValue::Text(self.read::<DeviceType>()?),
            AttributeId::Pressure => AttributeValue::Pressure(self.read::<Pressure>()?),
            AttributeId::Unit => AttributeValue::Unit(self.read::<PressureUnit>()?),
            AttributeId::CathodeEnabled => AttributeValue::Flag(self.read::<CathodeEnabled>()?),
        })
    }

    /// Set an attribute selected at runtime, parsing the value from `text`.
    ///
    /// The value is validated before anything is sent.
    pub fn set(&mut self, id: AttributeId, text: &str) -> Result<(), Error> {
        let value = id.parse_value(text)?;
        self.set_value(id, &value)
    }

    /// Set an attribute selected at runtime.
    /// # Errors
    /// [`Error::ReadOnly`] or [`Error::Validation`] if `value` can't be
    /// written to `id`, in addition to the errors of [`write`](Self::write).
    pub fn set_value(&mut self, id: AttributeId, value: &AttributeValue) -> Result<(), Error> {
        match (id, value) {
            (AttributeId::Unit, AttributeValue::Unit(unit)) => self.write::<PressureUnit>(*unit),
            (AttributeId::CathodeEnabled, AttributeValue::Flag(flag)) => {
                self.write::<CathodeEnabled>(*flag)
            }
            (AttributeId::DeviceType, _) | (AttributeId::Pressure, _) => {
                ReadOnlySnafu {
                    attribute: id.name(),
                }
                .fail()
            }
            _ => ValidationSnafu {
                attribute: id.name(),
                value: value.to_string(),
            }
            .fail(),
        }
    }

    /// Send a read request and return the data field of the reply.
    ///
    /// Replies echoing another command are left over from an earlier
    /// exchange, e.g. the acknowledgement of a unit write, and are skipped.
    fn query(&mut self, command: Command) -> Result<Vec<u8>, Error> {
        self.send(command, b"")?;
        loop {
            let line = self.receive_line()?;
            let message = decode_response(&line)?;
            let reply = parse_reply(message)?;
            ensure!(
                !reply.is_error(),
                DeviceSnafu {
                    reply: lossy(message)
                }
            );
            if reply.command != command.as_byte() {
                warn!(
                    "Discarding reply {:?} to gauge {}, expected an echo of {}",
                    lossy(message),
                    self.address,
                    command
                );
                continue;
            }
            if !reply.is_from(self.address) {
                warn!(
                    "Reply {:?} to gauge {} echoes another address",
                    lossy(message),
                    self.address
                );
            }
            return Ok(reply.data.to_vec());
        }
    }

    fn send(&mut self, command: Command, data: &[u8]) -> Result<(), Error> {
        if self.buffer.len() > 0 {
            warn!("Discarding {} unexpected bytes received", self.buffer.len());
            self.buffer.clear();
        }
        let frame = encode_request(self.address, command, data);
        trace!("Sending {:?}", lossy(&frame));
        self.io.write_all(&frame).context(IoSnafu)?;
        self.io.flush().context(IoSnafu)
    }

    fn receive_line(&mut self) -> Result<Vec<u8>, Error> {
        let mut chunk = [0; 32];
        loop {
            if let Some(line) = self.buffer.take_line() {
                trace!("Received {:?}", lossy(&line));
                return Ok(line);
            }
            let len = match self.io.read(&mut chunk) {
                Ok(0) => return Err(io::Error::from(io::ErrorKind::UnexpectedEof)).context(IoSnafu),
                Ok(len) => len,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e).context(IoSnafu),
            };
            self.buffer.write(&chunk[..len]);
        }
    }
}
