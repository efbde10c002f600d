//! Gauge attributes and their value codecs.
//!
//! Each attribute is a zero sized type implementing [`Readable`] and/or
//! [`Writable`], which bind it to its command letters and convert between
//! the on-wire data field and a typed value. [`Gauge::read`](crate::Gauge::read)
//! and [`Gauge::write`](crate::Gauge::write) interpret them generically.
//!
//! | Attribute        | Read | Write    | Value    |
//! |------------------|------|----------|----------|
//! | [`DeviceType`]     | `T`  |          | `String` |
//! | [`Pressure`]       | `M`  |          | `f64`    |
//! | [`PressureUnit`]   | `U`  | `u%06d`  | [`Unit`] |
//! | [`CathodeEnabled`] | `I`  | `i%d`    | `bool`   |
//!
//! For interactive use, attributes can also be looked up by name through
//! [`AttributeId`].

use core::fmt::{self, Write};
use core::str::FromStr;

use arrayvec::ArrayString;
use snafu::OptionExt;

use crate::error::{
    lossy, DecodeSnafu, Error, ReadOnlySnafu, UnknownAttributeSnafu, ValidationSnafu,
};
use crate::nom_parser;
use crate::types::{Command, Unit};

/// Formatted data field of a write command.
pub type Payload = ArrayString<8>;

/// A named gauge property.
pub trait Attribute {
    const NAME: &'static str;
    type Value: fmt::Debug;
}

/// An attribute that can be queried from the gauge.
pub trait Readable: Attribute {
    /// Command letter of the read request.
    const READ: Command;

    /// Convert the data field of a reply into a value.
    /// # Errors
    /// Returns [`Error::Decode`] if the data field is malformed.
    fn decode(raw: &[u8]) -> Result<Self::Value, Error>;
}

/// An attribute that can be set on the gauge.
pub trait Writable: Attribute {
    /// Command letter of the write request.
    const WRITE: Command;
    /// The gauge acknowledgement must be read and checked after writing.
    const CHECK_ACK: bool = false;

    /// Format a value as the data field of a write request.
    /// # Errors
    /// Returns [`Error::Validation`] if the value isn't accepted by the attribute.
    fn encode(value: &Self::Value) -> Result<Payload, Error>;
}

/// Command letter followed by the formatted value, as sent for a write.
pub fn write_payload<A: Writable>(value: &A::Value) -> Result<Payload, Error> {
    let data = A::encode(value)?;
    let mut payload = Payload::new();
    payload.push(char::from(A::WRITE));
    payload.push_str(&data);
    Ok(payload)
}

fn decode_error(attribute: &'static str, raw: &[u8]) -> Error {
    DecodeSnafu {
        attribute,
        raw: lossy(raw),
    }
    .build()
}

fn int_field(attribute: &'static str, raw: &[u8]) -> Result<u32, Error> {
    nom_parser::int_field(raw).ok_or_else(|| decode_error(attribute, raw))
}

fn format(args: fmt::Arguments<'_>) -> Payload {
    let mut payload = Payload::new();
    payload
        .write_fmt(args)
        .expect("BUG: Payload buffer too small.");
    payload
}

/// The device type string, e.g. `VSP`.
#[derive(Debug, Copy, Clone)]
pub struct DeviceType;

impl Attribute for DeviceType {
    const NAME: &'static str = "type";
    type Value = String;
}

impl Readable for DeviceType {
    const READ: Command = Command::new(b'T');

    fn decode(raw: &[u8]) -> Result<String, Error> {
        core::str::from_utf8(raw)
            .map(String::from)
            .map_err(|_| decode_error(Self::NAME, raw))
    }
}

/// The pressure reading, in the unit selected by [`PressureUnit`].
#[derive(Debug, Copy, Clone)]
pub struct Pressure;

impl Attribute for Pressure {
    const NAME: &'static str = "pressure";
    type Value = f64;
}

impl Readable for Pressure {
    const READ: Command = Command::new(b'M');

    /// The field is a four digit mantissa in thousandths, followed by a
    /// decimal exponent offset by 20.
    fn decode(raw: &[u8]) -> Result<f64, Error> {
        let (mantissa, exponent) =
            nom_parser::pressure_field(raw).ok_or_else(|| decode_error(Self::NAME, raw))?;
        Ok(f64::from(mantissa) / 1000.0 * 10f64.powi(exponent - 20))
    }
}

/// The pressure unit.
#[derive(Debug, Copy, Clone)]
pub struct PressureUnit;

impl Attribute for PressureUnit {
    const NAME: &'static str = "unit";
    type Value = Unit;
}

impl Readable for PressureUnit {
    const READ: Command = Command::new(b'U');

    fn decode(raw: &[u8]) -> Result<Unit, Error> {
        Unit::from_code(int_field(Self::NAME, raw)?).ok_or_else(|| decode_error(Self::NAME, raw))
    }
}

impl Writable for PressureUnit {
    const WRITE: Command = Command::new(b'u');

    fn encode(value: &Unit) -> Result<Payload, Error> {
        Ok(format(format_args!("{:06}", value.code())))
    }
}

/// Hot/cold cathode state of the gauge.
#[derive(Debug, Copy, Clone)]
pub struct CathodeEnabled;

impl Attribute for CathodeEnabled {
    const NAME: &'static str = "cathode_enabled";
    type Value = bool;
}

impl Readable for CathodeEnabled {
    const READ: Command = Command::new(b'I');

    fn decode(raw: &[u8]) -> Result<bool, Error> {
        match int_field(Self::NAME, raw)? {
            1 => Ok(true),
            0 => Ok(false),
            _ => Err(decode_error(Self::NAME, raw)),
        }
    }
}

impl Writable for CathodeEnabled {
    const WRITE: Command = Command::new(b'i');
    const CHECK_ACK: bool = true;

    fn encode(value: &bool) -> Result<Payload, Error> {
        Ok(format(format_args!("{}", u8::from(*value))))
    }
}

/// Static description of an attribute, for inspection and by-name access.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub id: AttributeId,
    pub name: &'static str,
    pub read: Option<Command>,
    pub write: Option<Command>,
    pub check_ack: bool,
}

/// All attributes of a Smartline gauge.
pub static ATTRIBUTES: [Descriptor; 4] = [
    Descriptor {
        id: AttributeId::DeviceType,
        name: DeviceType::NAME,
        read: Some(DeviceType::READ),
        write: None,
        check_ack: false,
    },
    Descriptor {
        id: AttributeId::Pressure,
        name: Pressure::NAME,
        read: Some(Pressure::READ),
        write: None,
        check_ack: false,
    },
    Descriptor {
        id: AttributeId::Unit,
        name: PressureUnit::NAME,
        read: Some(PressureUnit::READ),
        write: Some(PressureUnit::WRITE),
        check_ack: PressureUnit::CHECK_ACK,
    },
    Descriptor {
        id: AttributeId::CathodeEnabled,
        name: CathodeEnabled::NAME,
        read: Some(CathodeEnabled::READ),
        write: Some(CathodeEnabled::WRITE),
        check_ack: CathodeEnabled::CHECK_ACK,
    },
];

/// Selects an attribute at runtime.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AttributeId {
    DeviceType,
    Pressure,
    Unit,
    CathodeEnabled,
}

impl AttributeId {
    pub fn descriptor(self) -> &'static Descriptor {
        match self {
            AttributeId::DeviceType => &ATTRIBUTES[0],
            AttributeId::Pressure => &ATTRIBUTES[1],
            AttributeId::Unit => &ATTRIBUTES[2],
            AttributeId::CathodeEnabled => &ATTRIBUTES[3],
        }
    }

    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    /// Parse `text` into a value that can be written to this attribute.
    ///
    /// Nothing is sent to the gauge, so this can be used to validate input
    /// before starting an exchange.
    /// # Errors
    /// [`Error::ReadOnly`] for attributes without a write command,
    /// [`Error::Validation`] if `text` isn't in the attribute's domain.
    pub fn parse_value(self, text: &str) -> Result<AttributeValue, Error> {
        let name = self.name();
        let invalid = || {
            ValidationSnafu {
                attribute: name,
                value: text,
            }
            .build()
        };
        match self {
            AttributeId::DeviceType | AttributeId::Pressure => {
                ReadOnlySnafu { attribute: name }.fail()
            }
            AttributeId::Unit => Ok(AttributeValue::Unit(text.parse()?)),
            AttributeId::CathodeEnabled => match text {
                "true" | "1" => Ok(AttributeValue::Flag(true)),
                "false" | "0" => Ok(AttributeValue::Flag(false)),
                _ => Err(invalid()),
            },
        }
    }
}

impl FromStr for AttributeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ATTRIBUTES
            .iter()
            .find(|d| d.name == s)
            .map(|d| d.id)
            .context(UnknownAttributeSnafu { name: s })
    }
}

impl fmt::Display for AttributeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value of any attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Text(String),
    Pressure(f64),
    Unit(Unit),
    Flag(bool),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Text(s) => f.write_str(s),
            AttributeValue::Pressure(p) => write!(f, "{:e}", p),
            AttributeValue::Unit(u) => write!(f, "{}", u),
            AttributeValue::Flag(b) => write!(f, "{}", b),
        }
    }
}
