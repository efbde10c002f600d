//! This module defines the wire types of the Smartline protocol: gauge
//! addresses, command letters and pressure units.

use core::fmt;
use core::ops::{Deref, RangeInclusive};
use core::str::FromStr;

use crate::error::{Error, ValidationSnafu};

/// Address is the RS485 bus address of a gauge.
///
/// Gauges only answer to addresses in [`Address::SUPPORTED`], but no range
/// check is done here. An unsupported address is serialized like any other,
/// and the gauge will simply not respond to it.
///
/// ## Example
/// ```
/// use smartline_proto::Address;
/// let addr = Address::new(3);
/// assert_eq!(addr.to_string(), "003");
/// assert!(addr.is_supported());
/// ```
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Copy, Clone, Hash)]
#[repr(transparent)]
pub struct Address(u8);

/// Create a new [`Address`].
pub const fn addr(a: u8) -> Address {
    Address(a)
}

impl Address {
    /// The range of addresses a gauge can be configured for.
    pub const SUPPORTED: RangeInclusive<u8> = 1..=15;

    /// Create a new address.
    pub const fn new(address: u8) -> Self {
        Self(address)
    }

    /// Returns true if a gauge can be configured to use this address.
    pub fn is_supported(self) -> bool {
        Self::SUPPORTED.contains(&self.0)
    }

    /// The zero padded, three digit on-wire representation.
    pub(crate) const fn to_bytes(self) -> [u8; 3] {
        [
            b'0' + self.0 / 100,
            b'0' + self.0 / 10 % 10,
            b'0' + self.0 % 10,
        ]
    }
}

impl Deref for Address {
    type Target = u8;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<u8> for Address {
    fn from(address: u8) -> Self {
        Self(address)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}


/// A single ASCII letter selecting the gauge operation.
///
/// Uppercase letters read a value, lowercase letters write one.
#[derive(PartialEq, Eq, Debug, Copy, Clone, Hash)]
#[repr(transparent)]
pub struct Command(u8);

impl Command {
    /// Create a new command from its letter.
    pub const fn new(letter: u8) -> Self {
        Self(letter)
    }

    /// The on-wire byte.
    pub const fn as_byte(self) -> u8 {
        self.0
    }

    /// True for read requests.
    pub fn is_read(self) -> bool {
        self.0.is_ascii_uppercase()
    }

    /// True for write requests and commands carrying data.
    pub fn is_write(self) -> bool {
        self.0.is_ascii_lowercase()
    }
}

impl From<Command> for char {
    fn from(cmd: Command) -> Self {
        char::from(cmd.0)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", char::from(self.0))
    }
}

/// Unit of the pressure readings reported by the gauge.
#[derive(PartialEq, Eq, Debug, Copy, Clone, Hash)]
pub enum Unit {
    Mbar,
    Torr,
    Hpa,
}

impl Unit {
    /// All units, in wire code order.
    pub const ALL: [Unit; 3] = [Unit::Mbar, Unit::Torr, Unit::Hpa];

    /// The integer the gauge uses for this unit.
    pub const fn code(self) -> u32 {
        match self {
            Unit::Mbar => 0,
            Unit::Torr => 1,
            Unit::Hpa => 2,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|unit| unit.code() == code)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Unit::Mbar => "mbar",
            Unit::Torr => "Torr",
            Unit::Hpa => "hPa",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Unit {
    type Err = Error;

    /// Parses the exact unit names "mbar", "Torr" and "hPa".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|unit| unit.name() == s)
            .ok_or_else(|| {
                ValidationSnafu {
                    attribute: "unit",
                    value: s,
                }
                .build()
            })
    }
}
