//! Driver for Thyracont Smartline vacuum gauges using communication protocol V1.
//!
//! The gauges are connected through RS485 at 9600 baud, 8 data bits,
//! no parity, one stop bit and no handshake. Each request is answered by
//! exactly one reply before the next request may be sent.
//!
//! A frame is made up of
//!
//! | Bytes  | Content                                                 |
//! |--------|---------------------------------------------------------|
//! | 0-2    | Address of the gauge, zero padded decimal               |
//! | 3      | Command letter, uppercase to read, lowercase to write   |
//! | 4-n    | Data, can be empty                                      |
//! | n+1    | Checksum: sum of bytes 0-n modulo 64, plus 64           |
//! | n+2    | Carriage return                                         |
//!
//! [`frame`] holds the frame codec, [`attribute`] maps gauge attributes onto
//! commands, and [`Gauge`] runs the exchanges over any `Read + Write` port.
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use smartline_proto::{addr, attribute::Pressure, Gauge};
//! # let port = std::io::Cursor::new(Vec::new());
//! let mut gauge = Gauge::new(port, addr(3));
//! println!("{}", gauge.read::<Pressure>()?);
//! # Ok(()) }
//! ```

pub mod attribute;
mod buffer;
mod error;
pub mod frame;
pub mod gauge;
mod nom_parser;
pub mod types;

pub use attribute::{AttributeId, AttributeValue, ATTRIBUTES};
pub use error::Error;
pub use frame::{checksum, decode_response, encode_request};
pub use gauge::Gauge;
pub use types::{addr, Address, Command, Unit};

/// Serial line speed of the gauges.
pub const BAUD_RATE: u32 = 9600;
