//! Frame codec for the Smartline V1 protocol.
//!
//! A frame is laid out as
//!
//! ```text
//! [address, 3 digits][command letter][data, 0..n bytes][checksum][CR]
//! ```
//!
//! The checksum is the sum of the address, command and data bytes modulo 64,
//! plus 64. Being a plain sum it doesn't detect reordered bytes, which is how
//! the gauges compute it.

use snafu::ensure;

use crate::error::{lossy, ChecksumSnafu, Error, FrameTooShortSnafu};
use crate::nom_parser;
use crate::types::{Address, Command};

/// Line terminator, both for requests and replies.
pub const TERMINATOR: u8 = b'\r';

/// Calculate the checksum character of a frame body.
pub fn checksum(body: &[u8]) -> u8 {
    // 256 is a multiple of 64, so wrapping doesn't change the result
    body.iter().fold(0u8, |sum, &b| sum.wrapping_add(b)) % 64 + 64
}

/// Build the bytes to transmit for a command with optional data.
///
/// ```
/// use smartline_proto::{addr, encode_request, Command};
/// assert_eq!(encode_request(addr(1), Command::new(b'T'), b""), b"001Te\r");
/// ```
pub fn encode_request(address: Address, command: Command, data: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(data.len() + 6);
    frame.extend_from_slice(&address.to_bytes());
    frame.push(command.as_byte());
    frame.extend_from_slice(data);
    frame.push(checksum(&frame));
    frame.push(TERMINATOR);
    frame
}

/// Check the checksum of a received line and return the message without it.
///
/// `line` must already have the terminator removed.
pub fn decode_response(line: &[u8]) -> Result<&[u8], Error> {
    ensure!(line.len() >= 2, FrameTooShortSnafu { raw: lossy(line) });
    let (message, received) = line.split_at(line.len() - 1);
    let (expected, received) = (checksum(message), received[0]);
    ensure!(
        expected == received,
        ChecksumSnafu {
            raw: lossy(line),
            expected,
            received,
        }
    );
    Ok(message)
}

/// The fields of a checked reply message.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Reply<'a> {
    /// The address digits echoed by the gauge.
    pub address: &'a [u8],
    /// The command echo. `N` or `X` here flags an error.
    pub command: u8,
    pub data: &'a [u8],
}

impl Reply<'_> {
    /// True if the gauge echoed `address`.
    pub fn is_from(&self, address: Address) -> bool {
        self.address == &address.to_bytes()[..]
    }

    /// True if the command echo marks the command as rejected or failed.
    pub fn is_error(&self) -> bool {
        self.command == b'N' || self.command == b'X'
    }
}

/// Split a message returned by [`decode_response`] into its fields.
pub fn parse_reply(message: &[u8]) -> Result<Reply<'_>, Error> {
    let (address, command, data) = nom_parser::reply(message).ok_or_else(|| {
        FrameTooShortSnafu {
            raw: lossy(message),
        }
        .build()
    })?;
    Ok(Reply {
        address,
        command,
        data,
    })
}
