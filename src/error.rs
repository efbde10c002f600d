use snafu::Snafu;

/// Errors returned by the frame codec, the attribute mapper and [`Gauge`](crate::Gauge).
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum Error {
    /// The checksum of a received frame doesn't match its contents.
    #[snafu(display(
        "checksum error in received message {:?}: expected {:?} but received {:?}",
        raw,
        char::from(*expected),
        char::from(*received)
    ))]
    Checksum {
        /// The received line, terminator stripped.
        raw: String,
        /// Checksum computed over the message part of the line.
        expected: u8,
        /// Checksum character found at the end of the line.
        received: u8,
    },

    /// A received frame is too short to contain the expected fields.
    #[snafu(display("frame {:?} is too short", raw))]
    FrameTooShort { raw: String },

    /// A value outside the domain of an attribute was given for writing.
    #[snafu(display("invalid value {:?} for {}", value, attribute))]
    Validation {
        attribute: &'static str,
        value: String,
    },

    /// The gauge rejected a command, or flagged it as erroneous.
    #[snafu(display("reply from gauge indicates an error: {:?}", reply))]
    Device { reply: String },

    /// The data field of a reply can't be mapped to a value of the attribute.
    #[snafu(display("can't decode {:?} as {}", raw, attribute))]
    Decode { attribute: &'static str, raw: String },

    /// No attribute with the given name exists.
    #[snafu(display("unknown attribute {:?}", name))]
    UnknownAttribute { name: String },

    /// The attribute can't be written.
    #[snafu(display("{} is read-only", attribute))]
    ReadOnly { attribute: &'static str },

    /// The serial transport failed.
    #[snafu(display("serial port error: {}", source))]
    Io { source: std::io::Error },
}

pub(crate) fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
