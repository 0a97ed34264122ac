//! Library-internal error taxonomy.
//!
//! These codes describe why an API call failed locally. They are never
//! placed on the wire; the only legitimate bridge between this taxonomy
//! and [`crate::exception::ModbusException`] is inside
//! [`crate::server::process_adu`], which knows when a decode failure
//! should become an `IllegalDataValue` response.

use core::fmt;

/// Library-internal error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Operation succeeded. Rarely constructed directly; most APIs use
    /// `Result<T, Error>` and return `Ok(T)` instead.
    Ok,
    /// A parameter was null, zero-length, or otherwise nonsensical.
    InvalidParam,
    /// The call isn't valid in the context's current state.
    InvalidState,
    /// A receiver or master call timed out waiting for more data.
    Timeout,
    /// CRC (RTU) or LRC (ASCII) check failed.
    Crc,
    /// The frame's envelope (length, delimiters, header fields) is malformed.
    Frame,
    /// The underlying transport reported a failure.
    Transport,
    /// A fixed-capacity buffer was too small for the data.
    BufferOverflow,
    /// `process_adu` (or similar) was called before `init`, or after `deinit`.
    NotInitialized,
    /// The context is already servicing a request.
    Busy,
    /// A master-side call got no response before its timeout.
    NoResponse,
    /// The peer replied with a Modbus exception.
    Exception,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Error::Ok => "ok",
            Error::InvalidParam => "invalid parameter",
            Error::InvalidState => "invalid state",
            Error::Timeout => "timed out",
            Error::Crc => "crc or lrc check failed",
            Error::Frame => "malformed frame",
            Error::Transport => "transport error",
            Error::BufferOverflow => "buffer overflow",
            Error::NotInitialized => "not initialized",
            Error::Busy => "busy",
            Error::NoResponse => "no response",
            Error::Exception => "modbus exception",
        };
        f.write_str(msg)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
