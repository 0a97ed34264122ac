//! Protocol-agnostic Modbus core: PDU codec, transport framing (RTU, ASCII,
//! TCP) and a callback-driven server dispatcher, for embedded targets.
//!
//! This crate is `no_std` outside of tests and never allocates. Every
//! buffer is either caller-provided or a fixed-capacity [`heapless`]
//! collection sized to the protocol's own limits (see [`limits`]).
//!
//! The four pieces compose as:
//!
//! - [`pdu`] — function-code level request/response encode/decode.
//! - [`transport`] — per-transport frame build/parse plus the byte-fed
//!   receiver state machines that find frame boundaries in a live stream.
//! - [`server`] — the stateful dispatcher that turns a decoded [`Adu`]
//!   into a response `Adu` via an application-supplied [`ModbusCallbacks`]
//!   implementation.
//! - [`config`] — the library's configuration surface (mode, protocol,
//!   unit id, transport parameters).
//!
//! Physical transports (serial ports, TCP sockets), task scheduling and
//! application data storage are not this crate's concern; see
//! [`server::callbacks::ModbusCallbacks`] for the exact interface boundary.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[cfg(feature = "std")]
extern crate std;

pub mod adu;
pub mod config;
pub mod crc;
pub mod error;
pub mod exception;
pub mod function;
pub mod limits;
pub mod lrc;
pub mod master;
pub mod pdu;
pub mod server;
pub mod transport;

pub use adu::Adu;
pub use config::Config;
pub use error::Error;
pub use exception::ModbusException;
pub use function::FunctionCode;
pub use pdu::{Pdu, PduBody};
pub use server::callbacks::ModbusCallbacks;
pub use server::{Context, Stats};

/// Crate-wide result alias for library-internal failures. Never used for
/// Modbus exceptions, which travel as [`ModbusException`] values inside a
/// normal `Ok` response PDU.
pub type Result<T> = core::result::Result<T, Error>;
