//! Configuration surface. Plain data, never parsed from a file by
//! this crate — a host that wants to load one from JSON/YAML enables the
//! `serde` feature and does the parsing itself.

use crate::error::Error;

/// Whether a context acts as a Modbus server (responding to requests) or
/// client/master (initiating them).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    Server,
    Client,
}

/// Which of the three wire transports a context speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Protocol {
    Rtu,
    Ascii,
    Tcp,
}

/// Serial parity setting, carried through to the host's UART
/// configuration — this crate never touches a UART peripheral itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Parity {
    None,
    Odd,
    Even,
}

/// Serial line parameters, used only to compute RTU timing; this
/// crate does not open or configure a UART.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SerialConfig {
    pub baudrate: u32,
    pub data_bits: u8,
    pub stop_bits: u8,
    pub parity: Parity,
}

impl Default for SerialConfig {
    fn default() -> Self {
        SerialConfig {
            baudrate: 19200,
            data_bits: 8,
            stop_bits: 1,
            parity: Parity::Even,
        }
    }
}

/// TCP transport parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TcpConfig {
    pub port: u16,
    pub timeout_ms: u32,
}

impl Default for TcpConfig {
    fn default() -> Self {
        TcpConfig {
            port: crate::limits::DEFAULT_TCP_PORT,
            timeout_ms: 1000,
        }
    }
}

/// Per-transport parameters; which variant applies is determined by
/// [`Config::protocol`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Transport {
    Serial(SerialConfig),
    Tcp(TcpConfig),
}

/// The full configuration for one [`crate::server::Context`] or master
/// instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    pub mode: Mode,
    pub protocol: Protocol,
    /// This context's unit ID. Must be in `1..=247`; 0 is reserved for
    /// the incoming broadcast filter and is rejected by
    /// [`Config::validate`].
    pub unit_id: u8,
    /// Master-side response timeout.
    pub response_timeout_ms: u32,
    pub transport: Transport,
}

impl Config {
    /// Check the fields `process_adu`'s caller is required to have
    /// validated before calling `init`.
    pub fn validate(&self) -> Result<(), Error> {
        if self.unit_id == 0 || self.unit_id > 247 {
            return Err(Error::InvalidParam);
        }
        Ok(())
    }
}
