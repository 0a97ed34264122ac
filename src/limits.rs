//! Compile-time capacity and quantity limits.
//!
//! These are the wire-format's hard ceilings, not tunables: a consumer
//! may never legally request more than these quantities, so there is no
//! runtime configuration knob for them. A downstream build that wants a
//! *smaller* ceiling (e.g. a register map that tops out at 16 registers)
//! enforces that in its own [`crate::server::callbacks::ModbusCallbacks`]
//! impl by returning `ModbusException::IllegalDataAddress`.

/// Maximum PDU payload length in bytes.
pub const MAX_PDU_DATA: usize = 252;

/// Maximum total PDU length (function code + payload) in bytes.
pub const MAX_PDU_LEN: usize = 253;

/// Maximum quantity for Read Coils / Read Discrete Inputs (FC01/02).
pub const MAX_READ_BITS: u16 = 2000;

/// Maximum quantity for Read Holding/Input Registers (FC03/04).
pub const MAX_READ_REGISTERS: u16 = 125;

/// Maximum quantity for Write Multiple Coils (FC15).
pub const MAX_WRITE_COILS: u16 = 1968;

/// Maximum quantity for Write Multiple Registers (FC16).
pub const MAX_WRITE_REGISTERS: u16 = 123;

/// Size of the server context's bit-packed coil scratch buffer in bytes:
/// `ceil(MAX_READ_BITS / 8)`.
pub const COIL_SCRATCH_LEN: usize = 256;

/// Size of the server context's register scratch buffer in 16-bit words.
pub const REGISTER_SCRATCH_LEN: usize = MAX_READ_REGISTERS as usize;

/// RTU frame bounds.
pub const RTU_FRAME_MIN: usize = 4;
pub const RTU_FRAME_MAX: usize = 256;

/// ASCII frame bounds.
pub const ASCII_FRAME_MIN: usize = 9;
pub const ASCII_FRAME_MAX: usize = 513;

/// TCP frame bounds.
pub const TCP_FRAME_MIN: usize = 8;
pub const TCP_FRAME_MAX: usize = 260;

/// MBAP header length in bytes.
pub const MBAP_HEADER_LEN: usize = 7;

/// Default Modbus TCP listen port.
pub const DEFAULT_TCP_PORT: u16 = 502;
