//! Modbus exception codes — protocol-level, travel on the wire.

use core::fmt;

/// A Modbus exception code, as carried in the single data byte of an
/// exception response PDU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ModbusException {
    /// Not an exception; used internally to mean "no exception occurred."
    #[default]
    None = 0x00,
    IllegalFunction = 0x01,
    IllegalDataAddress = 0x02,
    IllegalDataValue = 0x03,
    SlaveDeviceFailure = 0x04,
    Acknowledge = 0x05,
    SlaveDeviceBusy = 0x06,
    MemoryParityError = 0x08,
    GatewayPathUnavailable = 0x0A,
    GatewayTargetFailed = 0x0B,
}

impl ModbusException {
    /// Decode a wire exception code byte. Unknown codes have no
    /// standard meaning; they are preserved as `SlaveDeviceFailure`
    /// rather than silently dropped, since they still indicate failure.
    pub fn from_wire(code: u8) -> Self {
        match code {
            0x00 => ModbusException::None,
            0x01 => ModbusException::IllegalFunction,
            0x02 => ModbusException::IllegalDataAddress,
            0x03 => ModbusException::IllegalDataValue,
            0x04 => ModbusException::SlaveDeviceFailure,
            0x05 => ModbusException::Acknowledge,
            0x06 => ModbusException::SlaveDeviceBusy,
            0x08 => ModbusException::MemoryParityError,
            0x0A => ModbusException::GatewayPathUnavailable,
            0x0B => ModbusException::GatewayTargetFailed,
            _ => ModbusException::SlaveDeviceFailure,
        }
    }

    /// The wire byte for this exception.
    pub fn to_wire(self) -> u8 {
        self as u8
    }

    /// True for every variant except `None`.
    pub fn is_exception(self) -> bool {
        !matches!(self, ModbusException::None)
    }
}

impl fmt::Display for ModbusException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ModbusException::None => "no exception",
            ModbusException::IllegalFunction => "illegal function",
            ModbusException::IllegalDataAddress => "illegal data address",
            ModbusException::IllegalDataValue => "illegal data value",
            ModbusException::SlaveDeviceFailure => "slave device failure",
            ModbusException::Acknowledge => "acknowledge",
            ModbusException::SlaveDeviceBusy => "slave device busy",
            ModbusException::MemoryParityError => "memory parity error",
            ModbusException::GatewayPathUnavailable => "gateway path unavailable",
            ModbusException::GatewayTargetFailed => "gateway target failed",
        };
        f.write_str(msg)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ModbusException {}
