//! Modbus function codes.

/// A Modbus function code, decoded from the wire byte.
///
/// Only the eight function codes this core implements get their own
/// variant; every other value — including the file-record, diagnostic
/// and event-log codes a full Modbus stack names — is
/// preserved as [`FunctionCode::Other`] so logging and tests can see the
/// raw byte, but the dispatcher always answers it with
/// [`crate::exception::ModbusException::IllegalFunction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FunctionCode {
    ReadCoils,
    ReadDiscreteInputs,
    ReadHoldingRegisters,
    ReadInputRegisters,
    WriteSingleCoil,
    WriteSingleRegister,
    WriteMultipleCoils,
    WriteMultipleRegisters,
    /// Any other function code, including the high bit set for an
    /// exception response (in which case `.0` already has bit 7 set).
    Other(u8),
}

impl FunctionCode {
    pub const READ_COILS: u8 = 0x01;
    pub const READ_DISCRETE_INPUTS: u8 = 0x02;
    pub const READ_HOLDING_REGISTERS: u8 = 0x03;
    pub const READ_INPUT_REGISTERS: u8 = 0x04;
    pub const WRITE_SINGLE_COIL: u8 = 0x05;
    pub const WRITE_SINGLE_REGISTER: u8 = 0x06;
    pub const WRITE_MULTIPLE_COILS: u8 = 0x0F;
    pub const WRITE_MULTIPLE_REGISTERS: u8 = 0x10;

    // Named but unimplemented; kept for documentation and wire-sniffing,
    // never dispatched.
    pub const READ_EXCEPTION_STATUS: u8 = 0x07;
    pub const DIAGNOSTICS: u8 = 0x08;
    pub const GET_COMM_EVENT_COUNTER: u8 = 0x0B;
    pub const GET_COMM_EVENT_LOG: u8 = 0x0C;
    pub const REPORT_SLAVE_ID: u8 = 0x11;
    pub const READ_FILE_RECORD: u8 = 0x14;
    pub const WRITE_FILE_RECORD: u8 = 0x15;
    pub const MASK_WRITE_REGISTER: u8 = 0x16;
    pub const READ_WRITE_MULTIPLE_REGISTERS: u8 = 0x17;

    /// Exception responses set bit 7 of the function code.
    pub const EXCEPTION_BIT: u8 = 0x80;

    /// Decode the wire byte, masking off the exception bit first so that
    /// both a normal request and its exception response map to the same
    /// function identity.
    pub fn from_wire(code: u8) -> Self {
        match code & !Self::EXCEPTION_BIT {
            Self::READ_COILS => FunctionCode::ReadCoils,
            Self::READ_DISCRETE_INPUTS => FunctionCode::ReadDiscreteInputs,
            Self::READ_HOLDING_REGISTERS => FunctionCode::ReadHoldingRegisters,
            Self::READ_INPUT_REGISTERS => FunctionCode::ReadInputRegisters,
            Self::WRITE_SINGLE_COIL => FunctionCode::WriteSingleCoil,
            Self::WRITE_SINGLE_REGISTER => FunctionCode::WriteSingleRegister,
            Self::WRITE_MULTIPLE_COILS => FunctionCode::WriteMultipleCoils,
            Self::WRITE_MULTIPLE_REGISTERS => FunctionCode::WriteMultipleRegisters,
            other => FunctionCode::Other(other),
        }
    }

    /// The wire byte for this function code (without the exception bit).
    pub fn to_wire(self) -> u8 {
        match self {
            FunctionCode::ReadCoils => Self::READ_COILS,
            FunctionCode::ReadDiscreteInputs => Self::READ_DISCRETE_INPUTS,
            FunctionCode::ReadHoldingRegisters => Self::READ_HOLDING_REGISTERS,
            FunctionCode::ReadInputRegisters => Self::READ_INPUT_REGISTERS,
            FunctionCode::WriteSingleCoil => Self::WRITE_SINGLE_COIL,
            FunctionCode::WriteSingleRegister => Self::WRITE_SINGLE_REGISTER,
            FunctionCode::WriteMultipleCoils => Self::WRITE_MULTIPLE_COILS,
            FunctionCode::WriteMultipleRegisters => Self::WRITE_MULTIPLE_REGISTERS,
            FunctionCode::Other(code) => code,
        }
    }
}
