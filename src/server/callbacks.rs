//! The contract between [`super::Context`] and the application's data
//! store.
//!
//! `process_adu` is generic over `C: ModbusCallbacks` rather than taking
//! `&mut dyn ModbusCallbacks`, so a call site pays no vtable cost and the
//! core never needs `alloc` to hold a callback object. A caller who does
//! want dynamic dispatch can still box a `&mut dyn ModbusCallbacks`
//! behind this same trait.

use crate::exception::ModbusException;

/// Implemented by the application that owns the actual coil/register
/// storage. The core never knows the address map; a callback that sees
/// an address outside its implemented range MUST return
/// `IllegalDataAddress`.
pub trait ModbusCallbacks {
    /// Fill `out` (already pre-zeroed by the core) with `quantity`
    /// bit-packed coil values starting at `start`, LSB-first within each
    /// byte.
    fn read_coils(&mut self, start: u16, quantity: u16, out: &mut [u8]) -> ModbusException;

    /// Same contract as [`ModbusCallbacks::read_coils`] for discrete
    /// inputs.
    fn read_discrete_inputs(&mut self, start: u16, quantity: u16, out: &mut [u8]) -> ModbusException;

    /// Fill `out` with `quantity` holding register values in host order.
    fn read_holding_registers(&mut self, start: u16, quantity: u16, out: &mut [u16]) -> ModbusException;

    /// Same contract as [`ModbusCallbacks::read_holding_registers`] for
    /// input registers.
    fn read_input_registers(&mut self, start: u16, quantity: u16, out: &mut [u16]) -> ModbusException;

    fn write_single_coil(&mut self, address: u16, value: bool) -> ModbusException;

    fn write_single_register(&mut self, address: u16, value: u16) -> ModbusException;

    /// `values` is bit-packed, LSB-first within each byte, `quantity`
    /// bits long.
    fn write_multiple_coils(&mut self, start: u16, quantity: u16, values: &[u8]) -> ModbusException;

    fn write_multiple_registers(&mut self, start: u16, quantity: u16, values: &[u16]) -> ModbusException;
}
