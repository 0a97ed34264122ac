//! Stateful server dispatch core: turns a decoded request [`Adu`] into a
//! response `Adu` by validating it, invoking the application's
//! [`ModbusCallbacks`], and encoding either a normal or exception
//! response.

pub mod callbacks;

pub use callbacks::ModbusCallbacks;

use crate::adu::Adu;
use crate::config::Config;
use crate::error::Error;
use crate::exception::ModbusException;
use crate::function::FunctionCode;
use crate::limits::{COIL_SCRATCH_LEN, REGISTER_SCRATCH_LEN};
use crate::pdu::{requests, Pdu};

/// Coarse-grained progress signal for observers. Not consulted by
/// [`Context::process_adu`] itself, which is otherwise a pure function
/// of the context's config and the input ADU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ContextState {
    Idle,
    Receiving,
    Processing,
    Sending,
    WaitingResponse,
    Error,
}

/// Monotonically increasing request counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Stats {
    pub requests: u32,
    /// Bumped when a handler's own response-encode call fails after
    /// everything else succeeded — an internal/library failure, distinct
    /// from a request simply being rejected as malformed.
    pub errors: u32,
    /// Bumped whenever this request's response ends up being a protocol
    /// exception PDU, whatever the cause (decode failure, an
    /// out-of-range quantity, an unknown function code, or a callback
    /// returning a non-`None` exception).
    pub exceptions: u32,
}

impl Stats {
    pub fn reset(&mut self) {
        *self = Stats::default();
    }
}

/// A server-side processing context: configuration, coarse state, scratch
/// buffers and statistics. Created by [`Context::init`], torn down by
/// [`Context::deinit`].
pub struct Context {
    config: Config,
    state: ContextState,
    initialized: bool,
    coil_scratch: [u8; COIL_SCRATCH_LEN],
    register_scratch: [u16; REGISTER_SCRATCH_LEN],
    pub stats: Stats,
}

impl Context {
    /// Validate `config` and bring up a fresh context. Rejects
    /// `config.unit_id == 0` or `> 247` with `InvalidParam` — 0 is
    /// reserved for the incoming broadcast filter.
    pub fn init(config: Config) -> Result<Self, Error> {
        config.validate()?;
        Ok(Context {
            config,
            state: ContextState::Idle,
            initialized: true,
            coil_scratch: [0; COIL_SCRATCH_LEN],
            register_scratch: [0; REGISTER_SCRATCH_LEN],
            stats: Stats::default(),
        })
    }

    pub fn deinit(&mut self) {
        self.initialized = false;
        self.state = ContextState::Idle;
    }

    pub fn state(&self) -> ContextState {
        self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Process one request ADU against `callbacks`, returning the
    /// response ADU to send, or `None` when nothing should be sent: the
    /// unit ID didn't match this context (and isn't broadcast), or the
    /// request itself was a broadcast.
    pub fn process_adu<C: ModbusCallbacks>(
        &mut self,
        callbacks: &mut C,
        request: &Adu,
    ) -> Result<Option<Adu>, Error> {
        if !self.initialized {
            return Err(Error::NotInitialized);
        }
        if request.unit_id != 0 && request.unit_id != self.config.unit_id {
            #[cfg(feature = "defmt")]
            defmt::trace!(
                "ignoring request for unit {=u8}, configured as {=u8}",
                request.unit_id,
                self.config.unit_id
            );
            return Ok(None);
        }

        self.stats.requests += 1;
        let response_pdu = self.dispatch(callbacks, &request.pdu);

        if request.unit_id == 0 {
            #[cfg(feature = "defmt")]
            defmt::debug!("broadcast request processed, response suppressed");
            return Ok(None);
        }

        Ok(Some(Adu {
            unit_id: self.config.unit_id,
            pdu: response_pdu,
            transaction_id: request.transaction_id,
            protocol_id: request.protocol_id,
        }))
    }

    /// A response-encode call failed after decoding and the callback both
    /// succeeded — an internal/library failure, not a rejection of the
    /// request itself. Counted separately from `stats.exceptions`, which
    /// still gets incremented once when the fallback exception this
    /// returns reaches `dispatch`.
    fn encode_failed(&mut self) -> ModbusException {
        self.stats.errors += 1;
        ModbusException::IllegalDataValue
    }

    fn dispatch<C: ModbusCallbacks>(&mut self, callbacks: &mut C, request_pdu: &Pdu) -> Pdu {
        let fc = request_pdu.function_code;
        #[cfg(feature = "defmt")]
        defmt::trace!("dispatching function code {=u8:#04x}", fc);
        let result = match fc {
            FunctionCode::READ_COILS => self.handle_read_bits(callbacks, request_pdu, fc, true),
            FunctionCode::READ_DISCRETE_INPUTS => {
                self.handle_read_bits(callbacks, request_pdu, fc, false)
            }
            FunctionCode::READ_HOLDING_REGISTERS => {
                self.handle_read_registers(callbacks, request_pdu, fc, true)
            }
            FunctionCode::READ_INPUT_REGISTERS => {
                self.handle_read_registers(callbacks, request_pdu, fc, false)
            }
            FunctionCode::WRITE_SINGLE_COIL => {
                self.handle_write_single_coil(callbacks, request_pdu, fc)
            }
            FunctionCode::WRITE_SINGLE_REGISTER => {
                self.handle_write_single_register(callbacks, request_pdu, fc)
            }
            FunctionCode::WRITE_MULTIPLE_COILS => {
                self.handle_write_multiple_coils(callbacks, request_pdu, fc)
            }
            FunctionCode::WRITE_MULTIPLE_REGISTERS => {
                self.handle_write_multiple_registers(callbacks, request_pdu, fc)
            }
            _ => Err(ModbusException::IllegalFunction),
        };

        match result {
            Ok(pdu) => pdu,
            Err(exception) => {
                self.stats.exceptions += 1;
                #[cfg(feature = "defmt")]
                defmt::warn!("function {=u8:#04x} raised exception {=u8}", fc, exception.to_wire());
                Pdu::exception(fc, exception)
            }
        }
    }

    fn handle_read_bits<C: ModbusCallbacks>(
        &mut self,
        callbacks: &mut C,
        pdu: &Pdu,
        fc: u8,
        coils: bool,
    ) -> Result<Pdu, ModbusException> {
        let req = requests::decode_read_bits_request(pdu).map_err(|_| ModbusException::IllegalDataValue)?;
        let byte_count = requests::byte_count_for_bits(req.quantity);
        let scratch = &mut self.coil_scratch[..byte_count];
        scratch.fill(0);
        let exception = if coils {
            callbacks.read_coils(req.start, req.quantity, scratch)
        } else {
            callbacks.read_discrete_inputs(req.start, req.quantity, scratch)
        };
        if exception.is_exception() {
            return Err(exception);
        }
        requests::encode_read_bits_response(fc, scratch).map_err(|_| self.encode_failed())
    }

    fn handle_read_registers<C: ModbusCallbacks>(
        &mut self,
        callbacks: &mut C,
        pdu: &Pdu,
        fc: u8,
        holding: bool,
    ) -> Result<Pdu, ModbusException> {
        let req =
            requests::decode_read_registers_request(pdu).map_err(|_| ModbusException::IllegalDataValue)?;
        let scratch = &mut self.register_scratch[..req.quantity as usize];
        scratch.fill(0);
        let exception = if holding {
            callbacks.read_holding_registers(req.start, req.quantity, scratch)
        } else {
            callbacks.read_input_registers(req.start, req.quantity, scratch)
        };
        if exception.is_exception() {
            return Err(exception);
        }
        requests::encode_read_registers_response(fc, scratch).map_err(|_| self.encode_failed())
    }

    fn handle_write_single_coil<C: ModbusCallbacks>(
        &mut self,
        callbacks: &mut C,
        pdu: &Pdu,
        fc: u8,
    ) -> Result<Pdu, ModbusException> {
        let req = requests::decode_write_single_coil_request(pdu)
            .map_err(|_| ModbusException::IllegalDataValue)?;
        let exception = callbacks.write_single_coil(req.address, req.value);
        if exception.is_exception() {
            return Err(exception);
        }
        requests::encode_write_single_coil_response(fc, req.address, req.value)
            .map_err(|_| self.encode_failed())
    }

    fn handle_write_single_register<C: ModbusCallbacks>(
        &mut self,
        callbacks: &mut C,
        pdu: &Pdu,
        fc: u8,
    ) -> Result<Pdu, ModbusException> {
        let req = requests::decode_write_single_register_request(pdu)
            .map_err(|_| ModbusException::IllegalDataValue)?;
        let exception = callbacks.write_single_register(req.address, req.value);
        if exception.is_exception() {
            return Err(exception);
        }
        requests::encode_write_single_register_response(fc, req.address, req.value)
            .map_err(|_| self.encode_failed())
    }

    fn handle_write_multiple_coils<C: ModbusCallbacks>(
        &mut self,
        callbacks: &mut C,
        pdu: &Pdu,
        fc: u8,
    ) -> Result<Pdu, ModbusException> {
        let req = requests::decode_write_multiple_coils_request(pdu)
            .map_err(|_| ModbusException::IllegalDataValue)?;
        let exception = callbacks.write_multiple_coils(req.start, req.quantity, &req.values);
        if exception.is_exception() {
            return Err(exception);
        }
        requests::encode_write_multiple_response(fc, req.start, req.quantity)
            .map_err(|_| self.encode_failed())
    }

    fn handle_write_multiple_registers<C: ModbusCallbacks>(
        &mut self,
        callbacks: &mut C,
        pdu: &Pdu,
        fc: u8,
    ) -> Result<Pdu, ModbusException> {
        let req = requests::decode_write_multiple_registers_request(pdu)
            .map_err(|_| ModbusException::IllegalDataValue)?;
        let exception = callbacks.write_multiple_registers(req.start, req.quantity, &req.values);
        if exception.is_exception() {
            return Err(exception);
        }
        requests::encode_write_multiple_response(fc, req.start, req.quantity)
            .map_err(|_| self.encode_failed())
    }
}
