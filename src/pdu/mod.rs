//! Modbus PDU codec.
//!
//! A [`Pdu`] is a function code plus a payload of at most
//! [`crate::limits::MAX_PDU_DATA`] bytes. Internally the payload is kept
//! as a [`PduBody`] tagged union rather than a raw byte slice with an
//! ad-hoc high bit; [`Pdu::serialize`]/[`Pdu::deserialize`] are the only
//! places that translate to and from the wire's high-bit-set convention.

pub mod requests;

use crate::error::Error;
use crate::exception::ModbusException;
use crate::function::FunctionCode;
use crate::limits::{MAX_PDU_DATA, MAX_PDU_LEN};
use heapless::Vec;

/// The payload half of a PDU: either a normal function-specific byte
/// string, or a single exception code.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PduBody {
    Normal(Vec<u8, MAX_PDU_DATA>),
    Exception(ModbusException),
}

/// A Modbus Protocol Data Unit: function code + payload.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pdu {
    /// The function code without the exception bit — `body` carries
    /// whether this is an exception.
    pub function_code: u8,
    pub body: PduBody,
}

impl Pdu {
    /// Build a normal (non-exception) PDU from raw payload bytes.
    pub fn normal(function_code: u8, data: &[u8]) -> Result<Self, Error> {
        if data.len() > MAX_PDU_DATA {
            return Err(Error::BufferOverflow);
        }
        let mut body = Vec::new();
        // Capacity was just checked above so this cannot fail.
        body.extend_from_slice(data).map_err(|_| Error::BufferOverflow)?;
        Ok(Pdu {
            function_code: function_code & !FunctionCode::EXCEPTION_BIT,
            body: PduBody::Normal(body),
        })
    }

    /// Build an exception response PDU.
    pub fn exception(function_code: u8, exception: ModbusException) -> Self {
        Pdu {
            function_code: function_code & !FunctionCode::EXCEPTION_BIT,
            body: PduBody::Exception(exception),
        }
    }

    /// True iff this PDU is an exception response (bit 7 of the
    /// function code would be set on the wire).
    pub fn is_exception(&self) -> bool {
        matches!(self.body, PduBody::Exception(_))
    }

    /// The exception code carried by this PDU, if it is an exception
    /// response.
    pub fn get_exception(&self) -> Option<ModbusException> {
        match self.body {
            PduBody::Exception(e) => Some(e),
            PduBody::Normal(_) => None,
        }
    }

    /// The normal payload bytes, if this isn't an exception response.
    pub fn data(&self) -> Option<&[u8]> {
        match &self.body {
            PduBody::Normal(data) => Some(data.as_slice()),
            PduBody::Exception(_) => None,
        }
    }

    /// Number of payload bytes this PDU would serialize to (1 for an
    /// exception, the normal payload length otherwise).
    pub fn data_len(&self) -> usize {
        match &self.body {
            PduBody::Normal(data) => data.len(),
            PduBody::Exception(_) => 1,
        }
    }

    /// Serialize to wire form: function code (with the exception bit set
    /// when applicable) followed by the payload. Returns the number of
    /// bytes written.
    pub fn serialize(&self, out: &mut [u8]) -> Result<usize, Error> {
        let total = 1 + self.data_len();
        if total > MAX_PDU_LEN {
            return Err(Error::BufferOverflow);
        }
        if out.len() < total {
            return Err(Error::BufferOverflow);
        }
        match &self.body {
            PduBody::Normal(data) => {
                out[0] = self.function_code;
                out[1..1 + data.len()].copy_from_slice(data);
            }
            PduBody::Exception(exception) => {
                out[0] = self.function_code | FunctionCode::EXCEPTION_BIT;
                out[1] = exception.to_wire();
            }
        }
        Ok(total)
    }

    /// Deserialize from wire form. Empty input fails with `Frame`; input
    /// longer than the maximum PDU length fails with `BufferOverflow`.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.is_empty() {
            return Err(Error::Frame);
        }
        if bytes.len() > MAX_PDU_LEN {
            return Err(Error::BufferOverflow);
        }
        let wire_fc = bytes[0];
        let is_exception = wire_fc & FunctionCode::EXCEPTION_BIT != 0;
        let function_code = wire_fc & !FunctionCode::EXCEPTION_BIT;
        let data = &bytes[1..];
        if is_exception {
            if data.len() != 1 {
                return Err(Error::Frame);
            }
            Ok(Pdu::exception(function_code, ModbusException::from_wire(data[0])))
        } else {
            Pdu::normal(function_code, data)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_pdu_round_trips() {
        let pdu = Pdu::normal(0x03, &[0x00, 0x00, 0x00, 0x0A]).unwrap();
        let mut buf = [0u8; 8];
        let n = pdu.serialize(&mut buf).unwrap();
        assert_eq!(&buf[..n], &[0x03, 0x00, 0x00, 0x00, 0x0A]);
        assert_eq!(Pdu::deserialize(&buf[..n]).unwrap(), pdu);
    }

    #[test]
    fn exception_pdu_round_trips() {
        let pdu = Pdu::exception(0x05, ModbusException::IllegalDataValue);
        let mut buf = [0u8; 8];
        let n = pdu.serialize(&mut buf).unwrap();
        assert_eq!(&buf[..n], &[0x85, 0x03]);
        let back = Pdu::deserialize(&buf[..n]).unwrap();
        assert_eq!(back, pdu);
        assert!(back.is_exception());
        assert_eq!(back.get_exception(), Some(ModbusException::IllegalDataValue));
    }

    #[test]
    fn deserialize_empty_is_frame_error() {
        assert_eq!(Pdu::deserialize(&[]), Err(Error::Frame));
    }

    #[test]
    fn deserialize_too_long_is_buffer_overflow() {
        let bytes = [0u8; MAX_PDU_LEN + 1];
        assert_eq!(Pdu::deserialize(&bytes), Err(Error::BufferOverflow));
    }

    #[test]
    fn deserialize_exception_with_wrong_length_is_frame_error() {
        assert_eq!(Pdu::deserialize(&[0x85, 0x03, 0x00]), Err(Error::Frame));
        assert_eq!(Pdu::deserialize(&[0x85]), Err(Error::Frame));
    }

    #[test]
    fn illegal_data_value_exception_wire_example() {
        // A bad FC05 value becomes exception response 0x85 0x03.
        let pdu = Pdu::exception(0x05, ModbusException::IllegalDataValue);
        let mut buf = [0u8; 2];
        pdu.serialize(&mut buf).unwrap();
        assert_eq!(buf, [0x85, 0x03]);
    }
}
