//! Application Data Unit: the protocol-agnostic envelope around a [`Pdu`].

use crate::pdu::Pdu;

/// A decoded Modbus request or response, independent of which transport
/// carried it.
///
/// `transaction_id` and `protocol_id` are meaningful only for TCP; RTU
/// and ASCII framers always produce/consume zero in both fields.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Adu {
    pub unit_id: u8,
    pub pdu: Pdu,
    pub transaction_id: u16,
    pub protocol_id: u16,
}

impl Adu {
    /// Build an ADU for RTU/ASCII, where `transaction_id` and
    /// `protocol_id` don't apply.
    pub fn serial(unit_id: u8, pdu: Pdu) -> Self {
        Adu {
            unit_id,
            pdu,
            transaction_id: 0,
            protocol_id: 0,
        }
    }

    /// Build an ADU for TCP.
    pub fn tcp(unit_id: u8, pdu: Pdu, transaction_id: u16) -> Self {
        Adu {
            unit_id,
            pdu,
            transaction_id,
            protocol_id: 0,
        }
    }

    /// True iff this ADU addresses all servers.
    pub fn is_broadcast(&self) -> bool {
        self.unit_id == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exception::ModbusException;

    #[test]
    fn serial_adu_has_zero_transaction_and_protocol_id() {
        let adu = Adu::serial(1, Pdu::normal(0x03, &[0, 0, 0, 10]).unwrap());
        assert_eq!(adu.transaction_id, 0);
        assert_eq!(adu.protocol_id, 0);
        assert!(!adu.is_broadcast());
    }

    #[test]
    fn unit_id_zero_is_broadcast() {
        let adu = Adu::serial(0, Pdu::exception(0x06, ModbusException::IllegalDataValue));
        assert!(adu.is_broadcast());
    }

    #[test]
    fn tcp_adu_keeps_transaction_id() {
        let adu = Adu::tcp(1, Pdu::normal(0x03, &[0, 0, 0, 10]).unwrap(), 42);
        assert_eq!(adu.transaction_id, 42);
        assert_eq!(adu.protocol_id, 0);
    }
}
