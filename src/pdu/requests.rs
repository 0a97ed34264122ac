//! Per-function-code request/response encode and decode.
//!
//! Every `encode_*` builds a [`Pdu`] from already-validated Rust values
//! and re-validates the same ranges defensively (a master building a
//! bogus request should fail locally rather than put garbage on the
//! wire). Every `decode_*` takes a [`Pdu`] already produced by
//! [`Pdu::deserialize`] and extracts a typed request/response, returning
//! `Error::Frame` for anything that doesn't parse or violates an FC's
//! own limits: an illegal FC05 value, for instance, decodes to
//! `Error::Frame`, which the server core turns into an
//! `IllegalDataValue` exception response.

use crate::error::Error;
use crate::limits::{MAX_READ_BITS, MAX_READ_REGISTERS, MAX_WRITE_COILS, MAX_WRITE_REGISTERS};
use crate::pdu::Pdu;
use heapless::Vec;

/// Number of bytes needed to bit-pack `quantity` coils, LSB-first.
pub const fn byte_count_for_bits(quantity: u16) -> usize {
    (quantity as usize + 7) / 8
}

fn be16(hi: u8, lo: u8) -> u16 {
    u16::from_be_bytes([hi, lo])
}

// ---------------------------------------------------------------------
// FC01 / FC02 — Read Coils / Read Discrete Inputs
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadBitsRequest {
    pub start: u16,
    pub quantity: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadBitsResponse {
    pub values: Vec<u8, 250>,
}

pub fn encode_read_bits_request(function_code: u8, start: u16, quantity: u16) -> Result<Pdu, Error> {
    if quantity == 0 || quantity > MAX_READ_BITS {
        return Err(Error::InvalidParam);
    }
    let mut data = [0u8; 4];
    data[0..2].copy_from_slice(&start.to_be_bytes());
    data[2..4].copy_from_slice(&quantity.to_be_bytes());
    Pdu::normal(function_code, &data)
}

pub fn decode_read_bits_request(pdu: &Pdu) -> Result<ReadBitsRequest, Error> {
    let data = pdu.data().ok_or(Error::Frame)?;
    if data.len() != 4 {
        return Err(Error::Frame);
    }
    let start = be16(data[0], data[1]);
    let quantity = be16(data[2], data[3]);
    if quantity == 0 || quantity > MAX_READ_BITS {
        return Err(Error::Frame);
    }
    Ok(ReadBitsRequest { start, quantity })
}

/// Build a read-bits response PDU: `byte_count + bit-packed values`,
/// LSB-first within each byte.
pub fn encode_read_bits_response(function_code: u8, packed: &[u8]) -> Result<Pdu, Error> {
    if packed.len() > u8::MAX as usize {
        return Err(Error::BufferOverflow);
    }
    let mut data: Vec<u8, 252> = Vec::new();
    data.push(packed.len() as u8).map_err(|_| Error::BufferOverflow)?;
    data.extend_from_slice(packed).map_err(|_| Error::BufferOverflow)?;
    Pdu::normal(function_code, &data)
}

pub fn decode_read_bits_response(pdu: &Pdu) -> Result<ReadBitsResponse, Error> {
    let data = pdu.data().ok_or(Error::Frame)?;
    let byte_count = *data.first().ok_or(Error::Frame)? as usize;
    let rest = &data[1..];
    if rest.len() != byte_count {
        return Err(Error::Frame);
    }
    let mut values = Vec::new();
    values.extend_from_slice(rest).map_err(|_| Error::BufferOverflow)?;
    Ok(ReadBitsResponse { values })
}

// ---------------------------------------------------------------------
// FC03 / FC04 — Read Holding / Input Registers
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadRegistersRequest {
    pub start: u16,
    pub quantity: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRegistersResponse {
    pub values: Vec<u16, 125>,
}

pub fn encode_read_registers_request(
    function_code: u8,
    start: u16,
    quantity: u16,
) -> Result<Pdu, Error> {
    if quantity == 0 || quantity > MAX_READ_REGISTERS {
        return Err(Error::InvalidParam);
    }
    let mut data = [0u8; 4];
    data[0..2].copy_from_slice(&start.to_be_bytes());
    data[2..4].copy_from_slice(&quantity.to_be_bytes());
    Pdu::normal(function_code, &data)
}

pub fn decode_read_registers_request(pdu: &Pdu) -> Result<ReadRegistersRequest, Error> {
    let data = pdu.data().ok_or(Error::Frame)?;
    if data.len() != 4 {
        return Err(Error::Frame);
    }
    let start = be16(data[0], data[1]);
    let quantity = be16(data[2], data[3]);
    if quantity == 0 || quantity > MAX_READ_REGISTERS {
        return Err(Error::Frame);
    }
    Ok(ReadRegistersRequest { start, quantity })
}

/// Build a read-registers response PDU: `byte_count + big-endian
/// registers`.
pub fn encode_read_registers_response(function_code: u8, values: &[u16]) -> Result<Pdu, Error> {
    let byte_count = values.len() * 2;
    if byte_count > u8::MAX as usize {
        return Err(Error::BufferOverflow);
    }
    let mut data: Vec<u8, 252> = Vec::new();
    data.push(byte_count as u8).map_err(|_| Error::BufferOverflow)?;
    for &v in values {
        data.extend_from_slice(&v.to_be_bytes()).map_err(|_| Error::BufferOverflow)?;
    }
    Pdu::normal(function_code, &data)
}

pub fn decode_read_registers_response(pdu: &Pdu) -> Result<ReadRegistersResponse, Error> {
    let data = pdu.data().ok_or(Error::Frame)?;
    let byte_count = *data.first().ok_or(Error::Frame)? as usize;
    let rest = &data[1..];
    if rest.len() != byte_count || byte_count % 2 != 0 {
        return Err(Error::Frame);
    }
    let mut values = Vec::new();
    for chunk in rest.chunks_exact(2) {
        values.push(be16(chunk[0], chunk[1])).map_err(|_| Error::BufferOverflow)?;
    }
    Ok(ReadRegistersResponse { values })
}

// ---------------------------------------------------------------------
// FC05 — Write Single Coil
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteSingleCoilRequest {
    pub address: u16,
    pub value: bool,
}

const COIL_ON: u16 = 0xFF00;
const COIL_OFF: u16 = 0x0000;

fn decode_coil_value(raw: u16) -> Result<bool, Error> {
    match raw {
        COIL_ON => Ok(true),
        COIL_OFF => Ok(false),
        _ => Err(Error::Frame),
    }
}

fn encode_coil_value(value: bool) -> u16 {
    if value {
        COIL_ON
    } else {
        COIL_OFF
    }
}

pub fn encode_write_single_coil_request(
    function_code: u8,
    address: u16,
    value: bool,
) -> Result<Pdu, Error> {
    let mut data = [0u8; 4];
    data[0..2].copy_from_slice(&address.to_be_bytes());
    data[2..4].copy_from_slice(&encode_coil_value(value).to_be_bytes());
    Pdu::normal(function_code, &data)
}

pub fn decode_write_single_coil_request(pdu: &Pdu) -> Result<WriteSingleCoilRequest, Error> {
    let data = pdu.data().ok_or(Error::Frame)?;
    if data.len() != 4 {
        return Err(Error::Frame);
    }
    let address = be16(data[0], data[1]);
    let value = decode_coil_value(be16(data[2], data[3]))?;
    Ok(WriteSingleCoilRequest { address, value })
}

/// Echo the address and a canonicalized value, as FC05 responses do.
pub fn encode_write_single_coil_response(
    function_code: u8,
    address: u16,
    value: bool,
) -> Result<Pdu, Error> {
    encode_write_single_coil_request(function_code, address, value)
}

pub fn decode_write_single_coil_response(pdu: &Pdu) -> Result<WriteSingleCoilRequest, Error> {
    decode_write_single_coil_request(pdu)
}

// ---------------------------------------------------------------------
// FC06 — Write Single Register
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteSingleRegisterRequest {
    pub address: u16,
    pub value: u16,
}

pub fn encode_write_single_register_request(
    function_code: u8,
    address: u16,
    value: u16,
) -> Result<Pdu, Error> {
    let mut data = [0u8; 4];
    data[0..2].copy_from_slice(&address.to_be_bytes());
    data[2..4].copy_from_slice(&value.to_be_bytes());
    Pdu::normal(function_code, &data)
}

pub fn decode_write_single_register_request(
    pdu: &Pdu,
) -> Result<WriteSingleRegisterRequest, Error> {
    let data = pdu.data().ok_or(Error::Frame)?;
    if data.len() != 4 {
        return Err(Error::Frame);
    }
    Ok(WriteSingleRegisterRequest {
        address: be16(data[0], data[1]),
        value: be16(data[2], data[3]),
    })
}

pub fn encode_write_single_register_response(
    function_code: u8,
    address: u16,
    value: u16,
) -> Result<Pdu, Error> {
    encode_write_single_register_request(function_code, address, value)
}

pub fn decode_write_single_register_response(
    pdu: &Pdu,
) -> Result<WriteSingleRegisterRequest, Error> {
    decode_write_single_register_request(pdu)
}

// ---------------------------------------------------------------------
// FC15 — Write Multiple Coils
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteMultipleCoilsRequest {
    pub start: u16,
    pub quantity: u16,
    pub values: Vec<u8, 246>,
}

pub fn encode_write_multiple_coils_request(
    function_code: u8,
    start: u16,
    quantity: u16,
    packed: &[u8],
) -> Result<Pdu, Error> {
    if quantity == 0 || quantity > MAX_WRITE_COILS {
        return Err(Error::InvalidParam);
    }
    let expected_bytes = byte_count_for_bits(quantity);
    if packed.len() != expected_bytes || expected_bytes > u8::MAX as usize {
        return Err(Error::InvalidParam);
    }
    let mut data: Vec<u8, 252> = Vec::new();
    data.extend_from_slice(&start.to_be_bytes()).map_err(|_| Error::BufferOverflow)?;
    data.extend_from_slice(&quantity.to_be_bytes()).map_err(|_| Error::BufferOverflow)?;
    data.push(packed.len() as u8).map_err(|_| Error::BufferOverflow)?;
    data.extend_from_slice(packed).map_err(|_| Error::BufferOverflow)?;
    Pdu::normal(function_code, &data)
}

pub fn decode_write_multiple_coils_request(pdu: &Pdu) -> Result<WriteMultipleCoilsRequest, Error> {
    let data = pdu.data().ok_or(Error::Frame)?;
    if data.len() < 5 {
        return Err(Error::Frame);
    }
    let start = be16(data[0], data[1]);
    let quantity = be16(data[2], data[3]);
    let byte_count = data[4] as usize;
    let packed = &data[5..];
    if packed.len() != byte_count {
        return Err(Error::Frame);
    }
    if quantity == 0 || quantity > MAX_WRITE_COILS {
        return Err(Error::Frame);
    }
    // Both the quantity cap and the declared
    // byte_count must independently hold, and must agree with each
    // other.
    if byte_count != byte_count_for_bits(quantity) {
        return Err(Error::Frame);
    }
    let mut values = Vec::new();
    values.extend_from_slice(packed).map_err(|_| Error::BufferOverflow)?;
    Ok(WriteMultipleCoilsRequest {
        start,
        quantity,
        values,
    })
}

// ---------------------------------------------------------------------
// FC16 — Write Multiple Registers
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteMultipleRegistersRequest {
    pub start: u16,
    pub quantity: u16,
    pub values: Vec<u16, 123>,
}

pub fn encode_write_multiple_registers_request(
    function_code: u8,
    start: u16,
    quantity: u16,
    values: &[u16],
) -> Result<Pdu, Error> {
    if quantity == 0 || quantity > MAX_WRITE_REGISTERS {
        return Err(Error::InvalidParam);
    }
    if values.len() != quantity as usize {
        return Err(Error::InvalidParam);
    }
    let byte_count = values.len() * 2;
    if byte_count > u8::MAX as usize {
        return Err(Error::InvalidParam);
    }
    let mut data: Vec<u8, 252> = Vec::new();
    data.extend_from_slice(&start.to_be_bytes()).map_err(|_| Error::BufferOverflow)?;
    data.extend_from_slice(&quantity.to_be_bytes()).map_err(|_| Error::BufferOverflow)?;
    data.push(byte_count as u8).map_err(|_| Error::BufferOverflow)?;
    for &v in values {
        data.extend_from_slice(&v.to_be_bytes()).map_err(|_| Error::BufferOverflow)?;
    }
    Pdu::normal(function_code, &data)
}

pub fn decode_write_multiple_registers_request(
    pdu: &Pdu,
) -> Result<WriteMultipleRegistersRequest, Error> {
    let data = pdu.data().ok_or(Error::Frame)?;
    if data.len() < 5 {
        return Err(Error::Frame);
    }
    let start = be16(data[0], data[1]);
    let quantity = be16(data[2], data[3]);
    let byte_count = data[4] as usize;
    let reg_bytes = &data[5..];
    if reg_bytes.len() != byte_count {
        return Err(Error::Frame);
    }
    if quantity == 0 || quantity > MAX_WRITE_REGISTERS {
        return Err(Error::Frame);
    }
    if byte_count != quantity as usize * 2 {
        return Err(Error::Frame);
    }
    let mut values = Vec::new();
    for chunk in reg_bytes.chunks_exact(2) {
        values.push(be16(chunk[0], chunk[1])).map_err(|_| Error::BufferOverflow)?;
    }
    Ok(WriteMultipleRegistersRequest {
        start,
        quantity,
        values,
    })
}

// ---------------------------------------------------------------------
// FC15 / FC16 response — both echo start address and quantity
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteMultipleResponse {
    pub start: u16,
    pub quantity: u16,
}

pub fn encode_write_multiple_response(
    function_code: u8,
    start: u16,
    quantity: u16,
) -> Result<Pdu, Error> {
    let mut data = [0u8; 4];
    data[0..2].copy_from_slice(&start.to_be_bytes());
    data[2..4].copy_from_slice(&quantity.to_be_bytes());
    Pdu::normal(function_code, &data)
}

pub fn decode_write_multiple_response(pdu: &Pdu) -> Result<WriteMultipleResponse, Error> {
    let data = pdu.data().ok_or(Error::Frame)?;
    if data.len() != 4 {
        return Err(Error::Frame);
    }
    Ok(WriteMultipleResponse {
        start: be16(data[0], data[1]),
        quantity: be16(data[2], data[3]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::FunctionCode;

    #[test]
    fn read_bits_request_round_trips() {
        let pdu = encode_read_bits_request(FunctionCode::READ_COILS, 0x0000, 10).unwrap();
        let req = decode_read_bits_request(&pdu).unwrap();
        assert_eq!(req, ReadBitsRequest { start: 0, quantity: 10 });
    }

    #[test]
    fn read_bits_request_rejects_out_of_range_quantity() {
        assert_eq!(
            encode_read_bits_request(FunctionCode::READ_COILS, 0, 0),
            Err(Error::InvalidParam)
        );
        assert_eq!(
            encode_read_bits_request(FunctionCode::READ_COILS, 0, 2001),
            Err(Error::InvalidParam)
        );
    }

    #[test]
    fn read_bits_response_all_zero_10_registers_style_byte_count() {
        // byte_count math for an all-zero read, mirroring the register case below.
        let packed = [0u8; 2];
        let pdu = encode_read_bits_response(FunctionCode::READ_COILS, &packed).unwrap();
        let mut buf = [0u8; 8];
        let n = pdu.serialize(&mut buf).unwrap();
        assert_eq!(&buf[..n], &[0x01, 0x02, 0x00, 0x00]);
    }

    #[test]
    fn read_registers_response_for_ten_zero_registers() {
        // FC03 response for 10 registers, all zero.
        let values = [0u16; 10];
        let pdu = encode_read_registers_response(FunctionCode::READ_HOLDING_REGISTERS, &values)
            .unwrap();
        let mut buf = [0u8; 32];
        let n = pdu.serialize(&mut buf).unwrap();
        assert_eq!(n, 2 + 20);
        assert_eq!(buf[0], 0x03);
        assert_eq!(buf[1], 0x14);
        assert!(buf[2..n].iter().all(|&b| b == 0));
    }

    #[test]
    fn write_single_coil_value_must_be_canonical() {
        // FC05 with an illegal coil value (neither 0x0000 nor 0xFF00).
        let bad = Pdu::normal(FunctionCode::WRITE_SINGLE_COIL, &[0x00, 0xAC, 0x12, 0x34]).unwrap();
        assert_eq!(decode_write_single_coil_request(&bad), Err(Error::Frame));
    }

    #[test]
    fn write_single_coil_round_trips_on_and_off() {
        let on = encode_write_single_coil_request(FunctionCode::WRITE_SINGLE_COIL, 172, true)
            .unwrap();
        assert_eq!(
            decode_write_single_coil_request(&on).unwrap(),
            WriteSingleCoilRequest { address: 172, value: true }
        );
        let off = encode_write_single_coil_request(FunctionCode::WRITE_SINGLE_COIL, 172, false)
            .unwrap();
        assert_eq!(
            decode_write_single_coil_request(&off).unwrap(),
            WriteSingleCoilRequest { address: 172, value: false }
        );
    }

    #[test]
    fn write_multiple_coils_cross_validates_byte_count_and_quantity() {
        let pdu = Pdu::normal(
            FunctionCode::WRITE_MULTIPLE_COILS,
            &[0x00, 0x00, 0x00, 0x0A, 0x01, 0xFF],
        )
        .unwrap();
        // byte_count=1 but quantity=10 needs byte_count=2: must fail.
        assert_eq!(decode_write_multiple_coils_request(&pdu), Err(Error::Frame));
    }

    #[test]
    fn write_multiple_coils_round_trips() {
        let packed = [0xCD, 0x01];
        let pdu = encode_write_multiple_coils_request(
            FunctionCode::WRITE_MULTIPLE_COILS,
            0x0013,
            10,
            &packed,
        )
        .unwrap();
        let req = decode_write_multiple_coils_request(&pdu).unwrap();
        assert_eq!(req.start, 0x0013);
        assert_eq!(req.quantity, 10);
        assert_eq!(req.values.as_slice(), &packed);
    }

    #[test]
    fn write_multiple_registers_round_trips() {
        let values = [0x0001u16, 0x0002, 0x0003];
        let pdu = encode_write_multiple_registers_request(
            FunctionCode::WRITE_MULTIPLE_REGISTERS,
            0x0000,
            3,
            &values,
        )
        .unwrap();
        let req = decode_write_multiple_registers_request(&pdu).unwrap();
        assert_eq!(req.start, 0);
        assert_eq!(req.quantity, 3);
        assert_eq!(req.values.as_slice(), &values);
    }

    #[test]
    fn write_multiple_registers_rejects_out_of_range_quantity() {
        let values = [0u16; 124];
        assert_eq!(
            encode_write_multiple_registers_request(
                FunctionCode::WRITE_MULTIPLE_REGISTERS,
                0,
                124,
                &values
            ),
            Err(Error::InvalidParam)
        );
    }

    #[test]
    fn write_multiple_response_echoes_start_and_quantity() {
        let pdu =
            encode_write_multiple_response(FunctionCode::WRITE_MULTIPLE_COILS, 0x0013, 10)
                .unwrap();
        let resp = decode_write_multiple_response(&pdu).unwrap();
        assert_eq!(resp, WriteMultipleResponse { start: 0x0013, quantity: 10 });
    }
}
