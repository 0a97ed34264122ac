//! TCP framing: 7-byte MBAP header + PDU, framed by the header's length
//! field.

use crate::adu::Adu;
use crate::error::Error;
use crate::limits::{MBAP_HEADER_LEN, TCP_FRAME_MAX, TCP_FRAME_MIN};
use crate::pdu::Pdu;
use heapless::Vec;

/// Build an MBAP + PDU frame for `adu` into `out`. Returns the number of
/// bytes written.
pub fn build_frame(adu: &Adu, out: &mut [u8]) -> Result<usize, Error> {
    if out.len() < MBAP_HEADER_LEN {
        return Err(Error::BufferOverflow);
    }
    let pdu_len = adu.pdu.serialize(&mut out[MBAP_HEADER_LEN..])?;
    let total = MBAP_HEADER_LEN + pdu_len;
    if total > TCP_FRAME_MAX {
        return Err(Error::BufferOverflow);
    }
    let length = (1 + pdu_len) as u16;
    out[0..2].copy_from_slice(&adu.transaction_id.to_be_bytes());
    out[2..4].copy_from_slice(&adu.protocol_id.to_be_bytes());
    out[4..6].copy_from_slice(&length.to_be_bytes());
    out[6] = adu.unit_id;
    Ok(total)
}

/// Parse a complete MBAP + PDU frame into an [`Adu`].
pub fn parse_frame(frame: &[u8]) -> Result<Adu, Error> {
    if frame.len() < TCP_FRAME_MIN || frame.len() > TCP_FRAME_MAX {
        return Err(Error::Frame);
    }
    let transaction_id = u16::from_be_bytes([frame[0], frame[1]]);
    let protocol_id = u16::from_be_bytes([frame[2], frame[3]]);
    if protocol_id != 0 {
        return Err(Error::Frame);
    }
    let length = u16::from_be_bytes([frame[4], frame[5]]) as usize;
    if length != frame.len() - 6 {
        return Err(Error::Frame);
    }
    let unit_id = frame[6];
    let pdu = Pdu::deserialize(&frame[7..7 + (length - 1)])?;
    Ok(Adu {
        unit_id,
        pdu,
        transaction_id,
        protocol_id,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TcpState {
    Header,
    Pdu,
    Complete,
    Error,
}

/// Byte-stream-fed TCP frame boundary detector. Accepts chunks of
/// any size via repeated [`TcpReceiver::feed`] calls.
pub struct TcpReceiver {
    state: TcpState,
    buffer: Vec<u8, TCP_FRAME_MAX>,
    expected_total: usize,
    first_byte_time_ms: Option<u64>,
    timeout_ms: u64,
    error: Option<Error>,
}

impl TcpReceiver {
    pub fn new(timeout_ms: u64) -> Self {
        TcpReceiver {
            state: TcpState::Header,
            buffer: Vec::new(),
            expected_total: MBAP_HEADER_LEN,
            first_byte_time_ms: None,
            timeout_ms,
            error: None,
        }
    }

    pub fn state(&self) -> TcpState {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = TcpState::Header;
        self.buffer.clear();
        self.expected_total = MBAP_HEADER_LEN;
        self.first_byte_time_ms = None;
        self.error = None;
    }

    fn fail(&mut self, error: Error) {
        #[cfg(feature = "defmt")]
        defmt::warn!("TCP frame rejected: {=u8}", error as u8);
        self.state = TcpState::Error;
        self.error = Some(error);
    }

    /// Feed a chunk of inbound bytes at timestamp `now_ms`.
    pub fn feed(&mut self, chunk: &[u8], now_ms: u64) {
        if matches!(self.state, TcpState::Complete | TcpState::Error) {
            return;
        }
        if self.first_byte_time_ms.is_none() && !chunk.is_empty() {
            self.first_byte_time_ms = Some(now_ms);
        }
        for &b in chunk {
            if matches!(self.state, TcpState::Complete | TcpState::Error) {
                return;
            }
            if self.buffer.push(b).is_err() {
                self.fail(Error::BufferOverflow);
                return;
            }
            if self.state == TcpState::Header && self.buffer.len() == MBAP_HEADER_LEN {
                if let Err(e) = self.validate_header() {
                    self.fail(e);
                    return;
                }
                self.state = TcpState::Pdu;
            }
            if self.state == TcpState::Pdu && self.buffer.len() == self.expected_total {
                self.state = TcpState::Complete;
            }
        }
    }

    fn validate_header(&mut self) -> Result<(), Error> {
        let protocol_id = u16::from_be_bytes([self.buffer[2], self.buffer[3]]);
        if protocol_id != 0 {
            return Err(Error::Frame);
        }
        let length = u16::from_be_bytes([self.buffer[4], self.buffer[5]]) as usize;
        if !(2..=254).contains(&length) {
            return Err(Error::Frame);
        }
        let expected_total = 6 + length;
        if expected_total > TCP_FRAME_MAX {
            return Err(Error::Frame);
        }
        self.expected_total = expected_total;
        Ok(())
    }

    /// Poll for a receive timeout without new bytes having arrived.
    pub fn poll(&mut self, now_ms: u64) {
        if matches!(self.state, TcpState::Complete | TcpState::Error) {
            return;
        }
        if let Some(first) = self.first_byte_time_ms {
            if now_ms.wrapping_sub(first) >= self.timeout_ms {
                self.fail(Error::Timeout);
            }
        }
    }

    pub fn frame(&self) -> Option<&[u8]> {
        matches!(self.state, TcpState::Complete).then_some(self.buffer.as_slice())
    }

    pub fn error(&self) -> Option<Error> {
        self.error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::FunctionCode;

    #[test]
    fn fc03_request_parses_correctly() {
        // FC03 TCP request, as it would appear on the wire.
        let frame = [0x00, 0x01, 0x00, 0x00, 0x00, 0x06, 0x01, 0x03, 0x00, 0x00, 0x00, 0x0A];
        let adu = parse_frame(&frame).unwrap();
        assert_eq!(adu.transaction_id, 1);
        assert_eq!(adu.protocol_id, 0);
        assert_eq!(adu.unit_id, 1);
        assert_eq!(adu.pdu.function_code, FunctionCode::READ_HOLDING_REGISTERS);
        assert_eq!(adu.pdu.data(), Some(&[0x00, 0x00, 0x00, 0x0A][..]));
    }

    #[test]
    fn wrong_protocol_id_is_rejected() {
        let frame = [0x00, 0x01, 0x00, 0x01, 0x00, 0x06, 0x01, 0x03, 0x00, 0x00, 0x00, 0x0A];
        assert_eq!(parse_frame(&frame), Err(Error::Frame));
    }

    #[test]
    fn wrong_length_field_is_rejected() {
        let frame = [0x00, 0x01, 0x00, 0x00, 0x00, 0x10, 0x01, 0x03, 0x00, 0x00, 0x00, 0x0A];
        assert_eq!(parse_frame(&frame), Err(Error::Frame));
    }

    #[test]
    fn build_then_parse_round_trips() {
        let pdu = Pdu::normal(0x03, &[0x00, 0x00, 0x00, 0x0A]).unwrap();
        let adu = Adu::tcp(1, pdu, 0x0001);
        let mut buf = [0u8; TCP_FRAME_MAX];
        let n = build_frame(&adu, &mut buf).unwrap();
        assert_eq!(
            &buf[..n],
            &[0x00, 0x01, 0x00, 0x00, 0x00, 0x06, 0x01, 0x03, 0x00, 0x00, 0x00, 0x0A]
        );
        assert_eq!(parse_frame(&buf[..n]).unwrap(), adu);
    }

    #[test]
    fn receiver_assembles_across_chunks() {
        let frame = [0x00, 0x01, 0x00, 0x00, 0x00, 0x06, 0x01, 0x03, 0x00, 0x00, 0x00, 0x0A];
        let mut rx = TcpReceiver::new(1000);
        rx.feed(&frame[..3], 0);
        assert_eq!(rx.state(), TcpState::Header);
        rx.feed(&frame[3..9], 1);
        assert_eq!(rx.state(), TcpState::Pdu);
        rx.feed(&frame[9..], 2);
        assert_eq!(rx.state(), TcpState::Complete);
        assert_eq!(rx.frame(), Some(&frame[..]));
    }

    #[test]
    fn receiver_rejects_bad_protocol_id_at_header_boundary() {
        let frame = [0x00, 0x01, 0x00, 0x01, 0x00, 0x06, 0x01, 0x03, 0x00, 0x00, 0x00, 0x0A];
        let mut rx = TcpReceiver::new(1000);
        rx.feed(&frame, 0);
        assert_eq!(rx.state(), TcpState::Error);
        assert_eq!(rx.error(), Some(Error::Frame));
    }

    #[test]
    fn receiver_times_out_on_a_stalled_header() {
        let mut rx = TcpReceiver::new(100);
        rx.feed(&[0x00, 0x01], 0);
        rx.poll(500);
        assert_eq!(rx.state(), TcpState::Error);
        assert_eq!(rx.error(), Some(Error::Timeout));
    }
}
