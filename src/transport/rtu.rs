//! RTU framing: `unit_id | PDU | CRC16(lo,hi)`, framed by inter-character
//! and inter-frame timing gaps.

use crate::adu::Adu;
use crate::crc::{crc16_append, crc16_verify};
use crate::error::Error;
use crate::limits::{RTU_FRAME_MAX, RTU_FRAME_MIN};
use crate::pdu::Pdu;
use heapless::Vec;

/// Build an RTU frame for `adu` into `out`. Returns the number of bytes
/// written.
pub fn build_frame(adu: &Adu, out: &mut [u8]) -> Result<usize, Error> {
    if out.is_empty() {
        return Err(Error::BufferOverflow);
    }
    out[0] = adu.unit_id;
    let pdu_len = adu.pdu.serialize(&mut out[1..])?;
    let total = 1 + pdu_len + 2;
    if total > RTU_FRAME_MAX || out.len() < total {
        return Err(Error::BufferOverflow);
    }
    crc16_append(out, 1 + pdu_len);
    Ok(total)
}

/// Parse a complete RTU frame into an [`Adu`].
pub fn parse_frame(frame: &[u8]) -> Result<Adu, Error> {
    if frame.len() < RTU_FRAME_MIN || frame.len() > RTU_FRAME_MAX {
        return Err(Error::Frame);
    }
    if !crc16_verify(frame) {
        #[cfg(feature = "defmt")]
        defmt::warn!("RTU frame rejected: CRC mismatch");
        return Err(Error::Crc);
    }
    let unit_id = frame[0];
    let pdu = Pdu::deserialize(&frame[1..frame.len() - 2])?;
    Ok(Adu::serial(unit_id, pdu))
}

/// True iff `frame_addr` should accept a frame addressed with
/// `my_addr` — broadcast (0) or an exact match.
pub fn address_match(frame_addr: u8, my_addr: u8) -> bool {
    frame_addr == 0 || frame_addr == my_addr
}

/// `(t_intrachar_us, t_interframe_us)` for a given baud rate. A
/// baud rate above 19200, or exactly 0, uses the fixed 750/1750 μs
/// defaults; otherwise both are derived from the 11-bit character time.
fn timing_for_baud(baud: u32) -> (u64, u64) {
    if baud == 0 || baud > 19200 {
        (750, 1750)
    } else {
        let baud = baud as u64;
        (16_500_000 / baud, 38_500_000 / baud)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RtuState {
    Idle,
    Receiving,
    Complete,
    Error,
}

/// Byte-fed RTU frame boundary detector.
pub struct RtuReceiver {
    state: RtuState,
    buffer: Vec<u8, RTU_FRAME_MAX>,
    last_time_us: u64,
    t_intrachar_us: u64,
    t_interframe_us: u64,
    error: Option<Error>,
}

impl RtuReceiver {
    pub fn new(baudrate: u32) -> Self {
        let (t_intrachar_us, t_interframe_us) = timing_for_baud(baudrate);
        RtuReceiver {
            state: RtuState::Idle,
            buffer: Vec::new(),
            last_time_us: 0,
            t_intrachar_us,
            t_interframe_us,
            error: None,
        }
    }

    pub fn state(&self) -> RtuState {
        self.state
    }

    /// Discard any partial frame and return to `Idle`.
    pub fn reset(&mut self) {
        self.state = RtuState::Idle;
        self.buffer.clear();
        self.error = None;
    }

    fn restart_with(&mut self, byte: u8, now_us: u64) {
        self.buffer.clear();
        // Capacity is RTU_FRAME_MAX and buffer was just cleared.
        let _ = self.buffer.push(byte);
        self.last_time_us = now_us;
        self.state = RtuState::Receiving;
    }

    /// Feed one received byte at timestamp `now_us` (a monotonic
    /// microsecond clock). Bytes fed while `Complete`/`Error` are
    /// ignored until [`RtuReceiver::reset`].
    pub fn feed_byte(&mut self, byte: u8, now_us: u64) {
        match self.state {
            RtuState::Idle => self.restart_with(byte, now_us),
            RtuState::Receiving => {
                if now_us.wrapping_sub(self.last_time_us) > self.t_intrachar_us {
                    // An inter-character gap restarts the buffer with
                    // the current byte rather than discarding it outright.
                    self.restart_with(byte, now_us);
                    return;
                }
                if self.buffer.push(byte).is_err() {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("RTU frame rejected: buffer overflow");
                    self.state = RtuState::Error;
                    self.error = Some(Error::BufferOverflow);
                    return;
                }
                self.last_time_us = now_us;
            }
            RtuState::Complete | RtuState::Error => {}
        }
    }

    /// Poll for an inter-frame gap without a new byte having arrived.
    /// Call this periodically while idle between bytes; it is how a
    /// frame actually reaches `Complete`.
    pub fn poll(&mut self, now_us: u64) {
        if self.state != RtuState::Receiving {
            return;
        }
        if now_us.wrapping_sub(self.last_time_us) >= self.t_interframe_us {
            if self.buffer.len() >= RTU_FRAME_MIN {
                self.state = RtuState::Complete;
            } else {
                #[cfg(feature = "defmt")]
                defmt::warn!("RTU frame rejected: too short at interframe gap");
                self.state = RtuState::Error;
                self.error = Some(Error::Frame);
            }
        }
    }

    /// The assembled frame once `state() == Complete`.
    pub fn frame(&self) -> Option<&[u8]> {
        matches!(self.state, RtuState::Complete).then_some(self.buffer.as_slice())
    }

    /// The failure reason once `state() == Error`.
    pub fn error(&self) -> Option<Error> {
        self.error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exception::ModbusException;
    use crate::function::FunctionCode;

    #[test]
    fn fc03_request_parses_correctly() {
        // FC03 RTU request, as it would appear on the wire.
        let frame = [0x01, 0x03, 0x00, 0x00, 0x00, 0x0A, 0xC5, 0xCD];
        let adu = parse_frame(&frame).unwrap();
        assert_eq!(adu.unit_id, 0x01);
        assert_eq!(adu.pdu.function_code, 0x03);
        assert_eq!(adu.pdu.data(), Some(&[0x00, 0x00, 0x00, 0x0A][..]));
    }

    #[test]
    fn fc03_response_for_ten_zero_registers_is_25_bytes() {
        // FC03 response for 10 registers, all zero.
        let pdu = crate::pdu::requests::encode_read_registers_response(
            FunctionCode::READ_HOLDING_REGISTERS,
            &[0u16; 10],
        )
        .unwrap();
        let adu = Adu::serial(1, pdu);
        let mut buf = [0u8; RTU_FRAME_MAX];
        let n = build_frame(&adu, &mut buf).unwrap();
        assert_eq!(n, 25);
        assert_eq!(buf[0], 0x01);
        assert_eq!(buf[1], 0x03);
        assert_eq!(buf[2], 0x14);
        assert!(buf[3..23].iter().all(|&b| b == 0));
        assert!(crc16_verify(&buf[..n]));
    }

    #[test]
    fn frame_too_short_is_rejected() {
        assert_eq!(parse_frame(&[0x01, 0x03, 0x00]), Err(Error::Frame));
    }

    #[test]
    fn bad_crc_is_rejected() {
        let mut frame = [0x01, 0x03, 0x00, 0x00, 0x00, 0x0A, 0xC5, 0xCD];
        frame[7] ^= 0xFF;
        assert_eq!(parse_frame(&frame), Err(Error::Crc));
    }

    #[test]
    fn exception_pdu_round_trips_through_rtu() {
        let adu = Adu::serial(1, Pdu::exception(0x05, ModbusException::IllegalDataValue));
        let mut buf = [0u8; RTU_FRAME_MAX];
        let n = build_frame(&adu, &mut buf).unwrap();
        let back = parse_frame(&buf[..n]).unwrap();
        assert_eq!(back, adu);
    }

    #[test]
    fn address_match_accepts_broadcast_and_exact() {
        assert!(address_match(0, 5));
        assert!(address_match(5, 5));
        assert!(!address_match(3, 5));
    }

    #[test]
    fn timing_at_19200_matches_spec_approximation() {
        // Inter-frame timing at 19200 baud.
        let (_, interframe) = timing_for_baud(19200);
        assert!((interframe as i64 - 2005).abs() <= 100);
    }

    #[test]
    fn timing_above_19200_is_fixed() {
        let (intrachar, interframe) = timing_for_baud(38400);
        assert_eq!(intrachar, 750);
        assert_eq!(interframe, 1750);
    }

    #[test]
    fn zero_baud_uses_defaults() {
        assert_eq!(timing_for_baud(0), (750, 1750));
    }

    #[test]
    fn receiver_assembles_a_complete_frame() {
        let mut rx = RtuReceiver::new(19200);
        let frame = [0x01u8, 0x03, 0x00, 0x00, 0x00, 0x0A, 0xC5, 0xCD];
        let mut t = 0u64;
        for &b in &frame {
            rx.feed_byte(b, t);
            t += 500;
        }
        rx.poll(t + 3000);
        assert_eq!(rx.state(), RtuState::Complete);
        assert_eq!(rx.frame(), Some(&frame[..]));
    }

    #[test]
    fn inter_character_gap_restarts_the_buffer() {
        let mut rx = RtuReceiver::new(19200);
        rx.feed_byte(0xFF, 0);
        rx.feed_byte(0xEE, 100);
        // Large gap: this starts a fresh frame with the new byte
        // rather than discarding everything.
        rx.feed_byte(0x01, 100_000);
        rx.poll(103_000);
        assert_eq!(rx.state(), RtuState::Error);
    }

    #[test]
    fn short_frame_at_interframe_gap_is_error() {
        let mut rx = RtuReceiver::new(19200);
        rx.feed_byte(0x01, 0);
        rx.feed_byte(0x03, 200);
        rx.poll(10_000);
        assert_eq!(rx.state(), RtuState::Error);
        assert_eq!(rx.error(), Some(Error::Frame));
    }

    #[test]
    fn reset_returns_receiver_to_idle() {
        let mut rx = RtuReceiver::new(19200);
        rx.feed_byte(0x01, 0);
        rx.reset();
        assert_eq!(rx.state(), RtuState::Idle);
    }
}
