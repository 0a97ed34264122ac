//! ASCII framing: `:` + hex-encoded `{unit_id, PDU, LRC}` + CR LF,
//! delimiter-framed.

use crate::adu::Adu;
use crate::error::Error;
use crate::limits::{ASCII_FRAME_MAX, ASCII_FRAME_MIN, MAX_PDU_LEN};
use crate::lrc::{ascii_to_binary, binary_to_ascii, lrc, lrc_verify};
use crate::pdu::Pdu;
use heapless::Vec;

const MAX_BINARY_LEN: usize = 1 + MAX_PDU_LEN + 1; // unit_id + pdu + lrc

/// Build an ASCII frame for `adu` into `out`. Returns the number of
/// bytes written, including the leading `:` and trailing CR LF.
pub fn build_frame(adu: &Adu, out: &mut [u8]) -> Result<usize, Error> {
    let mut bin: Vec<u8, MAX_BINARY_LEN> = Vec::new();
    bin.push(adu.unit_id).map_err(|_| Error::BufferOverflow)?;
    let mut pdu_buf = [0u8; MAX_PDU_LEN];
    let pdu_len = adu.pdu.serialize(&mut pdu_buf)?;
    bin.extend_from_slice(&pdu_buf[..pdu_len])
        .map_err(|_| Error::BufferOverflow)?;
    bin.push(lrc(&bin)).map_err(|_| Error::BufferOverflow)?;

    let needed = 1 + bin.len() * 2 + 2;
    if needed > ASCII_FRAME_MAX || out.len() < needed {
        return Err(Error::BufferOverflow);
    }
    out[0] = b':';
    let hex_len = binary_to_ascii(&bin, &mut out[1..1 + bin.len() * 2])?;
    let cr = 1 + hex_len;
    out[cr] = b'\r';
    out[cr + 1] = b'\n';
    Ok(cr + 2)
}

/// Parse a complete ASCII frame (including `:` and trailing CR LF) into
/// an [`Adu`].
pub fn parse_frame(frame: &[u8]) -> Result<Adu, Error> {
    if frame.len() < ASCII_FRAME_MIN || frame.len() > ASCII_FRAME_MAX {
        return Err(Error::Frame);
    }
    if frame[0] != b':' || &frame[frame.len() - 2..] != b"\r\n" {
        return Err(Error::Frame);
    }
    let hex_body = &frame[1..frame.len() - 2];
    if hex_body.len() % 2 != 0 {
        return Err(Error::Frame);
    }
    let mut bin: Vec<u8, MAX_BINARY_LEN> = Vec::new();
    bin.resize_default(hex_body.len() / 2)
        .map_err(|_| Error::BufferOverflow)?;
    ascii_to_binary(hex_body, &mut bin)?;
    if !lrc_verify(&bin) {
        #[cfg(feature = "defmt")]
        defmt::warn!("ASCII frame rejected: LRC mismatch");
        return Err(Error::Crc);
    }
    let unit_id = bin[0];
    let pdu = Pdu::deserialize(&bin[1..bin.len() - 1])?;
    Ok(Adu::serial(unit_id, pdu))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AsciiState {
    Idle,
    Receiving,
    CrReceived,
    Complete,
    Error,
}

/// Char-fed ASCII frame boundary detector.
pub struct AsciiReceiver {
    state: AsciiState,
    buffer: Vec<u8, ASCII_FRAME_MAX>,
    start_time_ms: u64,
    timeout_ms: u64,
    error: Option<Error>,
}

impl AsciiReceiver {
    pub fn new(timeout_ms: u64) -> Self {
        AsciiReceiver {
            state: AsciiState::Idle,
            buffer: Vec::new(),
            start_time_ms: 0,
            timeout_ms,
            error: None,
        }
    }

    pub fn state(&self) -> AsciiState {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = AsciiState::Idle;
        self.buffer.clear();
        self.error = None;
    }

    fn restart(&mut self, now_ms: u64) {
        self.buffer.clear();
        let _ = self.buffer.push(b':');
        self.start_time_ms = now_ms;
        self.state = AsciiState::Receiving;
    }

    /// Feed one received character at timestamp `now_ms` (a monotonic
    /// millisecond clock).
    pub fn feed_char(&mut self, c: u8, now_ms: u64) {
        match self.state {
            AsciiState::Idle => {
                if c == b':' {
                    self.restart(now_ms);
                }
            }
            AsciiState::Receiving => match c {
                b':' => self.restart(now_ms),
                b'\r' => {
                    if self.buffer.push(c).is_err() {
                        self.fail(Error::BufferOverflow);
                        return;
                    }
                    self.state = AsciiState::CrReceived;
                }
                _ => {
                    if self.buffer.push(c).is_err() {
                        self.fail(Error::BufferOverflow);
                    }
                }
            },
            AsciiState::CrReceived => match c {
                b'\n' => {
                    if self.buffer.push(c).is_err() {
                        self.fail(Error::BufferOverflow);
                        return;
                    }
                    self.state = AsciiState::Complete;
                }
                b':' => self.restart(now_ms),
                _ => self.fail(Error::Frame),
            },
            AsciiState::Complete | AsciiState::Error => {}
        }
    }

    fn fail(&mut self, error: Error) {
        #[cfg(feature = "defmt")]
        defmt::warn!("ASCII frame rejected: {=u8}", error as u8);
        self.state = AsciiState::Error;
        self.error = Some(error);
    }

    /// Poll for a receive timeout without a new character having
    /// arrived.
    pub fn poll(&mut self, now_ms: u64) {
        if matches!(self.state, AsciiState::Idle | AsciiState::Complete | AsciiState::Error) {
            return;
        }
        if now_ms.wrapping_sub(self.start_time_ms) >= self.timeout_ms {
            self.fail(Error::Timeout);
        }
    }

    pub fn frame(&self) -> Option<&[u8]> {
        matches!(self.state, AsciiState::Complete).then_some(self.buffer.as_slice())
    }

    pub fn error(&self) -> Option<Error> {
        self.error
    }
}
