// Card reader event source

mod monitor;

pub use monitor::CardMonitor;

#[cfg(test)]
mod tests;

use std::fmt;
use std::time::Duration;

/// GET DATA command returning the card UID
pub const GET_UID_APDU: [u8; 5] = [0xFF, 0xCA, 0x00, 0x00, 0x00];

/// Status word appended to a successful reader response
const STATUS_OK: [u8; 2] = [0x90, 0x00];

/// Reader state reported after a change
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReaderState {
    /// No card on the reader
    pub empty: bool,
    /// A card is on the reader
    pub present: bool,
}

/// Events emitted by the card monitor
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CardEvent {
    Inserted,
    Removed,
    /// UID read from the inserted card (lowercase hex)
    Read(String),
}

/// Driver boundary for a smart-card reader.
///
/// Implementations wrap the platform's reader API; the monitor only needs to
/// wait for state changes and exchange one command.
pub trait CardReader: Send + 'static {
    /// Block up to `timeout` for a state change. `Ok(None)` means the wait timed out.
    fn wait_for_change(&mut self, timeout: Duration) -> Result<Option<ReaderState>, CardError>;

    /// Send an APDU to the card on the reader and return the raw response
    fn transmit(&mut self, apdu: &[u8]) -> Result<Vec<u8>, CardError>;
}

/// Card reader errors
#[derive(Debug, Clone, PartialEq)]
pub enum CardError {
    /// Response shorter than a status word
    ShortResponse(usize),
    /// Reader reported a non-success status word
    Status(u8, u8),
    /// Successful response carrying no UID bytes
    NoUid,
    /// Driver-level failure
    Reader(String),
}

impl fmt::Display for CardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardError::ShortResponse(len) => {
                write!(f, "reader response too short ({} bytes)", len)
            }
            CardError::Status(sw1, sw2) => {
                write!(f, "reader returned status {:02x}{:02x}", sw1, sw2)
            }
            CardError::NoUid => write!(f, "reader response carried no UID"),
            CardError::Reader(msg) => write!(f, "reader failure: {}", msg),
        }
    }
}

impl std::error::Error for CardError {}

/// Decode a GET UID response into a lowercase hex UID.
///
/// UID bytes are folded big-endian into a u64; bytes beyond the eighth push
/// the leading ones out.
pub fn decode_uid(response: &[u8]) -> Result<String, CardError> {
    if response.len() < 2 {
        return Err(CardError::ShortResponse(response.len()));
    }

    let (uid, status) = response.split_at(response.len() - 2);
    if status != STATUS_OK {
        return Err(CardError::Status(status[0], status[1]));
    }
    if uid.is_empty() {
        return Err(CardError::NoUid);
    }

    let raw = uid.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b));
    Ok(format!("{:x}", raw))
}

/// Ask the card on `reader` for its UID
pub fn read_uid<R: CardReader + ?Sized>(reader: &mut R) -> Result<String, CardError> {
    let response = reader.transmit(&GET_UID_APDU)?;
    decode_uid(&response)
}
