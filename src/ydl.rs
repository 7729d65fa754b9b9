use crate::error::YdlError;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Bytes in the `.YDL` file header before the first patch.
pub const HEADER_SIZE: usize = 13;
/// Stride between patch records: 256 byte payload plus 5 bytes of framing.
pub const RECORD_SIZE: usize = 261;
/// Payload bytes of one patch.
pub const PATCH_SIZE: usize = 0x100;
/// Most patches a bank can hold.
pub const MAX_PATCHES: i64 = 100;

const YDL_MAGIC: &[u8] = b"DTAB01d";
const NAME_LEN: usize = 96;

/// Manufacturer sysex start: F0, Yamaha ID, device number, 00.
const MESSAGE_START: [u8; 4] = [0xf0, 0x43, 0x7d, 0x00];
const PATCH_TAG: [u8; 12] = *b"DTA1AllP\x00\x00\x7f\x7f";
const SYSEX_HEADER_SIZE: usize = 6;
const SYSEX_DATA_SIZE: usize = 0x10c;
const SYSEX_TRAILER_SIZE: usize = 2;
pub const SYSEX_SIZE: usize = SYSEX_HEADER_SIZE + SYSEX_DATA_SIZE + SYSEX_TRAILER_SIZE;

/// Number of bytes covering the header and `count` patches.
///
/// The count is clamped to `0..=MAX_PATCHES`, so a non-positive count still
/// covers the header.
pub fn read_len(count: i64) -> usize {
    let count = count.clamp(0, MAX_PATCHES) as usize;
    HEADER_SIZE + RECORD_SIZE * count
}

/// Reads at most `read_len(count)` bytes from `reader`.
///
/// A source shorter than that is returned as is unless `strict` is set.
pub fn read_patches<R: Read>(reader: R, count: i64, strict: bool) -> Result<Vec<u8>, YdlError> {
    let expected = read_len(count);

    let mut buf = Vec::with_capacity(expected);
    reader.take(expected as u64).read_to_end(&mut buf)?;

    if buf.len() < expected {
        if strict {
            return Err(YdlError::ShortRead {
                expected,
                actual: buf.len(),
            });
        }
        debug!(expected, actual = buf.len(), "short read");
    }

    Ok(buf)
}

/// A `.YDL` preset bank viewed as a sequence of fixed-size patch records.
#[derive(Debug)]
pub struct PatchBank {
    buf: Vec<u8>,
}

impl PatchBank {
    pub fn load(path: &Path) -> Result<Self, YdlError> {
        let buf = std::fs::read(path)?;
        Self::parse(buf)
    }

    pub fn parse(buf: Vec<u8>) -> Result<Self, YdlError> {
        if buf.len() < YDL_MAGIC.len() || &buf[..YDL_MAGIC.len()] != YDL_MAGIC {
            return Err(YdlError::NotYdl);
        }

        let bank = PatchBank { buf };
        if bank.len() as i64 > MAX_PATCHES {
            warn!(patches = bank.len(), "bank holds more than {} patches", MAX_PATCHES);
        }
        Ok(bank)
    }

    /// Number of complete patches in the bank.
    pub fn len(&self) -> usize {
        match self.buf.len().checked_sub(HEADER_SIZE + PATCH_SIZE) {
            Some(rest) => rest / RECORD_SIZE + 1,
            None => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Payload of patch `index`.
    pub fn patch(&self, index: usize) -> Option<&[u8]> {
        if index >= self.len() {
            return None;
        }
        let start = HEADER_SIZE + index * RECORD_SIZE;
        Some(&self.buf[start..start + PATCH_SIZE])
    }

    /// Patch names in bank order.
    pub fn names(&self) -> impl Iterator<Item = (usize, String)> + '_ {
        (0..self.len()).filter_map(move |i| self.patch(i).map(|p| (i, patch_name(p))))
    }

    /// Builds the system exclusive message that loads patch `index` into the amp.
    pub fn sysex(&self, index: usize) -> Result<[u8; SYSEX_SIZE], YdlError> {
        let payload = self.patch(index).ok_or(YdlError::PatchIndex {
            index,
            count: self.len(),
        })?;

        let mut msg = [0u8; SYSEX_SIZE];
        msg[..4].copy_from_slice(&MESSAGE_START);
        msg[4] = (SYSEX_DATA_SIZE >> 7) as u8;
        msg[5] = (SYSEX_DATA_SIZE & 0x7f) as u8;

        let data = &mut msg[SYSEX_HEADER_SIZE..SYSEX_HEADER_SIZE + SYSEX_DATA_SIZE];
        data[..PATCH_TAG.len()].copy_from_slice(&PATCH_TAG);
        data[PATCH_TAG.len()..].copy_from_slice(payload);
        // The amp rejects the patch unless the last data byte is zero.
        data[SYSEX_DATA_SIZE - 1] = 0;

        let sum = data.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
        msg[SYSEX_SIZE - 2] = sum.wrapping_neg() & 0x7f;
        msg[SYSEX_SIZE - 1] = 0xf7;

        Ok(msg)
    }
}

fn patch_name(payload: &[u8]) -> String {
    let name = &payload[..NAME_LEN.min(payload.len())];
    let end = name.iter().position(|b| *b == 0).unwrap_or(name.len());
    String::from_utf8_lossy(&name[..end]).into_owned()
}
