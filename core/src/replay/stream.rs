//! Replay byte stream
//!
//! # Layout
//!
//! ```text
//! frame 0: [slot 0: i32 LE][slot 1: i32 LE] ... [slot N-1: i32 LE]
//! frame 1: [slot 0: i32 LE] ...
//! ```
//!
//! No header and no frame count: the slot count comes from the match setup
//! and the stream ends at a frame boundary. Each record is the `InputBits`
//! value the slot was fed that frame.

use std::io::{self, Read, Write};

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use rollcade_shared::{InputBits, MAX_PLAYER_SLOTS, WIRE_INPUT_SIZE};

/// Replay stream errors
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("replay I/O failed: {0}")]
    Io(#[from] io::Error),
    /// The stream ended inside a frame
    #[error("replay truncated in frame {frame} at slot {slot} (byte offset {offset})")]
    Truncated {
        frame: u64,
        slot: usize,
        offset: u64,
    },
    #[error("invalid replay slot count {0} (expected 1..={max})", max = MAX_PLAYER_SLOTS)]
    SlotCount(usize),
}

fn check_slots(slots: usize) -> Result<usize, ReplayError> {
    if slots == 0 || slots > MAX_PLAYER_SLOTS {
        return Err(ReplayError::SlotCount(slots));
    }
    Ok(slots)
}

/// Writes frames of per-slot inputs
pub struct ReplayWriter<W: Write> {
    writer: W,
    slots: usize,
    frames: u64,
}

impl<W: Write> ReplayWriter<W> {
    pub fn new(writer: W, slots: usize) -> Result<Self, ReplayError> {
        Ok(Self {
            writer,
            slots: check_slots(slots)?,
            frames: 0,
        })
    }

    /// Append one frame. Missing slots are written as no input, extra
    /// slots are dropped.
    pub fn write_frame(&mut self, inputs: &[InputBits]) -> Result<(), ReplayError> {
        for slot in 0..self.slots {
            let bits = inputs.get(slot).copied().unwrap_or_default();
            self.writer.write_i32::<LittleEndian>(i32::from(bits.bits()))?;
        }
        self.frames += 1;
        Ok(())
    }

    pub fn frames_written(&self) -> u64 {
        self.frames
    }

    /// Flush and hand back the underlying writer
    pub fn finish(mut self) -> Result<W, ReplayError> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Reads frames of per-slot inputs
pub struct ReplayReader<R: Read> {
    reader: R,
    slots: usize,
    frame: u64,
    offset: u64,
    buf: Vec<u8>,
}

impl<R: Read> ReplayReader<R> {
    pub fn new(reader: R, slots: usize) -> Result<Self, ReplayError> {
        let slots = check_slots(slots)?;
        Ok(Self {
            reader,
            slots,
            frame: 0,
            offset: 0,
            buf: vec![0u8; slots * WIRE_INPUT_SIZE],
        })
    }

    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Frames read so far
    pub fn frames_read(&self) -> u64 {
        self.frame
    }

    /// Next frame, or `None` at a clean end of stream
    pub fn next_frame(&mut self) -> Result<Option<Vec<InputBits>>, ReplayError> {
        let got = fill(&mut self.reader, &mut self.buf)?;
        if got == 0 {
            return Ok(None);
        }
        if got < self.buf.len() {
            return Err(ReplayError::Truncated {
                frame: self.frame,
                slot: got / WIRE_INPUT_SIZE,
                offset: self.offset + got as u64,
            });
        }

        let frame = self
            .buf
            .chunks_exact(WIRE_INPUT_SIZE)
            .map(|record| InputBits::from_raw(LittleEndian::read_i32(record)))
            .collect();
        self.frame += 1;
        self.offset += got as u64;
        Ok(Some(frame))
    }

    /// Read every remaining frame
    pub fn read_all(mut self) -> Result<Vec<Vec<InputBits>>, ReplayError> {
        let mut frames = Vec::new();
        while let Some(frame) = self.next_frame()? {
            frames.push(frame);
        }
        Ok(frames)
    }
}

/// Read until `buf` is full or the reader is exhausted
fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Encode a whole replay into memory
pub fn encode(frames: &[Vec<InputBits>], slots: usize) -> Result<Vec<u8>, ReplayError> {
    let mut writer = ReplayWriter::new(Vec::new(), slots)?;
    for frame in frames {
        writer.write_frame(frame)?;
    }
    writer.finish()
}
