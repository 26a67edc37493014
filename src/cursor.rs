//! Endian-stack binary cursors.
//!
//! The event files store every multi-byte field in the byte order of their
//! target console, and every cross reference as a virtual pointer
//! (`file offset + image base`).  Both cursors therefore carry:
//!
//! * an **endianness stack** — sections of a file occasionally switch byte
//!   order (e.g. the little-endian platform sniff inside an otherwise
//!   big-endian file), so overrides are pushed and popped rather than set;
//! * an **image base** — `pointer_position` is the virtual address the
//!   running console would see for the current stream position, and stored
//!   pointers are resolved back to file offsets by subtracting the base.
//!
//! Reads are random access (the formats are littered with absolute
//! offsets); writes are sequential with seek-back support for the
//! reserve-then-backpatch protocol.  Any access outside the buffer is an
//! [`EventError::OutOfRange`] — there is no silent truncation.

use crate::error::{EventError, Result};
use crate::types::{Vector2, Vector3};
use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// Byte order of multi-byte fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

macro_rules! endian_read {
    ($endian:expr, $method:ident, $bytes:expr) => {
        match $endian {
            Endian::Little => LittleEndian::$method($bytes),
            Endian::Big => BigEndian::$method($bytes),
        }
    };
}

macro_rules! endian_write {
    ($endian:expr, $method:ident, $bytes:expr, $value:expr) => {
        match $endian {
            Endian::Little => LittleEndian::$method($bytes, $value),
            Endian::Big => BigEndian::$method($bytes, $value),
        }
    };
}

// ── Reader ───────────────────────────────────────────────────────────────────

/// Random-access reader over a decompressed event buffer.
pub struct EventReader<'a> {
    data: &'a [u8],
    image_base: u32,
    endian: Vec<Endian>,
}

impl<'a> EventReader<'a> {
    pub fn new(data: &'a [u8], image_base: u32, endian: Endian) -> Self {
        Self {
            data,
            image_base,
            endian: vec![endian],
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn image_base(&self) -> u32 {
        self.image_base
    }

    pub fn set_image_base(&mut self, image_base: u32) {
        self.image_base = image_base;
    }

    pub fn endian(&self) -> Endian {
        *self.endian.last().unwrap_or(&Endian::Little)
    }

    /// Temporarily overrides the byte order. Every push must be matched by
    /// a [`pop_endian`](Self::pop_endian) before control returns to the
    /// caller that pushed the previous value.
    pub fn push_endian(&mut self, endian: Endian) {
        self.endian.push(endian);
    }

    pub fn pop_endian(&mut self) {
        debug_assert!(self.endian.len() > 1, "endian stack underflow");
        if self.endian.len() > 1 {
            self.endian.pop();
        }
    }

    fn slice(&self, addr: u32, len: usize) -> Result<&'a [u8]> {
        let start = addr as usize;
        let end = start.checked_add(len).ok_or(EventError::OutOfRange {
            addr,
            len,
            size: self.data.len(),
        })?;
        self.data.get(start..end).ok_or(EventError::OutOfRange {
            addr,
            len,
            size: self.data.len(),
        })
    }

    pub fn read_bytes(&self, addr: u32, len: usize) -> Result<&'a [u8]> {
        self.slice(addr, len)
    }

    pub fn read_u8(&self, addr: u32) -> Result<u8> {
        Ok(self.slice(addr, 1)?[0])
    }

    pub fn read_u16(&self, addr: u32) -> Result<u16> {
        Ok(endian_read!(self.endian(), read_u16, self.slice(addr, 2)?))
    }

    pub fn read_i16(&self, addr: u32) -> Result<i16> {
        Ok(self.read_u16(addr)? as i16)
    }

    pub fn read_u32(&self, addr: u32) -> Result<u32> {
        Ok(endian_read!(self.endian(), read_u32, self.slice(addr, 4)?))
    }

    pub fn read_i32(&self, addr: u32) -> Result<i32> {
        Ok(self.read_u32(addr)? as i32)
    }

    pub fn read_u64(&self, addr: u32) -> Result<u64> {
        Ok(endian_read!(self.endian(), read_u64, self.slice(addr, 8)?))
    }

    pub fn read_f32(&self, addr: u32) -> Result<f32> {
        Ok(f32::from_bits(self.read_u32(addr)?))
    }

    pub fn read_vector3(&self, addr: u32) -> Result<Vector3> {
        Ok(Vector3::new(
            self.read_f32(addr)?,
            self.read_f32(addr + 4)?,
            self.read_f32(addr + 8)?,
        ))
    }

    /// Reads a vector and advances `addr` past it.
    pub fn read_vector3_adv(&self, addr: &mut u32) -> Result<Vector3> {
        let v = self.read_vector3(*addr)?;
        *addr += 12;
        Ok(v)
    }

    pub fn read_vector2(&self, addr: u32) -> Result<Vector2> {
        Ok(Vector2::new(self.read_f32(addr)?, self.read_f32(addr + 4)?))
    }

    /// Reads `width` bytes and returns the text up to the first NUL.
    pub fn read_string_fixed(&self, addr: u32, width: usize) -> Result<String> {
        let raw = self.slice(addr, width)?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(width);
        Ok(String::from_utf8_lossy(&raw[..end]).into_owned())
    }

    /// Reads bytes until a NUL terminator.
    pub fn read_string_nullterminated(&self, addr: u32) -> Result<String> {
        let start = addr as usize;
        if start >= self.data.len() {
            return Err(EventError::OutOfRange {
                addr,
                len: 1,
                size: self.data.len(),
            });
        }
        let tail = &self.data[start..];
        let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
        Ok(String::from_utf8_lossy(&tail[..end]).into_owned())
    }

    /// Resolves the pointer stored at `addr` to a file offset.
    ///
    /// A stored value of zero means "no reference" and yields `None`.
    pub fn try_read_pointer(&self, addr: u32) -> Result<Option<u32>> {
        let value = self.read_u32(addr)?;
        if value == 0 {
            return Ok(None);
        }
        let offset = value
            .checked_sub(self.image_base)
            .filter(|&o| (o as usize) < self.data.len())
            .ok_or(EventError::DanglingPointer {
                addr,
                value,
                image_base: self.image_base,
            })?;
        Ok(Some(offset))
    }

    /// Like [`try_read_pointer`](Self::try_read_pointer), but a zero value
    /// is an error — used where the format requires the reference.
    pub fn read_pointer(&self, addr: u32) -> Result<u32> {
        self.try_read_pointer(addr)?
            .ok_or(EventError::NullPointer { addr })
    }
}

// ── Writer ───────────────────────────────────────────────────────────────────

/// Sequential, seekable writer building an event buffer in memory.
pub struct EventWriter {
    data: Vec<u8>,
    pos: usize,
    image_base: u32,
    endian: Vec<Endian>,
}

impl EventWriter {
    pub fn new(image_base: u32, endian: Endian) -> Self {
        Self {
            data: Vec::new(),
            pos: 0,
            image_base,
            endian: vec![endian],
        }
    }

    pub fn position(&self) -> u32 {
        self.pos as u32
    }

    /// Virtual address of the current position as the console sees it.
    pub fn pointer_position(&self) -> u32 {
        self.pos as u32 + self.image_base
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn image_base(&self) -> u32 {
        self.image_base
    }

    pub fn set_image_base(&mut self, image_base: u32) {
        self.image_base = image_base;
    }

    pub fn endian(&self) -> Endian {
        *self.endian.last().unwrap_or(&Endian::Little)
    }

    pub fn push_endian(&mut self, endian: Endian) {
        self.endian.push(endian);
    }

    pub fn pop_endian(&mut self) {
        debug_assert!(self.endian.len() > 1, "endian stack underflow");
        if self.endian.len() > 1 {
            self.endian.pop();
        }
    }

    /// Seeks to an absolute file offset within the written region.
    pub fn seek(&mut self, addr: u32) -> Result<()> {
        if addr as usize > self.data.len() {
            return Err(EventError::OutOfRange {
                addr,
                len: 0,
                size: self.data.len(),
            });
        }
        self.pos = addr as usize;
        Ok(())
    }

    pub fn seek_end(&mut self) {
        self.pos = self.data.len();
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        let end = self.pos + bytes.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
    }

    /// Writes `len` zero bytes (placeholder reservation).
    pub fn write_empty(&mut self, len: usize) {
        let end = self.pos + len;
        if end > self.data.len() {
            self.data.resize(end, 0);
        } else {
            self.data[self.pos..end].fill(0);
        }
        self.pos = end;
    }

    pub fn write_u8(&mut self, value: u8) {
        self.write_bytes(&[value]);
    }

    pub fn write_u16(&mut self, value: u16) {
        let mut buf = [0u8; 2];
        endian_write!(self.endian(), write_u16, &mut buf, value);
        self.write_bytes(&buf);
    }

    pub fn write_i16(&mut self, value: i16) {
        self.write_u16(value as u16);
    }

    pub fn write_u32(&mut self, value: u32) {
        let mut buf = [0u8; 4];
        endian_write!(self.endian(), write_u32, &mut buf, value);
        self.write_bytes(&buf);
    }

    pub fn write_i32(&mut self, value: i32) {
        self.write_u32(value as u32);
    }

    pub fn write_u64(&mut self, value: u64) {
        let mut buf = [0u8; 8];
        endian_write!(self.endian(), write_u64, &mut buf, value);
        self.write_bytes(&buf);
    }

    pub fn write_f32(&mut self, value: f32) {
        self.write_u32(value.to_bits());
    }

    pub fn write_vector3(&mut self, value: Vector3) {
        self.write_f32(value.x);
        self.write_f32(value.y);
        self.write_f32(value.z);
    }

    pub fn write_vector2(&mut self, value: Vector2) {
        self.write_f32(value.x);
        self.write_f32(value.y);
    }

    /// Writes `text` into a fixed `width`-byte slot, NUL-padding the rest.
    pub fn write_string_fixed(&mut self, text: &str, width: usize) -> Result<()> {
        let bytes = text.as_bytes();
        if bytes.len() > width {
            return Err(EventError::FieldOverflow {
                text: text.to_string(),
                width,
            });
        }
        self.write_bytes(bytes);
        self.write_empty(width - bytes.len());
        Ok(())
    }

    pub fn write_string_nullterminated(&mut self, text: &str) {
        self.write_bytes(text.as_bytes());
        self.write_u8(0);
    }

    /// Copies back previously written bytes (used to duplicate a motion
    /// head when a camera wrapper reuses an already written animation).
    pub fn read_bytes(&self, addr: u32, len: usize) -> Result<Vec<u8>> {
        let start = addr as usize;
        let end = start.checked_add(len).ok_or(EventError::OutOfRange {
            addr,
            len,
            size: self.data.len(),
        })?;
        self.data
            .get(start..end)
            .map(<[u8]>::to_vec)
            .ok_or(EventError::OutOfRange {
                addr,
                len,
                size: self.data.len(),
            })
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_respect_endianness() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let mut r = EventReader::new(&data, 0, Endian::Little);
        assert_eq!(r.read_u32(0).unwrap(), 0x04030201);
        r.push_endian(Endian::Big);
        assert_eq!(r.read_u32(0).unwrap(), 0x01020304);
        r.pop_endian();
        assert_eq!(r.read_u16(2).unwrap(), 0x0403);
    }

    #[test]
    fn out_of_range_read_fails() {
        let data = [0u8; 4];
        let r = EventReader::new(&data, 0, Endian::Little);
        assert!(matches!(
            r.read_u32(2),
            Err(EventError::OutOfRange { addr: 2, len: 4, .. })
        ));
    }

    #[test]
    fn pointers_resolve_against_image_base() {
        let mut w = EventWriter::new(0x1000, Endian::Big);
        w.write_u32(0x1008); // points at offset 8
        w.write_u32(0); // null
        w.write_u32(0xDEADBEEF);
        let data = w.into_bytes();

        let r = EventReader::new(&data, 0x1000, Endian::Big);
        assert_eq!(r.try_read_pointer(0).unwrap(), Some(8));
        assert_eq!(r.try_read_pointer(4).unwrap(), None);
        assert!(matches!(
            r.read_pointer(4),
            Err(EventError::NullPointer { addr: 4 })
        ));
        assert!(matches!(
            r.try_read_pointer(8),
            Err(EventError::DanglingPointer { .. })
        ));
    }

    #[test]
    fn writer_backpatches_in_place() {
        let mut w = EventWriter::new(0, Endian::Little);
        w.write_empty(4);
        w.write_u32(0xAABBCCDD);
        let end = w.position();
        w.seek(0).unwrap();
        w.write_u32(end);
        w.seek_end();
        assert_eq!(w.position(), 8);

        let data = w.into_bytes();
        let r = EventReader::new(&data, 0, Endian::Little);
        assert_eq!(r.read_u32(0).unwrap(), 8);
        assert_eq!(r.read_u32(4).unwrap(), 0xAABBCCDD);
    }

    #[test]
    fn seek_past_end_fails() {
        let mut w = EventWriter::new(0, Endian::Little);
        w.write_u32(1);
        assert!(w.seek(8).is_err());
    }

    #[test]
    fn fixed_string_overflow() {
        let mut w = EventWriter::new(0, Endian::Little);
        assert!(matches!(
            w.write_string_fixed("toolongname", 8),
            Err(EventError::FieldOverflow { width: 8, .. })
        ));
        w.write_string_fixed("evt", 8).unwrap();
        assert_eq!(w.len(), 8);

        let data = w.into_bytes();
        let r = EventReader::new(&data, 0, Endian::Little);
        assert_eq!(r.read_string_fixed(0, 8).unwrap(), "evt");
    }
}
