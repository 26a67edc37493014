//! Reflection plane data.
//!
//! The struct is fixed size: a count, 32 transparency slots and one
//! pointer to the quad array, so at most 32 planes survive a write.

use crate::cursor::{EventReader, EventWriter};
use crate::error::Result;
use crate::types::Vector3;

/// Size of the structure in bytes.
pub const REFLECTION_DATA_SIZE: u32 = 0x88;

/// Maximum number of planes the structure can hold.
pub const MAX_REFLECTIONS: usize = 32;

/// A single reflective quad.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Reflection {
    pub transparency: i32,
    pub vertex1: Vector3,
    pub vertex2: Vector3,
    pub vertex3: Vector3,
    pub vertex4: Vector3,
}

/// All reflection planes of an event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReflectionData {
    pub reflections: Vec<Reflection>,
}

impl ReflectionData {
    /// Writes quads then the control struct, returning the struct
    /// address.
    pub fn write(&self, writer: &mut EventWriter) -> Result<u32> {
        let count = self.reflections.len().min(MAX_REFLECTIONS);

        let quad_addr = if count == 0 {
            0
        } else {
            let addr = writer.pointer_position();
            for reflection in &self.reflections {
                writer.write_vector3(reflection.vertex1);
                writer.write_vector3(reflection.vertex2);
                writer.write_vector3(reflection.vertex3);
                writer.write_vector3(reflection.vertex4);
            }
            addr
        };

        let addr = writer.pointer_position();
        writer.write_u32(count as u32);
        for reflection in self.reflections.iter().take(count) {
            writer.write_i32(reflection.transparency);
        }
        writer.write_empty(4 * (MAX_REFLECTIONS - count));
        writer.write_u32(quad_addr);

        Ok(addr)
    }

    pub fn read(reader: &EventReader, addr: u32) -> Result<ReflectionData> {
        let mut result = ReflectionData::default();

        let count = reader.read_u32(addr)?;
        if count == 0 {
            return Ok(result);
        }

        let mut quad_addr = reader.read_pointer(addr + 0x84)?;
        let mut transparency_addr = addr + 4;
        for _ in 0..count {
            result.reflections.push(Reflection {
                transparency: reader.read_i32(transparency_addr)?,
                vertex1: reader.read_vector3_adv(&mut quad_addr)?,
                vertex2: reader.read_vector3_adv(&mut quad_addr)?,
                vertex3: reader.read_vector3_adv(&mut quad_addr)?,
                vertex4: reader.read_vector3_adv(&mut quad_addr)?,
            });
            transparency_addr += 4;
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Endian;

    #[test]
    fn reflection_roundtrip() {
        let data = ReflectionData {
            reflections: vec![
                Reflection {
                    transparency: 0x60,
                    vertex1: Vector3::new(0.0, 0.0, 0.0),
                    vertex2: Vector3::new(1.0, 0.0, 0.0),
                    vertex3: Vector3::new(1.0, 0.0, 1.0),
                    vertex4: Vector3::new(0.0, 0.0, 1.0),
                },
                Reflection {
                    transparency: 0x30,
                    ..Reflection::default()
                },
            ],
        };

        let mut writer = EventWriter::new(0x4000, Endian::Big);
        let addr = data.write(&mut writer).unwrap();
        let bytes = writer.into_bytes();

        let reader = EventReader::new(&bytes, 0x4000, Endian::Big);
        let decoded = ReflectionData::read(&reader, addr - 0x4000).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn empty_data_reads_back_empty() {
        let data = ReflectionData::default();
        let mut writer = EventWriter::new(0, Endian::Little);
        let addr = data.write(&mut writer).unwrap();
        assert_eq!(writer.len() as u32, REFLECTION_DATA_SIZE);

        let bytes = writer.into_bytes();
        let reader = EventReader::new(&bytes, 0, Endian::Little);
        assert!(ReflectionData::read(&reader, addr).unwrap().reflections.is_empty());
    }
}
