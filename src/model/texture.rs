//! Internal texture name list.
//!
//! The model buffer carries the list of texture names the event pulls
//! from its texture archive.  Names are written as NUL terminated label
//! strings at the buffer tail and referenced by address; the list itself
//! is a name entry array followed by the two word list head.

use crate::cursor::{EventReader, EventWriter};
use crate::error::Result;
use crate::lut::LabelMap;

/// Size of a name entry in bytes.
pub const TEXTURE_NAME_SIZE: u32 = 12;

/// One referenced texture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextureName {
    pub name: Option<String>,
    pub attributes: u32,
}

/// The texture name list of an event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextureNameList {
    pub names: Vec<TextureName>,
}

impl TextureNameList {
    /// Bytes to reserve for the array and head.
    pub fn reserved_size(&self) -> usize {
        8 + self.names.len() * TEXTURE_NAME_SIZE as usize
    }

    /// Writes the name label strings at the current position and records
    /// their addresses.
    pub fn write_labels(&self, writer: &mut EventWriter, labels: &mut LabelMap) {
        for texture in &self.names {
            if let Some(name) = &texture.name {
                labels.insert(writer.pointer_position(), name);
                writer.write_string_nullterminated(name);
            }
        }
    }

    /// Writes the entry array and list head into the reserved region,
    /// returning the head address. Labels must have been written.
    pub fn write(&self, writer: &mut EventWriter, labels: &LabelMap) -> Result<u32> {
        let array_addr = writer.pointer_position();
        for texture in &self.names {
            let name_addr = match &texture.name {
                Some(name) => labels.address(name)?,
                None => 0,
            };
            writer.write_u32(name_addr);
            writer.write_u32(texture.attributes);
            writer.write_u32(0); // runtime texture pointer
        }

        let head_addr = writer.pointer_position();
        writer.write_u32(array_addr);
        writer.write_u32(self.names.len() as u32);
        Ok(head_addr)
    }

    pub fn read(reader: &EventReader, head_addr: u32, labels: &mut LabelMap) -> Result<Self> {
        let mut array_addr = reader.read_pointer(head_addr)?;
        let count = reader.read_u32(head_addr + 4)?;

        let mut names = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let name = match reader.try_read_pointer(array_addr)? {
                Some(name_addr) => {
                    let name = reader.read_string_nullterminated(name_addr)?;
                    labels.insert(name_addr + reader.image_base(), &name);
                    Some(name)
                }
                None => None,
            };
            names.push(TextureName {
                name,
                attributes: reader.read_u32(array_addr + 4)?,
            });
            array_addr += TEXTURE_NAME_SIZE;
        }

        Ok(TextureNameList { names })
    }
}
