//! Surface animations: texture swaps and texture coordinate shifts.
//!
//! These animations do not target nodes but individual words inside the
//! polygon chunk streams of already written geometry.  In memory a
//! target is an attach handle plus a word index; on the wire it becomes
//! a virtual address into the chunk stream, translated through the
//! chunk stream records of the current pass.  The block array is
//! terminated by an all zero block rather than carrying a count.

use crate::cursor::{EventReader, EventWriter};
use crate::error::{EventError, Result};
use crate::lut::PointerLut;
use crate::pool::{AttachHandle, NodeHandle};

/// Size of the block structure in bytes.
pub const SURFACE_BLOCK_SIZE: u32 = 0xC;

/// A word position inside an attach's polygon chunk stream.
pub type ChunkWord = (AttachHandle, u32);

/// A keyed texture coordinate overwrite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvFrame {
    /// The texcoord word this frame overwrites.
    pub target: ChunkWord,
    pub u: i16,
    pub v: i16,
}

/// A single surface animation.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceAnimation {
    /// Initial texture index; selects the texture sequence to play.
    pub texture_id: i32,
    /// The texture chunk word whose texture index gets swapped.
    pub texture_target: ChunkWord,
    pub uv_frames: Vec<UvFrame>,
}

/// Surface animations targeting one model.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceAnimationBlock {
    pub model: NodeHandle,
    pub animations: Vec<Option<SurfaceAnimation>>,
}

/// A texture index loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextureAnimSequence {
    pub texture_id: i32,
    pub texture_count: i32,
}

/// All surface animation data of an event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceAnimationData {
    pub blocks: Vec<SurfaceAnimationBlock>,
    pub texture_sequences: Vec<TextureAnimSequence>,
}

impl SurfaceAnimation {
    fn write(&self, writer: &mut EventWriter, lut: &PointerLut) -> Result<u32> {
        let uv_addr = if self.uv_frames.is_empty() {
            0
        } else {
            let addr = writer.pointer_position();
            for frame in &self.uv_frames {
                writer.write_u32(chunk_word_addr(lut, frame.target)?);
                writer.write_i16(frame.u);
                writer.write_i16(frame.v);
            }
            addr
        };

        // the texture index sits one short into the chunk word
        let texture_addr = chunk_word_addr(lut, self.texture_target)? + 2;

        let addr = writer.pointer_position();
        writer.write_i32(self.texture_id);
        writer.write_u32(texture_addr);
        writer.write_i32(self.uv_frames.len() as i32);
        writer.write_u32(uv_addr);
        Ok(addr)
    }

    fn read(reader: &EventReader, addr: u32, lut: &PointerLut) -> Result<SurfaceAnimation> {
        let texture_id = reader.read_i32(addr)?;
        let raw_target = reader.read_u32(addr + 4)?;
        let word_addr = raw_target
            .checked_sub(2)
            .ok_or(EventError::UnresolvedReference {
                category: "poly chunk",
                addr: raw_target,
            })?;
        let texture_target = lut.resolve_poly_word(word_addr)?;

        let count = reader.read_i32(addr + 8)?;
        let mut uv_frames = Vec::new();
        if let Some(mut uv_addr) = reader.try_read_pointer(addr + 0xC)? {
            for _ in 0..count {
                uv_frames.push(UvFrame {
                    target: lut.resolve_poly_word(reader.read_u32(uv_addr)?)?,
                    u: reader.read_i16(uv_addr + 4)?,
                    v: reader.read_i16(uv_addr + 6)?,
                });
                uv_addr += 8;
            }
        }

        Ok(SurfaceAnimation {
            texture_id,
            texture_target,
            uv_frames,
        })
    }
}

impl SurfaceAnimationData {
    /// Writes the data, returning the address of its head struct.
    ///
    /// `sequence_array` selects the newer head layout with a counted
    /// sequence array; the oldest format inlines a single sequence.
    pub fn write(
        &self,
        writer: &mut EventWriter,
        sequence_array: bool,
        lut: &mut PointerLut,
    ) -> Result<u32> {
        let block_addr = self.write_block_array(writer, lut)?;

        let mut sequence_addr = 0;
        if sequence_array && !self.texture_sequences.is_empty() {
            sequence_addr = writer.pointer_position();
            for sequence in &self.texture_sequences {
                writer.write_i32(sequence.texture_id);
                writer.write_i32(sequence.texture_count);
            }
        }

        let addr = writer.pointer_position();
        writer.write_u32(block_addr);
        if sequence_array {
            writer.write_u32(sequence_addr);
            writer.write_i32(self.texture_sequences.len() as i32);
        } else {
            let sequence = self
                .texture_sequences
                .first()
                .copied()
                .unwrap_or_default();
            writer.write_i32(sequence.texture_id);
            writer.write_i32(sequence.texture_count);
        }

        Ok(addr)
    }

    fn write_block_array(&self, writer: &mut EventWriter, lut: &mut PointerLut) -> Result<u32> {
        // animation structs first, then the pointer lists, then the
        // zero terminated block array itself
        let mut anim_addrs = Vec::with_capacity(self.blocks.len());
        for block in &self.blocks {
            let mut addrs = Vec::with_capacity(block.animations.len());
            for animation in &block.animations {
                let addr = match animation {
                    Some(animation) => animation.write(writer, lut)?,
                    None => 0,
                };
                addrs.push(addr);
            }
            anim_addrs.push(addrs);
        }

        let mut list_addrs = Vec::with_capacity(self.blocks.len());
        for addrs in &anim_addrs {
            let addr = writer.pointer_position();
            for anim_addr in addrs {
                writer.write_u32(*anim_addr);
            }
            list_addrs.push(addr);
        }

        let result = writer.pointer_position();
        for (block, list_addr) in self.blocks.iter().zip(list_addrs) {
            writer.write_u32(lut.nodes.address(block.model)?);
            writer.write_i32(block.animations.len() as i32);
            writer.write_u32(list_addr);
        }
        writer.write_empty(SURFACE_BLOCK_SIZE as usize);

        Ok(result)
    }

    /// Reads the data headed at `addr`. Models and geometry must have
    /// been decoded already, the targets resolve against them.
    pub fn read(
        reader: &EventReader,
        addr: u32,
        sequence_array: bool,
        lut: &PointerLut,
    ) -> Result<SurfaceAnimationData> {
        let mut result = SurfaceAnimationData::default();

        let mut block_addr = reader.read_pointer(addr)?;
        while let Some(model_addr) = reader.try_read_pointer(block_addr)? {
            let model = lut.nodes.value(model_addr)?;
            let mut block = SurfaceAnimationBlock {
                model,
                animations: Vec::new(),
            };

            if let Some(mut list_addr) = reader.try_read_pointer(block_addr + 8)? {
                let count = reader.read_i32(block_addr + 4)?;
                for _ in 0..count {
                    let animation = match reader.try_read_pointer(list_addr)? {
                        Some(anim_addr) => Some(SurfaceAnimation::read(reader, anim_addr, lut)?),
                        None => None,
                    };
                    block.animations.push(animation);
                    list_addr += 4;
                }
            }

            result.blocks.push(block);
            block_addr += SURFACE_BLOCK_SIZE;
        }

        if sequence_array {
            let count = reader.read_u32(addr + 8)?;
            if count > 0 {
                let mut sequence_addr = reader.read_pointer(addr + 4)?;
                for _ in 0..count {
                    result.texture_sequences.push(TextureAnimSequence {
                        texture_id: reader.read_i32(sequence_addr)?,
                        texture_count: reader.read_i32(sequence_addr + 4)?,
                    });
                    sequence_addr += 8;
                }
            }
        } else {
            result.texture_sequences.push(TextureAnimSequence {
                texture_id: reader.read_i32(addr + 4)?,
                texture_count: reader.read_i32(addr + 8)?,
            });
        }

        Ok(result)
    }
}

fn chunk_word_addr(lut: &PointerLut, word: ChunkWord) -> Result<u32> {
    Ok(lut.poly_stream_addr(word.0)? + word.1 * 4)
}
