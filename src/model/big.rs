//! The special per-scene entry with its own motion pair list.
//!
//! One entry per scene can carry an array of node/shape animation pairs
//! that the game cycles through at runtime instead of a single motion.
//! The pair array lives apart from the entry struct and is written
//! during the motion array phase, so the entry only stores its address.

use crate::cursor::{EventReader, EventWriter};
use crate::error::Result;
use crate::lut::{PointerLut, SlotId};
use crate::model::node::read_node;
use crate::motion::{slot_at, EventMotion, Motion, MotionTable};
use crate::pool::{EventPool, MotionHandle, NodeHandle};

/// Size of the entry structure in bytes.
pub const BIG_ENTRY_SIZE: u32 = 16;

/// Special entry of a scene.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BigEntry {
    pub model: Option<NodeHandle>,
    /// Node/shape animation pairs.
    pub motions: Vec<(Option<MotionHandle>, Option<MotionHandle>)>,
    pub unknown: i32,
}

impl BigEntry {
    /// Writes the motion pair array, keyed per scene so repeat calls
    /// reuse the reservation. Entries without pairs write nothing.
    pub fn write_motion_array(
        &self,
        scene_index: u32,
        writer: &mut EventWriter,
        motion_table: &MotionTable,
        lut: &mut PointerLut,
    ) -> Result<u32> {
        if self.motions.is_empty() {
            return Ok(0);
        }

        let slot = SlotId::BigMotions(scene_index);
        if let Some(addr) = lut.slots.try_address(slot) {
            return Ok(addr);
        }

        let addr = writer.pointer_position();
        for (node_anim, shape_anim) in &self.motions {
            writer.write_u32(motion_table.animation_key(*node_anim));
            writer.write_u32(motion_table.animation_key(*shape_anim));
        }
        lut.slots.insert(slot, addr);
        Ok(addr)
    }

    /// Writes the entry struct. Model and motion array must have been
    /// written beforehand.
    pub fn write(
        &self,
        scene_index: u32,
        writer: &mut EventWriter,
        lut: &PointerLut,
    ) -> Result<()> {
        let model_addr = match self.model {
            Some(model) => lut.nodes.address(model)?,
            None => 0,
        };
        let motion_addr = if self.motions.is_empty() {
            0
        } else {
            lut.slots.address(SlotId::BigMotions(scene_index))?
        };

        writer.write_u32(model_addr);
        writer.write_u32(motion_addr);
        writer.write_i32(self.motions.len() as i32);
        writer.write_i32(self.unknown);
        Ok(())
    }

    /// Reads a dreamcast layout entry, motions decoded inline.
    pub fn read_dc(
        reader: &EventReader,
        addr: u32,
        pool: &mut EventPool,
        lut: &mut PointerLut,
    ) -> Result<BigEntry> {
        let mut entry = BigEntry {
            unknown: reader.read_i32(addr + 0xC)?,
            ..BigEntry::default()
        };

        let model = match reader.try_read_pointer(addr)? {
            Some(model_addr) => Some(read_node(reader, model_addr, pool, lut)?),
            None => None,
        };
        entry.model = model;

        // motions target the model tree, without one they are unreadable
        if let Some(model) = model {
            if let Some(mut pair_addr) = reader.try_read_pointer(addr + 4)? {
                let node_count = pool.tree_node_count(model) as u32;
                let count = reader.read_i32(addr + 8)?;
                for _ in 0..count {
                    let node_anim = match reader.try_read_pointer(pair_addr)? {
                        Some(a) => {
                            Some(Motion::read(reader, a, node_count, pool, &mut lut.motions)?)
                        }
                        None => None,
                    };
                    let shape_anim = match reader.try_read_pointer(pair_addr + 4)? {
                        Some(a) => {
                            Some(Motion::read(reader, a, node_count, pool, &mut lut.motions)?)
                        }
                        None => None,
                    };
                    entry.motions.push((node_anim, shape_anim));
                    pair_addr += 8;
                }
            }
        }

        Ok(entry)
    }

    /// Reads a gamecube layout entry, motions resolved through the
    /// motion buffer slots.
    pub fn read_gc(
        reader: &EventReader,
        addr: u32,
        slots: &[EventMotion],
        pool: &mut EventPool,
        lut: &mut PointerLut,
    ) -> Result<BigEntry> {
        let mut entry = BigEntry {
            unknown: reader.read_i32(addr + 0xC)?,
            ..BigEntry::default()
        };

        if let Some(model_addr) = reader.try_read_pointer(addr)? {
            entry.model = Some(read_node(reader, model_addr, pool, lut)?);
        }

        if let Some(mut pair_addr) = reader.try_read_pointer(addr + 4)? {
            let count = reader.read_i32(addr + 8)?;
            for _ in 0..count {
                let node_anim = slot_animation(reader, pair_addr, slots)?;
                let shape_anim = slot_animation(reader, pair_addr + 4, slots)?;
                entry.motions.push((node_anim, shape_anim));
                pair_addr += 8;
            }
        }

        Ok(entry)
    }
}

fn slot_animation(
    reader: &EventReader,
    addr: u32,
    slots: &[EventMotion],
) -> Result<Option<MotionHandle>> {
    Ok(slot_at(slots, reader.read_u32(addr)?)?.animation)
}
