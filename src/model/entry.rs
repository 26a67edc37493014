//! Scene entries, one per rendered model.

use crate::cursor::{EventReader, EventWriter};
use crate::error::Result;
use crate::lut::PointerLut;
use crate::model::node::read_node;
use crate::motion::{slot_at, EventMotion, Motion, MotionTable};
use crate::pool::{EventPool, MotionHandle, NodeHandle};
use crate::types::Vector3;

/// Size of the dreamcast entry structure in bytes.
pub const ENTRY_SIZE_DC: u32 = 32;

/// Size of the gamecube entry structure in bytes.
pub const ENTRY_SIZE_GC: u32 = 44;

/// Entry attribute flags. Several bits read differently depending on
/// whether the entry sits in the root scene or an animated scene.
pub mod entry_flags {
    /// Animated scene: entry has no shape animation.
    pub const NO_SHAPE_ANIMATION: u32 = 0x002;
    /// Root scene: surface receives lighting.
    pub const ROOT_ENABLE_LIGHTING: u32 = 0x002;
    /// Animated scene: entry has no node animation.
    pub const NO_NODE_ANIMATION: u32 = 0x008;
    /// Root scene: surface casts no shadows.
    pub const ROOT_DISABLE_SHADOWS: u32 = 0x008;
    /// Entry shows up in reflections.
    pub const REFLECTION: u32 = 0x080;
    /// Entry participates in the blare effect.
    pub const BLARE: u32 = 0x100;
}

/// A model placed in a scene, with the animations that drive it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EventEntry {
    /// Chunk format model.
    pub model: Option<NodeHandle>,
    /// Node animation played on the model.
    pub animation: Option<MotionHandle>,
    /// Shape animation played on the model.
    pub shape_animation: Option<MotionHandle>,
    /// GameCube format replacement model.
    pub gc_model: Option<NodeHandle>,
    /// Shadow volume model.
    pub shadow_model: Option<NodeHandle>,
    pub unknown: u32,
    /// Initial world position.
    pub position: Vector3,
    /// See [`entry_flags`].
    pub attributes: u32,
    /// Transparency sorting layer.
    pub layer: u32,
}

impl EventEntry {
    /// Whether the entry renders anything.
    pub fn has_model(&self) -> bool {
        self.model.is_some() || self.gc_model.is_some()
    }

    /// Syncs the no-animation attribute bits with the assigned motions.
    pub fn auto_animation_attributes(&mut self) {
        if self.animation.is_none() {
            self.attributes |= entry_flags::NO_NODE_ANIMATION;
        } else {
            self.attributes &= !entry_flags::NO_NODE_ANIMATION;
        }

        if self.shape_animation.is_none() {
            self.attributes |= entry_flags::NO_SHAPE_ANIMATION;
        } else {
            self.attributes &= !entry_flags::NO_SHAPE_ANIMATION;
        }
    }

    /// Reads a dreamcast layout entry and advances `addr` past it.
    /// Motions are stored inline, so they are decoded here.
    pub fn read_dc(
        reader: &EventReader,
        addr: &mut u32,
        pool: &mut EventPool,
        lut: &mut PointerLut,
    ) -> Result<EventEntry> {
        let mut entry = EventEntry::default();

        let model_addr = reader.read_pointer(*addr)?;
        let model = read_node(reader, model_addr, pool, lut)?;
        entry.model = Some(model);

        if let Some(motion_addr) = reader.try_read_pointer(*addr + 4)? {
            let node_count = pool.tree_node_count(model) as u32;
            entry.animation = Some(Motion::read(
                reader,
                motion_addr,
                node_count,
                pool,
                &mut lut.motions,
            )?);
        }

        if let Some(motion_addr) = reader.try_read_pointer(*addr + 8)? {
            let node_count = pool.tree_node_count(model) as u32;
            entry.shape_animation = Some(Motion::read(
                reader,
                motion_addr,
                node_count,
                pool,
                &mut lut.motions,
            )?);
        }

        entry.unknown = reader.read_u32(*addr + 0xC)?;
        entry.position = reader.read_vector3(*addr + 0x10)?;
        entry.attributes = reader.read_u32(*addr + 0x1C)?;

        *addr += ENTRY_SIZE_DC;
        Ok(entry)
    }

    /// Reads a gamecube layout entry and advances `addr` past it.
    /// Motions are fetched by index from the motion buffer slots.
    pub fn read_gc(
        reader: &EventReader,
        addr: &mut u32,
        slots: &[EventMotion],
        pool: &mut EventPool,
        lut: &mut PointerLut,
    ) -> Result<EventEntry> {
        let mut entry = EventEntry::default();

        if let Some(model_addr) = reader.try_read_pointer(*addr)? {
            entry.model = Some(read_node(reader, model_addr, pool, lut)?);
        }
        entry.animation = slot_animation(reader, *addr + 4, slots)?;
        entry.shape_animation = slot_animation(reader, *addr + 8, slots)?;
        if let Some(model_addr) = reader.try_read_pointer(*addr + 0xC)? {
            entry.gc_model = Some(read_node(reader, model_addr, pool, lut)?);
        }
        if let Some(model_addr) = reader.try_read_pointer(*addr + 0x10)? {
            entry.shadow_model = Some(read_node(reader, model_addr, pool, lut)?);
        }
        entry.unknown = reader.read_u32(*addr + 0x14)?;
        entry.position = reader.read_vector3(*addr + 0x18)?;
        entry.attributes = reader.read_u32(*addr + 0x24)?;
        entry.layer = reader.read_u32(*addr + 0x28)?;

        *addr += ENTRY_SIZE_GC;
        Ok(entry)
    }

    /// Writes the dreamcast layout. Model and motions must have been
    /// written beforehand.
    pub fn write_dc(&self, writer: &mut EventWriter, lut: &PointerLut) -> Result<()> {
        let model_addr = match self.model {
            Some(model) => lut.nodes.address(model)?,
            None => return Err(crate::error::EventError::UnregisteredWrite { category: "node" }),
        };
        let animation_addr = match self.animation {
            Some(motion) => lut.motions.address(motion)?,
            None => 0,
        };
        let shape_addr = match self.shape_animation {
            Some(motion) => lut.motions.address(motion)?,
            None => 0,
        };

        writer.write_u32(model_addr);
        writer.write_u32(animation_addr);
        writer.write_u32(shape_addr);
        writer.write_u32(self.unknown);
        writer.write_vector3(self.position);
        writer.write_u32(self.attributes);
        Ok(())
    }

    /// Writes the gamecube layout. Models must have been written
    /// beforehand; motions are referenced by slot index.
    pub fn write_gc(
        &self,
        writer: &mut EventWriter,
        motion_table: &MotionTable,
        lut: &PointerLut,
    ) -> Result<()> {
        let node_addr = |node: Option<NodeHandle>| match node {
            Some(node) => lut.nodes.address(node),
            None => Ok(0),
        };

        writer.write_u32(node_addr(self.model)?);
        writer.write_u32(motion_table.animation_key(self.animation));
        writer.write_u32(motion_table.animation_key(self.shape_animation));
        writer.write_u32(node_addr(self.gc_model)?);
        writer.write_u32(node_addr(self.shadow_model)?);
        writer.write_u32(self.unknown);
        writer.write_vector3(self.position);
        writer.write_u32(self.attributes);
        writer.write_u32(self.layer);
        Ok(())
    }
}

fn slot_animation(
    reader: &EventReader,
    addr: u32,
    slots: &[EventMotion],
) -> Result<Option<MotionHandle>> {
    Ok(slot_at(slots, reader.read_u32(addr)?)?.animation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Endian;
    use crate::model::node::{write_node, Node};
    use crate::motion::MotionKind;

    #[test]
    fn dc_entry_roundtrip() {
        let mut pool = EventPool::new();
        let model = pool.add_node(Node::default());
        let motion = pool.add_motion(Motion::new(1, 30, MotionKind::Node));

        let mut writer = EventWriter::new(0x2000, Endian::Little);
        let mut lut = PointerLut::new();
        write_node(&mut writer, &pool, &mut lut, model).unwrap();
        let motion_addr = pool.motion(motion).write(&mut writer).unwrap();
        lut.motions.insert(motion, motion_addr);

        let mut entry = EventEntry {
            model: Some(model),
            animation: Some(motion),
            position: Vector3::new(7.0, 8.0, 9.0),
            ..EventEntry::default()
        };
        entry.auto_animation_attributes();

        let entry_addr = writer.position();
        entry.write_dc(&mut writer, &lut).unwrap();
        assert_eq!(writer.position() - entry_addr, ENTRY_SIZE_DC);

        let data = writer.into_bytes();
        let reader = EventReader::new(&data, 0x2000, Endian::Little);
        let mut read_pool = EventPool::new();
        let mut read_lut = PointerLut::new();
        let mut addr = entry_addr;
        let decoded = EventEntry::read_dc(&reader, &mut addr, &mut read_pool, &mut read_lut).unwrap();

        assert_eq!(addr, entry_addr + ENTRY_SIZE_DC);
        assert!(decoded.model.is_some());
        assert!(decoded.animation.is_some());
        assert!(decoded.shape_animation.is_none());
        assert_eq!(decoded.position, entry.position);
        assert_eq!(
            decoded.attributes & entry_flags::NO_SHAPE_ANIMATION,
            entry_flags::NO_SHAPE_ANIMATION
        );
    }

    #[test]
    fn unwritten_model_is_an_error() {
        let mut pool = EventPool::new();
        let model = pool.add_node(Node::default());
        let entry = EventEntry {
            model: Some(model),
            ..EventEntry::default()
        };

        let mut writer = EventWriter::new(0, Endian::Little);
        let lut = PointerLut::new();
        assert!(entry.write_dc(&mut writer, &lut).is_err());
    }

    #[test]
    fn gc_motion_index_bounds() {
        let mut writer = EventWriter::new(0, Endian::Big);
        writer.write_u32(5); // slot index past the table
        let data = writer.into_bytes();
        let reader = EventReader::new(&data, 0, Endian::Big);

        let slots = vec![EventMotion::EMPTY];
        assert!(matches!(
            slot_animation(&reader, 0, &slots),
            Err(crate::error::EventError::MotionIndexOutOfRange { index: 5, len: 1 })
        ));
    }
}
