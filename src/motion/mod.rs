//! Animation data.
//!
//! A [`Motion`] drives a model tree with keyed position, rotation and
//! scale channels, one channel set per node of the tree it targets.  On
//! the wire a motion is written back to front: keyframe arrays first,
//! then the per-node channel table, then the 12 byte head that everything
//! else points at.  The head address is what gets registered in the
//! lookup table, so sharing a motion between entries costs nothing.
//!
//! Camera motions are regular motions with a single node and a dedicated
//! kind tag; they travel with a [`Camera`] parameter block glued behind
//! the head (see [`EventMotion`]).

mod camera;
mod event_motion;
pub mod surface;

pub use camera::{Camera, CAMERA_SIZE};
pub use event_motion::{
    read_inline_camera_motion, read_motion_table, slot_at, write_motion_contents,
    write_motion_table, EventMotion, MotionTable, MOTION_SLOT_EMPTY,
};

use crate::cursor::{EventReader, EventWriter};
use crate::error::Result;
use crate::lut::AddressMap;
use crate::pool::{EventPool, MotionHandle};
use crate::types::Vector3;

/// Size of the motion head structure in bytes.
pub const MOTION_HEAD_SIZE: u32 = 12;

const CHANNEL_TABLE_ENTRY_SIZE: u32 = 24;

/// What a motion animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionKind {
    /// Node transforms of a model tree.
    Node,
    /// Vertex morph targets.
    Shape,
    /// A camera path.
    Camera,
    /// Unrecognized kind tag, kept verbatim.
    Other(u16),
}

impl MotionKind {
    pub fn wire(self) -> u16 {
        match self {
            MotionKind::Node => 0x0007,
            MotionKind::Shape => 0x0010,
            MotionKind::Camera => 0x01C1,
            MotionKind::Other(raw) => raw,
        }
    }

    pub fn from_wire(raw: u16) -> Self {
        match raw {
            0x0007 => MotionKind::Node,
            0x0010 => MotionKind::Shape,
            0x01C1 => MotionKind::Camera,
            other => MotionKind::Other(other),
        }
    }
}

/// Keyframe channels of a single node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Keyframes {
    /// Position keys, frame number paired with a world offset.
    pub positions: Vec<(u32, Vector3)>,
    /// Rotation keys in binary angles.
    pub rotations: Vec<(u32, [i32; 3])>,
    /// Scale keys.
    pub scales: Vec<(u32, Vector3)>,
}

impl Keyframes {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() && self.rotations.is_empty() && self.scales.is_empty()
    }
}

/// A keyframed animation.
#[derive(Debug, Clone, PartialEq)]
pub struct Motion {
    /// Number of nodes in the targeted model tree. Also the length of
    /// `keyframes`.
    pub node_count: u32,
    /// Playback length in frames.
    pub frame_count: u32,
    pub kind: MotionKind,
    /// Interpolation mode tag. Linear is 4.
    pub interpolation: u16,
    pub keyframes: Vec<Keyframes>,
}

/// Linear interpolation tag.
pub const INTERPOLATE_LINEAR: u16 = 4;

impl Motion {
    pub fn new(node_count: u32, frame_count: u32, kind: MotionKind) -> Self {
        Self {
            node_count,
            frame_count,
            kind,
            interpolation: INTERPOLATE_LINEAR,
            keyframes: vec![Keyframes::default(); node_count as usize],
        }
    }

    /// Whether the head at `addr` carries the camera kind tag.
    pub(crate) fn is_camera_head(reader: &EventReader, addr: u32) -> Result<bool> {
        Ok(reader.read_u16(addr + 8)? == MotionKind::Camera.wire()
            && reader.read_u16(addr + 10)? == INTERPOLATE_LINEAR)
    }

    /// Writes the motion, returning the virtual head address (image base
    /// included). Dedup happens at the call sites through the motion map;
    /// this always emits.
    pub fn write(&self, writer: &mut EventWriter) -> Result<u32> {
        let mut channels = Vec::with_capacity(self.keyframes.len());

        for keys in &self.keyframes {
            let positions = if keys.positions.is_empty() {
                0
            } else {
                let addr = writer.pointer_position();
                for (frame, value) in &keys.positions {
                    writer.write_u32(*frame);
                    writer.write_vector3(*value);
                }
                addr
            };

            let rotations = if keys.rotations.is_empty() {
                0
            } else {
                let addr = writer.pointer_position();
                for (frame, value) in &keys.rotations {
                    writer.write_u32(*frame);
                    writer.write_i32(value[0]);
                    writer.write_i32(value[1]);
                    writer.write_i32(value[2]);
                }
                addr
            };

            let scales = if keys.scales.is_empty() {
                0
            } else {
                let addr = writer.pointer_position();
                for (frame, value) in &keys.scales {
                    writer.write_u32(*frame);
                    writer.write_vector3(*value);
                }
                addr
            };

            channels.push((positions, rotations, scales, keys));
        }

        let table_addr = writer.pointer_position();
        for (positions, rotations, scales, keys) in channels {
            writer.write_u32(positions);
            writer.write_u32(rotations);
            writer.write_u32(scales);
            writer.write_u32(keys.positions.len() as u32);
            writer.write_u32(keys.rotations.len() as u32);
            writer.write_u32(keys.scales.len() as u32);
        }

        let head_addr = writer.pointer_position();
        writer.write_u32(table_addr);
        writer.write_u32(self.frame_count);
        writer.write_u16(self.kind.wire());
        writer.write_u16(self.interpolation);

        Ok(head_addr)
    }

    /// Reads the motion headed at buffer offset `addr` (image base
    /// already subtracted, as pointer reads return it), reusing the
    /// pooled instance if the offset was decoded before.
    pub fn read(
        reader: &EventReader,
        addr: u32,
        node_count: u32,
        pool: &mut EventPool,
        motions: &mut AddressMap<MotionHandle>,
    ) -> Result<MotionHandle> {
        motions.get_or_read(addr, || {
            let table_addr = reader.read_pointer(addr)?;
            let frame_count = reader.read_u32(addr + 4)?;
            let kind = MotionKind::from_wire(reader.read_u16(addr + 8)?);
            let interpolation = reader.read_u16(addr + 10)?;

            let mut keyframes = Vec::with_capacity(node_count as usize);
            for i in 0..node_count {
                let entry = table_addr + i * CHANNEL_TABLE_ENTRY_SIZE;
                let position_count = reader.read_u32(entry + 12)?;
                let rotation_count = reader.read_u32(entry + 16)?;
                let scale_count = reader.read_u32(entry + 20)?;

                let mut keys = Keyframes::default();

                if let Some(mut key_addr) = reader.try_read_pointer(entry)? {
                    for _ in 0..position_count {
                        let frame = reader.read_u32(key_addr)?;
                        let value = reader.read_vector3(key_addr + 4)?;
                        keys.positions.push((frame, value));
                        key_addr += 16;
                    }
                }

                if let Some(mut key_addr) = reader.try_read_pointer(entry + 4)? {
                    for _ in 0..rotation_count {
                        let frame = reader.read_u32(key_addr)?;
                        let value = [
                            reader.read_i32(key_addr + 4)?,
                            reader.read_i32(key_addr + 8)?,
                            reader.read_i32(key_addr + 12)?,
                        ];
                        keys.rotations.push((frame, value));
                        key_addr += 16;
                    }
                }

                if let Some(mut key_addr) = reader.try_read_pointer(entry + 8)? {
                    for _ in 0..scale_count {
                        let frame = reader.read_u32(key_addr)?;
                        let value = reader.read_vector3(key_addr + 4)?;
                        keys.scales.push((frame, value));
                        key_addr += 16;
                    }
                }

                keyframes.push(keys);
            }

            Ok(pool.add_motion(Motion {
                node_count,
                frame_count,
                kind,
                interpolation,
                keyframes,
            }))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Endian;

    fn sample_motion() -> Motion {
        let mut motion = Motion::new(2, 60, MotionKind::Node);
        motion.keyframes[0]
            .positions
            .push((0, Vector3::new(1.0, 2.0, 3.0)));
        motion.keyframes[0]
            .positions
            .push((30, Vector3::new(4.0, 5.0, 6.0)));
        motion.keyframes[1].rotations.push((0, [0x4000, 0, -0x8000]));
        motion.keyframes[1]
            .scales
            .push((59, Vector3::new(1.0, 1.0, 1.0)));
        motion
    }

    #[test]
    fn motion_roundtrip() {
        let motion = sample_motion();
        let mut writer = EventWriter::new(0x1000, Endian::Big);
        let head = motion.write(&mut writer).unwrap();
        let data = writer.into_bytes();

        let reader = EventReader::new(&data, 0x1000, Endian::Big);
        let mut pool = EventPool::new();
        let mut map = AddressMap::new("motion");
        // write hands back a virtual address, read wants the offset
        let handle = Motion::read(&reader, head - 0x1000, 2, &mut pool, &mut map).unwrap();

        assert_eq!(*pool.motion(handle), motion);
    }

    #[test]
    fn repeated_read_aliases() {
        let motion = sample_motion();
        let mut writer = EventWriter::new(0, Endian::Little);
        let head = motion.write(&mut writer).unwrap();
        let data = writer.into_bytes();

        let reader = EventReader::new(&data, 0, Endian::Little);
        let mut pool = EventPool::new();
        let mut map = AddressMap::new("motion");
        let a = Motion::read(&reader, head, 2, &mut pool, &mut map).unwrap();
        let b = Motion::read(&reader, head, 2, &mut pool, &mut map).unwrap();
        assert_eq!(a, b);
        assert_eq!(pool.motion_count(), 1);
    }

    #[test]
    fn camera_head_tag() {
        let mut motion = Motion::new(1, 120, MotionKind::Camera);
        motion.keyframes[0]
            .positions
            .push((0, Vector3::new(0.0, 10.0, -5.0)));

        let mut writer = EventWriter::new(0, Endian::Big);
        let head = motion.write(&mut writer).unwrap();
        let data = writer.into_bytes();
        let reader = EventReader::new(&data, 0, Endian::Big);

        assert!(Motion::is_camera_head(&reader, head).unwrap());
        // the combined tag reads as one big endian word
        assert_eq!(reader.read_u32(head + 8).unwrap(), 0x01C1_0004);
    }

    #[test]
    fn kind_wire_roundtrip() {
        for kind in [
            MotionKind::Node,
            MotionKind::Shape,
            MotionKind::Camera,
            MotionKind::Other(0x0123),
        ] {
            assert_eq!(MotionKind::from_wire(kind.wire()), kind);
        }
    }
}
