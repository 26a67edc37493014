//! Motion pairs and the dedup table keyed on them.
//!
//! Scenes reference animations through [`EventMotion`] values, a pair of
//! optional animation and camera handles.  Two pairs are the same event
//! motion exactly when both handles match, which makes the pair itself a
//! cheap hash key.  The writer builds a [`MotionTable`] mapping each
//! distinct pair to its motion key: on the little endian platforms the
//! key is the file address of the written motion, on the cartridge
//! platforms it is the slot index into the separate motion buffer.  Key
//! zero always means "no motion", so the empty pair claims slot zero of
//! the motion buffer.

use std::collections::HashMap;

use crate::cursor::{Endian, EventReader, EventWriter};
use crate::error::{EventError, Result};
use crate::lut::AddressMap;
use crate::motion::{Camera, Motion, MOTION_HEAD_SIZE};
use crate::pool::{CameraHandle, EventPool, MotionHandle};

/// Motion key of the empty pair.
pub const MOTION_SLOT_EMPTY: u32 = 0;

/// Slot marker for pairs without an animation in the motion buffer.
const MOTION_SLOT_UNUSED: u32 = u32::MAX;

/// An animation paired with optional camera parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EventMotion {
    pub animation: Option<MotionHandle>,
    pub camera: Option<CameraHandle>,
}

impl EventMotion {
    pub const EMPTY: EventMotion = EventMotion {
        animation: None,
        camera: None,
    };

    pub fn animation(handle: MotionHandle) -> Self {
        EventMotion {
            animation: Some(handle),
            camera: None,
        }
    }
}

/// Maps each distinct event motion to its motion key.
#[derive(Debug, Clone, Default)]
pub struct MotionTable {
    keys: HashMap<EventMotion, u32>,
}

impl MotionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns slot indices to the distinct pairs of `motions` in first
    /// seen order.
    pub fn from_slots(motions: &[EventMotion]) -> Self {
        let mut table = Self::new();
        let mut index = 0;
        for &motion in motions {
            if !table.keys.contains_key(&motion) {
                table.keys.insert(motion, index);
                index += 1;
            }
        }
        table
    }

    pub fn insert(&mut self, motion: EventMotion, key: u32) {
        self.keys.insert(motion, key);
    }

    pub fn contains(&self, motion: EventMotion) -> bool {
        self.keys.contains_key(&motion)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Motion key of a pair, [`MOTION_SLOT_EMPTY`] when unregistered.
    pub fn key(&self, motion: EventMotion) -> u32 {
        self.keys.get(&motion).copied().unwrap_or(MOTION_SLOT_EMPTY)
    }

    /// Motion key of a bare animation.
    pub fn animation_key(&self, animation: Option<MotionHandle>) -> u32 {
        self.key(EventMotion {
            animation,
            camera: None,
        })
    }
}

/// Fetches a motion buffer slot by index, bounds checked.
pub fn slot_at(slots: &[EventMotion], index: u32) -> Result<EventMotion> {
    slots
        .get(index as usize)
        .copied()
        .ok_or(EventError::MotionIndexOutOfRange {
            index,
            len: slots.len(),
        })
}

/// Reads the motion pair referenced by the camera array slot at
/// `slot_addr` of a little endian platform file.
pub fn read_inline_camera_motion(
    reader: &EventReader,
    slot_addr: u32,
    pool: &mut EventPool,
    motions: &mut AddressMap<MotionHandle>,
    cameras: &mut AddressMap<CameraHandle>,
) -> Result<EventMotion> {
    let mut result = EventMotion::EMPTY;

    if let Some(motion_addr) = reader.try_read_pointer(slot_addr)? {
        result.animation = Some(Motion::read(reader, motion_addr, 1, pool, motions)?);

        if let Some(camera_addr) = reader.try_read_pointer(motion_addr + 0xC)? {
            result.camera = Some(Camera::read(reader, camera_addr, pool, cameras)?);
            let back = reader.read_pointer(motion_addr + 0x10)?;
            if back != motion_addr {
                return Err(EventError::CameraBackReference {
                    addr: motion_addr,
                    found: back,
                });
            }
        }
    }

    Ok(result)
}

/// Writes the contents of all motion pairs and returns the address each
/// distinct pair ended up at.
///
/// Cameras go first, then each distinct animation exactly once.  A pair
/// reusing an animation that an earlier pair already emitted gets a
/// fresh copy of the 12 byte head only.  Pairs with a camera get the
/// camera pointer and a back pointer to their own head appended, which
/// is what the reader validates against.
pub fn write_motion_contents(
    writer: &mut EventWriter,
    slots: &[EventMotion],
    pool: &EventPool,
    motions: &mut AddressMap<MotionHandle>,
    cameras: &mut AddressMap<CameraHandle>,
) -> Result<MotionTable> {
    for motion in slots {
        if motion.animation.is_none() {
            continue;
        }
        if let Some(camera) = motion.camera {
            Camera::write(camera, pool, writer, cameras)?;
        }
    }

    let mut table = MotionTable::new();

    for &motion in slots {
        let animation = match motion.animation {
            Some(animation) => animation,
            None => continue,
        };
        if table.contains(motion) {
            continue;
        }

        let head_addr = match motions.try_address(animation) {
            Some(prev_addr) => {
                let head = writer.read_bytes(prev_addr - writer.image_base(), MOTION_HEAD_SIZE as usize)?;
                let addr = writer.pointer_position();
                writer.write_bytes(&head);
                addr
            }
            None => {
                let addr = pool.motion(animation).write(writer)?;
                motions.insert(animation, addr);
                addr
            }
        };

        if let Some(camera) = motion.camera {
            let camera_addr = cameras.address(camera)?;
            writer.write_u32(camera_addr);
            writer.write_u32(head_addr);
        }

        table.insert(motion, head_addr);
    }

    Ok(table)
}

/// Writes a standalone motion buffer: the slot directory up front, the
/// motion contents behind it, slot pointers patched in afterwards.
pub fn write_motion_table(slots: &[EventMotion], pool: &EventPool) -> Result<Vec<u8>> {
    let mut writer = EventWriter::new(0, Endian::Big);

    let start = writer.position();
    writer.write_empty((slots.len() + 1) * 8);

    let mut motions = AddressMap::new("motion");
    let mut cameras = AddressMap::new("camera");
    let table = write_motion_contents(&mut writer, slots, pool, &mut motions, &mut cameras)?;

    writer.seek(start)?;
    for motion in slots {
        if motion.animation.is_some() {
            writer.write_u32(table.key(*motion));
        } else {
            writer.write_u32(MOTION_SLOT_UNUSED);
        }
        let node_count = motion.animation.map_or(0, |m| pool.motion(m).node_count);
        writer.write_u32(node_count);
    }
    writer.seek_end();

    Ok(writer.into_bytes())
}

/// Reads a standalone motion buffer back into its slot list, preserving
/// aliasing between slots that share an animation.
pub fn read_motion_table(data: &[u8], pool: &mut EventPool) -> Result<Vec<EventMotion>> {
    let reader = EventReader::new(data, 0, Endian::Big);
    let mut motions = AddressMap::new("motion");
    let mut cameras = AddressMap::new("camera");

    let mut slots = Vec::new();
    let mut addr = 0;
    while reader.read_u64(addr)? != 0 {
        slots.push(read_slot(&reader, addr, pool, &mut motions, &mut cameras)?);
        addr += 8;
    }

    Ok(slots)
}

fn read_slot(
    reader: &EventReader,
    addr: u32,
    pool: &mut EventPool,
    motions: &mut AddressMap<MotionHandle>,
    cameras: &mut AddressMap<CameraHandle>,
) -> Result<EventMotion> {
    if reader.read_u32(addr)? == MOTION_SLOT_UNUSED {
        return Ok(EventMotion::EMPTY);
    }

    let motion_addr = reader.read_pointer(addr)?;
    let node_count = reader.read_u32(addr + 4)?;
    let animation = Motion::read(reader, motion_addr, node_count, pool, motions)?;

    let mut camera = None;
    if node_count == 1 && Motion::is_camera_head(reader, motion_addr)? {
        let camera_addr = reader.read_pointer(motion_addr + 0xC)?;
        camera = Some(Camera::read(reader, camera_addr, pool, cameras)?);
        let back = reader.read_pointer(motion_addr + 0x10)?;
        if back != motion_addr {
            return Err(EventError::CameraBackReference {
                addr: motion_addr,
                found: back,
            });
        }
    }

    Ok(EventMotion {
        animation: Some(animation),
        camera,
    })
}
