//! Scenes, the cuts of a cutscene.
//!
//! Every event opens with a root scene that only collects the models
//! reused by the animated scenes; the animated scenes then reference
//! those models through their entries.  A scene struct is just eight
//! words of pointers and counts, all of its arrays are written during
//! earlier phases and fetched from the reservation slots here.

use crate::cursor::{EventReader, EventWriter};
use crate::error::Result;
use crate::lut::{PointerLut, SlotId};
use crate::model::big::BigEntry;
use crate::model::entry::EventEntry;
use crate::motion::{read_inline_camera_motion, slot_at, EventMotion, Motion, MotionTable};
use crate::pool::{EventPool, MotionHandle};

/// Size of the structure in bytes.
pub const SCENE_SIZE: u32 = 32;

/// One cut of an event.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub entries: Vec<EventEntry>,
    /// Camera motions played over the scene.
    pub camera_animations: Vec<EventMotion>,
    /// Particle motions; the index pairs up with the particle index in
    /// the effects file.
    pub particle_motions: Vec<Option<MotionHandle>>,
    pub big: Option<BigEntry>,
    /// Scene length in frames at 30 fps.
    pub frame_count: i32,
}

impl Scene {
    pub fn new(frame_count: i32) -> Self {
        Self {
            frame_count,
            ..Self::default()
        }
    }

    fn write_camera_motion_array(
        &self,
        scene_index: u32,
        writer: &mut EventWriter,
        motion_table: &MotionTable,
        lut: &mut PointerLut,
    ) -> Result<()> {
        let slot = SlotId::SceneCameras(scene_index);
        if lut.slots.try_address(slot).is_some() {
            return Ok(());
        }

        let addr = writer.pointer_position();
        if self.camera_animations.is_empty() {
            writer.write_empty(4);
        } else {
            for motion in &self.camera_animations {
                writer.write_u32(motion_table.key(*motion));
            }
        }
        lut.slots.insert(slot, addr);
        Ok(())
    }

    fn write_particle_motion_array(
        &self,
        scene_index: u32,
        writer: &mut EventWriter,
        motion_table: &MotionTable,
        lut: &mut PointerLut,
    ) -> Result<()> {
        let slot = SlotId::SceneParticles(scene_index);
        if lut.slots.try_address(slot).is_some() {
            return Ok(());
        }

        let addr = writer.pointer_position();
        if self.particle_motions.is_empty() {
            writer.write_empty(4);
        } else {
            for motion in &self.particle_motions {
                writer.write_u32(motion_table.animation_key(*motion));
            }
        }
        lut.slots.insert(slot, addr);
        Ok(())
    }

    /// Writes the motion reference arrays for all scenes: camera arrays
    /// first, then particle arrays, then the special entry pair arrays.
    pub fn write_motion_arrays(
        scenes: &[Scene],
        writer: &mut EventWriter,
        motion_table: &MotionTable,
        lut: &mut PointerLut,
    ) -> Result<()> {
        for (i, scene) in scenes.iter().enumerate() {
            scene.write_camera_motion_array(i as u32, writer, motion_table, lut)?;
        }
        for (i, scene) in scenes.iter().enumerate() {
            scene.write_particle_motion_array(i as u32, writer, motion_table, lut)?;
        }
        for (i, scene) in scenes.iter().enumerate() {
            if let Some(big) = &scene.big {
                big.write_motion_array(i as u32, writer, motion_table, lut)?;
            }
        }
        Ok(())
    }

    /// Writes the entry arrays and special entry structs for all scenes.
    pub fn write_entry_arrays(
        scenes: &[Scene],
        gc_layout: bool,
        writer: &mut EventWriter,
        motion_table: &MotionTable,
        lut: &mut PointerLut,
    ) -> Result<()> {
        for (i, scene) in scenes.iter().enumerate() {
            let slot = SlotId::SceneEntries(i as u32);
            if lut.slots.try_address(slot).is_some() {
                continue;
            }

            let addr = writer.pointer_position();
            if scene.entries.is_empty() {
                writer.write_empty(4);
            } else {
                for entry in &scene.entries {
                    if gc_layout {
                        entry.write_gc(writer, motion_table, lut)?;
                    } else {
                        entry.write_dc(writer, lut)?;
                    }
                }
            }
            lut.slots.insert(slot, addr);
        }

        for (i, scene) in scenes.iter().enumerate() {
            let big = match &scene.big {
                Some(big) => big,
                None => continue,
            };
            let slot = SlotId::BigEntry(i as u32);
            if lut.slots.try_address(slot).is_some() {
                continue;
            }

            let addr = writer.pointer_position();
            big.write(i as u32, writer, lut)?;
            lut.slots.insert(slot, addr);
        }

        Ok(())
    }

    /// Writes the scene struct. All referenced arrays must have been
    /// written.
    pub fn write(&self, scene_index: u32, writer: &mut EventWriter, lut: &PointerLut) -> Result<()> {
        let entries_addr = lut.slots.address(SlotId::SceneEntries(scene_index))?;
        let cameras_addr = lut.slots.address(SlotId::SceneCameras(scene_index))?;
        let particles_addr = lut.slots.address(SlotId::SceneParticles(scene_index))?;
        let big_addr = match self.big {
            Some(_) => lut.slots.address(SlotId::BigEntry(scene_index))?,
            None => 0,
        };

        writer.write_u32(entries_addr);
        writer.write_i32(self.entries.len() as i32);
        writer.write_u32(cameras_addr);
        writer.write_i32(self.camera_animations.len() as i32);
        writer.write_u32(particles_addr);
        writer.write_i32(self.particle_motions.len() as i32);
        writer.write_u32(big_addr);
        writer.write_i32(self.frame_count);
        Ok(())
    }

    /// Reads a dreamcast layout scene at `addr`.
    pub fn read_dc(
        reader: &EventReader,
        addr: u32,
        pool: &mut EventPool,
        lut: &mut PointerLut,
    ) -> Result<Scene> {
        let mut scene = Scene::new(reader.read_i32(addr + 0x1C)?);

        let mut entry_addr = reader.read_pointer(addr)?;
        let entry_count = reader.read_i32(addr + 4)?;
        for _ in 0..entry_count {
            let entry = EventEntry::read_dc(reader, &mut entry_addr, pool, lut)?;
            if entry.has_model() {
                scene.entries.push(entry);
            }
        }

        let mut camera_addr = reader.read_pointer(addr + 8)?;
        let camera_count = reader.read_i32(addr + 0xC)?;
        for _ in 0..camera_count {
            let motion = read_inline_camera_motion(
                reader,
                camera_addr,
                pool,
                &mut lut.motions,
                &mut lut.cameras,
            )?;
            scene.camera_animations.push(motion);
            camera_addr += 4;
        }

        let mut particle_addr = reader.read_pointer(addr + 0x10)?;
        let particle_count = reader.read_i32(addr + 0x14)?;
        for _ in 0..particle_count {
            let motion = match reader.try_read_pointer(particle_addr)? {
                Some(motion_addr) => {
                    Some(Motion::read(reader, motion_addr, 1, pool, &mut lut.motions)?)
                }
                None => None,
            };
            scene.particle_motions.push(motion);
            particle_addr += 4;
        }

        if let Some(big_addr) = reader.try_read_pointer(addr + 0x18)? {
            scene.big = Some(BigEntry::read_dc(reader, big_addr, pool, lut)?);
        }

        Ok(scene)
    }

    /// Reads a gamecube layout scene at `addr`, motions resolved through
    /// the motion buffer slots.
    pub fn read_gc(
        reader: &EventReader,
        addr: u32,
        slots: &[EventMotion],
        pool: &mut EventPool,
        lut: &mut PointerLut,
    ) -> Result<Scene> {
        let mut scene = Scene::new(reader.read_i32(addr + 0x1C)?);

        let mut entry_addr = reader.read_pointer(addr)?;
        let entry_count = reader.read_i32(addr + 4)?;
        for _ in 0..entry_count {
            let entry = EventEntry::read_gc(reader, &mut entry_addr, slots, pool, lut)?;
            if entry.has_model() {
                scene.entries.push(entry);
            }
        }

        let mut camera_addr = reader.read_pointer(addr + 8)?;
        let camera_count = reader.read_i32(addr + 0xC)?;
        for _ in 0..camera_count {
            scene
                .camera_animations
                .push(slot_at(slots, reader.read_u32(camera_addr)?)?);
            camera_addr += 4;
        }

        let mut particle_addr = reader.read_pointer(addr + 0x10)?;
        let particle_count = reader.read_i32(addr + 0x14)?;
        for _ in 0..particle_count {
            scene
                .particle_motions
                .push(slot_at(slots, reader.read_u32(particle_addr)?)?.animation);
            particle_addr += 4;
        }

        if let Some(big_addr) = reader.try_read_pointer(addr + 0x18)? {
            scene.big = Some(BigEntry::read_gc(reader, big_addr, slots, pool, lut)?);
        }

        Ok(scene)
    }
}
