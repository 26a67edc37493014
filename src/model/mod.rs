//! The main model buffer of an event.
//!
//! [`ModelData`] ties the whole model side together: scenes with their
//! entries and motions, the texture name list, reflections, the upgrade
//! and blare tables and the surface animations.  Its header is ten (on
//! the GameCube eleven) pointer slots that are reserved up front and
//! patched once everything behind them has been written.
//!
//! # Write phases
//!
//! The encoder runs in a fixed phase order so that every pointer it
//! emits refers to content that already exists:
//!
//! 1. header reservation
//! 2. model trees (overlay models, then scene models in reverse order)
//! 3. motion contents (inline) or motion slot assignment (motion buffer)
//! 4. texture list reservation, dimension table, motion arrays,
//!    reflections, blare and upgrade tables, surface animations, entry
//!    arrays, scene structs, label strings
//! 5. texture list and header backpatch

pub mod big;
pub mod entry;
pub mod node;
pub mod reflection;
pub mod scene;
pub mod texture;
pub mod upgrade;

pub use big::BigEntry;
pub use entry::{entry_flags, EventEntry};
pub use node::{Attach, Node};
pub use reflection::{Reflection, ReflectionData};
pub use scene::Scene;
pub use texture::{TextureName, TextureNameList};
pub use upgrade::OverlayUpgrade;

use std::collections::HashSet;

use crate::cursor::{EventReader, EventWriter};
use crate::error::{EventError, Result};
use crate::lut::PointerLut;
use crate::motion::surface::SurfaceAnimationData;
use crate::motion::{
    read_motion_table, write_motion_contents, EventMotion, MotionTable,
};
use crate::platform::Platform;
use crate::pool::{EventPool, NodeHandle};

/// Number of blare model slots in the header table.
pub const BLARE_SLOTS: usize = 64;

/// Number of integrated upgrade slots per group.
pub const INTEGRATED_UPGRADE_SLOTS: usize = 31;

/// Number of integrated upgrade groups. The first two are upgrade
/// models, the third holds the defaults they replace.
pub const INTEGRATED_UPGRADE_GROUPS: usize = 3;

/// The decoded model buffer of an event.
#[derive(Debug, Clone)]
pub struct ModelData {
    pub platform: Platform,
    /// First scene is the root scene holding the shared models; it
    /// plays no animations.
    pub scenes: Vec<Scene>,
    pub texture_names: TextureNameList,
    /// Pixel dimensions per texture.
    pub texture_dimensions: Vec<(i16, i16)>,
    pub reflections: ReflectionData,
    /// Models participating in the blare effect.
    pub blare_models: [Option<NodeHandle>; BLARE_SLOTS],
    /// Upgrade models integrated into character trees, toggled by
    /// upgrade state at runtime.
    pub integrated_upgrades: [[Option<NodeHandle>; INTEGRATED_UPGRADE_GROUPS]; INTEGRATED_UPGRADE_SLOTS],
    /// Root node of the tails model used for procedural animation.
    pub tails_tails: Option<NodeHandle>,
    pub overlay_upgrades: [OverlayUpgrade; upgrade::OVERLAY_UPGRADE_SLOTS],
    pub surface_animations: Option<SurfaceAnimationData>,
    /// GameCube only: drop shadow rendering switch.
    pub enable_drop_shadows: bool,
    /// Storage for all shared objects referenced by the fields above.
    pub pool: EventPool,
}

impl ModelData {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            scenes: Vec::new(),
            texture_names: TextureNameList::default(),
            texture_dimensions: Vec::new(),
            reflections: ReflectionData::default(),
            blare_models: [None; BLARE_SLOTS],
            integrated_upgrades: [[None; INTEGRATED_UPGRADE_GROUPS]; INTEGRATED_UPGRADE_SLOTS],
            tails_tails: None,
            overlay_upgrades: [OverlayUpgrade::default(); upgrade::OVERLAY_UPGRADE_SLOTS],
            surface_animations: None,
            enable_drop_shadows: false,
            pool: EventPool::new(),
        }
    }

    /// Collects the distinct motion pairs of all scenes in a stable
    /// first seen order, the empty pair leading.
    pub fn collect_event_motions(&self) -> Vec<EventMotion> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();

        let mut add = |motion: EventMotion| {
            if seen.insert(motion) {
                result.push(motion);
            }
        };
        add(EventMotion::EMPTY);

        for scene in &self.scenes {
            for entry in &scene.entries {
                if let Some(animation) = entry.animation {
                    add(EventMotion::animation(animation));
                }
                if let Some(animation) = entry.shape_animation {
                    add(EventMotion::animation(animation));
                }
            }
            for motion in &scene.camera_animations {
                add(*motion);
            }
            for motion in &scene.particle_motions {
                if let Some(animation) = motion {
                    add(EventMotion::animation(*animation));
                }
            }
            if let Some(big) = &scene.big {
                for (node_anim, shape_anim) in &big.motions {
                    if let Some(animation) = node_anim {
                        add(EventMotion::animation(*animation));
                    }
                    if let Some(animation) = shape_anim {
                        add(EventMotion::animation(*animation));
                    }
                }
            }
        }

        result
    }

    /// Collects the distinct root models of the event in first seen
    /// order: entry models, Big-the-Cat models and, when requested, the
    /// overlay upgrade models.
    pub fn models(&self, include_overlay_upgrades: bool) -> Vec<NodeHandle> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();

        let mut add = |model: Option<NodeHandle>| {
            if let Some(node) = model {
                if seen.insert(node) {
                    result.push(node);
                }
            }
        };

        for scene in &self.scenes {
            for entry in &scene.entries {
                add(entry.model);
                add(entry.gc_model);
                add(entry.shadow_model);
            }
            if let Some(big) = &scene.big {
                add(big.model);
            }
        }

        if include_overlay_upgrades {
            for upgrade in &self.overlay_upgrades {
                add(upgrade.model1);
                add(upgrade.model2);
            }
        }

        result
    }

    /// Like [`models`](Self::models), but without the models driven by a
    /// node animation in some scene.
    pub fn non_animated_models(&self, include_overlay_upgrades: bool) -> Vec<NodeHandle> {
        let mut animated = HashSet::new();

        for scene in &self.scenes {
            for entry in &scene.entries {
                if entry.animation.is_some() {
                    animated.extend(
                        [entry.model, entry.gc_model, entry.shadow_model]
                            .into_iter()
                            .flatten(),
                    );
                }
            }
            if let Some(big) = &scene.big {
                let plays = big
                    .motions
                    .iter()
                    .any(|&(node, shape)| node.is_some() || shape.is_some());
                if plays {
                    animated.extend(big.model);
                }
            }
        }

        self.models(include_overlay_upgrades)
            .into_iter()
            .filter(|node| !animated.contains(node))
            .collect()
    }

    fn header_size(&self) -> usize {
        if self.platform == Platform::Gc {
            if self.enable_drop_shadows {
                64
            } else {
                44
            }
        } else {
            40
        }
    }

    /// Encodes the model buffer. Returns the buffer and the motion slot
    /// list; on the GameCube the slots must be written to a separate
    /// motion buffer with [`crate::motion::write_motion_table`].
    pub fn write(&self) -> Result<(Vec<u8>, Vec<EventMotion>)> {
        let mut writer = EventWriter::new(self.platform.main_image_base(), self.platform.endian());
        let mut lut = PointerLut::new();

        let start = writer.position();
        writer.write_empty(self.header_size());

        self.write_models(&mut writer, &mut lut)?;

        let motions = self.collect_event_motions();
        let motion_table = if self.platform.uses_motion_buffer() {
            MotionTable::from_slots(&motions)
        } else {
            write_motion_contents(
                &mut writer,
                &motions,
                &self.pool,
                &mut lut.motions,
                &mut lut.cameras,
            )?
        };

        let header = self.write_event_data(&mut writer, &motion_table, &mut lut)?;

        let end = writer.position();
        writer.seek(start)?;
        for value in header {
            writer.write_u32(value);
        }
        writer.seek(end)?;
        writer.seek_end();

        Ok((writer.into_bytes(), motions))
    }

    /// Phase two: every model tree, so later struct writes can resolve
    /// node pointers. Scene models go in reverse scene order.
    fn write_models(&self, writer: &mut EventWriter, lut: &mut PointerLut) -> Result<()> {
        for upgrade in &self.overlay_upgrades {
            upgrade.write_models(writer, &self.pool, lut)?;
        }

        for scene in self.scenes.iter().rev() {
            if let Some(model) = scene.big.as_ref().and_then(|big| big.model) {
                node::write_node(writer, &self.pool, lut, model)?;
            }

            for entry in scene.entries.iter().rev() {
                match entry.model {
                    Some(model) => {
                        node::write_node(writer, &self.pool, lut, model)?;
                    }
                    None if !self.platform.uses_gc_entries() => {
                        return Err(EventError::MissingEntryModel);
                    }
                    None => {}
                }

                if self.platform.uses_gc_entries() {
                    if let Some(model) = entry.shadow_model {
                        node::write_node(writer, &self.pool, lut, model)?;
                    }
                    if let Some(model) = entry.gc_model {
                        node::write_node(writer, &self.pool, lut, model)?;
                    }
                }
            }
        }

        Ok(())
    }

    fn write_event_data(
        &self,
        writer: &mut EventWriter,
        motion_table: &MotionTable,
        lut: &mut PointerLut,
    ) -> Result<Vec<u32>> {
        let gc = self.platform == Platform::Gc;
        let mut header = vec![0u32; if gc { 11 } else { 10 }];

        // texture list comes first but can only be filled after the
        // label strings exist, so its region is reserved
        let texlist_pos = writer.position();
        writer.write_empty(self.texture_names.reserved_size());

        header[3] = writer.pointer_position();
        for (x, y) in &self.texture_dimensions {
            writer.write_i16(*x);
            writer.write_i16(*y);
        }

        Scene::write_motion_arrays(&self.scenes, writer, motion_table, lut)?;

        header[4] = self.reflections.write(writer)?;

        header[5] = writer.pointer_position();
        for model in &self.blare_models {
            writer.write_u32(node_address(lut, *model)?);
        }

        header[6] = writer.pointer_position();
        for group in 0..INTEGRATED_UPGRADE_GROUPS {
            for slot in 0..INTEGRATED_UPGRADE_SLOTS {
                writer.write_u32(node_address(lut, self.integrated_upgrades[slot][group])?);
            }
        }

        // slot for the procedural tail animation root; tolerated to be
        // absent from the written models
        header[7] = writer.pointer_position();
        let tails_addr = self
            .tails_tails
            .and_then(|node| lut.nodes.try_address(node))
            .unwrap_or(0);
        writer.write_u32(tails_addr);

        header[8] = writer.pointer_position();
        for upgrade in self.overlay_upgrades.iter().take(self.platform.upgrade_count()) {
            upgrade.write(writer, lut)?;
        }

        if self.platform.has_surface_animations() {
            if let Some(surface) = &self.surface_animations {
                header[9] = surface.write(writer, self.platform != Platform::Dc, lut)?;
            }
        }

        Scene::write_entry_arrays(&self.scenes, gc, writer, motion_table, lut)?;

        header[0] = writer.pointer_position();
        header[2] = (self.scenes.len() as i32 - 1) as u32;
        for (i, scene) in self.scenes.iter().enumerate() {
            scene.write(i as u32, writer, lut)?;
        }

        if gc {
            header[10] = u32::from(self.enable_drop_shadows);
        }

        self.texture_names.write_labels(writer, &mut lut.labels);

        let end = writer.position();
        writer.seek(texlist_pos)?;
        header[1] = self.texture_names.write(writer, &lut.labels)?;
        writer.seek(end)?;

        Ok(header)
    }

    /// Decodes a model buffer. The GameCube layout additionally needs
    /// the motion buffer contents.
    pub fn read(data: &[u8], motion_data: Option<&[u8]>) -> Result<ModelData> {
        Self::read_as(data, Platform::detect(data)?, motion_data)
    }

    /// Decodes a model buffer for a known platform, skipping the
    /// detection heuristic.
    pub fn read_as(
        data: &[u8],
        platform: Platform,
        motion_data: Option<&[u8]>,
    ) -> Result<ModelData> {
        let reader = EventReader::new(data, platform.main_image_base(), platform.endian());

        let mut pool = EventPool::new();
        let mut lut = PointerLut::new();
        let mut result = ModelData::new(platform);

        let scene_count = reader.read_i32(8)? + 1;
        let mut scene_addr = reader.read_pointer(0)?;

        if platform.uses_motion_buffer() {
            let motion_data =
                motion_data.ok_or(EventError::MissingMotionBuffer(platform))?;
            let slots = read_motion_table(motion_data, &mut pool)?;

            for _ in 0..scene_count {
                result
                    .scenes
                    .push(Scene::read_gc(&reader, scene_addr, &slots, &mut pool, &mut lut)?);
                scene_addr += scene::SCENE_SIZE;
            }
        } else {
            for _ in 0..scene_count {
                result
                    .scenes
                    .push(Scene::read_dc(&reader, scene_addr, &mut pool, &mut lut)?);
                scene_addr += scene::SCENE_SIZE;
            }
        }

        result.texture_names =
            TextureNameList::read(&reader, reader.read_pointer(4)?, &mut lut.labels)?;

        let mut dim_addr = reader.read_pointer(0xC)?;
        for _ in 0..result.texture_names.names.len() {
            result
                .texture_dimensions
                .push((reader.read_i16(dim_addr)?, reader.read_i16(dim_addr + 2)?));
            dim_addr += 4;
        }

        result.reflections = ReflectionData::read(&reader, reader.read_pointer(0x10)?)?;

        let mut blare_addr = reader.read_pointer(0x14)?;
        for slot in result.blare_models.iter_mut() {
            if let Some(node_addr) = reader.try_read_pointer(blare_addr)? {
                *slot = Some(lut.nodes.value(node_addr)?);
            }
            blare_addr += 4;
        }

        let mut upgrade_addr = reader.read_pointer(0x18)?;
        for group in 0..INTEGRATED_UPGRADE_GROUPS {
            for slot in 0..INTEGRATED_UPGRADE_SLOTS {
                if let Some(node_addr) = reader.try_read_pointer(upgrade_addr)? {
                    result.integrated_upgrades[slot][group] = Some(lut.nodes.value(node_addr)?);
                }
                upgrade_addr += 4;
            }
        }

        let tails_slot = reader.read_pointer(0x1C)?;
        if let Some(node_addr) = reader.try_read_pointer(tails_slot)? {
            result.tails_tails = Some(lut.nodes.value(node_addr)?);
        }

        let mut overlay_addr = reader.read_pointer(0x20)?;
        for i in 0..platform.upgrade_count() {
            result.overlay_upgrades[i] =
                OverlayUpgrade::read(&reader, overlay_addr, &mut pool, &mut lut)?;
            overlay_addr += upgrade::OVERLAY_UPGRADE_SIZE;
        }

        if platform.has_surface_animations() {
            if let Some(surface_addr) = reader.try_read_pointer(0x24)? {
                result.surface_animations = Some(SurfaceAnimationData::read(
                    &reader,
                    surface_addr,
                    platform != Platform::Dc,
                    &lut,
                )?);
            }
        }

        if platform == Platform::Gc {
            result.enable_drop_shadows = reader.read_u32(0x28)? > 0;
        }

        result.pool = pool;
        Ok(result)
    }
}

fn node_address(lut: &PointerLut, node: Option<NodeHandle>) -> Result<u32> {
    match node {
        Some(node) => lut.nodes.address(node),
        None => Ok(0),
    }
}
