//! Effects buffer codec: screen fades, particles, lighting, blare, particle
//! emitters and video overlays.
//!
//! The buffer is a set of fixed-size slot arrays at fixed offsets with no
//! pointers between them, so it is decoded with an image base of zero. The
//! base-language timestamps occupy the region in front of the first slot
//! array and act as the fallback when no language file overrides them.

use crate::cursor::{Endian, EventReader, EventWriter};
use crate::error::Result;
use crate::language::LanguageTimestamps;
use crate::types::{Color, Vector3};

pub const SCREEN_EFFECT_SLOTS: usize = 64;
pub const SIMPLE_PARTICLE_SLOTS: usize = 2048;
pub const LIGHTING_SETS: usize = 4;
pub const LIGHTING_SLOTS: usize = 256;
pub const BLARE_EFFECT_SLOTS: usize = 64;
pub const PARTICLE_EMITTER_SLOTS: usize = 64;
pub const VIDEO_OVERLAY_SLOTS: usize = 64;

pub const SCREEN_EFFECT_SIZE: u32 = 64;
pub const SIMPLE_PARTICLE_SIZE: u32 = 56;
pub const OBJECT_LIGHTING_SIZE: u32 = 68;
pub const BLARE_EFFECT_SIZE: u32 = 64;
pub const PARTICLE_EMITTER_SIZE: u32 = 64;
pub const VIDEO_OVERLAY_SIZE: u32 = 64;

const SCREEN_EFFECTS_OFFSET: u32 = 0x9800;
const SIMPLE_PARTICLES_OFFSET: u32 = 0xA800;
const LIGHTING_OFFSETS: [u32; LIGHTING_SETS] = [0x26800, 0x2AC00, 0x2F000, 0x33400];
const BLARE_EFFECTS_OFFSET: u32 = 0x37800;
const PARTICLE_EMITTERS_OFFSET: u32 = 0x38800;
const VIDEO_OVERLAYS_OFFSET: u32 = 0x39800;

/// Width of the fixed video file name field, including the terminator.
pub const VIDEO_FILENAME_LEN: usize = 48;

/// Blare model index value marking an unused reference.
pub const BLARE_MODEL_NONE: u8 = u8::MAX;

/// How a screen effect transitions in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenEffectKind {
    #[default]
    None,
    ForegroundFadeIn,
    ForegroundCutIn,
    TextureFadeIn,
    TextureCutIn,
    BackgroundFadeIn,
    BackgroundCutIn,
    Other(u8),
}

impl ScreenEffectKind {
    pub fn wire(self) -> u8 {
        match self {
            ScreenEffectKind::None => 0,
            ScreenEffectKind::ForegroundFadeIn => 1,
            ScreenEffectKind::ForegroundCutIn => 2,
            ScreenEffectKind::TextureFadeIn => 3,
            ScreenEffectKind::TextureCutIn => 4,
            ScreenEffectKind::BackgroundFadeIn => 5,
            ScreenEffectKind::BackgroundCutIn => 6,
            ScreenEffectKind::Other(raw) => raw,
        }
    }

    pub fn from_wire(raw: u8) -> Self {
        match raw {
            0 => ScreenEffectKind::None,
            1 => ScreenEffectKind::ForegroundFadeIn,
            2 => ScreenEffectKind::ForegroundCutIn,
            3 => ScreenEffectKind::TextureFadeIn,
            4 => ScreenEffectKind::TextureCutIn,
            5 => ScreenEffectKind::BackgroundFadeIn,
            6 => ScreenEffectKind::BackgroundCutIn,
            other => ScreenEffectKind::Other(other),
        }
    }
}

/// Kinds of hardcoded particle bursts a [`SimpleParticle`] can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimpleParticleKind {
    #[default]
    None,
    DustPuff,
    Sparkle1,
    Sparkle2,
    DirtPath,
    FireBlast,
    Steam,
    SnowBlast,
    EnableSun,
    DisableSun,
    WaterSplash,
    SmokeCloud,
    SteamPuff,
    RocketSteamPuff,
    FlamePuff,
    PulseStart,
    PulseEnd,
    Other(u8),
}

impl SimpleParticleKind {
    pub fn wire(self) -> u8 {
        match self {
            SimpleParticleKind::None => 0,
            SimpleParticleKind::DustPuff => 1,
            SimpleParticleKind::Sparkle1 => 2,
            SimpleParticleKind::Sparkle2 => 3,
            SimpleParticleKind::DirtPath => 4,
            SimpleParticleKind::FireBlast => 5,
            SimpleParticleKind::Steam => 6,
            SimpleParticleKind::SnowBlast => 7,
            SimpleParticleKind::EnableSun => 8,
            SimpleParticleKind::DisableSun => 9,
            SimpleParticleKind::WaterSplash => 10,
            SimpleParticleKind::SmokeCloud => 11,
            SimpleParticleKind::SteamPuff => 12,
            SimpleParticleKind::RocketSteamPuff => 13,
            SimpleParticleKind::FlamePuff => 14,
            SimpleParticleKind::PulseStart => 17,
            SimpleParticleKind::PulseEnd => 18,
            SimpleParticleKind::Other(raw) => raw,
        }
    }

    pub fn from_wire(raw: u8) -> Self {
        match raw {
            0 => SimpleParticleKind::None,
            1 => SimpleParticleKind::DustPuff,
            2 => SimpleParticleKind::Sparkle1,
            3 => SimpleParticleKind::Sparkle2,
            4 => SimpleParticleKind::DirtPath,
            5 => SimpleParticleKind::FireBlast,
            6 => SimpleParticleKind::Steam,
            7 => SimpleParticleKind::SnowBlast,
            8 => SimpleParticleKind::EnableSun,
            9 => SimpleParticleKind::DisableSun,
            10 => SimpleParticleKind::WaterSplash,
            11 => SimpleParticleKind::SmokeCloud,
            12 => SimpleParticleKind::SteamPuff,
            13 => SimpleParticleKind::RocketSteamPuff,
            14 => SimpleParticleKind::FlamePuff,
            17 => SimpleParticleKind::PulseStart,
            18 => SimpleParticleKind::PulseEnd,
            other => SimpleParticleKind::Other(other),
        }
    }
}

/// How scene lighting transitions in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightFadeMode {
    #[default]
    None,
    Cut,
    FadeIn,
    Other(u32),
}

impl LightFadeMode {
    pub fn wire(self) -> u32 {
        match self {
            LightFadeMode::None => 0,
            LightFadeMode::Cut => 1,
            LightFadeMode::FadeIn => 2,
            LightFadeMode::Other(raw) => raw,
        }
    }

    pub fn from_wire(raw: u32) -> Self {
        match raw {
            0 => LightFadeMode::None,
            1 => LightFadeMode::Cut,
            2 => LightFadeMode::FadeIn,
            other => LightFadeMode::Other(other),
        }
    }
}

/// How a video overlay is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoOverlayKind {
    #[default]
    None,
    Overlay,
    Mesh,
    Overlay1,
    Overlay2,
    Pause,
    Resume,
    Other(u8),
}

impl VideoOverlayKind {
    pub fn wire(self) -> u8 {
        match self {
            VideoOverlayKind::None => 0,
            VideoOverlayKind::Overlay => 1,
            VideoOverlayKind::Mesh => 2,
            VideoOverlayKind::Overlay1 => 3,
            VideoOverlayKind::Overlay2 => 4,
            VideoOverlayKind::Pause => 5,
            VideoOverlayKind::Resume => 6,
            VideoOverlayKind::Other(raw) => raw,
        }
    }

    pub fn from_wire(raw: u8) -> Self {
        match raw {
            0 => VideoOverlayKind::None,
            1 => VideoOverlayKind::Overlay,
            2 => VideoOverlayKind::Mesh,
            3 => VideoOverlayKind::Overlay1,
            4 => VideoOverlayKind::Overlay2,
            5 => VideoOverlayKind::Pause,
            6 => VideoOverlayKind::Resume,
            other => VideoOverlayKind::Other(other),
        }
    }
}

/// Colored quad or texture rendered over the whole frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenEffect {
    pub frame: u32,
    pub kind: ScreenEffectKind,
    pub color: Color,
    pub fade_out: bool,
    /// Event texture to render for the texture kinds.
    pub texture_id: u16,
    pub frame_time: u32,
    pub position_x: i16,
    pub position_y: i16,
    pub width: f32,
    pub height: f32,
}

impl ScreenEffect {
    fn write(self, writer: &mut EventWriter) {
        writer.write_u32(self.frame);
        writer.write_u8(self.kind.wire());
        writer.write_empty(3);
        writer.write_u32(self.color.to_argb8());
        writer.write_u8(self.fade_out as u8);
        writer.write_empty(1);
        writer.write_u16(self.texture_id);
        writer.write_u32(self.frame_time);
        writer.write_i16(self.position_x);
        writer.write_i16(self.position_y);
        writer.write_f32(self.width);
        writer.write_f32(self.height);
        writer.write_empty(32);
    }

    fn read(reader: &EventReader, addr: u32) -> Result<Self> {
        Ok(Self {
            frame: reader.read_u32(addr)?,
            kind: ScreenEffectKind::from_wire(reader.read_u8(addr + 4)?),
            color: Color::from_argb8(reader.read_u32(addr + 8)?),
            fade_out: reader.read_u8(addr + 0xC)? > 0,
            texture_id: reader.read_u16(addr + 0xE)?,
            frame_time: reader.read_u32(addr + 0x10)?,
            position_x: reader.read_i16(addr + 0x14)?,
            position_y: reader.read_i16(addr + 0x16)?,
            width: reader.read_f32(addr + 0x18)?,
            height: reader.read_f32(addr + 0x1C)?,
        })
    }
}

/// One-shot particle burst bound to a particle motion slot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SimpleParticle {
    pub frame: u32,
    pub kind: SimpleParticleKind,
    /// Index of the particle motion the burst plays on.
    pub motion_id: u8,
    /// Event texture id, stored as a float. Used by the pulse kinds.
    pub texture_id: f32,
    pub pulse_control: f32,
    pub unknown: f32,
    pub scale: f32,
}

impl SimpleParticle {
    fn write(self, writer: &mut EventWriter) {
        writer.write_u32(self.frame);
        writer.write_u8(self.kind.wire());
        writer.write_u8(self.motion_id);
        writer.write_empty(2);
        writer.write_f32(self.texture_id);
        writer.write_f32(self.pulse_control);
        writer.write_f32(self.unknown);
        writer.write_f32(self.scale);
        writer.write_empty(32);
    }

    fn read(reader: &EventReader, addr: u32) -> Result<Self> {
        Ok(Self {
            frame: reader.read_u32(addr)?,
            kind: SimpleParticleKind::from_wire(reader.read_u8(addr + 4)?),
            motion_id: reader.read_u8(addr + 5)?,
            texture_id: reader.read_f32(addr + 8)?,
            pulse_control: reader.read_f32(addr + 0xC)?,
            unknown: reader.read_f32(addr + 0x10)?,
            scale: reader.read_f32(addr + 0x14)?,
        })
    }
}

/// Scene-wide directional light keyframe. Colors are stored as three
/// floats per channel, not as packed ARGB.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ObjectLighting {
    pub frame: u32,
    pub fade: LightFadeMode,
    pub direction: Vector3,
    pub diffuse: [f32; 3],
    pub intensity: f32,
    pub ambient: [f32; 3],
}

impl ObjectLighting {
    fn write(self, writer: &mut EventWriter) {
        writer.write_u32(self.frame);
        writer.write_u32(self.fade.wire());
        writer.write_vector3(self.direction);
        for channel in self.diffuse {
            writer.write_f32(channel);
        }
        writer.write_f32(self.intensity);
        for channel in self.ambient {
            writer.write_f32(channel);
        }
        writer.write_empty(20);
    }

    fn read(reader: &EventReader, addr: u32) -> Result<Self> {
        let rgb = |base: u32| -> Result<[f32; 3]> {
            Ok([
                reader.read_f32(base)?,
                reader.read_f32(base + 4)?,
                reader.read_f32(base + 8)?,
            ])
        };
        Ok(Self {
            frame: reader.read_u32(addr)?,
            fade: LightFadeMode::from_wire(reader.read_u32(addr + 4)?),
            direction: reader.read_vector3(addr + 8)?,
            diffuse: rgb(addr + 0x14)?,
            intensity: reader.read_f32(addr + 0x20)?,
            ambient: rgb(addr + 0x24)?,
        })
    }
}

/// Motion blur ghosting effect. Indices refer to the blare model table of
/// the model data; [`BLARE_MODEL_NONE`] marks an unused index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlareEffect {
    pub frame: u32,
    /// Frames during which ghosts keep spawning.
    pub duration: i32,
    pub model_indices: [u8; 6],
    /// Frames it takes a spawned ghost to fade out.
    pub ghost_life_span: i32,
}

impl BlareEffect {
    fn write(self, writer: &mut EventWriter) {
        writer.write_u32(self.frame);
        writer.write_i32(self.duration);
        writer.write_bytes(&self.model_indices);
        writer.write_empty(2);
        writer.write_i32(self.ghost_life_span);
        writer.write_empty(44);
    }

    fn read(reader: &EventReader, addr: u32) -> Result<Self> {
        let mut model_indices = [0u8; 6];
        for (i, slot) in model_indices.iter_mut().enumerate() {
            *slot = reader.read_u8(addr + 8 + i as u32)?;
        }
        Ok(Self {
            frame: reader.read_u32(addr)?,
            duration: reader.read_i32(addr + 4)?,
            model_indices,
            ghost_life_span: reader.read_i32(addr + 0x10)?,
        })
    }
}

/// Freestanding particle emitter. Most fields are not understood yet.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParticleEmitter {
    pub position: Vector3,
    pub unknown2: Vector3,
    pub unknown3: u16,
    pub unknown4: u16,
    pub unknown5: u16,
    pub unknown6: u16,
    pub frame: u32,
    pub spread: Vector3,
    pub count: i32,
    pub unknown9: i32,
    pub kind: i32,
    pub unknown11: i32,
}

impl ParticleEmitter {
    fn write(self, writer: &mut EventWriter) {
        writer.write_vector3(self.position);
        writer.write_vector3(self.unknown2);
        writer.write_u16(self.unknown3);
        writer.write_u16(self.unknown4);
        writer.write_u16(self.unknown5);
        writer.write_u16(self.unknown6);
        writer.write_u32(self.frame);
        writer.write_vector3(self.spread);
        writer.write_i32(self.count);
        writer.write_i32(self.unknown9);
        writer.write_i32(self.kind);
        writer.write_i32(self.unknown11);
    }

    fn read(reader: &EventReader, addr: u32) -> Result<Self> {
        Ok(Self {
            position: reader.read_vector3(addr)?,
            unknown2: reader.read_vector3(addr + 0xC)?,
            unknown3: reader.read_u16(addr + 0x18)?,
            unknown4: reader.read_u16(addr + 0x1A)?,
            unknown5: reader.read_u16(addr + 0x1C)?,
            unknown6: reader.read_u16(addr + 0x1E)?,
            frame: reader.read_u32(addr + 0x20)?,
            spread: reader.read_vector3(addr + 0x24)?,
            count: reader.read_i32(addr + 0x30)?,
            unknown9: reader.read_i32(addr + 0x34)?,
            kind: reader.read_i32(addr + 0x38)?,
            unknown11: reader.read_i32(addr + 0x3C)?,
        })
    }
}

/// Video playback cue, either fullscreen or rendered into a texture slot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VideoOverlay {
    pub frame: u32,
    pub position_x: i16,
    pub position_y: i16,
    pub depth: f32,
    pub kind: VideoOverlayKind,
    /// Texture slot the video renders into for [`VideoOverlayKind::Mesh`].
    pub target_texture_id: u8,
    pub filename: String,
}

impl VideoOverlay {
    fn write(&self, writer: &mut EventWriter) -> Result<()> {
        writer.write_u32(self.frame);
        writer.write_i16(self.position_x);
        writer.write_i16(self.position_y);
        writer.write_f32(self.depth);
        writer.write_u8(self.kind.wire());
        writer.write_u8(self.target_texture_id);
        writer.write_empty(2);
        writer.write_string_fixed(&self.filename, VIDEO_FILENAME_LEN)
    }

    fn read(reader: &EventReader, addr: u32) -> Result<Self> {
        Ok(Self {
            frame: reader.read_u32(addr)?,
            position_x: reader.read_i16(addr + 4)?,
            position_y: reader.read_i16(addr + 6)?,
            depth: reader.read_f32(addr + 8)?,
            kind: VideoOverlayKind::from_wire(reader.read_u8(addr + 0xC)?),
            target_texture_id: reader.read_u8(addr + 0xD)?,
            filename: reader.read_string_fixed(addr + 0x10, VIDEO_FILENAME_LEN)?,
        })
    }
}

/// The complete effects buffer of an event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventEffects {
    /// Fallback timestamps, used when no language override exists.
    pub base_timestamps: LanguageTimestamps,
    pub screen_effects: Vec<ScreenEffect>,
    pub particles: Vec<SimpleParticle>,
    pub lighting: [Vec<ObjectLighting>; LIGHTING_SETS],
    pub blare_effects: Vec<BlareEffect>,
    pub particle_emitters: Vec<ParticleEmitter>,
    pub video_overlays: Vec<VideoOverlay>,
}

impl EventEffects {
    pub fn new() -> Self {
        Self {
            base_timestamps: LanguageTimestamps::new(),
            screen_effects: vec![ScreenEffect::default(); SCREEN_EFFECT_SLOTS],
            particles: vec![SimpleParticle::default(); SIMPLE_PARTICLE_SLOTS],
            lighting: std::array::from_fn(|_| {
                vec![ObjectLighting::default(); LIGHTING_SLOTS]
            }),
            blare_effects: vec![BlareEffect::default(); BLARE_EFFECT_SLOTS],
            particle_emitters: vec![ParticleEmitter::default(); PARTICLE_EMITTER_SLOTS],
            video_overlays: vec![VideoOverlay::default(); VIDEO_OVERLAY_SLOTS],
        }
    }

    /// Writes the whole buffer. Short slot vectors are padded with default
    /// records so every array keeps its fixed on-disk footprint.
    pub fn write(&self, writer: &mut EventWriter) -> Result<()> {
        self.base_timestamps.write(writer)?;

        for i in 0..SCREEN_EFFECT_SLOTS {
            self.screen_effects.get(i).copied().unwrap_or_default().write(writer);
        }
        for i in 0..SIMPLE_PARTICLE_SLOTS {
            self.particles.get(i).copied().unwrap_or_default().write(writer);
        }
        for set in &self.lighting {
            for i in 0..LIGHTING_SLOTS {
                set.get(i).copied().unwrap_or_default().write(writer);
            }
        }
        for i in 0..BLARE_EFFECT_SLOTS {
            self.blare_effects.get(i).copied().unwrap_or_default().write(writer);
        }
        for i in 0..PARTICLE_EMITTER_SLOTS {
            self.particle_emitters.get(i).copied().unwrap_or_default().write(writer);
        }
        for i in 0..VIDEO_OVERLAY_SLOTS {
            match self.video_overlays.get(i) {
                Some(overlay) => overlay.write(writer)?,
                None => VideoOverlay::default().write(writer)?,
            }
        }
        Ok(())
    }

    /// Encodes the effects as a standalone buffer.
    pub fn write_to_bytes(&self, endian: Endian) -> Result<Vec<u8>> {
        let mut writer = EventWriter::new(0, endian);
        self.write(&mut writer)?;
        Ok(writer.into_bytes())
    }

    pub fn read(reader: &EventReader) -> Result<Self> {
        fn read_slots<T>(
            reader: &EventReader,
            offset: u32,
            size: u32,
            slots: &mut [T],
            read: impl Fn(&EventReader, u32) -> Result<T>,
        ) -> Result<()> {
            for (i, slot) in slots.iter_mut().enumerate() {
                *slot = read(reader, offset + i as u32 * size)?;
            }
            Ok(())
        }

        let mut result = EventEffects::new();
        result.base_timestamps = LanguageTimestamps::read(reader)?;

        read_slots(
            reader,
            SCREEN_EFFECTS_OFFSET,
            SCREEN_EFFECT_SIZE,
            &mut result.screen_effects,
            ScreenEffect::read,
        )?;
        read_slots(
            reader,
            SIMPLE_PARTICLES_OFFSET,
            SIMPLE_PARTICLE_SIZE,
            &mut result.particles,
            SimpleParticle::read,
        )?;
        for (set, offset) in result.lighting.iter_mut().zip(LIGHTING_OFFSETS) {
            read_slots(reader, offset, OBJECT_LIGHTING_SIZE, set, ObjectLighting::read)?;
        }
        read_slots(
            reader,
            BLARE_EFFECTS_OFFSET,
            BLARE_EFFECT_SIZE,
            &mut result.blare_effects,
            BlareEffect::read,
        )?;
        read_slots(
            reader,
            PARTICLE_EMITTERS_OFFSET,
            PARTICLE_EMITTER_SIZE,
            &mut result.particle_emitters,
            ParticleEmitter::read,
        )?;
        read_slots(
            reader,
            VIDEO_OVERLAYS_OFFSET,
            VIDEO_OVERLAY_SIZE,
            &mut result.video_overlays,
            VideoOverlay::read,
        )?;

        Ok(result)
    }

    /// Decodes a standalone effects buffer.
    pub fn read_from_bytes(data: &[u8], endian: Endian) -> Result<Self> {
        let reader = EventReader::new(data, 0, endian);
        Self::read(&reader)
    }
}

impl Default for EventEffects {
    fn default() -> Self {
        Self::new()
    }
}
