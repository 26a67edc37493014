//! Event root aggregate.
//!
//! An event on disk is a family of buffers sharing one base file name:
//! the model buffer (`e####`), the GameCube motion buffer
//! (`e####motion.bin`), the texture archive (`e####texture`), an optional
//! external texture name list (`e####texlist`), the effects buffer
//! (`e####_0`) and one timestamp buffer per shipped language
//! (`e####_<key>`). [`EventSource`] carries that set in decompressed
//! form, [`Event`] is the decoded whole.

use std::collections::BTreeMap;

use crate::cursor::{EventReader, EventWriter};
use crate::effects::EventEffects;
use crate::error::Result;
use crate::language::{EventLanguage, LanguageTimestamps};
use crate::lut::LabelMap;
use crate::model::{ModelData, TextureNameList};
use crate::motion::write_motion_table;
use crate::platform::Platform;

/// The decompressed buffer set of one event.
#[derive(Debug, Clone, Default)]
pub struct EventSource {
    /// Model buffer, the only mandatory part.
    pub model: Vec<u8>,
    /// Separate motion buffer, required on GameCube.
    pub motion: Option<Vec<u8>>,
    /// Texture archive bytes, kept opaque.
    pub textures: Option<Vec<u8>>,
    /// External texture name list buffer.
    pub texlist: Option<Vec<u8>>,
    /// Effects buffer.
    pub effects: Option<Vec<u8>>,
    /// Timestamp buffers keyed by language.
    pub language_timestamps: BTreeMap<EventLanguage, Vec<u8>>,
}

impl EventSource {
    pub fn new(model: Vec<u8>) -> Self {
        Self {
            model,
            ..Self::default()
        }
    }
}

/// A fully decoded event.
#[derive(Debug, Clone)]
pub struct Event {
    /// Scenes, models and animations.
    pub model_data: ModelData,
    /// Effects buffer, absent when the event ships none.
    pub effects: Option<EventEffects>,
    /// Language specific overrides for the base timestamps in
    /// [`Event::effects`].
    pub language_timestamps: BTreeMap<EventLanguage, LanguageTimestamps>,
    /// Texture archive bytes, carried through unchanged.
    pub texture_archive: Option<Vec<u8>>,
    /// External texture name list, written as its own buffer.
    pub external_texlist: Option<TextureNameList>,
}

impl Event {
    pub fn new(model_data: ModelData) -> Self {
        Self {
            model_data,
            effects: None,
            language_timestamps: BTreeMap::new(),
            texture_archive: None,
            external_texlist: None,
        }
    }

    pub fn platform(&self) -> Platform {
        self.model_data.platform
    }

    /// Decodes an event from its buffer set.
    pub fn read_from_source(source: &EventSource) -> Result<Event> {
        let model_data = ModelData::read(&source.model, source.motion.as_deref())?;
        let platform = model_data.platform;
        let endian = platform.endian();

        let effects = match &source.effects {
            Some(data) => Some(EventEffects::read_from_bytes(data, endian)?),
            None => None,
        };

        let external_texlist = match &source.texlist {
            Some(data) => {
                let reader = EventReader::new(data, platform.texture_image_base(), endian);
                let head = reader.read_pointer(0)?;
                Some(TextureNameList::read(&reader, head, &mut LabelMap::default())?)
            }
            None => None,
        };

        let mut language_timestamps = BTreeMap::new();
        for (&language, data) in &source.language_timestamps {
            language_timestamps.insert(language, LanguageTimestamps::read_from_bytes(data, endian)?);
        }

        Ok(Event {
            model_data,
            effects,
            language_timestamps,
            texture_archive: source.textures.clone(),
            external_texlist,
        })
    }

    /// Encodes the event into a fresh buffer set.
    pub fn write_to_source(&self) -> Result<EventSource> {
        let platform = self.platform();
        let endian = platform.endian();

        let (model, motions) = self.model_data.write()?;

        let motion = if platform.uses_motion_buffer() {
            Some(write_motion_table(&motions, &self.model_data.pool)?)
        } else {
            None
        };

        let effects = match &self.effects {
            Some(effects) => Some(effects.write_to_bytes(endian)?),
            None => None,
        };

        let mut language_timestamps = BTreeMap::new();
        for (&language, stamps) in &self.language_timestamps {
            language_timestamps.insert(language, stamps.write_to_bytes(endian)?);
        }

        Ok(EventSource {
            model,
            motion,
            textures: self.texture_archive.clone(),
            texlist: self.write_texlist()?,
            effects,
            language_timestamps,
        })
    }

    /// Writes the external texture name list as its own buffer: a four
    /// byte pointer slot, the labels and entries, then the head address
    /// backpatched into the slot.
    fn write_texlist(&self) -> Result<Option<Vec<u8>>> {
        let Some(list) = &self.external_texlist else {
            return Ok(None);
        };

        let platform = self.platform();
        let mut writer = EventWriter::new(platform.texture_image_base(), platform.endian());
        let mut labels = LabelMap::default();

        writer.write_empty(4);
        list.write_labels(&mut writer, &mut labels);
        let head = list.write(&mut writer, &labels)?;

        writer.seek(0)?;
        writer.write_u32(head);
        writer.seek_end();
        Ok(Some(writer.into_bytes()))
    }
}
