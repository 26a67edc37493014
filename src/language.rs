//! Per-language subtitle and audio timestamp buffers.
//!
//! Timestamp buffers carry no pointers and are decoded with an image base
//! of zero. The subtitle block sits at the start of the buffer, the audio
//! block directly behind it; slot index doubles as the subtitle/voice id.

use crate::cursor::{Endian, EventReader, EventWriter};
use crate::error::Result;

/// Number of subtitle timestamp slots per language buffer.
pub const SUBTITLE_SLOTS: usize = 256;

/// Number of audio timestamp slots per language buffer.
pub const AUDIO_SLOTS: usize = 512;

/// Offset of the audio timestamp block within a language buffer.
pub const AUDIO_OFFSET: u32 = 0x800;

pub const SUBTITLE_TIMESTAMP_SIZE: u32 = 8;
pub const AUDIO_TIMESTAMP_SIZE: u32 = 72;

/// Width of the fixed music name field in an audio timestamp.
pub const MUSIC_NAME_LEN: usize = 64;

/// Languages an event ships timestamp files for. The discriminant is the
/// single character suffix of the corresponding file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventLanguage {
    English,
    French,
    Spanish,
    German,
    Italian,
    Japanese,
}

impl EventLanguage {
    pub const ALL: [EventLanguage; 6] = [
        EventLanguage::English,
        EventLanguage::French,
        EventLanguage::Spanish,
        EventLanguage::German,
        EventLanguage::Italian,
        EventLanguage::Japanese,
    ];

    /// File name suffix character of the language.
    pub fn key(self) -> char {
        match self {
            EventLanguage::English => '1',
            EventLanguage::French => '2',
            EventLanguage::Spanish => '3',
            EventLanguage::German => '4',
            EventLanguage::Italian => '5',
            EventLanguage::Japanese => 'J',
        }
    }

    /// Looks a language up by its file name suffix character.
    pub fn from_key(key: char) -> Option<Self> {
        EventLanguage::ALL.into_iter().find(|l| l.key() == key)
    }
}

/// Display window of a single subtitle slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubtitleTimestamp {
    /// Frame at which the subtitle appears.
    pub frame: u32,
    /// Number of frames the subtitle stays visible.
    pub duration: u32,
}

impl SubtitleTimestamp {
    fn write(self, writer: &mut EventWriter) {
        writer.write_u32(self.frame);
        writer.write_u32(self.duration);
    }

    fn read(reader: &EventReader, addr: u32) -> Result<Self> {
        Ok(Self {
            frame: reader.read_u32(addr)?,
            duration: reader.read_u32(addr + 4)?,
        })
    }
}

/// Voice line / music cue of a single audio slot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AudioTimestamp {
    /// Frame at which playback starts.
    pub frame: u32,
    /// Voice index into the game-wide master voice list.
    pub master_voice_index: u16,
    /// Voice index into the voice AFS archive.
    pub afs_voice_index: u16,
    /// Name of the music track to start, empty for none.
    pub music_name: String,
}

impl AudioTimestamp {
    fn write(&self, writer: &mut EventWriter) -> Result<()> {
        writer.write_u32(self.frame);
        writer.write_u16(self.master_voice_index);
        writer.write_u16(self.afs_voice_index);
        writer.write_string_fixed(&self.music_name, MUSIC_NAME_LEN)
    }

    fn read(reader: &EventReader, addr: u32) -> Result<Self> {
        Ok(Self {
            frame: reader.read_u32(addr)?,
            master_voice_index: reader.read_u16(addr + 4)?,
            afs_voice_index: reader.read_u16(addr + 6)?,
            music_name: reader.read_string_fixed(addr + 8, MUSIC_NAME_LEN)?,
        })
    }
}

/// Full timestamp buffer of one language: 256 subtitle slots followed by
/// 512 audio slots.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageTimestamps {
    pub subtitles: Vec<SubtitleTimestamp>,
    pub audio: Vec<AudioTimestamp>,
}

impl LanguageTimestamps {
    pub fn new() -> Self {
        Self {
            subtitles: vec![SubtitleTimestamp::default(); SUBTITLE_SLOTS],
            audio: vec![AudioTimestamp::default(); AUDIO_SLOTS],
        }
    }

    /// Writes both slot blocks into `writer` at its current position.
    pub fn write(&self, writer: &mut EventWriter) -> Result<()> {
        for i in 0..SUBTITLE_SLOTS {
            self.subtitles.get(i).copied().unwrap_or_default().write(writer);
        }
        for i in 0..AUDIO_SLOTS {
            match self.audio.get(i) {
                Some(stamp) => stamp.write(writer)?,
                None => AudioTimestamp::default().write(writer)?,
            }
        }
        Ok(())
    }

    /// Encodes the timestamps as a standalone buffer.
    pub fn write_to_bytes(&self, endian: Endian) -> Result<Vec<u8>> {
        let mut writer = EventWriter::new(0, endian);
        self.write(&mut writer)?;
        Ok(writer.into_bytes())
    }

    pub fn read(reader: &EventReader) -> Result<Self> {
        let mut result = LanguageTimestamps::new();
        for (i, slot) in result.subtitles.iter_mut().enumerate() {
            *slot = SubtitleTimestamp::read(reader, i as u32 * SUBTITLE_TIMESTAMP_SIZE)?;
        }
        for (i, slot) in result.audio.iter_mut().enumerate() {
            *slot = AudioTimestamp::read(reader, AUDIO_OFFSET + i as u32 * AUDIO_TIMESTAMP_SIZE)?;
        }
        Ok(result)
    }

    /// Decodes a standalone timestamp buffer.
    pub fn read_from_bytes(data: &[u8], endian: Endian) -> Result<Self> {
        let reader = EventReader::new(data, 0, endian);
        Self::read(&reader)
    }
}

impl Default for LanguageTimestamps {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EventError;

    #[test]
    fn timestamps_roundtrip() {
        let mut stamps = LanguageTimestamps::new();
        stamps.subtitles[0] = SubtitleTimestamp { frame: 30, duration: 120 };
        stamps.subtitles[255] = SubtitleTimestamp { frame: 9000, duration: 1 };
        stamps.audio[3] = AudioTimestamp {
            frame: 42,
            master_voice_index: 12034,
            afs_voice_index: 77,
            music_name: "chao_lobby".to_string(),
        };

        let data = stamps.write_to_bytes(Endian::Big).unwrap();
        assert_eq!(
            data.len(),
            SUBTITLE_SLOTS * SUBTITLE_TIMESTAMP_SIZE as usize
                + AUDIO_SLOTS * AUDIO_TIMESTAMP_SIZE as usize
        );

        let decoded = LanguageTimestamps::read_from_bytes(&data, Endian::Big).unwrap();
        assert_eq!(decoded, stamps);
    }

    #[test]
    fn long_music_name_is_rejected() {
        let mut stamps = LanguageTimestamps::new();
        stamps.audio[0].music_name = "x".repeat(MUSIC_NAME_LEN + 1);
        let err = stamps.write_to_bytes(Endian::Little).unwrap_err();
        assert!(matches!(err, EventError::FieldOverflow { width, .. } if width == MUSIC_NAME_LEN));
    }

    #[test]
    fn language_keys() {
        assert_eq!(EventLanguage::Japanese.key(), 'J');
        assert_eq!(EventLanguage::from_key('3'), Some(EventLanguage::Spanish));
        assert_eq!(EventLanguage::from_key('6'), None);
    }
}
