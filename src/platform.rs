//! Target platform parameters and detection.
//!
//! Four builds of the game shipped the event family, and everything that
//! differs between them funnels through [`Platform`]: byte order, the
//! image bases of the three pointer-bearing files, struct layout switches
//! and per-build array counts.  The rest of the crate never matches on a
//! platform without going through one of these accessors.
//!
//! # Detection
//!
//! The files carry no magic, so the platform is sniffed from structural
//! byte patterns of the main model buffer (see [`Platform::detect`]).  A
//! buffer too short or too garbled for the probes is rejected with
//! [`EventError::PlatformDetection`] rather than guessed at.

use crate::cursor::{Endian, EventReader};
use crate::error::{EventError, Result};
use serde::{Deserialize, Serialize};

/// Target build of an event file set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Dreamcast preview build.
    DcBeta,
    /// Dreamcast release.
    Dc,
    /// Dreamcast-style event shipped inside the GameCube build.
    DcGc,
    /// GameCube release and its ports.
    Gc,
}

impl Platform {
    /// Image base of the main model buffer.
    pub fn main_image_base(self) -> u32 {
        match self {
            Platform::DcBeta | Platform::Dc => 0x0C60_0000,
            Platform::DcGc => 0x812F_FE60,
            Platform::Gc => 0x8125_FE60,
        }
    }

    /// Image base of the texture list buffer.
    pub fn texture_image_base(self) -> u32 {
        match self {
            Platform::DcBeta | Platform::Dc => 0x0CBC_0000,
            Platform::DcGc => 0x818B_FE60,
            Platform::Gc => 0,
        }
    }

    /// Image base of the subtitle buffers.
    pub fn subtitle_image_base(self) -> u32 {
        match self {
            Platform::DcBeta | Platform::Dc => 0x0CBD_0000,
            Platform::DcGc | Platform::Gc => 0x817A_FE60,
        }
    }

    pub fn endian(self) -> Endian {
        match self {
            Platform::DcBeta | Platform::Dc => Endian::Little,
            Platform::DcGc | Platform::Gc => Endian::Big,
        }
    }

    /// Whether scene entries use the extended GameCube layout.
    pub fn uses_gc_entries(self) -> bool {
        self == Platform::Gc
    }

    /// Whether animations live in a separate motion buffer with an index
    /// table instead of inline pointers.
    pub fn uses_motion_buffer(self) -> bool {
        self == Platform::Gc
    }

    /// Number of character upgrade slots in the integrated upgrade array.
    pub fn upgrade_count(self) -> usize {
        match self {
            Platform::DcBeta => 14,
            Platform::Dc | Platform::DcGc => 16,
            Platform::Gc => 18,
        }
    }

    /// Whether the model header carries a surface animation pointer.
    pub fn has_surface_animations(self) -> bool {
        self != Platform::DcBeta
    }

    /// Sniffs the platform from the raw main model buffer.
    pub fn detect(data: &[u8]) -> Result<Platform> {
        // all probes are little endian regardless of the final platform
        let reader = EventReader::new(data, 0, Endian::Little);
        let first = reader.read_u8(0).map_err(|_| EventError::PlatformDetection)?;

        if first != 0x81 {
            // dreamcast family: the release build keeps a back reference
            // behind the upgrade pointer that the beta lacks
            let probe = || -> Result<u32> {
                let upgrade_addr = reader
                    .read_u32(0x20)?
                    .wrapping_sub(Platform::Dc.main_image_base());
                reader.read_u32(upgrade_addr.wrapping_add(0x134))
            };
            let beta_check = probe().map_err(|_| EventError::PlatformDetection)?;
            if beta_check != 0 && beta_check < Platform::Dc.main_image_base() {
                Ok(Platform::DcBeta)
            } else {
                Ok(Platform::Dc)
            }
        } else {
            // big endian family: a dreamcast-style event embedded in the
            // gamecube build has a nonzero value in the scene count slot
            // of the gc layout
            let gc_check = reader
                .read_u32(0x28)
                .map_err(|_| EventError::PlatformDetection)?;
            if gc_check != 0 && gc_check != 0x0100_0000 {
                Ok(Platform::DcGc)
            } else {
                Ok(Platform::Gc)
            }
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Platform::DcBeta => "dcbeta",
            Platform::Dc => "dc",
            Platform::DcGc => "dcgc",
            Platform::Gc => "gc",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{ByteOrder, LittleEndian};

    fn dc_style(beta_check: u32) -> Vec<u8> {
        // header points the upgrade slot at offset 0x40; the beta check
        // word then sits at 0x174
        let mut data = vec![0u8; 0x200];
        LittleEndian::write_u32(&mut data[0x20..], Platform::Dc.main_image_base() + 0x40);
        LittleEndian::write_u32(&mut data[0x174..], beta_check);
        data
    }

    #[test]
    fn detects_dreamcast_release() {
        let data = dc_style(Platform::Dc.main_image_base() + 0x100);
        assert_eq!(Platform::detect(&data).unwrap(), Platform::Dc);
    }

    #[test]
    fn detects_dreamcast_beta() {
        let data = dc_style(0x40);
        assert_eq!(Platform::detect(&data).unwrap(), Platform::DcBeta);
    }

    #[test]
    fn zero_beta_check_is_release() {
        let data = dc_style(0);
        assert_eq!(Platform::detect(&data).unwrap(), Platform::Dc);
    }

    #[test]
    fn detects_gamecube() {
        let mut data = vec![0u8; 0x40];
        data[0] = 0x81;
        assert_eq!(Platform::detect(&data).unwrap(), Platform::Gc);

        LittleEndian::write_u32(&mut data[0x28..], 0x0100_0000);
        assert_eq!(Platform::detect(&data).unwrap(), Platform::Gc);
    }

    #[test]
    fn detects_embedded_dreamcast() {
        let mut data = vec![0u8; 0x40];
        data[0] = 0x81;
        LittleEndian::write_u32(&mut data[0x28..], 0x0000_1234);
        assert_eq!(Platform::detect(&data).unwrap(), Platform::DcGc);
    }

    #[test]
    fn truncated_buffer_is_rejected() {
        assert!(matches!(
            Platform::detect(&[]),
            Err(EventError::PlatformDetection)
        ));
        // dc-style probe lands outside the buffer
        let mut data = vec![0u8; 0x24];
        LittleEndian::write_u32(&mut data[0x20..], Platform::Dc.main_image_base() + 0x4000);
        assert!(matches!(
            Platform::detect(&data),
            Err(EventError::PlatformDetection)
        ));
    }
}
