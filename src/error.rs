//! Failure taxonomy for en-/decode passes.
//!
//! Every error here is fatal for the pass that raised it: a failed pass
//! produces no usable output, and the caller-visible buffers are simply
//! discarded.  Zero is never used as an error fallback anywhere in the
//! crate, because zero is the legitimate "no reference" pointer sentinel.

use crate::platform::Platform;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EventError {
    /// A read or write would exceed the available buffer.
    #[error("access of {len} byte(s) at {addr:#x} exceeds buffer size {size:#x}")]
    OutOfRange { addr: u32, len: usize, size: usize },

    /// A variable-length text exceeds its fixed on-disk slot width.
    #[error("string \"{text}\" exceeds fixed field width of {width} bytes")]
    FieldOverflow { text: String, width: usize },

    /// A null pointer was found where a reference is required.
    #[error("null pointer at {addr:#x} where a reference is required")]
    NullPointer { addr: u32 },

    /// A stored pointer resolves below the image base or past the buffer.
    #[error("pointer {value:#x} at {addr:#x} does not resolve against image base {image_base:#x}")]
    DanglingPointer { addr: u32, value: u32, image_base: u32 },

    /// Decode expected `addr` to have been resolved by an earlier phase.
    #[error("{category} content at {addr:#x} was never decoded")]
    UnresolvedReference { category: &'static str, addr: u32 },

    /// Encode was asked to reference content that was never written.
    #[error("{category} content has not been written yet")]
    UnregisteredWrite { category: &'static str },

    /// A camera motion's self pointer references a different animation.
    #[error("camera motion at {addr:#x} back-references a different animation ({found:#x})")]
    CameraBackReference { addr: u32, found: u32 },

    /// A stored motion slot index exceeds the deduplicated motion table.
    #[error("motion index {index} out of range ({len} motions)")]
    MotionIndexOutOfRange { index: u32, len: usize },

    #[error("scene entry carries no model")]
    MissingEntryModel,

    /// The header sniff matched none of the four known platform profiles.
    #[error("no known platform signature matches the file header")]
    PlatformDetection,

    /// The platform stores motions in a separate buffer that was not given.
    #[error("platform {0:?} requires a separate motion buffer")]
    MissingMotionBuffer(Platform),
}

pub type Result<T> = std::result::Result<T, EventError>;
