//! Address lookup tables.
//!
//! The dedup contract for shared objects lives here.  An [`AddressMap`]
//! pairs object identities with the file addresses they were written at
//! (or read from) and guarantees:
//!
//! * **at most one write per identity** — `get_or_write` only invokes its
//!   closure the first time a key is seen, afterwards it hands back the
//!   recorded address;
//! * **aliasing preserved on read** — `get_or_read` decodes each address
//!   once and returns the same handle for every later reference to it;
//! * addresses are recorded only after the closure returns, so a failed
//!   write never leaves a half-registered entry behind.
//!
//! [`PointerLut`] bundles the maps one encode or decode pass needs.  The
//! maps are separate fields on purpose, callers destructure the struct so
//! that a closure writing nodes can still consult the attach map.

use std::collections::HashMap;
use std::hash::Hash;

use crate::error::{EventError, Result};
use crate::pool::{AttachHandle, CameraHandle, MotionHandle, NodeHandle};

/// Two-way identity/address map for one object category.
#[derive(Debug, Clone)]
pub struct AddressMap<K> {
    category: &'static str,
    to_addr: HashMap<K, u32>,
    to_key: HashMap<u32, K>,
}

impl<K: Copy + Eq + Hash> AddressMap<K> {
    pub fn new(category: &'static str) -> Self {
        Self {
            category,
            to_addr: HashMap::new(),
            to_key: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.to_addr.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_addr.is_empty()
    }

    pub fn insert(&mut self, key: K, addr: u32) {
        self.to_addr.insert(key, addr);
        self.to_key.insert(addr, key);
    }

    pub fn contains(&self, key: K) -> bool {
        self.to_addr.contains_key(&key)
    }

    /// Address of an already written object, if any.
    pub fn try_address(&self, key: K) -> Option<u32> {
        self.to_addr.get(&key).copied()
    }

    /// Address of an object that must already have been written.
    pub fn address(&self, key: K) -> Result<u32> {
        self.try_address(key).ok_or(EventError::UnregisteredWrite {
            category: self.category,
        })
    }

    /// Writes the object through `write` on first sight, returns the
    /// recorded address on every later call with the same key.
    pub fn get_or_write(&mut self, key: K, write: impl FnOnce() -> Result<u32>) -> Result<u32> {
        if let Some(addr) = self.try_address(key) {
            return Ok(addr);
        }
        let addr = write()?;
        self.insert(key, addr);
        Ok(addr)
    }

    pub fn try_value(&self, addr: u32) -> Option<K> {
        self.to_key.get(&addr).copied()
    }

    /// Identity decoded from `addr`, which must already have been visited.
    pub fn value(&self, addr: u32) -> Result<K> {
        self.try_value(addr).ok_or(EventError::UnresolvedReference {
            category: self.category,
            addr,
        })
    }

    /// Decodes the object at `addr` through `read` on first sight, returns
    /// the recorded identity for every later reference to the same address.
    pub fn get_or_read(&mut self, addr: u32, read: impl FnOnce() -> Result<K>) -> Result<K> {
        if let Some(key) = self.try_value(addr) {
            return Ok(key);
        }
        let key = read()?;
        self.insert(key, addr);
        Ok(key)
    }
}

/// Two-way map between label strings and their addresses.
///
/// Labels are the NUL terminated name strings at the tail of a model
/// buffer, referenced by the texture name list.
#[derive(Debug, Clone, Default)]
pub struct LabelMap {
    to_addr: HashMap<String, u32>,
    to_name: HashMap<u32, String>,
}

impl LabelMap {
    pub fn insert(&mut self, addr: u32, name: &str) {
        self.to_addr.insert(name.to_string(), addr);
        self.to_name.insert(addr, name.to_string());
    }

    pub fn address(&self, name: &str) -> Result<u32> {
        self.to_addr
            .get(name)
            .copied()
            .ok_or(EventError::UnregisteredWrite { category: "label" })
    }

    pub fn name(&self, addr: u32) -> Result<&str> {
        self.to_name
            .get(&addr)
            .map(String::as_str)
            .ok_or(EventError::UnresolvedReference {
                category: "label",
                addr,
            })
    }
}

/// Location of an attach's polygon chunk stream in the current pass.
///
/// Surface animations point into the middle of these streams, so both
/// passes record where each stream landed to translate between word
/// indices and virtual addresses.
#[derive(Debug, Clone, Copy)]
pub struct PolyStream {
    /// Virtual address of the first chunk word.
    pub addr: u32,
    /// Stream length in words, terminator excluded.
    pub words: u32,
    pub attach: AttachHandle,
}

/// Reservation slots that are filled out of reference order.
///
/// The writer reserves several arrays up front (scene tables, per-scene
/// motion arrays, upgrade blocks) and only later emits the structs that
/// point at them, so their addresses are parked here in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotId {
    SceneEntries(u32),
    SceneCameras(u32),
    SceneParticles(u32),
    BigEntry(u32),
    BigMotions(u32),
}

/// All lookup tables of one encode or decode pass.
#[derive(Debug, Clone)]
pub struct PointerLut {
    pub nodes: AddressMap<NodeHandle>,
    pub attaches: AddressMap<AttachHandle>,
    pub motions: AddressMap<MotionHandle>,
    pub cameras: AddressMap<CameraHandle>,
    pub slots: AddressMap<SlotId>,
    pub labels: LabelMap,
    pub poly_streams: Vec<PolyStream>,
}

impl PointerLut {
    pub fn new() -> Self {
        Self {
            nodes: AddressMap::new("node"),
            attaches: AddressMap::new("attach"),
            motions: AddressMap::new("motion"),
            cameras: AddressMap::new("camera"),
            slots: AddressMap::new("slot"),
            labels: LabelMap::default(),
            poly_streams: Vec::new(),
        }
    }

    pub fn record_poly_stream(&mut self, stream: PolyStream) {
        self.poly_streams.push(stream);
    }

    /// Resolves a virtual address inside a recorded chunk stream to the
    /// owning attach and the word index within its stream.
    pub fn resolve_poly_word(&self, addr: u32) -> Result<(AttachHandle, u32)> {
        self.poly_streams
            .iter()
            .find(|s| addr >= s.addr && addr < s.addr + s.words * 4)
            .map(|s| (s.attach, (addr - s.addr) / 4))
            .ok_or(EventError::UnresolvedReference {
                category: "poly chunk",
                addr,
            })
    }

    /// Virtual address of an attach's chunk stream written this pass.
    pub fn poly_stream_addr(&self, attach: AttachHandle) -> Result<u32> {
        self.poly_streams
            .iter()
            .find(|s| s.attach == attach)
            .map(|s| s.addr)
            .ok_or(EventError::UnregisteredWrite {
                category: "poly chunk",
            })
    }
}

impl Default for PointerLut {
    fn default() -> Self {
        Self::new()
    }
}
