//! Character upgrade overlays.
//!
//! An overlay upgrade renders extra models on top of nodes of a
//! character model. The target nodes belong to trees written with the
//! scene entries; only the overlay models themselves are written here.

use crate::cursor::{EventReader, EventWriter};
use crate::error::Result;
use crate::lut::PointerLut;
use crate::model::node::{read_node, write_node};
use crate::pool::{EventPool, NodeHandle};

/// Size of the structure in bytes.
pub const OVERLAY_UPGRADE_SIZE: u32 = 20;

/// Number of overlay upgrade slots in the model header array.
pub const OVERLAY_UPGRADE_SLOTS: usize = 18;

/// One overlay upgrade slot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OverlayUpgrade {
    /// Root of the character model the targets belong to.
    pub root: Option<NodeHandle>,
    /// First node to render a model at.
    pub target1: Option<NodeHandle>,
    /// Model rendered at the first target.
    pub model1: Option<NodeHandle>,
    /// Second node to render a model at.
    pub target2: Option<NodeHandle>,
    /// Model rendered at the second target.
    pub model2: Option<NodeHandle>,
}

impl OverlayUpgrade {
    /// Writes the overlay models. Roots and targets are part of the
    /// scene models and are not written here.
    pub fn write_models(
        &self,
        writer: &mut EventWriter,
        pool: &EventPool,
        lut: &mut PointerLut,
    ) -> Result<()> {
        if let Some(model) = self.model1 {
            write_node(writer, pool, lut, model)?;
        }
        if let Some(model) = self.model2 {
            write_node(writer, pool, lut, model)?;
        }
        Ok(())
    }

    /// Writes the struct. All referenced nodes must have been written.
    pub fn write(&self, writer: &mut EventWriter, lut: &PointerLut) -> Result<()> {
        for node in [self.root, self.target1, self.model1, self.target2, self.model2] {
            let addr = match node {
                Some(node) => lut.nodes.address(node)?,
                None => 0,
            };
            writer.write_u32(addr);
        }
        Ok(())
    }

    pub fn read(
        reader: &EventReader,
        addr: u32,
        pool: &mut EventPool,
        lut: &mut PointerLut,
    ) -> Result<OverlayUpgrade> {
        let mut fields = [None; 5];
        for (i, field) in fields.iter_mut().enumerate() {
            if let Some(node_addr) = reader.try_read_pointer(addr + i as u32 * 4)? {
                *field = Some(read_node(reader, node_addr, pool, lut)?);
            }
        }

        Ok(OverlayUpgrade {
            root: fields[0],
            target1: fields[1],
            model1: fields[2],
            target2: fields[3],
            model2: fields[4],
        })
    }
}
