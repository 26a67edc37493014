//! Model tree nodes and their geometry.
//!
//! A model is a tree of transform nodes, each optionally carrying an
//! [`Attach`] with the actual geometry.  Geometry is stored in the chunk
//! format of the source game: two streams of raw 32 bit words (vertex
//! chunks and polygon chunks), each closed by an end marker word.  The
//! crate treats chunk words as opaque payload except for the polygon
//! stream positions that surface animations point into.
//!
//! Trees and attaches are the most aggressively shared objects in an
//! event file, so all writes here go through the lookup table and reuse
//! addresses wherever a handle was already emitted.

use crate::cursor::{EventReader, EventWriter};
use crate::error::Result;
use crate::lut::{PointerLut, PolyStream};
use crate::pool::{AttachHandle, EventPool, NodeHandle};
use crate::types::Vector3;

/// Size of the node structure in bytes.
pub const NODE_SIZE: u32 = 0x34;

/// Size of the attach head structure in bytes.
pub const ATTACH_SIZE: u32 = 0x18;

/// Chunk stream end marker word.
pub const CHUNK_END: u32 = 0xFF;

/// Node evaluation flags.
pub mod node_flags {
    pub const IGNORE_POSITION: u32 = 0x01;
    pub const IGNORE_ROTATION: u32 = 0x02;
    pub const IGNORE_SCALE: u32 = 0x04;
    pub const SKIP_DRAW: u32 = 0x08;
    pub const SKIP_CHILDREN: u32 = 0x10;
    pub const ROTATE_ZYX: u32 = 0x20;
}

/// A transform node of a model tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Evaluation flags, see [`node_flags`].
    pub attributes: u32,
    pub attach: Option<AttachHandle>,
    pub position: Vector3,
    /// Euler rotation in binary angles.
    pub rotation: [i32; 3],
    pub scale: Vector3,
    pub child: Option<NodeHandle>,
    pub sibling: Option<NodeHandle>,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            attributes: 0,
            attach: None,
            position: Vector3::default(),
            rotation: [0; 3],
            scale: Vector3::new(1.0, 1.0, 1.0),
            child: None,
            sibling: None,
        }
    }
}

/// Chunk geometry attached to a node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attach {
    /// Vertex chunk words, end marker excluded.
    pub vertex_chunks: Vec<u32>,
    /// Polygon chunk words, end marker excluded.
    pub poly_chunks: Vec<u32>,
    /// Bounding sphere center.
    pub center: Vector3,
    /// Bounding sphere radius.
    pub radius: f32,
}

/// Writes an attach, its chunk streams first, reusing the recorded
/// address if the handle was written before.
pub fn write_attach(
    writer: &mut EventWriter,
    pool: &EventPool,
    lut: &mut PointerLut,
    handle: AttachHandle,
) -> Result<u32> {
    if let Some(addr) = lut.attaches.try_address(handle) {
        return Ok(addr);
    }

    let attach = pool.attach(handle);

    let vertex_addr = if attach.vertex_chunks.is_empty() {
        0
    } else {
        let addr = writer.pointer_position();
        for word in &attach.vertex_chunks {
            writer.write_u32(*word);
        }
        writer.write_u32(CHUNK_END);
        addr
    };

    let poly_addr = if attach.poly_chunks.is_empty() {
        0
    } else {
        let addr = writer.pointer_position();
        for word in &attach.poly_chunks {
            writer.write_u32(*word);
        }
        writer.write_u32(CHUNK_END);
        lut.record_poly_stream(PolyStream {
            addr,
            words: attach.poly_chunks.len() as u32,
            attach: handle,
        });
        addr
    };

    let addr = writer.pointer_position();
    writer.write_u32(vertex_addr);
    writer.write_u32(poly_addr);
    writer.write_vector3(attach.center);
    writer.write_f32(attach.radius);

    lut.attaches.insert(handle, addr);
    Ok(addr)
}

/// Writes a node tree depth first, attaches and subtrees before the
/// nodes referencing them. Returns the root node address.
pub fn write_node(
    writer: &mut EventWriter,
    pool: &EventPool,
    lut: &mut PointerLut,
    handle: NodeHandle,
) -> Result<u32> {
    if let Some(addr) = lut.nodes.try_address(handle) {
        return Ok(addr);
    }

    let node = pool.node(handle).clone();

    let attach_addr = match node.attach {
        Some(attach) => write_attach(writer, pool, lut, attach)?,
        None => 0,
    };
    let child_addr = match node.child {
        Some(child) => write_node(writer, pool, lut, child)?,
        None => 0,
    };
    let sibling_addr = match node.sibling {
        Some(sibling) => write_node(writer, pool, lut, sibling)?,
        None => 0,
    };

    let addr = writer.pointer_position();
    writer.write_u32(node.attributes);
    writer.write_u32(attach_addr);
    writer.write_vector3(node.position);
    writer.write_i32(node.rotation[0]);
    writer.write_i32(node.rotation[1]);
    writer.write_i32(node.rotation[2]);
    writer.write_vector3(node.scale);
    writer.write_u32(child_addr);
    writer.write_u32(sibling_addr);

    lut.nodes.insert(handle, addr);
    Ok(addr)
}

fn read_chunk_stream(reader: &EventReader, mut addr: u32) -> Result<Vec<u32>> {
    let mut words = Vec::new();
    loop {
        let word = reader.read_u32(addr)?;
        if word == CHUNK_END {
            return Ok(words);
        }
        words.push(word);
        addr += 4;
    }
}

/// Reads the attach at `addr`, reusing the pooled instance for repeat
/// references.
pub fn read_attach(
    reader: &EventReader,
    addr: u32,
    pool: &mut EventPool,
    lut: &mut PointerLut,
) -> Result<AttachHandle> {
    if let Some(handle) = lut.attaches.try_value(addr) {
        return Ok(handle);
    }

    let mut attach = Attach {
        center: reader.read_vector3(addr + 8)?,
        radius: reader.read_f32(addr + 0x14)?,
        ..Attach::default()
    };

    if let Some(vertex_addr) = reader.try_read_pointer(addr)? {
        attach.vertex_chunks = read_chunk_stream(reader, vertex_addr)?;
    }

    let poly_addr = reader.try_read_pointer(addr + 4)?;
    if let Some(poly_addr) = poly_addr {
        attach.poly_chunks = read_chunk_stream(reader, poly_addr)?;
    }

    let handle = pool.add_attach(attach);
    lut.attaches.insert(handle, addr);
    if let Some(poly_addr) = poly_addr {
        let words = pool.attach(handle).poly_chunks.len() as u32;
        lut.record_poly_stream(PolyStream {
            addr: poly_addr + reader.image_base(),
            words,
            attach: handle,
        });
    }
    Ok(handle)
}

/// Reads the node tree rooted at `addr`.
pub fn read_node(
    reader: &EventReader,
    addr: u32,
    pool: &mut EventPool,
    lut: &mut PointerLut,
) -> Result<NodeHandle> {
    if let Some(handle) = lut.nodes.try_value(addr) {
        return Ok(handle);
    }

    let attributes = reader.read_u32(addr)?;
    let attach = match reader.try_read_pointer(addr + 4)? {
        Some(attach_addr) => Some(read_attach(reader, attach_addr, pool, lut)?),
        None => None,
    };
    let position = reader.read_vector3(addr + 8)?;
    let rotation = [
        reader.read_i32(addr + 0x14)?,
        reader.read_i32(addr + 0x18)?,
        reader.read_i32(addr + 0x1C)?,
    ];
    let scale = reader.read_vector3(addr + 0x20)?;
    let child = match reader.try_read_pointer(addr + 0x2C)? {
        Some(child_addr) => Some(read_node(reader, child_addr, pool, lut)?),
        None => None,
    };
    let sibling = match reader.try_read_pointer(addr + 0x30)? {
        Some(sibling_addr) => Some(read_node(reader, sibling_addr, pool, lut)?),
        None => None,
    };

    let handle = pool.add_node(Node {
        attributes,
        attach,
        position,
        rotation,
        scale,
        child,
        sibling,
    });
    lut.nodes.insert(handle, addr);
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Endian;

    fn build_tree(pool: &mut EventPool) -> NodeHandle {
        let attach = pool.add_attach(Attach {
            vertex_chunks: vec![0x2000_0001, 0x1234_5678],
            poly_chunks: vec![0x0804_0000, 0x0000_00AA, 0x0BAD_F00D],
            center: Vector3::new(0.0, 1.0, 0.0),
            radius: 2.5,
        });

        // two leaves sharing the same geometry
        let right = pool.add_node(Node {
            attach: Some(attach),
            position: Vector3::new(1.0, 0.0, 0.0),
            ..Node::default()
        });
        let left = pool.add_node(Node {
            attach: Some(attach),
            position: Vector3::new(-1.0, 0.0, 0.0),
            sibling: Some(right),
            ..Node::default()
        });

        pool.add_node(Node {
            attributes: node_flags::SKIP_DRAW,
            rotation: [0x4000, 0, 0],
            child: Some(left),
            ..Node::default()
        })
    }

    #[test]
    fn tree_roundtrip_preserves_sharing() {
        let mut pool = EventPool::new();
        let root = build_tree(&mut pool);

        let mut writer = EventWriter::new(0x1000, Endian::Little);
        let mut lut = PointerLut::new();
        let addr = write_node(&mut writer, &pool, &mut lut, root).unwrap();

        // one shared attach written once
        assert_eq!(lut.attaches.len(), 1);

        // repeated write is free
        let len = writer.len();
        assert_eq!(write_node(&mut writer, &pool, &mut lut, root).unwrap(), addr);
        assert_eq!(writer.len(), len);

        let data = writer.into_bytes();
        let reader = EventReader::new(&data, 0x1000, Endian::Little);
        let mut read_pool = EventPool::new();
        let mut read_lut = PointerLut::new();
        let decoded = read_node(&reader, addr - 0x1000, &mut read_pool, &mut read_lut).unwrap();

        assert_eq!(read_pool.tree_node_count(decoded), 3);

        let root_node = read_pool.node(decoded);
        assert_eq!(root_node.attributes, node_flags::SKIP_DRAW);
        assert_eq!(root_node.rotation, [0x4000, 0, 0]);

        let left = read_pool.node(root_node.child.unwrap());
        let right = read_pool.node(read_pool.node(root_node.child.unwrap()).sibling.unwrap());
        // aliasing: the shared attach decodes to one handle
        assert_eq!(left.attach, right.attach);
        assert_eq!(read_pool.attach(left.attach.unwrap()).radius, 2.5);
        assert_eq!(
            read_pool.attach(left.attach.unwrap()).poly_chunks,
            vec![0x0804_0000, 0x0000_00AA, 0x0BAD_F00D]
        );
    }

    #[test]
    fn poly_streams_are_recorded() {
        let mut pool = EventPool::new();
        let root = build_tree(&mut pool);

        let mut writer = EventWriter::new(0, Endian::Big);
        let mut lut = PointerLut::new();
        write_node(&mut writer, &pool, &mut lut, root).unwrap();

        let attach = pool.node(root).child.and_then(|c| pool.node(c).attach).unwrap();
        let stream_addr = lut.poly_stream_addr(attach).unwrap();
        let (resolved, word) = lut.resolve_poly_word(stream_addr + 8).unwrap();
        assert_eq!(resolved, attach);
        assert_eq!(word, 2);

        // past the end of the stream
        assert!(lut.resolve_poly_word(stream_addr + 12).is_err());
    }
}
