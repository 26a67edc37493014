//! Camera parameter block accompanying camera motions.

use crate::cursor::{EventReader, EventWriter};
use crate::error::Result;
use crate::lut::AddressMap;
use crate::pool::{CameraHandle, EventPool};
use crate::types::{bams_to_rad, rad_to_bams, Vector3};

/// Size of the structure in bytes.
pub const CAMERA_SIZE: u32 = 0x40;

/// Static camera parameters. The motion animates position and target,
/// this block seeds the initial state and projection.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// World space position.
    pub position: Vector3,
    /// Roll angle in radians.
    pub roll: f32,
    /// Field of view in radians.
    pub field_of_view: f32,
    pub near_clip: f32,
    pub far_clip: f32,
    /// Local X axis.
    pub dir_x: Vector3,
    /// Local Y axis.
    pub dir_y: Vector3,
    /// Local Z axis.
    pub dir_z: Vector3,
}

impl Camera {
    /// Writes the block, registering its virtual address in the camera
    /// map and returning it.
    pub fn write(
        handle: CameraHandle,
        pool: &EventPool,
        writer: &mut EventWriter,
        cameras: &mut AddressMap<CameraHandle>,
    ) -> Result<u32> {
        if let Some(addr) = cameras.try_address(handle) {
            return Ok(addr);
        }

        let camera = pool.camera(handle);
        let addr = writer.pointer_position();
        writer.write_vector3(camera.position);
        writer.write_vector3(camera.dir_z);
        writer.write_i32(rad_to_bams(camera.roll));
        writer.write_i32(rad_to_bams(camera.field_of_view));
        writer.write_f32(camera.near_clip);
        writer.write_f32(camera.far_clip);
        writer.write_vector3(camera.dir_x);
        writer.write_vector3(camera.dir_y);

        cameras.insert(handle, addr);
        Ok(addr)
    }

    /// Reads the block at buffer offset `addr`, aliasing through the map.
    pub fn read(
        reader: &EventReader,
        addr: u32,
        pool: &mut EventPool,
        cameras: &mut AddressMap<CameraHandle>,
    ) -> Result<CameraHandle> {
        cameras.get_or_read(addr, || {
            Ok(pool.add_camera(Camera {
                position: reader.read_vector3(addr)?,
                dir_z: reader.read_vector3(addr + 0xC)?,
                roll: bams_to_rad(reader.read_i32(addr + 0x18)?),
                field_of_view: bams_to_rad(reader.read_i32(addr + 0x1C)?),
                near_clip: reader.read_f32(addr + 0x20)?,
                far_clip: reader.read_f32(addr + 0x24)?,
                dir_x: reader.read_vector3(addr + 0x28)?,
                dir_y: reader.read_vector3(addr + 0x34)?,
            }))
        })
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vector3::default(),
            roll: 0.0,
            field_of_view: std::f32::consts::FRAC_PI_2,
            near_clip: 1.0,
            far_clip: 100_000.0,
            dir_x: Vector3::new(1.0, 0.0, 0.0),
            dir_y: Vector3::new(0.0, 1.0, 0.0),
            dir_z: Vector3::new(0.0, 0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Endian;

    #[test]
    fn camera_roundtrip() {
        let mut pool = EventPool::new();
        let camera = Camera {
            position: Vector3::new(5.0, 2.5, -1.0),
            roll: 0.25,
            ..Camera::default()
        };
        let handle = pool.add_camera(camera);

        let mut writer = EventWriter::new(0x800, Endian::Little);
        let mut write_map = AddressMap::new("camera");
        let addr = Camera::write(handle, &pool, &mut writer, &mut write_map).unwrap();
        assert_eq!(writer.len() as u32, CAMERA_SIZE);

        // second write reuses the address
        let again = Camera::write(handle, &pool, &mut writer, &mut write_map).unwrap();
        assert_eq!(addr, again);
        assert_eq!(writer.len() as u32, CAMERA_SIZE);

        let data = writer.into_bytes();
        let reader = EventReader::new(&data, 0x800, Endian::Little);
        let mut read_pool = EventPool::new();
        let mut read_map = AddressMap::new("camera");
        // write returned a virtual address, read wants the offset
        let read = Camera::read(&reader, addr - 0x800, &mut read_pool, &mut read_map).unwrap();

        let original = pool.camera(handle);
        let decoded = read_pool.camera(read);
        assert_eq!(decoded.position, original.position);
        assert_eq!(decoded.dir_x, original.dir_x);
        assert!((decoded.roll - original.roll).abs() < 1e-3);
    }
}
