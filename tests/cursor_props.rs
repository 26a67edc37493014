use proptest::prelude::*;
use sa2event::cursor::{Endian, EventReader, EventWriter};
use sa2event::lut::AddressMap;

proptest! {
    #[test]
    fn words_roundtrip_in_both_endians(values in proptest::collection::vec(any::<u32>(), 1..64)) {
        for endian in [Endian::Little, Endian::Big] {
            let mut writer = EventWriter::new(0, endian);
            for &value in &values {
                writer.write_u32(value);
            }
            let data = writer.into_bytes();
            prop_assert_eq!(data.len(), values.len() * 4);

            let reader = EventReader::new(&data, 0, endian);
            for (i, &value) in values.iter().enumerate() {
                prop_assert_eq!(reader.read_u32(i as u32 * 4)?, value);
            }
        }
    }

    #[test]
    fn floats_roundtrip(values in proptest::collection::vec(any::<f32>(), 1..32)) {
        let mut writer = EventWriter::new(0, Endian::Big);
        for &value in &values {
            writer.write_f32(value);
        }
        let data = writer.into_bytes();
        let reader = EventReader::new(&data, 0, Endian::Big);
        for (i, &value) in values.iter().enumerate() {
            let read = reader.read_f32(i as u32 * 4)?;
            prop_assert_eq!(read.to_bits(), value.to_bits());
        }
    }

    #[test]
    fn pointers_resolve_against_the_image_base(
        image_base in 0x1000u32..0x1000_0000,
        offset in 4u32..0x800,
    ) {
        let mut writer = EventWriter::new(image_base, Endian::Little);
        writer.write_u32(image_base + offset);
        writer.write_empty(offset as usize);

        let data = writer.into_bytes();
        let reader = EventReader::new(&data, image_base, Endian::Little);
        prop_assert_eq!(reader.read_pointer(0)?, offset);
    }

    #[test]
    fn out_of_range_reads_never_panic(addr in any::<u32>(), len in 0usize..64) {
        let data = vec![0u8; 32];
        let reader = EventReader::new(&data, 0, Endian::Little);
        let _ = reader.read_bytes(addr, len);
        let _ = reader.read_u32(addr);
    }

    #[test]
    fn fixed_strings_roundtrip(text in "[a-z_0-9]{0,15}") {
        let mut writer = EventWriter::new(0, Endian::Little);
        writer.write_string_fixed(&text, 16)?;
        let data = writer.into_bytes();
        prop_assert_eq!(data.len(), 16);

        let reader = EventReader::new(&data, 0, Endian::Little);
        prop_assert_eq!(reader.read_string_fixed(0, 16)?, text);
    }

    #[test]
    fn address_map_writes_each_identity_once(keys in proptest::collection::vec(0u32..16, 1..64)) {
        let mut map: AddressMap<u32> = AddressMap::new("prop");
        let mut writes = 0u32;

        for &key in &keys {
            let addr = map.get_or_write(key, || {
                writes += 1;
                Ok(0x1000 + key * 8)
            }).unwrap();
            prop_assert_eq!(addr, 0x1000 + key * 8);
        }

        let distinct = {
            let mut sorted = keys.clone();
            sorted.sort_unstable();
            sorted.dedup();
            sorted.len() as u32
        };
        prop_assert_eq!(writes, distinct);
    }
}
