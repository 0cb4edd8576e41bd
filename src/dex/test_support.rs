//! Builders for crafting small synthetic DEX images in unit tests.

use crate::dex::{
    header::{CLASS_DEF_STRIDE, HEADER_SIZE, METHOD_ID_STRIDE, STRING_ID_STRIDE, TYPE_ID_STRIDE},
    image::DexImage,
};

/// Encode one ULEB128 value.
pub fn encode_uleb128(mut value: u32) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            break;
        }
        out.push(byte | 0x80);
    }
    out
}

/// Encode a `class_data_item`: counts, filler field records, then the given
/// `(method_idx_diff, access_flags, code_off)` method records.
pub fn class_data_item(
    static_fields: u32,
    instance_fields: u32,
    direct: &[(u32, u32, u32)],
    r#virtual: &[(u32, u32, u32)],
) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend(encode_uleb128(static_fields));
    out.extend(encode_uleb128(instance_fields));
    out.extend(encode_uleb128(direct.len() as u32));
    out.extend(encode_uleb128(r#virtual.len() as u32));

    for _ in 0..static_fields + instance_fields {
        out.extend(encode_uleb128(1)); // field_idx_diff
        out.extend(encode_uleb128(1)); // access_flags
    }

    for &(diff, flags, code_off) in direct.iter().chain(r#virtual) {
        out.extend(encode_uleb128(diff));
        out.extend(encode_uleb128(flags));
        out.extend(encode_uleb128(code_off));
    }

    out
}

/// Incrementally describes a synthetic image; `build` lays it out with a
/// valid header and internally consistent index tables.
#[derive(Default)]
pub struct DexBuilder {
    strings: Vec<String>,
    type_ids: Vec<u32>,
    method_ids: Vec<(u16, u32)>,
    class_defs: Vec<(u32, Option<Vec<u8>>)>,
}

impl DexBuilder {
    pub fn new() -> Self {
        DexBuilder::default()
    }

    /// Append a string; ids are assigned in call order.
    pub fn string(mut self, value: &str) -> Self {
        self.strings.push(value.to_string());
        self
    }

    /// Append a type whose descriptor is the given string id.
    pub fn type_id(mut self, descriptor_string_idx: u32) -> Self {
        self.type_ids.push(descriptor_string_idx);
        self
    }

    /// Append a method id bound to a class (type idx) and a name string id.
    pub fn method_id(mut self, class_idx: u16, name_string_idx: u32) -> Self {
        self.method_ids.push((class_idx, name_string_idx));
        self
    }

    /// Append a class definition with an encoded-member stream.
    pub fn class_def(mut self, class_idx: u32, class_data: Vec<u8>) -> Self {
        self.class_defs.push((class_idx, Some(class_data)));
        self
    }

    /// Append a class definition with no member data (class_data_off 0).
    pub fn class_def_without_data(mut self, class_idx: u32) -> Self {
        self.class_defs.push((class_idx, None));
        self
    }

    /// Lay the image out and return its bytes.
    pub fn build(self) -> Vec<u8> {
        let string_ids_off = HEADER_SIZE;
        let type_ids_off = string_ids_off + self.strings.len() * STRING_ID_STRIDE;
        let method_ids_off = type_ids_off + self.type_ids.len() * TYPE_ID_STRIDE;
        let class_defs_off = method_ids_off + self.method_ids.len() * METHOD_ID_STRIDE;
        let mut cursor = class_defs_off + self.class_defs.len() * CLASS_DEF_STRIDE;

        // Place string data blobs, then class data blobs.
        let mut string_data_offs = Vec::new();
        for s in &self.strings {
            string_data_offs.push(cursor as u32);
            cursor += encode_uleb128(s.chars().count() as u32).len() + s.len() + 1;
        }
        let mut class_data_offs = Vec::new();
        for (_, blob) in &self.class_defs {
            match blob {
                Some(bytes) => {
                    class_data_offs.push(cursor as u32);
                    cursor += bytes.len();
                }
                None => class_data_offs.push(0),
            }
        }

        let total = cursor.max(0x100);
        let mut data = vec![0u8; total];
        data[0..8].copy_from_slice(b"dex\n035\0");

        let header_fields: [(usize, u32); 8] = [
            (0x38, self.strings.len() as u32),
            (0x3C, string_ids_off as u32),
            (0x40, self.type_ids.len() as u32),
            (0x44, type_ids_off as u32),
            (0x58, self.method_ids.len() as u32),
            (0x5C, method_ids_off as u32),
            (0x60, self.class_defs.len() as u32),
            (0x64, class_defs_off as u32),
        ];
        for (off, value) in header_fields {
            data[off..off + 4].copy_from_slice(&value.to_le_bytes());
        }

        for (i, off) in string_data_offs.iter().enumerate() {
            let slot = string_ids_off + i * STRING_ID_STRIDE;
            data[slot..slot + 4].copy_from_slice(&off.to_le_bytes());

            let mut blob = encode_uleb128(self.strings[i].chars().count() as u32);
            blob.extend_from_slice(self.strings[i].as_bytes());
            blob.push(0);
            data[*off as usize..*off as usize + blob.len()].copy_from_slice(&blob);
        }

        for (i, descriptor_idx) in self.type_ids.iter().enumerate() {
            let slot = type_ids_off + i * TYPE_ID_STRIDE;
            data[slot..slot + 4].copy_from_slice(&descriptor_idx.to_le_bytes());
        }

        for (i, (class_idx, name_idx)) in self.method_ids.iter().enumerate() {
            let slot = method_ids_off + i * METHOD_ID_STRIDE;
            data[slot..slot + 2].copy_from_slice(&class_idx.to_le_bytes());
            // proto_idx left zero
            data[slot + 4..slot + 8].copy_from_slice(&name_idx.to_le_bytes());
        }

        for (i, (class_idx, blob)) in self.class_defs.iter().enumerate() {
            let slot = class_defs_off + i * CLASS_DEF_STRIDE;
            data[slot..slot + 4].copy_from_slice(&class_idx.to_le_bytes());
            let data_off = class_data_offs[i];
            data[slot + 24..slot + 28].copy_from_slice(&data_off.to_le_bytes());
            if let Some(bytes) = blob {
                data[data_off as usize..data_off as usize + bytes.len()].copy_from_slice(bytes);
            }
        }

        data
    }

    /// Build and parse into a [`DexImage`].
    pub fn build_image(self) -> DexImage {
        DexImage::parse(self.build()).expect("builder produced an unparsable image")
    }
}
