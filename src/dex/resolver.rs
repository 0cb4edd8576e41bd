//! Symbolic member resolution without a disassembler.
//!
//! Given a type descriptor and a method name, [`resolve`] walks the image's
//! index tables down to the method's `code_item` and returns the absolute
//! offset of its first instruction unit. The walk mirrors the format's
//! encoded-member stream exactly: four ULEB128 counts, structurally skipped
//! field records, then delta-encoded method records whose first integer is a
//! difference from the previous method index, not an absolute value. An
//! off-by-one in either the continuation-bit handling or the running index
//! silently mislocates the patch, which is why both live behind the tested
//! [`Parser`](crate::file::parser::Parser) primitives.

use crate::{
    dex::{
        header::{CLASS_DEF_STRIDE, METHOD_ID_STRIDE},
        image::DexImage,
    },
    file::{io::read_le_at, parser::Parser},
    Result,
};

/// Fixed size of the `code_item` header (registers, ins, outs, tries,
/// debug info offset, insns count) preceding the first instruction unit.
pub const CODE_ITEM_HEADER_SIZE: usize = 16;

/// Byte offset of `class_data_off` inside a `class_def_item`.
const CLASS_DATA_OFF_FIELD: usize = 24;

/// Resolve `(type_name, member_name)` to the absolute offset of the member's
/// first instruction unit, or `None` if no such member exists.
///
/// Resolution is first-match in declaration order. If a class declares
/// several methods with the same name but different signatures, the first
/// one with a code body wins; callers needing signature-specific resolution
/// must carry a discriminator this data model does not have.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] or [`crate::Error::OutOfBounds`] if
/// the encoded-member stream or an index table is structurally invalid.
///
/// # Examples
///
/// ```rust,no_run
/// use apkpatch::dex::{resolver, DexImage};
///
/// let image = DexImage::from_file("classes.dex".as_ref())?;
/// match resolver::resolve(&image, "Lcom/app/SignatureCheck;", "verifyIntegrity")? {
///     Some(offset) => println!("insns at {offset:#x}"),
///     None => println!("method not present"),
/// }
/// # Ok::<(), apkpatch::Error>(())
/// ```
pub fn resolve(image: &DexImage, type_name: &str, member_name: &str) -> Result<Option<usize>> {
    let Some(descriptor_idx) = image.strings().index_of(type_name) else {
        return Ok(None);
    };
    let Some(class_idx) = image.type_with_descriptor(descriptor_idx) else {
        return Ok(None);
    };

    let header = image.header();
    let data = image.data();

    for i in 0..header.class_defs_size as usize {
        let def_off = header.class_defs_off as usize + i * CLASS_DEF_STRIDE;

        let mut offset = def_off;
        if read_le_at::<u32>(data, &mut offset)? != class_idx {
            continue;
        }

        let mut offset = def_off + CLASS_DATA_OFF_FIELD;
        let class_data_off = read_le_at::<u32>(data, &mut offset)?;
        if class_data_off == 0 {
            // Marker interface or annotation holder; nothing to patch.
            continue;
        }

        if let Some(found) = walk_class_data(image, class_data_off as usize, member_name)? {
            return Ok(Some(found));
        }
    }

    Ok(None)
}

/// Walk one `class_data_item`, returning the insns offset of the first
/// method named `member_name` that has a code body.
fn walk_class_data(
    image: &DexImage,
    class_data_off: usize,
    member_name: &str,
) -> Result<Option<usize>> {
    let header = image.header();
    let data = image.data();

    let mut parser = Parser::new(data);
    parser.seek(class_data_off)?;

    let static_fields = parser.read_uleb128()?;
    let instance_fields = parser.read_uleb128()?;
    let direct_methods = parser.read_uleb128()?;
    let virtual_methods = parser.read_uleb128()?;

    // Field records carry no code; skip them structurally (idx diff + flags).
    for _ in 0..static_fields.saturating_add(instance_fields) {
        parser.read_uleb128()?;
        parser.read_uleb128()?;
    }

    // One running index across both method lists, accumulated from deltas.
    let mut method_idx: u32 = 0;
    for _ in 0..direct_methods.saturating_add(virtual_methods) {
        let idx_diff = parser.read_uleb128()?;
        method_idx = method_idx
            .checked_add(idx_diff)
            .ok_or_else(|| malformed_error!("Method index delta overflow"))?;
        let _access_flags = parser.read_uleb128()?;
        let code_off = parser.read_uleb128()?;

        if method_idx >= header.method_ids_size {
            return Err(malformed_error!(
                "Encoded method index {} exceeds method_ids table size {}",
                method_idx,
                header.method_ids_size
            ));
        }

        let mut name_field =
            header.method_ids_off as usize + method_idx as usize * METHOD_ID_STRIDE + 4;
        let name_idx = read_le_at::<u32>(data, &mut name_field)?;

        if image.strings().get(name_idx) == Some(member_name) && code_off != 0 {
            return Ok(Some(code_off as usize + CODE_ITEM_HEADER_SIZE));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dex::test_support::{class_data_item, DexBuilder};

    #[test]
    fn resolves_direct_method() {
        // One class, one direct method "bar" with code_off 0x40.
        let image = DexBuilder::new()
            .string("Lcom/app/Foo;") // 0
            .string("bar") // 1
            .type_id(0)
            .method_id(0, 1)
            .class_def(0, class_data_item(0, 0, &[(0, 1, 0x40)], &[]))
            .build_image();

        let offset = resolve(&image, "Lcom/app/Foo;", "bar").unwrap();
        assert_eq!(offset, Some(0x40 + CODE_ITEM_HEADER_SIZE));
    }

    #[test]
    fn accumulates_method_index_deltas() {
        // Three methods; the target is reached via deltas 1 then 1 from
        // method index 0, so a naive absolute read would mislocate it.
        let image = DexBuilder::new()
            .string("Lcom/app/Foo;") // 0
            .string("a") // 1
            .string("b") // 2
            .string("target") // 3
            .type_id(0)
            .method_id(0, 1)
            .method_id(0, 2)
            .method_id(0, 3)
            .class_def(
                0,
                class_data_item(0, 0, &[(0, 1, 0x40), (1, 1, 0x80), (1, 1, 0xC0)], &[]),
            )
            .build_image();

        let offset = resolve(&image, "Lcom/app/Foo;", "target").unwrap();
        assert_eq!(offset, Some(0xC0 + CODE_ITEM_HEADER_SIZE));
    }

    #[test]
    fn skips_field_records_and_finds_virtual_method() {
        let image = DexBuilder::new()
            .string("Lcom/app/Foo;") // 0
            .string("check") // 1
            .type_id(0)
            .method_id(0, 1)
            .class_def(0, class_data_item(2, 1, &[], &[(0, 1, 0x40)]))
            .build_image();

        let offset = resolve(&image, "Lcom/app/Foo;", "check").unwrap();
        assert_eq!(offset, Some(0x40 + CODE_ITEM_HEADER_SIZE));
    }

    #[test]
    fn abstract_method_with_same_name_is_passed_over() {
        // First record matches by name but has code_off 0 (abstract); the
        // second record with a body must win.
        let image = DexBuilder::new()
            .string("Lcom/app/Foo;") // 0
            .string("bar") // 1
            .type_id(0)
            .method_id(0, 1)
            .method_id(0, 1)
            .class_def(0, class_data_item(0, 0, &[(0, 1, 0), (1, 1, 0x40)], &[]))
            .build_image();

        let offset = resolve(&image, "Lcom/app/Foo;", "bar").unwrap();
        assert_eq!(offset, Some(0x40 + CODE_ITEM_HEADER_SIZE));
    }

    #[test]
    fn unknown_type_and_unknown_method_are_not_found() {
        let image = DexBuilder::new()
            .string("Lcom/app/Foo;")
            .string("bar")
            .type_id(0)
            .method_id(0, 1)
            .class_def(0, class_data_item(0, 0, &[(0, 1, 0x40)], &[]))
            .build_image();

        assert_eq!(resolve(&image, "Lcom/app/Bar;", "bar").unwrap(), None);
        assert_eq!(resolve(&image, "Lcom/app/Foo;", "baz").unwrap(), None);
    }

    #[test]
    fn class_without_member_data_is_skipped() {
        let image = DexBuilder::new()
            .string("Lcom/app/Foo;")
            .string("bar")
            .type_id(0)
            .method_id(0, 1)
            .class_def_without_data(0)
            .build_image();

        assert_eq!(resolve(&image, "Lcom/app/Foo;", "bar").unwrap(), None);
    }

    #[test]
    fn method_index_outside_table_is_malformed() {
        // Delta jumps past the method_ids table.
        let image = DexBuilder::new()
            .string("Lcom/app/Foo;")
            .string("bar")
            .type_id(0)
            .method_id(0, 1)
            .class_def(0, class_data_item(0, 0, &[(7, 1, 0x40)], &[]))
            .build_image();

        assert!(matches!(
            resolve(&image, "Lcom/app/Foo;", "bar"),
            Err(crate::Error::Malformed { .. })
        ));
    }
}
