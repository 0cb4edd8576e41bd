//! Binary manifest rewrite for the experimental bypass.
//!
//! The compiled `AndroidManifest.xml` string pool stores the protection
//! runtime's `Application` subclass name. Overwriting it in place with the
//! stock class name, NUL-padded to the identical byte length, keeps every
//! string-pool offset valid without reparsing the binary XML. Both the
//! UTF-8 and UTF-16 pool encodings are covered; the first match wins.

/// `(needle, replacement)` pairs; replacements never exceed the needle.
const TARGETS: &[(&[u8], &[u8])] = &[
    (
        b"com.pairip.application.Application",
        b"android.app.Application",
    ),
    (
        b"c\0o\0m\0.\0p\0a\0i\0r\0i\0p\0",
        b"a\0n\0d\0r\0o\0i\0d\0.\0a\0p\0",
    ),
];

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}

/// Replace the protection runtime's application class name with the stock
/// one, preserving the manifest's length. Returns whether anything changed;
/// an untouched manifest usually means the package was already clean.
pub fn neutralize_application(data: &mut [u8]) -> bool {
    for &(needle, replacement) in TARGETS {
        let Some(pos) = find(data, needle) else {
            continue;
        };
        let field = &mut data[pos..pos + needle.len()];
        field[..replacement.len()].copy_from_slice(replacement);
        field[replacement.len()..].fill(0);
        return true;
    }
    false
}
