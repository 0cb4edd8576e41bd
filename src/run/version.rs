//! Package version detection from file names.

/// Extract the first `digits.digits[.digits]` run from a file name, e.g.
/// `app_3.21.4_arm64.apk` yields `3.21.4`.
///
/// At least one dot-separated pair is required, so bare numbers in a name
/// never match. Returns `None` when no such run exists; callers fall back
/// to an explicit version argument.
#[must_use]
pub fn from_file_name(name: &str) -> Option<String> {
    let bytes = name.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }

        let start = i;
        let mut end = i;
        let mut dots = 0;
        let mut j = i;
        while j < bytes.len() {
            if bytes[j].is_ascii_digit() {
                j += 1;
                end = j;
            } else if bytes[j] == b'.'
                && dots < 2
                && j + 1 < bytes.len()
                && bytes[j + 1].is_ascii_digit()
            {
                dots += 1;
                j += 1;
            } else {
                break;
            }
        }

        if dots >= 1 {
            return Some(name[start..end].to_string());
        }
        i = j.max(i + 1);
    }

    None
}
