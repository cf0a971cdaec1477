//! Bounded string helpers for fixed-capacity record fields.

/// Returns the longest prefix of `s` that fits in `max_bytes` without
/// splitting a UTF-8 character.
pub fn truncate_bounded(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}

/// Decodes the `\NNN` octal escapes the kernel uses in mount tables
/// (space is written as `\040`, tab as `\011`, backslash as `\134`).
///
/// Sequences that are not three octal digits are kept verbatim.
pub fn unescape_octal(s: &str) -> String {
    if !s.contains('\\') {
        return s.to_string();
    }

    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\'
            && i + 3 < bytes.len()
            && bytes[i + 1..i + 4].iter().all(|b| (b'0'..=b'7').contains(b))
        {
            let value = (bytes[i + 1] - b'0') as u32 * 64
                + (bytes[i + 2] - b'0') as u32 * 8
                + (bytes[i + 3] - b'0') as u32;
            if let Ok(byte) = u8::try_from(value) {
                out.push(byte);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_bounded_short() {
        assert_eq!(truncate_bounded("server1", 31), "server1");
        assert_eq!(truncate_bounded("", 0), "");
    }

    #[test]
    fn test_truncate_bounded_long() {
        let host = "a".repeat(40);
        assert_eq!(truncate_bounded(&host, 31).len(), 31);
    }

    #[test]
    fn test_truncate_bounded_char_boundary() {
        // "é" is two bytes; cutting at 2 would split it.
        assert_eq!(truncate_bounded("aé", 2), "a");
        assert_eq!(truncate_bounded("aé", 3), "aé");
    }

    #[test]
    fn test_unescape_octal() {
        assert_eq!(unescape_octal("/mnt/my\\040share"), "/mnt/my share");
        assert_eq!(unescape_octal("/mnt/a\\011b"), "/mnt/a\tb");
        assert_eq!(unescape_octal("/mnt/back\\134slash"), "/mnt/back\\slash");
        assert_eq!(unescape_octal("/mnt/plain"), "/mnt/plain");
    }

    #[test]
    fn test_unescape_octal_incomplete() {
        assert_eq!(unescape_octal("/mnt/x\\04"), "/mnt/x\\04");
        assert_eq!(unescape_octal("/mnt/x\\9zz"), "/mnt/x\\9zz");
        assert_eq!(unescape_octal("\\"), "\\");
    }
}
