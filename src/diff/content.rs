//! diff::content
//!
//! Blob content classification: binary sniffing, raster-image detection,
//! and best-effort text decoding.
//!
//! Git blobs carry no declared encoding, so decoding can never be allowed
//! to fail a request; [`decode_text`] always produces something renderable.

/// Raster formats the UI compares as images rather than text.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// A blob containing a NUL byte anywhere is binary, regardless of any
/// surrounding valid text.
pub fn is_binary(bytes: &[u8]) -> bool {
    bytes.contains(&0)
}

/// Whether a filename's extension marks it as a raster image.
pub fn is_image_name(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Decode blob bytes to text, best effort.
///
/// BOM-marked UTF-16 (either endianness) is decoded as such; everything
/// else is treated as UTF-8 with invalid sequences replaced. Deterministic
/// and infallible; true binaries are expected to be caught by
/// [`is_binary`] before reaching this path.
pub fn decode_text(bytes: &[u8]) -> String {
    match bytes {
        [0xff, 0xfe, rest @ ..] => decode_utf16(rest, u16::from_le_bytes),
        [0xfe, 0xff, rest @ ..] => decode_utf16(rest, u16::from_be_bytes),
        [0xef, 0xbb, 0xbf, rest @ ..] => String::from_utf8_lossy(rest).into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

fn decode_utf16(bytes: &[u8], from_bytes: fn([u8; 2]) -> u16) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| from_bytes([pair[0], pair[1]]))
        .collect();
    // A trailing odd byte is dropped; lossy by contract
    String::from_utf16_lossy(&units)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nul_byte_means_binary() {
        assert!(is_binary(b"plain text\x00more text"));
        assert!(is_binary(b"\x00"));
        assert!(!is_binary(b"plain text, no nul"));
        assert!(!is_binary(b""));
    }

    #[test]
    fn image_extensions_detected_case_insensitively() {
        assert!(is_image_name("logo.png"));
        assert!(is_image_name("photo.JPEG"));
        assert!(is_image_name("dir/nested/pic.Gif"));
        assert!(!is_image_name("main.rs"));
        assert!(!is_image_name("png"));
        assert!(!is_image_name("archive.tar.gz"));
    }

    #[test]
    fn utf8_decodes_directly() {
        assert_eq!(decode_text("héllo".as_bytes()), "héllo");
    }

    #[test]
    fn utf8_bom_is_stripped() {
        let mut bytes = vec![0xef, 0xbb, 0xbf];
        bytes.extend_from_slice(b"text");
        assert_eq!(decode_text(&bytes), "text");
    }

    #[test]
    fn invalid_utf8_is_replaced_not_fatal() {
        let decoded = decode_text(&[b'a', 0xfe, b'b']);
        assert!(decoded.starts_with('a'));
        assert!(decoded.ends_with('b'));
        assert!(decoded.contains('\u{fffd}'));
    }

    #[test]
    fn utf16_le_with_bom() {
        let mut bytes = vec![0xff, 0xfe];
        for unit in "hi".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(decode_text(&bytes), "hi");
    }

    #[test]
    fn utf16_be_with_bom() {
        let mut bytes = vec![0xfe, 0xff];
        for unit in "hi".encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        assert_eq!(decode_text(&bytes), "hi");
    }
}
