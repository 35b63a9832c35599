use std::io::prelude::*;

use flate2::write::ZlibEncoder;
use flate2::Compression;

/// Deflate `data` with a zlib header, as `/FlateDecode` consumers expect.
pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    // Writing into a Vec cannot fail.
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// ASCII85-encode `data` (Adobe variant), including the `~>` terminator.
///
/// Groups of four bytes become five characters offset from `!`; an all-zero
/// group is shortened to `z`; a final partial group of n bytes is padded
/// with zeros and emits n + 1 characters.
pub fn ascii85_encode(data: &[u8]) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(data.len() / 4 * 5 + 7);
    for chunk in data.chunks(4) {
        let mut group = [0_u8; 4];
        group[..chunk.len()].copy_from_slice(chunk);
        let mut value = u32::from_be_bytes(group);

        if value == 0 && chunk.len() == 4 {
            encoded.push(b'z');
            continue;
        }

        let mut digits = [0_u8; 5];
        for digit in digits.iter_mut().rev() {
            *digit = b'!' + (value % 85) as u8;
            value /= 85;
        }
        encoded.extend_from_slice(&digits[..chunk.len() + 1]);
    }
    encoded.extend_from_slice(b"~>");
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn deflate_round_trips() {
        let data = b"2 2 5 6 re\nf";
        let compressed = deflate(data);
        assert_ne!(&compressed, data);

        let mut decoder = flate2::read::ZlibDecoder::new(compressed.as_slice());
        let mut inflated = Vec::new();
        decoder.read_to_end(&mut inflated).unwrap();
        assert_eq!(inflated, data);
    }

    #[test]
    fn ascii85_known_group() {
        assert_eq!(ascii85_encode(b"Man "), b"9jqo^~>");
    }

    #[test]
    fn ascii85_zero_group_is_z() {
        assert_eq!(ascii85_encode(&[0, 0, 0, 0]), b"z~>");
    }

    #[test]
    fn ascii85_partial_group() {
        // One input byte yields two digits before the terminator.
        let encoded = ascii85_encode(b"M");
        assert_eq!(encoded.len(), 4);
        assert!(encoded.ends_with(b"~>"));
        assert_eq!(&encoded[..2], b"9`");
    }

    #[test]
    fn ascii85_empty_input() {
        assert_eq!(ascii85_encode(b""), b"~>");
    }
}
