use gbdecompress::{decompress_into, Decompressor};
use proptest::prelude::*;

/// Minimal greedy encoder producing the same token layout as GBTD
fn compress(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut literal = Vec::new();
    let mut i = 0;

    while i < data.len() {
        let value = data[i];
        let run = data[i..].iter().take(64).take_while(|&&b| b == value).count();
        let (back, len) = longest_match(data, i);

        if run >= 3 && run >= len {
            flush_literal(&mut out, &mut literal);
            // run >= 3 keeps the control byte clear of the end marker
            out.extend([(run - 1) as u8, value]);
            i += run;
        } else if len >= 4 {
            flush_literal(&mut out, &mut literal);
            let offset = -(back as i16);
            out.push(0x80 | (len - 1) as u8);
            out.extend(offset.to_le_bytes());
            i += len;
        } else {
            literal.push(value);
            if literal.len() == 64 {
                flush_literal(&mut out, &mut literal);
            }
            i += 1;
        }
    }

    flush_literal(&mut out, &mut literal);
    out.push(0x00);
    out
}

fn flush_literal(out: &mut Vec<u8>, literal: &mut Vec<u8>) {
    if !literal.is_empty() {
        out.push(0xc0 | (literal.len() - 1) as u8);
        out.append(literal);
    }
}

fn longest_match(data: &[u8], pos: usize) -> (usize, usize) {
    (1..=pos.min(256))
        .map(|back| {
            let len = (0..64)
                .take_while(|&k| pos + k < data.len() && data[pos + k] == data[pos + k - back])
                .count();
            (back, len)
        })
        .max_by_key(|&(back, len)| (len, usize::MAX - back))
        .unwrap_or((0, 0))
}

fn decompress(src: &[u8]) -> Vec<u8> {
    Decompressor::new(src, 0).decompress().unwrap().data
}

proptest! {
    #[test]
    fn arbitrary_roundtrip(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        prop_assert_eq!(decompress(&compress(&data)), data);
    }

    #[test]
    fn low_entropy_roundtrip(data in proptest::collection::vec(0u8..3, 0..1024)) {
        let compressed = compress(&data);
        prop_assert_eq!(decompress(&compressed), data);
    }

    #[test]
    fn buffer_path_matches(data in proptest::collection::vec(0u8..4, 0..256)) {
        let compressed = compress(&data);
        let mut dst = vec![0u8; data.len()];

        let written = decompress_into(&compressed, &mut dst).unwrap();

        prop_assert_eq!(written, data.len());
        prop_assert_eq!(dst, data);
    }

    #[test]
    fn decode_never_panics(data in proptest::collection::vec(any::<u8>(), 0..128)) {
        let mut decompressor = Decompressor::new(&data, 0);
        let mut produced = 0usize;

        while let Ok(Some(_)) = decompressor.decode_next() {
            produced += 1;
        }

        // every token emits at most 128 bytes
        prop_assert!(produced <= data.len() * 128);
        prop_assert!(decompressor.is_finished());
    }
}

#[test]
fn compressed_tiles_are_smaller() {
    let mut tiles = Vec::new();
    for i in 0..32u8 {
        tiles.extend([0x00, 0xff, i, i, 0x00, 0xff, i, i, 0x3c, 0x3c, 0x3c, 0x3c, 0x7e, 0x7e, 0x00, 0x00]);
    }

    let compressed = compress(&tiles);

    assert!(compressed.len() < tiles.len());
    assert_eq!(decompress(&compressed), tiles);
}
