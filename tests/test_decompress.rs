use gbdecompress::{decompress_into, DecompressError, Decompressor};

/// literal(3) 10 20 30, repeat byte ff x4, back-reference -3 x2, end
const PATTERN_STREAM: &[u8] = &[
    0xc2, 0x10, 0x20, 0x30, 0x03, 0xff, 0x81, 0xfd, 0xff, 0x00,
];

fn decompress(src: &[u8]) -> Result<Vec<u8>, DecompressError> {
    Decompressor::new(src, 0).decompress().map(|result| result.data)
}

#[test]
fn test_pattern_stream() -> anyhow::Result<()> {
    let result = Decompressor::new(PATTERN_STREAM, 0).decompress()?;

    assert_eq!(
        result.data,
        [0x10, 0x20, 0x30, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
    );
    assert_eq!(result.bytes_read, PATTERN_STREAM.len());

    Ok(())
}

#[test]
fn test_back_reference_reaching_into_literal() -> anyhow::Result<()> {
    let src = [0xc2, 0x10, 0x20, 0x30, 0x03, 0xff, 0x81, 0xfb, 0xff, 0x00];

    assert_eq!(
        decompress(&src)?,
        [0x10, 0x20, 0x30, 0xff, 0xff, 0xff, 0xff, 0x30, 0xff]
    );

    Ok(())
}

#[test]
fn test_overlapping_back_reference_repeats_pattern() -> anyhow::Result<()> {
    // 01 02, then copy 5 bytes from 2 back
    let src = [0xc1, 0x01, 0x02, 0x84, 0xfe, 0xff, 0x00];

    assert_eq!(decompress(&src)?, [0x01, 0x02, 0x01, 0x02, 0x01, 0x02, 0x01]);

    Ok(())
}

#[test]
fn test_repeat_word() -> anyhow::Result<()> {
    let src = [0x42, 0xaa, 0x55, 0x00];

    assert_eq!(decompress(&src)?, [0xaa, 0x55, 0xaa, 0x55, 0xaa, 0x55]);

    Ok(())
}

#[test]
fn test_maximum_run_lengths() -> anyhow::Result<()> {
    let mut src = vec![0xff];
    src.extend(0..64u8);
    src.extend([0x3f, 0xee, 0x00]);

    let data = decompress(&src)?;

    assert_eq!(data.len(), 128);
    assert_eq!(&data[..64], (0..64u8).collect::<Vec<_>>());
    assert!(data[64..].iter().all(|&b| b == 0xee));

    Ok(())
}

#[test]
fn test_empty_stream() -> anyhow::Result<()> {
    let result = Decompressor::new(&[0x00], 0).decompress()?;

    assert!(result.data.is_empty());
    assert_eq!(result.bytes_read, 1);

    Ok(())
}

#[test]
fn test_decompress_at_offset() -> anyhow::Result<()> {
    let mut rom = vec![0x12, 0x34, 0x56];
    rom.extend_from_slice(PATTERN_STREAM);
    rom.extend_from_slice(&[0xde, 0xad]);

    let result = Decompressor::new(&rom, 3).decompress()?;

    assert_eq!(result.data.len(), 9);
    assert_eq!(result.bytes_read, PATTERN_STREAM.len());

    let mut decompressor = Decompressor::new(&rom, 3);
    assert_eq!(decompressor.read_position(), 3);
    while decompressor.decode_next()?.is_some() {}
    assert_eq!(decompressor.read_position(), 3 + PATTERN_STREAM.len());
    assert_eq!(decompressor.produced(), 9);

    Ok(())
}

#[test]
fn test_back_reference_before_output_start() {
    let result = decompress(&[0x80, 0xff, 0xff, 0x00]);

    assert_eq!(
        result,
        Err(DecompressError::MalformedStream {
            position: 0,
            offset: -1,
            available: 0,
        })
    );
}

#[test]
fn test_back_reference_too_far_stops_before_reading() {
    let src = [0xc1, 0x01, 0x02, 0x80, 0xfd, 0xff, 0x00];
    let mut decompressor = Decompressor::new(&src, 0);

    assert_eq!(decompressor.next(), Some(Ok(0x01)));
    assert_eq!(decompressor.next(), Some(Ok(0x02)));
    assert_eq!(
        decompressor.next(),
        Some(Err(DecompressError::MalformedStream {
            position: 3,
            offset: -3,
            available: 2,
        }))
    );
    assert_eq!(decompressor.next(), None);
    assert!(decompressor.is_finished());
}

#[test]
fn test_forward_reference_is_malformed() {
    for offset in [[0x00, 0x00], [0x01, 0x00], [0xff, 0x7f]] {
        let src = [0xc0, 0x01, 0x80, offset[0], offset[1], 0x00];

        assert!(matches!(
            decompress(&src),
            Err(DecompressError::MalformedStream { position: 2, .. })
        ));
    }
}

#[test]
fn test_truncated_literal_emits_available_bytes() {
    let src = [0xc3, 0x01, 0x02];
    let mut decompressor = Decompressor::new(&src, 0);

    assert_eq!(decompressor.decode_next(), Ok(Some(0x01)));
    assert_eq!(decompressor.decode_next(), Ok(Some(0x02)));
    assert_eq!(
        decompressor.decode_next(),
        Err(DecompressError::TruncatedStream { position: 3 })
    );
    assert_eq!(decompressor.decode_next(), Ok(None));
}

#[test]
fn test_missing_end_marker() {
    assert_eq!(
        decompress(&[0xc0, 0x01]),
        Err(DecompressError::TruncatedStream { position: 2 })
    );
    assert_eq!(
        decompress(&[]),
        Err(DecompressError::TruncatedStream { position: 0 })
    );
}

#[test]
fn test_truncated_operand() {
    assert_eq!(
        decompress(&[0x41, 0xaa]),
        Err(DecompressError::TruncatedStream { position: 2 })
    );
    assert_eq!(
        decompress(&[0xc0, 0x01, 0x80, 0xff]),
        Err(DecompressError::TruncatedStream { position: 4 })
    );
}

#[test]
fn test_decoding_stops_at_end_marker() -> anyhow::Result<()> {
    let src = [0x02, 0x77, 0x00, 0xc0, 0x99, 0x00];
    let mut decompressor = Decompressor::new(&src, 0);

    let data = decompressor.by_ref().collect::<Result<Vec<_>, _>>()?;

    assert_eq!(data, [0x77, 0x77, 0x77]);
    assert_eq!(decompressor.bytes_read(), 3);
    assert_eq!(decompressor.decode_next(), Ok(None));

    Ok(())
}

#[test]
fn test_decompress_into_buffer() -> anyhow::Result<()> {
    let mut first = [0u8; 16];
    let mut second = [0u8; 16];

    let written = decompress_into(PATTERN_STREAM, &mut first)?;
    decompress_into(PATTERN_STREAM, &mut second)?;

    assert_eq!(written, 9);
    assert_eq!(first, second);
    assert_eq!(&first[..written], decompress(PATTERN_STREAM)?);
    assert!(first[written..].iter().all(|&b| b == 0));

    Ok(())
}

#[test]
fn test_decompress_into_small_buffer() {
    let mut dst = [0u8; 2];

    assert_eq!(
        decompress_into(PATTERN_STREAM, &mut dst),
        Err(DecompressError::OutputOverflow { capacity: 2 })
    );
    assert_eq!(dst, [0x10, 0x20]);
}

#[test]
fn test_error_leaves_partial_buffer() {
    let mut dst = [0u8; 8];
    let src = [0xc1, 0x01, 0x02, 0x80, 0xf0, 0xff, 0x00];

    assert!(matches!(
        decompress_into(&src, &mut dst),
        Err(DecompressError::MalformedStream { .. })
    ));
    assert_eq!(&dst[..3], [0x01, 0x02, 0x00]);
}
