use gridfield::prelude::*;
use gridfield::{ByteOrder, CodecKind, CompressedBlocks, Compressor, Error, DEFAULT_BLOCK_SIZE};
use rstest::rstest;

const SMALL_BLOCK: usize = 64;

/// half repetitive, half noisy, so every backend sees both kinds of block
fn payload(len: usize) -> Serialization {
    let mut state = 0x2545_f491u32;
    let bytes: Vec<u8> = (0..len)
        .map(|i| {
            if (i / 16) % 2 == 0 {
                (i % 7) as u8
            } else {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                state as u8
            }
        })
        .collect();
    bytes.into()
}

fn roundtrip<H: HeaderType>(compressor: &Compressor, len: usize) {
    let original = payload(len);
    let mut data = original.clone();
    let blocks = compressor.compress::<H>(&mut data).unwrap();

    let block_size = compressor.block_size();
    assert_eq!(blocks.block_size(), block_size);
    assert_eq!(blocks.number_of_blocks(), (len + block_size - 1) / block_size);
    assert_eq!(blocks.residual_block_size(), len % block_size);
    assert_eq!(blocks.uncompressed_size().unwrap(), len);
    assert_eq!(blocks.compressed_size().unwrap(), data.len());

    for order in [ByteOrder::LittleEndian, ByteOrder::BigEndian] {
        let header = blocks.header_bytes(order);
        assert_eq!(header.len(), (3 + blocks.number_of_blocks()) * H::SIZE);
        assert_eq!(CompressedBlocks::<H>::from_header_bytes(&header, order).unwrap(), blocks);
    }

    compressor.decompress(&mut data, &blocks).unwrap();
    assert_eq!(data, original);
}

fn compressor(kind: CodecKind, block_size: usize) -> Option<Compressor> {
    match Compressor::new(kind) {
        Ok(compressor) => Some(compressor.with_block_size(block_size)),
        Err(Error::Unavailable(_)) => None,
        Err(e) => panic!("unexpected error {e}"),
    }
}

#[rstest]
fn small_blocks_every_header_width(
    #[values(CodecKind::Zlib, CodecKind::Lz4, CodecKind::Lzma, CodecKind::Zstd)] kind: CodecKind,
    #[values(0, 1, SMALL_BLOCK - 1, SMALL_BLOCK, SMALL_BLOCK + 1, 3 * SMALL_BLOCK + 17)] len: usize,
) {
    let Some(compressor) = compressor(kind, SMALL_BLOCK) else {
        return;
    };
    roundtrip::<u8>(&compressor, len);
    roundtrip::<u16>(&compressor, len);
    roundtrip::<u32>(&compressor, len);
    roundtrip::<u64>(&compressor, len);
}

#[rstest]
fn default_blocks(
    #[values(CodecKind::Zlib, CodecKind::Lz4, CodecKind::Lzma, CodecKind::Zstd)] kind: CodecKind,
    #[values(
        DEFAULT_BLOCK_SIZE - 1,
        DEFAULT_BLOCK_SIZE,
        DEFAULT_BLOCK_SIZE + 1,
        4 * DEFAULT_BLOCK_SIZE + 1234
    )]
    len: usize,
) {
    let Some(compressor) = compressor(kind, DEFAULT_BLOCK_SIZE) else {
        return;
    };
    roundtrip::<u32>(&compressor, len);
    roundtrip::<u64>(&compressor, len);
}

#[rstest]
#[case(CodecKind::Zlib, Some(0))]
#[case(CodecKind::Zlib, Some(9))]
#[case(CodecKind::Lzma, Some(0))]
#[case(CodecKind::Lzma, Some(6))]
#[case(CodecKind::Zstd, Some(1))]
#[case(CodecKind::Zstd, Some(19))]
fn levels_do_not_change_the_content(#[case] kind: CodecKind, #[case] level: Option<i32>) {
    let Some(compressor) = compressor(kind, 1000) else {
        return;
    };
    roundtrip::<u32>(&compressor.with_level(level), 10_000);
}

#[rstest]
fn narrow_headers_fail_before_compressing(
    #[values(CodecKind::Zlib, CodecKind::Lz4, CodecKind::Lzma, CodecKind::Zstd)] kind: CodecKind,
) {
    // 300 blocks do not fit into a u8
    let Some(compressor) = compressor(kind, 1) else {
        return;
    };
    let original = payload(300);
    let mut data = original.clone();
    assert!(matches!(compressor.compress::<u8>(&mut data), Err(Error::Type(_))));
    assert_eq!(data, original);

    // neither does a block size of 256
    let compressor = compressor.with_block_size(256);
    let mut data = payload(10);
    assert!(matches!(compressor.compress::<u8>(&mut data), Err(Error::Type(_))));
}

#[rstest]
fn truncated_payload_is_a_size_error(
    #[values(CodecKind::Zlib, CodecKind::Lz4, CodecKind::Lzma, CodecKind::Zstd)] kind: CodecKind,
) {
    let Some(compressor) = compressor(kind, SMALL_BLOCK) else {
        return;
    };
    let mut data = payload(200);
    let blocks = compressor.compress::<u32>(&mut data).unwrap();

    let mut truncated = Serialization::from_bytes(&data.as_bytes()[..data.len() - 1]);
    assert!(matches!(
        compressor.decompress(&mut truncated, &blocks),
        Err(Error::Size(_))
    ));
}

#[rstest]
fn corrupt_headers_are_size_errors(
    #[values(CodecKind::Zlib, CodecKind::Lz4, CodecKind::Lzma, CodecKind::Zstd)] kind: CodecKind,
) {
    let Some(compressor) = compressor(kind, SMALL_BLOCK) else {
        return;
    };
    let header: Vec<u8> = [4u64, 2, 0, u64::MAX, 2]
        .iter()
        .flat_map(|value| value.to_le_bytes())
        .collect();
    let blocks = CompressedBlocks::<u64>::from_header_bytes(&header, ByteOrder::LittleEndian)
        .unwrap();
    let mut data = Serialization::from_bytes(&[0]);
    assert!(matches!(
        compressor.decompress(&mut data, &blocks),
        Err(Error::Size(_))
    ));

    let header: Vec<u8> = [u64::MAX, 2, 0, 1, 1]
        .iter()
        .flat_map(|value| value.to_le_bytes())
        .collect();
    let blocks = CompressedBlocks::<u64>::from_header_bytes(&header, ByteOrder::LittleEndian)
        .unwrap();
    assert!(matches!(blocks.uncompressed_size(), Err(Error::Size(_))));
    let mut data = Serialization::from_bytes(&[0, 0]);
    assert!(matches!(
        compressor.decompress(&mut data, &blocks),
        Err(Error::Size(_))
    ));

    let header = [4u32, 0, 3]
        .iter()
        .flat_map(|value| value.to_be_bytes())
        .collect::<Vec<u8>>();
    assert!(matches!(
        CompressedBlocks::<u32>::from_header_bytes(&header, ByteOrder::BigEndian),
        Err(Error::Size(_))
    ));
}

#[test]
fn codecs_by_name() {
    for name in ["zlib", "deflate", "LZ4", "lzma", "xz", "zstd", "Zstandard"] {
        match Compressor::from_name(name) {
            Ok(_) | Err(Error::Unavailable(_)) => {}
            Err(e) => panic!("{name}: unexpected error {e}"),
        }
    }
    assert!(matches!(
        Compressor::from_name("brotli"),
        Err(Error::UnknownCodec(_))
    ));
    assert_eq!(
        CodecKind::available(),
        CodecKind::ALL
            .into_iter()
            .filter(|kind| kind.is_available())
            .collect::<Vec<_>>()
    );
}
