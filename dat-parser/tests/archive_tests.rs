//! End-to-end decoding tests against synthetic archives

use std::io::Write;

use flate2::{Compression, write::ZlibEncoder};

use dat_codec::{CodecError, CodecRegistry};
use dat_parser::{ArchiveBuffer, DatArchive, Error, NO_HASH, path_hash};

const CHUNK_OFFSET: usize = 0x100;
const CHUNK_SIZE: u32 = 0x20;
const PAYLOAD_ADDR: usize = 0x20;

fn write_u32(data: &mut [u8], offset: usize, value: u32) {
    data[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
}

fn write_u16(data: &mut [u8], offset: usize, value: u16) {
    data[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
}

fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Offset of the single location record `build_archive` writes.
fn record_offset() -> usize {
    CHUNK_OFFSET + 0x1C + CHUNK_SIZE as usize + 0x10 + 0xC * 2 + 0x8
}

/// Offset of the hash table `build_archive` writes.
fn hash_table_offset() -> usize {
    record_offset() + 0x10
}

/// Build an archive holding directory `root` with one member
/// `file.txt`, whose payload sits at `PAYLOAD_ADDR` with the given
/// location sizes. A decoy chunk signature is planted inside the
/// payload region.
fn build_archive(payload: &[u8], compressed_size: u32, raw_size: u32) -> Vec<u8> {
    let mut data = vec![0u8; 0x200];

    data[..4].copy_from_slice(b"DAT\x01");
    data[PAYLOAD_ADDR..PAYLOAD_ADDR + payload.len()].copy_from_slice(payload);
    data[0x90..0x98].copy_from_slice(b".CC40TAD");

    data[CHUNK_OFFSET..CHUNK_OFFSET + 8].copy_from_slice(b".CC40TAD");
    write_u32(&mut data, CHUNK_OFFSET - 0x4, 0x84); // remaining size
    write_u32(&mut data, CHUNK_OFFSET + 0xC, 1); // version
    write_u32(&mut data, CHUNK_OFFSET + 0x10, 1); // file count
    write_u32(&mut data, CHUNK_OFFSET + 0x18, CHUNK_SIZE);

    // Name table: "root\0." then "file.txt\0." and zero padding.
    let names = CHUNK_OFFSET + 0x1C;
    data[names..names + 4].copy_from_slice(b"root");
    data[names + 6..names + 14].copy_from_slice(b"file.txt");

    // Metadata records for sequence ids 1 and 2.
    let metadata = CHUNK_OFFSET + 0x1C + CHUNK_SIZE as usize;
    write_u32(&mut data, metadata + 0xC + 0x4, 0); // root name offset
    write_u16(&mut data, metadata + 0xC + 0x8, 0); // root parent
    write_u32(&mut data, metadata + 0x18 + 0x4, 6); // file.txt name offset
    write_u16(&mut data, metadata + 0x18 + 0x8, 1); // file.txt parent

    // Location table header plus the record for file.txt.
    let location_base = metadata + 0x10 + 0xC * 2;
    write_u32(&mut data, location_base, 0x2); // type tag
    write_u32(&mut data, location_base + 0x4, 1); // file count again
    let record = location_base + 0x8;
    write_u32(&mut data, record + 0x4, PAYLOAD_ADDR as u32);
    write_u32(&mut data, record + 0x8, compressed_size);
    write_u32(&mut data, record + 0xC, raw_size);

    // One hash slot per tree entry.
    let hashes = record + 0x10;
    write_u32(&mut data, hashes, NO_HASH);
    write_u32(&mut data, hashes + 0x4, path_hash("root/file.txt"));

    data
}

#[test]
fn test_end_to_end_stored_payload() {
    let payload = b"hello dat archive";
    let data = build_archive(payload, payload.len() as u32, payload.len() as u32);

    let archive = DatArchive::parse(ArchiveBuffer::new(data)).unwrap();

    // The decoy signature at 0x90 must not win.
    assert_eq!(archive.header().offset, CHUNK_OFFSET);
    assert_eq!(archive.header().file_count, 1);
    assert_eq!(archive.header().chunk_size, CHUNK_SIZE);

    let entries = archive.entries();
    assert_eq!(entries.len(), 2);
    assert!(entries[0].is_dir);
    assert_eq!(entries[0].path, "root");
    assert!(!entries[1].is_dir);
    assert_eq!(entries[1].path, "root/file.txt");

    assert!(archive.misses().is_empty());
    assert_eq!(archive.resolved().len(), 1);
    let file = &archive.resolved()[0];
    assert_eq!(file.entry_index, 1);
    assert_eq!(file.slot, 1);
    assert_eq!(file.location.data_addr, PAYLOAD_ADDR as u32);
    assert!(!file.location.is_compressed());

    assert_eq!(archive.read_payload(file).unwrap(), payload);

    let registry = CodecRegistry::with_default_codecs();
    assert_eq!(archive.extract(file, &registry).unwrap(), payload);
}

#[test]
fn test_end_to_end_zipx_payload() {
    let original = b"level data level data level data";
    let mut payload = b"ZIPX".to_vec();
    payload.extend_from_slice(&deflate(original));
    let data = build_archive(&payload, payload.len() as u32, original.len() as u32);

    let archive = DatArchive::parse(ArchiveBuffer::new(data)).unwrap();
    let file = &archive.resolved()[0];
    assert!(file.location.is_compressed());

    let registry = CodecRegistry::with_default_codecs();
    assert_eq!(archive.extract(file, &registry).unwrap(), original);
}

#[test]
fn test_end_to_end_lz2k_payload() {
    // Literal 'A' then a distance-1 back-reference of length 7.
    let mut payload = b"LZ2K".to_vec();
    payload.extend_from_slice(&8u32.to_be_bytes());
    payload.extend_from_slice(&4u32.to_be_bytes());
    payload.extend_from_slice(&[0x01, b'A', 0x00, 0x04]);
    let data = build_archive(&payload, payload.len() as u32, 8);

    let archive = DatArchive::parse(ArchiveBuffer::new(data)).unwrap();
    let file = &archive.resolved()[0];

    let registry = CodecRegistry::with_default_codecs();
    assert_eq!(archive.extract(file, &registry).unwrap(), b"AAAAAAAA");
}

#[test]
fn test_unknown_codec_signature_is_recoverable() {
    let payload = b"ABCDmystery bytes";
    let data = build_archive(payload, payload.len() as u32, 1000);

    let archive = DatArchive::parse(ArchiveBuffer::new(data)).unwrap();
    let file = &archive.resolved()[0];

    let registry = CodecRegistry::with_default_codecs();
    let result = archive.extract(file, &registry);
    assert!(matches!(
        result,
        Err(Error::Codec(CodecError::UnknownFormat(sig))) if &sig == b"ABCD"
    ));

    // The archive stays usable and the raw bytes are still readable.
    assert_eq!(archive.read_payload(file).unwrap(), payload);
}

#[test]
fn test_compressed_payload_shorter_than_signature() {
    let data = build_archive(b"ZI", 2, 10);

    let archive = DatArchive::parse(ArchiveBuffer::new(data)).unwrap();
    let file = &archive.resolved()[0];

    let registry = CodecRegistry::with_default_codecs();
    let result = archive.extract(file, &registry);
    assert!(matches!(
        result,
        Err(Error::Codec(CodecError::Truncated { .. }))
    ));
}

#[test]
fn test_payload_reaching_past_buffer_end() {
    let mut data = build_archive(b"x", 1, 1);
    let record = record_offset();
    write_u32(&mut data, record + 0x4, 0x1F8);
    write_u32(&mut data, record + 0x8, 0x10);
    write_u32(&mut data, record + 0xC, 0x10);

    let archive = DatArchive::parse(ArchiveBuffer::new(data)).unwrap();
    let file = &archive.resolved()[0];

    assert!(matches!(
        archive.read_payload(file),
        Err(Error::OutOfBounds { .. })
    ));

    let registry = CodecRegistry::with_default_codecs();
    assert!(matches!(
        archive.extract(file, &registry),
        Err(Error::OutOfBounds { .. })
    ));
}

#[test]
fn test_foreign_hash_becomes_miss() {
    let payload = b"hello dat archive";
    let mut data = build_archive(payload, payload.len() as u32, payload.len() as u32);
    write_u32(&mut data, hash_table_offset() + 0x4, 0x12345678);

    let archive = DatArchive::parse(ArchiveBuffer::new(data)).unwrap();

    assert!(archive.resolved().is_empty());
    assert_eq!(archive.misses().len(), 1);
    assert_eq!(archive.misses()[0].path, "root/file.txt");
    assert_eq!(archive.misses()[0].hash, path_hash("root/file.txt"));
}

#[test]
fn test_signature_too_close_to_start() {
    let mut data = vec![0u8; 0x40];
    data[2..10].copy_from_slice(b".CC40TAD");

    let result = DatArchive::parse(ArchiveBuffer::new(data));
    assert!(matches!(
        result,
        Err(Error::InvalidChunkOffset { offset: 2, .. })
    ));
}

#[test]
fn test_archive_without_signature() {
    let result = DatArchive::parse(ArchiveBuffer::new(vec![0u8; 0x80]));
    assert!(matches!(result, Err(Error::SignatureNotFound(_))));
}

#[test]
fn test_open_from_file() {
    let payload = b"hello dat archive";
    let data = build_archive(payload, payload.len() as u32, payload.len() as u32);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("game.dat");
    std::fs::write(&path, &data).unwrap();

    let archive = DatArchive::open(&path).unwrap();
    assert_eq!(archive.entries().len(), 2);
    assert_eq!(archive.magic_header().unwrap(), "44415401000000");
}
