#![allow(dead_code)]
//! Shared integration-test helpers: a scratch-directory fixture (for
//! `add_file_from_path`/`FileSink` tests) and a small Zip64 reader.
//!
//! The reader exists only here, never under `src/` — this crate is
//! write-only per its own design, so verifying round-trip integrity
//! (testable property #1 of the format this crate implements) needs a
//! reader built just for the test suite, grounded on the same
//! byte-exact layout the writer itself emits.

use std::io::Read;

use tempfile::TempDir;

pub fn scratch_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create a scratch directory")
}

#[derive(Debug, Clone)]
pub struct ReadEntry {
    pub name: String,
    pub comment: Vec<u8>,
    pub method: u16,
    pub crc32: u32,
    pub uncompressed_size: u64,
    pub compressed_size: u64,
    pub local_header_offset: u64,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ReadArchive {
    pub comment: Vec<u8>,
    pub entries: Vec<ReadEntry>,
}

const EOCD_SIGNATURE: u32 = 0x0605_4b50;
const ZIP64_EOCD_SIGNATURE: u32 = 0x0606_4b50;
const ZIP64_LOCATOR_SIGNATURE: u32 = 0x0706_4b50;
const CDR_SIGNATURE: u32 = 0x0201_4b50;
const LOCAL_HEADER_SIGNATURE: u32 = 0x0403_4b50;

fn u16_at(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes(buf[offset..offset + 2].try_into().unwrap())
}

fn u32_at(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(buf[offset..offset + 4].try_into().unwrap())
}

fn u64_at(buf: &[u8], offset: usize) -> u64 {
    u64::from_le_bytes(buf[offset..offset + 8].try_into().unwrap())
}

/// Finds the end-of-central-directory record by scanning backward, the
/// way any conformant reader must (the comment that precedes it is
/// variable-length).
fn find_eocd(buf: &[u8]) -> usize {
    let window_start = buf.len().saturating_sub(22 + 0xFFFF);
    for start in (window_start..=buf.len() - 22).rev() {
        if u32_at(buf, start) == EOCD_SIGNATURE {
            return start;
        }
    }
    panic!("no end-of-central-directory record found");
}

pub fn read_archive(buf: &[u8]) -> ReadArchive {
    let eocd_pos = find_eocd(buf);
    let comment_len = u16_at(buf, eocd_pos + 20) as usize;
    let comment = buf[eocd_pos + 22..eocd_pos + 22 + comment_len].to_vec();

    let locator_pos = eocd_pos - 20;
    assert_eq!(u32_at(buf, locator_pos), ZIP64_LOCATOR_SIGNATURE, "missing zip64 locator");
    let zip64_eocd_pos = u64_at(buf, locator_pos + 8) as usize;

    assert_eq!(u32_at(buf, zip64_eocd_pos), ZIP64_EOCD_SIGNATURE, "missing zip64 eocd record");
    let total_entries = u64_at(buf, zip64_eocd_pos + 32) as usize;
    let cdr_offset = u64_at(buf, zip64_eocd_pos + 48) as usize;

    let mut entries = Vec::with_capacity(total_entries);
    let mut pos = cdr_offset;
    for _ in 0..total_entries {
        assert_eq!(u32_at(buf, pos), CDR_SIGNATURE, "malformed central directory entry");

        let method = u16_at(buf, pos + 10);
        let crc32 = u32_at(buf, pos + 16);
        let mut compressed_size = u32_at(buf, pos + 20) as u64;
        let mut uncompressed_size = u32_at(buf, pos + 24) as u64;
        let name_len = u16_at(buf, pos + 28) as usize;
        let extra_len = u16_at(buf, pos + 30) as usize;
        let comment_len = u16_at(buf, pos + 32) as usize;
        let mut local_header_offset = u32_at(buf, pos + 42) as u64;

        let name = String::from_utf8(buf[pos + 46..pos + 46 + name_len].to_vec()).unwrap();
        let extra = &buf[pos + 46 + name_len..pos + 46 + name_len + extra_len];
        let entry_comment = buf[pos + 46 + name_len + extra_len..pos + 46 + name_len + extra_len + comment_len].to_vec();

        if !extra.is_empty() {
            assert_eq!(u16_at(extra, 0), 0x0001, "unexpected extra field tag");
            let mut cursor = 4;
            if uncompressed_size == u32::MAX as u64 {
                uncompressed_size = u64_at(extra, cursor);
                cursor += 8;
            }
            if compressed_size == u32::MAX as u64 {
                compressed_size = u64_at(extra, cursor);
                cursor += 8;
            }
            if local_header_offset == u32::MAX as u64 {
                local_header_offset = u64_at(extra, cursor);
            }
        }

        let data = read_payload(buf, local_header_offset as usize, method, compressed_size as usize);

        entries.push(ReadEntry {
            name,
            comment: entry_comment,
            method,
            crc32,
            uncompressed_size,
            compressed_size,
            local_header_offset,
            data,
        });

        pos += 46 + name_len + extra_len + comment_len;
    }

    ReadArchive { comment, entries }
}

fn read_payload(buf: &[u8], local_header_offset: usize, method: u16, compressed_size: usize) -> Vec<u8> {
    assert_eq!(u32_at(buf, local_header_offset), LOCAL_HEADER_SIGNATURE, "malformed local header");
    let name_len = u16_at(buf, local_header_offset + 26) as usize;
    let extra_len = u16_at(buf, local_header_offset + 28) as usize;
    let data_start = local_header_offset + 30 + name_len + extra_len;
    let compressed = &buf[data_start..data_start + compressed_size];

    match method {
        0 => compressed.to_vec(),
        8 => {
            let mut decoder = flate2::read::DeflateDecoder::new(compressed);
            let mut out = Vec::new();
            decoder.read_to_end(&mut out).unwrap();
            out
        }
        other => panic!("unsupported method in test reader: {other}"),
    }
}
