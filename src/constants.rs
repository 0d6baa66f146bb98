pub const LOCAL_FILE_HEADER_SIGNATURE: u32 = 0x0403_4b50;
pub const DATA_DESCRIPTOR_SIGNATURE: u32 = 0x0807_4b50;
pub const CENTRAL_DIRECTORY_ENTRY_SIGNATURE: u32 = 0x0201_4b50;
pub const ZIP64_END_OF_CENTRAL_DIR_SIGNATURE: u32 = 0x0606_4b50;
pub const ZIP64_END_OF_CENTRAL_DIR_LOCATOR_SIGNATURE: u32 = 0x0706_4b50;
pub const END_OF_CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x0605_4b50;

pub const VERSION_NEEDED_TO_EXTRACT: u16 = 45; // zip64
pub const VERSION_MADE_BY: u16 = 45;

pub const GENERAL_PURPOSE_FLAG: u16 = 1 << 3 | 1 << 11; // bit 3: sizes in data descriptor, bit 11: utf-8

pub const ZIP64_EXTRA_TAG: u16 = 0x0001;

pub const METHOD_STORE: u16 = 0;
pub const METHOD_DEFLATE: u16 = 8;

// signature(4) + version(2) + flags(2) + method(2) + time(2) + date(2)
// + crc(4) + csize(4) + usize(4) + name_len(2) + extra_len(2)
pub const LOCAL_FILE_HEADER_FIXED_SIZE: u64 = 30;

// tag(2) + body_length(2), body_length always 0
pub const ZIP64_LOCAL_PLACEHOLDER_EXTRA_SIZE: u64 = 4;

// signature(4) + crc(4) + csize(8) + usize(8)
pub const DATA_DESCRIPTOR_SIZE: u64 = 24;

pub const CENTRAL_DIRECTORY_ENTRY_FIXED_SIZE: u64 = 46;

// tag(2) + body_length(2), not counting the 8-byte words themselves
pub const ZIP64_EXTRA_HEADER_SIZE: u64 = 4;

pub const ZIP64_EOCD_SIZE: u64 = 56;
pub const ZIP64_EOCD_LOCATOR_SIZE: u64 = 20;
pub const EOCD_FIXED_SIZE: u64 = 22;

pub const MAX_FIELD_LEN: u64 = 0xFFFF;
pub const ZIP64_MAGIC_U32: u32 = 0xFFFF_FFFF;

pub const STREAM_CHUNK_SIZE: usize = 8192;
