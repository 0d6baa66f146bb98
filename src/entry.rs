//! The per-member state machine: local header, then streamed payload,
//! then data descriptor. An [`Entry`] exists only for the duration of
//! one member write; once its payload is flushed it consumes itself
//! and hands back a [`FinalizedEntry`] for the central directory pass.

use crate::constants::*;
use crate::crc::Crc32;
use crate::descriptor::ArchiveDescriptor;
use crate::error::ArchiveError;
use crate::filter::{CompressionMethod, Filter};
use crate::sink::ByteSink;
use crate::{datetime, path};

/// Per-entry overrides accepted by `Archive::add` and its convenience
/// wrappers. Any field left unset falls back to the archive-wide
/// default.
#[derive(Debug, Clone, Default)]
pub struct FileOptions {
    pub(crate) method: Option<CompressionMethod>,
    pub(crate) time: Option<i64>,
    pub(crate) comment: Vec<u8>,
}

impl FileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: CompressionMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn time(mut self, unix_timestamp: i64) -> Self {
        self.time = Some(unix_timestamp);
        self
    }

    pub fn comment(mut self, comment: impl Into<Vec<u8>>) -> Self {
        self.comment = comment.into();
        self
    }
}

/// A member whose header, payload and footer have all reached the
/// sink. Carries everything `Archive::close` needs to emit its
/// central directory record.
#[derive(Debug, Clone)]
pub(crate) struct FinalizedEntry {
    pub path: String,
    pub comment: Vec<u8>,
    pub method: CompressionMethod,
    pub dos_date: u16,
    pub dos_time: u16,
    pub uncompressed_size: u64,
    pub compressed_size: u64,
    pub crc32: u32,
    pub local_header_offset: u64,
}

/// An open member, mid-write. Exists only for the duration of one
/// `Archive::add` call.
pub(crate) struct Entry<'a> {
    path: String,
    comment: Vec<u8>,
    method: CompressionMethod,
    dos_date: u16,
    dos_time: u16,
    local_header_offset: u64,
    crc: Crc32,
    uncompressed_size: u64,
    compressed_size: u64,
    filter: Filter<'a>,
}

impl<'a> Entry<'a> {
    /// Validates the path and comment, writes the local file header to
    /// `sink`, and returns the open entry plus the number of header
    /// bytes written.
    pub fn open(
        sink: &'a mut dyn ByteSink,
        offset: u64,
        archive_path: String,
        method: CompressionMethod,
        timestamp: i64,
        comment: Vec<u8>,
    ) -> Result<(Self, u64), ArchiveError> {
        path::validate(&archive_path)?;
        if comment.len() as u64 >= MAX_FIELD_LEN {
            return Err(ArchiveError::Comment);
        }

        let (dos_date, dos_time) = datetime::to_dos_date_time(timestamp);
        let header = build_local_header(&archive_path, method, dos_date, dos_time);
        let header_len = header.len() as u64;
        sink.write(&header)?;

        let entry = Entry {
            path: archive_path,
            comment,
            method,
            dos_date,
            dos_time,
            local_header_offset: offset,
            crc: Crc32::new(),
            uncompressed_size: 0,
            compressed_size: 0,
            filter: Filter::new(method, sink),
        };
        Ok((entry, header_len))
    }

    /// Hashes and forwards `bytes` through the filter.
    pub fn write(&mut self, bytes: &[u8]) -> Result<(), ArchiveError> {
        self.crc.update(bytes);
        self.uncompressed_size += bytes.len() as u64;
        self.compressed_size += self.filter.write(bytes)?;
        Ok(())
    }

    /// Flushes the filter, finalizes the CRC, emits the data
    /// descriptor, and returns the finalized record plus the number of
    /// footer bytes written.
    pub fn close(mut self) -> Result<(FinalizedEntry, u64), ArchiveError> {
        let (tail, mut counter) = self.filter.close()?;
        self.compressed_size += tail;
        let crc32 = self.crc.finalize();

        let mut descriptor = ArchiveDescriptor::new(DATA_DESCRIPTOR_SIZE);
        descriptor.write_u32(DATA_DESCRIPTOR_SIGNATURE);
        descriptor.write_u32(crc32);
        descriptor.write_u64(self.compressed_size);
        descriptor.write_u64(self.uncompressed_size);
        let footer = descriptor.into_bytes();
        let footer_len = footer.len() as u64;
        std::io::Write::write_all(&mut counter, &footer).map_err(ArchiveError::Sink)?;

        let finalized = FinalizedEntry {
            path: self.path,
            comment: self.comment,
            method: self.method,
            dos_date: self.dos_date,
            dos_time: self.dos_time,
            uncompressed_size: self.uncompressed_size,
            compressed_size: self.compressed_size,
            crc32,
            local_header_offset: self.local_header_offset,
        };
        Ok((finalized, footer_len))
    }
}

fn build_local_header(archive_path: &str, method: CompressionMethod, dos_date: u16, dos_time: u16) -> Vec<u8> {
    let name = archive_path.as_bytes();
    let mut descriptor = ArchiveDescriptor::new(LOCAL_FILE_HEADER_FIXED_SIZE + name.len() as u64 + ZIP64_LOCAL_PLACEHOLDER_EXTRA_SIZE);

    descriptor.write_u32(LOCAL_FILE_HEADER_SIGNATURE);
    descriptor.write_u16(VERSION_NEEDED_TO_EXTRACT);
    descriptor.write_u16(GENERAL_PURPOSE_FLAG);
    descriptor.write_u16(method.wire_value());
    descriptor.write_u16(dos_time);
    descriptor.write_u16(dos_date);
    descriptor.write_u32(0); // crc-32, deferred to the data descriptor
    descriptor.write_u32(0); // compressed size, deferred
    descriptor.write_u32(0); // uncompressed size, deferred
    descriptor.write_u16(name.len() as u16);
    descriptor.write_u16(ZIP64_LOCAL_PLACEHOLDER_EXTRA_SIZE as u16);
    descriptor.write_bytes(name);
    descriptor.write_u16(ZIP64_EXTRA_TAG);
    descriptor.write_u16(0); // zip64 extra body length

    descriptor.into_bytes()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sink::MemorySink;

    fn opened_sink() -> MemorySink {
        let mut sink = MemorySink::new();
        crate::sink::ByteSink::open(&mut sink).unwrap();
        sink
    }

    #[test]
    fn local_header_matches_layout() {
        let header = build_local_header("a.txt", CompressionMethod::Store, 0x4321, 0x8765);
        assert_eq!(&header[0..4], &LOCAL_FILE_HEADER_SIGNATURE.to_le_bytes());
        assert_eq!(u16::from_le_bytes([header[4], header[5]]), VERSION_NEEDED_TO_EXTRACT);
        assert_eq!(u16::from_le_bytes([header[6], header[7]]), GENERAL_PURPOSE_FLAG);
        assert_eq!(u16::from_le_bytes([header[8], header[9]]), 0);
        assert_eq!(u16::from_le_bytes([header[10], header[11]]), 0x8765);
        assert_eq!(u16::from_le_bytes([header[12], header[13]]), 0x4321);
        assert_eq!(u32::from_le_bytes([header[14], header[15], header[16], header[17]]), 0);
        assert_eq!(u16::from_le_bytes([header[26], header[27]]), 5);
        assert_eq!(u16::from_le_bytes([header[28], header[29]]), 4);
        assert_eq!(&header[30..35], b"a.txt");
        assert_eq!(&header[35..37], &ZIP64_EXTRA_TAG.to_le_bytes());
        assert_eq!(&header[37..39], &[0, 0]);
        assert_eq!(header.len(), 39);
    }

    #[test]
    fn write_then_close_reports_sizes_and_crc() {
        let mut sink = opened_sink();
        let (mut entry, header_len) =
            Entry::open(&mut sink, 0, "x.bin".to_owned(), CompressionMethod::Store, 0, Vec::new()).unwrap();
        assert!(header_len > 0);

        entry.write(b"hello!").unwrap();
        let (finalized, footer_len) = entry.close().unwrap();

        assert_eq!(finalized.uncompressed_size, 6);
        assert_eq!(finalized.compressed_size, 6);
        assert_eq!(finalized.crc32, 0x54E1_C24B);
        assert_eq!(footer_len, DATA_DESCRIPTOR_SIZE);
    }

    #[test]
    fn rejects_invalid_path() {
        let mut sink = opened_sink();
        let result = Entry::open(&mut sink, 0, "/abs".to_owned(), CompressionMethod::Store, 0, Vec::new());
        assert!(matches!(result, Err(ArchiveError::Path(_))));
    }

    #[test]
    fn rejects_oversize_comment() {
        let mut sink = opened_sink();
        let comment = vec![b'x'; MAX_FIELD_LEN as usize];
        let result = Entry::open(&mut sink, 0, "a".to_owned(), CompressionMethod::Store, 0, comment);
        assert!(matches!(result, Err(ArchiveError::Comment)));
    }
}
