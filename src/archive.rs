//! The archive engine: constructs the sink, serializes member writes
//! through [`crate::entry::Entry`], and assembles the central directory
//! and Zip64 trailer at `close`. Every size, offset and entry count is
//! written in its 64-bit Zip64 form regardless of whether it needs the
//! extra width, so there is no late switch from 32-bit to 64-bit fields
//! partway through an archive.

use std::fs;
use std::io::Read;
use std::path::Path;

use log::{debug, trace};

use crate::constants::*;
use crate::descriptor::ArchiveDescriptor;
use crate::entry::{Entry, FileOptions, FinalizedEntry};
use crate::error::ArchiveError;
use crate::filter::CompressionMethod;
use crate::sink::{ByteSink, ResponseSink};
use crate::{datetime, path};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArchiveState {
    Init,
    EntryOpen,
    Closed,
    Error,
}

/// Archive-wide defaults, all overridable per entry.
pub struct ArchiveOptions {
    pub(crate) method: CompressionMethod,
    pub(crate) comment: Vec<u8>,
    pub(crate) time: Option<i64>,
    pub(crate) mime_type: String,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            method: CompressionMethod::Deflate,
            comment: Vec::new(),
            time: None,
            mime_type: "application/zip".to_owned(),
        }
    }
}

impl ArchiveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: CompressionMethod) -> Self {
        self.method = method;
        self
    }

    pub fn comment(mut self, comment: impl Into<Vec<u8>>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn time(mut self, unix_timestamp: i64) -> Self {
        self.time = Some(unix_timestamp);
        self
    }

    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }
}

/// The streaming archive writer. Generic over the sink it was
/// constructed with.
pub struct Archive<S: ByteSink> {
    sink: S,
    offset: u64,
    method: CompressionMethod,
    comment: Vec<u8>,
    default_time: Option<i64>,
    entries: Vec<FinalizedEntry>,
    paths_seen: std::collections::HashSet<String>,
    state: ArchiveState,
}

impl<S: ByteSink> Archive<S> {
    /// Sets the sink's advisory name/type metadata, opens it, and
    /// validates the archive-wide comment up front.
    pub fn new(name: &str, mut sink: S, options: ArchiveOptions) -> Result<Self, ArchiveError> {
        if options.comment.len() as u64 >= MAX_FIELD_LEN {
            return Err(ArchiveError::Comment);
        }

        sink.set("name", name);
        sink.set("type", &options.mime_type);
        sink.open()?;

        debug!("archive '{name}' opened, default method {:?}", options.method);

        Ok(Self {
            sink,
            offset: 0,
            method: options.method,
            comment: options.comment,
            default_time: options.time,
            entries: Vec::new(),
            paths_seen: std::collections::HashSet::new(),
            state: ArchiveState::Init,
        })
    }

    pub fn bytes_written(&self) -> u64 {
        self.offset
    }

    /// Surrenders the sink. Only meaningful once [`Archive::close`]
    /// has run; exposed for sinks whose finished payload the caller
    /// still wants to consume directly (e.g. [`crate::sink::MemorySink`]).
    pub fn into_sink(self) -> S {
        self.sink
    }

    fn fail(&mut self, err: ArchiveError) -> ArchiveError {
        self.state = ArchiveState::Error;
        err
    }

    /// The serializing primitive every other `add_*` method is built
    /// on. `writer_fn` streams bytes into the open entry via
    /// `entry.write`.
    pub fn add<F>(&mut self, archive_path: &str, options: FileOptions, writer_fn: F) -> Result<(), ArchiveError>
    where
        F: FnOnce(&mut Entry<'_>) -> Result<(), ArchiveError>,
    {
        if self.state != ArchiveState::Init {
            let err = ArchiveError::State(format!("add called while archive is {:?}", self.state));
            return Err(self.fail(err));
        }
        if let Err(e) = path::validate(archive_path) {
            return Err(self.fail(e));
        }
        if self.paths_seen.contains(archive_path) {
            let err = ArchiveError::State(format!("duplicate archive path: {archive_path:?}"));
            return Err(self.fail(err));
        }

        let method = options.method.unwrap_or(self.method);
        let timestamp = options
            .time
            .or(self.default_time)
            .unwrap_or_else(datetime::unix_now);

        self.state = ArchiveState::EntryOpen;

        let result = (|| {
            let (mut entry, header_len) = Entry::open(
                &mut self.sink,
                self.offset,
                archive_path.to_owned(),
                method,
                timestamp,
                options.comment.clone(),
            )?;
            self.offset += header_len;

            writer_fn(&mut entry)?;

            let (finalized, footer_len) = entry.close()?;
            self.offset += finalized.compressed_size + footer_len;
            trace!(
                "entry '{}' closed: {} -> {} bytes, crc {:08x}",
                finalized.path, finalized.uncompressed_size, finalized.compressed_size, finalized.crc32
            );
            Ok(finalized)
        })();

        match result {
            Ok(finalized) => {
                self.paths_seen.insert(archive_path.to_owned());
                self.entries.push(finalized);
                self.state = ArchiveState::Init;
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// One-shot write of an in-memory buffer.
    pub fn add_file(&mut self, archive_path: &str, bytes: &[u8], options: FileOptions) -> Result<(), ArchiveError> {
        self.add(archive_path, options, |entry| entry.write(bytes))
    }

    /// Streams `source` in fixed-size chunks until exhausted.
    pub fn add_stream<R: Read>(
        &mut self,
        archive_path: &str,
        mut source: R,
        options: FileOptions,
    ) -> Result<(), ArchiveError> {
        self.add(archive_path, options, move |entry| {
            let mut buf = vec![0u8; STREAM_CHUNK_SIZE];
            loop {
                let read = source.read(&mut buf).map_err(ArchiveError::Sink)?;
                if read == 0 {
                    break;
                }
                entry.write(&buf[..read])?;
            }
            Ok(())
        })
    }

    /// Opens `fs_path` for reading and delegates to [`Archive::add_stream`],
    /// deriving the timestamp from the file's modification time when
    /// the caller hasn't overridden it.
    pub fn add_file_from_path(
        &mut self,
        archive_path: &str,
        fs_path: impl AsRef<Path>,
        mut options: FileOptions,
    ) -> Result<(), ArchiveError> {
        let fs_path = fs_path.as_ref();
        let file = fs::File::open(fs_path).map_err(|e| ArchiveError::File(fs_path.to_owned(), e))?;

        if options.time.is_none() {
            if let Ok(metadata) = file.metadata() {
                if let Ok(modified) = metadata.modified() {
                    if let Ok(duration) = modified.duration_since(std::time::UNIX_EPOCH) {
                        options = options.time(duration.as_secs() as i64);
                    }
                }
            }
        }

        self.add_stream(archive_path, file, options)
    }

    /// Emits the central directory, the Zip64 trailer, and closes the
    /// sink. Returns the final archive size in bytes together with the
    /// sink, so callers of a sink like [`crate::sink::MemorySink`] can
    /// retrieve the finished bytes.
    pub fn close(mut self) -> Result<(u64, S), ArchiveError> {
        if self.state != ArchiveState::Init {
            let err = ArchiveError::State(format!("close called while archive is {:?}", self.state));
            return Err(self.fail(err));
        }

        let result = (|| {
            let cdr_pos = self.offset;
            for entry in &self.entries {
                let record = build_central_directory_entry(entry);
                self.offset += record.len() as u64;
                self.sink.write(&record)?;
            }
            let cdr_len = self.offset - cdr_pos;

            let zip64_eocd_pos = self.offset;
            let zip64_eocd = build_zip64_eocd(self.entries.len() as u64, cdr_len, cdr_pos);
            self.offset += zip64_eocd.len() as u64;
            self.sink.write(&zip64_eocd)?;

            let locator = build_zip64_eocd_locator(zip64_eocd_pos);
            self.offset += locator.len() as u64;
            self.sink.write(&locator)?;

            let eocd = build_end_of_central_directory(self.entries.len() as u64, cdr_len, cdr_pos, &self.comment);
            self.offset += eocd.len() as u64;
            self.sink.write(&eocd)?;

            self.sink.close()?;
            Ok(self.offset)
        })();

        match result {
            Ok(total) => {
                self.state = ArchiveState::Closed;
                debug!("archive closed: {} entries, {total} bytes", self.entries.len());
                Ok((total, self.sink))
            }
            Err(e) => Err(self.fail(e)),
        }
    }
}

impl Archive<ResponseSink> {
    /// Construct an archive over the default response sink, hand it to
    /// `writer_fn`, and close it in one call.
    pub fn send<F>(name: &str, options: ArchiveOptions, writer_fn: F) -> Result<u64, ArchiveError>
    where
        F: FnOnce(&mut Archive<ResponseSink>) -> Result<(), ArchiveError>,
    {
        let mut archive = Archive::new(name, ResponseSink::new(), options)?;
        writer_fn(&mut archive)?;
        let (total, _sink) = archive.close()?;
        Ok(total)
    }
}

/// The central directory record for one finalized entry, including the
/// Zip64 extra field when any of its three oversize-able fields
/// doesn't fit in 32 bits.
fn build_central_directory_entry(entry: &FinalizedEntry) -> Vec<u8> {
    let name = entry.path.as_bytes();

    let mut zip64_extra = Vec::new();
    if entry.uncompressed_size > u32::MAX as u64 {
        zip64_extra.extend_from_slice(&entry.uncompressed_size.to_le_bytes());
    }
    if entry.compressed_size > u32::MAX as u64 {
        zip64_extra.extend_from_slice(&entry.compressed_size.to_le_bytes());
    }
    if entry.local_header_offset > u32::MAX as u64 {
        zip64_extra.extend_from_slice(&entry.local_header_offset.to_le_bytes());
    }
    let extra_len = if zip64_extra.is_empty() {
        0
    } else {
        ZIP64_EXTRA_HEADER_SIZE + zip64_extra.len() as u64
    };

    let capacity = CENTRAL_DIRECTORY_ENTRY_FIXED_SIZE + name.len() as u64 + extra_len + entry.comment.len() as u64;
    let mut descriptor = ArchiveDescriptor::new(capacity);

    descriptor.write_u32(CENTRAL_DIRECTORY_ENTRY_SIGNATURE);
    descriptor.write_u16(VERSION_MADE_BY);
    descriptor.write_u16(VERSION_NEEDED_TO_EXTRACT);
    descriptor.write_u16(GENERAL_PURPOSE_FLAG);
    descriptor.write_u16(entry.method.wire_value());
    descriptor.write_u16(entry.dos_time);
    descriptor.write_u16(entry.dos_date);
    descriptor.write_u32(entry.crc32);
    descriptor.write_u32(clamp_u32(entry.compressed_size));
    descriptor.write_u32(clamp_u32(entry.uncompressed_size));
    descriptor.write_u16(name.len() as u16);
    descriptor.write_u16(extra_len as u16);
    descriptor.write_u16(entry.comment.len() as u16);
    descriptor.write_u16(0); // disk number start
    descriptor.write_u16(0); // internal attributes
    descriptor.write_u32(0); // external attributes
    descriptor.write_u32(clamp_u32(entry.local_header_offset));
    descriptor.write_bytes(name);
    if !zip64_extra.is_empty() {
        descriptor.write_u16(ZIP64_EXTRA_TAG);
        descriptor.write_u16(zip64_extra.len() as u16);
        descriptor.write_bytes(&zip64_extra);
    }
    descriptor.write_bytes(&entry.comment);

    descriptor.into_bytes()
}

fn clamp_u32(value: u64) -> u32 {
    if value > u32::MAX as u64 {
        ZIP64_MAGIC_U32
    } else {
        value as u32
    }
}

/// The Zip64 end-of-central-directory record.
fn build_zip64_eocd(total_entries: u64, cdr_len: u64, cdr_offset: u64) -> Vec<u8> {
    let mut descriptor = ArchiveDescriptor::new(ZIP64_EOCD_SIZE);
    descriptor.write_u32(ZIP64_END_OF_CENTRAL_DIR_SIGNATURE);
    descriptor.write_u64(ZIP64_EOCD_SIZE - 12);
    descriptor.write_u16(VERSION_MADE_BY);
    descriptor.write_u16(VERSION_NEEDED_TO_EXTRACT);
    descriptor.write_u32(0); // this disk
    descriptor.write_u32(0); // disk with start of CDR
    descriptor.write_u64(total_entries);
    descriptor.write_u64(total_entries);
    descriptor.write_u64(cdr_len);
    descriptor.write_u64(cdr_offset);
    descriptor.into_bytes()
}

/// The Zip64 end-of-central-directory locator.
fn build_zip64_eocd_locator(zip64_eocd_offset: u64) -> Vec<u8> {
    let mut descriptor = ArchiveDescriptor::new(ZIP64_EOCD_LOCATOR_SIZE);
    descriptor.write_u32(ZIP64_END_OF_CENTRAL_DIR_LOCATOR_SIGNATURE);
    descriptor.write_u32(0); // disk with the zip64 eocd
    descriptor.write_u64(zip64_eocd_offset);
    descriptor.write_u32(1); // total number of disks
    descriptor.into_bytes()
}

/// The classic end-of-central-directory record, with its 16/32-bit
/// counters clamped the way Zip64 archives require.
fn build_end_of_central_directory(total_entries: u64, cdr_len: u64, cdr_offset: u64, comment: &[u8]) -> Vec<u8> {
    let clamped_entries = if total_entries > 0xFFFF { 0xFFFF } else { total_entries as u16 };

    let mut descriptor = ArchiveDescriptor::new(EOCD_FIXED_SIZE + comment.len() as u64);
    descriptor.write_u32(END_OF_CENTRAL_DIRECTORY_SIGNATURE);
    descriptor.write_u16(0); // this disk
    descriptor.write_u16(0); // disk with start of CDR
    descriptor.write_u16(clamped_entries);
    descriptor.write_u16(clamped_entries);
    descriptor.write_u32(clamp_u32(cdr_len));
    descriptor.write_u32(clamp_u32(cdr_offset));
    descriptor.write_u16(comment.len() as u16);
    descriptor.write_bytes(comment);
    descriptor.into_bytes()
}
