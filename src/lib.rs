//! A streaming PKZIP archive writer.
//!
//! `zipflow` emits a well-formed archive to an arbitrary byte sink
//! without seeking, without buffering the whole archive in memory, and
//! without knowing member sizes ahead of time. Every archive is always
//! written in Zip64 form, so individual members and the archive as a
//! whole may exceed 4 GiB.
//!
//! ## Features
//!
//! - STORE and raw DEFLATE, selected per archive or per member.
//! - CRC-32 and sizes are computed while streaming and emitted in a
//!   trailing data descriptor, so no pre-scan of the input is needed.
//! - Always Zip64: no 4 GiB ceiling on member or archive size.
//! - Archive size pre-calculation via [`archive_size`], useful for
//!   setting a `Content-Length` before streaming begins.
//! - Pluggable [`ByteSink`](sink::ByteSink): in-memory buffer,
//!   filesystem path, arbitrary [`std::io::Write`], or an HTTP
//!   response.
//!
//! ## Limitations
//!
//! - Write-only: there is no reader or extraction path in this crate.
//! - Flat archive paths only; no directory entries are synthesized.
//!
//! ## Example
//!
//! ```
//! use zipflow::{Archive, ArchiveOptions, FileOptions};
//! use zipflow::sink::MemorySink;
//!
//! let mut archive = Archive::new("demo.zip", MemorySink::new(), ArchiveOptions::new()).unwrap();
//! archive.add_file("hello.txt", b"hello\n", FileOptions::new()).unwrap();
//! let (_size, sink) = archive.close().unwrap();
//! let zip_bytes = sink.into_inner();
//! ```

mod archive;
mod constants;
mod crc;
mod datetime;
mod descriptor;
mod entry;
mod error;
mod filter;
mod path;
pub mod sink;
mod tools;

pub use archive::{Archive, ArchiveOptions};
pub use entry::FileOptions;
pub use error::ArchiveError;
pub use filter::CompressionMethod;
pub use sink::{ByteSink, FileSink, MemorySink, ResponseSink, StreamSink};
pub use tools::archive_size;
