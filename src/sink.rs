//! The byte sink abstraction the archive engine writes through, plus
//! its built-in implementations.

use crate::error::ArchiveError;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

/// Forward-only byte sink. The engine never seeks; every write is
/// all-or-nothing from the caller's perspective (a sink that can only
/// perform partial writes must retry internally or surface a
/// [`ArchiveError::Sink`]).
pub trait ByteSink {
    /// Advisory metadata (`"name"`, `"type"`, ...). A sink may use it
    /// or ignore it entirely.
    fn set(&mut self, key: &str, value: &str);

    /// Prepare to accept bytes. Called exactly once, before any
    /// `write`.
    fn open(&mut self) -> Result<(), ArchiveError>;

    /// Append bytes.
    fn write(&mut self, bytes: &[u8]) -> Result<(), ArchiveError>;

    /// Flush and release. Idempotent once closed.
    fn close(&mut self) -> Result<(), ArchiveError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SinkState {
    Init,
    Open,
    Closed,
}

/// An in-memory sink backed by a growable buffer. The default choice
/// for tests and for callers who want the finished archive as a
/// `Vec<u8>` rather than streamed incrementally.
#[derive(Debug, Default)]
pub struct MemorySink {
    buffer: Vec<u8>,
    state: SinkState,
}

impl Default for SinkState {
    fn default() -> Self {
        SinkState::Init
    }
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the sink, returning everything written to it.
    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}

impl ByteSink for MemorySink {
    fn set(&mut self, _key: &str, _value: &str) {}

    fn open(&mut self) -> Result<(), ArchiveError> {
        self.state = SinkState::Open;
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), ArchiveError> {
        if self.state != SinkState::Open {
            return Err(ArchiveError::State("write on a sink that is not open".into()));
        }
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    fn close(&mut self) -> Result<(), ArchiveError> {
        match self.state {
            SinkState::Open | SinkState::Closed => {
                self.state = SinkState::Closed;
                Ok(())
            }
            SinkState::Init => Err(ArchiveError::State("close before open".into())),
        }
    }
}

/// Writes the archive to a filesystem path, creating or truncating it
/// on `open`. The path is supplied as sink metadata (`set("name",
/// path)`).
#[derive(Debug, Default)]
pub struct FileSink {
    path: Option<PathBuf>,
    file: Option<File>,
    state: SinkState,
}

impl FileSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ByteSink for FileSink {
    fn set(&mut self, key: &str, value: &str) {
        if key == "name" {
            self.path = Some(PathBuf::from(value));
        }
    }

    fn open(&mut self) -> Result<(), ArchiveError> {
        let path = self
            .path
            .clone()
            .ok_or_else(|| ArchiveError::State("FileSink has no path; call set(\"name\", ..)".into()))?;
        let file = File::create(&path).map_err(|e| ArchiveError::File(path, e))?;
        self.file = Some(file);
        self.state = SinkState::Open;
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), ArchiveError> {
        if self.state != SinkState::Open {
            return Err(ArchiveError::State("write on a sink that is not open".into()));
        }
        self.file
            .as_mut()
            .expect("FileSink opened without a file")
            .write_all(bytes)
            .map_err(ArchiveError::Sink)
    }

    fn close(&mut self) -> Result<(), ArchiveError> {
        match self.state {
            SinkState::Open => {
                if let Some(file) = self.file.as_mut() {
                    file.flush().map_err(ArchiveError::Sink)?;
                }
                self.state = SinkState::Closed;
                Ok(())
            }
            SinkState::Closed => Ok(()),
            SinkState::Init => Err(ArchiveError::State("close before open".into())),
        }
    }
}

/// Wraps a caller-supplied writer. Ignores all metadata and never
/// closes the underlying stream on `close` (only flushes it); the
/// caller owns the stream's lifetime.
#[derive(Debug)]
pub struct StreamSink<W: Write> {
    writer: W,
    state: SinkState,
}

impl<W: Write> StreamSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            state: SinkState::Init,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ByteSink for StreamSink<W> {
    fn set(&mut self, _key: &str, _value: &str) {}

    fn open(&mut self) -> Result<(), ArchiveError> {
        self.state = SinkState::Open;
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), ArchiveError> {
        if self.state != SinkState::Open {
            return Err(ArchiveError::State("write on a sink that is not open".into()));
        }
        self.writer.write_all(bytes).map_err(ArchiveError::Sink)
    }

    fn close(&mut self) -> Result<(), ArchiveError> {
        match self.state {
            SinkState::Open | SinkState::Closed => {
                self.writer.flush().map_err(ArchiveError::Sink)?;
                self.state = SinkState::Closed;
                Ok(())
            }
            SinkState::Init => Err(ArchiveError::State("close before open".into())),
        }
    }
}

/// Streams the archive body to the process's standard response
/// channel (stdout, by default), while tracking the headers a real
/// HTTP layer would attach: `Content-Type`, an RFC 6266
/// `Content-Disposition` (both the UTF-8 and ASCII-sanitized filename
/// forms), and a couple of caching/transfer headers appropriate to a
/// generated, non-cacheable stream. A host application wiring this
/// into an actual HTTP response reads `headers()` and copies them onto
/// its own response before streaming the body through.
#[derive(Debug)]
pub struct ResponseSink<W: Write = io::Stdout> {
    writer: W,
    name: String,
    content_type: String,
    state: SinkState,
}

impl ResponseSink<io::Stdout> {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl Default for ResponseSink<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> ResponseSink<W> {
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            name: "archive.zip".to_owned(),
            content_type: "application/zip".to_owned(),
            state: SinkState::Init,
        }
    }

    /// The response headers a host application should attach before
    /// streaming this sink's body.
    pub fn headers(&self) -> Vec<(String, String)> {
        vec![
            ("Content-Type".to_owned(), self.content_type.clone()),
            (
                "Content-Disposition".to_owned(),
                content_disposition(&self.name),
            ),
            ("Cache-Control".to_owned(), "no-store".to_owned()),
            ("Transfer-Encoding".to_owned(), "chunked".to_owned()),
        ]
    }
}

impl<W: Write> ByteSink for ResponseSink<W> {
    fn set(&mut self, key: &str, value: &str) {
        match key {
            "name" => self.name = value.to_owned(),
            "type" => self.content_type = value.to_owned(),
            _ => {}
        }
    }

    fn open(&mut self) -> Result<(), ArchiveError> {
        self.state = SinkState::Open;
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), ArchiveError> {
        if self.state != SinkState::Open {
            return Err(ArchiveError::State("write on a sink that is not open".into()));
        }
        self.writer.write_all(bytes).map_err(ArchiveError::Sink)
    }

    fn close(&mut self) -> Result<(), ArchiveError> {
        match self.state {
            SinkState::Open | SinkState::Closed => {
                self.writer.flush().map_err(ArchiveError::Sink)?;
                self.state = SinkState::Closed;
                Ok(())
            }
            SinkState::Init => Err(ArchiveError::State("close before open".into())),
        }
    }
}

/// Builds an RFC 6266 `Content-Disposition` value carrying both an
/// ASCII-sanitized `filename` fallback and a UTF-8 `filename*` form.
fn content_disposition(name: &str) -> String {
    let ascii: String = name
        .chars()
        .map(|c| if c.is_ascii() && c != '"' { c } else { '_' })
        .collect();
    let encoded = percent_encode(name);
    format!("attachment; filename=\"{ascii}\"; filename*=UTF-8''{encoded}")
}

fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.as_bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(*byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
