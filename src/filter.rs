use std::io::Write;

use flate2::write::DeflateEncoder;
use flate2::Compression;

use crate::error::ArchiveError;
use crate::sink::ByteSink;

/// Compression method selected when an entry is opened. The on-wire
/// values (0, 8) live in [`crate::constants`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Store,
    Deflate,
}

impl CompressionMethod {
    pub(crate) fn wire_value(self) -> u16 {
        match self {
            CompressionMethod::Store => crate::constants::METHOD_STORE,
            CompressionMethod::Deflate => crate::constants::METHOD_DEFLATE,
        }
    }
}

/// Adapts a `&mut dyn ByteSink` to `std::io::Write` so `flate2`'s
/// encoder can write through it, and counts every byte that actually
/// reaches the sink.
pub(crate) struct SinkCounter<'a> {
    sink: &'a mut dyn ByteSink,
    bytes_forwarded: u64,
}

impl<'a> SinkCounter<'a> {
    fn new(sink: &'a mut dyn ByteSink) -> Self {
        Self {
            sink,
            bytes_forwarded: 0,
        }
    }

    fn take_count(&mut self) -> u64 {
        let count = self.bytes_forwarded;
        self.bytes_forwarded = 0;
        count
    }
}

impl<'a> Write for SinkCounter<'a> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.sink
            .write(buf)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        self.bytes_forwarded += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// The active filter for one open entry.
pub(crate) enum Filter<'a> {
    Store(SinkCounter<'a>),
    Deflate(DeflateEncoder<SinkCounter<'a>>),
}

impl<'a> Filter<'a> {
    pub fn new(method: CompressionMethod, sink: &'a mut dyn ByteSink) -> Self {
        match method {
            CompressionMethod::Store => Filter::Store(SinkCounter::new(sink)),
            CompressionMethod::Deflate => {
                Filter::Deflate(DeflateEncoder::new(SinkCounter::new(sink), Compression::default()))
            }
        }
    }

    /// Push `bytes` through the filter, returning the number of
    /// compressed bytes it forwarded to the sink during this call.
    pub fn write(&mut self, bytes: &[u8]) -> Result<u64, ArchiveError> {
        match self {
            Filter::Store(counter) => {
                counter.write_all(bytes).map_err(ArchiveError::Sink)?;
                Ok(counter.take_count())
            }
            Filter::Deflate(encoder) => {
                encoder.write_all(bytes).map_err(ArchiveError::Deflate)?;
                Ok(encoder.get_mut().take_count())
            }
        }
    }

    /// Finish the filter, forwarding any trailing output, and return
    /// the number of bytes emitted during this call together with the
    /// reclaimed sink adapter, so the caller can write a few more raw
    /// bytes (the data descriptor) without re-borrowing the sink.
    pub fn close(self) -> Result<(u64, SinkCounter<'a>), ArchiveError> {
        match self {
            Filter::Store(mut counter) => {
                let tail = counter.take_count();
                Ok((tail, counter))
            }
            Filter::Deflate(encoder) => {
                let mut counter = encoder.finish().map_err(ArchiveError::Deflate)?;
                let tail = counter.take_count();
                Ok((tail, counter))
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sink::{ByteSink, MemorySink};

    fn opened_memory_sink() -> MemorySink {
        let mut sink = MemorySink::new();
        sink.open().unwrap();
        sink
    }

    #[test]
    fn store_forwards_bytes_unchanged_and_reports_length() {
        let mut sink = opened_memory_sink();
        {
            let mut filter = Filter::new(CompressionMethod::Store, &mut sink);
            let forwarded = filter.write(b"hello world").unwrap();
            assert_eq!(forwarded, 11);
            let (tail, _counter) = filter.close().unwrap();
            assert_eq!(tail, 0);
        }
        assert_eq!(sink.into_inner(), b"hello world");
    }

    #[test]
    fn deflate_round_trips_through_flate2() {
        let mut sink = opened_memory_sink();
        let payload = b"the quick brown fox jumps over the lazy dog ".repeat(20);
        let mut total = 0u64;
        {
            let mut filter = Filter::new(CompressionMethod::Deflate, &mut sink);
            total += filter.write(&payload).unwrap();
            let (tail, _counter) = filter.close().unwrap();
            total += tail;
        }
        let compressed = sink.into_inner();
        assert_eq!(compressed.len() as u64, total);

        let mut decoder = flate2::read::DeflateDecoder::new(&compressed[..]);
        let mut decompressed = Vec::new();
        std::io::Read::read_to_end(&mut decoder, &mut decompressed).unwrap();
        assert_eq!(decompressed, payload);
    }

    #[test]
    fn wire_values_match_the_format() {
        assert_eq!(CompressionMethod::Store.wire_value(), 0);
        assert_eq!(CompressionMethod::Deflate.wire_value(), 8);
    }
}
