//! Stands in for the teacher crate's `hyper.rs`/`actix.rs` examples.
//! This build has no hard dependency on a web framework (see
//! DESIGN.md's dropped-dependency note), so instead of binding a
//! server this demo shows what a host application's request handler
//! would do: build the archive over a `ResponseSink`, then copy
//! `headers()` onto its own response type before streaming the body.

use zipflow::sink::ResponseSink;
use zipflow::{Archive, ArchiveOptions, ByteSink, CompressionMethod, FileOptions};

fn main() -> Result<(), zipflow::ArchiveError> {
    let mut sink = ResponseSink::with_writer(std::io::stdout());
    sink.set("name", "myzip.zip");
    sink.set("type", "application/zip");

    // A real handler would read these before the body starts streaming
    // and attach them to its own response type.
    for (key, value) in sink.headers() {
        eprintln!("{key}: {value}");
    }

    let mut archive = Archive::new(
        "myzip.zip",
        sink,
        ArchiveOptions::new().method(CompressionMethod::Deflate),
    )?;

    archive.add_file("file1.txt", b"hello\n", FileOptions::new())?;
    archive.add_file("file2.txt", b"world\n", FileOptions::new())?;

    archive.close()?;
    Ok(())
}
