use zipflow::sink::FileSink;
use zipflow::{Archive, ArchiveOptions, CompressionMethod, FileOptions};

fn main() -> Result<(), zipflow::ArchiveError> {
    let mut archive = Archive::new(
        "archive.zip",
        FileSink::new(),
        ArchiveOptions::new().method(CompressionMethod::Deflate),
    )?;

    archive.add_file("file1.txt", b"hello\n", FileOptions::new())?;
    archive.add_file(
        "file2.txt",
        b"world\n",
        FileOptions::new().method(CompressionMethod::Store),
    )?;

    archive.close()?;
    Ok(())
}
