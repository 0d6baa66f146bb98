use std::fmt::{self, Debug, Display};
use std::path::PathBuf;

pub enum ArchiveError {
    Path(String),
    Comment,
    Deflate(std::io::Error),
    File(PathBuf, std::io::Error),
    Sink(std::io::Error),
    State(String),
}

impl Display for ArchiveError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ArchiveError::Path(path) => write!(f, "invalid archive path: {path:?}"),
            ArchiveError::Comment => write!(f, "comment is too long (must be < 0xFFFF bytes)"),
            ArchiveError::Deflate(e) => write!(f, "deflate error: {e}"),
            ArchiveError::File(path, e) => write!(f, "file error on {path:?}: {e}"),
            ArchiveError::Sink(e) => write!(f, "sink error: {e}"),
            ArchiveError::State(msg) => write!(f, "invalid state: {msg}"),
        }
    }
}

impl Debug for ArchiveError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl std::error::Error for ArchiveError {}

impl From<std::io::Error> for ArchiveError {
    fn from(value: std::io::Error) -> Self {
        ArchiveError::Sink(value)
    }
}
