//! Archive path validation. A streaming writer with no
//! central-directory rewrite pass cannot afford to discover a bad
//! path after the local header has already gone to the sink, so
//! validation happens up front, before anything is written for that
//! member.

use crate::error::ArchiveError;

/// Rejects empty, over-length, and otherwise ill-formed archive paths.
/// An accepted path is returned unchanged: no normalization, no
/// case-folding.
pub(crate) fn validate(path: &str) -> Result<(), ArchiveError> {
    let bytes = path.as_bytes();

    if bytes.is_empty() {
        return Err(ArchiveError::Path(path.to_owned()));
    }
    if bytes.len() as u64 >= crate::constants::MAX_FIELD_LEN {
        return Err(ArchiveError::Path(path.to_owned()));
    }
    if bytes[0] == b'/' {
        return Err(ArchiveError::Path(path.to_owned()));
    }
    if bytes[bytes.len() - 1] == b'/' {
        return Err(ArchiveError::Path(path.to_owned()));
    }
    if bytes.contains(&b'\\') {
        return Err(ArchiveError::Path(path.to_owned()));
    }
    if path.contains("//") {
        return Err(ArchiveError::Path(path.to_owned()));
    }
    if has_dot_dot_component(path) {
        return Err(ArchiveError::Path(path.to_owned()));
    }

    Ok(())
}

fn has_dot_dot_component(path: &str) -> bool {
    path.split('/').any(|component| component == "..")
}
