//! Archive size pre-calculation, useful for setting a `Content-Length`
//! before streaming begins.
//!
//! Only STORE sizing is exact: STORE's compressed size equals the
//! input size, so the final archive length is fully determined by the
//! member sizes up front. DEFLATE's compressed size isn't known until
//! the encoder has actually run, so this helper reports STORE's size,
//! an upper bound when the caller ends up choosing DEFLATE instead.

use crate::constants::*;

/// Computes the exact byte size of an archive holding `files`, each
/// given as `(archive_path, uncompressed_size)`, written with the
/// STORE method.
///
/// ## Example
///
/// ```
/// use zipflow::archive_size;
///
/// let size = archive_size([
///     ("file1.txt", 6u64),
///     ("file2.txt", 6u64),
/// ]);
/// assert!(size > 0);
/// ```
pub fn archive_size<'a, I>(files: I) -> u64
where
    I: IntoIterator<Item = (&'a str, u64)>,
{
    let mut offset = 0u64;
    let mut cdr_len = 0u64;
    let mut entry_count = 0u64;

    for (name, size) in files {
        let name_len = name.len() as u64;
        let local_header_offset = offset;

        let header_len = LOCAL_FILE_HEADER_FIXED_SIZE + name_len + ZIP64_LOCAL_PLACEHOLDER_EXTRA_SIZE;
        offset += header_len + size + DATA_DESCRIPTOR_SIZE;

        let mut zip64_fields = 0u64;
        if size > u32::MAX as u64 {
            zip64_fields += 2; // uncompressed and compressed size both equal `size` for STORE
        }
        if local_header_offset > u32::MAX as u64 {
            zip64_fields += 1;
        }
        let extra_len = if zip64_fields == 0 {
            0
        } else {
            ZIP64_EXTRA_HEADER_SIZE + zip64_fields * 8
        };

        cdr_len += CENTRAL_DIRECTORY_ENTRY_FIXED_SIZE + name_len + extra_len;
        entry_count += 1;
    }

    let _ = entry_count;
    offset + cdr_len + ZIP64_EOCD_SIZE + ZIP64_EOCD_LOCATOR_SIZE + EOCD_FIXED_SIZE
}
