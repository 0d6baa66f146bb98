use crc32fast::Hasher;

/// Incremental CRC-32/IEEE. Wraps [`crc32fast::Hasher`] and forbids
/// updating after finalize.
#[derive(Debug, Default)]
pub(crate) struct Crc32 {
    hasher: Option<Hasher>,
}

impl Crc32 {
    pub fn new() -> Self {
        Self {
            hasher: Some(Hasher::new()),
        }
    }

    /// Feed more bytes into the running checksum.
    ///
    /// # Panics
    ///
    /// Panics if called after [`Crc32::finalize`] (a programming
    /// error, not a recoverable archive failure).
    pub fn update(&mut self, bytes: &[u8]) {
        self.hasher
            .as_mut()
            .expect("Crc32::update called after finalize")
            .update(bytes);
    }

    pub fn finalize(&mut self) -> u32 {
        self.hasher
            .take()
            .expect("Crc32::finalize called twice")
            .finalize()
    }
}
