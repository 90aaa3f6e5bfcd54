use std::io::Write;

/// Staging area for per-request audio payloads.
///
/// Handles release their backing storage when dropped, so every exit path
/// from an operation (success, provider error, client disconnect) releases
/// the resource exactly once.
pub trait Scratch: Send + Sync {
    fn stage(&self, bytes: &[u8]) -> std::io::Result<Box<dyn Staged>>;
}

/// A staged payload scoped to a single request.
pub trait Staged: Send {
    fn read(&self) -> std::io::Result<Vec<u8>>;
}

/// Stages payloads as named temporary files, removed when the handle drops.
pub struct DiskScratch;

impl Scratch for DiskScratch {
    fn stage(&self, bytes: &[u8]) -> std::io::Result<Box<dyn Staged>> {
        let mut file = tempfile::Builder::new().suffix(".wav").tempfile()?;
        file.write_all(bytes)?;
        file.flush()?;
        tracing::debug!("staged {} bytes at {:?}", bytes.len(), file.path());
        Ok(Box::new(DiskStaged { file }))
    }
}

struct DiskStaged {
    file: tempfile::NamedTempFile,
}

impl Staged for DiskStaged {
    fn read(&self) -> std::io::Result<Vec<u8>> {
        std::fs::read(self.file.path())
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// In-memory scratch that counts stagings and releases.
    #[derive(Default, Clone)]
    pub struct MemScratch {
        pub staged: Arc<AtomicUsize>,
        pub released: Arc<AtomicUsize>,
    }

    impl Scratch for MemScratch {
        fn stage(&self, bytes: &[u8]) -> std::io::Result<Box<dyn Staged>> {
            self.staged.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(MemStaged {
                data: bytes.to_vec(),
                released: self.released.clone(),
            }))
        }
    }

    struct MemStaged {
        data: Vec<u8>,
        released: Arc<AtomicUsize>,
    }

    impl Staged for MemStaged {
        fn read(&self) -> std::io::Result<Vec<u8>> {
            Ok(self.data.clone())
        }
    }

    impl Drop for MemStaged {
        fn drop(&mut self) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn disk_scratch_roundtrips_and_removes_file() {
        let scratch = DiskScratch;
        let staged = scratch.stage(b"RIFF....WAVE").unwrap();
        assert_eq!(staged.read().unwrap(), b"RIFF....WAVE");
        drop(staged);
    }

    #[test]
    fn mem_scratch_releases_once_per_handle() {
        let scratch = testing::MemScratch::default();
        let staged = scratch.stage(b"abc").unwrap();
        assert_eq!(scratch.staged.load(Ordering::SeqCst), 1);
        assert_eq!(scratch.released.load(Ordering::SeqCst), 0);
        drop(staged);
        assert_eq!(scratch.released.load(Ordering::SeqCst), 1);
    }
}
