//! Filesystem access used by the compiler
//!
//! The compiler only needs two things from the filesystem: the text of a
//! template and its modification time. Both go through [`TemplateFs`] so the
//! cache can be exercised without touching real files.

use std::io;
use std::path::Path;
use std::time::SystemTime;

use async_trait::async_trait;

/// Read access to template files
#[async_trait]
pub trait TemplateFs: Send + Sync {
    /// Read a template as UTF-8 text
    async fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Last modification time of a template
    async fn modified(&self, path: &Path) -> io::Result<SystemTime>;
}

/// [`TemplateFs`] backed by `tokio::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFs;

#[async_trait]
impl TemplateFs for TokioFs {
    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        tokio::fs::read_to_string(path).await
    }

    async fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        tokio::fs::metadata(path).await?.modified()
    }
}

#[cfg(test)]
pub(crate) mod memory {
    //! In-memory filesystem with settable modification times

    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    pub struct MemoryFs {
        files: Mutex<HashMap<PathBuf, (String, SystemTime)>>,
        reads: AtomicUsize,
    }

    impl MemoryFs {
        pub fn write(&self, path: &str, content: &str, mtime_secs: u64) {
            let mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(mtime_secs);
            self.files
                .lock()
                .unwrap()
                .insert(PathBuf::from(path), (content.to_string(), mtime));
        }

        pub fn touch(&self, path: &str, mtime_secs: u64) {
            let mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(mtime_secs);
            if let Some(entry) = self.files.lock().unwrap().get_mut(Path::new(path)) {
                entry.1 = mtime;
            }
        }

        pub fn remove(&self, path: &str) {
            self.files.lock().unwrap().remove(Path::new(path));
        }

        pub fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }

        fn lookup(&self, path: &Path) -> io::Result<(String, SystemTime)> {
            self.files
                .lock()
                .unwrap()
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such template"))
        }
    }

    #[async_trait]
    impl TemplateFs for MemoryFs {
        async fn read_to_string(&self, path: &Path) -> io::Result<String> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.lookup(path).map(|(content, _)| content)
        }

        async fn modified(&self, path: &Path) -> io::Result<SystemTime> {
            self.lookup(path).map(|(_, mtime)| mtime)
        }
    }
}
