use crate::core::models::snapshot::Snapshot;
use crate::core::models::variant::VariantKind;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// Per-frame scratch namespace with one sub-directory per variant kind.
///
/// Dropping the value removes the namespace; [`FrameScratch::release`] does the
/// same but reports removal failures.
#[derive(Debug)]
pub struct FrameScratch {
    dir: TempDir,
}

impl FrameScratch {
    /// A relative `root` resolves against the current directory; the
    /// namespace path is always absolute.
    pub fn acquire(root: &Path, snapshot: &Snapshot) -> io::Result<Self> {
        let root = std::path::absolute(root)?;
        fs::create_dir_all(&root)?;
        let dir = tempfile::Builder::new()
            .prefix(&format!("frame-{:05}-", snapshot.index))
            .tempdir_in(&root)?;
        for kind in VariantKind::ALL {
            fs::create_dir(dir.path().join(kind.label()))?;
        }
        debug!(frame = snapshot.index, path = ?dir.path(), "Acquired scratch namespace.");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn variant_dir(&self, kind: VariantKind) -> PathBuf {
        self.dir.path().join(kind.label())
    }

    pub fn release(self) -> io::Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close()?;
        debug!(path = ?path, "Released scratch namespace.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn snapshot(index: usize) -> Snapshot {
        Snapshot {
            index,
            sequence: index as u64,
            path: PathBuf::from(format!("frame{}.gro", index)),
        }
    }

    #[test]
    fn acquire_creates_one_directory_per_variant() {
        let root = tempdir().unwrap();
        let scratch = FrameScratch::acquire(root.path(), &snapshot(3)).unwrap();

        for kind in VariantKind::ALL {
            assert!(scratch.variant_dir(kind).is_dir());
        }
        let name = scratch.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("frame-00003-"));
    }

    #[test]
    fn release_removes_namespace_and_contents() {
        let root = tempdir().unwrap();
        let scratch = FrameScratch::acquire(root.path(), &snapshot(0)).unwrap();
        fs::write(scratch.variant_dir(VariantKind::Complex).join("complex.pqr"), "x").unwrap();
        let path = scratch.path().to_path_buf();

        scratch.release().unwrap();

        assert!(!path.exists());
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn drop_removes_namespace_on_early_exit() {
        let root = tempdir().unwrap();
        let path = {
            let scratch = FrameScratch::acquire(root.path(), &snapshot(1)).unwrap();
            scratch.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn acquire_creates_missing_root() {
        let root = tempdir().unwrap();
        let nested = root.path().join("a/b");
        let scratch = FrameScratch::acquire(&nested, &snapshot(0)).unwrap();
        assert!(scratch.path().starts_with(&nested));
    }

    #[test]
    fn concurrent_frames_get_distinct_namespaces() {
        let root = tempdir().unwrap();
        let a = FrameScratch::acquire(root.path(), &snapshot(0)).unwrap();
        let b = FrameScratch::acquire(root.path(), &snapshot(0)).unwrap();
        assert_ne!(a.path(), b.path());
    }
}
