use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;

/// One structural frame of the trajectory.
///
/// `index` is the zero-based processing position, `sequence` the number
/// embedded in the file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub index: usize,
    pub sequence: u64,
    pub path: PathBuf,
}

impl Snapshot {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame {} ({})", self.index, self.file_name())
    }
}

/// The fixed naming pattern `<prefix><digits><suffix>` that identifies
/// snapshot files inside a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotPattern {
    pub directory: PathBuf,
    pub prefix: String,
    pub suffix: String,
}

impl SnapshotPattern {
    pub fn new(directory: impl Into<PathBuf>, prefix: &str, suffix: &str) -> Self {
        Self {
            directory: directory.into(),
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        }
    }

    /// Returns the sequence number encoded in `file_name`, or `None` when the
    /// name does not follow the pattern.
    pub fn sequence_of(&self, file_name: &str) -> Option<u64> {
        let digits = file_name
            .strip_prefix(&self.prefix)?
            .strip_suffix(&self.suffix)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }

    /// Lists all matching files in sequence order. Equal sequence numbers
    /// (`frame1` / `frame01`) fall back to lexicographic order.
    ///
    /// Returned paths are absolute.
    pub fn discover(&self) -> io::Result<Vec<Snapshot>> {
        let directory = std::path::absolute(&self.directory)?;
        let mut found: Vec<(u64, String, PathBuf)> = Vec::new();
        for entry in fs::read_dir(&directory)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if let Some(sequence) = self.sequence_of(&name) {
                found.push((sequence, name, path));
            }
        }
        found.sort();

        Ok(found
            .into_iter()
            .enumerate()
            .map(|(index, (sequence, _, path))| Snapshot {
                index,
                sequence,
                path,
            })
            .collect())
    }
}

impl fmt::Display for SnapshotPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<N>{}", self.prefix, self.suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::path::Path;
    use tempfile::tempdir;

    #[test]
    fn sequence_of_accepts_only_digits_between_prefix_and_suffix() {
        let pattern = SnapshotPattern::new(".", "frame", ".gro");
        assert_eq!(pattern.sequence_of("frame12.gro"), Some(12));
        assert_eq!(pattern.sequence_of("frame007.gro"), Some(7));
        assert_eq!(pattern.sequence_of("frame.gro"), None);
        assert_eq!(pattern.sequence_of("frame1a.gro"), None);
        assert_eq!(pattern.sequence_of("frame1.pdb"), None);
        assert_eq!(pattern.sequence_of("md1.gro"), None);
    }

    #[test]
    fn discover_orders_snapshots_by_sequence_number() {
        let dir = tempdir().unwrap();
        for name in ["frame10.gro", "frame2.gro", "frame1.gro", "notes.txt"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        fs::create_dir(dir.path().join("frame3.gro")).unwrap();

        let pattern = SnapshotPattern::new(dir.path(), "frame", ".gro");
        let snapshots = pattern.discover().unwrap();

        let names: Vec<_> = snapshots.iter().map(Snapshot::file_name).collect();
        assert_eq!(names, vec!["frame1.gro", "frame2.gro", "frame10.gro"]);
        let indices: Vec<_> = snapshots.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(snapshots[2].sequence, 10);
    }

    #[test]
    #[serial]
    fn discover_returns_absolute_paths_for_relative_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("frame1.gro"), "").unwrap();
        let cwd = std::env::current_dir().unwrap();
        let relative: PathBuf = dir
            .path()
            .strip_prefix("/")
            .map(|rest| {
                cwd.ancestors()
                    .skip(1)
                    .map(|_| Path::new(".."))
                    .collect::<PathBuf>()
                    .join(rest)
            })
            .unwrap();
        assert!(relative.is_relative());

        let snapshots = SnapshotPattern::new(&relative, "frame", ".gro")
            .discover()
            .unwrap();

        assert_eq!(snapshots.len(), 1);
        assert!(snapshots[0].path.is_absolute());
        assert!(snapshots[0].path.is_file());
    }

    #[test]
    fn discover_on_missing_directory_propagates_error() {
        let dir = tempdir().unwrap();
        let pattern = SnapshotPattern::new(dir.path().join("absent"), "frame", ".gro");
        assert!(pattern.discover().is_err());
    }

    #[test]
    fn display_describes_snapshot_by_index_and_file() {
        let snapshot = Snapshot {
            index: 4,
            sequence: 5,
            path: PathBuf::from("/data/frame5.gro"),
        };
        assert_eq!(snapshot.to_string(), "frame 4 (frame5.gro)");
    }
}
