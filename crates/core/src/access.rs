use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Read-only view of an import source tree.
pub struct SourceDir {
    root: PathBuf,
    exclude: Vec<PathBuf>,
}

impl SourceDir {
    pub fn open(root: &Path) -> Result<Self> {
        if !root.exists() {
            return Err(Error::SourceNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(Error::SourceNotDirectory(root.to_path_buf()));
        }
        Ok(Self {
            root: root.to_path_buf(),
            exclude: Vec::new(),
        })
    }

    /// Skip `path` (and everything below it, if it is a directory) during
    /// walks. Can be called more than once.
    pub fn excluding(mut self, path: &Path) -> Self {
        self.exclude.push(path.to_path_buf());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Visit every regular file under the root, in walk order. Stops at the
    /// first unreadable entry or the first error returned by `visit`.
    pub fn walk(&self, mut visit: impl FnMut(&Path) -> Result<()>) -> Result<()> {
        let entries = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !self.exclude.iter().any(|x| x == e.path()));

        for entry in entries {
            let entry = entry?;
            if entry.file_type().is_file() {
                visit(entry.path())?;
            }
        }
        Ok(())
    }

    pub fn open_file(&self, path: &Path) -> Result<File> {
        File::open(path).map_err(|e| Error::unreadable(path, e))
    }

    /// Read at most `limit` leading bytes of a file.
    pub fn read_head(&self, path: &Path, limit: usize) -> Result<Vec<u8>> {
        let file = self.open_file(path)?;
        let mut buf = Vec::with_capacity(limit);
        file.take(limit as u64)
            .read_to_end(&mut buf)
            .map_err(|e| Error::unreadable(path, e))?;
        Ok(buf)
    }

    pub fn read_all(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).map_err(|e| Error::unreadable(path, e))
    }
}

/// Writable view of an export destination tree.
pub struct DestinationDir {
    root: PathBuf,
}

impl DestinationDir {
    pub fn open(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(Error::DestinationNotFound(root.to_path_buf()));
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create `dir` and any missing parents.
    pub fn ensure_dir(&self, dir: &Path) -> Result<()> {
        if dir.is_dir() {
            return Ok(());
        }
        fs::create_dir_all(dir).map_err(|e| Error::write_failed(dir, e))
    }

    /// Copy a regular file's bytes to `dst`, replacing any file already there.
    /// Returns the number of bytes copied.
    pub fn copy_file(&self, src: &Path, dst: &Path) -> Result<u64> {
        let meta = fs::metadata(src).map_err(|e| Error::unreadable(src, e))?;
        if !meta.is_file() {
            return Err(Error::NotRegularFile(src.to_path_buf()));
        }

        let mut source = File::open(src).map_err(|e| Error::unreadable(src, e))?;
        let mut target = File::create(dst).map_err(|e| Error::write_failed(dst, e))?;
        io::copy(&mut source, &mut target).map_err(|e| Error::write_failed(dst, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_open_missing() {
        let err = SourceDir::open(Path::new("/nonexistent/source")).err().unwrap();
        assert!(matches!(err, Error::SourceNotFound(_)));
    }

    #[test]
    fn test_source_open_file_not_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("f.txt");
        fs::write(&file, b"x").unwrap();
        let err = SourceDir::open(&file).err().unwrap();
        assert!(matches!(err, Error::SourceNotDirectory(_)));
    }

    #[test]
    fn test_walk_visits_files_only_recursively() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("sub/deeper")).unwrap();
        fs::write(tmp.path().join("a.jpg"), b"a").unwrap();
        fs::write(tmp.path().join("sub/b.jpg"), b"b").unwrap();
        fs::write(tmp.path().join("sub/deeper/c.jpg"), b"c").unwrap();

        let source = SourceDir::open(tmp.path()).unwrap();
        let mut seen = Vec::new();
        source
            .walk(|p| {
                seen.push(p.strip_prefix(tmp.path()).unwrap().to_path_buf());
                Ok(())
            })
            .unwrap();

        assert_eq!(
            seen,
            vec![
                PathBuf::from("a.jpg"),
                PathBuf::from("sub/b.jpg"),
                PathBuf::from("sub/deeper/c.jpg"),
            ]
        );
    }

    #[test]
    fn test_walk_skips_excluded_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let hidden = tmp.path().join(".catalog");
        fs::create_dir_all(&hidden).unwrap();
        fs::write(hidden.join("catalog.db"), b"db").unwrap();
        fs::write(tmp.path().join("a.jpg"), b"a").unwrap();

        let source = SourceDir::open(tmp.path()).unwrap().excluding(&hidden);
        let mut count = 0;
        source
            .walk(|_| {
                count += 1;
                Ok(())
            })
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_walk_skips_every_excluded_path() {
        let tmp = tempfile::tempdir().unwrap();
        let db = tmp.path().join("db");
        fs::create_dir_all(&db).unwrap();
        fs::write(db.join("catalog.db"), b"db").unwrap();
        fs::write(db.join("catalog.db-wal"), b"wal").unwrap();
        fs::write(db.join("notes.jpg"), b"n").unwrap();
        fs::write(tmp.path().join("a.jpg"), b"a").unwrap();

        let source = SourceDir::open(tmp.path())
            .unwrap()
            .excluding(&db.join("catalog.db"))
            .excluding(&db.join("catalog.db-wal"));
        let mut seen = Vec::new();
        source
            .walk(|p| {
                seen.push(p.to_path_buf());
                Ok(())
            })
            .unwrap();
        assert_eq!(seen, vec![tmp.path().join("a.jpg"), db.join("notes.jpg")]);
    }

    #[test]
    fn test_walk_stops_on_visitor_error() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("a.jpg"), b"a").unwrap();
        fs::write(tmp.path().join("b.jpg"), b"b").unwrap();

        let source = SourceDir::open(tmp.path()).unwrap();
        let mut visited = 0;
        let result = source.walk(|p| {
            visited += 1;
            Err(Error::NotRegularFile(p.to_path_buf()))
        });
        assert!(result.is_err());
        assert_eq!(visited, 1);
    }

    #[test]
    fn test_read_head_limits_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("big.bin");
        fs::write(&file, vec![7u8; 2048]).unwrap();

        let source = SourceDir::open(tmp.path()).unwrap();
        assert_eq!(source.read_head(&file, 512).unwrap().len(), 512);
    }

    #[test]
    fn test_read_head_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let source = SourceDir::open(tmp.path()).unwrap();
        let err = source.read_head(&tmp.path().join("gone"), 512).unwrap_err();
        assert!(matches!(err, Error::SourceUnreadable { .. }));
    }

    #[test]
    fn test_destination_requires_existing_dir() {
        let err = DestinationDir::open(Path::new("/nonexistent/dest")).err().unwrap();
        assert!(matches!(err, Error::DestinationNotFound(_)));
    }

    #[test]
    fn test_ensure_dir_and_copy() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src.jpg");
        fs::write(&src, b"photo data").unwrap();
        let dest_root = tmp.path().join("dest");
        fs::create_dir_all(&dest_root).unwrap();

        let dest = DestinationDir::open(&dest_root).unwrap();
        let dir = dest_root.join("2020/01");
        dest.ensure_dir(&dir).unwrap();
        dest.ensure_dir(&dir).unwrap();

        let copied = dest.copy_file(&src, &dir.join("out.jpg")).unwrap();
        assert_eq!(copied, 10);
        assert_eq!(fs::read(dir.join("out.jpg")).unwrap(), b"photo data");
    }

    #[test]
    fn test_copy_rejects_directory_source() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = DestinationDir::open(tmp.path()).unwrap();
        let err = dest
            .copy_file(tmp.path(), &tmp.path().join("out"))
            .unwrap_err();
        assert!(matches!(err, Error::NotRegularFile(_)));
    }

    #[test]
    fn test_copy_missing_source() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = DestinationDir::open(tmp.path()).unwrap();
        let err = dest
            .copy_file(&tmp.path().join("nope.jpg"), &tmp.path().join("out.jpg"))
            .unwrap_err();
        assert!(matches!(err, Error::SourceUnreadable { .. }));
    }
}
