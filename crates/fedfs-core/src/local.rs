//! Local directory source.
//!
//! Maps `FileName` values to OS paths under a root directory. Writes go
//! through a hidden temp file and rename. Hidden entries (leading `.`) are
//! skipped when listing, as are entries whose metadata cannot be read.
//! Symlinks are followed; each directory is walked at most once.

use std::collections::HashSet;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use tokio::fs;

use crate::BoxFuture;
use crate::error::{FsError, FsResult};
use crate::name::FileName;
use crate::source::{Capability, FileSource};
use crate::types::{FileData, FileMeta, Permission};

/// Content type guessed from the file extension.
pub fn content_type_for(name: &str) -> String {
    mime_guess::from_path(name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

fn not_found(name: &FileName, e: io::Error) -> FsError {
    if e.kind() == ErrorKind::NotFound {
        FsError::NotFound(name.to_string())
    } else {
        FsError::Io(e)
    }
}

/// Sibling of `path` named `.<file>.fedfs-tmp`, hidden from listings.
fn temp_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.fedfs-tmp", file_name))
}

/// Read-write files under a directory.
///
/// With `root = ~/.fedfs/space`, the name `notes/today.md` maps to
/// `~/.fedfs/space/notes/today.md`.
pub struct LocalSource {
    root: PathBuf,
}

impl LocalSource {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn os_path(&self, name: &FileName) -> PathBuf {
        self.root.join(name.as_str())
    }

    async fn meta_for(&self, name: &str, os_path: &Path) -> io::Result<FileMeta> {
        let meta = fs::metadata(os_path).await?;
        if meta.is_dir() {
            return Err(io::Error::new(
                ErrorKind::NotFound,
                format!("'{}' is a directory", name),
            ));
        }
        let last_modified = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Ok(FileMeta {
            name: name.to_string(),
            size: meta.len(),
            content_type: content_type_for(name),
            perm: Permission::Rw,
            last_modified,
        })
    }

    async fn walk(&self) -> io::Result<Vec<FileMeta>> {
        let mut files = Vec::new();
        let Ok(root) = fs::canonicalize(&self.root).await else {
            return Ok(files);
        };
        let mut visited = HashSet::from([root]);
        let mut pending = vec![(self.root.clone(), String::new())];
        while let Some((dir, prefix)) = pending.pop() {
            let mut read_dir = match fs::read_dir(&dir).await {
                Ok(read_dir) => read_dir,
                Err(e) if !prefix.is_empty() => {
                    log::warn!("skipping {}: {}", dir.display(), e);
                    continue;
                }
                Err(e) => return Err(e),
            };
            while let Some(entry) = read_dir.next_entry().await? {
                let file_name = entry.file_name().to_string_lossy().into_owned();
                if file_name.starts_with('.') {
                    continue;
                }
                let name = if prefix.is_empty() {
                    file_name
                } else {
                    format!("{}/{}", prefix, file_name)
                };
                let path = entry.path();
                let is_dir = match fs::metadata(&path).await {
                    Ok(meta) => meta.is_dir(),
                    Err(e) => {
                        log::warn!("skipping {}: {}", path.display(), e);
                        continue;
                    }
                };
                if is_dir {
                    match fs::canonicalize(&path).await {
                        Ok(real) => {
                            if visited.insert(real) {
                                pending.push((path, name));
                            } else {
                                log::debug!("skipping {}: already listed", path.display());
                            }
                        }
                        Err(e) => log::warn!("skipping {}: {}", path.display(), e),
                    }
                    continue;
                }
                match self.meta_for(&name, &path).await {
                    Ok(meta) => files.push(meta),
                    Err(e) => log::warn!("skipping {}: {}", path.display(), e),
                }
            }
        }
        Ok(files)
    }
}

impl FileSource for LocalSource {
    fn capability(&self) -> Capability {
        Capability::ReadWrite
    }

    fn list_files<'a>(&'a self) -> BoxFuture<'a, FsResult<Vec<FileMeta>>> {
        Box::pin(async move { Ok(self.walk().await?) })
    }

    fn read_file<'a>(&'a self, name: &'a FileName) -> BoxFuture<'a, FsResult<FileData>> {
        Box::pin(async move {
            let os_path = self.os_path(name);
            let meta = self
                .meta_for(name.as_str(), &os_path)
                .await
                .map_err(|e| not_found(name, e))?;
            let data = fs::read(&os_path).await.map_err(|e| not_found(name, e))?;
            Ok(FileData { data, meta })
        })
    }

    fn get_file_meta<'a>(&'a self, name: &'a FileName) -> BoxFuture<'a, FsResult<FileMeta>> {
        Box::pin(async move {
            self.meta_for(name.as_str(), &self.os_path(name))
                .await
                .map_err(|e| not_found(name, e))
        })
    }

    fn write_file<'a>(
        &'a self,
        name: &'a FileName,
        data: &'a [u8],
    ) -> BoxFuture<'a, FsResult<FileMeta>> {
        Box::pin(async move {
            let os_path = self.os_path(name);
            if let Some(parent) = os_path.parent() {
                fs::create_dir_all(parent).await?;
            }
            let tmp = temp_path(&os_path);
            fs::write(&tmp, data).await?;
            fs::rename(&tmp, &os_path).await?;
            Ok(self.meta_for(name.as_str(), &os_path).await?)
        })
    }

    fn delete_file<'a>(&'a self, name: &'a FileName) -> BoxFuture<'a, FsResult<()>> {
        Box::pin(async move {
            fs::remove_file(self.os_path(name))
                .await
                .map_err(|e| not_found(name, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, LocalSource) {
        let dir = TempDir::new().unwrap();
        let source = LocalSource::new(dir.path().to_path_buf());
        (dir, source)
    }

    fn name(s: &str) -> FileName {
        FileName::new(s).unwrap()
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let (_dir, source) = setup();
        let meta = source.write_file(&name("notes.md"), b"hello").await.unwrap();
        assert_eq!(meta.size, 5);
        assert_eq!(meta.perm, Permission::Rw);
        assert_eq!(meta.content_type, "text/markdown");
        assert!(meta.last_modified > 0);

        let file = source.read_file(&name("notes.md")).await.unwrap();
        assert_eq!(file.data, b"hello");
        assert_eq!(file.meta, meta);
    }

    #[tokio::test]
    async fn test_write_creates_parent_dirs() {
        let (_dir, source) = setup();
        source
            .write_file(&name("deep/nested/file.txt"), b"nested")
            .await
            .unwrap();
        let file = source.read_file(&name("deep/nested/file.txt")).await.unwrap();
        assert_eq!(file.data, b"nested");
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let (_dir, source) = setup();
        assert!(matches!(
            source.read_file(&name("nope.md")).await,
            Err(FsError::NotFound(_))
        ));
        assert!(matches!(
            source.get_file_meta(&name("nope.md")).await,
            Err(FsError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_directory_is_not_a_file() {
        let (dir, source) = setup();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        assert!(matches!(
            source.get_file_meta(&name("sub")).await,
            Err(FsError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete() {
        let (_dir, source) = setup();
        source.write_file(&name("bye.md"), b"bye").await.unwrap();
        source.delete_file(&name("bye.md")).await.unwrap();
        assert!(matches!(
            source.delete_file(&name("bye.md")).await,
            Err(FsError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_is_recursive_and_skips_hidden() {
        let (dir, source) = setup();
        source.write_file(&name("a.md"), b"a").await.unwrap();
        source.write_file(&name("sub/b.md"), b"bb").await.unwrap();
        std::fs::write(dir.path().join(".hidden"), b"x").unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join(".git/HEAD"), b"x").unwrap();

        let mut names: Vec<_> = source
            .list_files()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["a.md", "sub/b.md"]);
    }

    #[tokio::test]
    async fn test_list_missing_root_is_empty() {
        let source = LocalSource::new(PathBuf::from("/nonexistent/fedfs/space"));
        assert!(source.list_files().await.unwrap().is_empty());
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("a/b.md"), "text/markdown");
        assert_eq!(content_type_for("IMG.PNG"), "image/png");
        assert_eq!(content_type_for("Makefile"), "application/octet-stream");
        assert_eq!(content_type_for("data.fedfsunknown"), "application/octet-stream");
        assert_eq!(content_type_for("site/index.html"), "text/html");
    }

    #[tokio::test]
    async fn test_write_leaves_no_temp_file() {
        let (dir, source) = setup();
        source.write_file(&name("sub/a.md"), b"a").await.unwrap();
        let entries: Vec<_> = std::fs::read_dir(dir.path().join("sub"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, vec!["a.md"]);
        assert_eq!(
            temp_path(&dir.path().join("sub/a.md")),
            dir.path().join("sub/.a.md.fedfs-tmp")
        );
    }

    #[tokio::test]
    async fn test_leftover_temp_file_is_not_listed() {
        let (dir, source) = setup();
        source.write_file(&name("a.md"), b"a").await.unwrap();
        std::fs::write(temp_path(&dir.path().join("b.md")), b"partial").unwrap();
        let names: Vec<_> = source
            .list_files()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["a.md"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_dangling_symlink_is_skipped() {
        let (dir, source) = setup();
        source.write_file(&name("a.md"), b"a").await.unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone"), dir.path().join("dangling.md")).unwrap();
        let names: Vec<_> = source
            .list_files()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["a.md"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinked_directory_is_followed_once() {
        let (dir, source) = setup();
        let outside = TempDir::new().unwrap();
        std::fs::write(outside.path().join("b.md"), b"bb").unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("linked")).unwrap();
        // A loop back to the root must not be walked again.
        std::os::unix::fs::symlink(dir.path(), dir.path().join("loop")).unwrap();
        source.write_file(&name("a.md"), b"a").await.unwrap();

        let mut names: Vec<_> = source
            .list_files()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["a.md", "linked/b.md"]);
    }
}
