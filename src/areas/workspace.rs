use crate::artifacts::core::error::DiffError;
use std::cell::OnceCell;
use std::ffi::OsString;
use std::io::Read;
use std::path::Path;
use std::time::SystemTime;
use walkdir::WalkDir;

/// Name given to standard input on the command line.
pub const STDIN_NAME: &str = "-";

/// What a path on disk turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    pub fn describe(self) -> &'static str {
        match self {
            EntryKind::File => "regular file",
            EntryKind::Directory => "directory",
        }
    }
}

/// The bytes of one input together with what the headers need to know
/// about it.
#[derive(Debug, Clone)]
pub struct Source {
    pub name: String,
    pub data: Vec<u8>,
    pub modified: SystemTime,
}

impl Source {
    /// Stand-in for a file that exists only on the other side.
    pub fn missing(name: impl Into<String>) -> Self {
        Source {
            name: name.into(),
            data: Vec::new(),
            modified: SystemTime::UNIX_EPOCH,
        }
    }
}

/// File system access for a comparison run.
///
/// Standard input can be named more than once but is only read once.
#[derive(Debug, Default)]
pub struct Workspace {
    stdin: OnceCell<Vec<u8>>,
}

impl Workspace {
    pub fn is_stdin(path: &Path) -> bool {
        path.as_os_str() == STDIN_NAME
    }

    /// `None` when nothing exists at `path`.
    pub fn entry_kind(&self, path: &Path) -> Result<Option<EntryKind>, DiffError> {
        if Self::is_stdin(path) {
            return Ok(Some(EntryKind::File));
        }

        match std::fs::metadata(path) {
            Ok(metadata) if metadata.is_dir() => Ok(Some(EntryKind::Directory)),
            Ok(_) => Ok(Some(EntryKind::File)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(DiffError::io(path, err)),
        }
    }

    pub fn read_source(&self, path: &Path) -> Result<Source, DiffError> {
        let name = path.to_string_lossy().into_owned();

        if Self::is_stdin(path) {
            return Ok(Source {
                name,
                data: self.read_stdin()?,
                modified: SystemTime::now(),
            });
        }

        let data = std::fs::read(path).map_err(|err| DiffError::io(path, err))?;
        let modified = std::fs::metadata(path)
            .and_then(|metadata| metadata.modified())
            .map_err(|err| DiffError::io(path, err))?;

        Ok(Source {
            name,
            data,
            modified,
        })
    }

    fn read_stdin(&self) -> Result<Vec<u8>, DiffError> {
        if let Some(data) = self.stdin.get() {
            return Ok(data.clone());
        }

        let mut data = Vec::new();
        std::io::stdin()
            .lock()
            .read_to_end(&mut data)
            .map_err(|err| DiffError::io(STDIN_NAME, err))?;

        Ok(self.stdin.get_or_init(|| data).clone())
    }

    /// Names of the entries directly inside `dir_path`, sorted.
    pub fn list_dir(&self, dir_path: &Path) -> Result<Vec<OsString>, DiffError> {
        WalkDir::new(dir_path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .map(|entry| {
                entry.map(|entry| entry.file_name().to_os_string()).map_err(|err| {
                    let path = err.path().unwrap_or(dir_path).to_path_buf();
                    DiffError::io(path, err.into())
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn dir() -> assert_fs::TempDir {
        let dir = assert_fs::TempDir::new().unwrap();
        dir.child("b.txt").write_str("b\n").unwrap();
        dir.child("a.txt").write_str("a\n").unwrap();
        dir.child("sub").create_dir_all().unwrap();
        dir
    }

    #[rstest]
    fn entries_are_listed_by_name(dir: assert_fs::TempDir) {
        let entries = Workspace::default().list_dir(dir.path()).unwrap();

        assert_eq!(entries, vec!["a.txt", "b.txt", "sub"]);
    }

    #[rstest]
    fn entry_kinds(dir: assert_fs::TempDir) {
        let workspace = Workspace::default();

        assert_eq!(workspace.entry_kind(&dir.path().join("a.txt")).unwrap(), Some(EntryKind::File));
        assert_eq!(workspace.entry_kind(&dir.path().join("sub")).unwrap(), Some(EntryKind::Directory));
        assert_eq!(workspace.entry_kind(&dir.path().join("nope")).unwrap(), None);
    }

    #[rstest]
    fn sources_carry_their_content(dir: assert_fs::TempDir) {
        let path = dir.path().join("a.txt");

        let source = Workspace::default().read_source(&path).unwrap();

        assert_eq!(source.data, b"a\n");
        assert_eq!(source.name, path.to_string_lossy());
    }

    #[rstest]
    fn unreadable_source_names_the_path(dir: assert_fs::TempDir) {
        let path = dir.path().join("missing");

        let err = Workspace::default().read_source(&path).unwrap_err();

        assert!(err.to_string().starts_with(&*path.to_string_lossy()));
    }
}
