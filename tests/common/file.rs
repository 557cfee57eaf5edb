use derive_new::new;
use filetime::FileTime;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Eq, PartialEq, new)]
pub struct FileSpec {
    pub path: PathBuf,
    pub content: String,
}

pub fn write_file(file_spec: FileSpec) {
    // make sure the parent directory exists
    if let Some(parent) = file_spec.path.parent() {
        std::fs::create_dir_all(parent)
            .unwrap_or_else(|e| panic!("Failed to create directory {:?}: {}", parent, e));
    }

    std::fs::write(&file_spec.path, &file_spec.content)
        .unwrap_or_else(|e| panic!("Failed to write file {:?}: {}", file_spec.path, e));
}

/// Write a file and pin its modification time.
pub fn write_stamped_file(file_spec: FileSpec, unix_time: i64) {
    let path = file_spec.path.clone();
    write_file(file_spec);

    filetime::set_file_mtime(&path, FileTime::from_unix_time(unix_time, 0))
        .unwrap_or_else(|e| panic!("Failed to set mtime of {:?}: {}", path, e));
}

pub fn create_directory(path: &Path) {
    std::fs::create_dir_all(path)
        .unwrap_or_else(|e| panic!("Failed to create directory {:?}: {}", path, e));
}

pub fn write_generated_lines(path: &Path, lines_count: usize) -> Vec<String> {
    use fake::{Fake, faker::lorem::en::Words};

    let lines = (0..lines_count)
        .map(|i| format!("{i} {}", Words(2..5).fake::<Vec<String>>().join(" ")))
        .collect::<Vec<_>>();

    let mut content = lines.join("\n");
    content.push('\n');
    write_file(FileSpec::new(path.to_path_buf(), content));

    lines
}
