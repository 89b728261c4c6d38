use derive_new::new;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct FileSpec {
    pub path: PathBuf,
    pub content: String,
}

pub fn write_file(file_spec: FileSpec) {
    // make sure the parent directory exists
    if let Some(parent) = file_spec.path.parent() {
        std::fs::create_dir_all(parent).unwrap_or_else(|_| {
            panic!("Failed to create parent directory {}", parent.display())
        });
    }

    std::fs::write(&file_spec.path, file_spec.content)
        .unwrap_or_else(|_| panic!("Failed to write file {}", file_spec.path.display()));
}
