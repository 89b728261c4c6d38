use crate::areas::repository::Repository;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{IoContext, Result};
use std::path::Path;

impl Repository {
    /// Blob ID of a file, storing the blob when `write` is set
    ///
    /// Works without an initialized repository unless `write` is set.
    pub fn hash_object(&self, object_path: &Path, write: bool) -> Result<ObjectId> {
        let object_path = if object_path.is_absolute() {
            object_path.to_path_buf()
        } else {
            self.path().join(object_path)
        };
        let content = std::fs::read(&object_path).io_context("read file", &object_path)?;
        let blob = Blob::new(content);

        if !write {
            return Ok(blob.object_id());
        }

        self.ensure_initialized()?;
        self.database().store(&blob)
    }
}
