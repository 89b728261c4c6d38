//! Content-addressed object database
//!
//! Objects are written once under `objects/<2>/<62>` and never modified or
//! deleted. Writing the same content twice is a no-op after the first write,
//! and two writers storing identical content race harmlessly: each writes a
//! temporary file and renames it onto the same final path.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{BitError, IoContext, Result};
use bytes::Bytes;
use fake::rand;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Store `content` as a blob and return its ID
    pub fn put(&self, content: impl Into<Bytes>) -> Result<ObjectId> {
        self.store(&Blob::new(content))
    }

    /// Load the content of the blob `object_id`
    pub fn get(&self, object_id: &ObjectId) -> Result<Bytes> {
        let (object_type, payload) = self.load(object_id)?;
        self.expect_type(object_id, ObjectType::Blob, object_type)?;

        let blob = Blob::deserialize(Cursor::new(payload)).map_err(|reason| {
            BitError::CorruptObject {
                oid: object_id.clone(),
                reason,
            }
        })?;
        Ok(blob.into_content())
    }

    pub fn contains(&self, object_id: &ObjectId) -> bool {
        self.path.join(object_id.to_path()).is_file()
    }

    /// Persist `object` unless an object with the same ID already exists
    pub fn store(&self, object: &impl Object) -> Result<ObjectId> {
        let object_id = object.object_id();
        let object_path = self.path.join(object_id.to_path());

        if object_path.exists() {
            tracing::debug!(oid = %object_id, "object already stored");
            return Ok(object_id);
        }

        let object_dir = object_path
            .parent()
            .ok_or_else(|| BitError::Malformed {
                what: "object path",
                path: object_path.clone(),
                reason: "no parent directory".to_string(),
            })?;
        std::fs::create_dir_all(object_dir).io_context("create object directory", object_dir)?;

        self.write_object(object_dir, &object_path, &object.serialize())?;
        tracing::debug!(oid = %object_id, kind = %object.object_type(), "stored object");

        Ok(object_id)
    }

    /// Read the object and split off its header
    pub fn load(&self, object_id: &ObjectId) -> Result<(ObjectType, Bytes)> {
        let object_path = self.path.join(object_id.to_path());
        let object_content = self.read_object(object_id, &object_path)?;
        let mut object_reader = Cursor::new(object_content.clone());

        let (object_type, size) =
            ObjectType::parse_header(&mut object_reader).map_err(|reason| {
                BitError::CorruptObject {
                    oid: object_id.clone(),
                    reason,
                }
            })?;

        let payload = object_content.slice(object_reader.position() as usize..);
        if payload.len() != size {
            return Err(BitError::CorruptObject {
                oid: object_id.clone(),
                reason: format!("declared size {} but found {} bytes", size, payload.len()),
            });
        }

        Ok((object_type, payload))
    }

    pub fn load_commit(&self, object_id: &ObjectId) -> Result<Commit> {
        let (object_type, payload) = self.load(object_id)?;
        self.expect_type(object_id, ObjectType::Commit, object_type)?;

        Commit::deserialize(Cursor::new(payload)).map_err(|reason| BitError::CorruptObject {
            oid: object_id.clone(),
            reason,
        })
    }

    pub fn object_type(&self, object_id: &ObjectId) -> Result<ObjectType> {
        Ok(self.load(object_id)?.0)
    }

    fn expect_type(
        &self,
        object_id: &ObjectId,
        expected: ObjectType,
        actual: ObjectType,
    ) -> Result<()> {
        if expected != actual {
            return Err(BitError::UnexpectedObjectType {
                oid: object_id.clone(),
                expected,
                actual,
            });
        }
        Ok(())
    }

    fn read_object(&self, object_id: &ObjectId, object_path: &Path) -> Result<Bytes> {
        match std::fs::read(object_path) {
            Ok(content) => Ok(Bytes::from(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(BitError::ObjectNotFound(object_id.clone()))
            }
            Err(e) => Err(e).io_context("read object", object_path),
        }
    }

    fn write_object(&self, object_dir: &Path, object_path: &Path, content: &[u8]) -> Result<()> {
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_object_path)
            .io_context("open temporary object", &temp_object_path)?;

        file.write_all(content)
            .and_then(|_| file.sync_all())
            .io_context("write temporary object", &temp_object_path)?;

        // rename the temp file to the object file to make it atomic
        std::fs::rename(&temp_object_path, object_path).io_context("rename object", object_path)
    }

    fn generate_temp_name() -> PathBuf {
        PathBuf::from(format!("tmp-obj-{}", rand::random::<u32>()))
    }
}
