use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Result;
use bytes::Bytes;

impl Repository {
    /// Payload of a stored object: blob bytes or the commit text
    pub fn cat_file(&self, object_id: &str) -> Result<Bytes> {
        self.ensure_initialized()?;

        let object_id = ObjectId::try_parse(object_id.to_string())?;
        let (_, payload) = self.database().load(&object_id)?;

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use crate::areas::repository::Repository;
    use crate::config::Config;
    use crate::errors::BitError;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;

    #[test]
    fn blobs_and_commits_print_their_payload() {
        let dir = TempDir::new().unwrap();
        let repository = Repository::open(dir.path(), Config::default()).unwrap();
        repository.init().unwrap();
        dir.child("f.txt").write_str("hello").unwrap();
        let report = repository.add(&["f.txt"]).unwrap();
        let (_, blob_oid) = report.staged().next().unwrap();
        let commit = repository.commit("greeting").unwrap();

        assert_eq!(repository.cat_file(blob_oid.as_ref()).unwrap(), "hello");
        let payload = repository.cat_file(commit.oid.as_ref()).unwrap();
        let payload = String::from_utf8_lossy(&payload);
        assert!(payload.contains(&format!("file {} f.txt", blob_oid)));
        assert!(payload.ends_with("\n\ngreeting"));
    }

    #[test]
    fn malformed_ids_are_rejected() {
        let dir = TempDir::new().unwrap();
        let repository = Repository::open(dir.path(), Config::default()).unwrap();
        repository.init().unwrap();

        assert!(matches!(
            repository.cat_file("abc"),
            Err(BitError::InvalidObjectId(_))
        ));
    }
}
