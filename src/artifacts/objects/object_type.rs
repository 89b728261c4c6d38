use std::io::BufRead;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Blob,
    Commit,
}

impl ObjectType {
    pub fn as_str(&self) -> &str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Commit => "commit",
        }
    }

    /// Read the `<type> <size>\0` header, leaving the reader at the payload
    ///
    /// Returns the object type and the declared payload size.
    pub fn parse_header(data_reader: &mut impl BufRead) -> Result<(ObjectType, usize), String> {
        let mut object_type = Vec::new();
        data_reader
            .read_until(b' ', &mut object_type)
            .map_err(|e| e.to_string())?;

        let object_type = String::from_utf8(object_type).map_err(|e| e.to_string())?;
        let object_type = ObjectType::try_from(object_type.trim())?;

        let mut size = Vec::new();
        data_reader
            .read_until(b'\0', &mut size)
            .map_err(|e| e.to_string())?;
        if size.pop() != Some(b'\0') {
            return Err("missing header terminator".to_string());
        }
        let size = String::from_utf8(size)
            .map_err(|e| e.to_string())?
            .parse::<usize>()
            .map_err(|e| format!("invalid object size: {e}"))?;

        Ok((object_type, size))
    }
}

impl TryFrom<&str> for ObjectType {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "blob" => Ok(ObjectType::Blob),
            "commit" => Ok(ObjectType::Commit),
            _ => Err(format!("invalid object type '{value}'")),
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    #[test]
    fn header_is_consumed_before_the_payload() {
        let mut reader = Cursor::new(b"blob 5\0hello".to_vec());

        let (object_type, size) = ObjectType::parse_header(&mut reader).unwrap();
        let mut payload = String::new();
        reader.read_to_string(&mut payload).unwrap();

        assert_eq!(object_type, ObjectType::Blob);
        assert_eq!(size, 5);
        assert_eq!(payload, "hello");
    }

    #[test]
    fn unknown_types_are_rejected() {
        let mut reader = Cursor::new(b"tree 0\0".to_vec());
        assert!(ObjectType::parse_header(&mut reader).is_err());
    }
}
