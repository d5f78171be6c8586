use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Legacy discriminator for files needing special handling downstream
///
/// New kinds of special handling get their own flag rather than a new
/// variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    #[default]
    File,
    Symlink,
    /// Marker for the main file of a git submodule
    Submodule,
}

/// How the `content` string is encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ContentEncoding {
    #[default]
    #[serde(rename = "utf-8")]
    Utf8,
    #[serde(rename = "base64")]
    Base64,
}

/// Mutation to apply to the file when the change is committed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    #[default]
    Update,
    Create,
    Delete,
}

/// Git tree entry mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileMode {
    #[serde(rename = "100644")]
    Regular,
    #[serde(rename = "100755")]
    Executable,
    #[serde(rename = "120000")]
    Symlink,
    #[serde(rename = "160000")]
    Submodule,
}

/// File content after undoing its transfer encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedContent<'a> {
    /// UTF-8 content, returned as stored
    Text(&'a str),
    /// Bytes decoded from base64 content
    Binary(Bytes),
}

impl DecodedContent<'_> {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            DecodedContent::Text(text) => text.as_bytes(),
            DecodedContent::Binary(bytes) => bytes,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            DecodedContent::Text(text) => Some(text),
            DecodedContent::Binary(_) => None,
        }
    }

    pub fn into_bytes(self) -> Bytes {
        match self {
            DecodedContent::Text(text) => Bytes::copy_from_slice(text.as_bytes()),
            DecodedContent::Binary(bytes) => bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        let names = |values: Vec<serde_json::Value>| -> Vec<String> {
            values
                .into_iter()
                .map(|v| v.as_str().unwrap().to_string())
                .collect()
        };

        let file_types = [FileType::File, FileType::Symlink, FileType::Submodule]
            .map(|t| serde_json::to_value(t).unwrap());
        assert_eq!(names(file_types.to_vec()), ["file", "symlink", "submodule"]);

        let encodings = [ContentEncoding::Utf8, ContentEncoding::Base64]
            .map(|e| serde_json::to_value(e).unwrap());
        assert_eq!(names(encodings.to_vec()), ["utf-8", "base64"]);

        let operations = [Operation::Update, Operation::Create, Operation::Delete]
            .map(|o| serde_json::to_value(o).unwrap());
        assert_eq!(names(operations.to_vec()), ["update", "create", "delete"]);

        let modes = [
            FileMode::Regular,
            FileMode::Executable,
            FileMode::Symlink,
            FileMode::Submodule,
        ]
        .map(|m| serde_json::to_value(m).unwrap());
        assert_eq!(names(modes.to_vec()), ["100644", "100755", "120000", "160000"]);

        let parsed: Operation = serde_json::from_str("\"delete\"").unwrap();
        assert_eq!(parsed, Operation::Delete);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(FileType::default(), FileType::File);
        assert_eq!(ContentEncoding::default(), ContentEncoding::Utf8);
        assert_eq!(Operation::default(), Operation::Update);
    }

    #[test]
    fn test_decoded_content_views() {
        let text = DecodedContent::Text("hello");
        assert_eq!(text.as_bytes(), b"hello");
        assert_eq!(text.as_text(), Some("hello"));
        assert_eq!(text.into_bytes(), Bytes::from_static(b"hello"));

        let binary = DecodedContent::Binary(Bytes::from_static(&[0, 159, 146, 150]));
        assert_eq!(binary.as_bytes(), &[0, 159, 146, 150]);
        assert!(binary.as_text().is_none());
    }
}
