use std::hash::{Hash, Hasher};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::{
    error::{ConfigurationError, Result},
    path,
    types::{ContentEncoding, DecodedContent, FileMode, FileType, Operation},
};

/// Ordered key-value form of a [`DependencyFile`]
pub type CanonicalMap = Map<String, Value>;

/// Canonical keys that do not take part in equality or hashing
const IDENTITY_EXCLUDED_KEYS: &[&str] = &["support_file"];

const UTF8_BOM: char = '\u{FEFF}';

/// A single file change destined for a commit
///
/// Built once by whoever fetched or generated the file and treated as
/// immutable afterwards, apart from the legacy [`set_deleted`] mutator.
/// Equality and hashing use the canonical map minus `support_file`, so a
/// file does not change identity when it is demoted to a support file.
///
/// [`set_deleted`]: DependencyFile::set_deleted
#[derive(Debug, Clone)]
pub struct DependencyFile {
    name: String,
    content: Option<String>,
    directory: String,
    file_type: FileType,
    support_file: bool,
    symlink_target: Option<String>,
    content_encoding: ContentEncoding,
    operation: Operation,
    mode: Option<FileMode>,
}

impl DependencyFile {
    /// Create a regular UTF-8 file in the root directory
    pub fn new(name: impl Into<String>, content: Option<String>) -> Self {
        DependencyFileBuilder {
            content,
            ..DependencyFileBuilder::new(name)
        }
        .assemble()
    }

    /// Start building a file with every option available
    pub fn builder(name: impl Into<String>) -> DependencyFileBuilder {
        DependencyFileBuilder::new(name)
    }

    /// Rebuild a file from its canonical map
    ///
    /// Missing keys take the builder defaults.
    pub fn from_canonical_map(map: CanonicalMap) -> Result<Self> {
        let fields: CanonicalFields = serde_json::from_value(Value::Object(map))?;
        fields.into_file()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Root-relative directory, always with a single leading `/`
    pub fn directory(&self) -> &str {
        &self.directory
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn is_support_file(&self) -> bool {
        self.support_file
    }

    pub fn symlink_target(&self) -> Option<&str> {
        self.symlink_target.as_deref()
    }

    pub fn content_encoding(&self) -> ContentEncoding {
        self.content_encoding
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn mode(&self) -> Option<FileMode> {
        self.mode
    }

    pub fn is_symlink(&self) -> bool {
        self.file_type == FileType::Symlink
    }

    pub fn is_submodule(&self) -> bool {
        self.file_type == FileType::Submodule
    }

    /// Legacy view of `operation == Delete`
    pub fn deleted(&self) -> bool {
        self.operation == Operation::Delete
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted()
    }

    /// Legacy mutator: `true` marks the file for deletion, `false` for update
    pub fn set_deleted(&mut self, deleted: bool) {
        self.operation = if deleted {
            Operation::Delete
        } else {
            Operation::Update
        };
    }

    /// Cleaned join of directory and name, e.g. `/sub/a.txt`
    pub fn path(&self) -> String {
        path::join(&self.directory, &self.name)
    }

    /// Repository-relative location of the content
    ///
    /// For symlinks this is where the target lives, resolved against the
    /// file's directory.
    pub fn realpath(&self) -> String {
        let full = match &self.symlink_target {
            Some(target) => path::join(&self.directory, target),
            None => self.path(),
        };
        full.trim_start_matches('/').to_string()
    }

    pub fn is_binary(&self) -> bool {
        self.content_encoding == ContentEncoding::Base64
    }

    /// Content with its transfer encoding removed
    ///
    /// Whitespace inside base64 content (GitHub wraps at 60 columns) is
    /// ignored.
    pub fn decoded_content(&self) -> Result<Option<DecodedContent<'_>>> {
        let Some(content) = self.content.as_deref() else {
            return Ok(None);
        };

        if !self.is_binary() {
            return Ok(Some(DecodedContent::Text(content)));
        }

        let compact: Vec<u8> = content
            .bytes()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        let decoded = STANDARD.decode(compact)?;
        Ok(Some(DecodedContent::Binary(Bytes::from(decoded))))
    }

    /// Serializable form used for transmission, equality and hashing
    ///
    /// Keys come out in declaration order; `symlink_target` and `mode` only
    /// when set. Rebuilding a file from this map runs construction again,
    /// so content still starting with a byte order mark after the first
    /// strip loses that one too.
    pub fn to_canonical_map(&self) -> CanonicalMap {
        let view = CanonicalView {
            name: &self.name,
            content: self.content.as_deref(),
            directory: &self.directory,
            file_type: self.file_type,
            support_file: self.support_file,
            content_encoding: self.content_encoding,
            deleted: self.deleted(),
            operation: self.operation,
            symlink_target: self.symlink_target.as_deref(),
            mode: self.mode,
        };
        match serde_json::to_value(view) {
            Ok(Value::Object(map)) => map,
            // strings, bools and unit enums always serialize to an object
            _ => Map::new(),
        }
    }

    /// Stable SHA-256 digest of the file's identity
    ///
    /// Two equal files always share a fingerprint, across processes too.
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(self.identity_json().as_bytes());
        format!("{:x}", hasher.finalize())
    }

    fn identity_map(&self) -> CanonicalMap {
        let mut map = self.to_canonical_map();
        for key in IDENTITY_EXCLUDED_KEYS {
            map.remove(*key);
        }
        map
    }

    fn identity_json(&self) -> String {
        Value::Object(self.identity_map()).to_string()
    }
}

impl PartialEq for DependencyFile {
    fn eq(&self, other: &Self) -> bool {
        self.identity_map() == other.identity_map()
    }
}

impl Eq for DependencyFile {}

impl Hash for DependencyFile {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity_json().hash(state);
    }
}

impl Serialize for DependencyFile {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_canonical_map().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DependencyFile {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        CanonicalFields::deserialize(deserializer)?
            .into_file()
            .map_err(serde::de::Error::custom)
    }
}

/// Builder for [`DependencyFile`]
///
/// # Examples
///
/// ```
/// use dependency_file::{DependencyFile, FileType};
///
/// let file = DependencyFile::builder("latest")
///     .directory("vendor")
///     .file_type(FileType::Symlink)
///     .symlink_target("v2")
///     .build()
///     .unwrap();
///
/// assert_eq!(file.path(), "/vendor/latest");
/// assert_eq!(file.realpath(), "vendor/v2");
/// ```
#[derive(Debug, Clone)]
pub struct DependencyFileBuilder {
    name: String,
    content: Option<String>,
    directory: String,
    file_type: FileType,
    support_file: bool,
    symlink_target: Option<String>,
    content_encoding: ContentEncoding,
    deleted: bool,
    operation: Operation,
    mode: Option<FileMode>,
}

impl DependencyFileBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: None,
            directory: "/".to_string(),
            file_type: FileType::default(),
            support_file: false,
            symlink_target: None,
            content_encoding: ContentEncoding::default(),
            deleted: false,
            operation: Operation::default(),
            mode: None,
        }
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Store raw bytes as base64 content
    pub fn binary_content(mut self, bytes: impl AsRef<[u8]>) -> Self {
        self.content = Some(STANDARD.encode(bytes));
        self.content_encoding = ContentEncoding::Base64;
        self
    }

    pub fn directory(mut self, directory: impl Into<String>) -> Self {
        self.directory = directory.into();
        self
    }

    pub fn file_type(mut self, file_type: FileType) -> Self {
        self.file_type = file_type;
        self
    }

    pub fn support_file(mut self, support_file: bool) -> Self {
        self.support_file = support_file;
        self
    }

    pub fn symlink_target(mut self, target: impl Into<String>) -> Self {
        self.symlink_target = Some(target.into());
        self
    }

    pub fn content_encoding(mut self, encoding: ContentEncoding) -> Self {
        self.content_encoding = encoding;
        self
    }

    /// Legacy flag. When `true` the operation becomes `Delete` whatever
    /// [`operation`](Self::operation) says
    pub fn deleted(mut self, deleted: bool) -> Self {
        self.deleted = deleted;
        self
    }

    pub fn operation(mut self, operation: Operation) -> Self {
        self.operation = operation;
        self
    }

    pub fn mode(mut self, mode: FileMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Normalize the inputs and check the symlink invariant
    pub fn build(self) -> Result<DependencyFile> {
        match (self.file_type == FileType::Symlink, self.symlink_target.is_some()) {
            (true, false) => return Err(ConfigurationError::SymlinkWithoutTarget.into()),
            (false, true) => return Err(ConfigurationError::TargetWithoutSymlink.into()),
            _ => {}
        }
        Ok(self.assemble())
    }

    fn assemble(self) -> DependencyFile {
        let directory = path::normalize_directory(&self.directory);
        if directory != self.directory {
            trace!(from = %self.directory, to = %directory, "normalized directory");
        }

        let content = match (self.content, self.content_encoding) {
            (Some(content), ContentEncoding::Utf8) => match content.strip_prefix(UTF8_BOM) {
                Some(stripped) => {
                    debug!(name = %self.name, "stripped UTF-8 byte order mark");
                    Some(stripped.to_string())
                }
                None => Some(content),
            },
            (content, _) => content,
        };

        let operation = if self.deleted {
            if self.operation != Operation::Update {
                debug!(
                    name = %self.name,
                    requested = ?self.operation,
                    "deleted flag overrides requested operation"
                );
            }
            Operation::Delete
        } else {
            self.operation
        };

        DependencyFile {
            name: self.name,
            content,
            directory,
            file_type: self.file_type,
            support_file: self.support_file,
            symlink_target: self.symlink_target,
            content_encoding: self.content_encoding,
            operation,
            mode: self.mode,
        }
    }
}

/// Borrowed canonical form; field order is the key order
#[derive(Serialize)]
struct CanonicalView<'a> {
    name: &'a str,
    content: Option<&'a str>,
    directory: &'a str,
    #[serde(rename = "type")]
    file_type: FileType,
    support_file: bool,
    content_encoding: ContentEncoding,
    deleted: bool,
    operation: Operation,
    #[serde(skip_serializing_if = "Option::is_none")]
    symlink_target: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<FileMode>,
}

fn default_directory() -> String {
    "/".to_string()
}

/// Owned mirror of the canonical map, with builder defaults for missing keys
#[derive(Deserialize)]
struct CanonicalFields {
    name: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default = "default_directory")]
    directory: String,
    #[serde(default, rename = "type")]
    file_type: FileType,
    #[serde(default)]
    support_file: bool,
    #[serde(default)]
    symlink_target: Option<String>,
    #[serde(default)]
    content_encoding: ContentEncoding,
    #[serde(default)]
    deleted: bool,
    #[serde(default)]
    operation: Operation,
    #[serde(default)]
    mode: Option<FileMode>,
}

impl CanonicalFields {
    fn into_file(self) -> Result<DependencyFile> {
        DependencyFileBuilder {
            name: self.name,
            content: self.content,
            directory: self.directory,
            file_type: self.file_type,
            support_file: self.support_file,
            symlink_target: self.symlink_target,
            content_encoding: self.content_encoding,
            deleted: self.deleted,
            operation: self.operation,
            mode: self.mode,
        }
        .build()
    }
}
