pub mod changes;
pub mod error;
pub mod file;
pub mod path;
pub mod types;

pub use changes::FileChanges;
pub use error::{ConfigurationError, FileError, Result};
pub use file::{CanonicalMap, DependencyFile, DependencyFileBuilder};
pub use types::{ContentEncoding, DecodedContent, FileMode, FileType, Operation};
