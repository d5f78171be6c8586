//! Lexical path handling. Nothing here touches the filesystem.

/// Collapse any run of leading `/` to exactly one
///
/// An empty directory becomes `/`. Everything after the leading slashes is
/// kept as given, trailing slash included.
pub fn normalize_directory(directory: &str) -> String {
    format!("/{}", directory.trim_start_matches('/'))
}

/// Join `directory` and `name` the way a shell would concatenate them,
/// then clean the result lexically
///
/// An absolute `name` stays under `directory`. Cleaning uses the
/// `path_clean` library: repeated separators collapse, `.` is dropped,
/// `..` removes the previous segment and stops at `/`, and the trailing
/// slash goes away.
pub fn join(directory: &str, name: &str) -> String {
    path_clean::clean(&format!("{}/{}", directory, name))
}
