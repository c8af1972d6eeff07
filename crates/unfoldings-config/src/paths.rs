//! Where session files live.
//!
//! - **User config**: `~/.config/unfoldings/` (Linux), `~/Library/Application Support/unfoldings/` (macOS), `%APPDATA%\unfoldings\` (Windows)
//! - **Sessions**: `<user config>/sessions/`

use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

const APP_NAME: &str = "unfoldings";
const SESSIONS_SUBDIR: &str = "sessions";

/// User configuration directory. Falls back to `.` when the platform has
/// none.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Directory named sessions are stored in.
pub fn sessions_dir() -> PathBuf {
    user_config_dir().join(SESSIONS_SUBDIR)
}

/// Creates the sessions directory if needed.
pub fn ensure_sessions_dir() -> Result<PathBuf> {
    let dir = sessions_dir();
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| ConfigError::create_dir(&dir, e))?;
    }
    Ok(dir)
}

/// Resolves a session argument to a file path.
///
/// An existing file, or anything with a directory component or a `.toml`
/// extension, is taken as a path. A bare name maps into [`sessions_dir`].
pub fn session_path(name: &str) -> PathBuf {
    let path = PathBuf::from(name);
    let is_pathlike = path.is_file()
        || path.extension().is_some_and(|ext| ext == "toml")
        || path.components().count() > 1;
    if is_pathlike {
        path
    } else {
        sessions_dir().join(format!("{name}.toml"))
    }
}

/// Session files in `dir`, sorted by name. Empty when the directory is
/// missing or unreadable.
pub fn list_sessions_in(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut sessions: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    sessions.sort();
    sessions
}

/// Session files in [`sessions_dir`].
pub fn list_sessions() -> Vec<PathBuf> {
    list_sessions_in(&sessions_dir())
}

/// Session name of a file path (its stem).
pub fn session_name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn bare_name_goes_to_sessions_dir() {
        let path = session_path("night-walk");
        assert_eq!(path, sessions_dir().join("night-walk.toml"));
    }

    #[test]
    fn explicit_paths_kept() {
        assert_eq!(session_path("take.toml"), PathBuf::from("take.toml"));
        assert_eq!(session_path("out/take"), PathBuf::from("out/take"));
    }

    #[test]
    fn lists_only_toml() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.toml"), "").unwrap();
        std::fs::write(dir.path().join("a.toml"), "").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();
        let found = list_sessions_in(dir.path());
        let names: Vec<_> = found
            .iter()
            .filter_map(|p| session_name_from_path(p))
            .collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn missing_dir_lists_nothing() {
        assert!(list_sessions_in(Path::new("/nonexistent/unfoldings/sessions")).is_empty());
    }
}
