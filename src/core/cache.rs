//! File system helpers for the cached access token.

use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::{Read, Write},
    path::{Path, PathBuf},
};
use tracing::debug;

/// Base directory for everything duprly caches: ~/.cache/duprly
pub fn cache_base_dir() -> PathBuf {
    let base = dirs::cache_dir().unwrap_or_else(|| {
        let mut home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.push(".cache");
        home
    });
    base.join("duprly")
}

/// Path: ~/.cache/duprly/token.json
pub fn token_path() -> PathBuf {
    cache_base_dir().join("token.json")
}

/// Try to read a file into a String
pub fn try_read_to_string(path: &Path) -> Option<String> {
    let mut f = fs::File::open(path).ok()?;
    let mut s = String::new();

    f.read_to_string(&mut s).ok()?;

    Some(s)
}

/// Write a string to file
pub fn write_string(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut f = fs::File::create(path)?;
    f.write_all(contents.as_bytes())
}

/// On-disk shape of the token file.
#[derive(Debug, Serialize, Deserialize)]
struct StoredToken {
    access_token: String,
}

/// Load a previously saved access token, if the file exists and parses.
pub fn load_token(path: &Path) -> Option<String> {
    let raw = try_read_to_string(path)?;
    match serde_json::from_str::<StoredToken>(&raw) {
        Ok(stored) if !stored.access_token.is_empty() => Some(stored.access_token),
        Ok(_) => None,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "ignoring unreadable token file");
            None
        }
    }
}

/// Persist the access token as plain JSON.
pub fn save_token(path: &Path, token: &str) -> crate::Result<()> {
    let json = serde_json::to_string(&StoredToken {
        access_token: token.to_string(),
    })?;
    write_string(path, &json)?;
    Ok(())
}
