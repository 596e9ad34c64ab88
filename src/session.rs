use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::state::Theme;

const CACHE_DIR: &str = "wc26_pool";
const SESSION_FILE: &str = "session.json";
const SESSION_VERSION: u32 = 1;

/// What survives a restart: the auth token and the chosen theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    version: u32,
    pub token: Option<String>,
    #[serde(default)]
    pub theme: Theme,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            version: SESSION_VERSION,
            token: None,
            theme: Theme::default(),
        }
    }
}

pub fn load_session() -> Session {
    session_path()
        .map(|path| load_session_from(&path))
        .unwrap_or_default()
}

pub fn save_session(session: &Session) -> Result<()> {
    let Some(path) = session_path() else {
        return Ok(());
    };
    save_session_to(&path, session)
}

/// A missing, unreadable or outdated file yields a fresh session.
pub fn load_session_from(path: &Path) -> Session {
    let Ok(raw) = fs::read_to_string(path) else {
        return Session::default();
    };
    match serde_json::from_str::<Session>(&raw) {
        Ok(session) if session.version == SESSION_VERSION => session,
        _ => Session::default(),
    }
}

pub fn save_session_to(path: &Path, session: &Session) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).context("create session dir")?;
    }
    let mut session = session.clone();
    session.version = SESSION_VERSION;
    let json = serde_json::to_string(&session).context("serialize session")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).context("write session")?;
    fs::rename(&tmp, path).context("swap session")?;
    Ok(())
}

pub fn app_cache_dir() -> Option<PathBuf> {
    // Prefer XDG cache.
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

fn session_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(SESSION_FILE))
}
