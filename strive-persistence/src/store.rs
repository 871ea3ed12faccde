use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use strive_types::{Session, Theme};
use tracing::warn;

const TOKEN_KEY: &str = "token";
const USERNAME_KEY: &str = "username";
const PHOTO_KEY: &str = "photo";
const THEME_KEY: &str = "theme";

const ALL_KEYS: [&str; 4] = [TOKEN_KEY, USERNAME_KEY, PHOTO_KEY, THEME_KEY];

/// Durable local state: one file per key under a state directory. Keys are
/// independent; a session restores only when token and username are both
/// present. The token file is written with owner-only permissions.
#[derive(Debug, Clone)]
pub struct StateStore {
    root: PathBuf,
}

impl StateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    pub fn save_session(&self, session: &Session) -> Result<()> {
        self.save_token(&session.token)?;
        self.save_username(&session.username)?;
        self.save_photo(&session.profile_photo)?;
        Ok(())
    }

    /// Restores a session from the stored keys. Requires token and username
    /// jointly; a missing photo falls back to the default reference.
    pub fn load_session(&self) -> Option<Session> {
        let token = self.read_key(TOKEN_KEY)?;
        let username = self.read_key(USERNAME_KEY)?;
        let photo = self.read_key(PHOTO_KEY);
        Some(Session::new(token, username, photo))
    }

    pub fn save_token(&self, token: &str) -> Result<()> {
        self.write_key(TOKEN_KEY, token)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let path = self.key_path(TOKEN_KEY);
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))
                .with_context(|| format!("failed to restrict permissions on {}", path.display()))?;
        }
        Ok(())
    }

    pub fn save_username(&self, username: &str) -> Result<()> {
        self.write_key(USERNAME_KEY, username)
    }

    pub fn save_photo(&self, photo: &str) -> Result<()> {
        self.write_key(PHOTO_KEY, photo)
    }

    pub fn save_theme(&self, theme: Theme) -> Result<()> {
        self.write_key(THEME_KEY, theme.as_str())
    }

    pub fn load_theme(&self) -> Theme {
        self.read_key(THEME_KEY)
            .map(|value| Theme::parse(&value))
            .unwrap_or_default()
    }

    /// Removes every stored key. Logout performs a full wipe, theme included.
    pub fn clear_all(&self) -> Result<()> {
        for key in ALL_KEYS {
            self.remove_key(key)?;
        }
        Ok(())
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    fn read_key(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.key_path(key)) {
            Ok(value) => {
                let value = value.trim_end_matches('\n');
                if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                }
            }
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => {
                warn!("failed to read state key {}: {}", key, err);
                None
            }
        }
    }

    fn write_key(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create state dir {}", self.root.display()))?;
        let path = self.key_path(key);
        fs::write(&path, value).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    fn remove_key(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("failed to remove {}", path.display())),
        }
    }
}
