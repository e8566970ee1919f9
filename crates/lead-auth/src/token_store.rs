//! Session persistence: OS keychain, then `LEADS_AUTH__SESSION`, then
//! `~/.leads/session.json` (mode 0600).
//!
//! The session is stored as JSON in every tier.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AuthError;
use crate::session::AuthSession;

const DEFAULT_KEYRING_SERVICE: &str = "leads-cli";
const KEYRING_USER: &str = "session";
const SESSION_ENV: &str = "LEADS_AUTH__SESSION";
const SESSION_FILE_NAME: &str = "session.json";

/// Where the active session was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSource {
    Keyring,
    Env,
    File,
}

impl SessionSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Keyring => "keyring",
            Self::Env => "env",
            Self::File => "file",
        }
    }
}

/// `LEADS_KEYRING_SERVICE` overrides the service name so tests never touch
/// real credentials.
fn keyring_service() -> String {
    std::env::var("LEADS_KEYRING_SERVICE").unwrap_or_else(|_| DEFAULT_KEYRING_SERVICE.to_owned())
}

fn keyring_entry() -> Option<keyring::Entry> {
    keyring::Entry::new(&keyring_service(), KEYRING_USER).ok()
}

/// Persist a session, preferring the keychain.
///
/// # Errors
///
/// Returns `AuthError::SessionStore` if both the keychain and the file fail.
pub fn store(session: &AuthSession) -> Result<(), AuthError> {
    let json = serde_json::to_string(session)
        .map_err(|e| AuthError::SessionStore(format!("serialize session: {e}")))?;
    match keyring_entry().map(|entry| entry.set_password(&json)) {
        Some(Ok(())) => Ok(()),
        Some(Err(error)) => {
            tracing::warn!(%error, "keyring store failed; falling back to file");
            store_file(&session_path()?, &json)
        }
        None => {
            tracing::warn!("keyring unavailable; falling back to file");
            store_file(&session_path()?, &json)
        }
    }
}

/// Load the stored session, if any.
#[must_use]
pub fn load() -> Option<AuthSession> {
    load_with_source().map(|(session, _)| session)
}

/// Load the stored session together with the tier it came from.
#[must_use]
pub fn load_with_source() -> Option<(AuthSession, SessionSource)> {
    if let Some(entry) = keyring_entry()
        && let Ok(json) = entry.get_password()
        && let Some(session) = parse(&json)
    {
        return Some((session, SessionSource::Keyring));
    }

    if let Ok(json) = std::env::var(SESSION_ENV)
        && let Some(session) = parse(&json)
    {
        return Some((session, SessionSource::Env));
    }

    let path = session_path().ok()?;
    load_file(&path).map(|session| (session, SessionSource::File))
}

/// Remove the session from the keychain and the file.
///
/// # Errors
///
/// Returns `AuthError::SessionStore` if the session file cannot be removed.
pub fn delete() -> Result<(), AuthError> {
    if let Some(entry) = keyring_entry() {
        // Absent entries are fine.
        let _ = entry.delete_credential();
    }
    delete_file(&session_path()?)
}

fn parse(json: &str) -> Option<AuthSession> {
    if json.trim().is_empty() {
        return None;
    }
    match serde_json::from_str(json) {
        Ok(session) => Some(session),
        Err(error) => {
            tracing::warn!(%error, "ignoring unreadable stored session");
            None
        }
    }
}

fn session_path() -> Result<PathBuf, AuthError> {
    dirs::home_dir()
        .map(|h| h.join(".leads").join(SESSION_FILE_NAME))
        .ok_or_else(|| AuthError::SessionStore("home directory not found".into()))
}

fn store_file(path: &Path, json: &str) -> Result<(), AuthError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AuthError::SessionStore(format!("mkdir {}: {e}", parent.display())))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) = fs::set_permissions(parent, fs::Permissions::from_mode(0o700)) {
                tracing::warn!("failed to chmod 0700 {}: {e}", parent.display());
            }
        }
    }
    fs::write(path, json)
        .map_err(|e| AuthError::SessionStore(format!("write {}: {e}", path.display())))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .map_err(|e| AuthError::SessionStore(format!("chmod {}: {e}", path.display())))?;
    }
    Ok(())
}

fn load_file(path: &Path) -> Option<AuthSession> {
    fs::read_to_string(path).ok().and_then(|json| parse(&json))
}

fn delete_file(path: &Path) -> Result<(), AuthError> {
    if path.exists() {
        fs::remove_file(path)
            .map_err(|e| AuthError::SessionStore(format!("delete {}: {e}", path.display())))?;
    }
    Ok(())
}
