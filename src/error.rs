//! Error type shared by the overlay, shortcut and hook code.
//!
//! Commands return it directly; the webviews receive the message string.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CelebratorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Window error: {0}")]
    Tauri(#[from] tauri::Error),

    /// Invalid accelerator syntax or a rejected registration.
    #[error("Shortcut error: {0}")]
    Shortcut(String),

    /// Shown to the user as-is.
    #[error("{0}")]
    GitHook(String),

    #[error("Lock error: {0}")]
    Lock(String),
}

impl CelebratorError {
    pub fn shortcut(msg: impl Into<String>) -> Self {
        Self::Shortcut(msg.into())
    }

    pub fn git_hook(msg: impl Into<String>) -> Self {
        Self::GitHook(msg.into())
    }

    pub fn lock(msg: impl Into<String>) -> Self {
        Self::Lock(msg.into())
    }
}

impl serde::Serialize for CelebratorError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CelebratorError>;

#[cfg(test)]
mod tests {
    use super::CelebratorError;

    #[test]
    fn serializes_as_message() {
        let json = serde_json::to_string(&CelebratorError::shortcut("bad key")).unwrap();
        assert_eq!(json, "\"Shortcut error: bad key\"");
    }

    #[test]
    fn git_hook_message_is_unprefixed() {
        let json = serde_json::to_string(&CelebratorError::git_hook("not a git install")).unwrap();
        assert_eq!(json, "\"not a git install\"");
    }
}
