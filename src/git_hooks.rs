//! Global git `post-commit` hook that pings the trigger server.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{CelebratorError, Result};
use crate::server::TRIGGER_ADDR;

pub const HOOK_NAME: &str = "post-commit";

pub fn hooks_dir(home: &Path) -> PathBuf {
    home.join(".celebrator").join("hooks")
}

/// POSIX sh script. The request runs in a background subshell so a
/// closed app never slows down or fails a commit.
pub fn hook_script() -> String {
    format!(
        r#"#!/bin/sh
# Desktop Celebrator hook
(curl -s -X POST http://{TRIGGER_ADDR}/trigger \
    -H "Content-Type: application/json" \
    -d '{{"type": "success"}}' > /dev/null 2>&1 &)
exit 0
"#
    )
}

/// Writes the hook script into `dir` and returns its path.
pub fn write_hook(dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let hook_path = dir.join(HOOK_NAME);
    fs::write(&hook_path, hook_script())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&hook_path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&hook_path, perms)?;
    }

    Ok(hook_path)
}

/// Installs the hook under `home` and points git's global
/// `core.hooksPath` at it.
pub fn install_git_hooks(home: &Path) -> Result<String> {
    let dir = hooks_dir(home);
    let hook_path = write_hook(&dir)?;
    tracing::info!("wrote git hook to {}", hook_path.display());

    let dir_str = dir
        .to_str()
        .ok_or_else(|| CelebratorError::git_hook("hooks path is not valid UTF-8"))?;

    let output = Command::new("git")
        .args(["config", "--global", "core.hooksPath", dir_str])
        .output()
        .map_err(|e| CelebratorError::git_hook(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        tracing::warn!("git config failed: {stderr}");
        return Err(CelebratorError::git_hook(stderr));
    }

    Ok("Git hooks installed successfully".to_string())
}
