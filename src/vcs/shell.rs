//! vcs::shell
//!
//! OS convenience actions: open a working copy in the file explorer, in a
//! terminal, or its remote in a web browser.

use std::path::Path;
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};

use super::VcsError;

/// Where to open a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenTarget {
    Explorer,
    Shell,
    Browser,
}

impl std::fmt::Display for OpenTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpenTarget::Explorer => write!(f, "explorer"),
            OpenTarget::Shell => write!(f, "shell"),
            OpenTarget::Browser => write!(f, "browser"),
        }
    }
}

/// Perform an open action.
///
/// `url` is only used for [`OpenTarget::Browser`].
pub(crate) fn open(
    target: OpenTarget,
    path: &Path,
    shell: Option<&str>,
    url: Option<&str>,
) -> Result<(), VcsError> {
    match target {
        OpenTarget::Explorer => {
            if !path.is_dir() {
                return Err(VcsError::adapter(path, "folder does not exist"));
            }
            open::that_detached(path)
                .map_err(|e| VcsError::adapter(path, format!("cannot open folder: {}", e)))
        }
        OpenTarget::Shell => {
            if !path.is_dir() {
                return Err(VcsError::adapter(path, "folder does not exist"));
            }
            let (program, args) = match shell {
                Some(program) => (program.to_string(), Vec::new()),
                None => default_terminal(path),
            };
            Command::new(&program)
                .args(&args)
                .current_dir(path)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
                .map(|_| ())
                .map_err(|e| VcsError::adapter(path, format!("cannot start {}: {}", program, e)))
        }
        OpenTarget::Browser => {
            let url = url
                .and_then(browser_url)
                .ok_or_else(|| VcsError::adapter(path, "no browsable remote URL"))?;
            open::that_detached(&url)
                .map_err(|e| VcsError::adapter(path, format!("cannot open {}: {}", url, e)))
        }
    }
}

/// Platform terminal and the arguments that start it in `path`.
fn default_terminal(path: &Path) -> (String, Vec<String>) {
    if cfg!(windows) {
        (
            "cmd.exe".to_string(),
            vec!["/C".into(), "start".into(), "cmd.exe".into()],
        )
    } else if cfg!(target_os = "macos") {
        (
            "open".to_string(),
            vec!["-a".into(), "Terminal".into(), path.display().to_string()],
        )
    } else {
        let program =
            std::env::var("TERMINAL").unwrap_or_else(|_| "x-terminal-emulator".to_string());
        (program, Vec::new())
    }
}

/// Convert a remote URL into a URL a browser can show.
///
/// Handles scp-style SSH remotes and `ssh://` URLs; strips a trailing `.git`.
///
/// # Example
///
/// ```
/// use repodash::vcs::browser_url;
///
/// assert_eq!(
///     browser_url("git@github.com:org/app.git").as_deref(),
///     Some("https://github.com/org/app")
/// );
/// assert_eq!(
///     browser_url("https://svn.example.com/repos/assets").as_deref(),
///     Some("https://svn.example.com/repos/assets")
/// );
/// assert_eq!(browser_url("/srv/git/app.git"), None);
/// ```
pub fn browser_url(remote: &str) -> Option<String> {
    let remote = remote.trim();
    let url = if remote.starts_with("https://") || remote.starts_with("http://") {
        remote.to_string()
    } else if let Some(rest) = remote.strip_prefix("ssh://") {
        let rest = rest.split_once('@').map(|(_, r)| r).unwrap_or(rest);
        let (host, path) = rest.split_once('/')?;
        let host = host.split(':').next().unwrap_or(host);
        format!("https://{}/{}", host, path)
    } else if let Some((user_host, path)) = remote.split_once(':') {
        // Drive letters and URL schemes look like scp remotes.
        if user_host.len() < 2 || user_host.contains('/') || path.starts_with("//") {
            return None;
        }
        let host = user_host.split_once('@').map(|(_, h)| h).unwrap_or(user_host);
        if host.is_empty() {
            return None;
        }
        format!("https://{}/{}", host, path.trim_start_matches('/'))
    } else {
        return None;
    };

    Some(url.trim_end_matches('/').trim_end_matches(".git").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ssh_scheme_urls() {
        assert_eq!(
            browser_url("ssh://git@gitlab.example.com:2222/team/tool.git").as_deref(),
            Some("https://gitlab.example.com/team/tool")
        );
    }

    #[test]
    fn local_and_windows_paths_are_not_browsable() {
        assert_eq!(browser_url("C:/repos/app"), None);
        assert_eq!(browser_url("file:///srv/app.git"), None);
    }

    #[test]
    fn explorer_on_missing_folder_fails_cleanly() {
        let result = open(
            OpenTarget::Explorer,
            Path::new("/definitely/not/here"),
            None,
            None,
        );
        assert!(matches!(result, Err(VcsError::Adapter { .. })));
    }
}
