use std::path::PathBuf;

/// Application directory name under the platform config/data roots.
const APP_DIR: &str = "folio";

/// Default API address when neither the config file nor the environment
/// names one.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

pub fn data_dir() -> PathBuf {
    // On macOS and Linux, use ~/.local/share/folio/ (XDG standard)
    // instead of macOS Application Support for consistency
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".local")
            .join("share")
            .join(APP_DIR)
    }
    #[cfg(windows)]
    {
        // Portable installs keep a data/ directory next to the executable
        if let Some(dir) = beside_exe("data") {
            return dir;
        }

        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }
}

pub fn config_dir() -> PathBuf {
    #[cfg(windows)]
    {
        if let Some(cfg) = beside_exe("config.toml") {
            if let Some(dir) = cfg.parent() {
                return dir.to_path_buf();
            }
        }
    }

    // On macOS and Linux, always use ~/.config/folio/
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join(APP_DIR)
    }

    #[cfg(windows)]
    {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }
}

#[cfg(windows)]
fn beside_exe(name: &str) -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let candidate = exe.parent()?.join(name);
    candidate.exists().then_some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_dirs_are_app_scoped() {
        assert!(config_dir().ends_with(".config/folio"));
        assert!(data_dir().ends_with(".local/share/folio"));
    }
}
