// Tab rail platform paths
// Only the configuration directory is needed: the coordinator keeps no state on disk.

use std::env;
use std::path::PathBuf;

const APP_DIR_UNIX: &str = "tabrail";
#[cfg(any(target_os = "macos", target_os = "windows"))]
const APP_DIR_DESKTOP: &str = "TabRail";

/// Returns the platform-specific configuration directory.
///
/// - **Linux** (and other Unix): `$XDG_CONFIG_HOME/tabrail`, else `~/.config/tabrail`
/// - **macOS**: `~/Library/Application Support/TabRail`
/// - **Windows**: `%APPDATA%/TabRail`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        home_dir()
            .join("Library")
            .join("Application Support")
            .join(APP_DIR_DESKTOP)
    }
    #[cfg(target_os = "windows")]
    {
        let appdata = env::var("APPDATA")
            .unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Roaming"));
        PathBuf::from(appdata).join(APP_DIR_DESKTOP)
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        match env::var("XDG_CONFIG_HOME") {
            Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join(APP_DIR_UNIX),
            _ => home_dir().join(".config").join(APP_DIR_UNIX),
        }
    }
}

#[cfg(not(target_os = "windows"))]
fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}
