//! Download directory resolution

use std::ffi::OsString;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "bwilcd";
const DOWNLOADS: &str = "downloads";
const FALLBACK_DIR: &str = "bwilcd-downloads";

/// Where stock exports go.
///
/// First match wins: the command-line flag, the configured directory,
/// `$XDG_DATA_HOME/bwilcd/downloads`, `$HOME/.local/share/bwilcd/downloads`,
/// then `./bwilcd-downloads`. The same layout is used on every platform.
/// The directory is not created here.
pub fn resolve_download_dir(flag: Option<&Path>, configured: Option<&Path>) -> PathBuf {
    download_dir_from(
        flag,
        configured,
        std::env::var_os("XDG_DATA_HOME"),
        std::env::var_os("HOME"),
    )
}

fn download_dir_from(
    flag: Option<&Path>,
    configured: Option<&Path>,
    xdg_data_home: Option<OsString>,
    home: Option<OsString>,
) -> PathBuf {
    if let Some(dir) = flag.or(configured) {
        return dir.to_path_buf();
    }
    if let Some(data) = xdg_data_home.filter(|d| !d.is_empty()) {
        return PathBuf::from(data).join(APP_DIR).join(DOWNLOADS);
    }
    if let Some(home) = home.filter(|h| !h.is_empty()) {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR)
            .join(DOWNLOADS);
    }
    PathBuf::from(FALLBACK_DIR)
}
