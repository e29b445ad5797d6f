use std::ffi::OsString;
use std::path::{Path, PathBuf};

#[cfg(windows)]
const ADB_BINARY: &str = "adb.exe";
#[cfg(not(windows))]
const ADB_BINARY: &str = "adb";

/// Environment variables pointing at an Android SDK, in lookup order
const SDK_ENV_VARS: [&str; 2] = ["ANDROID_SDK_ROOT", "ANDROID_HOME"];

/// Locate the adb executable.
///
/// Lookup order: explicit path, `<sdk_root>/platform-tools/adb`, the SDK
/// environment variables, then plain `adb` resolved through `PATH`.
pub fn resolve_adb(explicit: Option<&Path>, sdk_root: Option<&Path>) -> PathBuf {
    resolve_with(explicit, sdk_root, |key| std::env::var_os(key))
}

fn resolve_with<F>(explicit: Option<&Path>, sdk_root: Option<&Path>, env: F) -> PathBuf
where
    F: Fn(&str) -> Option<OsString>,
{
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    if let Some(root) = sdk_root {
        return sdk_adb(root);
    }

    SDK_ENV_VARS
        .iter()
        .filter_map(|key| env(*key))
        .filter(|value| !value.is_empty())
        .map(|value| sdk_adb(Path::new(&value)))
        .next()
        .unwrap_or_else(|| PathBuf::from(ADB_BINARY))
}

fn sdk_adb(root: &Path) -> PathBuf {
    root.join("platform-tools").join(ADB_BINARY)
}
