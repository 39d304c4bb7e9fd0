//! Engine release asset naming per build platform.

/// Release platform tag for an OS/architecture pair, as used in engine asset names.
pub fn platform_tag(os: &str, arch: &str) -> Option<&'static str> {
    let tag = match (os, arch) {
        ("linux", "x86_64") => "linux-64",
        ("linux", "x86") => "linux-32",
        ("linux", "aarch64") => "linux-arm64-v8a",
        ("linux", "arm") => "linux-arm32-v7a",
        ("linux", "riscv64") => "linux-riscv64",
        ("linux", "s390x") => "linux-s390x",
        ("macos", "x86_64") => "macos-64",
        ("macos", "aarch64") => "macos-arm64-v8a",
        ("freebsd", "x86_64") => "freebsd-64",
        ("windows", "x86_64") => "windows-64",
        ("windows", "aarch64") => "windows-arm64-v8a",
        _ => return None,
    };
    Some(tag)
}

/// Platform tag of the running build, falling back to `{os}-{arch}`.
pub fn current_platform_tag() -> String {
    let (os, arch) = (std::env::consts::OS, std::env::consts::ARCH);
    platform_tag(os, arch)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{os}-{arch}"))
}

/// Default engine asset name for the running build, e.g. `Xray-linux-64.zip`.
pub fn default_engine_asset() -> String {
    format!("Xray-{}.zip", current_platform_tag())
}

/// Name of the engine executable inside a release archive.
pub fn engine_archive_entry() -> &'static str {
    if cfg!(windows) {
        "xray.exe"
    } else {
        "xray"
    }
}

/// True if the asset is a zip archive that needs unpacking.
pub fn is_zip_asset(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".zip")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_platforms() {
        assert_eq!(platform_tag("linux", "x86_64"), Some("linux-64"));
        assert_eq!(platform_tag("linux", "aarch64"), Some("linux-arm64-v8a"));
        assert_eq!(platform_tag("macos", "aarch64"), Some("macos-arm64-v8a"));
    }

    #[test]
    fn test_unknown_platform() {
        assert_eq!(platform_tag("haiku", "x86_64"), None);
    }

    #[test]
    fn test_default_engine_asset_is_archive() {
        let asset = default_engine_asset();
        assert!(asset.starts_with("Xray-"));
        assert!(is_zip_asset(&asset));
    }

    #[cfg(all(target_os = "linux", target_arch = "x86_64"))]
    #[test]
    fn test_default_engine_asset_linux_64() {
        assert_eq!(default_engine_asset(), "Xray-linux-64.zip");
    }

    #[test]
    fn test_zip_detection() {
        assert!(is_zip_asset("Xray-linux-64.ZIP"));
        assert!(!is_zip_asset("Xray-linux-64"));
        assert!(!is_zip_asset("geoip.dat"));
    }
}
