//! Release asset installer.

use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

use xpanel_core::config::PanelConfig;
use xpanel_core::error::{PanelError, Result};
use xpanel_core::traits::AssetInstaller;
use xpanel_core::types::AssetKind;

use crate::github::ReleaseClient;
use crate::platform::{engine_archive_entry, is_zip_asset};

/// Where each asset kind is written on disk.
#[derive(Clone, Debug)]
pub struct InstallTargets {
    /// Engine binary path
    pub engine: PathBuf,
    /// geoip data file path
    pub geoip: PathBuf,
    /// geosite data file path
    pub geosite: PathBuf,
}

impl InstallTargets {
    /// Targets configured for the panel.
    pub fn from_panel(config: &PanelConfig) -> Self {
        Self {
            engine: config.install_path(AssetKind::Engine).to_path_buf(),
            geoip: config.install_path(AssetKind::GeoIp).to_path_buf(),
            geosite: config.install_path(AssetKind::GeoSite).to_path_buf(),
        }
    }

    /// Destination for `kind`.
    pub fn path(&self, kind: AssetKind) -> &Path {
        match kind {
            AssetKind::Engine => &self.engine,
            AssetKind::GeoIp => &self.geoip,
            AssetKind::GeoSite => &self.geosite,
        }
    }
}

/// Downloads release assets and places them atomically.
///
/// A zipped engine release is unpacked first and only its executable is written.
pub struct ReleaseInstaller {
    client: Arc<ReleaseClient>,
    targets: InstallTargets,
}

impl ReleaseInstaller {
    /// Creates an installer sharing `client` with the version listing.
    pub fn new(client: Arc<ReleaseClient>, targets: InstallTargets) -> Self {
        Self { client, targets }
    }

    /// Install destinations.
    pub fn targets(&self) -> &InstallTargets {
        &self.targets
    }
}

#[async_trait]
impl AssetInstaller for ReleaseInstaller {
    #[instrument(skip(self))]
    async fn install(&self, kind: AssetKind, version: &str) -> Result<()> {
        let failed = |reason: String| PanelError::InstallFailed {
            kind,
            version: version.to_string(),
            reason,
        };

        let asset = self.client.find_asset(kind, version).await?;
        let mut body = self.client.download(&asset).await.map_err(|e| failed(e.to_string()))?;

        if kind == AssetKind::Engine && is_zip_asset(&asset.name) {
            let entry = engine_archive_entry();
            body = tokio::task::spawn_blocking(move || extract_entry(&body, entry))
                .await
                .map_err(|e| failed(format!("unpacking {}: {e}", asset.name)))?
                .map(Bytes::from)
                .map_err(failed)?;
            debug!(entry, bytes = body.len(), "unpacked engine archive");
        }

        let target = self.targets.path(kind);
        write_atomically(target, &body, kind == AssetKind::Engine)
            .await
            .map_err(|e| failed(format!("writing {}: {e}", target.display())))?;

        info!(%kind, version, path = %target.display(), bytes = body.len(), "installed release asset");
        Ok(())
    }
}

/// Reads one file out of a zip archive held in memory.
fn extract_entry(archive: &[u8], entry: &str) -> std::result::Result<Vec<u8>, String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(archive)).map_err(|e| format!("reading archive: {e}"))?;
    let mut file = archive
        .by_name(entry)
        .map_err(|e| format!("archive entry '{entry}': {e}"))?;

    let mut data = Vec::with_capacity(usize::try_from(file.size()).unwrap_or(0));
    file.read_to_end(&mut data)
        .map_err(|e| format!("extracting '{entry}': {e}"))?;
    Ok(data)
}

/// Writes `data` next to `target` and renames it into place, so readers see
/// either the old file or the complete new one.
pub async fn write_atomically(target: &Path, data: &[u8], executable: bool) -> std::io::Result<()> {
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let file_name = target
        .file_name()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "target has no file name"))?;
    let mut tmp_name = std::ffi::OsString::from(".");
    tmp_name.push(file_name);
    tmp_name.push(".tmp");
    let tmp = target.with_file_name(tmp_name);

    let mut file = fs::File::create(&tmp).await?;
    file.write_all(data).await?;
    file.sync_all().await?;
    drop(file);

    #[cfg(unix)]
    {
        if executable {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o755)).await?;
        }
    }
    #[cfg(not(unix))]
    let _ = executable;

    if let Err(e) = fs::rename(&tmp, target).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e);
    }
    Ok(())
}
