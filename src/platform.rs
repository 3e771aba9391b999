// src/platform.rs

//! Platform resolution: OS descriptor to install/manage profile
//!
//! An immutable table keyed by (family, name) maps each supported operating
//! system to its package name, service name, config paths, and installer
//! convention. Lookup is case-sensitive on the pair as supplied; anything not
//! in the table is rejected before any other work happens.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Operating system description supplied once per resolution
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OsDescriptor {
    pub family: String,
    pub name: String,
    #[serde(default)]
    pub release_major: String,
    #[serde(default)]
    pub release_full: String,
    #[serde(default)]
    pub architecture: String,
}

/// Package manager family used to install the agent on this platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    Apt,
    Yum,
    Zypper,
    /// MSI-style installer; key/value options are passed at install time
    /// instead of being written to a config file beforehand
    WindowsInstaller,
}

/// Platform-specific naming and paths for a supported OS
#[derive(Debug, Clone, Serialize)]
pub struct PlatformProfile {
    pub package_name: &'static str,
    pub service_name: &'static str,
    pub config_dir: &'static str,
    pub log_file: &'static str,
    pub package_manager: PackageManager,
    pub uses_windows_installer: bool,
}

const LINUX_CONFIG_DIR: &str = "/etc/datadog-agent";
const LINUX_LOG_FILE: &str = "/var/log/datadog/agent.log";
const WINDOWS_CONFIG_DIR: &str = "C:/ProgramData/Datadog";
const WINDOWS_LOG_FILE: &str = "C:/ProgramData/Datadog/logs/agent.log";

fn linux_profile(package_manager: PackageManager) -> PlatformProfile {
    PlatformProfile {
        package_name: "datadog-agent",
        service_name: "datadog-agent",
        config_dir: LINUX_CONFIG_DIR,
        log_file: LINUX_LOG_FILE,
        package_manager,
        uses_windows_installer: false,
    }
}

/// Supported (family, name) pairs, built once at startup
static PLATFORMS: LazyLock<HashMap<(String, String), PlatformProfile>> = LazyLock::new(|| {
    let mut table = HashMap::new();
    let mut add = |family: &str, name: &str, profile: PlatformProfile| {
        table.insert((family.to_string(), name.to_string()), profile);
    };

    for name in [
        "RedHat",
        "CentOS",
        "Fedora",
        "Amazon",
        "Scientific",
        "OracleLinux",
        "AlmaLinux",
        "Rocky",
    ] {
        add("redhat", name, linux_profile(PackageManager::Yum));
    }

    for name in ["Debian", "Ubuntu", "Raspbian"] {
        add("debian", name, linux_profile(PackageManager::Apt));
    }

    for name in ["SLES", "OpenSuSE"] {
        add("suse", name, linux_profile(PackageManager::Zypper));
    }

    add(
        "windows",
        "Windows",
        PlatformProfile {
            package_name: "Datadog Agent",
            service_name: "datadogagent",
            config_dir: WINDOWS_CONFIG_DIR,
            log_file: WINDOWS_LOG_FILE,
            package_manager: PackageManager::WindowsInstaller,
            uses_windows_installer: true,
        },
    );

    table
});

/// Resolve an OS descriptor to its platform profile.
///
/// Fails with `UnsupportedOs` carrying the OS name verbatim when the
/// (family, name) pair is not in the table.
pub fn resolve(os: &OsDescriptor) -> Result<&'static PlatformProfile> {
    PLATFORMS
        .get(&(os.family.clone(), os.name.clone()))
        .ok_or_else(|| Error::UnsupportedOs {
            name: os.name.clone(),
        })
}

/// Refuse run-report forwarding on platforms that cannot run it.
///
/// The reporting integration shells out to tooling that does not exist on
/// Windows hosts, so the whole resolution is rejected up front.
pub fn ensure_reporting_supported(profile: &PlatformProfile) -> Result<()> {
    if profile.uses_windows_installer {
        return Err(Error::ReportingUnsupported);
    }
    Ok(())
}
