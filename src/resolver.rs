// src/resolver.rs

//! Resolution façade
//!
//! Ties the engine together in fail-fast order: platform lookup, the
//! reporting gate, version classification, tag flattening, then config
//! assembly. Resolution is all-or-nothing: any input-rejection error aborts
//! before a partial document exists. The result is immutable; identical
//! requests resolve to byte-identical documents.

use crate::config::{AgentParams, ConfigAssembler, ConfigDocument};
use crate::error::Result;
use crate::facts::{self, Tag};
use crate::install::{self, InstallInfo, InstallMethod};
use crate::platform::{self, OsDescriptor, PlatformProfile};
use crate::version::{self, AgentVersion, DEFAULT_MAJOR_VERSION};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use tracing::{debug, info, warn};

/// Everything a single resolution needs, supplied once by the caller
#[derive(Debug, Clone, Deserialize)]
pub struct ResolveRequest {
    pub os: OsDescriptor,
    #[serde(default)]
    pub params: AgentParams,
    /// General host fact tree
    #[serde(default)]
    pub facts: Value,
    /// Fact tree delivered through the higher-integrity channel
    #[serde(default)]
    pub trusted_facts: Value,
    /// Install metadata passed through unchanged; defaults to this tool's own
    #[serde(default)]
    pub install_method: Option<InstallMethod>,
}

/// The resolved deployment plan
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub profile: &'static PlatformProfile,
    /// Package resource name (flavor-adjusted on non-Windows platforms)
    pub package_name: String,
    pub service_name: String,
    /// Version the package resource pins to (`installed` on Windows, where
    /// pinning goes through the installer instead)
    pub package_pin: String,
    pub major_version: u32,
    /// Package-repository channel, e.g. `stable 7`
    pub repo_channel: String,
    pub tags: Vec<Tag>,
    pub document: ConfigDocument,
    /// Deterministic YAML rendering of `document`
    pub rendered: String,
    pub install_info: InstallInfo,
    /// Ordered installer option list, Windows targets only
    pub installer_options: Option<Vec<String>>,
    /// Deprecation notices collected during assembly
    pub notices: Vec<String>,
}

/// Resolve a request into a deployment plan.
pub fn resolve(request: &ResolveRequest) -> Result<Resolution> {
    let profile = platform::resolve(&request.os)?;
    debug!(
        family = %request.os.family,
        name = %request.os.name,
        package = profile.package_name,
        "platform resolved"
    );

    if request.params.run_reports {
        platform::ensure_reporting_supported(profile)?;
    }

    let major_version = effective_major_version(&request.params)?;
    debug!(major_version, version = %request.params.agent_version, "version classified");

    let tags = facts::flatten_with_trusted(
        &request.facts,
        &request.params.facts_to_tags,
        &request.trusted_facts,
        &request.params.trusted_facts_to_tags,
    );

    let assembler = ConfigAssembler::new(profile, &request.params);
    let (document, notices) = assembler.assemble(&tags);
    for notice in &notices {
        warn!("{notice}");
    }
    let rendered = document.to_yaml()?;

    let install_info = InstallInfo::new(
        request
            .install_method
            .clone()
            .unwrap_or_else(install::default_install_method),
    );

    let package_name = if profile.uses_windows_installer {
        profile.package_name.to_string()
    } else {
        request.params.agent_flavor.clone()
    };

    let package_pin = if profile.uses_windows_installer {
        "installed".to_string()
    } else {
        request.params.agent_version.clone()
    };

    let installer_options = profile
        .uses_windows_installer
        .then(|| install::windows_install_options(&request.params, &tags));

    info!(
        os = %request.os.name,
        package = %package_name,
        major_version,
        tags = tags.len(),
        "resolved deployment plan"
    );

    Ok(Resolution {
        profile,
        package_name,
        service_name: profile.service_name.to_string(),
        package_pin,
        major_version,
        repo_channel: version::repo_channel_for(major_version),
        tags,
        document,
        rendered,
        install_info,
        installer_options,
        notices,
    })
}

/// Effective major version: explicit parameter first, then classification of
/// the version pin; a floating `latest` pin falls back to the current default
fn effective_major_version(params: &AgentParams) -> Result<u32> {
    if let Some(major) = params.agent_major_version {
        return Ok(major);
    }
    if params.agent_version == "latest" {
        return Ok(DEFAULT_MAJOR_VERSION);
    }
    Ok(AgentVersion::classify(&params.agent_version)?.major)
}
