// src/install.rs

//! Install metadata and Windows installer options
//!
//! The install metadata record identifies which tool produced the deployment
//! and passes through the engine unchanged. On Windows targets the agent is
//! driven through an MSI-style installer, so the install-time key/value
//! options (API key, hostname, tags, feature components) are built as an
//! ordered option list instead of being written to a config file
//! pre-install.

use crate::config::AgentParams;
use crate::error::Result;
use crate::facts::Tag;
use serde::{Deserialize, Serialize};

/// Fixed-shape install metadata, serialized to `<config_dir>/install_info`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallMethod {
    pub tool: String,
    pub tool_version: String,
    pub installer_version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstallInfo {
    pub install_method: InstallMethod,
}

impl InstallInfo {
    pub fn new(install_method: InstallMethod) -> Self {
        Self { install_method }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Default install metadata for this tool's own invocations
pub fn default_install_method() -> InstallMethod {
    let version = env!("CARGO_PKG_VERSION");
    InstallMethod {
        tool: "agentplan".to_string(),
        tool_version: format!("agentplan-{version}"),
        installer_version: format!("agentplan_module-{version}"),
    }
}

/// Build the ordered Windows installer option list.
///
/// Order is fixed: the no-restart flag, the API key, the hostname (only when
/// overridden), the tag list (a literal `""` marker when empty), and the
/// ADDLOCAL component set only when the network-monitoring add-on is
/// requested.
pub fn windows_install_options(params: &AgentParams, tags: &[Tag]) -> Vec<String> {
    let mut options = vec!["/norestart".to_string()];

    options.push(format!("APIKEY={}", params.api_key));
    if !params.host.is_empty() {
        options.push(format!("HOSTNAME={}", params.host));
    }

    if tags.is_empty() {
        options.push(r#"TAGS="""#.to_string());
    } else {
        let joined: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
        options.push(format!("TAGS={}", joined.join(",")));
    }

    if params.windows_npm_install {
        options.push("ADDLOCAL=MainApplication,NPM".to_string());
    }

    options
}
