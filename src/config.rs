// src/config.rs

//! Config assembly: layered deep merge and deterministic rendering
//!
//! The agent config document is built by layering, in strict precedence
//! order: hard defaults, platform-derived values, deprecated-field shims,
//! explicit user parameters, and arbitrary user extra-option maps. The merge
//! is a recursive deep merge: where both sides carry a map the maps merge
//! key by key, otherwise the higher-precedence side wins outright. Sibling
//! keys supplied only by lower layers survive a partial override.
//!
//! Top-level keys render in a fixed declared order (not alphabetical, not
//! merge insertion order); keys introduced only by extra options follow in
//! their own insertion order. Identical inputs always render byte-identical
//! YAML.

use crate::error::Result;
use crate::facts::{self, Tag};
use crate::platform::PlatformProfile;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// Wording of the deprecation notice emitted per legacy proxy field set
const PROXY_DEPRECATION: &str = "is only used with Agent 5. Please use agent_extra_options to set your proxy";

/// Declared top-level key order of the rendered document. Keys absent from
/// the merge are skipped; keys not listed here (extra options) come after,
/// in their insertion order.
const TOP_LEVEL_ORDER: &[&str] = &[
    "api_key",
    "confd_path",
    "cmd_port",
    "collect_ec2_tags",
    "dd_url",
    "site",
    "enable_metadata_collection",
    "dogstatsd_port",
    "statsd_forward_host",
    "statsd_forward_port",
    "log_file",
    "log_level",
    "hostname",
    "tags",
    "apm_config",
    "process_config",
    "logs_enabled",
    "logs_config",
];

/// Typed parameter set supplied by the caller.
///
/// Empty strings on optional fields mean "not supplied": the corresponding
/// keys are omitted from the document entirely, never emitted empty.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentParams {
    pub api_key: String,
    /// Hostname override; empty means the agent detects its own
    pub host: String,
    pub datadog_site: String,
    pub dd_url: String,
    pub cmd_port: u16,
    pub dogstatsd_port: u16,
    pub collect_ec2_tags: bool,
    pub enable_metadata_collection: bool,
    pub log_level: String,
    pub statsd_forward_host: String,
    pub statsd_forward_port: Option<u16>,
    pub apm_enabled: bool,
    pub apm_env: String,
    pub apm_non_local_traffic: bool,
    pub process_enabled: bool,
    pub scrub_args: bool,
    pub custom_sensitive_words: Vec<String>,
    pub logs_enabled: bool,
    pub container_collect_all: bool,

    // Deprecated agent 5 proxy settings. Any scalar type is accepted; a
    // non-empty value only produces a notice, never a document entry.
    pub proxy_host: Value,
    pub proxy_port: Value,
    pub proxy_user: Value,
    pub proxy_password: Value,

    /// Arbitrary nested overrides merged on top of the computed document
    pub agent_extra_options: Mapping,

    /// Package pin; `latest` floats
    pub agent_version: String,
    /// Explicit major version; overrides classification of `agent_version`
    pub agent_major_version: Option<u32>,
    /// Package name on non-Windows platforms
    pub agent_flavor: String,
    /// Forward run reports to Datadog (refused on Windows hosts)
    pub run_reports: bool,
    /// Enable the network-monitoring add-on in the Windows installer
    pub windows_npm_install: bool,

    pub facts_to_tags: Vec<String>,
    pub trusted_facts_to_tags: Vec<String>,
}

impl Default for AgentParams {
    fn default() -> Self {
        Self {
            api_key: "your_API_key".to_string(),
            host: String::new(),
            datadog_site: "datadoghq.com".to_string(),
            dd_url: String::new(),
            cmd_port: 5001,
            dogstatsd_port: 8125,
            collect_ec2_tags: false,
            enable_metadata_collection: true,
            log_level: "info".to_string(),
            statsd_forward_host: String::new(),
            statsd_forward_port: None,
            apm_enabled: false,
            apm_env: String::new(),
            apm_non_local_traffic: false,
            process_enabled: false,
            scrub_args: true,
            custom_sensitive_words: Vec::new(),
            logs_enabled: false,
            container_collect_all: false,
            proxy_host: Value::Null,
            proxy_port: Value::Null,
            proxy_user: Value::Null,
            proxy_password: Value::Null,
            agent_extra_options: Mapping::new(),
            agent_version: "latest".to_string(),
            agent_major_version: None,
            agent_flavor: "datadog-agent".to_string(),
            run_reports: false,
            windows_npm_install: false,
            facts_to_tags: Vec::new(),
            trusted_facts_to_tags: Vec::new(),
        }
    }
}

/// The assembled, immutable config document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConfigDocument(Mapping);

impl ConfigDocument {
    /// Render the document to YAML. Deterministic: identical documents
    /// produce byte-identical output.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.0)?)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.0
    }
}

/// Assembles the config document from the parameter set and platform profile
pub struct ConfigAssembler<'a> {
    profile: &'a PlatformProfile,
    params: &'a AgentParams,
}

impl<'a> ConfigAssembler<'a> {
    pub fn new(profile: &'a PlatformProfile, params: &'a AgentParams) -> Self {
        Self { profile, params }
    }

    /// Merge all layers and return the document plus deprecation notices.
    ///
    /// Notices are a second output channel: one per deprecated field
    /// actually supplied with a non-empty value, none otherwise.
    pub fn assemble(&self, tags: &[Tag]) -> (ConfigDocument, Vec<String>) {
        let mut doc = hard_defaults();
        deep_merge(&mut doc, &self.platform_values(tags));

        let (shims, notices) = self.deprecated_shims();
        deep_merge(&mut doc, &shims);

        deep_merge(&mut doc, &self.user_values());
        deep_merge(
            &mut doc,
            &normalize_extra_options(&self.params.agent_extra_options),
        );

        (ConfigDocument(reorder(doc)), notices)
    }

    /// Values derived from the platform profile and the flattened tag list
    fn platform_values(&self, tags: &[Tag]) -> Mapping {
        let mut m = Mapping::new();
        ins(
            &mut m,
            "confd_path",
            string(format!("{}/conf.d", self.profile.config_dir)),
        );
        ins(&mut m, "log_file", str_value(self.profile.log_file));
        if !tags.is_empty() {
            ins(&mut m, "tags", facts::tags_value(tags));
        }
        m
    }

    /// Deprecated-field compatibility layer.
    ///
    /// The agent 5 proxy settings never reach the agent 6/7 document; a
    /// non-empty value only yields a user-visible notice pointing at
    /// `agent_extra_options`.
    fn deprecated_shims(&self) -> (Mapping, Vec<String>) {
        let fields = [
            ("proxy_host", &self.params.proxy_host),
            ("proxy_port", &self.params.proxy_port),
            ("proxy_user", &self.params.proxy_user),
            ("proxy_password", &self.params.proxy_password),
        ];

        let notices = fields
            .iter()
            .filter(|(_, value)| deprecated_field_set(value))
            .map(|(name, _)| format!("Setting {name} {PROXY_DEPRECATION}"))
            .collect();

        (Mapping::new(), notices)
    }

    /// Values driven by explicit user parameters
    fn user_values(&self) -> Mapping {
        let p = self.params;
        let mut m = Mapping::new();

        ins(&mut m, "api_key", str_value(&p.api_key));
        ins(&mut m, "cmd_port", int(p.cmd_port));
        ins(&mut m, "collect_ec2_tags", boolean(p.collect_ec2_tags));
        ins(&mut m, "dd_url", str_value(&p.dd_url));
        ins(&mut m, "site", str_value(&p.datadog_site));
        ins(
            &mut m,
            "enable_metadata_collection",
            boolean(p.enable_metadata_collection),
        );
        ins(&mut m, "dogstatsd_port", int(p.dogstatsd_port));
        if !p.statsd_forward_host.is_empty() {
            ins(&mut m, "statsd_forward_host", str_value(&p.statsd_forward_host));
        }
        if let Some(port) = p.statsd_forward_port {
            ins(&mut m, "statsd_forward_port", int(port));
        }
        ins(&mut m, "log_level", str_value(&p.log_level));
        if !p.host.is_empty() {
            ins(&mut m, "hostname", str_value(&p.host));
        }

        let mut apm = Mapping::new();
        ins(&mut apm, "enabled", boolean(p.apm_enabled));
        ins(
            &mut apm,
            "apm_non_local_traffic",
            boolean(p.apm_non_local_traffic),
        );
        if !p.apm_env.is_empty() {
            ins(&mut apm, "env", str_value(&p.apm_env));
        }
        ins(&mut m, "apm_config", Value::Mapping(apm));

        let mut process = Mapping::new();
        ins(&mut process, "enabled", process_enabled_value(p.process_enabled));
        ins(&mut process, "scrub_args", boolean(p.scrub_args));
        ins(
            &mut process,
            "custom_sensitive_words",
            Value::Sequence(
                p.custom_sensitive_words
                    .iter()
                    .map(|w| str_value(w))
                    .collect(),
            ),
        );
        ins(&mut m, "process_config", Value::Mapping(process));

        ins(&mut m, "logs_enabled", boolean(p.logs_enabled));
        let mut logs = Mapping::new();
        ins(
            &mut logs,
            "container_collect_all",
            boolean(p.container_collect_all),
        );
        ins(&mut m, "logs_config", Value::Mapping(logs));

        m
    }
}

/// Hard defaults, independent of any caller input
fn hard_defaults() -> Mapping {
    let defaults = AgentParams::default();
    let mut m = Mapping::new();

    ins(&mut m, "api_key", str_value(&defaults.api_key));
    ins(&mut m, "cmd_port", int(defaults.cmd_port));
    ins(&mut m, "collect_ec2_tags", boolean(defaults.collect_ec2_tags));
    ins(&mut m, "dd_url", str_value(&defaults.dd_url));
    ins(&mut m, "site", str_value(&defaults.datadog_site));
    ins(
        &mut m,
        "enable_metadata_collection",
        boolean(defaults.enable_metadata_collection),
    );
    ins(&mut m, "dogstatsd_port", int(defaults.dogstatsd_port));
    ins(&mut m, "log_level", str_value(&defaults.log_level));

    let mut apm = Mapping::new();
    ins(&mut apm, "enabled", boolean(false));
    ins(&mut apm, "apm_non_local_traffic", boolean(false));
    ins(&mut m, "apm_config", Value::Mapping(apm));

    let mut process = Mapping::new();
    ins(&mut process, "enabled", process_enabled_value(false));
    ins(&mut process, "scrub_args", boolean(true));
    ins(&mut process, "custom_sensitive_words", Value::Sequence(Vec::new()));
    ins(&mut m, "process_config", Value::Mapping(process));

    ins(&mut m, "logs_enabled", boolean(false));
    let mut logs = Mapping::new();
    ins(&mut logs, "container_collect_all", boolean(false));
    ins(&mut m, "logs_config", Value::Mapping(logs));

    m
}

/// Recursive deep merge: where both sides carry maps, merge key by key;
/// otherwise the overlay wins outright. Keys new to the base append after
/// its existing keys, preserving base key positions.
pub fn deep_merge(base: &mut Mapping, overlay: &Mapping) {
    for (key, value) in overlay {
        if let (Some(Value::Mapping(base_map)), Value::Mapping(overlay_map)) =
            (base.get_mut(key), value)
        {
            deep_merge(base_map, overlay_map);
            continue;
        }
        // Replacing an existing key keeps its position; new keys append
        base.insert(key.clone(), value.clone());
    }
}

/// Boolean-as-string quoting rule, applied to the extra-options layer only:
/// feature `enabled` flags carry boolean words as strings so they render
/// quoted. A raw boolean supplied through extra options for such a key is
/// converted to its string form before the merge; everything else passes
/// through untouched. Typed booleans built by the computed layers (e.g.
/// `apm_config.enabled`) stay bare.
fn normalize_extra_options(options: &Mapping) -> Mapping {
    let mut out = Mapping::new();
    for (key, value) in options {
        out.insert(key.clone(), normalize_extra_value(key, value));
    }
    out
}

fn normalize_extra_value(key: &Value, value: &Value) -> Value {
    match (key.as_str(), value) {
        (Some("enabled"), Value::Bool(b)) => string(b.to_string()),
        (_, Value::Mapping(map)) => Value::Mapping(normalize_extra_options(map)),
        _ => value.clone(),
    }
}

/// Rebuild the merged mapping in the declared top-level order, appending
/// any remaining keys in their insertion order
fn reorder(mut merged: Mapping) -> Mapping {
    let mut out = Mapping::new();
    for key in TOP_LEVEL_ORDER {
        if let Some(value) = merged.remove(*key) {
            out.insert(Value::from(*key), value);
        }
    }
    for (key, value) in merged {
        out.insert(key, value);
    }
    out
}

/// Tri-state `process_config.enabled` encoding: the feature is either
/// `disabled` or the string `"true"`/`"false"`, never a bare boolean
fn process_enabled_value(enabled: bool) -> Value {
    if enabled {
        string("true")
    } else {
        string("disabled")
    }
}

/// A deprecated field counts as set only when it carries a non-empty value
fn deprecated_field_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn ins(m: &mut Mapping, key: &str, value: Value) {
    m.insert(Value::from(key), value);
}

fn string(s: impl Into<String>) -> Value {
    Value::String(s.into())
}

fn str_value(s: &str) -> Value {
    Value::String(s.to_string())
}

fn boolean(b: bool) -> Value {
    Value::Bool(b)
}

fn int(n: u16) -> Value {
    Value::Number(n.into())
}
