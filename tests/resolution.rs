// tests/resolution.rs

//! End-to-end resolution tests: platform dispatch, version autodetection,
//! document rendering, tag ordering, installer options, and the writer
//! collaborator.

use agentplan::{
    resolve, AgentParams, InstallMethod, OsDescriptor, Resolution, ResolveRequest,
};
use serde_yaml::{Mapping, Value};

fn os(family: &str, name: &str, major: &str, full: &str) -> OsDescriptor {
    OsDescriptor {
        family: family.to_string(),
        name: name.to_string(),
        release_major: major.to_string(),
        release_full: full.to_string(),
        architecture: "x86_64".to_string(),
    }
}

fn ubuntu_request(params: AgentParams) -> ResolveRequest {
    ResolveRequest {
        os: os("debian", "Ubuntu", "14", "14.04"),
        params,
        facts: Value::Null,
        trusted_facts: Value::Null,
        install_method: None,
    }
}

fn resolve_ubuntu(params: AgentParams) -> Resolution {
    resolve(&ubuntu_request(params)).unwrap()
}

#[test]
fn test_unsupported_operating_system() {
    let request = ResolveRequest {
        os: os("Solaris", "Nexenta", "3", "3.0"),
        params: AgentParams::default(),
        facts: Value::Null,
        trusted_facts: Value::Null,
        install_method: None,
    };
    let err = resolve(&request).unwrap_err();
    assert_eq!(err.to_string(), "Unsupported operating system: Nexenta");
}

#[test]
fn test_autodetect_major_version() {
    for (version, channel) in [
        ("6.15.1", "stable 6"),
        ("7.15.1", "stable 7"),
        ("1:6.15.1~rc.1-1", "stable 6"),
        ("1:6.15.1-rc.1-1", "stable 6"),
        ("1:6.15.1-1", "stable 6"),
    ] {
        let params = AgentParams {
            agent_version: version.to_string(),
            ..Default::default()
        };
        let resolution = resolve_ubuntu(params);
        assert_eq!(resolution.repo_channel, channel, "version {version}");
    }
}

#[test]
fn test_default_agent_flavor_pins_raw_version() {
    let params = AgentParams {
        agent_version: "1:6.15.1-1".to_string(),
        ..Default::default()
    };
    let resolution = resolve_ubuntu(params);
    assert_eq!(resolution.package_name, "datadog-agent");
    assert_eq!(resolution.package_pin, "1:6.15.1-1");
}

#[test]
fn test_specified_agent_flavor() {
    let params = AgentParams {
        agent_version: "1:6.15.1-1".to_string(),
        agent_flavor: "datadog-iot-agent".to_string(),
        ..Default::default()
    };
    let resolution = resolve_ubuntu(params);
    assert_eq!(resolution.package_name, "datadog-iot-agent");
    assert_eq!(resolution.package_pin, "1:6.15.1-1");
}

#[test]
fn test_windows_npm_installer_options() {
    let params = AgentParams {
        agent_major_version: Some(7),
        windows_npm_install: true,
        api_key: "notakey".to_string(),
        host: "notahost".to_string(),
        ..Default::default()
    };
    let request = ResolveRequest {
        os: os("windows", "Windows", "2019", "2019 SP1"),
        params,
        facts: Value::Null,
        trusted_facts: Value::Null,
        install_method: None,
    };
    let resolution = resolve(&request).unwrap();

    assert_eq!(resolution.package_name, "Datadog Agent");
    assert_eq!(resolution.package_pin, "installed");
    assert_eq!(
        resolution.installer_options.as_deref().unwrap(),
        [
            "/norestart",
            "APIKEY=notakey",
            "HOSTNAME=notahost",
            r#"TAGS="""#,
            "ADDLOCAL=MainApplication,NPM",
        ]
    );
}

#[test]
fn test_windows_without_npm_has_no_addlocal() {
    let params = AgentParams {
        agent_major_version: Some(7),
        api_key: "notakey".to_string(),
        host: "notahost".to_string(),
        ..Default::default()
    };
    let request = ResolveRequest {
        os: os("windows", "Windows", "2019", "2019 SP1"),
        params,
        facts: Value::Null,
        trusted_facts: Value::Null,
        install_method: None,
    };
    let resolution = resolve(&request).unwrap();
    assert_eq!(
        resolution.installer_options.as_deref().unwrap(),
        ["/norestart", "APIKEY=notakey", "HOSTNAME=notahost", r#"TAGS="""#]
    );
}

#[test]
fn test_reports_raise_on_windows() {
    let params = AgentParams {
        run_reports: true,
        ..Default::default()
    };
    let request = ResolveRequest {
        os: os("windows", "Windows", "2019", "2019 SP1"),
        params,
        facts: Value::Null,
        trusted_facts: Value::Null,
        install_method: None,
    };
    let err = resolve(&request).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Reporting is not yet supported from a Windows host"
    );
}

#[test]
fn test_reports_allowed_elsewhere() {
    let params = AgentParams {
        run_reports: true,
        ..Default::default()
    };
    assert!(resolve(&ubuntu_request(params)).is_ok());
}

#[test]
fn test_service_names_per_platform() {
    let linux = resolve_ubuntu(AgentParams::default());
    assert_eq!(linux.service_name, "datadog-agent");

    let request = ResolveRequest {
        os: os("windows", "Windows", "2019", "2019 SP1"),
        params: AgentParams::default(),
        facts: Value::Null,
        trusted_facts: Value::Null,
        install_method: None,
    };
    let windows = resolve(&request).unwrap();
    assert_eq!(windows.service_name, "datadogagent");
    assert_eq!(
        windows.document.get("confd_path").and_then(Value::as_str),
        Some("C:/ProgramData/Datadog/conf.d")
    );
    assert_eq!(
        windows.document.get("log_file").and_then(Value::as_str),
        Some("C:/ProgramData/Datadog/logs/agent.log")
    );
}

#[test]
fn test_default_document_content() {
    let resolution = resolve_ubuntu(AgentParams::default());
    let yaml = &resolution.rendered;

    assert!(yaml.starts_with("api_key: your_API_key\n"));
    assert!(yaml.contains("\nconfd_path: /etc/datadog-agent/conf.d\n"));
    assert!(yaml.contains("\ncmd_port: 5001\n"));
    assert!(yaml.contains("\ncollect_ec2_tags: false\n"));
    assert!(yaml.contains("\ndd_url: ''\n"));
    assert!(yaml.contains("\nsite: datadoghq.com\n"));
    assert!(yaml.contains("\nenable_metadata_collection: true\n"));
    assert!(yaml.contains("\ndogstatsd_port: 8125\n"));
    assert!(yaml.contains("\nlog_file: /var/log/datadog/agent.log\n"));
    assert!(yaml.contains("\nlog_level: info\n"));
    assert!(yaml.contains("\napm_config:\n  enabled: false\n  apm_non_local_traffic: false\n"));
    assert!(yaml.contains(
        "\nprocess_config:\n  enabled: disabled\n  scrub_args: true\n  custom_sensitive_words: []\n"
    ));
    assert!(yaml.contains("\nlogs_enabled: false\n"));
    assert!(yaml.contains("\nlogs_config:\n  container_collect_all: false\n"));

    // Omission law: unset optionals leave no trace
    assert!(!yaml.contains("hostname:"));
    assert!(!yaml.contains("statsd_forward_host:"));
    assert!(!yaml.contains("statsd_forward_port:"));
}

#[test]
fn test_modified_defaults() {
    let params = AgentParams {
        host: "my_custom_hostname".to_string(),
        collect_ec2_tags: true,
        datadog_site: "datadoghq.eu".to_string(),
        statsd_forward_host: "foo".to_string(),
        statsd_forward_port: Some(1234),
        ..Default::default()
    };
    let yaml = resolve_ubuntu(params).rendered;
    assert!(yaml.contains("\nhostname: my_custom_hostname\n"));
    assert!(yaml.contains("\ncollect_ec2_tags: true\n"));
    assert!(yaml.contains("\nsite: datadoghq.eu\n"));
    assert!(yaml.contains("\nstatsd_forward_host: foo\n"));
    assert!(yaml.contains("\nstatsd_forward_port: 1234\n"));
}

#[test]
fn test_deprecated_proxy_notices() {
    let params = AgentParams {
        proxy_host: Value::from("foo"),
        proxy_port: Value::from(1234),
        proxy_user: Value::from("bar"),
        proxy_password: Value::from("abcd1234"),
        ..Default::default()
    };
    let resolution = resolve_ubuntu(params);
    assert_eq!(resolution.notices.len(), 4);
    for field in ["proxy_host", "proxy_port", "proxy_user", "proxy_password"] {
        assert!(resolution.notices.contains(&format!(
            "Setting {field} is only used with Agent 5. Please use agent_extra_options to set your proxy"
        )));
    }
}

#[test]
fn test_deprecated_proxy_defaults_are_silent() {
    let params = AgentParams {
        proxy_host: Value::from(""),
        proxy_port: Value::from(""),
        proxy_user: Value::from(""),
        proxy_password: Value::from(""),
        ..Default::default()
    };
    assert!(resolve_ubuntu(params).notices.is_empty());
}

#[test]
fn test_extra_options_with_apm_enabled() {
    let extra: Mapping = serde_yaml::from_str(
        r#"
apm_config:
  foo: bar
  bar: haz
"#,
    )
    .unwrap();
    let params = AgentParams {
        apm_enabled: true,
        apm_env: "foo".to_string(),
        agent_extra_options: extra,
        ..Default::default()
    };
    let yaml = resolve_ubuntu(params).rendered;
    assert!(yaml.contains("\napm_config:\n  enabled: true\n"));
    assert!(yaml.contains("\n  foo: bar\n"));
    assert!(yaml.contains("\n  bar: haz\n"));
}

#[test]
fn test_extra_options_with_process_enabled() {
    let extra: Mapping = serde_yaml::from_str(
        r#"
process_config:
  foo: bar
  bar: haz
"#,
    )
    .unwrap();
    let params = AgentParams {
        process_enabled: true,
        agent_extra_options: extra,
        ..Default::default()
    };
    let yaml = resolve_ubuntu(params).rendered;
    assert!(yaml.contains("\napm_config:\n  enabled: false\n"));
    assert!(yaml.contains("\nprocess_config:\n  enabled: 'true'\n"));
    assert!(yaml.contains("\n  foo: bar\n"));
    assert!(yaml.contains("\n  bar: haz\n"));
}

#[test]
fn test_extra_options_override_process_enabled() {
    let extra: Mapping = serde_yaml::from_str(
        r#"
process_config:
  enabled: disabled
  foo: bar
"#,
    )
    .unwrap();
    let params = AgentParams {
        process_enabled: true,
        agent_extra_options: extra,
        ..Default::default()
    };
    let yaml = resolve_ubuntu(params).rendered;
    assert!(yaml.contains("\nprocess_config:\n  enabled: disabled\n"));
    assert!(yaml.contains("\n  foo: bar\n"));
}

#[test]
fn test_data_scrubbing_options() {
    let disabled = AgentParams {
        process_enabled: true,
        scrub_args: false,
        ..Default::default()
    };
    let yaml = resolve_ubuntu(disabled).rendered;
    assert!(yaml.contains("\nprocess_config:\n  enabled: 'true'\n  scrub_args: false\n"));

    let custom_words = AgentParams {
        process_enabled: true,
        custom_sensitive_words: vec!["dd_key".to_string()],
        ..Default::default()
    };
    let yaml = resolve_ubuntu(custom_words).rendered;
    assert!(yaml.contains("\n  scrub_args: true\n"));
    assert!(yaml.contains("\n  custom_sensitive_words:\n  - dd_key\n"));
}

#[test]
fn test_logs_options() {
    let params = AgentParams {
        logs_enabled: true,
        container_collect_all: true,
        ..Default::default()
    };
    let yaml = resolve_ubuntu(params).rendered;
    assert!(yaml.contains("\nlogs_enabled: true\n"));
    assert!(yaml.contains("\nlogs_config:\n  container_collect_all: true\n"));
}

#[test]
fn test_facts_to_tags_ordering() {
    let facts: Value = serde_yaml::from_str(
        r#"
facts_array:
  - one
  - two
facts_hash:
  actor:
    first_name: Macaulay
    last_name: Culkin
looks.like.a.path: but_its_not
os:
  family: redhat
  name: CentOS
"#,
    )
    .unwrap();
    let params = AgentParams {
        agent_major_version: Some(6),
        facts_to_tags: vec![
            "os.family".to_string(),
            "facts_array".to_string(),
            "facts_hash.actor.first_name".to_string(),
            "looks.like.a.path".to_string(),
        ],
        ..Default::default()
    };
    let request = ResolveRequest {
        os: os("redhat", "CentOS", "6", "6.3"),
        params,
        facts,
        trusted_facts: Value::Null,
        install_method: None,
    };
    let resolution = resolve(&request).unwrap();
    assert!(resolution.rendered.contains(
        "tags:\n- os.family:redhat\n- facts_array:one\n- facts_array:two\n- facts_hash.actor.first_name:Macaulay\n- looks.like.a.path:but_its_not\n"
    ));
}

#[test]
fn test_trusted_facts_follow_general_facts() {
    let facts: Value = serde_yaml::from_str("os:\n  family: redhat\n").unwrap();
    let trusted: Value = serde_yaml::from_str(
        r#"
extensions:
  trusted_fact: test
  facts_array:
    - one
    - two
  facts_hash:
    actor:
      first_name: Macaulay
"#,
    )
    .unwrap();
    let params = AgentParams {
        agent_major_version: Some(6),
        facts_to_tags: vec!["os.family".to_string()],
        trusted_facts_to_tags: vec![
            "extensions.trusted_fact".to_string(),
            "extensions.facts_array".to_string(),
            "extensions.facts_hash.actor.first_name".to_string(),
        ],
        ..Default::default()
    };
    let request = ResolveRequest {
        os: os("redhat", "CentOS", "6", "6.3"),
        params,
        facts,
        trusted_facts: trusted,
        install_method: None,
    };
    let resolution = resolve(&request).unwrap();
    assert!(resolution.rendered.contains(
        "tags:\n- os.family:redhat\n- extensions.trusted_fact:test\n- extensions.facts_array:one\n- extensions.facts_array:two\n- extensions.facts_hash.actor.first_name:Macaulay\n"
    ));
}

#[test]
fn test_legacy_tag_fragments() {
    let facts: Value =
        serde_yaml::from_str("osfamily: redhat\nfacts_array:\n  - one\n  - two\n").unwrap();
    let params = AgentParams {
        agent_major_version: Some(5),
        facts_to_tags: vec!["osfamily".to_string(), "facts_array".to_string()],
        ..Default::default()
    };
    let request = ResolveRequest {
        os: os("redhat", "CentOS", "6", "6.3"),
        params,
        facts,
        trusted_facts: Value::Null,
        install_method: None,
    };
    let resolution = resolve(&request).unwrap();

    let fragments: Vec<String> = resolution.tags.iter().map(|t| t.legacy_fragment()).collect();
    assert_eq!(
        fragments,
        vec!["osfamily:redhat, ", "facts_array:one, ", "facts_array:two, "]
    );
    assert_eq!(agentplan::LEGACY_TAGS_HEADER, "tags: ");
}

#[test]
fn test_install_info_passthrough() {
    let mut request = ubuntu_request(AgentParams::default());
    request.install_method = Some(InstallMethod {
        tool: "puppet".to_string(),
        tool_version: "puppet-6.15.0".to_string(),
        installer_version: "datadog_module-3.13.0".to_string(),
    });
    let resolution = resolve(&request).unwrap();
    let yaml = resolution.install_info.to_yaml().unwrap();
    assert_eq!(
        yaml,
        "install_method:\n  tool: puppet\n  tool_version: puppet-6.15.0\n  installer_version: datadog_module-3.13.0\n"
    );
}

#[test]
fn test_resolution_is_deterministic() {
    let extra: Mapping = serde_yaml::from_str("apm_config:\n  foo: bar\n").unwrap();
    let params = AgentParams {
        apm_enabled: true,
        agent_extra_options: extra,
        facts_to_tags: vec!["os.family".to_string()],
        ..Default::default()
    };
    let facts: Value = serde_yaml::from_str("os:\n  family: debian\n").unwrap();
    let request = ResolveRequest {
        os: os("debian", "Ubuntu", "14", "14.04"),
        params,
        facts,
        trusted_facts: Value::Null,
        install_method: None,
    };
    let first = resolve(&request).unwrap();
    let second = resolve(&request).unwrap();
    assert_eq!(first.rendered, second.rendered);
    assert_eq!(
        first.tags.iter().map(ToString::to_string).collect::<Vec<_>>(),
        second.tags.iter().map(ToString::to_string).collect::<Vec<_>>()
    );
}

#[test]
fn test_write_plan_under_out_dir() {
    let resolution = resolve_ubuntu(AgentParams::default());
    let dir = tempfile::tempdir().unwrap();
    agentplan::writer::write_plan(&resolution, dir.path()).unwrap();

    let written = std::fs::read_to_string(dir.path().join("datadog.yaml")).unwrap();
    assert_eq!(written, resolution.rendered);
    assert!(dir.path().join("conf.d").is_dir());
    assert!(dir.path().join("install_info").is_file());
}

#[test]
fn test_request_file_deserialization() {
    let request: ResolveRequest = serde_yaml::from_str(
        r#"
os:
  family: debian
  name: Ubuntu
  release_major: "22"
  release_full: "22.04"
  architecture: x86_64
params:
  agent_version: "7.15.1"
  api_key: notakey
  facts_to_tags:
    - os.family
facts:
  os:
    family: debian
"#,
    )
    .unwrap();
    let resolution = resolve(&request).unwrap();
    assert_eq!(resolution.major_version, 7);
    assert!(resolution.rendered.starts_with("api_key: notakey\n"));
    assert!(resolution.rendered.contains("\ntags:\n- os.family:debian\n"));
}
