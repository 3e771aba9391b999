// src/commands.rs

//! Command implementations for the agentplan CLI

use agentplan::{facts, resolver, writer, ResolveRequest, LEGACY_TAGS_HEADER};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Load and deserialize a YAML request file
fn load_request(path: &str) -> Result<ResolveRequest> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read request file: {path}"))?;
    serde_yaml::from_str(&raw).with_context(|| format!("Failed to parse request file: {path}"))
}

/// Resolve a deployment plan and print (or write) it
pub fn cmd_resolve(request_path: &str, out_dir: Option<&str>, json: bool) -> Result<()> {
    let request = load_request(request_path)?;
    let resolution = resolver::resolve(&request)?;

    for notice in &resolution.notices {
        eprintln!("notice: {notice}");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
    } else {
        println!("package:  {} ({})", resolution.package_name, resolution.package_pin);
        println!("service:  {}", resolution.service_name);
        println!("channel:  {}", resolution.repo_channel);
        if let Some(options) = &resolution.installer_options {
            println!("installer options: {}", options.join(" "));
        }
        println!();
        print!("{}", resolution.rendered);
    }

    if let Some(dir) = out_dir {
        writer::write_plan(&resolution, Path::new(dir))?;
        eprintln!("wrote plan under {dir}");
    }

    Ok(())
}

/// Print the tags a request would produce, in either serialized form
pub fn cmd_tags(request_path: &str, legacy: bool) -> Result<()> {
    let request = load_request(request_path)?;
    let tags = facts::flatten_with_trusted(
        &request.facts,
        &request.params.facts_to_tags,
        &request.trusted_facts,
        &request.params.trusted_facts_to_tags,
    );

    if legacy {
        let mut line = LEGACY_TAGS_HEADER.to_string();
        for tag in &tags {
            line.push_str(&tag.legacy_fragment());
        }
        println!("{line}");
    } else {
        println!("tags:");
        for tag in &tags {
            println!("- {tag}");
        }
    }

    Ok(())
}
