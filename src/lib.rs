// src/lib.rs

//! Agentplan — deployment resolution engine for the Datadog agent
//!
//! Resolves a declarative set of deployment inputs (OS descriptor, version
//! pin, typed parameters, host facts) into a compatibility decision and a
//! deterministic merged config document.
//!
//! # Architecture
//!
//! - Pure engine: a resolution is a synchronous computation over an
//!   immutable input snapshot; no I/O, no shared mutable state
//! - Fail fast: unsupported OS, bad version strings, and platform-gated
//!   features reject the whole resolution before any partial output
//! - Deterministic output: fixed declared key order and stable YAML
//!   quoting make identical inputs render byte-identical documents
//! - Thin collaborators: file writing stays in `writer`; package and
//!   service managers consume the resolved names and options

pub mod config;
mod error;
pub mod facts;
pub mod install;
pub mod platform;
pub mod resolver;
pub mod version;
pub mod writer;

pub use config::{deep_merge, AgentParams, ConfigAssembler, ConfigDocument};
pub use error::{Error, Result};
pub use facts::{flatten, flatten_with_trusted, Tag, LEGACY_TAGS_HEADER};
pub use install::{windows_install_options, InstallInfo, InstallMethod};
pub use platform::{OsDescriptor, PackageManager, PlatformProfile};
pub use resolver::{resolve, Resolution, ResolveRequest};
pub use version::{repo_channel_for, AgentVersion, DEFAULT_MAJOR_VERSION};
