// src/cli.rs

//! CLI definitions for agentplan
//!
//! This module contains the command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "agentplan")]
#[command(author = "Agentplan Project")]
#[command(version)]
#[command(about = "Resolve Datadog agent deployment plans from declarative inputs", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a deployment plan from a request file
    Resolve {
        /// Path to the YAML request file (os, params, facts, trusted_facts)
        request: String,

        /// Write datadog.yaml and install_info under this directory instead
        /// of only printing the plan
        #[arg(short, long)]
        out_dir: Option<String>,

        /// Emit the full resolution as JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },

    /// Print the tag list a request would produce
    Tags {
        /// Path to the YAML request file
        request: String,

        /// Emit legacy comma-joined fragments instead of a YAML list
        #[arg(long)]
        legacy: bool,
    },
}
