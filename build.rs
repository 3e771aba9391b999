// build.rs

use clap::{Arg, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: request file path
fn request_arg() -> Arg {
    Arg::new("request")
        .value_name("FILE")
        .required(true)
        .help("Path to the YAML request file")
}

fn build_cli() -> Command {
    Command::new("agentplan")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Agentplan Contributors")
        .about("Resolve Datadog agent deployment plans from declarative inputs")
        .subcommand_required(true)
        .subcommand(
            Command::new("resolve")
                .about("Resolve a deployment plan from a request file")
                .arg(request_arg())
                .arg(
                    Arg::new("out_dir")
                        .short('o')
                        .long("out-dir")
                        .value_name("DIR")
                        .help("Write datadog.yaml and install_info under this directory"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .num_args(0)
                        .help("Emit the full resolution as JSON"),
                ),
        )
        .subcommand(
            Command::new("tags")
                .about("Print the tag list a request would produce")
                .arg(request_arg())
                .arg(
                    Arg::new("legacy")
                        .long("legacy")
                        .num_args(0)
                        .help("Emit legacy comma-joined fragments"),
                ),
        )
}

fn main() -> std::io::Result<()> {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR not set"));
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir)?;

    let cmd = build_cli();
    let man = Man::new(cmd);
    let mut buffer: Vec<u8> = Vec::new();
    man.render(&mut buffer)?;
    fs::write(man_dir.join("agentplan.1"), buffer)?;

    println!("cargo:rerun-if-changed=build.rs");
    Ok(())
}
