mod logging;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use log::debug;
use serde::Serialize;

use mothball_core::{AxisModel, OutputEvent};
use mothball_lang::{family_members, Engine, EngineConfig, Family, Scope};

/// Tick-accurate Minecraft movement sequences
#[derive(Parser)]
#[command(name = "mothball", author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a sequence and print what it outputs
    Run(RunArgs),
    /// Print the signature of a builtin
    Sig {
        name: String,
        #[arg(long)]
        vertical: bool,
    },
    /// List the builtins of a family
    Family {
        family: String,
        #[arg(long)]
        vertical: bool,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Sequence text; read from stdin when omitted
    sequence: Option<String>,
    /// Use the Y model instead of X/Z
    #[arg(long)]
    vertical: bool,
    /// Fail on the first error instead of printing it
    #[arg(long)]
    strict: bool,
    /// Skip the position/velocity readout after a silent run
    #[arg(long)]
    no_defaults: bool,
    /// Print events as JSON
    #[arg(long)]
    json: bool,
    /// JSON engine settings
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Append the final state fingerprint
    #[arg(long)]
    fingerprint: bool,
}

#[derive(Serialize)]
struct RunReport<'a> {
    events: &'a [OutputEvent],
    #[serde(skip_serializing_if = "Option::is_none")]
    fingerprint: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Run(args) => run(args),
        Commands::Sig { name, vertical } => signature(&name, axis_for(vertical)),
        Commands::Family { family, vertical } => list_family(&family, axis_for(vertical)),
    };
    if let Err(err) = result {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn axis_for(vertical: bool) -> AxisModel {
    if vertical {
        AxisModel::Vertical
    } else {
        AxisModel::Horizontal
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, String> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    debug!("loading engine config from {}", path.display());
    let text = fs::read_to_string(path).map_err(|err| format!("{}: {err}", path.display()))?;
    EngineConfig::from_json_str(&text).map_err(|err| format!("{}: {err}", path.display()))
}

fn read_sequence(arg: Option<String>, input: &mut dyn Read) -> Result<String, String> {
    if let Some(sequence) = arg {
        return Ok(sequence);
    }
    let mut text = String::new();
    input
        .read_to_string(&mut text)
        .map_err(|err| format!("failed to read the sequence from stdin: {err}"))?;
    Ok(text)
}

fn run(args: RunArgs) -> Result<(), String> {
    let config = load_config(args.config.as_deref())?;
    let sequence = read_sequence(args.sequence, &mut io::stdin())?;
    let mut engine =
        Engine::with_config(axis_for(args.vertical), config).map_err(|err| err.to_string())?;
    let events = engine
        .simulate(&sequence, !args.no_defaults, &mut Scope::new(), args.strict)
        .map_err(|err| err.to_string())?;
    let fingerprint = args.fingerprint.then(|| engine.state().fingerprint());

    if args.json {
        let report = RunReport {
            events: &events,
            fingerprint,
        };
        let text = serde_json::to_string_pretty(&report).map_err(|err| err.to_string())?;
        println!("{text}");
        return Ok(());
    }
    for event in &events {
        println!("{event}");
    }
    if let Some(fingerprint) = fingerprint {
        println!("fingerprint: {fingerprint}");
    }
    Ok(())
}

fn signature(name: &str, axis: AxisModel) -> Result<(), String> {
    let engine = Engine::new(axis);
    let signature = engine.signature(name).map_err(|err| err.to_string())?;
    println!("{signature}");
    Ok(())
}

fn list_family(text: &str, axis: AxisModel) -> Result<(), String> {
    let family = Family::parse(text).ok_or_else(|| {
        let known: Vec<&str> = Family::ALL.iter().map(|family| family.name()).collect();
        format!("unknown family '{text}' (expected one of: {})", known.join(", "))
    })?;
    for def in family_members(family, axis) {
        if def.aliases.is_empty() {
            println!("{}", def.name);
        } else {
            println!("{} ({})", def.name, def.aliases.join(", "));
        }
    }
    Ok(())
}
