use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use rs_dh_arm::control_loop::{parse_intents, ControlLoop, Intent};
use rs_dh_arm::skeleton::Skeleton;
use rs_dh_arm::skeleton_presets::RobotPreset;
use rs_dh_arm::utils::{dump_chain, dump_positions};

/// Builds a DH kinematic chain and drives it from the command line.
#[derive(Parser, Debug)]
#[command(name = "rs-dh-arm", version, about, long_about = None)]
struct Cli {
    /// Built-in robot type: two or three
    #[arg(long, default_value = "two", conflicts_with = "skeleton")]
    robot: RobotPreset,

    /// Read the skeleton from this YAML file instead of using a built-in robot
    #[arg(long)]
    skeleton: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the pose of every link and finger at the bind pose
    Pose,

    /// Run the control loop from a script, one line per frame
    Run {
        /// Script file; intents on a line are separated by ';', '#' starts a comment
        #[arg(long)]
        script: PathBuf,

        /// Minimal number of frames to run; the script is padded with empty frames
        #[arg(long, default_value_t = 0)]
        frames: usize,
    },

    /// Print the skeleton as YAML
    Export,
}

fn load_skeleton(cli: &Cli) -> Result<Skeleton> {
    match &cli.skeleton {
        Some(path) => Skeleton::from_yaml_file(path)
            .with_context(|| format!("reading skeleton {}", path.display())),
        None => Ok(cli.robot.skeleton()),
    }
}

fn read_script(path: &PathBuf) -> Result<Vec<Vec<Intent>>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;
    text.lines()
        .enumerate()
        .map(|(n, line)| parse_intents(line).with_context(|| format!("script line {}", n + 1)))
        .collect()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let skeleton = load_skeleton(&cli)?;

    match &cli.command {
        Commands::Pose => {
            let control = ControlLoop::from_skeleton(&skeleton)?;
            dump_chain(control.chain());
        }
        Commands::Run { script, frames } => {
            let script = read_script(script)?;
            let mut control = ControlLoop::from_skeleton(&skeleton)?;
            let total = script.len().max(*frames);
            info!("Running {} frame(s)", total);
            for n in 0..total {
                let intents = script.get(n).map(Vec::as_slice).unwrap_or(&[]);
                control.tick(intents);
            }
            let output = control.output();
            println!(
                "Frame {}, mode {}, selected joint {}, {} snapshot(s), cursor {}{}",
                output.frame, output.mode, output.selected, output.snapshot_count, output.cursor,
                if output.moving { ", still moving" } else { "" }
            );
            dump_positions(&control.chain().positions());
            dump_chain(control.chain());
        }
        Commands::Export => {
            print!("{}", skeleton.to_yaml());
        }
    }
    Ok(())
}
