use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use rs_dh_arm::skeleton::Skeleton;
use rs_dh_arm::skeleton_presets::RobotPreset;
use rs_dh_arm::visualization;

/// Opens the viewer with a built-in robot or a skeleton file.
#[derive(Parser, Debug)]
#[command(name = "visualize", version, about, long_about = None)]
struct Args {
    /// Built-in robot type: two or three
    #[arg(long, default_value = "two", conflicts_with = "skeleton")]
    robot: RobotPreset,

    /// Read the skeleton from this YAML file instead
    #[arg(long)]
    skeleton: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,wgpu=warn")),
        )
        .init();

    let args = Args::parse();
    let (skeleton, preset) = match &args.skeleton {
        Some(path) => (
            Skeleton::from_yaml_file(path).with_context(|| format!("reading skeleton {}", path.display()))?,
            None,
        ),
        None => (args.robot.skeleton(), Some(args.robot)),
    };
    visualization::visualize_robot(skeleton, preset)?;
    Ok(())
}
