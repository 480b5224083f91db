use std::{io::Write, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use commander::{ControllerConfig, Interrupt, Pilot, Sequencer, SessionReport};
use keyboard::Keyboard;
use log::info;

const DEFAULT_URI: &str = "udp://127.0.0.1:19850";

/// Keyboard teleoperation for a small quadrotor.
#[derive(Parser, Debug)]
#[command(name = "teleop", version)]
struct Args {
    /// Vehicle link, e.g. udp://127.0.0.1:19850 or radio://0/80/2M
    #[arg(long, default_value = DEFAULT_URI)]
    uri: String,

    /// RON file overriding the controller tuning
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fly the configured thrust profile instead of taking keyboard control
    #[arg(long)]
    scripted: bool,

    /// Read one command per line instead of single keys
    #[arg(long)]
    line_input: bool,
}

fn main() -> anyhow::Result<()> {
    init_logger();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ControllerConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ControllerConfig::default(),
    };

    let interrupt = Interrupt::new();
    let handler = interrupt.clone();
    ctrlc::set_handler(move || handler.trigger()).context("Failed to set Ctrl-C handler")?;

    let pilot = if args.scripted {
        Pilot::Scripted(config.profile.clone())
    } else {
        Pilot::Manual(Box::new(Keyboard::new(!args.line_input)))
    };
    let mut sequencer = Sequencer::new(config, interrupt)?;

    let mut link = link::connect(&args.uri)
        .with_context(|| format!("Failed to connect to {}", args.uri))?;
    info!("Connected to {}", args.uri);

    let report = sequencer.run(&mut link, pilot)?;
    print_summary(&report);
    Ok(())
}

fn init_logger() {
    // records end in \r\n so lines stay aligned while the terminal is raw
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            write!(
                buf,
                "[{} {:<5}] {}\r\n",
                buf.timestamp_millis(),
                record.level(),
                record.args()
            )
        })
        .init();
}

fn print_summary(report: &SessionReport) {
    let phases: Vec<String> = report
        .phases
        .iter()
        .map(|phase| format!("{:?}", phase))
        .collect();
    info!("Phases: {}", phases.join(" -> "));
    match report.landing_from {
        Some(thrust) => info!("Exit: {:?}, landed from thrust {}", report.exit, thrust),
        None => info!("Exit: {:?}, motors never started", report.exit),
    }
}
