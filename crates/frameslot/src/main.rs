use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::warn;

use frameslot::channel::{FrameFormat, PollConfig, StopFlag, DEFAULT_NAME};
use frameslot::logging::{self, LogLevel};
use frameslot::{DisplayConfig, DisplayLoop, WindowSink};

/// Largest accepted frame edge, in pixels. Keeps the payload size well
/// inside `usize` on every target (16384 x 16384 x 3 is under 1 GiB).
const MAX_DIMENSION: u32 = 16384;

/// View frames published into the shared-memory slot.
///
/// All defaults match the reference deployment, so a bare invocation works
/// against a standard producer. The producer may start later: the viewer
/// retries the attach until the slot appears.
#[derive(Parser, Debug)]
#[command(name = "frameslot-view", version, about = "Shared-memory frame viewer")]
struct Cli {
    /// Shared-memory object name (must match the producer).
    #[arg(long, value_name = "NAME", default_value = DEFAULT_NAME)]
    name: String,

    /// Frame width in pixels (must match the producer).
    #[arg(long, value_name = "PIXELS", default_value_t = 640,
          value_parser = clap::value_parser!(u32).range(1..=MAX_DIMENSION as i64))]
    width: u32,

    /// Frame height in pixels (must match the producer).
    #[arg(long, value_name = "PIXELS", default_value_t = 640,
          value_parser = clap::value_parser!(u32).range(1..=MAX_DIMENSION as i64))]
    height: u32,

    /// Delay between frame polls, in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 1)]
    acquire_interval_ms: u64,

    /// Delay between attach retries while the producer is absent, in
    /// milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 500)]
    attach_interval_ms: u64,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: LogLevel,
}

impl Cli {
    fn poll_config(&self) -> PollConfig {
        PollConfig {
            acquire_interval: Duration::from_millis(self.acquire_interval_ms),
            attach_interval: Duration::from_millis(self.attach_interval_ms),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.log_level);

    let stop = StopFlag::new();
    {
        let stop = stop.clone();
        if let Err(err) = ctrlc::set_handler(move || stop.stop()) {
            warn!("failed to install Ctrl-C handler: {err}");
        }
    }

    let format = FrameFormat::new(cli.width as usize, cli.height as usize, 3);
    let config = DisplayConfig {
        name: cli.name.clone(),
        format,
        poll: cli.poll_config(),
    };

    let mut sink = match WindowSink::new("frameslot (Esc or Q to quit)", format) {
        Ok(sink) => sink,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    match DisplayLoop::new(config).run(&mut sink, &stop) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
