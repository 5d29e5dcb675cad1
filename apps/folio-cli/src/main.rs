use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use folio_common::{HubLayout, WorldConfig};
use folio_render::{DebugTextRenderer, MemoryCanvas};
use folio_session::{NullSink, Overlay, Session};
use folio_tools::{KeyScript, SessionInspector};
use tracing_subscriber::EnvFilter;

/// Walk to the gate, jump to it and teleport.
const DEFAULT_SCRIPT: &str =
    "0:+KeyW,2500:-KeyW,2600:+Digit4,2650:-Digit4,2700:+Enter,2750:-Enter";

#[derive(Parser)]
#[command(name = "folio-cli", about = "Headless tools for the portfolio world")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// World configuration (YAML or JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Run the world headlessly against a scripted key timeline
    Simulate {
        /// Comma separated `<ms>:+Code` / `<ms>:-Code` entries
        #[arg(short, long, default_value = DEFAULT_SCRIPT)]
        script: String,
        /// Simulated seconds after the last scripted key
        #[arg(long, default_value = "1.5")]
        tail: f32,
        /// Simulated frames per second
        #[arg(long, default_value = "60")]
        fps: u32,
        /// Print every Nth frame
        #[arg(long, default_value = "30")]
        every: u64,
        /// Use the endless corridor hub
        #[arg(long)]
        corridor: bool,
        /// List every prop and label of printed frames
        #[arg(long)]
        detailed: bool,
    },
    /// Print the effective configuration as YAML
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let mut config = match &cli.config {
        Some(path) => WorldConfig::load(path)?,
        None => WorldConfig::default(),
    };

    match cli.command {
        Commands::Info => {
            println!("folio-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", folio_common::crate_info());
            println!("input: {}", folio_input::crate_info());
            println!("kernel: {}", folio_kernel::crate_info());
            println!("stream: {}", folio_stream::crate_info());
            println!("render: {}", folio_render::crate_info());
            println!("render-wgpu: {}", folio_render_wgpu::crate_info());
            println!("scenes: {}", folio_scenes::crate_info());
            println!("session: {}", folio_session::crate_info());
            println!("tools: {}", folio_tools::crate_info());
        }
        Commands::Simulate {
            script,
            tail,
            fps,
            every,
            corridor,
            detailed,
        } => {
            if corridor {
                config.hub.layout = HubLayout::Corridor;
            }
            simulate(config, &script, tail, fps.max(1), every.max(1), detailed)?;
        }
        Commands::Config => {
            print!("{}", config.to_yaml_string()?);
        }
    }

    Ok(())
}

fn simulate(
    config: WorldConfig,
    script: &str,
    tail: f32,
    fps: u32,
    every: u64,
    detailed: bool,
) -> anyhow::Result<()> {
    let mut script = KeyScript::parse(script)?;
    let overlay = Rc::new(RefCell::new(Overlay::new(config.overlay.bubble_capacity)));
    let t0 = Instant::now();
    let mut session = Session::mount(
        config,
        overlay.clone(),
        Box::new(MemoryCanvas::new()),
        Box::new(NullSink),
        t0,
    )?;
    let renderer = if detailed {
        DebugTextRenderer::verbose()
    } else {
        DebugTextRenderer::new()
    };

    let step = Duration::from_secs(1) / fps;
    let end = script.duration() + Duration::from_secs_f32(tail.max(0.0));
    println!("Simulating {:.2}s at {fps} fps", end.as_secs_f32());

    let mut elapsed = Duration::ZERO;
    let mut last_hud = overlay.borrow().hud().to_string();
    while elapsed <= end {
        elapsed += step;
        let fed = script.advance(elapsed, session.sampler());
        if fed > 0 {
            tracing::debug!(at_ms = elapsed.as_millis() as u64, keys = fed, "script keys applied");
        }
        let text = session.frame_with(t0 + elapsed, &renderer)?;
        if session.frames() % every == 0 {
            print!("{text}");
        }
        let hud = overlay.borrow().hud().to_string();
        if hud != last_hud {
            println!("[{:>6.0} ms] HUD: {hud}", elapsed.as_secs_f32() * 1000.0);
            last_hud = hud;
        }
    }

    println!("{}", SessionInspector::summary(&session));
    println!("{}", SessionInspector::player(&session));
    for bubble in overlay.borrow().bubbles().iter() {
        println!("bubble: {bubble}");
    }
    session.unmount();
    tracing::info!(frames = session.frames(), "simulation finished");
    Ok(())
}
