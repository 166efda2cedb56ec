//! leap_duel: interactive entry point.

use std::io::{self, Write};

use anyhow::Result;
use clap::{Parser, ValueEnum};
use duel_sync::SessionMode;
use hand_landmarks::Mirror;
use leap_duel::app::{run, AppConfig};
use rand::Rng;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    /// Mirror hands only
    Share,
    /// Mirror hands and play rock-paper-scissors
    Duel,
}

#[derive(Parser, Debug)]
#[command(name = "leap_duel")]
#[command(about = "Hand mirroring and rock-paper-scissors over a landmark relay")]
struct Args {
    /// Relay address
    #[arg(long, default_value = "127.0.0.1:3000")]
    server: String,

    /// Name to register with the relay (prompted for when omitted)
    #[arg(short, long)]
    username: Option<String>,

    #[arg(long, value_enum, default_value = "duel")]
    mode: Mode,

    /// Show your own hand unmirrored
    #[arg(long)]
    no_mirror: bool,

    /// Skip prompts and use a generated username
    #[arg(long)]
    quick: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          Leap Duel · Rock · Paper · Scissors over TCP        ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Capture: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    println!("  Capture: Keyboard simulation  (use --features leap for hardware)");
    println!("  Relay:   {}", args.server);
    println!();

    let username = match args.username {
        Some(name) => name,
        None if args.quick => generated_name(),
        None => pick_username(),
    };

    let cfg = AppConfig {
        server: args.server,
        username,
        mode: match args.mode {
            Mode::Share => SessionMode::Share,
            Mode::Duel  => SessionMode::Duel,
        },
        mirror: if args.no_mirror { Mirror::None } else { Mirror::Horizontal },
        ..AppConfig::default()
    };

    println!("  Joining as \"{}\" ({:?} mode)", cfg.username, cfg.mode);
    println!("  Opening visualizer window…");
    println!();

    run(cfg)
}

fn generated_name() -> String {
    format!("player-{:04}", rand::rng().random_range(0..10_000u32))
}

fn pick_username() -> String {
    loop {
        let name = read_line("  Username (blank for a random one): ");
        let name = name.trim();
        if name.is_empty() {
            return generated_name();
        }
        if name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return name.to_string();
        }
        println!("    ⚠  letters, digits, '-' and '_' only.");
    }
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
