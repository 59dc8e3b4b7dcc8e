use anyhow::{Context, Result};
use chrono::Duration;
use clap::Parser;
use claque::cli::{Cli, Commands};
use claque::codec::EventCodec;
use claque::config::Config;
use claque::event::{EmbeddedEvent, Event};
use claque::session::{Session, SessionEvent};
use claque::{ConsoleBackend, defaults};
use owo_colors::OwoColorize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = load_config(cli.config.as_deref());
    let codec = EventCodec::default();

    match cli.command {
        Commands::Decode { code, json } => {
            let event = codec.decode(&code)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&event.to_embedded())?);
            } else {
                print_summary(&event);
            }
        }
        Commands::Encode { file } => {
            let event = read_event(file.as_deref())?;
            let code = codec.encode(&event)?;
            println!("{code}");
        }
        Commands::Stats { file } => {
            let event = read_event(file.as_deref())?;
            let stats = codec.stats(&event)?;
            println!("original:   {} bytes", stats.original_size);
            println!("compressed: {} bytes", stats.compressed_size);
            println!("ratio:      {:.2}", stats.ratio);
            if stats.code_length <= defaults::SHARE_CODE_BUDGET_CHARS {
                println!(
                    "code:       {} chars {}",
                    stats.code_length,
                    "(fits QR budget)".green()
                );
            } else {
                println!(
                    "code:       {} chars {}",
                    stats.code_length,
                    format!("(over the {} char QR budget)", defaults::SHARE_CODE_BUDGET_CHARS)
                        .red()
                );
            }
        }
        Commands::Simulate {
            code,
            file,
            speed,
            lead,
            mute,
        } => {
            let event = match code {
                Some(code) => codec.decode(&code)?,
                None => read_event(file.as_deref())?,
            };
            simulate(event, &config, speed, lead, mute).await;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "claque=warn",
        1 => "claque=debug",
        _ => "claque=trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Config {
    let path: PathBuf = path
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::default_path);
    Config::load_or_default(&path).with_env_overrides()
}

fn read_event(file: Option<&Path>) -> Result<Event> {
    let contents = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
            buf
        }
    };
    let embedded: EmbeddedEvent = serde_json::from_str(&contents).context("parsing event JSON")?;
    Ok(Event::from_embedded(embedded))
}

fn print_summary(event: &Event) {
    println!("{}", event.title.bold());
    if let Some(description) = &event.description {
        println!("{description}");
    }
    println!(
        "starts {} ({}), ends {}",
        event.start_time,
        event.timezone,
        event.end_time
    );
    println!();
    for action in &event.timeline {
        let offset = (action.time - event.start_time).num_seconds();
        println!("  +{:>4}s  {}  [{}]", offset, action.action, action.id.dimmed());
    }
}

async fn simulate(event: Event, config: &Config, speed: f64, lead: i64, mute: bool) {
    let origin = event.start_time - Duration::seconds(lead.max(0));
    let mut session = Session::practice(event, Box::new(ConsoleBackend), origin, speed);
    session.announcer().set_muted(mute || config.audio.muted);
    let rx = session.events();

    let printer = std::thread::spawn(move || {
        for session_event in rx {
            match session_event {
                SessionEvent::Started { at } => {
                    println!("{} at {at}", "session started".green());
                }
                SessionEvent::Announced(a) => {
                    println!("  {} {:?} {}", "»".cyan(), a.phase, a.action_id.dimmed());
                }
                SessionEvent::Finished => println!("{}", "event finished".green()),
                SessionEvent::Stopped => println!("{}", "session stopped".yellow()),
            }
        }
    });

    session.run().await;
    session.shutdown();
    drop(session); // closes the event channel so the printer exits
    if printer.join().is_err() {
        eprintln!("event printer thread panicked");
    }
}
