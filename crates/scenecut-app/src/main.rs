//! SceneCut - scene-cut detection to EDL
//!
//! Entry point: argument parsing, configuration, logging and dispatch.

mod cli;
mod config;
mod pipeline;

use anyhow::{Context, Result};
use clap::Parser;
use scenecut_media::{tools::find_binary, MediaTools, SequencePattern, SourceInfo};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};
use config::AppConfig;
use pipeline::RunOutput;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref())?;

    // Initialize logging
    let level = match (cli.quiet, cli.verbose) {
        (true, _) => "warn".to_string(),
        (false, 0) => config.log_level.clone(),
        (false, 1) => "debug".to_string(),
        (false, _) => "trace".to_string(),
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!(version = env!("CARGO_PKG_VERSION"), "SceneCut starting");

    match cli.command {
        Commands::Detect(args) => {
            config.apply_detect_args(&args);
            let output = pipeline::detect_video(&config, &args.video, &args.run.output, args.run.json)
                .with_context(|| format!("Detection failed for {}", args.video.display()))?;
            report(&output);
        }
        Commands::Scan(args) => {
            config.apply_run_options(&args.run);
            let pattern = SequencePattern::new(&args.dir, &args.stem)
                .with_digits(args.digits)
                .with_extension(&args.extension);
            let name = args.name.as_deref().unwrap_or(&args.stem);
            let output = pipeline::scan_sequence(
                &config,
                pattern,
                args.fps,
                &args.start,
                name,
                &args.run.output,
                args.run.json,
            )
            .with_context(|| format!("Detection failed for {}", args.dir.display()))?;
            report(&output);
        }
        Commands::Probe(args) => {
            let tools = MediaTools::resolve(&config.tools)?;
            let info = SourceInfo::probe(&tools.ffprobe, &args.video)?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Commands::Doctor => doctor(&config),
    }

    Ok(())
}

fn report(output: &RunOutput) {
    println!("Frames analyzed: {}", output.frames);
    println!("Cuts detected:   {}", output.cuts.len());
    for cut in &output.cuts {
        println!("  {cut}");
    }
    println!("Trace: {}", output.trace.display());
    println!("EDL:   {}", output.edl.display());
    if let Some(json) = &output.json {
        println!("JSON:  {}", json.display());
    }
}

fn doctor(config: &AppConfig) {
    let entries = [
        ("ffmpeg", config.tools.ffmpeg.as_deref()),
        ("ffprobe", config.tools.ffprobe.as_deref()),
    ];
    for (name, configured) in entries {
        match find_binary(name, configured) {
            Ok(path) => {
                let version = MediaTools::version(&path).unwrap_or_else(|e| format!("({e})"));
                println!("{name:8} {}  {version}", path.display());
            }
            Err(e) => println!("{name:8} {e}"),
        }
    }
    match AppConfig::default_path() {
        Some(path) if path.is_file() => println!("config   {}", path.display()),
        Some(path) => println!("config   {} (not present, using defaults)", path.display()),
        None => println!("config   no config directory on this platform"),
    }
}
