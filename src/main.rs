mod cli;

use ebmlcast::{config, listen, split};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "ebmlcast=trace,ebmlcast_media=trace,ebmlcast_ebml=trace".to_string()
        } else {
            "ebmlcast=info,ebmlcast_media=info,ebmlcast_ebml=warn".to_string()
        }
    });

    // Logs go to stderr so `split --json` output stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Split {
            input,
            out_dir,
            durations,
            redact_timecodes,
            buffer_size,
            json,
        } => {
            let options = SplitOptions {
                out_dir,
                durations,
                redact_timecodes,
                buffer_size,
                json,
            };
            split_file(&input, cli.config.as_deref(), options)
        }
        Commands::Listen {
            host,
            port,
            out_dir,
            durations,
        } => {
            let mut config = config::load_config_or_default(cli.config.as_deref())?;

            // Override listen settings from CLI if specified
            if let Some(host) = host {
                config.listen.host = host;
            }
            if let Some(port) = port {
                config.listen.port = port;
            }
            if let Some(dir) = out_dir {
                config.output.dir = dir;
            }
            if durations {
                config.stream.compute_durations = true;
            }

            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(listen::serve(
                &config.listen.host,
                config.listen.port,
                config.stream,
                &config.output.dir,
                config.output.chunk_size,
            ))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("ebmlcast {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

struct SplitOptions {
    out_dir: Option<PathBuf>,
    durations: bool,
    redact_timecodes: bool,
    buffer_size: Option<i64>,
    json: bool,
}

fn split_file(input: &Path, config_path: Option<&Path>, options: SplitOptions) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    let mut stream_config = config.stream.clone();
    if let Some(size) = options.buffer_size {
        stream_config = stream_config.try_buffer_capacity(size)?;
    }
    if options.durations {
        stream_config = stream_config.compute_durations(true);
    }
    if options.redact_timecodes {
        stream_config = stream_config.redact_timecodes(true);
    }

    let out_dir = options.out_dir.unwrap_or(config.output.dir);
    let manifest = split::split_path(input, stream_config, config.output.chunk_size, &out_dir)?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&manifest)?);
        return Ok(());
    }

    println!("Output: {}", out_dir.display());
    println!("Bytes read: {}", manifest.total_bytes);
    for entry in &manifest.segments {
        match (entry.timecode, entry.duration) {
            (Some(timecode), Some(duration)) => println!(
                "  {} ({} bytes, timecode {}, duration {})",
                entry.file, entry.size, timecode, duration
            ),
            _ => println!("  {} ({} bytes)", entry.file, entry.size),
        }
    }
    println!(
        "{} initialization, {} media segments",
        manifest.init_count(),
        manifest.media_count()
    );

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(path)?;

    println!("Configuration is valid");
    println!("  Buffer capacity: {} bytes", config.stream.buffer_capacity);
    println!("  Compute durations: {}", config.stream.compute_durations);
    println!("  Redact timecodes: {}", config.stream.redact_timecodes);
    println!("  Listen: {}:{}", config.listen.host, config.listen.port);
    println!("  Output: {}", config.output.dir.display());
    println!("  Chunk size: {} bytes", config.output.chunk_size);

    Ok(())
}
