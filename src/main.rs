mod cli;

use vbrindex::{config, indexer};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "vbrindex=trace,vbrindex_mpeg=debug".to_string()
        } else {
            "vbrindex=info,vbrindex_mpeg=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Add {
            input,
            output,
            dry_run,
        } => add_file(&input, output.as_deref(), cli.config.as_deref(), dry_run),
        Commands::Scan { file, json } => scan_file(&file, json),
        Commands::Seek { file, seconds } => seek_file(&file, seconds),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
    }
}

fn add_file(
    input: &Path,
    output: Option<&Path>,
    config_path: Option<&Path>,
    dry_run: bool,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    if !input.exists() {
        anyhow::bail!("Input file does not exist: {:?}", input);
    }

    let report = indexer::add_index(input, output, &config, dry_run)?;
    let plan = &report.plan;

    println!("File: {}", input.display());
    println!("Frames: {}", report.scan.frame_count);
    println!("Duration: {}", format_duration(report.scan.duration_secs));
    println!(
        "Table: {} entries x {} frames ({} delay frames, table size {}..={})",
        plan.table_size,
        plan.frames_per_entry,
        plan.delay_frames,
        plan.min_table_size,
        plan.max_table_size
    );

    match report.summary {
        Some(summary) => {
            println!("Output: {}", report.output.display());
            println!("Written: {} bytes", summary.bytes_written);
            println!("Scale factor: {}", summary.header.scale_factor);
        }
        None => println!("Dry run: would write {}", report.output.display()),
    }

    Ok(())
}

fn scan_file(file: &Path, json: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let result = vbrindex_mpeg::scan_file(file)?;

    if json {
        let json_str = serde_json::to_string_pretty(&result)?;
        println!("{}", json_str);
    } else {
        let header = &result.first_header;
        println!("File: {}", file.display());
        println!("Size: {} bytes", result.file_size);
        println!(
            "Format: {} {}, {} Hz",
            header.version,
            header.layer,
            header.sampling_rate()
        );
        println!("Frames: {}", result.frame_count);
        println!("Duration: {}", format_duration(result.duration_secs));
        if result.bad_frames > 0 {
            println!("Bad frames: {}", result.bad_frames);
        }
        if result.skipped_bytes > 0 {
            println!("Skipped: {} bytes", result.skipped_bytes);
        }
    }

    Ok(())
}

fn seek_file(file: &Path, seconds: f64) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    match indexer::seek(file, seconds)? {
        Some((index, point)) => {
            let header = index.header();
            println!(
                "Index: {} entries x {} frames, {:.3}s per entry",
                header.entry_count,
                header.frames_per_entry,
                index.time_per_entry()
            );
            println!(
                "Seek {:.3}s -> byte {} ({:.3}s)",
                seconds,
                index.base_offset() + point.offset,
                point.time
            );
        }
        None => println!("No VBRI index in {}", file.display()),
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    println!("  Bytes per entry: {}", config.sizing.bytes_per_entry);
    println!("  Max delay frames: {}", config.sizing.max_delay_frames);
    println!("  Quality: {}", config.index.quality);
    println!("  Output suffix: {}", config.index.output_suffix);

    Ok(())
}

fn format_duration(secs: f64) -> String {
    let whole = secs as u64;
    let mins = whole / 60;
    let hours = mins / 60;
    format!(
        "{:02}:{:02}:{:02}.{:03}",
        hours,
        mins % 60,
        whole % 60,
        ((secs - whole as f64) * 1000.0) as u64
    )
}
