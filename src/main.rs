use anyhow::{Context, Result};
use clap::{value_parser, Arg, Command};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use udl_kml::{
    convert_log, ConvertConfig, OutputPattern, RunStats, TemplateSource, DEFAULT_MIN_FIX_QUALITY,
    DEFAULT_MIN_SATELLITES, DEFAULT_OUTPUT_DIR,
};

fn long_version() -> String {
    match option_env!("VERGEN_GIT_SHA") {
        Some(sha) => format!("{} ({})", env!("CARGO_PKG_VERSION"), sha),
        None => env!("CARGO_PKG_VERSION").to_string(),
    }
}

fn build_command() -> Command {
    let cmd = Command::new("UDL KML")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version())
        .about("Extracts GPS data from a User Data Log exported from a Dynon Avionics SkyView system and writes one KML file per session, suitable for viewing in Google Earth.")
        .arg(
            Arg::new("input")
                .help("User data log CSV file")
                .required(false)
                .value_parser(value_parser!(PathBuf))
                .index(1),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Enable debug output (overridden by RUST_LOG)")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output-dir")
                .long("output-dir")
                .help("Directory for KML output files")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .default_value(DEFAULT_OUTPUT_DIR),
        )
        .arg(
            Arg::new("output-pattern")
                .long("output-pattern")
                .help("Output path containing {session_number} (default: <DIR>/<input name>_{session_number}.kml)")
                .value_name("PATTERN"),
        )
        .arg(
            Arg::new("header-template")
                .long("header-template")
                .help("KML header template file with $document_name, $placemark_name and $description placeholders")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("footer-template")
                .long("footer-template")
                .help("KML footer template file")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("min-fix-quality")
                .long("min-fix-quality")
                .help("Reject rows with a lower GPS fix quality")
                .value_name("N")
                .value_parser(value_parser!(i64))
                .default_value(DEFAULT_MIN_FIX_QUALITY.to_string()),
        )
        .arg(
            Arg::new("min-satellites")
                .long("min-satellites")
                .help("Reject rows with fewer satellites")
                .value_name("N")
                .value_parser(value_parser!(i64))
                .default_value(DEFAULT_MIN_SATELLITES.to_string()),
        )
        .arg(
            Arg::new("keep-output-dir")
                .long("keep-output-dir")
                .help("Do not delete an existing output directory before converting")
                .action(clap::ArgAction::SetTrue),
        );

    #[cfg(feature = "json")]
    let cmd = cmd.arg(
        Arg::new("stats-json")
            .long("stats-json")
            .help("Print run statistics as JSON instead of the text summary")
            .action(clap::ArgAction::SetTrue),
    );

    cmd
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

fn template_source(path: Option<&PathBuf>) -> TemplateSource {
    match path {
        Some(path) => TemplateSource::File(path.clone()),
        None => TemplateSource::Builtin,
    }
}

fn build_config(matches: &clap::ArgMatches, input: &Path) -> Result<ConvertConfig> {
    let output_dir = matches
        .get_one::<PathBuf>("output-dir")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
    let min_fix_quality = matches
        .get_one::<i64>("min-fix-quality")
        .copied()
        .unwrap_or(DEFAULT_MIN_FIX_QUALITY);
    let min_satellites = matches
        .get_one::<i64>("min-satellites")
        .copied()
        .unwrap_or(DEFAULT_MIN_SATELLITES);

    let mut config = ConvertConfig::new(input)
        .with_output_dir(output_dir)
        .with_templates(
            template_source(matches.get_one::<PathBuf>("header-template")),
            template_source(matches.get_one::<PathBuf>("footer-template")),
        )
        .with_thresholds(min_fix_quality, min_satellites);

    if let Some(pattern) = matches.get_one::<String>("output-pattern") {
        let pattern = OutputPattern::new(pattern.as_str()).context("Invalid --output-pattern")?;
        config = config.with_output_pattern(pattern);
    }
    if matches.get_flag("keep-output-dir") {
        config = config.keep_existing_output();
    }

    Ok(config)
}

fn print_stats(matches: &clap::ArgMatches, stats: &RunStats) -> Result<()> {
    #[cfg(feature = "json")]
    {
        if matches.get_flag("stats-json") {
            println!("{}", serde_json::to_string_pretty(&stats.to_json())?);
            return Ok(());
        }
    }
    #[cfg(not(feature = "json"))]
    let _ = matches;

    if stats.is_empty_input() {
        println!("No sessions found; no KML files written.");
        return Ok(());
    }

    println!();
    println!("{stats}");
    Ok(())
}

fn main() -> Result<()> {
    let matches = build_command().get_matches();

    // No input provided, show help and exit
    let Some(input) = matches.get_one::<PathBuf>("input") else {
        build_command().print_help()?;
        println!();
        return Ok(());
    };

    init_tracing(matches.get_flag("debug"));

    if !input.is_file() {
        eprintln!("Error: File [{}] does not exist!", input.display());
        std::process::exit(1);
    }

    let config = build_config(&matches, input)?;
    let stats = convert_log(&config)
        .with_context(|| format!("Failed to convert {}", input.display()))?;

    print_stats(&matches, &stats)
}
