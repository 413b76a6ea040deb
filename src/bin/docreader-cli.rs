use clap::{Arg, ArgAction, Command, value_parser};
use docreader::{ConversionStats, config::Settings};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let matches = Command::new("docreader-cli")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert a local document to Markdown")
        .arg(
            Arg::new("input")
                .help("Input file path")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .index(1),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Output file path"),
        )
        .arg(
            Arg::new("stats")
                .short('s')
                .long("stats")
                .action(ArgAction::SetTrue)
                .help("Print size-reduction statistics to stderr"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Configuration file overriding the built-in defaults"),
        )
        .get_matches();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(matches: &clap::ArgMatches) -> anyhow::Result<()> {
    let settings = Settings::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;

    let Some(input) = matches.get_one::<PathBuf>("input") else {
        anyhow::bail!("missing input path");
    };
    let original_bytes = std::fs::metadata(input)?.len();
    let markup = docreader::convert_from_path_with(input, &settings.convert_options())?;

    match matches.get_one::<PathBuf>("output") {
        Some(output_path) => {
            std::fs::write(output_path, &markup)?;
            eprintln!("Output written to: {}", output_path.display());
        }
        None => println!("{}", markup),
    }

    if matches.get_flag("stats") {
        eprintln!("{}", ConversionStats::new(original_bytes, &markup).summary());
    }
    Ok(())
}
