use crate::classify::DEFAULT_MAX_BYTES;
use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use log::LevelFilter;
use std::path::PathBuf;

pub struct Config {
    /// Local directory or git URL.
    pub repo: Option<String>,
    /// `None` means `<tmp>/<repo name>.html`.
    pub output_path: Option<PathBuf>,
    pub open_browser: bool,
    pub max_bytes: u64,
    pub verbosity: u8,
    #[cfg(feature = "restore")]
    pub restore_input: Option<PathBuf>,
    #[cfg(feature = "restore")]
    pub restore_path: Option<PathBuf>,
}

impl Config {
    /// Defaults for rendering `repo`, with browser opening turned off.
    pub fn for_repo(repo: impl Into<String>) -> Self {
        Self {
            repo: Some(repo.into()),
            output_path: None,
            open_browser: false,
            max_bytes: DEFAULT_MAX_BYTES,
            verbosity: 0,
            #[cfg(feature = "restore")]
            restore_input: None,
            #[cfg(feature = "restore")]
            restore_path: None,
        }
    }
}

fn command() -> Command {
    let repo = Arg::new("repo")
        .value_name("REPO")
        .help("Git URL or local directory to flatten");
    #[cfg(feature = "restore")]
    let repo = repo.required_unless_present("restore");
    #[cfg(not(feature = "restore"))]
    let repo = repo.required(true);

    let cmd = Command::new("repo2html")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Flattens a repository into one HTML page with a human view and an LLM view")
        .arg(repo)
        .arg(
            Arg::new("out")
                .short('o')
                .long("out")
                .value_name("FILE")
                .help("Output HTML path (default: <tmp>/<repo>.html)")
                .num_args(1),
        )
        .arg(
            Arg::new("no-open")
                .long("no-open")
                .action(ArgAction::SetTrue)
                .help("Do not open the result in a browser"),
        )
        .arg(
            Arg::new("max-bytes")
                .long("max-bytes")
                .value_name("BYTES")
                .value_parser(value_parser!(u64))
                .default_value("51200")
                .help("Skip files larger than this many bytes"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("More logging (-v debug, -vv trace)"),
        );

    #[cfg(feature = "restore")]
    let cmd = cmd
        .arg(
            Arg::new("restore")
                .long("restore")
                .value_name("FILE")
                .help("Restore files from a generated page or LLM document")
                .num_args(1),
        )
        .arg(
            Arg::new("restore-path")
                .long("restore-path")
                .value_name("DIR")
                .requires("restore")
                .help("Directory to restore into (default: current directory)")
                .num_args(1),
        );

    cmd
}

fn config_from_matches(matches: &ArgMatches) -> Result<Config> {
    let max_bytes = *matches
        .get_one::<u64>("max-bytes")
        .context("missing --max-bytes default")?;

    Ok(Config {
        repo: matches.get_one::<String>("repo").cloned(),
        output_path: matches.get_one::<String>("out").map(PathBuf::from),
        open_browser: !matches.get_flag("no-open"),
        max_bytes,
        verbosity: matches.get_count("verbose"),
        #[cfg(feature = "restore")]
        restore_input: matches.get_one::<String>("restore").map(PathBuf::from),
        #[cfg(feature = "restore")]
        restore_path: matches.get_one::<String>("restore-path").map(PathBuf::from),
    })
}

pub fn parse_args() -> Result<Config> {
    config_from_matches(&command().get_matches())
}

/// Installs the env_logger backend. `RUST_LOG` still overrides.
pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .parse_default_env()
        .init();
}
