//! CLI entry point for tsuzuri
//!
//! Plays a JSON script in the terminal, or checks it for problems.

use std::path::{Path, PathBuf};
use std::process;

use tsuzuri::cli;
use tsuzuri::logging::{self, DebugConfig};
use tsuzuri::{EngineConfig, FileSystemRepository, ResourceTable, ScriptRepository};

struct Options {
    script: PathBuf,
    resources: Option<PathBuf>,
    config: Option<PathBuf>,
    debug: bool,
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = &args[1];

    let result = match command.as_str() {
        "play" | "check" => {
            let options = match parse_options(&args[2..]) {
                Ok(options) => options,
                Err(message) => {
                    eprintln!("Error: {message}");
                    eprintln!();
                    print_usage();
                    process::exit(1);
                }
            };
            init_logging(options.debug);
            if command == "play" {
                run_play(options).await
            } else {
                run_check(options).await
            }
        }
        "--help" | "-h" => {
            print_usage();
            return;
        }
        _ => {
            eprintln!("Error: Unknown command '{command}'");
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    if let Err(err) = result {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

fn print_usage() {
    println!("tsuzuri - Visual Novel Scene Interpreter");
    println!();
    println!("USAGE:");
    println!("    tsuzuri play <script.json> [OPTIONS]");
    println!("    tsuzuri check <script.json> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    play <file>     Play a script in the terminal");
    println!("    check <file>    Report problems in a script without playing it");
    println!("    --help, -h      Show this help message");
    println!();
    println!("OPTIONS:");
    println!("    --resources <file>    Resource table (default: resources.json next to the script)");
    println!("    --config <file>       Engine configuration JSON");
    println!("    --debug               Log interpreter activity to stderr");
    println!();
    println!("ENVIRONMENT:");
    println!("    TSUZURI_DEBUG    Same as --debug when set");
}

fn parse_options(args: &[String]) -> Result<Options, String> {
    let mut script = None;
    let mut resources = None;
    let mut config = None;
    let mut debug = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--resources" => {
                let path = iter.next().ok_or("--resources needs a file path")?;
                resources = Some(PathBuf::from(path));
            }
            "--config" => {
                let path = iter.next().ok_or("--config needs a file path")?;
                config = Some(PathBuf::from(path));
            }
            "--debug" => debug = true,
            flag if flag.starts_with("--") => return Err(format!("Unknown option '{flag}'")),
            path if script.is_none() => script = Some(PathBuf::from(path)),
            extra => return Err(format!("Unexpected argument '{extra}'")),
        }
    }

    Ok(Options {
        script: script.ok_or("Missing script file path")?,
        resources,
        config,
        debug,
    })
}

fn init_logging(debug: bool) {
    let mut config = DebugConfig::default();
    if debug {
        config.enabled = true;
        config = config.all_categories();
    }
    if let Err(err) = logging::init(config) {
        eprintln!("Warning: logging unavailable: {err}");
    }
}

fn open_repository(options: &Options) -> anyhow::Result<(FileSystemRepository, String)> {
    let (mut repository, id) = FileSystemRepository::for_script(&options.script)?;
    if let Some(resources) = &options.resources {
        repository = repository.with_catalog_path(resources);
    }
    Ok((repository, id))
}

async fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let content = tokio::fs::read_to_string(path).await?;
    Ok(EngineConfig::from_json(&content)?)
}

async fn run_play(options: Options) -> anyhow::Result<()> {
    let (repository, id) = open_repository(&options)?;
    let script = repository.load_script(&id).await?;
    let catalog = repository.load_catalog().await?;
    let config = load_config(options.config.as_deref()).await?;

    cli::play::run_play(script, catalog, config, options.debug).await
}

async fn run_check(options: Options) -> anyhow::Result<()> {
    let (repository, id) = open_repository(&options)?;
    let script = repository.load_script(&id).await?;
    let catalog = repository.load_catalog().await?;

    // An absent resource table means ids are literal assets, not unknown characters
    let resources: Option<&dyn ResourceTable> = if catalog.is_empty() {
        None
    } else {
        Some(&catalog)
    };
    let report = tsuzuri::check(&script, resources);
    print!("{}", cli::check::format_report(&id, &report));

    if report.has_errors() {
        process::exit(2);
    }
    Ok(())
}
