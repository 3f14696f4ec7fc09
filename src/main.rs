//! Command-line entry point: bump the patch version in the generated header.

use std::path::PathBuf;

use buildstamp::{ConfigOverrides, VersionStamper, logging};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let Some(options) = parse_args(std::env::args().skip(1).collect())? else {
        return Ok(());
    };
    // Dropping the guard flushes the log file, so it lives until `run` returns.
    let _log_guard = logging::init(options.log_dir.as_deref()).unwrap_or_else(|err| {
        eprintln!("Logging disabled: {err}");
        None
    });

    VersionStamper::from_overrides(options.overrides)
        .map_err(|err| err.to_string())?
        .dry_run(options.dry_run)
        .run()
        .map_err(|err| err.to_string())?;
    Ok(())
}

#[derive(Debug, Default)]
struct Options {
    overrides: ConfigOverrides,
    log_dir: Option<PathBuf>,
    dry_run: bool,
}

fn parse_args(args: Vec<String>) -> Result<Option<Options>, String> {
    let mut options = Options::default();
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => {
                println!("{}", help_text());
                return Ok(None);
            }
            "-V" | "--version" => {
                println!("buildstamp {}", env!("CARGO_PKG_VERSION"));
                return Ok(None);
            }
            "--header" => {
                options.overrides.header_path = Some(PathBuf::from(next_value(&args, &mut idx)?));
            }
            "--base" => {
                options.overrides.base_prefix = Some(next_value(&args, &mut idx)?.to_string());
            }
            "--config" => {
                options.overrides.config_file = Some(PathBuf::from(next_value(&args, &mut idx)?));
            }
            "--log-dir" => {
                options.log_dir = Some(PathBuf::from(next_value(&args, &mut idx)?));
            }
            "--dry-run" => {
                options.dry_run = true;
            }
            unknown => return Err(format!("Unknown argument '{unknown}'\n\n{}", help_text())),
        }
        idx += 1;
    }
    Ok(Some(options))
}

fn next_value<'a>(args: &'a [String], idx: &mut usize) -> Result<&'a str, String> {
    let name = &args[*idx];
    *idx += 1;
    args.get(*idx)
        .map(String::as_str)
        .ok_or_else(|| format!("{name} requires a value"))
}

fn help_text() -> &'static str {
    "Usage: buildstamp [options]\n\n\
Bumps the patch version in a generated header and stamps the build date.\n\n\
Options:\n\
  --header <PATH>        Generated header (default: include/version.h)\n\
  --base <MAJOR.MINOR>   Prefix of the version used when no header exists (default: 3.0)\n\
  --config <FILE>        TOML settings file with `header` and `base` keys\n\
  --log-dir <DIR>        Also write a log file into DIR\n\
  --dry-run              Print the new header without writing it\n\
  -V, --version          Show version\n\
  -h, --help             Show help"
}
