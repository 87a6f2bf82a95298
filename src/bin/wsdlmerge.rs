//! wsdlmerge CLI: WSDL + alle referenzierten XSDs → eine WSDL.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use wsdlmerge::location::parse_absolute_uri;
use wsdlmerge::options::DEFAULT_TIMEOUT_SECS;
use wsdlmerge::{Location, MergeOptions};

const USAGE: &str = "Usage: wsdlmerge wsdlfile [outputfile]";

#[derive(Parser)]
#[command(
    name = "wsdlmerge",
    version,
    about = "Merge a WSDL and all imported/included XSD schemas into a single WSDL"
)]
struct Cli {
    /// WSDL file path or absolute URI
    wsdlfile: String,

    /// Output file (required if WSDLFILE is a URI)
    outputfile: Option<String>,

    /// Timeout for remote documents in seconds (0 = no timeout)
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Only print warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Also print skipped duplicates and removed directives
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn to_options(&self) -> MergeOptions {
        let timeout = (self.timeout > 0).then(|| Duration::from_secs(self.timeout));
        MergeOptions::default().with_timeout(timeout)
    }

    fn log_level(&self) -> &'static str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level());

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// `RUST_LOG` hat Vorrang vor `-q`/`-v`.
fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(filter)
        .init();
}

fn run(cli: &Cli) -> Result<(), String> {
    let destination = resolve_output_path(cli.outputfile.as_deref(), &cli.wsdlfile)?;
    // lokale Eingabe als vollständiger, kanonischer Pfad
    let source = Location::from_input(&cli.wsdlfile).map_err(|e| e.to_string())?;

    if !cli.quiet {
        println!("Processing: {source}");
        println!("Will create: {}", destination.display());
    }

    let summary = wsdlmerge::merge_with_options(&cli.wsdlfile, &destination, &cli.to_options())
        .map_err(|e| e.to_string())?;

    log::debug!(
        "merge finished: {} schemas, {} includes, {} fragments removed",
        summary.imported_schemas,
        summary.inlined_includes,
        summary.removed_fragments
    );
    Ok(())
}

/// Leitet den Output-Pfad aus der Eingabe ab.
///
/// Ein expliziter Pfad wird direkt verwendet. Sonst wird `_merged` an den
/// Dateinamen der lokalen Eingabe angehängt (`svc.wsdl` → `svc_merged.wsdl`).
/// Für einen URI als Eingabe gibt es keinen Default.
fn resolve_output_path(explicit: Option<&str>, input: &str) -> Result<PathBuf, String> {
    let is_uri = parse_absolute_uri(input).is_some();
    if let Some(path) = explicit {
        if !is_uri && !Path::new(input).is_file() {
            return Err(".wsdl file does not exist!".into());
        }
        return Ok(PathBuf::from(path));
    }
    if is_uri {
        return Err(format!("an output file is required when the input is a URI\n{USAGE}"));
    }

    let path = Path::new(input);
    if !path.is_file() {
        return Err(".wsdl file does not exist!".into());
    }
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| "invalid input path".to_string())?;
    let name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}_merged.{ext}"),
        None => format!("{stem}_merged"),
    };
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    Ok(parent.join(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("CLI parse failed")
    }

    fn existing_file(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("wsdlmerge_cli_unit_{}", process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, "<x/>").unwrap();
        path
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        assert!(Cli::try_parse_from(["wsdlmerge", "a.wsdl", "-q", "-v"]).is_err());
    }

    #[test]
    fn wsdlfile_is_required() {
        assert!(Cli::try_parse_from(["wsdlmerge"]).is_err());
    }

    #[test]
    fn timeout_maps_to_options() {
        let cli = parse_cli(&["wsdlmerge", "a.wsdl", "--timeout", "5"]);
        assert_eq!(cli.to_options().timeout(), Some(Duration::from_secs(5)));

        let cli = parse_cli(&["wsdlmerge", "a.wsdl", "--timeout", "0"]);
        assert_eq!(cli.to_options().timeout(), None);

        let cli = parse_cli(&["wsdlmerge", "a.wsdl"]);
        assert_eq!(cli.to_options().timeout(), Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)));
    }

    #[test]
    fn log_level_follows_flags() {
        assert_eq!(parse_cli(&["wsdlmerge", "a.wsdl"]).log_level(), "info");
        assert_eq!(parse_cli(&["wsdlmerge", "a.wsdl", "-q"]).log_level(), "warn");
        assert_eq!(parse_cli(&["wsdlmerge", "a.wsdl", "--verbose"]).log_level(), "debug");
    }

    #[test]
    fn default_output_appends_merged() {
        let input = existing_file("service.wsdl");
        let out = resolve_output_path(None, input.to_str().unwrap()).unwrap();
        assert_eq!(out, input.parent().unwrap().join("service_merged.wsdl"));
    }

    #[test]
    fn default_output_without_extension() {
        let input = existing_file("service");
        let out = resolve_output_path(None, input.to_str().unwrap()).unwrap();
        assert_eq!(out, input.parent().unwrap().join("service_merged"));
    }

    #[test]
    fn explicit_output_is_used() {
        let input = existing_file("explicit.wsdl");
        let out = resolve_output_path(Some("/tmp/out.wsdl"), input.to_str().unwrap()).unwrap();
        assert_eq!(out, PathBuf::from("/tmp/out.wsdl"));
    }

    #[test]
    fn missing_local_input_is_rejected() {
        let err = resolve_output_path(None, "/definitely/not/here.wsdl").unwrap_err();
        assert_eq!(err, ".wsdl file does not exist!");
        let err = resolve_output_path(Some("out.wsdl"), "/definitely/not/here.wsdl").unwrap_err();
        assert_eq!(err, ".wsdl file does not exist!");
    }

    #[test]
    fn directory_input_is_rejected() {
        let dir = existing_file("dir_input.wsdl").parent().unwrap().to_path_buf();
        let err = resolve_output_path(None, dir.to_str().unwrap()).unwrap_err();
        assert_eq!(err, ".wsdl file does not exist!");
    }

    #[test]
    fn uri_input_requires_output() {
        let err = resolve_output_path(None, "http://example.org/svc?wsdl").unwrap_err();
        assert!(err.contains(USAGE), "{err}");
        let out = resolve_output_path(Some("svc.wsdl"), "http://example.org/svc?wsdl").unwrap();
        assert_eq!(out, PathBuf::from("svc.wsdl"));
    }
}
