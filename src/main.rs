use std::env;
use std::error::Error;
use std::io::{self, Write};
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use overlap::{OverlapConfig, PlainTextDirSource, run};

const USAGE: &str = "usage: overlap <submissions-dir> <references-dir> [config.yaml]";

fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let (submissions, references, config) = match args.as_slice() {
        [subs, refs] => (subs, refs, None),
        [subs, refs, config] => (subs, refs, Some(config)),
        _ => {
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    match execute(submissions, references, config.map(String::as_str)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            let mut source = err.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn execute(
    submissions: &str,
    references: &str,
    config: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let cfg = match config {
        Some(path) => OverlapConfig::from_file(path)?,
        None => OverlapConfig::default(),
    };
    let report = run(
        &PlainTextDirSource::new(submissions),
        &PlainTextDirSource::new(references),
        &cfg,
    )?;

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &report)?;
    writeln!(stdout)?;
    Ok(())
}

/// Logs go to stderr so stdout stays a clean JSON report. `RUST_LOG`
/// filters; `OVERLAP_LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let json = env::var("OVERLAP_LOG_FORMAT")
        .is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
