//! `spindle` binary: lays out, relabels and renumbers a diagram document.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use spindle::SpindleError;
use spindle_cli::{Args, error_adapter::to_reportables};

fn main() {
    miette::set_panic_hook();

    let args = Args::parse();
    init_logger(&args.log_level);

    info!(
        input = args.input,
        passes:? = args.passes;
        "Starting Spindle"
    );
    debug!(args:?; "Parsed arguments");

    if let Err(err) = spindle_cli::run(&args) {
        report_failure(&err);
        process::exit(1);
    }

    info!(output = args.output; "Diagram passes finished");
}

/// Falls back to `warn` when the requested level does not parse.
fn init_logger(requested: &str) {
    let level = LevelFilter::from_str(requested).unwrap_or_else(|_| {
        eprintln!("Unknown log level '{requested}', falling back to 'warn'");
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(level)
        .init();
}

fn report_failure(err: &SpindleError) {
    let handler = miette::GraphicalReportHandler::new();

    for reportable in to_reportables(err) {
        let mut rendered = String::new();
        if handler.render_report(&mut rendered, &reportable).is_err() {
            error!(err:%; "Spindle failed");
            continue;
        }
        error!("{rendered}");
    }
}
