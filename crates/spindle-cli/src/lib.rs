//! CLI logic for the Spindle layout tool.
//!
//! This module contains the core CLI logic: load a diagram document, let the
//! editor session settle it, run the requested passes and write the result.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, Pass};

use std::fs;

use log::info;

use spindle::{EditorSession, MemoryDiagram, SpindleError};

/// Run the Spindle CLI application
///
/// # Errors
///
/// Returns `SpindleError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Document parse errors
/// - Serialization errors
pub fn run(args: &Args) -> Result<(), SpindleError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing diagram"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;
    let mut model = MemoryDiagram::from_toml(&source)?;

    let mut session = EditorSession::new(app_config);
    let settled = session.settle(&mut model);
    info!(tasks = settled; "Import settled");

    for pass in &args.passes {
        match pass {
            Pass::Layout => {
                let report = session.run_auto_layout(&mut model);
                info!(
                    moved = report.moved,
                    rerouted = report.rerouted,
                    failed = report.failed;
                    "Layout pass done"
                );
            }
            Pass::Labels => {
                let report = session.reconcile_labels(&mut model);
                info!(placed = report.placed, failed = report.failed; "Label pass done");
            }
            Pass::Ids => {
                let renames = session.prepare_export(&mut model);
                info!(renamed = renames.len(); "Id pass done");
            }
        }
    }

    fs::write(&args.output, model.to_toml()?)?;

    info!(output_file = args.output; "Diagram written successfully");

    Ok(())
}
