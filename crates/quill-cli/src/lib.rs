//! CLI logic for the Quill scene renderer.
//!
//! Reads a TOML scene file, builds it with the selected backend and writes
//! the markup.

pub mod report;
pub mod scene;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::info;

use quill::{QuillError, backend, host::HostProfile};

/// Run the Quill CLI application
///
/// Loads the configuration, applies the `--backend` override, builds the
/// scene and writes the resulting markup to the output file.
///
/// # Errors
///
/// Returns `QuillError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed scenes and path data
/// - Glyph fonts that are invalid or not registered
pub fn run(args: &Args) -> Result<(), QuillError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing scene"
    );

    let mut app_config = config::load_config(args.config.as_ref())?;
    if let Some(backend) = args.backend {
        app_config = app_config.with_backend(backend);
    }

    // Files are rendered for an SVG capable host unless a backend is forced.
    let host = HostProfile::svg(app_config.host().user_agent().unwrap_or_default());
    let mut art = backend::select(&host, &app_config)
        .ok_or_else(|| QuillError::Config("no rendering backend available".to_string()))?;

    let (scene, fonts) = scene::load_scene(&args.input)?;
    scene::build_scene(&mut art, &scene, &fonts)?;

    fs::write(&args.output, art.to_markup())?;

    info!(output_file = args.output, backend:% = art.backend(); "Markup exported successfully");

    Ok(())
}
