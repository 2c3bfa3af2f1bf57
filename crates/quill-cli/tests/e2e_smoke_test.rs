use std::{fs, path::PathBuf};

use tempfile::tempdir;

use quill::{QuillError, config::BackendChoice};
use quill_cli::{Args, run};

/// Collects all scene files from a directory
fn collect_scene_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("toml")
            })
            .collect()
    } else {
        Vec::new()
    };

    files.sort();
    files
}

fn demos_path() -> PathBuf {
    // Demos are at workspace root, relative to workspace not the crate
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

fn args(input: &str, output: &str, backend: Option<BackendChoice>) -> Args {
    Args {
        input: input.to_string(),
        output: output.to_string(),
        backend,
        config: None,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_demos_on_every_backend() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let demos = collect_scene_files(demos_path());
    assert!(!demos.is_empty(), "No demo scenes found in demos/");

    let mut failed = Vec::new();
    for backend in [BackendChoice::Svg, BackendChoice::Vml] {
        for demo in &demos {
            let output_path = temp_dir.path().join(format!(
                "{}.{backend}",
                demo.file_stem().unwrap().to_string_lossy()
            ));
            let output = output_path.to_string_lossy().to_string();

            match run(&args(&demo.to_string_lossy(), &output, Some(backend))) {
                Ok(()) => {
                    let markup = fs::read_to_string(&output_path).unwrap();
                    let root = if backend == BackendChoice::Svg {
                        "<svg"
                    } else {
                        "<vml"
                    };
                    assert!(markup.starts_with(root), "{}: {markup}", demo.display());
                }
                Err(err) => failed.push((demo.clone(), backend, err)),
            }
        }
    }

    if !failed.is_empty() {
        for (path, backend, err) in &failed {
            eprintln!("  - {} ({backend}): {err}", path.display());
        }
        panic!("{} demo render(s) failed unexpectedly", failed.len());
    }
}

#[test]
fn e2e_auto_backend_renders_svg() {
    let temp_dir = tempdir().unwrap();
    let output = temp_dir.path().join("shapes.svg");
    let input = demos_path().join("shapes.toml");

    run(&args(
        &input.to_string_lossy(),
        &output.to_string_lossy(),
        None,
    ))
    .unwrap();
    assert!(fs::read_to_string(output).unwrap().contains("<path"));
}

#[test]
fn e2e_missing_input_is_io_error() {
    let temp_dir = tempdir().unwrap();
    let input = temp_dir.path().join("absent.toml");
    let output = temp_dir.path().join("out.svg");

    let err = run(&args(
        &input.to_string_lossy(),
        &output.to_string_lossy(),
        Some(BackendChoice::Svg),
    ))
    .unwrap_err();
    assert!(matches!(err, QuillError::Io(_)));
    assert!(!output.exists());
}

#[test]
fn e2e_bad_path_reports_parse_error() {
    let temp_dir = tempdir().unwrap();
    let input = temp_dir.path().join("broken.toml");
    let output = temp_dir.path().join("out.svg");
    fs::write(
        &input,
        "width = 10\nheight = 10\n\n[[node]]\nkind = \"shape\"\npath = \"M 0 0 Q 1\"\n",
    )
    .unwrap();

    let err = run(&args(
        &input.to_string_lossy(),
        &output.to_string_lossy(),
        Some(BackendChoice::Vml),
    ))
    .unwrap_err();
    assert!(matches!(err, QuillError::Parse { .. }));
}
