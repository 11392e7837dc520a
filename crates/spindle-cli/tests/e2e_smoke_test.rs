use std::{fs, path::PathBuf};

use tempfile::tempdir;

use spindle::{DiagramModel, MemoryDiagram, ids::IdNamespace};
use spindle_cli::{Args, Pass, run};

/// Collects all .toml files from a directory
fn collect_toml_files(dir: PathBuf) -> Vec<PathBuf> {
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

    // Sort for consistent test output
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

fn args_for(input: &PathBuf, output: &PathBuf) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: output.to_string_lossy().to_string(),
        passes: vec![Pass::Layout, Pass::Labels, Pass::Ids],
        config: None,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let demos = collect_toml_files(demos_path());

    assert!(!demos.is_empty(), "No demos found in demos/");

    let mut failed_demos = Vec::new();

    for demo_path in &demos {
        let output_path = temp_dir.path().join(demo_path.file_name().unwrap());

        if let Err(e) = run(&args_for(demo_path, &output_path)) {
            failed_demos.push((demo_path.clone(), e.to_string()));
            continue;
        }

        // The written document must load again and carry canonical ids only.
        let written = fs::read_to_string(&output_path).expect("Output was written");
        let model = MemoryDiagram::from_toml(&written).expect("Output parses");
        for element in model.elements() {
            let kind = element.kind();
            if kind.is_container() || kind.is_label() {
                continue;
            }
            assert!(
                IdNamespace::for_kind(kind).matches(element.id()),
                "{}: non-canonical id {}",
                demo_path.display(),
                element.id()
            );
        }
    }

    if !failed_demos.is_empty() {
        eprintln!("\nDemos that failed:");
        for (path, err) in &failed_demos {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} demo(s) failed unexpectedly", failed_demos.len());
    }

    println!("✅ All {} demos passed", demos.len());
}

#[test]
fn e2e_smoke_test_error_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let error_demos = collect_toml_files(demos_path().join("errors"));

    assert!(
        !error_demos.is_empty(),
        "No error demos found in demos/errors/"
    );

    let mut unexpectedly_succeeded = Vec::new();

    for demo_path in &error_demos {
        let output_filename = format!(
            "error_{}",
            demo_path.file_name().unwrap().to_string_lossy()
        );
        let output_path = temp_dir.path().join(output_filename);

        if run(&args_for(demo_path, &output_path)).is_ok() {
            unexpectedly_succeeded.push(demo_path.clone());
        }
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError demos that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error demo(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }
}

#[test]
fn e2e_layout_pass_only_keeps_ids() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = demos_path().join("retry_loop.toml");
    let output = temp_dir.path().join("retry_loop.toml");

    let mut args = args_for(&input, &output);
    args.passes = vec![Pass::Layout];
    run(&args).expect("Layout pass succeeds");

    let written = fs::read_to_string(&output).unwrap();
    let model = MemoryDiagram::from_toml(&written).unwrap();
    let fetch = model
        .element("Fetch".parse().unwrap())
        .expect("Original ids survive a layout-only run");
    // Spine nodes share the row's top edge at y = 250.
    assert_eq!(fetch.position().unwrap().y(), 250.0);
}
