use std::path::PathBuf;

use texture_lab::{Edge, Node, OperatorKind, Project, Resolution};

fn exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_texture-lab")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "texture-lab.exe"
            } else {
                "texture-lab"
            });
            p
        })
}

fn write_project(dir: &std::path::Path) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let project = Project {
        name: "smoke".to_string(),
        resolution: Resolution::new(64).unwrap(),
        nodes: vec![
            Node::new("c", OperatorKind::Circle)
                .with_params(serde_json::json!({"width": 32, "height": 32})),
            Node::new("g", OperatorKind::Glow),
            Node::new("out", OperatorKind::Output),
        ],
        edges: vec![
            Edge::new("e0", "c", "g", "in"),
            Edge::new("e1", "g", "out", "in"),
        ],
    };
    let path = dir.join("project.json");
    std::fs::write(&path, project.to_json_pretty().unwrap()).unwrap();
    path
}

#[test]
fn cli_svg_writes_document() {
    let dir = PathBuf::from("target").join("cli_smoke").join("svg");
    let project = write_project(&dir);
    let out_path = dir.join("out.svg");
    let _ = std::fs::remove_file(&out_path);

    let status = std::process::Command::new(exe())
        .args(["svg", "--in"])
        .arg(&project)
        .arg("--out")
        .arg(&out_path)
        .status()
        .unwrap();

    assert!(status.success());
    let svg = std::fs::read_to_string(&out_path).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains(r#"viewBox="0 0 64 64""#));
}

#[test]
fn cli_render_writes_png_at_export_size() {
    let dir = PathBuf::from("target").join("cli_smoke").join("render");
    let project = write_project(&dir);
    let out_path = dir.join("out.png");
    let _ = std::fs::remove_file(&out_path);

    let status = std::process::Command::new(exe())
        .args(["render", "--resolution", "512", "--in"])
        .arg(&project)
        .arg("--out")
        .arg(&out_path)
        .status()
        .unwrap();

    assert!(status.success());
    let img = image::open(&out_path).unwrap();
    assert_eq!((img.width(), img.height()), (512, 512));
}

#[test]
fn cli_rejects_unsupported_export_size() {
    let dir = PathBuf::from("target").join("cli_smoke").join("reject");
    let project = write_project(&dir);

    let status = std::process::Command::new(exe())
        .args(["render", "--resolution", "300", "--in"])
        .arg(&project)
        .args(["--out", "unused.png"])
        .status()
        .unwrap();

    assert!(!status.success());
}

#[test]
fn cli_inspect_lists_nodes() {
    let dir = PathBuf::from("target").join("cli_smoke").join("inspect");
    let project = write_project(&dir);

    let output = std::process::Command::new(exe())
        .args(["inspect", "--in"])
        .arg(&project)
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("3 nodes, 2 edges"));
    assert!(stdout.contains("node g Glow"));
}
