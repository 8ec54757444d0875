use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "texture-lab", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a project into a standalone SVG document.
    Svg(SvgArgs),
    /// Bake a project into a PNG.
    Render(RenderArgs),
    /// Print nodes, their resolved parameters and the edge list.
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
struct SvgArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output SVG path.
    #[arg(long)]
    out: PathBuf,

    /// Square canvas size in pixels. Defaults to the project's resolution.
    #[arg(long)]
    resolution: Option<u32>,

    /// Evaluate from this node instead of the output node.
    #[arg(long)]
    root: Option<String>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Export size. Defaults to the project's resolution.
    #[arg(long, value_enum)]
    resolution: Option<ExportChoice>,

    /// Evaluate from this node instead of the output node.
    #[arg(long)]
    root: Option<String>,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ExportChoice {
    #[value(name = "512")]
    Px512,
    #[value(name = "1024")]
    Px1024,
    #[value(name = "2048")]
    Px2048,
    #[value(name = "4096")]
    Px4096,
}

impl From<ExportChoice> for texture_lab::ExportResolution {
    fn from(c: ExportChoice) -> Self {
        match c {
            ExportChoice::Px512 => Self::Px512,
            ExportChoice::Px1024 => Self::Px1024,
            ExportChoice::Px2048 => Self::Px2048,
            ExportChoice::Px4096 => Self::Px4096,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Svg(args) => cmd_svg(args),
        Command::Render(args) => cmd_render(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn read_project_json(path: &Path) -> anyhow::Result<texture_lab::Project> {
    let f = File::open(path).with_context(|| format!("open project '{}'", path.display()))?;
    let r = BufReader::new(f);
    let project: texture_lab::Project =
        serde_json::from_reader(r).with_context(|| "parse project JSON")?;
    Ok(project)
}

fn ensure_parent(out: &Path) -> anyhow::Result<()> {
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_svg(args: SvgArgs) -> anyhow::Result<()> {
    let project = read_project_json(&args.in_path)?;
    let res = match args.resolution {
        Some(px) => texture_lab::Resolution::new(px)?,
        None => project.resolution,
    };
    let graph = project.into_graph();
    let svg = texture_lab::compile_svg(&graph, res, args.root.as_deref())?;

    ensure_parent(&args.out)?;
    std::fs::write(&args.out, svg)
        .with_context(|| format!("write svg '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let project = read_project_json(&args.in_path)?;
    let res = match args.resolution {
        Some(choice) => texture_lab::ExportResolution::from(choice).resolution(),
        None => project.resolution,
    };
    let graph = project.into_graph();
    let png = texture_lab::export_png(&graph, res, args.root.as_deref())
        .with_context(|| format!("export {}x{}", res.get(), res.get()))?;

    ensure_parent(&args.out)?;
    std::fs::write(&args.out, png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let project = read_project_json(&args.in_path)?;
    println!(
        "project '{}' at {}px: {} nodes, {} edges",
        project.name,
        project.resolution.get(),
        project.nodes.len(),
        project.edges.len()
    );
    for node in &project.nodes {
        let params = texture_lab::parse_params(node.kind, &node.params);
        println!("node {} {:?}: {:?}", node.id, node.kind, params);
    }
    for e in &project.edges {
        println!(
            "edge {}: {}.{} -> {}.{}",
            e.id, e.source, e.source_handle, e.target, e.target_handle
        );
    }
    Ok(())
}
