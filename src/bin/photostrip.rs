use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

const LOG_ENV: &str = "PHOTOSTRIP_LOG";

#[derive(Parser, Debug)]
#[command(name = "photostrip", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a project file to a PNG or JPEG strip.
    Render(RenderArgs),
    /// List the builtin layouts.
    Layouts,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory (default: the project's `export.out_dir`, else the current directory).
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Supersampling scale (default: the project's `export.scale`).
    #[arg(long)]
    scale: Option<f64>,

    /// Output format (default: the project's `export.format`).
    #[arg(long, value_enum)]
    format: Option<FormatChoice>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Png,
    Jpeg,
}

fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Layouts => cmd_layouts(),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let project = photostrip::StripProject::from_path(&args.in_path)
        .with_context(|| format!("load project '{}'", args.in_path.display()))?;

    let mut opts = project.export_options();
    if let Some(dir) = args.out_dir {
        opts.out_dir = dir;
    }
    if let Some(scale) = args.scale {
        opts.scale = scale;
    }
    match (args.format, opts.format) {
        (Some(FormatChoice::Png), _) => opts.format = photostrip::ExportFormat::Png,
        (Some(FormatChoice::Jpeg), photostrip::ExportFormat::Png) => {
            opts.format = photostrip::ExportFormat::jpeg();
        }
        _ => {}
    }

    let mut editor = project.build_editor(photostrip::DecodeMode::Inline)?;
    editor.redraw()?;
    let artifact = editor
        .export(&opts)?
        .context("nothing was rendered")?;

    eprintln!(
        "wrote {} ({}x{}, {} bytes)",
        artifact.path.display(),
        artifact.width,
        artifact.height,
        artifact.bytes
    );
    Ok(())
}

fn cmd_layouts() -> anyhow::Result<()> {
    let catalog = photostrip::LayoutCatalog::builtin();
    for layout in catalog.iter() {
        let canvas = layout.canvas();
        println!(
            "{:>3}  {:<24} {}x{}",
            layout.id(),
            layout.label(),
            canvas.width,
            canvas.height
        );
    }
    Ok(())
}
