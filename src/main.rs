use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use miette::{IntoDiagnostic, WrapErr};

use floorplan::ast::Plan;
use floorplan::canvas::defaults;
use floorplan::log::debug;
use floorplan::parse::parse;
use floorplan::render::render;
use floorplan::{Canvas, SourceContext, builtin_plan};

/// Render a floor plan to a single-page PDF
#[derive(Parser, Debug)]
#[command(name = "floorplan", version)]
struct Args {
    /// Page height in pixels; the width follows the ISO 216 aspect ratio
    #[arg(
        short,
        long,
        value_name = "canvas-height",
        default_value_t = defaults::PAGE_HEIGHT as u32,
        value_parser = clap::value_parser!(u32).range(2..)
    )]
    size: u32,

    /// Plan description to draw instead of the built-in one
    #[arg(short, long, value_name = "plan-file")]
    plan: Option<PathBuf>,

    /// Where to write the PDF
    #[arg(value_name = "output-file")]
    output: PathBuf,
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    #[cfg(feature = "tracing")]
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            eprintln!("{report:?}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> miette::Result<()> {
    let source = match &args.plan {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("cannot read plan {}", path.display()))?;
            SourceContext::new(path.display().to_string(), text)
        }
        None => builtin_plan(),
    };

    // Parse before touching the output file
    let plan = parse(&source)?;

    // Open early so an unwritable path fails before any drawing
    let height = f64::from(args.size);
    let canvas = Canvas::create(&args.output, defaults::page_width(height), height)?;

    let drawn = draw(&plan, &source, canvas);
    if drawn.is_err() {
        // No truncated document is left behind when the plan fails to evaluate
        if let Err(err) = std::fs::remove_file(&args.output) {
            debug!(%err, path = %args.output.display(), "could not remove output");
        }
    }
    drawn
}

fn draw<W: Write>(plan: &Plan, source: &SourceContext, mut canvas: Canvas<W>) -> miette::Result<()> {
    render(plan, source, &mut canvas)?;
    canvas.finish()?;
    Ok(())
}
