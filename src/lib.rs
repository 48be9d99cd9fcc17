//! Floor plans as single-page vector PDFs.
//!
//! A plan description is parsed with [`parse::parse`], then replayed onto a
//! [`Canvas`] by [`render::render`]. [`render_plan`] does both with miette
//! diagnostics; [`builtin_plan`] is the apartment shipped with the binary.

pub mod ast;
pub mod canvas;
pub mod errors;
pub mod log;
pub mod parse;
pub mod render;
pub mod types;

use std::io::Write;

use pest_derive::Parser;

pub use canvas::{Canvas, DoorDirection, TextExtent};
pub use errors::{CanvasError, EvalError, ParseError, SourceContext};
pub use render::RenderStats;

#[derive(Parser)]
#[grammar = "floorplan.pest"]
pub struct PlanParser;

/// Name used in diagnostics for the embedded plan
pub const BUILTIN_PLAN_NAME: &str = "<built-in 2og.plan>";

/// Plan of the 2.OG apartment: study, boiler room, hall, bathroom, bedroom.
pub const BUILTIN_PLAN: &str = include_str!("../plans/2og.plan");

pub fn builtin_plan() -> SourceContext {
    SourceContext::new(BUILTIN_PLAN_NAME, BUILTIN_PLAN)
}

/// Parse `source` and draw it on `canvas`.
///
/// Errors carry the plan source so they render as annotated snippets.
pub fn render_plan<W: Write>(source: &SourceContext, canvas: &mut Canvas<W>) -> Result<RenderStats, miette::Report> {
    let plan = parse::parse(source)?;
    let stats = render::render(&plan, source, canvas)?;
    Ok(stats)
}
