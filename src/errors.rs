//! Error types with rich diagnostics using miette
//!
//! Plan errors carry source spans so the CLI can point at the offending
//! statement. Canvas errors are plain variants: they happen while talking to
//! the output file or the PDF backend, not while reading a plan.

use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::types::NumericError;

/// Source context for error reporting
#[derive(Debug, Clone)]
pub struct SourceContext {
    /// Name of the source (filename or "<built-in>")
    pub name: String,
    /// The full source text
    pub source: String,
}

impl SourceContext {
    /// Create a new source context
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Create a NamedSource for miette
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.name, self.source.clone())
    }
}

// ============================================================================
// Canvas Errors
// ============================================================================

/// Errors raised by the canvas adapter
#[derive(Error, Diagnostic, Debug)]
pub enum CanvasError {
    #[error("cannot create output file {}", path.display())]
    #[diagnostic(code(floorplan::canvas::create_output))]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid page size {width}x{height}")]
    #[diagnostic(
        code(floorplan::canvas::invalid_page_size),
        help("page width and height must be positive and finite")
    )]
    InvalidPageSize { width: f64, height: f64 },

    #[error("invalid drawing area: {reason}")]
    #[diagnostic(
        code(floorplan::canvas::invalid_drawing_area),
        help("padding must be below 0.5 and the plan width must be positive")
    )]
    InvalidDrawingArea {
        padding: f64,
        plan_width: f64,
        reason: NumericError,
    },

    #[error("drawing area is already configured")]
    #[diagnostic(code(floorplan::canvas::drawing_area_configured))]
    DrawingAreaConfigured,

    #[error("PDF backend error")]
    #[diagnostic(code(floorplan::canvas::pdf))]
    Pdf(#[from] lopdf::Error),

    #[error("cannot write PDF document")]
    #[diagnostic(code(floorplan::canvas::write))]
    Write(#[from] std::io::Error),
}

// ============================================================================
// Parse Errors
// ============================================================================

/// Errors that occur while parsing a plan description
#[derive(Error, Diagnostic, Debug)]
pub enum ParseError {
    #[error("syntax error: {message}")]
    #[diagnostic(code(floorplan::parse::syntax))]
    Syntax {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("invalid number: {message}")]
    #[diagnostic(code(floorplan::parse::invalid_number))]
    InvalidNumber {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("invalid number")]
        span: SourceSpan,
    },
}

// ============================================================================
// Evaluation Errors
// ============================================================================

/// Errors that occur while replaying a plan against the canvas
#[derive(Error, Diagnostic, Debug)]
pub enum EvalError {
    #[error("undefined variable: {name}")]
    #[diagnostic(code(floorplan::eval::undefined_variable))]
    UndefinedVariable {
        name: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("not defined")]
        span: SourceSpan,
        #[help]
        suggestion: Option<String>,
    },

    #[error("division by zero")]
    #[diagnostic(code(floorplan::eval::division_by_zero))]
    DivisionByZero {
        #[source_code]
        src: NamedSource<String>,
        #[label("divisor is zero")]
        span: SourceSpan,
    },

    #[error("invalid numeric value: {reason}")]
    #[diagnostic(code(floorplan::eval::invalid_numeric))]
    InvalidNumeric {
        reason: NumericError,
        #[source_code]
        src: NamedSource<String>,
        #[label("this value is NaN or infinite")]
        span: SourceSpan,
    },

    #[error("unknown color: {name}")]
    #[diagnostic(
        code(floorplan::eval::unknown_color),
        help("use a color name like `red`, `#RRGGBB` or `0xTTRRGGBB`")
    )]
    UnknownColor {
        name: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("unknown color")]
        span: SourceSpan,
    },

    #[error("drawing before the drawing area is configured")]
    #[diagnostic(
        code(floorplan::eval::no_drawing_area),
        help("add `canvas padding <p> width <w>` before the first drawing statement")
    )]
    NoDrawingArea {
        #[source_code]
        src: NamedSource<String>,
        #[label("needs a drawing area")]
        span: SourceSpan,
    },

    #[error("canvas rejected this statement")]
    #[diagnostic(code(floorplan::eval::canvas))]
    Canvas {
        #[source]
        #[diagnostic_source]
        source: CanvasError,
        #[source_code]
        src: NamedSource<String>,
        #[label("while drawing this")]
        span: SourceSpan,
    },
}
