//! Canvas adapter: plan-space drawing primitives over a one-page PDF
//!
//! This module is organized into submodules:
//! - `defaults`: Default sizes and styles
//! - `font`: Standard-14 glyph metrics and text encoding
//! - `geometry`: Door and dimension layouts, arcs
//! - `pdf`: Document assembly
//!
//! The page uses a y-down coordinate system in pixels (1 px = 1 PDF point).
//! `configure_drawing_area` installs the plan transform; after that every
//! coordinate handed to the canvas is in meters, and stroke widths, dash
//! lengths and font sizes stay in pixels.

pub mod defaults;
pub mod font;
pub mod geometry;
mod pdf;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::ops::{Deref, DerefMut};
use std::path::Path;

use glam::{DVec2, dvec2};
use lopdf::Object;
use lopdf::content::Operation;

use crate::errors::CanvasError;
use crate::log::{debug, trace};
use crate::types::{Color, FontStyle, Scale, Stroke};

pub use font::TextExtent;
pub use geometry::{Arc, DimensionLayout, DoorDirection, DoorLayout, Segment};

use pdf::{PageResources, name, op, real};

/// The plan transform installed by [`Canvas::configure_drawing_area`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawingArea {
    /// Margin as a fraction of the page width
    pub padding: f64,
    /// Plan width (meters) that fits between the margins
    pub plan_width: f64,
    /// Margin in pixels, applied on the left and at the top
    pub space: f64,
    pub scale: Scale,
}

impl DrawingArea {
    /// `space = page_width * padding`, `scale = (page_width - 2 * space) / plan_width`
    pub fn new(page_width: f64, padding: f64, plan_width: f64) -> Result<Self, CanvasError> {
        let space = page_width * padding;
        let scale = Scale::try_new((page_width - space * 2.0) / plan_width).map_err(|reason| {
            CanvasError::InvalidDrawingArea {
                padding,
                plan_width,
                reason,
            }
        })?;
        Ok(Self {
            padding,
            plan_width,
            space,
            scale,
        })
    }
}

/// A single PDF page being drawn on
#[derive(Debug)]
pub struct Canvas<W: Write> {
    writer: W,
    width: f64,
    height: f64,
    area: Option<DrawingArea>,
    operations: Vec<Operation>,
    resources: PageResources,
}

impl Canvas<BufWriter<File>> {
    /// Open `path` for writing and start a page of `width` x `height` pixels.
    pub fn create(path: impl AsRef<Path>, width: f64, height: f64) -> Result<Self, CanvasError> {
        let path = path.as_ref();
        check_page_size(width, height)?;
        let file = File::create(path).map_err(|source| CanvasError::CreateOutput {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "opened output");
        Self::new(BufWriter::new(file), width, height)
    }
}

impl<W: Write> Canvas<W> {
    /// Start a page of `width` x `height` pixels that will be written to `writer`.
    pub fn new(writer: W, width: f64, height: f64) -> Result<Self, CanvasError> {
        check_page_size(width, height)?;
        debug!(width, height, "creating canvas");

        // Flip to a y-down page so plan coordinates read like the paper
        let operations = vec![op(
            "cm",
            vec![real(1.0), real(0.0), real(0.0), real(-1.0), real(0.0), real(height)],
        )];
        Ok(Self {
            writer,
            width,
            height,
            area: None,
            operations,
            resources: PageResources::default(),
        })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn drawing_area(&self) -> Option<DrawingArea> {
        self.area
    }

    /// Current plan scale; identity until a drawing area is configured.
    pub fn scale(&self) -> Scale {
        self.area.map_or(Scale::UNIT, |area| area.scale)
    }

    /// Fit `plan_width` meters between margins of `padding * page_width`.
    pub fn configure_drawing_area(&mut self, padding: f64, plan_width: f64) -> Result<DrawingArea, CanvasError> {
        if self.area.is_some() {
            return Err(CanvasError::DrawingAreaConfigured);
        }
        let area = DrawingArea::new(self.width, padding, plan_width)?;
        let s = area.scale.factor();
        self.push(op(
            "cm",
            vec![real(s), real(0.0), real(0.0), real(s), real(area.space), real(area.space)],
        ));
        debug!(padding, plan_width, scale = s, "configured drawing area");
        self.area = Some(area);
        Ok(area)
    }

    /// Half the wall stroke, in plan units. Plans extend wall ends by this
    /// much so butt-capped corners close.
    pub fn half_wall(&self) -> f64 {
        self.scale().meters(defaults::WALL_WIDTH) / 2.0
    }

    /// Save the graphics state; it is restored when the guard drops. Only the
    /// drawing primitives open a guard, so the plan transform is never nested.
    fn save(&mut self) -> StateGuard<'_, W> {
        self.push(op("q", vec![]));
        StateGuard { canvas: self }
    }

    fn push(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    fn set_opacity(&mut self, color: Color) {
        if !color.is_opaque() {
            let gs = self.resources.opacity(color);
            self.push(op("gs", vec![name(&gs)]));
        }
    }

    fn set_stroke(&mut self, stroke: &Stroke) {
        let scale = self.scale();
        self.push(op("w", vec![real(scale.meters(stroke.width))]));
        let color = stroke.color;
        self.push(op(
            "RG",
            vec![real(color.red()), real(color.green()), real(color.blue())],
        ));
        self.set_opacity(color);
        self.push(op("J", vec![Object::Integer(stroke.cap.pdf_style())]));
        if let Some(pattern) = &stroke.dash {
            let lengths = pattern.iter().map(|&len| real(scale.meters(len))).collect();
            self.push(op("d", vec![Object::Array(lengths), Object::Integer(0)]));
        }
    }

    fn move_to(&mut self, p: DVec2) {
        self.push(op("m", vec![real(p.x), real(p.y)]));
    }

    fn line_to(&mut self, p: DVec2) {
        self.push(op("l", vec![real(p.x), real(p.y)]));
    }

    fn curve_to(&mut self, c1: DVec2, c2: DVec2, p: DVec2) {
        self.push(op(
            "c",
            vec![real(c1.x), real(c1.y), real(c2.x), real(c2.y), real(p.x), real(p.y)],
        ));
    }

    /// Stroke a straight segment.
    pub fn draw_line(&mut self, p1: DVec2, p2: DVec2, stroke: &Stroke) {
        trace!(?p1, ?p2, "line");
        let mut state = self.save();
        state.set_stroke(stroke);
        state.move_to(p1);
        state.line_to(p2);
        state.push(op("S", vec![]));
    }

    fn draw_segment(&mut self, segment: Segment, stroke: &Stroke) {
        self.draw_line(segment.start, segment.end, stroke);
    }

    /// Stroke a circular arc as cubic Bézier pieces.
    pub fn draw_arc(&mut self, arc: &Arc, stroke: &Stroke) {
        trace!(center = ?arc.center, radius = arc.radius, sweep = arc.sweep, "arc");
        let cubics = arc.to_cubics();
        let mut state = self.save();
        state.set_stroke(stroke);
        state.move_to(arc.start());
        for [_, c1, c2, p] in cubics {
            state.curve_to(c1, c2, p);
        }
        state.push(op("S", vec![]));
    }

    /// Solid black wall at the standard width.
    pub fn draw_wall(&mut self, p1: DVec2, p2: DVec2) {
        self.draw_line(p1, p2, &wall_stroke());
    }

    /// Wall with a door opening `door_width` long, `door_offset` from `p1`,
    /// plus the open leaf and its swing arc.
    pub fn draw_wall_with_door(
        &mut self,
        p1: DVec2,
        p2: DVec2,
        door_offset: f64,
        door_width: f64,
        direction: DoorDirection,
    ) -> DoorLayout {
        let door = DoorLayout::new(p1, p2, door_offset, door_width, direction);
        trace!(?p1, ?p2, door_offset, door_width, ?direction, "wall with door");

        let wall = wall_stroke();
        self.draw_segment(door.before, &wall);
        self.draw_segment(door.after, &wall);
        self.draw_segment(door.leaf, &Stroke::solid(defaults::WALL_COLOR, defaults::DOOR_LEAF_WIDTH));
        self.draw_arc(
            &door.swing,
            &Stroke::solid(defaults::DOOR_SWING_COLOR, defaults::DOOR_SWING_WIDTH),
        );
        door
    }

    /// Wall with its length written on a measurement line displaced by `offset`.
    pub fn draw_wall_with_dimension(&mut self, p1: DVec2, p2: DVec2, offset: DVec2) -> DimensionLayout {
        self.draw_wall(p1, p2);

        let style = FontStyle::default();
        let scale = self.scale();
        let label = geometry::format_length(geometry::length(p1, p2));
        let extent = self.measure_text(&label, defaults::DIMENSION_TEXT_SIZE, style);
        let layout = DimensionLayout::new(
            p1,
            p2,
            offset,
            dvec2(scale.meters(extent.advance), scale.meters(extent.ascent)),
            scale.meters(defaults::DIMENSION_GAP),
        );
        trace!(?p1, ?p2, label = %layout.label, "wall with dimension");

        let stroke = Stroke::solid(defaults::DIMENSION_COLOR, defaults::DIMENSION_WIDTH);
        for tick in layout.ticks {
            self.draw_segment(tick, &stroke);
        }
        for &line in &layout.lines {
            self.draw_segment(line, &stroke);
        }
        self.draw_text(
            layout.label_origin,
            &layout.label,
            defaults::DIMENSION_TEXT_COLOR,
            defaults::DIMENSION_TEXT_SIZE,
            style,
            layout.rotation,
        );
        layout
    }

    /// Baseline-anchored text at a plan position. `size` is in pixels,
    /// `rotation` in radians (clockwise on the page).
    pub fn draw_text(&mut self, position: DVec2, text: &str, color: Color, size: f64, style: FontStyle, rotation: f64) {
        trace!(?position, text, size, rotation, "text");
        let font = self.resources.font(style.base_font());
        let font_size = self.scale().meters(size);
        let (sin, cos) = rotation.sin_cos();

        let mut state = self.save();
        state.push(op(
            "rg",
            vec![real(color.red()), real(color.green()), real(color.blue())],
        ));
        state.set_opacity(color);
        state.push(op("BT", vec![]));
        state.push(op("Tf", vec![name(&font), real(font_size)]));
        // Glyph space is y-up; mirror it against the y-down page
        state.push(op(
            "Tm",
            vec![real(cos), real(sin), real(sin), real(-cos), real(position.x), real(position.y)],
        ));
        state.push(op(
            "Tj",
            vec![Object::string_literal(font::encode_win_ansi(text))],
        ));
        state.push(op("ET", vec![]));
    }

    /// Room area label, `"{area:.1}m²"`.
    pub fn draw_area_label(&mut self, position: DVec2, area: f64) {
        let text = format!("{area:.1}m²");
        self.draw_text(
            position,
            &text,
            defaults::AREA_TEXT_COLOR,
            defaults::AREA_TEXT_SIZE,
            FontStyle::default(),
            0.0,
        );
    }

    /// Advance and ascent of `text` in pixels.
    pub fn measure_text(&self, text: &str, size: f64, style: FontStyle) -> TextExtent {
        font::measure(text, size, style)
    }

    /// Content-stream operations emitted so far
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Write the document, flush, and hand the writer back.
    pub fn finish(mut self) -> Result<W, CanvasError> {
        let operations = std::mem::take(&mut self.operations);
        let resources = std::mem::take(&mut self.resources);
        debug!(operations = operations.len(), "writing document");

        let mut doc = pdf::build_document(self.width, self.height, operations, resources)?;
        doc.save_to(&mut self.writer)?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}

fn check_page_size(width: f64, height: f64) -> Result<(), CanvasError> {
    let valid = |v: f64| v.is_finite() && v > 0.0;
    if valid(width) && valid(height) {
        Ok(())
    } else {
        Err(CanvasError::InvalidPageSize { width, height })
    }
}

fn wall_stroke() -> Stroke {
    Stroke::solid(defaults::WALL_COLOR, defaults::WALL_WIDTH)
}

/// Scoped graphics-state save. Restores (`Q`) on every exit path.
struct StateGuard<'c, W: Write> {
    canvas: &'c mut Canvas<W>,
}

impl<W: Write> Deref for StateGuard<'_, W> {
    type Target = Canvas<W>;

    fn deref(&self) -> &Canvas<W> {
        self.canvas
    }
}

impl<W: Write> DerefMut for StateGuard<'_, W> {
    fn deref_mut(&mut self) -> &mut Canvas<W> {
        self.canvas
    }
}

impl<W: Write> Drop for StateGuard<'_, W> {
    fn drop(&mut self) {
        self.canvas.push(op("Q", vec![]));
    }
}
