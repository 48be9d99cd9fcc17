//! Plan replay onto a canvas
//!
//! This module is organized into submodules:
//! - `context`: RenderContext for tracking variables and rooms
//! - `eval`: Expression evaluation functions
//!
//! Statements run in source order, one canvas call per drawing statement.

pub mod context;
pub mod eval;

pub use context::RenderContext;

use std::io::Write;

use miette::SourceSpan;

use crate::ast::*;
use crate::canvas::{Canvas, defaults};
use crate::errors::{CanvasError, EvalError, SourceContext};
use crate::log::{debug, info};
use crate::types::{FontStyle, Stroke};
use eval::{eval_color, eval_expr, eval_position};

/// What a plan put on the page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub rooms: usize,
    pub walls: usize,
    pub doors: usize,
    pub dimensions: usize,
    pub lines: usize,
    pub labels: usize,
}

/// Replay a parsed plan onto `canvas`
pub fn render<W: Write>(plan: &Plan, source: &SourceContext, canvas: &mut Canvas<W>) -> Result<RenderStats, EvalError> {
    let mut ctx = RenderContext::new(source);
    let mut stats = RenderStats::default();

    for stmt in &plan.statements {
        render_statement(&mut ctx, canvas, stmt, &mut stats)?;
    }

    info!(
        plan = %source.name,
        rooms = stats.rooms,
        walls = stats.walls,
        doors = stats.doors,
        dimensions = stats.dimensions,
        "rendered plan"
    );
    Ok(stats)
}

fn render_statement<W: Write>(
    ctx: &mut RenderContext,
    canvas: &mut Canvas<W>,
    stmt: &Statement,
    stats: &mut RenderStats,
) -> Result<(), EvalError> {
    match stmt {
        Statement::Canvas(setup) => {
            let padding = eval_expr(ctx, &setup.padding)?;
            let width = eval_expr(ctx, &setup.width)?;
            canvas
                .configure_drawing_area(padding, width)
                .map_err(|source| canvas_error(ctx, source, setup.span))?;
            ctx.half_wall = Some(canvas.half_wall());
        }
        Statement::Assignment(assignment) => {
            let value = eval_expr(ctx, &assignment.value)?;
            ctx.variables.insert(assignment.name.clone(), value);
        }
        Statement::Room(room) => {
            ctx.rooms.push(room.name.clone());
            debug!(room = %ctx.room_path(), "entering room");
            stats.rooms += 1;
            for inner in &room.body {
                render_statement(ctx, canvas, inner, stats)?;
            }
            ctx.rooms.pop();
        }
        Statement::Wall(wall) => {
            require_drawing_area(ctx, canvas, wall.span)?;
            let p1 = eval_position(ctx, &wall.from)?;
            let p2 = eval_position(ctx, &wall.to)?;
            stats.walls += 1;
            match &wall.feature {
                None => canvas.draw_wall(p1, p2),
                Some(WallFeature::Door(door)) => {
                    let offset = eval_expr(ctx, &door.offset)?;
                    let width = eval_expr(ctx, &door.width)?;
                    canvas.draw_wall_with_door(p1, p2, offset, width, door.direction);
                    stats.doors += 1;
                }
                Some(WallFeature::Dimension(offset)) => {
                    let offset = eval_position(ctx, offset)?;
                    canvas.draw_wall_with_dimension(p1, p2, offset);
                    stats.dimensions += 1;
                }
            }
        }
        Statement::Line(line) => {
            require_drawing_area(ctx, canvas, line.span)?;
            let p1 = eval_position(ctx, &line.from)?;
            let p2 = eval_position(ctx, &line.to)?;
            let mut stroke = Stroke::solid(defaults::LINE_COLOR, defaults::LINE_WIDTH);
            for attribute in &line.attributes {
                match attribute {
                    LineAttribute::Color(color) => stroke.color = eval_color(ctx, color)?,
                    LineAttribute::Width(width) => stroke.width = eval_expr(ctx, width)?,
                    LineAttribute::Dash(lengths) => {
                        let pattern = lengths
                            .iter()
                            .map(|len| eval_expr(ctx, len))
                            .collect::<Result<Vec<_>, _>>()?;
                        stroke.dash = Some(pattern);
                    }
                    LineAttribute::Cap(cap) => stroke.cap = *cap,
                }
            }
            canvas.draw_line(p1, p2, &stroke);
            stats.lines += 1;
        }
        Statement::Text(text) => {
            require_drawing_area(ctx, canvas, text.span)?;
            let position = eval_position(ctx, &text.position)?;
            let mut color = defaults::TEXT_COLOR;
            let mut size = defaults::TEXT_SIZE;
            let mut style = FontStyle::default();
            let mut rotation = 0.0;
            for attribute in &text.attributes {
                match attribute {
                    TextAttribute::Color(c) => color = eval_color(ctx, c)?,
                    TextAttribute::Size(s) => size = eval_expr(ctx, s)?,
                    TextAttribute::Rotate(degrees) => rotation = eval_expr(ctx, degrees)?.to_radians(),
                    TextAttribute::Bold => style = style.bold(),
                    TextAttribute::Italic => style = style.italic(),
                    TextAttribute::Mono => style = style.monospace(),
                }
            }
            canvas.draw_text(position, &text.text, color, size, style, rotation);
            stats.labels += 1;
        }
        Statement::Area(area) => {
            require_drawing_area(ctx, canvas, area.span)?;
            let position = eval_position(ctx, &area.position)?;
            let value = eval_expr(ctx, &area.value)?;
            canvas.draw_area_label(position, value);
            stats.labels += 1;
        }
    }
    Ok(())
}

fn require_drawing_area<W: Write>(ctx: &RenderContext, canvas: &Canvas<W>, span: SourceSpan) -> Result<(), EvalError> {
    match canvas.drawing_area() {
        Some(_) => Ok(()),
        None => Err(EvalError::NoDrawingArea { src: ctx.src(), span }),
    }
}

fn canvas_error(ctx: &RenderContext, source: CanvasError, span: SourceSpan) -> EvalError {
    EvalError::Canvas {
        source,
        src: ctx.src(),
        span,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    fn render_str(source: &str) -> Result<(RenderStats, Canvas<Vec<u8>>), EvalError> {
        let src = SourceContext::new("test.plan", source);
        let plan = parse(&src).unwrap();
        let mut canvas = Canvas::new(Vec::new(), 601.0, 850.0).unwrap();
        let stats = render(&plan, &src, &mut canvas)?;
        Ok((stats, canvas))
    }

    #[test]
    fn counts_what_was_drawn() {
        let (stats, _) = render_str(
            r#"
            canvas padding 0.1 width 10.34
            $w = 3.09
            room "Heizung" {
                wall (0, 4.29) to ($w, 4.29) door at $w - 1.1 width 0.9 first-left
                wall ($w, 4.29) to ($w, 5.64)
                wall ($w, 5.64) to (-halfwall, 5.64) dimension (0, 0.3)
                area ($w / 2 - 0.5, 4.96) $w * 1.35
            }
            line (0, 0) to (10.34, 0) color red
            "#,
        )
        .unwrap();
        assert_eq!(
            stats,
            RenderStats {
                rooms: 1,
                walls: 3,
                doors: 1,
                dimensions: 1,
                lines: 1,
                labels: 1,
            }
        );
    }

    #[test]
    fn drawing_before_canvas_is_an_error() {
        let err = render_str("wall (0, 0) to (1, 0)\ncanvas padding 0.1 width 10").unwrap_err();
        let EvalError::NoDrawingArea { span, .. } = err else {
            panic!("expected missing drawing area");
        };
        assert_eq!(span.offset(), 0);
    }

    #[test]
    fn second_canvas_is_an_error() {
        let err = render_str("canvas padding 0.1 width 10\ncanvas padding 0.1 width 5").unwrap_err();
        assert!(matches!(
            err,
            EvalError::Canvas {
                source: CanvasError::DrawingAreaConfigured,
                ..
            }
        ));
    }

    #[test]
    fn bad_drawing_area_is_wrapped() {
        let err = render_str("canvas padding 0.1 width 0").unwrap_err();
        assert!(matches!(
            err,
            EvalError::Canvas {
                source: CanvasError::InvalidDrawingArea { .. },
                ..
            }
        ));
    }

    #[test]
    fn variables_are_scoped_to_the_plan_not_the_room() {
        let (stats, _) = render_str(
            r#"
            canvas padding 0.1 width 10
            room "A" { $x = 2 }
            wall (0, 0) to ($x, 0)
            "#,
        )
        .unwrap();
        assert_eq!(stats.walls, 1);
    }

    #[test]
    fn halfwall_matches_canvas() {
        let (_, canvas) = render_str("canvas padding 0.1 width 10.34\n$hw = halfwall").unwrap();
        let expected = 0.5 / canvas.scale().factor();
        assert!((canvas.half_wall() - expected).abs() < 1e-12);
    }

    #[test]
    fn text_attributes_reach_the_page() {
        let (_, canvas) = render_str(
            r#"
            canvas padding 0.1 width 10
            text (1, 1) "Nord" color blue size 14 bold italic rotate -90
            "#,
        )
        .unwrap();
        let ops: Vec<_> = canvas.operations().iter().map(|o| o.operator.as_str()).collect();
        assert!(ops.contains(&"Tj"));
        assert!(ops.contains(&"Tm"));
    }
}
