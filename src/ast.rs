//! Abstract Syntax Tree types for plan descriptions
//!
//! Every node that can fail during evaluation keeps the span of the source
//! text it came from, so diagnostics can point at it.

use miette::SourceSpan;

use crate::canvas::DoorDirection;
use crate::types::LineCap;

/// A complete plan description
#[derive(Debug, Clone, Default)]
pub struct Plan {
    pub statements: Vec<Statement>,
}

/// A plan statement
#[derive(Debug, Clone)]
pub enum Statement {
    /// Drawing area: canvas padding 0.1 width 10.34
    Canvas(CanvasSetup),
    /// Variable assignment: $w = 3.09
    Assignment(Assignment),
    /// Named group: room "Bad" { ... }
    Room(Room),
    /// Wall, optionally with a door or a dimension
    Wall(Wall),
    /// Free-form styled line
    Line(Line),
    /// Free-form label
    Text(Text),
    /// Room area label: area (x, y) expr
    Area(Area),
}

impl Statement {
    pub fn span(&self) -> SourceSpan {
        match self {
            Statement::Canvas(s) => s.span,
            Statement::Assignment(s) => s.span,
            Statement::Room(s) => s.span,
            Statement::Wall(s) => s.span,
            Statement::Line(s) => s.span,
            Statement::Text(s) => s.span,
            Statement::Area(s) => s.span,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CanvasSetup {
    pub padding: Expr,
    pub width: Expr,
    pub span: SourceSpan,
}

#[derive(Debug, Clone)]
pub struct Assignment {
    /// Variable name including the `$`
    pub name: String,
    pub value: Expr,
    pub span: SourceSpan,
}

#[derive(Debug, Clone)]
pub struct Room {
    pub name: String,
    pub body: Vec<Statement>,
    pub span: SourceSpan,
}

/// A plan-space point: (x, y)
#[derive(Debug, Clone)]
pub struct Position {
    pub x: Expr,
    pub y: Expr,
    pub span: SourceSpan,
}

#[derive(Debug, Clone)]
pub struct Wall {
    pub from: Position,
    pub to: Position,
    pub feature: Option<WallFeature>,
    pub span: SourceSpan,
}

/// What a wall carries besides itself
#[derive(Debug, Clone)]
pub enum WallFeature {
    Door(Door),
    /// Displacement of the measurement line
    Dimension(Position),
}

#[derive(Debug, Clone)]
pub struct Door {
    /// Distance from the wall start to the first gap edge
    pub offset: Expr,
    pub width: Expr,
    pub direction: DoorDirection,
}

#[derive(Debug, Clone)]
pub struct Line {
    pub from: Position,
    pub to: Position,
    pub attributes: Vec<LineAttribute>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone)]
pub enum LineAttribute {
    Color(ColorName),
    Width(Expr),
    Dash(Vec<Expr>),
    Cap(LineCap),
}

#[derive(Debug, Clone)]
pub struct Text {
    pub position: Position,
    pub text: String,
    pub attributes: Vec<TextAttribute>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone)]
pub enum TextAttribute {
    Color(ColorName),
    Size(Expr),
    /// Degrees, clockwise on the page
    Rotate(Expr),
    Bold,
    Italic,
    Mono,
}

#[derive(Debug, Clone)]
pub struct Area {
    pub position: Position,
    /// Area in square meters
    pub value: Expr,
    pub span: SourceSpan,
}

/// A color as written; resolved during evaluation
#[derive(Debug, Clone)]
pub struct ColorName {
    pub name: String,
    pub span: SourceSpan,
}

/// Expression
#[derive(Debug, Clone)]
pub enum Expr {
    Number(f64, SourceSpan),
    Variable(String, SourceSpan),
    /// Half the wall stroke, in plan units
    HalfWall(SourceSpan),
    BinaryOp(Box<Expr>, BinaryOp, Box<Expr>),
    UnaryOp(UnaryOp, Box<Expr>, SourceSpan),
    ParenExpr(Box<Expr>, SourceSpan),
}

impl Expr {
    /// Source span covering the whole expression
    pub fn span(&self) -> SourceSpan {
        match self {
            Expr::Number(_, span)
            | Expr::Variable(_, span)
            | Expr::HalfWall(span)
            | Expr::UnaryOp(_, _, span)
            | Expr::ParenExpr(_, span) => *span,
            Expr::BinaryOp(lhs, _, rhs) => {
                let (l, r) = (lhs.span(), rhs.span());
                let end = r.offset() + r.len();
                SourceSpan::new(l.offset().into(), end.saturating_sub(l.offset()))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_span_covers_both_operands() {
        let expr = Expr::BinaryOp(
            Box::new(Expr::Number(1.0, (4, 1).into())),
            BinaryOp::Add,
            Box::new(Expr::Variable("$w".into(), (8, 2).into())),
        );
        assert_eq!(expr.span(), SourceSpan::from((4, 6)));
    }
}
