//! Parse pest pairs into AST nodes

use miette::SourceSpan;
use pest::Parser;
use pest::error::InputLocation;
use pest::iterators::{Pair, Pairs};
use std::iter::Peekable;

use crate::ast::*;
use crate::canvas::DoorDirection;
use crate::errors::{ParseError, SourceContext};
use crate::log::trace;
use crate::types::LineCap;
use crate::{PlanParser, Rule};

/// Parse a plan description into AST
pub fn parse(src: &SourceContext) -> Result<Plan, ParseError> {
    let pairs = PlanParser::parse(Rule::plan, &src.source).map_err(|e| {
        let span = match e.location {
            InputLocation::Pos(pos) => SourceSpan::from((pos, 0)),
            InputLocation::Span((start, end)) => SourceSpan::from((start, end - start)),
        };
        ParseError::Syntax {
            message: e.variant.message().into_owned(),
            src: src.named_source(),
            span,
        }
    })?;

    let mut statements = Vec::new();
    for pair in pairs {
        if pair.as_rule() == Rule::plan {
            statements = parse_statements(src, pair.into_inner())?;
        }
    }
    trace!(statements = statements.len(), "parsed plan");

    Ok(Plan { statements })
}

fn span_of(pair: &Pair<Rule>) -> SourceSpan {
    let span = pair.as_span();
    SourceSpan::from((span.start(), span.end() - span.start()))
}

fn unexpected(src: &SourceContext, pair: &Pair<Rule>) -> ParseError {
    ParseError::Syntax {
        message: format!("unexpected {:?}", pair.as_rule()),
        src: src.named_source(),
        span: span_of(pair),
    }
}

/// Next child of a pair whose shape the grammar guarantees
fn child<'i>(src: &SourceContext, parent: SourceSpan, inner: &mut Pairs<'i, Rule>) -> Result<Pair<'i, Rule>, ParseError> {
    inner.next().ok_or_else(|| ParseError::Syntax {
        message: "incomplete statement".into(),
        src: src.named_source(),
        span: parent,
    })
}

fn parse_statements(src: &SourceContext, pairs: Pairs<Rule>) -> Result<Vec<Statement>, ParseError> {
    let mut statements = Vec::new();
    for pair in pairs {
        if pair.as_rule() == Rule::EOI {
            continue;
        }
        statements.push(parse_statement(src, pair)?);
    }
    Ok(statements)
}

fn parse_statement(src: &SourceContext, pair: Pair<Rule>) -> Result<Statement, ParseError> {
    match pair.as_rule() {
        Rule::canvas_stmt => Ok(Statement::Canvas(parse_canvas(src, pair)?)),
        Rule::assignment => Ok(Statement::Assignment(parse_assignment(src, pair)?)),
        Rule::room => Ok(Statement::Room(parse_room(src, pair)?)),
        Rule::wall_stmt => Ok(Statement::Wall(parse_wall(src, pair)?)),
        Rule::line_stmt => Ok(Statement::Line(parse_line(src, pair)?)),
        Rule::text_stmt => Ok(Statement::Text(parse_text(src, pair)?)),
        Rule::area_stmt => Ok(Statement::Area(parse_area(src, pair)?)),
        _ => Err(unexpected(src, &pair)),
    }
}

fn parse_canvas(src: &SourceContext, pair: Pair<Rule>) -> Result<CanvasSetup, ParseError> {
    let span = span_of(&pair);
    let mut inner = pair.into_inner();
    let padding = parse_expr(src, child(src, span, &mut inner)?)?;
    let width = parse_expr(src, child(src, span, &mut inner)?)?;
    Ok(CanvasSetup { padding, width, span })
}

fn parse_assignment(src: &SourceContext, pair: Pair<Rule>) -> Result<Assignment, ParseError> {
    let span = span_of(&pair);
    let mut inner = pair.into_inner();
    let name = child(src, span, &mut inner)?.as_str().to_string();
    let value = parse_expr(src, child(src, span, &mut inner)?)?;
    Ok(Assignment { name, value, span })
}

fn parse_room(src: &SourceContext, pair: Pair<Rule>) -> Result<Room, ParseError> {
    let span = span_of(&pair);
    let mut inner = pair.into_inner();
    let name = parse_string(child(src, span, &mut inner)?);
    let body = parse_statements(src, inner)?;
    Ok(Room { name, body, span })
}

fn parse_wall(src: &SourceContext, pair: Pair<Rule>) -> Result<Wall, ParseError> {
    let span = span_of(&pair);
    let mut inner = pair.into_inner();
    let from = parse_position(src, child(src, span, &mut inner)?)?;
    let to = parse_position(src, child(src, span, &mut inner)?)?;

    let feature = match inner.next() {
        None => None,
        Some(p) if p.as_rule() == Rule::door => Some(WallFeature::Door(parse_door(src, p)?)),
        Some(p) if p.as_rule() == Rule::dimension => {
            let offset_span = span_of(&p);
            let offset = child(src, offset_span, &mut p.into_inner())?;
            Some(WallFeature::Dimension(parse_position(src, offset)?))
        }
        Some(p) => return Err(unexpected(src, &p)),
    };

    Ok(Wall { from, to, feature, span })
}

fn parse_door(src: &SourceContext, pair: Pair<Rule>) -> Result<Door, ParseError> {
    let span = span_of(&pair);
    let mut inner = pair.into_inner();
    let offset = parse_expr(src, child(src, span, &mut inner)?)?;
    let width = parse_expr(src, child(src, span, &mut inner)?)?;
    let direction = parse_door_direction(src, child(src, span, &mut inner)?)?;
    Ok(Door { offset, width, direction })
}

fn parse_door_direction(src: &SourceContext, pair: Pair<Rule>) -> Result<DoorDirection, ParseError> {
    match pair.as_str() {
        "first-left" => Ok(DoorDirection::FirstLeft),
        "first-right" => Ok(DoorDirection::FirstRight),
        "second-left" => Ok(DoorDirection::SecondLeft),
        "second-right" => Ok(DoorDirection::SecondRight),
        _ => Err(unexpected(src, &pair)),
    }
}

fn parse_line(src: &SourceContext, pair: Pair<Rule>) -> Result<Line, ParseError> {
    let span = span_of(&pair);
    let mut inner = pair.into_inner();
    let from = parse_position(src, child(src, span, &mut inner)?)?;
    let to = parse_position(src, child(src, span, &mut inner)?)?;

    let mut attributes = Vec::new();
    for attr in inner {
        let attr_span = span_of(&attr);
        let attribute = match attr.as_rule() {
            Rule::color_attr => LineAttribute::Color(parse_color(src, attr)?),
            Rule::width_attr => {
                let value = child(src, attr_span, &mut attr.into_inner())?;
                LineAttribute::Width(parse_expr(src, value)?)
            }
            Rule::dash_attr => {
                let lengths = attr
                    .into_inner()
                    .map(|p| parse_expr(src, p))
                    .collect::<Result<Vec<_>, _>>()?;
                LineAttribute::Dash(lengths)
            }
            Rule::cap_attr => {
                let style = child(src, attr_span, &mut attr.into_inner())?;
                LineAttribute::Cap(parse_cap(src, style)?)
            }
            _ => return Err(unexpected(src, &attr)),
        };
        attributes.push(attribute);
    }

    Ok(Line { from, to, attributes, span })
}

fn parse_cap(src: &SourceContext, pair: Pair<Rule>) -> Result<LineCap, ParseError> {
    match pair.as_str() {
        "butt" => Ok(LineCap::Butt),
        "round" => Ok(LineCap::Round),
        "square" => Ok(LineCap::Square),
        _ => Err(unexpected(src, &pair)),
    }
}

fn parse_text(src: &SourceContext, pair: Pair<Rule>) -> Result<Text, ParseError> {
    let span = span_of(&pair);
    let mut inner = pair.into_inner();
    let position = parse_position(src, child(src, span, &mut inner)?)?;
    let text = parse_string(child(src, span, &mut inner)?);

    let mut attributes = Vec::new();
    for attr in inner {
        let attr_span = span_of(&attr);
        let attribute = match attr.as_rule() {
            Rule::color_attr => TextAttribute::Color(parse_color(src, attr)?),
            Rule::size_attr => {
                let value = child(src, attr_span, &mut attr.into_inner())?;
                TextAttribute::Size(parse_expr(src, value)?)
            }
            Rule::rotate_attr => {
                let value = child(src, attr_span, &mut attr.into_inner())?;
                TextAttribute::Rotate(parse_expr(src, value)?)
            }
            Rule::style_flag => match attr.as_str() {
                "bold" => TextAttribute::Bold,
                "italic" => TextAttribute::Italic,
                "mono" => TextAttribute::Mono,
                _ => return Err(unexpected(src, &attr)),
            },
            _ => return Err(unexpected(src, &attr)),
        };
        attributes.push(attribute);
    }

    Ok(Text {
        position,
        text,
        attributes,
        span,
    })
}

fn parse_area(src: &SourceContext, pair: Pair<Rule>) -> Result<Area, ParseError> {
    let span = span_of(&pair);
    let mut inner = pair.into_inner();
    let position = parse_position(src, child(src, span, &mut inner)?)?;
    let value = parse_expr(src, child(src, span, &mut inner)?)?;
    Ok(Area { position, value, span })
}

fn parse_color(src: &SourceContext, pair: Pair<Rule>) -> Result<ColorName, ParseError> {
    let span = span_of(&pair);
    let color = child(src, span, &mut pair.into_inner())?;
    Ok(ColorName {
        name: color.as_str().to_string(),
        span: span_of(&color),
    })
}

/// String literal contents with `\"`, `\\` and `\n` unescaped
fn parse_string(pair: Pair<Rule>) -> String {
    let raw = pair.into_inner().next().map_or("", |inner| inner.as_str());
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some(escaped) => out.push(escaped),
            None => out.push('\\'),
        }
    }
    out
}

fn parse_position(src: &SourceContext, pair: Pair<Rule>) -> Result<Position, ParseError> {
    let span = span_of(&pair);
    let mut inner = pair.into_inner();
    let x = parse_expr(src, child(src, span, &mut inner)?)?;
    let y = parse_expr(src, child(src, span, &mut inner)?)?;
    Ok(Position { x, y, span })
}

fn parse_expr(src: &SourceContext, pair: Pair<Rule>) -> Result<Expr, ParseError> {
    // expr = term ~ (add_op ~ term)*
    let span = span_of(&pair);
    let mut inner = pair.into_inner();
    let mut result = parse_term(src, child(src, span, &mut inner)?)?;

    while let Some(op_pair) = inner.next() {
        let op = match op_pair.as_str() {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            _ => return Err(unexpected(src, &op_pair)),
        };
        let rhs = parse_term(src, child(src, span, &mut inner)?)?;
        result = Expr::BinaryOp(Box::new(result), op, Box::new(rhs));
    }

    Ok(result)
}

fn parse_term(src: &SourceContext, pair: Pair<Rule>) -> Result<Expr, ParseError> {
    // term = prefix? ~ primary ~ (mul_op ~ prefix? ~ primary)*
    let span = span_of(&pair);
    let mut inner = pair.into_inner().peekable();

    let mut result = parse_operand(src, span, &mut inner)?;
    while let Some(op_pair) = inner.next() {
        let op = match op_pair.as_str() {
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            _ => return Err(unexpected(src, &op_pair)),
        };
        let rhs = parse_operand(src, span, &mut inner)?;
        result = Expr::BinaryOp(Box::new(result), op, Box::new(rhs));
    }

    Ok(result)
}

/// `prefix? ~ primary`
fn parse_operand(src: &SourceContext, term: SourceSpan, inner: &mut Peekable<Pairs<'_, Rule>>) -> Result<Expr, ParseError> {
    let prefix = match inner.next_if(|p| p.as_rule() == Rule::prefix) {
        Some(p) if p.as_str() == "-" => Some((UnaryOp::Neg, span_of(&p))),
        Some(p) => Some((UnaryOp::Pos, span_of(&p))),
        None => None,
    };
    let primary = inner.next().ok_or_else(|| ParseError::Syntax {
        message: "missing operand".into(),
        src: src.named_source(),
        span: term,
    })?;
    let primary_span = span_of(&primary);
    let expr = parse_primary(src, primary)?;

    Ok(match prefix {
        Some((op, op_span)) => {
            let end = primary_span.offset() + primary_span.len();
            let span = SourceSpan::from((op_span.offset(), end - op_span.offset()));
            Expr::UnaryOp(op, Box::new(expr), span)
        }
        None => expr,
    })
}

fn parse_primary(src: &SourceContext, pair: Pair<Rule>) -> Result<Expr, ParseError> {
    let span = span_of(&pair);
    let inner = child(src, span, &mut pair.into_inner())?;
    match inner.as_rule() {
        Rule::number => parse_number(src, inner),
        Rule::variable => Ok(Expr::Variable(inner.as_str().to_string(), span)),
        Rule::halfwall => Ok(Expr::HalfWall(span)),
        Rule::paren_expr => {
            let expr = child(src, span, &mut inner.into_inner())?;
            Ok(Expr::ParenExpr(Box::new(parse_expr(src, expr)?), span))
        }
        _ => Err(unexpected(src, &inner)),
    }
}

fn parse_number(src: &SourceContext, pair: Pair<Rule>) -> Result<Expr, ParseError> {
    let span = span_of(&pair);
    let invalid = |message: String| ParseError::InvalidNumber {
        message,
        src: src.named_source(),
        span,
    };
    let value: f64 = pair.as_str().parse().map_err(|e: std::num::ParseFloatError| invalid(e.to_string()))?;
    if !value.is_finite() {
        return Err(invalid(format!("{} is out of range", pair.as_str())));
    }
    Ok(Expr::Number(value, span))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(source: &str) -> Result<Plan, ParseError> {
        parse(&SourceContext::new("test.plan", source))
    }

    fn single(source: &str) -> Statement {
        let mut plan = parse_str(source).unwrap();
        assert_eq!(plan.statements.len(), 1);
        plan.statements.remove(0)
    }

    #[test]
    fn parse_canvas() {
        let Statement::Canvas(canvas) = single("canvas padding 0.1 width 10.34") else {
            panic!("expected canvas");
        };
        assert!(matches!(canvas.padding, Expr::Number(n, _) if n == 0.1));
        assert!(matches!(canvas.width, Expr::Number(n, _) if n == 10.34));
    }

    #[test]
    fn parse_precedence() {
        let Statement::Assignment(assignment) = single("$x = 1 + 2 * 3") else {
            panic!("expected assignment");
        };
        assert_eq!(assignment.name, "$x");
        let Expr::BinaryOp(lhs, BinaryOp::Add, rhs) = assignment.value else {
            panic!("expected addition at the top");
        };
        assert!(matches!(*lhs, Expr::Number(n, _) if n == 1.0));
        assert!(matches!(*rhs, Expr::BinaryOp(_, BinaryOp::Mul, _)));
    }

    #[test]
    fn parse_unary_and_parens() {
        let Statement::Assignment(assignment) = single("$x = -($w - halfwall) / 2") else {
            panic!("expected assignment");
        };
        let Expr::BinaryOp(lhs, BinaryOp::Div, _) = assignment.value else {
            panic!("expected division");
        };
        let Expr::UnaryOp(UnaryOp::Neg, inner, span) = *lhs else {
            panic!("expected negation");
        };
        assert_eq!(span, SourceSpan::from((5, 16)));
        assert!(matches!(*inner, Expr::ParenExpr(..)));
    }

    #[test]
    fn parse_wall_with_door() {
        let Statement::Wall(wall) = single("wall (0, 4.29) to (3.09, 4.29) door at 3.09 - 1.1 width 0.9 first-left") else {
            panic!("expected wall");
        };
        let Some(WallFeature::Door(door)) = wall.feature else {
            panic!("expected door");
        };
        assert_eq!(door.direction, DoorDirection::FirstLeft);
        assert!(matches!(door.width, Expr::Number(n, _) if n == 0.9));
    }

    #[test]
    fn parse_wall_with_dimension() {
        let Statement::Wall(wall) = single("wall (-halfwall, 0) to ($w1, 0) dimension (0, -0.2)") else {
            panic!("expected wall");
        };
        assert!(matches!(wall.from.x, Expr::UnaryOp(UnaryOp::Neg, ..)));
        assert!(matches!(wall.feature, Some(WallFeature::Dimension(_))));
    }

    #[test]
    fn parse_line_attributes() {
        let Statement::Line(line) = single("line (0, 0) to (1, 0) color #a0a0a0 width 2 dash 4, 2 cap round") else {
            panic!("expected line");
        };
        assert_eq!(line.attributes.len(), 4);
        assert!(matches!(&line.attributes[0], LineAttribute::Color(c) if c.name == "#a0a0a0"));
        assert!(matches!(&line.attributes[2], LineAttribute::Dash(d) if d.len() == 2));
        assert!(matches!(line.attributes[3], LineAttribute::Cap(LineCap::Round)));
    }

    #[test]
    fn parse_text_flags_and_escapes() {
        let Statement::Text(text) = single(r#"text (1, 1) "say \"hi\"" bold mono rotate -90 size 12"#) else {
            panic!("expected text");
        };
        assert_eq!(text.text, r#"say "hi""#);
        assert_eq!(text.attributes.len(), 4);
        assert!(matches!(text.attributes[0], TextAttribute::Bold));
        assert!(matches!(text.attributes[2], TextAttribute::Rotate(_)));
    }

    #[test]
    fn parse_nested_rooms_and_comments() {
        let source = r#"
            # ground floor
            room "Flat" {
                room "Bad" {
                    wall (0, 0) to (1, 0)   # north wall
                    area (0.5, 0.5) 1 * 1
                }
            }
        "#;
        let plan = parse_str(source).unwrap();
        let [Statement::Room(flat)] = plan.statements.as_slice() else {
            panic!("expected one room");
        };
        assert_eq!(flat.name, "Flat");
        let [Statement::Room(bad)] = flat.body.as_slice() else {
            panic!("expected nested room");
        };
        assert_eq!(bad.body.len(), 2);
    }

    #[test]
    fn parse_syntax_error_has_span() {
        let err = parse_str("wall (0, 0) at (1, 0)").unwrap_err();
        let ParseError::Syntax { span, .. } = err else {
            panic!("expected syntax error");
        };
        assert_eq!(span.offset(), 12);
    }

    #[test]
    fn parse_rejects_huge_number() {
        assert!(matches!(
            parse_str("$x = 1e999"),
            Err(ParseError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn parse_empty_plan() {
        assert!(parse_str("  # nothing here\n").unwrap().statements.is_empty());
    }
}
