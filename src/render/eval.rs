//! Expression evaluation functions

use glam::{DVec2, dvec2};

use crate::ast::*;
use crate::errors::EvalError;
use crate::types::{Color, finite};

use super::context::RenderContext;

pub fn eval_expr(ctx: &RenderContext, expr: &Expr) -> Result<f64, EvalError> {
    let value = match expr {
        Expr::Number(n, _) => *n,
        Expr::Variable(name, span) => ctx.variables.get(name).copied().ok_or_else(|| EvalError::UndefinedVariable {
            name: name.clone(),
            src: ctx.src(),
            span: *span,
            suggestion: ctx.suggest(name),
        })?,
        Expr::HalfWall(span) => ctx.half_wall.ok_or_else(|| EvalError::NoDrawingArea {
            src: ctx.src(),
            span: *span,
        })?,
        Expr::BinaryOp(lhs, op, rhs) => {
            let l = eval_expr(ctx, lhs)?;
            let r = eval_expr(ctx, rhs)?;
            match op {
                BinaryOp::Add => l + r,
                BinaryOp::Sub => l - r,
                BinaryOp::Mul => l * r,
                BinaryOp::Div => {
                    if r == 0.0 {
                        return Err(EvalError::DivisionByZero {
                            src: ctx.src(),
                            span: rhs.span(),
                        });
                    }
                    l / r
                }
            }
        }
        Expr::UnaryOp(op, e, _) => {
            let v = eval_expr(ctx, e)?;
            match op {
                UnaryOp::Neg => -v,
                UnaryOp::Pos => v,
            }
        }
        Expr::ParenExpr(e, _) => eval_expr(ctx, e)?,
    };

    // Catches overflow to infinity
    finite(value).map_err(|reason| EvalError::InvalidNumeric {
        reason,
        src: ctx.src(),
        span: expr.span(),
    })
}

pub fn eval_position(ctx: &RenderContext, position: &Position) -> Result<DVec2, EvalError> {
    Ok(dvec2(eval_expr(ctx, &position.x)?, eval_expr(ctx, &position.y)?))
}

pub fn eval_color(ctx: &RenderContext, color: &ColorName) -> Result<Color, EvalError> {
    color.name.parse().map_err(|_| EvalError::UnknownColor {
        name: color.name.clone(),
        src: ctx.src(),
        span: color.span,
    })
}
