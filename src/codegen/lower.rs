use crate::codegen::CodegenError;
use crate::codegen::bytecode::{Op, Program};
use crate::formula::functions::lookup;
use crate::formula::token::{Arity, BinaryOp, Expr, UnaryOp};

/// Lower a reduced tree into postfix bytecode for [`vm`](super::vm).
pub fn lower(expr: &Expr) -> Result<Program, CodegenError> {
    let mut p = Program::new();
    let mut depth = 0usize;
    lower_expr(expr, &mut p, &mut depth)?;
    Ok(p)
}

fn lower_expr(e: &Expr, out: &mut Program, depth: &mut usize) -> Result<(), CodegenError> {
    match e {
        Expr::Number { value } => {
            let idx = out.push_const(*value);
            out.ops.push(Op::PushConst(idx));
            push(out, depth, 1);
        }
        Expr::Image { index } => {
            out.ops.push(Op::LoadImage(*index));
            push(out, depth, 1);
        }
        Expr::Group { inner } => lower_expr(inner, out, depth)?,
        Expr::Unary {
            op: UnaryOp::Neg,
            operand,
        } => {
            lower_expr(operand, out, depth)?;
            out.ops.push(Op::Neg);
        }
        Expr::Binary { op, left, right } => {
            lower_expr(left, out, depth)?;
            lower_expr(right, out, depth)?;
            out.ops.push(match op {
                BinaryOp::Add => Op::Add,
                BinaryOp::Sub => Op::Sub,
                BinaryOp::Mul => Op::Mul,
                BinaryOp::Div => Op::Div,
                BinaryOp::Pow => Op::Pow,
                BinaryOp::Lt => Op::Lt,
                BinaryOp::Le => Op::Le,
                BinaryOp::Gt => Op::Gt,
                BinaryOp::Ge => Op::Ge,
                BinaryOp::Eq => Op::Eq,
                BinaryOp::Ne => Op::Ne,
            });
            *depth -= 1;
        }
        Expr::UnaryFunction { name, arg } => {
            lower_expr(arg, out, depth)?;
            call(name, Arity::Unary, 1, out, depth)?;
        }
        Expr::BinaryFunction { name, left, right } => {
            lower_expr(left, out, depth)?;
            lower_expr(right, out, depth)?;
            call(name, Arity::Binary, 2, out, depth)?;
        }
        Expr::TernaryFunction { name, args } => {
            for a in args.iter() {
                lower_expr(a, out, depth)?;
            }
            call(name, Arity::Ternary, 3, out, depth)?;
        }
    }
    Ok(())
}

fn push(out: &mut Program, depth: &mut usize, n: usize) {
    *depth += n;
    out.max_stack = out.max_stack.max(*depth);
}

fn call(
    name: &str,
    arity: Arity,
    argc: u8,
    out: &mut Program,
    depth: &mut usize,
) -> Result<(), CodegenError> {
    let f = lookup(name)
        .filter(|f| f.arity == arity)
        .ok_or_else(|| CodegenError::UnknownFunction {
            name: name.to_owned(),
            argc,
        })?;
    out.ops.push(Op::CallBuiltin {
        id: f.builtin,
        argc,
    });
    *depth -= usize::from(argc) - 1;
    Ok(())
}
