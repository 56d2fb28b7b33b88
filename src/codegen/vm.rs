use crate::codegen::bytecode::{Op, Program};
use crate::foundation::core::{ImageIndex, Rgba};
use crate::formula::functions::Builtin;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum VmError {
    #[error("stack underflow")]
    StackUnderflow,

    #[error("const idx {0} out of range")]
    BadConst(u32),

    #[error("no sample for image {0}")]
    MissingImage(ImageIndex),

    #[error("{builtin:?} expects {expected} args, got {got}")]
    Arity {
        builtin: Builtin,
        expected: u8,
        got: u8,
    },

    #[error("stack has {0} values at end of program")]
    Unbalanced(usize),
}

/// Evaluate `p` for one pixel. `sample` returns the input image color at that pixel.
pub fn eval(
    p: &Program,
    sample: impl FnMut(ImageIndex) -> Option<Rgba>,
) -> Result<Rgba, VmError> {
    let mut stack: Vec<Rgba> = Vec::with_capacity(p.max_stack);
    eval_with_stack(p, &mut stack, sample)
}

/// Evaluate against a slice of per-image samples.
pub fn eval_samples(p: &Program, samples: &[Rgba]) -> Result<Rgba, VmError> {
    eval(p, |i| samples.get(i.0 as usize).copied())
}

/// [`eval`] reusing a caller-owned stack, for hot per-pixel loops.
pub fn eval_with_stack(
    p: &Program,
    stack: &mut Vec<Rgba>,
    mut sample: impl FnMut(ImageIndex) -> Option<Rgba>,
) -> Result<Rgba, VmError> {
    stack.clear();

    for &op in &p.ops {
        match op {
            Op::PushConst(idx) => {
                let c = p
                    .consts
                    .get(idx.0 as usize)
                    .ok_or(VmError::BadConst(idx.0))?;
                stack.push(Rgba::splat(*c));
            }
            Op::LoadImage(i) => stack.push(sample(i).ok_or(VmError::MissingImage(i))?),

            Op::Neg => {
                let v = pop(stack)?;
                stack.push(-v);
            }
            Op::Add => bin(stack, |a, b| a + b)?,
            Op::Sub => bin(stack, |a, b| a - b)?,
            Op::Mul => bin(stack, |a, b| a * b)?,
            Op::Div => bin(stack, |a, b| a / b)?,
            Op::Pow => bin(stack, |a, b| a.zip(b, f32::powf))?,

            Op::Lt => cmp(stack, |a, b| a < b)?,
            Op::Le => cmp(stack, |a, b| a <= b)?,
            Op::Gt => cmp(stack, |a, b| a > b)?,
            Op::Ge => cmp(stack, |a, b| a >= b)?,
            Op::Eq => cmp(stack, |a, b| a == b)?,
            Op::Ne => cmp(stack, |a, b| a != b)?,

            Op::CallBuiltin { id, argc } => call_builtin(stack, id, argc)?,
        }
    }

    if stack.len() != 1 {
        return Err(VmError::Unbalanced(stack.len()));
    }
    pop(stack)
}

fn pop(stack: &mut Vec<Rgba>) -> Result<Rgba, VmError> {
    stack.pop().ok_or(VmError::StackUnderflow)
}

fn bin(stack: &mut Vec<Rgba>, f: impl FnOnce(Rgba, Rgba) -> Rgba) -> Result<(), VmError> {
    let b = pop(stack)?;
    let a = pop(stack)?;
    stack.push(f(a, b));
    Ok(())
}

fn cmp(stack: &mut Vec<Rgba>, f: impl Fn(f32, f32) -> bool) -> Result<(), VmError> {
    bin(stack, |a, b| a.zip(b, |x, y| if f(x, y) { 1.0 } else { 0.0 }))
}

fn glsl_sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

fn smoothstep(e0: f32, e1: f32, x: f32) -> f32 {
    let t = ((x - e0) / (e1 - e0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Rec. 709 luma weights.
const LUMA: [f32; 3] = [0.2126, 0.7152, 0.0722];

fn call_builtin(stack: &mut Vec<Rgba>, id: Builtin, argc: u8) -> Result<(), VmError> {
    let expected = match id {
        Builtin::Min
        | Builtin::Max
        | Builtin::Pow
        | Builtin::Atan2
        | Builtin::Step
        | Builtin::Mod
        | Builtin::Blend => 2,
        Builtin::Clamp | Builtin::Mix | Builtin::Smoothstep => 3,
        _ => 1,
    };
    if argc != expected {
        return Err(VmError::Arity {
            builtin: id,
            expected,
            got: argc,
        });
    }

    match id {
        Builtin::Abs => unary(stack, f32::abs),
        Builtin::Sin => unary(stack, f32::sin),
        Builtin::Cos => unary(stack, f32::cos),
        Builtin::Tan => unary(stack, f32::tan),
        Builtin::Asin => unary(stack, f32::asin),
        Builtin::Acos => unary(stack, f32::acos),
        Builtin::Atan => unary(stack, f32::atan),
        Builtin::Exp => unary(stack, f32::exp),
        Builtin::Log => unary(stack, f32::ln),
        Builtin::Exp2 => unary(stack, f32::exp2),
        Builtin::Log2 => unary(stack, f32::log2),
        Builtin::Sqrt => unary(stack, f32::sqrt),
        Builtin::Sign => unary(stack, glsl_sign),
        Builtin::Floor => unary(stack, f32::floor),
        Builtin::Ceil => unary(stack, f32::ceil),
        Builtin::Fract => unary(stack, |x| x - x.floor()),
        Builtin::Red => channel(stack, |v| v.r),
        Builtin::Green => channel(stack, |v| v.g),
        Builtin::Blue => channel(stack, |v| v.b),
        Builtin::Alpha => channel(stack, |v| v.a),
        Builtin::Luminance => channel(stack, |v| LUMA[0] * v.r + LUMA[1] * v.g + LUMA[2] * v.b),

        Builtin::Min => bin(stack, |a, b| a.zip(b, f32::min)),
        Builtin::Max => bin(stack, |a, b| a.zip(b, f32::max)),
        Builtin::Pow => bin(stack, |a, b| a.zip(b, f32::powf)),
        Builtin::Atan2 => bin(stack, |a, b| a.zip(b, f32::atan2)),
        Builtin::Step => bin(stack, |edge, x| {
            edge.zip(x, |e, x| if x < e { 0.0 } else { 1.0 })
        }),
        Builtin::Mod => bin(stack, |a, b| a.zip(b, |x, y| x - y * (x / y).floor())),
        Builtin::Blend => bin(stack, |top, bottom| {
            let t = top.a;
            Rgba::new(
                bottom.r + (top.r - bottom.r) * t,
                bottom.g + (top.g - bottom.g) * t,
                bottom.b + (top.b - bottom.b) * t,
                t + bottom.a * (1.0 - t),
            )
        }),

        Builtin::Clamp => ternary(stack, |x, lo, hi| x.zip3(lo, hi, |x, lo, hi| x.max(lo).min(hi))),
        Builtin::Mix => ternary(stack, |a, b, t| a.zip3(b, t, |a, b, t| a + (b - a) * t)),
        Builtin::Smoothstep => ternary(stack, |e0, e1, x| e0.zip3(e1, x, smoothstep)),
    }
}

fn unary(stack: &mut Vec<Rgba>, f: impl FnMut(f32) -> f32) -> Result<(), VmError> {
    let v = pop(stack)?;
    stack.push(v.map(f));
    Ok(())
}

fn channel(stack: &mut Vec<Rgba>, f: impl FnOnce(Rgba) -> f32) -> Result<(), VmError> {
    let v = pop(stack)?;
    stack.push(Rgba::splat(f(v)));
    Ok(())
}

fn ternary(
    stack: &mut Vec<Rgba>,
    f: impl FnOnce(Rgba, Rgba, Rgba) -> Rgba,
) -> Result<(), VmError> {
    let c = pop(stack)?;
    let b = pop(stack)?;
    let a = pop(stack)?;
    stack.push(f(a, b, c));
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/codegen/vm.rs"]
mod tests;
