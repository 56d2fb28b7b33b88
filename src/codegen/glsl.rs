use std::fmt::Write as _;

use crate::codegen::CodegenError;
use crate::formula::functions::{Builtin, lookup};
use crate::formula::token::{Arity, Expr, UnaryOp};

/// GLSL emission settings.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GlslOptions {
    /// Expression sampling one input image; `{}` is replaced with the image index.
    pub sample_template: String,
    /// Prefix of the sampler uniforms declared by [`fragment_shader`].
    pub sampler_prefix: String,
}

impl Default for GlslOptions {
    fn default() -> Self {
        Self {
            sample_template: "texture(u_image{}, texcoord)".to_owned(),
            sampler_prefix: "u_image".to_owned(),
        }
    }
}

/// Rec. 709 luma weights.
const LUMA: &str = "vec3(0.2126, 0.7152, 0.0722)";

/// Helper functions referenced by emitted expressions. Must precede them in the shader.
pub const HELPERS: &str = "\
vec4 tf_blend(vec4 top, vec4 bottom) {
    return vec4(mix(bottom.rgb, top.rgb, top.a), top.a + bottom.a * (1.0 - top.a));
}
";

/// Emit a `vec4` GLSL expression for `expr`.
pub fn emit(expr: &Expr, opts: &GlslOptions) -> Result<String, CodegenError> {
    let mut out = String::new();
    emit_into(expr, opts, &mut out)?;
    Ok(out)
}

/// Emit a complete fragment shader combining a color and an alpha formula: rgb comes
/// from `color`, alpha from the `.a` of `alpha`.
pub fn fragment_shader(
    color: &Expr,
    alpha: &Expr,
    num_images: usize,
    opts: &GlslOptions,
) -> Result<String, CodegenError> {
    let color = emit(color, opts)?;
    let alpha = emit(alpha, opts)?;

    let mut src = String::from("#version 330 core\n\n");
    for i in 0..num_images {
        let _ = writeln!(src, "uniform sampler2D {}{i};", opts.sampler_prefix);
    }
    src.push_str("in vec2 texcoord;\nout vec4 fragColor;\n\n");
    src.push_str(HELPERS);
    src.push('\n');
    let _ = write!(
        src,
        "void main() {{\n    vec4 color = {color};\n    vec4 alpha = {alpha};\n    fragColor = vec4(color.rgb, alpha.a);\n}}\n"
    );
    Ok(src)
}

fn emit_into(e: &Expr, opts: &GlslOptions, out: &mut String) -> Result<(), CodegenError> {
    match e {
        Expr::Number { value } => {
            // `{:?}` always prints a decimal point or exponent, which GLSL needs for floats.
            let _ = write!(out, "vec4({value:?})");
        }
        Expr::Image { index } => {
            out.push_str(&opts.sample_template.replace("{}", &index.0.to_string()));
        }
        Expr::Group { inner } => {
            out.push('(');
            emit_into(inner, opts, out)?;
            out.push(')');
        }
        Expr::Unary {
            op: UnaryOp::Neg,
            operand,
        } => {
            out.push_str("(-");
            emit_into(operand, opts, out)?;
            out.push(')');
        }
        Expr::Binary { op, left, right } => {
            use crate::formula::token::BinaryOp as B;
            let cmp = match op {
                B::Lt => Some("lessThan"),
                B::Le => Some("lessThanEqual"),
                B::Gt => Some("greaterThan"),
                B::Ge => Some("greaterThanEqual"),
                B::Eq => Some("equal"),
                B::Ne => Some("notEqual"),
                B::Add | B::Sub | B::Mul | B::Div | B::Pow => None,
            };
            if let Some(f) = cmp {
                let _ = write!(out, "vec4({f}(");
                emit_into(left, opts, out)?;
                out.push_str(", ");
                emit_into(right, opts, out)?;
                out.push_str("))");
            } else if *op == B::Pow {
                call(out, "pow", &[&**left, &**right], opts)?;
            } else {
                out.push('(');
                emit_into(left, opts, out)?;
                let _ = write!(out, " {} ", op.symbol());
                emit_into(right, opts, out)?;
                out.push(')');
            }
        }
        Expr::UnaryFunction { name, arg } => {
            let b = builtin(name, Arity::Unary, 1)?;
            let swizzle = match b {
                Builtin::Red => Some(".r"),
                Builtin::Green => Some(".g"),
                Builtin::Blue => Some(".b"),
                Builtin::Alpha => Some(".a"),
                _ => None,
            };
            if let Some(s) = swizzle {
                out.push_str("vec4(");
                emit_into(arg, opts, out)?;
                let _ = write!(out, "{s})");
            } else if b == Builtin::Luminance {
                out.push_str("vec4(dot((");
                emit_into(arg, opts, out)?;
                let _ = write!(out, ").rgb, {LUMA}))");
            } else {
                call(out, glsl_name(b), &[&**arg], opts)?;
            }
        }
        Expr::BinaryFunction { name, left, right } => {
            let b = builtin(name, Arity::Binary, 2)?;
            call(out, glsl_name(b), &[&**left, &**right], opts)?;
        }
        Expr::TernaryFunction { name, args } => {
            let b = builtin(name, Arity::Ternary, 3)?;
            let [a, b2, c] = &**args;
            call(out, glsl_name(b), &[a, b2, c], opts)?;
        }
    }
    Ok(())
}

fn call(out: &mut String, f: &str, args: &[&Expr], opts: &GlslOptions) -> Result<(), CodegenError> {
    out.push_str(f);
    out.push('(');
    for (i, a) in args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        emit_into(a, opts, out)?;
    }
    out.push(')');
    Ok(())
}

fn builtin(name: &str, arity: Arity, argc: u8) -> Result<Builtin, CodegenError> {
    lookup(name)
        .filter(|f| f.arity == arity)
        .map(|f| f.builtin)
        .ok_or_else(|| CodegenError::UnknownFunction {
            name: name.to_owned(),
            argc,
        })
}

fn glsl_name(b: Builtin) -> &'static str {
    match b {
        Builtin::Abs => "abs",
        Builtin::Sin => "sin",
        Builtin::Cos => "cos",
        Builtin::Tan => "tan",
        Builtin::Asin => "asin",
        Builtin::Acos => "acos",
        Builtin::Atan | Builtin::Atan2 => "atan",
        Builtin::Exp => "exp",
        Builtin::Log => "log",
        Builtin::Exp2 => "exp2",
        Builtin::Log2 => "log2",
        Builtin::Sqrt => "sqrt",
        Builtin::Sign => "sign",
        Builtin::Floor => "floor",
        Builtin::Ceil => "ceil",
        Builtin::Fract => "fract",
        // Handled by swizzle/dot emission; never called by name.
        Builtin::Red | Builtin::Green | Builtin::Blue | Builtin::Alpha | Builtin::Luminance => {
            "vec4"
        }
        Builtin::Min => "min",
        Builtin::Max => "max",
        Builtin::Pow => "pow",
        Builtin::Step => "step",
        Builtin::Mod => "mod",
        Builtin::Blend => "tf_blend",
        Builtin::Clamp => "clamp",
        Builtin::Mix => "mix",
        Builtin::Smoothstep => "smoothstep",
    }
}

#[cfg(test)]
#[path = "../../tests/unit/codegen/glsl.rs"]
mod tests;
