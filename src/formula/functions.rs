use crate::formula::token::Arity;

/// Built-in functions a formula may call. All operate component-wise on RGBA samples
/// unless noted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Builtin {
    Abs,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Exp,
    Log,
    Exp2,
    Log2,
    Sqrt,
    Sign,
    Floor,
    Ceil,
    Fract,
    /// Broadcast the red channel.
    Red,
    /// Broadcast the green channel.
    Green,
    /// Broadcast the blue channel.
    Blue,
    /// Broadcast the alpha channel.
    Alpha,
    /// Broadcast Rec. 709 luminance of rgb.
    Luminance,

    Min,
    Max,
    Pow,
    Atan2,
    Step,
    Mod,
    /// `a` composited over `b` with straight alpha.
    Blend,

    Clamp,
    Mix,
    Smoothstep,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FunctionSpec {
    pub name: &'static str,
    pub arity: Arity,
    pub builtin: Builtin,
}

const fn spec(name: &'static str, arity: Arity, builtin: Builtin) -> FunctionSpec {
    FunctionSpec {
        name,
        arity,
        builtin,
    }
}

/// Every function name the lexer recognizes, with its arity.
pub const CATALOG: &[FunctionSpec] = &[
    spec("abs", Arity::Unary, Builtin::Abs),
    spec("sin", Arity::Unary, Builtin::Sin),
    spec("cos", Arity::Unary, Builtin::Cos),
    spec("tan", Arity::Unary, Builtin::Tan),
    spec("asin", Arity::Unary, Builtin::Asin),
    spec("acos", Arity::Unary, Builtin::Acos),
    spec("atan", Arity::Unary, Builtin::Atan),
    spec("exp", Arity::Unary, Builtin::Exp),
    spec("log", Arity::Unary, Builtin::Log),
    spec("exp2", Arity::Unary, Builtin::Exp2),
    spec("log2", Arity::Unary, Builtin::Log2),
    spec("sqrt", Arity::Unary, Builtin::Sqrt),
    spec("sign", Arity::Unary, Builtin::Sign),
    spec("floor", Arity::Unary, Builtin::Floor),
    spec("ceil", Arity::Unary, Builtin::Ceil),
    spec("fract", Arity::Unary, Builtin::Fract),
    spec("red", Arity::Unary, Builtin::Red),
    spec("green", Arity::Unary, Builtin::Green),
    spec("blue", Arity::Unary, Builtin::Blue),
    spec("alpha", Arity::Unary, Builtin::Alpha),
    spec("luminance", Arity::Unary, Builtin::Luminance),
    spec("min", Arity::Binary, Builtin::Min),
    spec("max", Arity::Binary, Builtin::Max),
    spec("pow", Arity::Binary, Builtin::Pow),
    spec("atan2", Arity::Binary, Builtin::Atan2),
    spec("step", Arity::Binary, Builtin::Step),
    spec("mod", Arity::Binary, Builtin::Mod),
    spec("blend", Arity::Binary, Builtin::Blend),
    spec("clamp", Arity::Ternary, Builtin::Clamp),
    spec("mix", Arity::Ternary, Builtin::Mix),
    spec("smoothstep", Arity::Ternary, Builtin::Smoothstep),
];

/// Look a function up by its exact (lowercase) name.
pub fn lookup(name: &str) -> Option<&'static FunctionSpec> {
    CATALOG.iter().find(|f| f.name == name)
}

/// Arity class of `name`, or [`Arity::Unknown`] when the catalog does not list it.
pub fn arity_of(name: &str) -> Arity {
    lookup(name).map_or(Arity::Unknown, |f| f.arity)
}
