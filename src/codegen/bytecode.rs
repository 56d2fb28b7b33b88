use crate::foundation::core::ImageIndex;
use crate::formula::functions::Builtin;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstIdx(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    PushConst(ConstIdx),
    LoadImage(ImageIndex),

    Neg,
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,

    CallBuiltin { id: Builtin, argc: u8 },
}

/// Postfix program over RGBA samples, produced by [`lower`](super::lower::lower).
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub ops: Vec<Op>,
    pub consts: Vec<f32>,
    /// Deepest stack the program reaches; lets callers size a reusable stack once.
    pub max_stack: usize,
}

impl Program {
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            consts: Vec::new(),
            max_stack: 0,
        }
    }

    pub fn push_const(&mut self, c: f32) -> ConstIdx {
        let idx = ConstIdx(self.consts.len() as u32);
        self.consts.push(c);
        idx
    }

    /// Highest image index the program loads.
    pub fn max_image(&self) -> Option<ImageIndex> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::LoadImage(i) => Some(*i),
                _ => None,
            })
            .max()
    }
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}
