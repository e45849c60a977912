//! Bytecode for the formula stack machine.

/// A builtin function. The name and parameter table lives in
/// [`builtins`](super::builtins); the evaluator only ever sees this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Abs,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Atan2,
    Exp,
    Log,
    Log2,
    Sqrt,
    InverseSqrt,
    Pow,
    Sign,
    Floor,
    Ceil,
    Round,
    Fract,
    Mod,
    Min,
    Max,
    Clamp,
    Step,
    Smoothstep,
    Until,
    After,
}

impl Builtin {
    /// Number of operands popped from the stack.
    pub fn arity(self) -> usize {
        match self {
            Builtin::Abs
            | Builtin::Sin
            | Builtin::Cos
            | Builtin::Tan
            | Builtin::Asin
            | Builtin::Acos
            | Builtin::Atan
            | Builtin::Exp
            | Builtin::Log
            | Builtin::Log2
            | Builtin::Sqrt
            | Builtin::InverseSqrt
            | Builtin::Sign
            | Builtin::Floor
            | Builtin::Ceil
            | Builtin::Round
            | Builtin::Fract => 1,
            Builtin::Atan2
            | Builtin::Pow
            | Builtin::Mod
            | Builtin::Min
            | Builtin::Max
            | Builtin::Step => 2,
            Builtin::Clamp | Builtin::Smoothstep | Builtin::Until | Builtin::After => 3,
        }
    }
}

/// A single stack-machine instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Push `constants[index]`.
    Const(u8),
    /// Push the argument `x`.
    Arg,
    Neg,
    Add,
    Sub,
    Mul,
    Div,
    Call(Builtin),
}

impl Op {
    /// Net change in stack depth after executing this op.
    pub fn stack_effect(self) -> isize {
        match self {
            Op::Const(_) | Op::Arg => 1,
            Op::Neg => 0,
            Op::Add | Op::Sub | Op::Mul | Op::Div => -1,
            Op::Call(f) => 1 - f.arity() as isize,
        }
    }
}

/// A compiled formula.
///
/// Every `Const` index refers to a valid pool slot and the code leaves exactly
/// one value on the stack; both hold by construction in the compiler.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub(crate) code: Vec<Op>,
    pub(crate) constants: Vec<f64>,
    pub(crate) functions: Vec<&'static str>,
    pub(crate) max_stack: usize,
}

impl Program {
    pub fn code(&self) -> &[Op] {
        &self.code
    }

    pub fn constants(&self) -> &[f64] {
        &self.constants
    }

    /// Builtin names referenced by the source, sorted and de-duplicated.
    pub fn functions(&self) -> &[&'static str] {
        &self.functions
    }

    /// Whether the formula calls the named builtin.
    pub fn uses(&self, name: &str) -> bool {
        self.functions.iter().any(|f| *f == name)
    }

    /// Deepest operand stack the program needs.
    pub fn max_stack(&self) -> usize {
        self.max_stack
    }

    /// Evaluate with a throwaway evaluator. Prefer a reused
    /// [`Evaluator`](super::Evaluator) in loops.
    pub fn eval(&self, x: f64) -> f64 {
        super::Evaluator::new().run(self, x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_effects() {
        assert_eq!(Op::Const(0).stack_effect(), 1);
        assert_eq!(Op::Neg.stack_effect(), 0);
        assert_eq!(Op::Div.stack_effect(), -1);
        assert_eq!(Op::Call(Builtin::Sin).stack_effect(), 0);
        assert_eq!(Op::Call(Builtin::Clamp).stack_effect(), -2);
    }

    #[test]
    fn arity_of_gates() {
        assert_eq!(Builtin::Until.arity(), 3);
        assert_eq!(Builtin::After.arity(), 3);
        assert_eq!(Builtin::Step.arity(), 2);
    }
}
