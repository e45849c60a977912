//! Stack-machine evaluator for compiled formulas.

use super::bytecode::{Builtin, Op, Program};
use super::funcs;

/// Executes [`Program`]s against a value of `x`.
///
/// Holds only a scratch operand stack, cleared on every call, so one evaluator
/// can be reused across programs and calls without allocating.
#[derive(Debug, Default, Clone)]
pub struct Evaluator {
    stack: Vec<f64>,
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            stack: Vec::with_capacity(8),
        }
    }

    /// Evaluate `program` at `x`.
    ///
    /// Pure in `(program, x)`. IEEE-754 semantics throughout: division by zero
    /// and domain errors yield infinities or NaN, never a panic.
    pub fn run(&mut self, program: &Program, x: f64) -> f64 {
        self.stack.clear();
        self.stack.reserve(program.max_stack());

        for &op in program.code() {
            let value = match op {
                Op::Const(index) => program.constants()[index as usize],
                Op::Arg => x,
                Op::Neg => -self.pop(),
                Op::Add => {
                    let (a, b) = self.pop2();
                    a + b
                }
                Op::Sub => {
                    let (a, b) = self.pop2();
                    a - b
                }
                Op::Mul => {
                    let (a, b) = self.pop2();
                    a * b
                }
                Op::Div => {
                    let (a, b) = self.pop2();
                    a / b
                }
                Op::Call(f) => self.call(f),
            };
            self.stack.push(value);
        }

        self.stack.last().copied().unwrap_or(f64::NAN)
    }

    fn call(&mut self, f: Builtin) -> f64 {
        match f {
            Builtin::Abs => self.pop().abs(),
            Builtin::Sin => self.pop().sin(),
            Builtin::Cos => self.pop().cos(),
            Builtin::Tan => self.pop().tan(),
            Builtin::Asin => self.pop().asin(),
            Builtin::Acos => self.pop().acos(),
            Builtin::Atan => self.pop().atan(),
            Builtin::Atan2 => {
                let (y, x) = self.pop2();
                y.atan2(x)
            }
            Builtin::Exp => self.pop().exp(),
            Builtin::Log => self.pop().ln(),
            Builtin::Log2 => self.pop().log2(),
            Builtin::Sqrt => self.pop().sqrt(),
            Builtin::InverseSqrt => funcs::inversesqrt(self.pop()),
            Builtin::Pow => {
                let (x, y) = self.pop2();
                x.powf(y)
            }
            Builtin::Sign => funcs::sign(self.pop()),
            Builtin::Floor => self.pop().floor(),
            Builtin::Ceil => self.pop().ceil(),
            Builtin::Round => self.pop().round(),
            Builtin::Fract => funcs::fract(self.pop()),
            Builtin::Mod => {
                let (x, y) = self.pop2();
                funcs::modulo(x, y)
            }
            Builtin::Min => {
                let (a, b) = self.pop2();
                a.min(b)
            }
            Builtin::Max => {
                let (a, b) = self.pop2();
                a.max(b)
            }
            Builtin::Clamp => {
                let (x, lo, hi) = self.pop3();
                funcs::clamp(x, lo, hi)
            }
            Builtin::Step => {
                let (edge, x) = self.pop2();
                funcs::step(edge, x)
            }
            Builtin::Smoothstep => {
                let (e0, e1, x) = self.pop3();
                funcs::smoothstep(e0, e1, x)
            }
            Builtin::Until => {
                let (x, v, t) = self.pop3();
                funcs::until(x, v, t)
            }
            Builtin::After => {
                let (x, v, t) = self.pop3();
                funcs::after(x, v, t)
            }
        }
    }

    // Compiled programs never underflow. Should one do so, the result is NaN,
    // which the renderer treats as a rest.
    fn pop(&mut self) -> f64 {
        self.stack.pop().unwrap_or(f64::NAN)
    }

    fn pop2(&mut self) -> (f64, f64) {
        let b = self.pop();
        let a = self.pop();
        (a, b)
    }

    fn pop3(&mut self) -> (f64, f64, f64) {
        let c = self.pop();
        let b = self.pop();
        let a = self.pop();
        (a, b, c)
    }
}
