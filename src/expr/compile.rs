//! Code generation: turns an [`Expr`] tree into a [`Program`].
//!
//! Operands are emitted before their operator (post-order), so the stack
//! machine always finds arguments in source order. Literal values are interned
//! into a constant pool addressed by a `u8`.

use std::collections::{BTreeSet, HashMap};
use std::f64::consts::{E, PI};

use super::ast::{BinaryOp, Expr};
use super::builtins;
use super::bytecode::{Op, Program};
use super::error::{CompileError, ErrorKind};
use super::funcs::EPSILON;

/// The golden ratio.
const PHI: f64 = 1.618_033_988_749_895;

/// Largest constant pool a `u8` operand can address.
pub const MAX_CONSTANTS: usize = 256;

/// Look up one of the named constants.
pub fn named_constant(name: &str) -> Option<f64> {
    match name {
        "pi" => Some(PI),
        "phi" => Some(PHI),
        "e" => Some(E),
        "eps" => Some(EPSILON),
        _ => None,
    }
}

/// Compile a parsed expression.
pub fn compile_expr(expr: &Expr) -> Result<Program, CompileError> {
    let mut gen = CodeGen::default();
    gen.expr(expr)?;

    let max_stack = gen.max_depth();
    Ok(Program {
        code: gen.code,
        constants: gen.constants,
        functions: gen.functions.into_iter().collect(),
        max_stack,
    })
}

#[derive(Default)]
struct CodeGen {
    code: Vec<Op>,
    constants: Vec<f64>,
    // Keyed by bit pattern: f64 is not Hash, and 0.0 / -0.0 must stay distinct.
    pool: HashMap<u64, u8>,
    functions: BTreeSet<&'static str>,
}

impl CodeGen {
    fn expr(&mut self, expr: &Expr) -> Result<(), CompileError> {
        match expr {
            Expr::Number { value, line, col } => self.constant(*value, *line, *col),
            Expr::Ident { name, line, col } => self.ident(name, *line, *col),
            Expr::Neg(inner) => {
                self.expr(inner)?;
                self.code.push(Op::Neg);
                Ok(())
            }
            Expr::Binary { op, lhs, rhs } => {
                self.expr(lhs)?;
                self.expr(rhs)?;
                self.code.push(match op {
                    BinaryOp::Add => Op::Add,
                    BinaryOp::Sub => Op::Sub,
                    BinaryOp::Mul => Op::Mul,
                    BinaryOp::Div => Op::Div,
                });
                Ok(())
            }
            Expr::Call {
                name,
                args,
                line,
                col,
            } => self.call(name, args, *line, *col),
        }
    }

    fn ident(&mut self, name: &str, line: usize, col: usize) -> Result<(), CompileError> {
        if name == "x" {
            self.code.push(Op::Arg);
            return Ok(());
        }
        match named_constant(name) {
            Some(v) => self.constant(v, line, col),
            None => Err(CompileError::new(
                ErrorKind::UnknownIdent,
                format!("unknown variable {name:?}"),
                line,
                col,
            )),
        }
    }

    fn call(
        &mut self,
        name: &str,
        args: &[Expr],
        line: usize,
        col: usize,
    ) -> Result<(), CompileError> {
        let func = builtins::lookup(name).ok_or_else(|| {
            CompileError::new(
                ErrorKind::UnknownFunction,
                format!("unknown function {name:?}"),
                line,
                col,
            )
        })?;

        if args.len() != func.arity() {
            return Err(CompileError::new(
                ErrorKind::Arity,
                format!(
                    "{name:?} expects {} arguments, found {}",
                    func.arity(),
                    args.len()
                ),
                line,
                col,
            ));
        }

        self.functions.insert(func.name);
        for arg in args {
            self.expr(arg)?;
        }
        self.code.push(Op::Call(func.builtin));
        Ok(())
    }

    fn constant(&mut self, value: f64, line: usize, col: usize) -> Result<(), CompileError> {
        let index = match self.pool.get(&value.to_bits()) {
            Some(&index) => index,
            None => {
                if self.constants.len() >= MAX_CONSTANTS {
                    return Err(CompileError::new(
                        ErrorKind::ConstantPool,
                        format!("too many distinct constants (limit is {MAX_CONSTANTS})"),
                        line,
                        col,
                    ));
                }
                let index = self.constants.len() as u8;
                self.constants.push(value);
                self.pool.insert(value.to_bits(), index);
                index
            }
        };
        self.code.push(Op::Const(index));
        Ok(())
    }

    fn max_depth(&self) -> usize {
        let mut depth: isize = 0;
        let mut max = 0;
        for op in &self.code {
            depth += op.stack_effect();
            max = max.max(depth);
        }
        max as usize
    }
}
