//! Formula compiler: source text → tokens → AST → stack-machine bytecode.
//!
//! A formula is an arithmetic expression over a single free variable `x`,
//! the named constants `pi`, `phi`, `e`, `eps`, and a fixed set of builtin
//! functions. There are no statements, loops or user-defined functions.

pub mod ast;
pub mod builtins;
pub mod bytecode;
pub mod compile;
pub mod error;
pub mod eval;
pub mod funcs;
pub mod lexer;
pub mod parser;
pub mod token;

pub use builtins::{BuiltinFunc, BUILTINS};
pub use bytecode::{Builtin, Op, Program};
pub use error::{CompileError, ErrorKind};
pub use eval::Evaluator;

use compile::compile_expr;
use lexer::Lexer;
use parser::Parser;

/// The formula compiler.
pub struct Compiler;

impl Compiler {
    /// Parse a formula into an expression tree without generating code.
    pub fn parse(source: &str) -> Result<ast::Expr, CompileError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        let mut parser = Parser::new(tokens);
        parser.parse()
    }

    /// Parse and compile a formula into a [`Program`].
    pub fn compile(source: &str) -> Result<Program, CompileError> {
        let expr = Self::parse(source)?;
        compile_expr(&expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn run(src: &str, x: f64) -> f64 {
        let program = Compiler::compile(src).unwrap_or_else(|e| panic!("{src:?}: {e}"));
        Evaluator::new().run(&program, x)
    }

    /// Each case is exact: results must match the reference expression bit
    /// for bit.
    #[test]
    fn simple_programs() {
        let cases: &[(&str, &[(f64, f64)])] = &[
            // Literals
            ("1", &[(0.0, 1.0), (-1.0, 1.0)]),
            ("-1.5", &[(0.0, -1.5), (-1.0, -1.5)]),
            // Variable references
            ("x", &[(1.0, 1.0), (-1.6, -1.6)]),
            // Binary expressions
            ("x+x", &[(1.0, 2.0), (-1.5, -3.0)]),
            ("x-(x+2)", &[(1.0, -2.0), (-1.5, -2.0)]),
            ("2-x", &[(2.0, 0.0), (3.5, -1.5)]),
            ("x*x", &[(1.0, 1.0), (-4.0, 16.0)]),
            ("x*2.5", &[(1.0, 2.5), (-4.0, -4.0 * 2.5)]),
            ("x/3", &[(1.0, 1.0 / 3.0), (4.0, 4.0 / 3.0)]),
            // Functions
            ("sin(x)", &[(2.0, 2.0f64.sin()), (-1.5, (-1.5f64).sin())]),
            ("cos(x)", &[(2.0, 2.0f64.cos()), (-1.5, (-1.5f64).cos())]),
        ];

        for (src, runs) in cases {
            let program = Compiler::compile(src).unwrap_or_else(|e| panic!("{src:?}: {e}"));
            let mut evaluator = Evaluator::new();
            for &(arg, want) in runs.iter() {
                let have = evaluator.run(&program, arg);
                assert_eq!(have, want, "{src:?}: f({arg})");
            }
        }
    }

    #[test]
    fn run_is_pure() {
        let program = Compiler::compile("sin(x/2) - 0.2 * pow(x, 2)").unwrap();
        let mut evaluator = Evaluator::new();
        for x in [-3.0, 0.0, 0.5, 7.25] {
            let first = evaluator.run(&program, x);
            let second = evaluator.run(&program, x);
            assert_eq!(first.to_bits(), second.to_bits());
            assert_eq!(first.to_bits(), program.eval(x).to_bits());
        }
    }

    #[test]
    fn named_constants() {
        assert_eq!(run("pi", 0.0), PI);
        assert_eq!(run("e", 0.0), std::f64::consts::E);
        assert!((run("phi", 0.0) - 1.618_033_988_749_895).abs() < 1e-15);
        assert_eq!(run("eps", 0.0), 1e-9);
        assert_eq!(run("pi/9", 0.0), PI / 9.0);
    }

    #[test]
    fn precedence_and_unary_minus() {
        assert_eq!(run("1+2*3", 0.0), 7.0);
        assert_eq!(run("(1+2)*3", 0.0), 9.0);
        assert_eq!(run("-x*x", 3.0), -9.0);
        assert_eq!(run("2--x", 3.0), 5.0);
        assert_eq!(run("8/2/2", 0.0), 2.0);
    }

    #[test]
    fn multi_argument_builtins() {
        assert_eq!(run("min(x, 2)", 5.0), 2.0);
        assert_eq!(run("max(x, 2)", 5.0), 5.0);
        assert_eq!(run("clamp(x, 0, 1)", 5.0), 1.0);
        assert_eq!(run("pow(2, x)", 3.0), 8.0);
        assert_eq!(run("atan2(1, x)", 1.0), 1.0f64.atan2(1.0));
        assert_eq!(run("step(1, x)", 0.5), 0.0);
        assert_eq!(run("smoothstep(0, 1, x)", 0.5), 0.5);
        assert_eq!(run("mod(x, 3)", 7.0), 1.0);
    }

    #[test]
    fn gate_functions_splice_formulas() {
        let src = "max(until(x, 1, 5), after(x, 2, 5))";
        assert_eq!(run(src, 1.0), 1.0);
        assert_eq!(run(src, 6.0), 2.0);
    }

    #[test]
    fn division_by_zero_propagates() {
        assert_eq!(run("1/x", 0.0), f64::INFINITY);
        assert!(run("x/x", 0.0).is_nan());
        assert!(run("sqrt(x)", -1.0).is_nan());
    }

    #[test]
    fn arity_violation() {
        let err = Compiler::compile("clamp(1,2)").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Arity);
        assert!(err.message.contains("expects 3 arguments, found 2"));
    }

    #[test]
    fn unknown_function() {
        let err = Compiler::compile("bogus(1)").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownFunction);
        assert!(err.message.contains("bogus"));
    }

    #[test]
    fn unknown_identifier() {
        let err = Compiler::compile("x + y").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownIdent);
        assert_eq!(err.col, 5);
    }

    #[test]
    fn function_name_without_call_is_unknown_variable() {
        let err = Compiler::compile("sin").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownIdent);
    }

    #[test]
    fn syntax_errors() {
        for src in ["", "x +", "(x", "sin(x,)", "1.2.3", "x % 2", "+x"] {
            assert!(Compiler::compile(src).is_err(), "{src:?} should fail");
        }
    }

    #[test]
    fn constants_are_deduplicated() {
        let program = Compiler::compile("2*x + 2*x + pi + pi").unwrap();
        assert_eq!(program.constants(), &[2.0, PI]);
        assert!(program
            .code()
            .iter()
            .all(|op| !matches!(op, Op::Const(i) if *i as usize >= program.constants().len())));
    }

    #[test]
    fn constant_pool_limit() {
        let at_limit: Vec<String> = (0..256).map(|i| i.to_string()).collect();
        assert!(Compiler::compile(&at_limit.join("+")).is_ok());

        let over_limit: Vec<String> = (0..257).map(|i| i.to_string()).collect();
        let src = over_limit.join("+");
        let err = Compiler::compile(&src).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ConstantPool);
        // Points at the literal that did not fit, "256".
        assert_eq!((err.line, err.col), (1, src.len() - 2));
    }

    #[test]
    fn deep_nesting_is_a_compile_error() {
        let parens = format!("{}x{}", "(".repeat(10_000), ")".repeat(10_000));
        assert_eq!(Compiler::compile(&parens).unwrap_err().kind, ErrorKind::Parse);

        let minus = format!("{}x", "-".repeat(200_000));
        assert_eq!(Compiler::compile(&minus).unwrap_err().kind, ErrorKind::Parse);

        let calls = format!("{}x{}", "sin(".repeat(10_000), ")".repeat(10_000));
        assert!(Compiler::compile(&calls).is_err());

        let chain = vec!["x"; 100_000].join("+");
        assert_eq!(Compiler::compile(&chain).unwrap_err().kind, ErrorKind::Parse);

        let moderate = format!("{}x{}", "(-".repeat(50), ")".repeat(50));
        assert!(Compiler::compile(&moderate).is_ok());
    }

    #[test]
    fn reports_used_functions() {
        let program = Compiler::compile("sin(x) + sin(2*x) * abs(cos(x))").unwrap();
        assert_eq!(program.functions(), &["abs", "cos", "sin"]);
        assert!(program.uses("cos"));
        assert!(!program.uses("tan"));

        let plain = Compiler::compile("x*2").unwrap();
        assert!(plain.functions().is_empty());
    }

    #[test]
    fn bytecode_is_post_order() {
        let program = Compiler::compile("x - 1").unwrap();
        assert_eq!(program.code(), &[Op::Arg, Op::Const(0), Op::Sub]);
        assert_eq!(program.max_stack(), 2);
    }
}
