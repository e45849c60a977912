//! The builtin function table, used only by the compiler.

use super::bytecode::Builtin;

/// Name, documented parameters and opcode of a builtin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuiltinFunc {
    pub name: &'static str,
    pub params: &'static [&'static str],
    pub builtin: Builtin,
}

impl BuiltinFunc {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Signature as shown in the in-game function reference, e.g. `clamp(x, min, max)`.
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, self.params.join(", "))
    }
}

const fn func(
    name: &'static str,
    params: &'static [&'static str],
    builtin: Builtin,
) -> BuiltinFunc {
    BuiltinFunc {
        name,
        params,
        builtin,
    }
}

/// All builtins, sorted by name.
pub static BUILTINS: &[BuiltinFunc] = &[
    func("abs", &["x"], Builtin::Abs),
    func("acos", &["x"], Builtin::Acos),
    func("after", &["x", "v", "threshold"], Builtin::After),
    func("asin", &["x"], Builtin::Asin),
    func("atan", &["x"], Builtin::Atan),
    func("atan2", &["y", "x"], Builtin::Atan2),
    func("ceil", &["x"], Builtin::Ceil),
    func("clamp", &["x", "min", "max"], Builtin::Clamp),
    func("cos", &["x"], Builtin::Cos),
    func("exp", &["x"], Builtin::Exp),
    func("floor", &["x"], Builtin::Floor),
    func("fract", &["x"], Builtin::Fract),
    func("inversesqrt", &["x"], Builtin::InverseSqrt),
    func("log", &["x"], Builtin::Log),
    func("log2", &["x"], Builtin::Log2),
    func("max", &["x", "y"], Builtin::Max),
    func("min", &["x", "y"], Builtin::Min),
    func("mod", &["x", "y"], Builtin::Mod),
    func("pow", &["x", "y"], Builtin::Pow),
    func("round", &["x"], Builtin::Round),
    func("sign", &["x"], Builtin::Sign),
    func("sin", &["x"], Builtin::Sin),
    func("smoothstep", &["edge0", "edge1", "x"], Builtin::Smoothstep),
    func("sqrt", &["x"], Builtin::Sqrt),
    func("step", &["edge", "x"], Builtin::Step),
    func("tan", &["x"], Builtin::Tan),
    func("until", &["x", "v", "threshold"], Builtin::Until),
];

/// Look up a builtin by name.
pub fn lookup(name: &str) -> Option<&'static BuiltinFunc> {
    BUILTINS
        .binary_search_by(|f| f.name.cmp(name))
        .ok()
        .map(|i| &BUILTINS[i])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_and_unique() {
        for pair in BUILTINS.windows(2) {
            assert!(pair[0].name < pair[1].name, "{} >= {}", pair[0].name, pair[1].name);
        }
    }

    #[test]
    fn table_arity_matches_opcode_arity() {
        for f in BUILTINS {
            assert_eq!(f.arity(), f.builtin.arity(), "arity mismatch for {}", f.name);
        }
    }

    #[test]
    fn lookup_known_and_unknown() {
        assert_eq!(lookup("sin").map(|f| f.builtin), Some(Builtin::Sin));
        assert_eq!(lookup("smoothstep").map(|f| f.arity()), Some(3));
        assert!(lookup("bogus").is_none());
        assert!(lookup("x").is_none());
    }

    #[test]
    fn signature_format() {
        let clamp = lookup("clamp").unwrap();
        assert_eq!(clamp.signature(), "clamp(x, min, max)");
    }
}
