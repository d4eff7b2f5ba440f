use std::fmt;
use std::rc::Rc;

use crate::arg::Arg;

/// A single instruction: the namespace of the lexicon that defined the word,
/// the word itself, and its arguments.
///
/// Lexems are immutable. Everything the engine learns while rendering one is
/// kept beside it in the retained [`Rendered`](crate::Rendered) state.
#[derive(Clone)]
pub struct Lexem {
    namespace: Rc<str>,
    name: Rc<str>,
    args: Rc<[Arg]>,
}

impl Lexem {
    pub fn new(namespace: &str, name: &str, args: Vec<Arg>) -> Self {
        Lexem {
            namespace: Rc::from(namespace),
            name: Rc::from(name),
            args: Rc::from(args),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    /// Whether both lexems occupy the same structural slot.
    pub fn is_congruent(&self, other: &Lexem) -> bool {
        self.name == other.name && self.namespace == other.namespace
    }

    /// True when any argument differs by identity, or the arity changed.
    pub fn args_changed(&self, previous: &Lexem) -> bool {
        self.args.len() != previous.args.len()
            || self.args.iter().zip(previous.args.iter()).any(|(a, b)| !a.same(b))
    }
}

impl fmt::Debug for Lexem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)?;
        let mut tuple = f.debug_tuple("");
        for arg in self.args.iter() {
            tuple.field(arg);
        }
        tuple.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_changed_by_identity() {
        let children = Arg::list(vec![Arg::from("x")]);
        let a = Lexem::new("html", "tag", vec![Arg::from("div"), children.clone()]);
        let b = Lexem::new("html", "tag", vec![Arg::from("div"), children]);
        assert!(!b.args_changed(&a));

        let c = Lexem::new("html", "tag", vec![Arg::from("div"), Arg::list(vec![Arg::from("x")])]);
        assert!(c.args_changed(&a));
    }

    #[test]
    fn test_arity_change_counts_as_change() {
        let a = Lexem::new("html", "class", vec![Arg::from("done")]);
        let b = Lexem::new("html", "class", vec![Arg::from("done"), Arg::from(true)]);
        assert!(b.args_changed(&a));
        assert!(b.is_congruent(&a));
    }
}
