use std::collections::HashMap;
use std::rc::Rc;

use crate::lexicon::{Lexicon, LexiconError};

/// Name to lexicon table.
///
/// Registries are plain values. The reconciliation engine keeps one as its set
/// of target namespaces, and `use_ref`/deserialization resolve names through
/// whichever registry the caller hands them.
#[derive(Clone, Default)]
pub struct Registry {
    lexicons: HashMap<String, Rc<Lexicon>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a lexicon under its name, replacing any previous entry.
    pub fn register(&mut self, lexicon: &Rc<Lexicon>) -> &mut Self {
        self.lexicons.insert(lexicon.name().to_string(), Rc::clone(lexicon));
        self
    }

    /// Register a lexicon and every ancestor it inherits from.
    pub fn register_with_ancestors(&mut self, lexicon: &Rc<Lexicon>) -> &mut Self {
        for ancestor in lexicon.chain() {
            self.lexicons
                .entry(ancestor.name().to_string())
                .or_insert_with(|| Rc::clone(ancestor));
        }
        self
    }

    pub fn get(&self, name: &str) -> Result<&Rc<Lexicon>, LexiconError> {
        self.lexicons
            .get(name)
            .ok_or_else(|| LexiconError::UnknownLexicon(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lexicons.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.lexicons.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.lexicons.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_with_ancestors() {
        let base = Lexicon::builder("base").add_atoms(["a"]).build();
        let dialect = base.create_dialect("dialect").build();

        let mut registry = Registry::new();
        registry.register_with_ancestors(&dialect);
        assert_eq!(registry.names(), vec!["base", "dialect"]);
        assert!(registry.get("base").is_ok());
        assert_eq!(registry.get("other").unwrap_err(), LexiconError::UnknownLexicon("other".into()));
    }

    #[test]
    fn test_registries_are_independent() {
        let a = Lexicon::builder("shared").add_atoms(["x"]).build();
        let b = Lexicon::builder("shared").add_atoms(["y"]).build();

        let mut first = Registry::new();
        first.register(&a);
        let mut second = Registry::new();
        second.register(&b);

        assert!(first.get("shared").unwrap().has_word("x"));
        assert!(!second.get("shared").unwrap().has_word("x"));
    }
}
