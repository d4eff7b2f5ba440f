//! # Sentences
//!
//! A [`Sentence`] is an ordered, append-only list of [`Lexem`]s built by chaining
//! word calls. The [`Level`] of the sentence decides what a compound call does:
//!
//! - **Atomic**: the compound runs immediately and its atoms are spliced in
//! - **FirstLevel**: the compound is appended as a single opaque lexem
//!
//! The structural combinators on this type (`conditionally`, `for_each`,
//! `use_sentence`) are eager: they splice lexems at build time and never appear
//! in the result themselves.
//!
//! ## Example
//!
//! ```rust
//! use lexidom::{args, html, HtmlWords};
//!
//! let lexicon = html::lexicon();
//! let h = lexicon.first_level();
//! let view = h.div(args![h.class("todo"), "Buy milk"]);
//! assert_eq!(view.len(), 1);
//! ```

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::arg::Arg;
use crate::lexem::Lexem;
use crate::lexicon::{Lexicon, LexiconError};
use crate::registry::Registry;

/// Expansion level of a sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Level {
    Atomic,
    FirstLevel,
}

#[derive(Clone)]
pub struct Sentence {
    lexicon: Rc<Lexicon>,
    level: Level,
    lexems: Vec<Lexem>,
}

impl Sentence {
    pub fn new(lexicon: Rc<Lexicon>, level: Level) -> Self {
        Sentence { lexicon, level, lexems: Vec::new() }
    }

    pub(crate) fn from_parts(lexicon: Rc<Lexicon>, level: Level, lexems: Vec<Lexem>) -> Self {
        Sentence { lexicon, level, lexems }
    }

    pub fn lexicon(&self) -> &Rc<Lexicon> {
        &self.lexicon
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn lexems(&self) -> &[Lexem] {
        &self.lexems
    }

    pub fn len(&self) -> usize {
        self.lexems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lexems.is_empty()
    }

    /// Push a raw lexem without consulting the vocabulary.
    pub fn append(mut self, namespace: &str, name: &str, args: Vec<Arg>) -> Self {
        self.lexems.push(Lexem::new(namespace, name, args));
        self
    }

    /// Call a word of the sentence's lexicon.
    ///
    /// # Panics
    ///
    /// Panics if the word is not defined. Vocabulary mistakes are programming
    /// errors; use [`Sentence::try_call`] to handle them as values.
    pub fn call(self, name: &str, args: Vec<Arg>) -> Self {
        match self.try_call(name, args) {
            Ok(sentence) => sentence,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn try_call(self, name: &str, args: Vec<Arg>) -> Result<Self, LexiconError> {
        let lexicon = Rc::clone(&self.lexicon);
        let (owner, word) = lexicon.resolve(name).ok_or_else(|| LexiconError::UnknownWord {
            lexicon: lexicon.name().to_string(),
            word: name.to_string(),
        })?;
        Ok(word.apply(&owner, self, name, args))
    }

    /// Splice `then`'s lexems when `cond` holds, `otherwise`'s when it does not.
    pub fn conditionally(self, cond: bool, then: Sentence, otherwise: Option<Sentence>) -> Self {
        if cond {
            self.use_sentence(&then)
        } else if let Some(otherwise) = otherwise {
            self.use_sentence(&otherwise)
        } else {
            self
        }
    }

    /// Splice the sentence produced for every item, in order.
    pub fn for_each<T, I, F>(mut self, items: I, mut item_to_sentence: F) -> Self
    where
        I: IntoIterator<Item = T>,
        F: FnMut(T, usize) -> Sentence,
    {
        for (index, item) in items.into_iter().enumerate() {
            let produced = item_to_sentence(item, index);
            self.lexems.extend(produced.lexems);
        }
        self
    }

    pub fn use_sentence(mut self, other: &Sentence) -> Self {
        self.lexems.extend(other.lexems.iter().cloned());
        self
    }

    /// Invoke `method` of another lexicon on this sentence, from a
    /// `"lexicon:method"` reference.
    pub fn use_ref(self, registry: &Registry, reference: &str, args: Vec<Arg>) -> Result<Self, LexiconError> {
        let (lexicon_name, method) = reference
            .split_once(':')
            .ok_or_else(|| LexiconError::MalformedReference(reference.to_string()))?;
        let lexicon = registry.get(lexicon_name)?;
        let (owner, word) = lexicon.resolve(method).ok_or_else(|| LexiconError::UnknownWord {
            lexicon: lexicon_name.to_string(),
            word: method.to_string(),
        })?;
        Ok(word.apply(&owner, self, method, args))
    }

    /// Continue the chain with the vocabulary of another registered lexicon.
    pub fn with_lexicon(mut self, registry: &Registry, name: &str) -> Result<Self, LexiconError> {
        self.lexicon = Rc::clone(registry.get(name)?);
        Ok(self)
    }

    pub fn into_lexems(self) -> Vec<Lexem> {
        self.lexems
    }
}

impl fmt::Debug for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.lexems.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::Lexicon;

    fn vocabulary() -> Rc<Lexicon> {
        Lexicon::builder("test")
            .add_atoms(["item", "mark"])
            .add_compounds(|c| {
                c.define("pair", |_h, this, args| {
                    this.call("item", args.to_vec()).call("item", args.to_vec())
                });
            })
            .build()
    }

    fn names(sentence: &Sentence) -> Vec<&str> {
        sentence.lexems().iter().map(Lexem::name).collect()
    }

    #[test]
    fn test_conditionally_is_eager() {
        let lexicon = vocabulary();
        let h = lexicon.atomic();
        let s = h
            .empty()
            .conditionally(true, h.call("item", vec![]), Some(h.call("mark", vec![])))
            .conditionally(false, h.call("item", vec![]), Some(h.call("mark", vec![])))
            .conditionally(false, h.call("item", vec![]), None);
        assert_eq!(names(&s), vec!["item", "mark"]);
    }

    #[test]
    fn test_for_each_splices_in_order() {
        let lexicon = vocabulary();
        let h = lexicon.atomic();
        let s = h.empty().for_each(["a", "b"], |v, i| h.call("item", vec![Arg::from(v), Arg::from(i)]));
        assert_eq!(s.len(), 2);
        assert_eq!(s.lexems()[1].args()[0].as_str(), Some("b"));
    }

    #[test]
    fn test_compound_level_behaviour() {
        let lexicon = vocabulary();
        let atomic = lexicon.atomic().call("pair", vec![Arg::from(1)]);
        assert_eq!(names(&atomic), vec!["item", "item"]);

        let first = lexicon.first_level().call("pair", vec![Arg::from(1)]);
        assert_eq!(names(&first), vec!["pair"]);
        assert_eq!(first.lexems()[0].namespace(), "test");
    }

    #[test]
    fn test_use_ref_resolves_through_registry() {
        let lexicon = vocabulary();
        let mut registry = Registry::new();
        registry.register(&lexicon);

        let s = lexicon.first_level().empty().use_ref(&registry, "test:pair", vec![]).unwrap();
        assert_eq!(names(&s), vec!["pair"]);

        assert!(matches!(
            lexicon.atomic().empty().use_ref(&registry, "nope:pair", vec![]),
            Err(LexiconError::UnknownLexicon(_))
        ));
        assert!(matches!(
            lexicon.atomic().empty().use_ref(&registry, "test:missing", vec![]),
            Err(LexiconError::UnknownWord { .. })
        ));
        assert!(matches!(
            lexicon.atomic().empty().use_ref(&registry, "test", vec![]),
            Err(LexiconError::MalformedReference(_))
        ));
    }

    #[test]
    #[should_panic(expected = "not defined")]
    fn test_unknown_word_is_fatal() {
        vocabulary().atomic().call("missing", vec![]);
    }
}
