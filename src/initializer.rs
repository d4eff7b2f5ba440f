use std::rc::Rc;

use crate::arg::Arg;
use crate::lexicon::{Lexicon, LexiconError};
use crate::registry::Registry;
use crate::sentence::{Level, Sentence};

/// Exposes a lexicon's vocabulary as functions that each start a new sentence.
///
/// An initializer is what view functions and compound bodies receive as `h`:
/// `h.call("div", ...)` is shorthand for `h.empty().call("div", ...)`.
#[derive(Clone)]
pub struct Initializer {
    lexicon: Rc<Lexicon>,
    level: Level,
}

impl Initializer {
    pub fn new(lexicon: Rc<Lexicon>, level: Level) -> Self {
        Initializer { lexicon, level }
    }

    pub fn lexicon(&self) -> &Rc<Lexicon> {
        &self.lexicon
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn empty(&self) -> Sentence {
        Sentence::new(Rc::clone(&self.lexicon), self.level)
    }

    /// # Panics
    ///
    /// Panics when `name` is not part of the vocabulary.
    pub fn call(&self, name: &str, args: Vec<Arg>) -> Sentence {
        self.empty().call(name, args)
    }

    pub fn try_call(&self, name: &str, args: Vec<Arg>) -> Result<Sentence, LexiconError> {
        self.empty().try_call(name, args)
    }

    pub fn conditionally(&self, cond: bool, then: Sentence, otherwise: Option<Sentence>) -> Sentence {
        self.empty().conditionally(cond, then, otherwise)
    }

    pub fn for_each<T, I, F>(&self, items: I, item_to_sentence: F) -> Sentence
    where
        I: IntoIterator<Item = T>,
        F: FnMut(T, usize) -> Sentence,
    {
        self.empty().for_each(items, item_to_sentence)
    }

    pub fn use_sentence(&self, other: &Sentence) -> Sentence {
        self.empty().use_sentence(other)
    }

    pub fn use_ref(&self, registry: &Registry, reference: &str, args: Vec<Arg>) -> Result<Sentence, LexiconError> {
        self.empty().use_ref(registry, reference, args)
    }
}
