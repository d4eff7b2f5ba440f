//! # Lexicons
//!
//! A [`Lexicon`] is a named vocabulary of words. Every word is one of:
//!
//! - **Atom**: appended as a lexem tagged with the lexicon's namespace
//! - **Compound**: a macro built from other words
//! - **Alias**: a helper that appends atoms directly, identical on every level
//!
//! A compound is a single function `(initializer, sentence, args) -> sentence`.
//! Building an Atomic sentence runs it with the Atomic initializer, which
//! expands it eagerly. Building a FirstLevel sentence appends an opaque lexem
//! instead, and the engine later runs the same function with the FirstLevel
//! initializer through [`SecondLevel::develop`] to expand it one step at a time.
//!
//! Dialects are child lexicons. Word lookup walks the parent chain, so a
//! dialect inherits everything and may override words without touching its
//! parent.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::arg::Arg;
use crate::initializer::Initializer;
use crate::lexem::Lexem;
use crate::sentence::{Level, Sentence};

/// Vocabulary errors. They always indicate a mistake in a vocabulary
/// definition or a view function.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexiconError {
    #[error("Lexicon not found: {0}")]
    UnknownLexicon(String),

    #[error("Word `{word}` is not defined in lexicon {lexicon}")]
    UnknownWord { lexicon: String, word: String },

    #[error("No second-level development for `{word}` in lexicon {lexicon}")]
    MissingDevelopment { lexicon: String, word: String },

    #[error("Malformed reference `{0}`, expected `lexicon:method`")]
    MalformedReference(String),
}

/// Body of a compound or alias.
pub type WordFn = Rc<dyn Fn(&Initializer, Sentence, &[Arg]) -> Sentence>;

#[derive(Clone)]
pub(crate) enum Word {
    Atom,
    Compound(WordFn),
    Alias(WordFn),
}

/// Public view of what a word is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordKind {
    Atom,
    Compound,
    Alias,
}

impl Word {
    fn kind(&self) -> WordKind {
        match self {
            Word::Atom => WordKind::Atom,
            Word::Compound(_) => WordKind::Compound,
            Word::Alias(_) => WordKind::Alias,
        }
    }

    /// Apply the word defined by `owner` to `sentence` at the sentence's level.
    pub(crate) fn apply(&self, owner: &Rc<Lexicon>, sentence: Sentence, name: &str, args: Vec<Arg>) -> Sentence {
        match self {
            Word::Atom => sentence.append(owner.name(), name, args),
            Word::Compound(body) => match sentence.level() {
                Level::Atomic => {
                    let h = Initializer::new(Rc::clone(owner), Level::Atomic);
                    body(&h, sentence, &args)
                }
                Level::FirstLevel => sentence.append(owner.name(), name, args),
            },
            Word::Alias(body) => {
                let h = Initializer::new(Rc::clone(owner), sentence.level());
                body(&h, sentence, &args)
            }
        }
    }
}

pub struct Lexicon {
    name: String,
    parent: Option<Rc<Lexicon>>,
    words: HashMap<String, Word>,
}

impl Lexicon {
    pub fn builder(name: &str) -> LexiconBuilder {
        LexiconBuilder { name: name.to_string(), parent: None, words: HashMap::new() }
    }

    /// Start a child lexicon inheriting this one's vocabulary.
    pub fn create_dialect(self: &Rc<Self>, name: &str) -> LexiconBuilder {
        LexiconBuilder { name: name.to_string(), parent: Some(Rc::clone(self)), words: HashMap::new() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Rc<Lexicon>> {
        self.parent.as_ref()
    }

    /// This lexicon followed by its ancestors.
    pub fn chain(self: &Rc<Self>) -> impl Iterator<Item = &Rc<Lexicon>> {
        std::iter::successors(Some(self), |lexicon| lexicon.parent.as_ref())
    }

    /// Find a word and the lexicon that defines it.
    pub(crate) fn resolve(self: &Rc<Self>, name: &str) -> Option<(Rc<Lexicon>, Word)> {
        self.chain()
            .find_map(|lexicon| lexicon.words.get(name).map(|word| (Rc::clone(lexicon), word.clone())))
    }

    pub fn kind_of(self: &Rc<Self>, name: &str) -> Option<WordKind> {
        self.resolve(name).map(|(_, word)| word.kind())
    }

    pub fn has_word(self: &Rc<Self>, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Names of the words defined directly on this lexicon, sorted.
    pub fn own_words(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.words.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn atomic(self: &Rc<Self>) -> Initializer {
        Initializer::new(Rc::clone(self), Level::Atomic)
    }

    pub fn first_level(self: &Rc<Self>) -> Initializer {
        Initializer::new(Rc::clone(self), Level::FirstLevel)
    }

    pub fn second_level(self: &Rc<Self>) -> SecondLevel<'_> {
        SecondLevel { lexicon: self }
    }

    /// Expand a compound lexem straight to atoms.
    pub fn develop_to_atoms(self: &Rc<Self>, lexem: &Lexem) -> Result<Sentence, LexiconError> {
        match self.resolve(lexem.name()) {
            Some((owner, Word::Compound(body))) => {
                let h = Initializer::new(owner, Level::Atomic);
                Ok(body(&h, Sentence::new(Rc::clone(self), Level::Atomic), lexem.args()))
            }
            _ => Err(self.missing_development(lexem)),
        }
    }

    /// Replay `sentence` through this lexicon at `level`.
    ///
    /// Compounds owned by this lexicon's chain are re-applied, so translating
    /// to `Atomic` yields the fully expanded form. Everything else is copied.
    pub fn translate(self: &Rc<Self>, sentence: &Sentence, level: Level) -> Sentence {
        let mut out = Sentence::new(Rc::clone(self), level);
        for lexem in sentence.lexems() {
            let args: Vec<Arg> = lexem.args().iter().map(|arg| self.translate_arg(arg, level)).collect();
            let owned = self.chain().any(|lexicon| lexicon.name() == lexem.namespace());
            out = match self.resolve(lexem.name()) {
                Some((owner, word @ Word::Compound(_))) if owned => word.apply(&owner, out, lexem.name(), args),
                _ => out.append(lexem.namespace(), lexem.name(), args),
            };
        }
        out
    }

    fn translate_arg(self: &Rc<Self>, arg: &Arg, level: Level) -> Arg {
        match arg {
            Arg::Sentence(inner) => Arg::sentence(self.translate(inner, level)),
            Arg::List(items) => Arg::list(items.iter().map(|item| self.translate_arg(item, level)).collect()),
            other => other.clone(),
        }
    }

    fn missing_development(&self, lexem: &Lexem) -> LexiconError {
        LexiconError::MissingDevelopment { lexicon: self.name.clone(), word: lexem.name().to_string() }
    }
}

impl fmt::Debug for Lexicon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lexicon")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field("words", &self.own_words())
            .finish()
    }
}

/// The one-step development table consulted by the reconciliation engine.
pub struct SecondLevel<'a> {
    lexicon: &'a Rc<Lexicon>,
}

impl SecondLevel<'_> {
    pub fn has(&self, name: &str) -> bool {
        matches!(self.lexicon.resolve(name), Some((_, Word::Compound(_))))
    }

    /// Expand a FirstLevel compound lexem into its FirstLevel body.
    pub fn develop(&self, lexem: &Lexem) -> Result<Sentence, LexiconError> {
        match self.lexicon.resolve(lexem.name()) {
            Some((owner, Word::Compound(body))) => {
                let h = Initializer::new(owner, Level::FirstLevel);
                Ok(body(&h, Sentence::new(Rc::clone(self.lexicon), Level::FirstLevel), lexem.args()))
            }
            _ => Err(self.lexicon.missing_development(lexem)),
        }
    }
}

/// Word definitions collected by [`LexiconBuilder::add_compounds`] and
/// [`LexiconBuilder::add_aliases`].
#[derive(Default)]
pub struct Definitions {
    words: Vec<(String, WordFn)>,
}

impl Definitions {
    pub fn define(
        &mut self,
        name: &str,
        body: impl Fn(&Initializer, Sentence, &[Arg]) -> Sentence + 'static,
    ) -> &mut Self {
        self.words.push((name.to_string(), Rc::new(body)));
        self
    }
}

pub struct LexiconBuilder {
    name: String,
    parent: Option<Rc<Lexicon>>,
    words: HashMap<String, Word>,
}

impl LexiconBuilder {
    pub fn add_atoms<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.words.insert(name.as_ref().to_string(), Word::Atom);
        }
        self
    }

    pub fn add_compounds(mut self, producer: impl FnOnce(&mut Definitions)) -> Self {
        let mut definitions = Definitions::default();
        producer(&mut definitions);
        for (name, body) in definitions.words {
            self.words.insert(name, Word::Compound(body));
        }
        self
    }

    pub fn add_aliases(mut self, producer: impl FnOnce(&mut Definitions)) -> Self {
        let mut definitions = Definitions::default();
        producer(&mut definitions);
        for (name, body) in definitions.words {
            self.words.insert(name, Word::Alias(body));
        }
        self
    }

    pub fn build(self) -> Rc<Lexicon> {
        Rc::new(Lexicon { name: self.name, parent: self.parent, words: self.words })
    }
}
