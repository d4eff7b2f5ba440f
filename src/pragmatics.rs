//! # Pragmatics
//!
//! A pragmatics interprets a finished Atomic sentence against a subject. The
//! stock implementation is [`FacadePragmatics`]: a table of per-word handlers
//! called in sentence order. A [`Facade`] goes one step further and runs the
//! handlers while the sentence is being built.
//!
//! Handlers share a [`Scope`] (a stack of named values). Asking the scope for a
//! name that no frame declares is an error.
//!
//! ## Example
//!
//! ```rust
//! use lexidom::{args, Arg, Lexicon, Scope};
//! use lexidom::pragmatics::{FacadePragmatics, Pragmatics};
//!
//! let lexicon = Lexicon::builder("log").add_atoms(["say"]).build();
//! let pragmas = FacadePragmatics::<Vec<String>>::new()
//!     .target(&lexicon)
//!     .handle("say", |out, args, _scope| {
//!         out.push(args[0].to_text());
//!         Ok(())
//!     });
//!
//! let mut out = Vec::new();
//! let sentence = lexicon.atomic().call("say", args!["hi"]);
//! pragmas.output(&mut out, &sentence, &mut Scope::new()).unwrap();
//! assert_eq!(out, vec!["hi".to_string()]);
//! ```

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use thiserror::Error;

use crate::arg::{Arg, ArgList};
use crate::initializer::Initializer;
use crate::lexicon::{Lexicon, LexiconError};
use crate::sentence::Sentence;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScopeError {
    #[error("Undeclared scope name: {0}")]
    Undeclared(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PragmaticsError {
    #[error(transparent)]
    Scope(#[from] ScopeError),

    #[error(transparent)]
    Vocabulary(#[from] LexiconError),

    #[error("Argument {index} of `{word}` must be {expected}")]
    InvalidArgument { word: String, index: usize, expected: &'static str },
}

/// Stack of named values shared by the handlers of one interpretation.
#[derive(Debug, Clone)]
pub struct Scope {
    frames: Vec<HashMap<String, Arg>>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope {
    pub fn new() -> Self {
        Scope { frames: vec![HashMap::new()] }
    }

    /// Declare `name` in the innermost frame, shadowing outer frames.
    pub fn declare(&mut self, name: &str, value: impl Into<Arg>) -> &mut Self {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.to_string(), value.into());
        }
        self
    }

    pub fn get(&self, name: &str) -> Result<&Arg, ScopeError> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name))
            .ok_or_else(|| ScopeError::Undeclared(name.to_string()))
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.get(name).is_ok()
    }

    /// A copy of this scope with a fresh innermost frame.
    pub fn child(&self) -> Scope {
        let mut frames = self.frames.clone();
        frames.push(HashMap::new());
        Scope { frames }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

pub type PragmaFn<S> = Rc<dyn Fn(&mut S, &[Arg], &mut Scope) -> Result<(), PragmaticsError>>;

pub trait Pragmatics<S> {
    /// Namespaces this pragmatics interprets. Empty means every namespace.
    fn targets(&self) -> &HashSet<String>;

    fn output(&self, subject: &mut S, sentence: &Sentence, scope: &mut Scope) -> Result<(), PragmaticsError>;
}

pub struct FacadePragmatics<S> {
    targets: HashSet<String>,
    handlers: HashMap<String, PragmaFn<S>>,
}

impl<S> Default for FacadePragmatics<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> FacadePragmatics<S> {
    pub fn new() -> Self {
        FacadePragmatics { targets: HashSet::new(), handlers: HashMap::new() }
    }

    /// Interpret `lexicon` and everything it inherits from.
    pub fn target(mut self, lexicon: &Rc<Lexicon>) -> Self {
        for name in lexicon.chain().map(|l| l.name().to_string()) {
            self.targets.insert(name);
        }
        self
    }

    pub fn target_namespace(mut self, namespace: &str) -> Self {
        self.targets.insert(namespace.to_string());
        self
    }

    pub fn handle(
        mut self,
        name: &str,
        handler: impl Fn(&mut S, &[Arg], &mut Scope) -> Result<(), PragmaticsError> + 'static,
    ) -> Self {
        self.handlers.insert(name.to_string(), Rc::new(handler));
        self
    }

    fn accepts(&self, namespace: &str) -> bool {
        self.targets.is_empty() || self.targets.contains(namespace)
    }

    fn run(&self, subject: &mut S, namespace: &str, name: &str, args: &[Arg], scope: &mut Scope) -> Result<(), PragmaticsError> {
        if !self.accepts(namespace) {
            return Ok(());
        }
        match (self.handlers.get(name), name) {
            (Some(handler), _) => handler(subject, args, scope),
            (None, "if") => self.builtin_if(subject, args, scope),
            (None, "each") => self.builtin_each(subject, args, scope),
            (None, _) => Ok(()),
        }
    }

    fn builtin_if(&self, subject: &mut S, args: &[Arg], scope: &mut Scope) -> Result<(), PragmaticsError> {
        let cond = args.at(0);
        let branch = if cond.is_truthy() { args.at(1) } else { args.at(2) };
        match branch {
            Arg::Null => Ok(()),
            Arg::Sentence(sentence) => self.output(subject, &sentence, scope),
            Arg::Render(render) => self.output(subject, &render(&cond, 0), scope),
            _ => Err(PragmaticsError::InvalidArgument {
                word: "if".into(),
                index: if cond.is_truthy() { 1 } else { 2 },
                expected: "a sentence or a render function",
            }),
        }
    }

    fn builtin_each(&self, subject: &mut S, args: &[Arg], scope: &mut Scope) -> Result<(), PragmaticsError> {
        let items = args.at(0);
        let Arg::Render(render) = args.at(1) else {
            return Err(PragmaticsError::InvalidArgument { word: "each".into(), index: 1, expected: "a render function" });
        };
        for (index, item) in items.as_list().unwrap_or(&[]).iter().enumerate() {
            self.output(subject, &render(item, index), scope)?;
        }
        Ok(())
    }
}

impl<S> Pragmatics<S> for FacadePragmatics<S> {
    fn targets(&self) -> &HashSet<String> {
        &self.targets
    }

    fn output(&self, subject: &mut S, sentence: &Sentence, scope: &mut Scope) -> Result<(), PragmaticsError> {
        for lexem in sentence.lexems() {
            self.run(subject, lexem.namespace(), lexem.name(), lexem.args(), scope)?;
        }
        Ok(())
    }
}

/// Builder whose calls are interpreted immediately against a subject.
pub struct Facade<'a, S> {
    initializer: Initializer,
    pragmatics: &'a FacadePragmatics<S>,
    subject: &'a mut S,
    scope: Scope,
}

impl<'a, S> Facade<'a, S> {
    pub fn new(lexicon: &Rc<Lexicon>, pragmatics: &'a FacadePragmatics<S>, subject: &'a mut S) -> Self {
        Facade { initializer: lexicon.atomic(), pragmatics, subject, scope: Scope::new() }
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn scope_mut(&mut self) -> &mut Scope {
        &mut self.scope
    }

    /// Expand `name` to atoms and interpret them at once.
    pub fn call(&mut self, name: &str, args: Vec<Arg>) -> Result<&mut Self, PragmaticsError> {
        let sentence = self.initializer.try_call(name, args)?;
        self.pragmatics.output(self.subject, &sentence, &mut self.scope)?;
        Ok(self)
    }
}
