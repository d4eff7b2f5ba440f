//! # Argument Values
//!
//! Every [`Lexem`](crate::Lexem) carries a list of [`Arg`]s. Arguments are the
//! only way data flows from a view function into the reconciliation engine, so
//! they also define how the engine detects change between two render passes.
//!
//! ## Identity
//!
//! - Scalars (`Null`, `Bool`, `Number`, `Str`) compare by value
//! - Everything else compares by reference identity
//!
//! Domain records travel as [`Shared`] values. Editing one through
//! [`Shared::make_mut`] produces a fresh reference whenever the record is shared,
//! which is what makes "unchanged" cheap to detect.

use std::any::Any;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::component::ComponentFactory;
use crate::host::DomHook;
use crate::sentence::Sentence;

/// Event handler bound by the `on` instruction. Receives the host event and the
/// extra arguments given at bind time.
pub type Handler = Rc<dyn Fn(&Event, &[Arg])>;

/// Item renderer used by `each` and by lazy `if` branches.
pub type RenderFn = Rc<dyn Fn(&Arg, usize) -> Sentence>;

/// Side-effect function run by `execute`.
pub type Callback = Rc<dyn Fn(&[Arg])>;

/// A single instruction argument.
#[derive(Clone)]
pub enum Arg {
    Null,
    Bool(bool),
    Number(f64),
    Str(Rc<str>),
    Sentence(Rc<Sentence>),
    List(Rc<[Arg]>),
    /// Opaque shared record, see [`Shared`]
    Data(Rc<dyn Any>),
    Render(RenderFn),
    Handler(Handler),
    Callback(Callback),
    Component(ComponentFactory),
    Hook(Rc<dyn DomHook>),
}

fn same_rc<T: ?Sized, U: ?Sized>(a: &Rc<T>, b: &Rc<U>) -> bool {
    Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const ()
}

impl Arg {
    pub fn str(value: impl AsRef<str>) -> Self {
        Arg::Str(Rc::from(value.as_ref()))
    }

    pub fn list(items: Vec<Arg>) -> Self {
        Arg::List(Rc::from(items))
    }

    pub fn sentence(sentence: Sentence) -> Self {
        Arg::Sentence(Rc::new(sentence))
    }

    pub fn handler(f: impl Fn(&Event, &[Arg]) + 'static) -> Self {
        Arg::Handler(Rc::new(f))
    }

    pub fn render(f: impl Fn(&Arg, usize) -> Sentence + 'static) -> Self {
        Arg::Render(Rc::new(f))
    }

    pub fn callback(f: impl Fn(&[Arg]) + 'static) -> Self {
        Arg::Callback(Rc::new(f))
    }

    pub fn hook(hook: impl DomHook + 'static) -> Self {
        Arg::Hook(Rc::new(hook))
    }

    /// Identity comparison used by every diff strategy.
    ///
    /// Numbers follow IEEE equality, so `NaN` is never the same as itself.
    pub fn same(&self, other: &Arg) -> bool {
        match (self, other) {
            (Arg::Null, Arg::Null) => true,
            (Arg::Bool(a), Arg::Bool(b)) => a == b,
            (Arg::Number(a), Arg::Number(b)) => a == b,
            (Arg::Str(a), Arg::Str(b)) => a == b,
            (Arg::Sentence(a), Arg::Sentence(b)) => Rc::ptr_eq(a, b),
            (Arg::List(a), Arg::List(b)) => same_rc(a, b),
            (Arg::Data(a), Arg::Data(b)) => same_rc(a, b),
            (Arg::Render(a), Arg::Render(b)) => same_rc(a, b),
            (Arg::Handler(a), Arg::Handler(b)) => same_rc(a, b),
            (Arg::Callback(a), Arg::Callback(b)) => same_rc(a, b),
            (Arg::Component(a), Arg::Component(b)) => a.same(b),
            (Arg::Hook(a), Arg::Hook(b)) => same_rc(a, b),
            _ => false,
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Arg::Null => false,
            Arg::Bool(b) => *b,
            Arg::Number(n) => *n != 0.0 && !n.is_nan(),
            Arg::Str(s) => !s.is_empty(),
            _ => true,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Arg::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Arg::Str(s) => Some(&**s),
            _ => None,
        }
    }

    pub fn as_sentence(&self) -> Option<&Rc<Sentence>> {
        match self {
            Arg::Sentence(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Arg]> {
        match self {
            Arg::List(items) => Some(&items[..]),
            _ => None,
        }
    }

    /// Borrow a shared record of type `T`.
    pub fn downcast<T: Any>(&self) -> Option<Shared<T>> {
        match self {
            Arg::Data(data) => Rc::clone(data).downcast::<T>().ok().map(Shared),
            _ => None,
        }
    }

    pub fn to_scalar(&self) -> Option<Scalar> {
        match self {
            Arg::Null => Some(Scalar::Null),
            Arg::Bool(b) => Some(Scalar::Bool(*b)),
            Arg::Number(n) => Some(Scalar::Number(*n)),
            Arg::Str(s) => Some(Scalar::Str(s.to_string())),
            _ => None,
        }
    }

    /// Text form used for attributes and text nodes.
    pub fn to_text(&self) -> String {
        match self {
            Arg::Null => String::new(),
            Arg::Bool(b) => b.to_string(),
            Arg::Number(n) => format_number(*n),
            Arg::Str(s) => s.to_string(),
            Arg::List(items) => items.iter().map(Arg::to_text).collect::<Vec<_>>().join(","),
            other => other.kind().to_string(),
        }
    }

    /// Short name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Arg::Null => "null",
            Arg::Bool(_) => "bool",
            Arg::Number(_) => "number",
            Arg::Str(_) => "str",
            Arg::Sentence(_) => "sentence",
            Arg::List(_) => "list",
            Arg::Data(_) => "data",
            Arg::Render(_) => "render",
            Arg::Handler(_) => "handler",
            Arg::Callback(_) => "callback",
            Arg::Component(_) => "component",
            Arg::Hook(_) => "hook",
        }
    }
}

pub(crate) fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Positional access that treats missing arguments as `Null`.
pub trait ArgList {
    fn at(&self, index: usize) -> Arg;
}

impl ArgList for [Arg] {
    fn at(&self, index: usize) -> Arg {
        self.get(index).cloned().unwrap_or(Arg::Null)
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Null => write!(f, "null"),
            Arg::Bool(b) => write!(f, "{}", b),
            Arg::Number(n) => write!(f, "{}", format_number(*n)),
            Arg::Str(s) => write!(f, "{:?}", s),
            Arg::Sentence(s) => write!(f, "{:?}", s),
            Arg::List(items) => f.debug_list().entries(items.iter()).finish(),
            Arg::Component(c) => write!(f, "<component {}>", c.name()),
            other => write!(f, "<{}>", other.kind()),
        }
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Arg::str(value)
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Arg::Str(Rc::from(value))
    }
}

impl From<&String> for Arg {
    fn from(value: &String) -> Self {
        Arg::str(value)
    }
}

impl From<bool> for Arg {
    fn from(value: bool) -> Self {
        Arg::Bool(value)
    }
}

impl From<f64> for Arg {
    fn from(value: f64) -> Self {
        Arg::Number(value)
    }
}

macro_rules! number_from {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Arg {
            fn from(value: $ty) -> Self {
                Arg::Number(value as f64)
            }
        })*
    };
}

number_from!(i32, i64, u32, u64, usize);

impl From<Sentence> for Arg {
    fn from(value: Sentence) -> Self {
        Arg::sentence(value)
    }
}

impl From<Rc<Sentence>> for Arg {
    fn from(value: Rc<Sentence>) -> Self {
        Arg::Sentence(value)
    }
}

impl From<Option<Sentence>> for Arg {
    fn from(value: Option<Sentence>) -> Self {
        value.map(Arg::sentence).unwrap_or(Arg::Null)
    }
}

impl From<Vec<Arg>> for Arg {
    fn from(value: Vec<Arg>) -> Self {
        Arg::list(value)
    }
}

impl From<&Arg> for Arg {
    fn from(value: &Arg) -> Self {
        value.clone()
    }
}

impl From<Handler> for Arg {
    fn from(value: Handler) -> Self {
        Arg::Handler(value)
    }
}

impl From<RenderFn> for Arg {
    fn from(value: RenderFn) -> Self {
        Arg::Render(value)
    }
}

impl From<Callback> for Arg {
    fn from(value: Callback) -> Self {
        Arg::Callback(value)
    }
}

impl From<ComponentFactory> for Arg {
    fn from(value: ComponentFactory) -> Self {
        Arg::Component(value)
    }
}

impl From<&ComponentFactory> for Arg {
    fn from(value: &ComponentFactory) -> Self {
        Arg::Component(value.clone())
    }
}

impl<T: Any> From<Shared<T>> for Arg {
    fn from(value: Shared<T>) -> Self {
        let data: Rc<dyn Any> = value.0;
        Arg::Data(data)
    }
}

impl<T: Any> From<&Shared<T>> for Arg {
    fn from(value: &Shared<T>) -> Self {
        Arg::from(value.clone())
    }
}

impl From<Scalar> for Arg {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::Null => Arg::Null,
            Scalar::Bool(b) => Arg::Bool(b),
            Scalar::Number(n) => Arg::Number(n),
            Scalar::Str(s) => Arg::from(s),
        }
    }
}

/// Build a `Vec<Arg>` from heterogeneous values.
///
/// ```
/// use lexidom::{args, Arg};
///
/// let list = args!["label", 3, true];
/// assert_eq!(list.len(), 3);
/// assert!(matches!(list[1], Arg::Number(_)));
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Arg>::new()
    };
    ($($value:expr),+ $(,)?) => {
        vec![$($crate::Arg::from($value)),+]
    };
}

/// Copy-on-write container for domain records.
///
/// Clones share the record and compare as the same argument. `make_mut` only
/// copies when the record is shared, so an edit never mutates a snapshot that a
/// previous render still references.
pub struct Shared<T: ?Sized>(Rc<T>);

impl<T> Shared<T> {
    pub fn new(value: T) -> Self {
        Shared(Rc::new(value))
    }

    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }
}

impl<T: Clone> Shared<T> {
    pub fn make_mut(&mut self) -> &mut T {
        Rc::make_mut(&mut self.0)
    }

    /// Return an edited copy, leaving `self` untouched.
    pub fn with(&self, edit: impl FnOnce(&mut T)) -> Self {
        let mut value = T::clone(&self.0);
        edit(&mut value);
        Shared::new(value)
    }
}

impl<T: ?Sized> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Shared(Rc::clone(&self.0))
    }
}

impl<T: ?Sized> Deref for Shared<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Host-facing property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
}

impl Scalar {
    pub fn is_truthy(&self) -> bool {
        Arg::from(self.clone()).is_truthy()
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Number(n) => write!(f, "{}", format_number(*n)),
            Scalar::Str(s) => write!(f, "{}", s),
        }
    }
}

/// Host-neutral event payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Event {
    pub name: String,
    pub key_code: Option<u32>,
    /// Current `value` of the target, for inputs
    pub value: Option<String>,
    pub checked: Option<bool>,
    /// Text content of the target
    pub text: Option<String>,
}

impl Event {
    pub fn new(name: impl Into<String>) -> Self {
        Event { name: name.into(), ..Default::default() }
    }

    pub fn with_key(mut self, key_code: u32) -> Self {
        self.key_code = Some(key_code);
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = Some(checked);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars_compare_by_value() {
        assert!(Arg::from("a").same(&Arg::from("a")));
        assert!(Arg::from(2).same(&Arg::Number(2.0)));
        assert!(!Arg::Number(f64::NAN).same(&Arg::Number(f64::NAN)));
        assert!(!Arg::from(true).same(&Arg::from(1)));
    }

    #[test]
    fn test_references_compare_by_identity() {
        let list = Arg::list(args![1, 2]);
        assert!(list.same(&list.clone()));
        assert!(!list.same(&Arg::list(args![1, 2])));

        let record = Shared::new(5u32);
        assert!(Arg::from(&record).same(&Arg::from(record.clone())));
        assert!(!Arg::from(&record).same(&Arg::from(Shared::new(5u32))));
    }

    #[test]
    fn test_make_mut_copies_shared_records() {
        let mut first = Shared::new(vec![1]);
        let snapshot = first.clone();
        first.make_mut().push(2);
        assert_eq!(*snapshot, vec![1]);
        assert_eq!(*first, vec![1, 2]);
        assert!(!Shared::ptr_eq(&first, &snapshot));
    }

    #[test]
    fn test_truthiness() {
        assert!(!Arg::Null.is_truthy());
        assert!(!Arg::from(0).is_truthy());
        assert!(!Arg::from("").is_truthy());
        assert!(Arg::from("0").is_truthy());
        assert!(Arg::list(vec![]).is_truthy());
    }

    #[test]
    fn test_downcast() {
        let arg = Arg::from(Shared::new(String::from("todo")));
        assert_eq!(arg.downcast::<String>().as_deref().map(String::as_str), Some("todo"));
        assert!(arg.downcast::<u32>().is_none());
    }

    #[test]
    fn test_to_text_formats_integers() {
        assert_eq!(Arg::from(3).to_text(), "3");
        assert_eq!(Arg::from(1.5).to_text(), "1.5");
        assert_eq!(Arg::Null.to_text(), "");
    }
}
