//! # HTML Vocabulary
//!
//! The `html` lexicon understood by the reconciliation engine, and the
//! [`HtmlWords`] extension trait giving sentences and initializers typed
//! methods for it.
//!
//! Atoms are the engine instructions. Tag names and event names are compounds
//! that each develop into a single `tag` or `on` lexem. `on`, `execute` and
//! `switchUse` are aliases that pack their trailing arguments into a list.
//!
//! ```rust
//! use lexidom::{args, html, HtmlWords};
//!
//! let lexicon = html::lexicon();
//! let h = lexicon.first_level();
//! let view = h.ul(args![h.class("todo-list"), h.li(args!["one"]), h.li(args!["two"])]);
//! assert_eq!(view.len(), 1);
//! assert_eq!(view.lexems()[0].name(), "ul");
//! ```

use std::rc::Rc;

use crate::arg::{Arg, ArgList};
use crate::component::ComponentFactory;
use crate::initializer::Initializer;
use crate::lexicon::{Definitions, Lexicon};
use crate::sentence::Sentence;

pub const NAMESPACE: &str = "html";

pub const ATOMS: &[&str] =
    &["tag", "attr", "prop", "data", "class", "classes", "id", "style", "text", "onDom", "if", "each", "html", "component", "ref"];

/// Tag names that are plain `tag(name, children)` compounds.
pub const TAGS: &[&str] = &[
    "body", "div", "h1", "h2", "h3", "h4", "h5", "section", "span", "button", "main", "article", "hr", "header",
    "footer", "label", "ul", "li", "p", "small", "b", "strong", "i", "u", "em", "title", "meta", "table", "tr", "td",
    "th", "thead", "tbody", "form", "br", "nav", "aside", "pre", "code", "select", "textarea",
];

/// Event names that are plain `on(event, handler, ...)` compounds.
pub const EVENTS: &[&str] = &[
    "click", "dblclick", "blur", "focus", "submit", "change", "keyup", "keydown", "keypress", "mouseover",
    "mousedown", "mouseup", "mouseout", "touchstart", "touchend", "touchcancel", "touchleave", "touchmove", "drop",
    "dragover", "dragstart",
];

/// Build the `html` lexicon.
pub fn lexicon() -> Rc<Lexicon> {
    Lexicon::builder(NAMESPACE)
        .add_atoms(ATOMS.iter().copied())
        .add_aliases(|a| {
            a.define("on", |h, this, args| {
                let packed = vec![args.at(0), args.at(1), Arg::list(rest(args, 2))];
                this.append(h.lexicon().name(), "on", packed)
            })
            .define("execute", |h, this, args| {
                this.append(h.lexicon().name(), "execute", vec![args.at(0), Arg::list(rest(args, 1))])
            })
            .define("switchUse", |h, this, args| {
                this.append(h.lexicon().name(), "switchUse", vec![args.at(0), Arg::list(rest(args, 1))])
            });
        })
        .add_compounds(|c| {
            for &tag in TAGS {
                c.define(tag, move |_, this, args| this.call("tag", vec![Arg::from(tag), Arg::list(args.to_vec())]));
            }
            for &event in EVENTS {
                c.define(event, move |_, this, args| {
                    let mut packed = vec![Arg::from(event)];
                    packed.extend_from_slice(args);
                    this.call("on", packed)
                });
            }
        })
        .add_compounds(define_helpers)
        .build()
}

fn define_helpers(c: &mut Definitions) {
    c.define("a", |h, this, args| {
        let mut children = vec![Arg::from(h.attr("href", args.at(0)))];
        children.extend(rest(args, 1));
        this.call("tag", vec![Arg::from("a"), Arg::list(children)])
    })
    .define("img", |h, this, args| {
        let mut children = vec![Arg::from(h.attr("src", args.at(0)))];
        children.extend(rest(args, 1));
        this.call("tag", vec![Arg::from("img"), Arg::list(children)])
    })
    .define("input", |h, this, args| {
        let head = h.attr("type", args.at(0)).prop("value", args.at(1));
        this.call("tag", vec![Arg::from("input"), with_extra(head, args.at(2))])
    })
    .define("textInput", |_, this, args| this.call("input", vec![Arg::from("text"), args.at(0), args.at(1)]))
    .define("passwordInput", |_, this, args| this.call("input", vec![Arg::from("password"), args.at(0), args.at(1)]))
    .define("checkbox", |h, this, args| {
        let head = h.attr("type", "checkbox").prop("checked", args.at(0).is_truthy());
        this.call("tag", vec![Arg::from("input"), with_extra(head, args.at(1))])
    })
    .define("radio", |h, this, args| {
        let head = h.attr("type", "radio").prop("checked", args.at(0).is_truthy());
        this.call("tag", vec![Arg::from("input"), with_extra(head, args.at(1))])
    })
    .define("option", |h, this, args| {
        let head = h.attr("value", args.at(0)).prop("selected", args.at(2).is_truthy());
        this.call("tag", vec![Arg::from("option"), with_extra(head, args.at(1))])
    })
    .define("link", |h, this, args| {
        let head = h.attr("href", args.at(0)).attr("rel", args.at(1));
        this.call("tag", vec![Arg::from("link"), with_extra(head, args.at(2))])
    })
    .define("linkCss", |h, this, args| {
        this.call("link", vec![args.at(0), Arg::from("stylesheet"), Arg::from(h.attr("type", "text/css"))])
    })
    .define("script", |h, this, args| {
        let head = h.attr("src", args.at(0)).attr("type", "text/javascript");
        this.call("tag", vec![Arg::from("script"), with_extra(head, args.at(1))])
    })
    .define("nbsp", |_, this, _| this.call("text", vec![Arg::from("\u{a0}")]))
    .define("visible", |_, this, args| {
        let value = if args.at(0).is_truthy() { "visible" } else { "hidden" };
        this.call("style", vec![Arg::from("visibility"), Arg::from(value)])
    })
    .define("display", |_, this, args| {
        let value = match args.at(0) {
            Arg::Str(value) => value.to_string(),
            flag if flag.is_truthy() => "block".to_string(),
            _ => "none".to_string(),
        };
        this.call("style", vec![Arg::from("display"), Arg::from(value)])
    })
    .define("disabled", |_, this, args| this.call("prop", vec![Arg::from("disabled"), Arg::from(args.at(0).is_truthy())]));
}

fn rest(args: &[Arg], from: usize) -> Vec<Arg> {
    args.get(from..).map(<[Arg]>::to_vec).unwrap_or_default()
}

/// Children list for a helper tag: its own attributes, then the caller's extra
/// content when there is any.
fn with_extra(head: Sentence, extra: Arg) -> Arg {
    let mut children = vec![Arg::from(head)];
    if !extra.is_null() {
        children.push(extra);
    }
    Arg::list(children)
}

/// Anything a word can be called on by name.
pub trait Words: Sized {
    fn word(self, name: &str, args: Vec<Arg>) -> Sentence;
}

impl Words for Sentence {
    fn word(self, name: &str, args: Vec<Arg>) -> Sentence {
        self.call(name, args)
    }
}

impl Words for &Initializer {
    fn word(self, name: &str, args: Vec<Arg>) -> Sentence {
        self.call(name, args)
    }
}

macro_rules! tag_methods {
    ($($method:ident => $tag:literal),* $(,)?) => {
        $(
            fn $method(self, children: Vec<Arg>) -> Sentence {
                self.word($tag, children)
            }
        )*
    };
}

macro_rules! event_methods {
    ($($method:ident => $event:literal),* $(,)?) => {
        $(
            fn $method(self, handler: impl Into<Arg>) -> Sentence {
                self.word($event, vec![handler.into()])
            }
        )*
    };
}

/// Typed methods for the `html` vocabulary.
///
/// Every method panics like [`Sentence::call`] when the receiver's lexicon
/// does not inherit from `html`.
pub trait HtmlWords: Words {
    fn tag(self, name: &str, children: Vec<Arg>) -> Sentence {
        self.word("tag", vec![Arg::from(name), Arg::list(children)])
    }

    tag_methods! {
        body => "body", div => "div", h1 => "h1", h2 => "h2", h3 => "h3", h4 => "h4", h5 => "h5",
        section => "section", span => "span", button => "button", main => "main", article => "article",
        hr => "hr", header => "header", footer => "footer", label => "label", ul => "ul", li => "li",
        p => "p", small => "small", b => "b", strong => "strong", i => "i", u => "u", em => "em",
        table => "table", tr => "tr", td => "td", th => "th", thead => "thead", tbody => "tbody",
        form => "form", br => "br", nav => "nav", aside => "aside", pre => "pre", code => "code",
        select => "select", textarea => "textarea",
    }

    fn attr(self, name: &str, value: impl Into<Arg>) -> Sentence {
        self.word("attr", vec![Arg::from(name), value.into()])
    }

    fn prop(self, name: &str, value: impl Into<Arg>) -> Sentence {
        self.word("prop", vec![Arg::from(name), value.into()])
    }

    fn data(self, key: &str, value: impl Into<Arg>) -> Sentence {
        self.word("data", vec![Arg::from(key), value.into()])
    }

    fn style(self, key: &str, value: impl Into<Arg>) -> Sentence {
        self.word("style", vec![Arg::from(key), value.into()])
    }

    fn id(self, id: impl Into<Arg>) -> Sentence {
        self.word("id", vec![id.into()])
    }

    fn class(self, name: impl Into<Arg>) -> Sentence {
        self.word("class", vec![name.into()])
    }

    fn class_if(self, name: impl Into<Arg>, flag: bool) -> Sentence {
        self.word("class", vec![name.into(), Arg::from(flag)])
    }

    fn classes(self, names: impl Into<Arg>) -> Sentence {
        self.word("classes", vec![names.into()])
    }

    fn text(self, value: impl Into<Arg>) -> Sentence {
        self.word("text", vec![value.into()])
    }

    fn if_(self, cond: impl Into<Arg>, then: Sentence, otherwise: Option<Sentence>) -> Sentence {
        self.word("if", vec![cond.into(), Arg::from(then), Arg::from(otherwise)])
    }

    /// `if` with arbitrary branch arguments, such as render functions.
    fn if_args(self, cond: impl Into<Arg>, then: Arg, otherwise: Arg) -> Sentence {
        self.word("if", vec![cond.into(), then, otherwise])
    }

    fn each(self, items: impl Into<Arg>, render: impl Fn(&Arg, usize) -> Sentence + 'static) -> Sentence {
        self.word("each", vec![items.into(), Arg::render(render)])
    }

    fn html(self, markup: impl Into<Arg>) -> Sentence {
        self.word("html", vec![markup.into()])
    }

    fn component(self, factory: &ComponentFactory, props: impl Into<Arg>) -> Sentence {
        self.word("component", vec![Arg::from(factory), props.into()])
    }

    fn ref_(self, name: &str) -> Sentence {
        self.word("ref", vec![Arg::from(name)])
    }

    fn on(self, event: &str, handler: impl Into<Arg>) -> Sentence {
        self.word("on", vec![Arg::from(event), handler.into()])
    }

    /// Listener whose handler also receives `extra` after the event.
    fn on_with(self, event: &str, handler: impl Into<Arg>, extra: Vec<Arg>) -> Sentence {
        let mut args = vec![Arg::from(event), handler.into()];
        args.extend(extra);
        self.word("on", args)
    }

    event_methods! {
        click => "click", dblclick => "dblclick", blur => "blur", focus => "focus", submit => "submit",
        change => "change", keyup => "keyup", keydown => "keydown", keypress => "keypress",
        mouseover => "mouseover", mousedown => "mousedown", mouseup => "mouseup", mouseout => "mouseout",
    }

    fn execute(self, callback: impl Into<Arg>, args: Vec<Arg>) -> Sentence {
        let mut all = vec![callback.into()];
        all.extend(args);
        self.word("execute", all)
    }

    fn on_dom(self, hook: impl Into<Arg>, args: Vec<Arg>) -> Sentence {
        let mut all = vec![hook.into()];
        all.extend(args);
        self.word("onDom", all)
    }

    fn switch_use(self, reference: &str, args: Vec<Arg>) -> Sentence {
        let mut all = vec![Arg::from(reference)];
        all.extend(args);
        self.word("switchUse", all)
    }

    fn a(self, href: impl Into<Arg>, children: Vec<Arg>) -> Sentence {
        let mut args = vec![href.into()];
        args.extend(children);
        self.word("a", args)
    }

    fn img(self, src: impl Into<Arg>) -> Sentence {
        self.word("img", vec![src.into()])
    }

    fn input(self, kind: &str, value: impl Into<Arg>, extra: Option<Sentence>) -> Sentence {
        self.word("input", vec![Arg::from(kind), value.into(), Arg::from(extra)])
    }

    fn text_input(self, value: impl Into<Arg>, extra: Option<Sentence>) -> Sentence {
        self.word("textInput", vec![value.into(), Arg::from(extra)])
    }

    fn password_input(self, value: impl Into<Arg>, extra: Option<Sentence>) -> Sentence {
        self.word("passwordInput", vec![value.into(), Arg::from(extra)])
    }

    fn checkbox(self, checked: bool, extra: Option<Sentence>) -> Sentence {
        self.word("checkbox", vec![Arg::from(checked), Arg::from(extra)])
    }

    fn radio(self, checked: bool, extra: Option<Sentence>) -> Sentence {
        self.word("radio", vec![Arg::from(checked), Arg::from(extra)])
    }

    fn option(self, value: impl Into<Arg>, content: impl Into<Arg>, selected: bool) -> Sentence {
        self.word("option", vec![value.into(), content.into(), Arg::from(selected)])
    }

    fn link_css(self, href: impl Into<Arg>) -> Sentence {
        self.word("linkCss", vec![href.into()])
    }

    fn script(self, src: impl Into<Arg>) -> Sentence {
        self.word("script", vec![src.into()])
    }

    fn nbsp(self) -> Sentence {
        self.word("nbsp", Vec::new())
    }

    fn visible(self, flag: bool) -> Sentence {
        self.word("visible", vec![Arg::from(flag)])
    }

    fn display(self, flag: bool) -> Sentence {
        self.word("display", vec![Arg::from(flag)])
    }

    fn disabled(self, flag: bool) -> Sentence {
        self.word("disabled", vec![Arg::from(flag)])
    }
}

impl<T: Words> HtmlWords for T {}
