use std::rc::Rc;

use lexidom::{
    args, html, Arg, HtmlWords, Level, Lexicon, LexiconError, MemoryHost, Reconciler, Registry, Sentence, WordKind,
};
use pretty_assertions::assert_eq;

fn app() -> Rc<Lexicon> {
    html::lexicon()
        .create_dialect("app")
        .add_compounds(|c| {
            c.define("button", |h, this, args| {
                let mut children = vec![Arg::from(h.class("btn"))];
                children.extend_from_slice(args);
                this.call("tag", vec![Arg::from("button"), Arg::list(children)])
            })
            .define("card", |h, this, args| {
                this.use_sentence(&h.section(args![h.class("card"), h.h2(args![args[0].clone()]), h.button(args!["open"])]))
            });
        })
        .build()
}

/// Dialect whose `text` wraps the html text atom in a span.
fn boxed() -> Rc<Lexicon> {
    html::lexicon()
        .create_dialect("boxed")
        .add_compounds(|c| {
            c.define("text", |h, this, args| {
                let inner = h.empty().append("html", "text", args.to_vec());
                this.use_sentence(&h.span(args![h.class("t"), inner]))
            });
        })
        .build()
}

fn markup(lexicon: &Rc<Lexicon>, sentence: Sentence) -> String {
    let engine = Reconciler::new().target(lexicon);
    let mut host = MemoryHost::new();
    let root = host.root();
    engine.render(&mut host, root, sentence).unwrap();
    host.to_html(root)
}

fn names(sentence: &Sentence) -> Vec<String> {
    sentence.lexems().iter().map(|l| format!("{}:{}", l.namespace(), l.name())).collect()
}

#[test]
fn test_word_kinds_of_the_html_vocabulary() {
    let lexicon = html::lexicon();
    assert_eq!(lexicon.kind_of("tag"), Some(WordKind::Atom));
    assert_eq!(lexicon.kind_of("div"), Some(WordKind::Compound));
    assert_eq!(lexicon.kind_of("on"), Some(WordKind::Alias));
    assert_eq!(lexicon.kind_of("marquee"), None);
    assert!(lexicon.second_level().has("click"));
    assert!(!lexicon.second_level().has("text"));
}

#[test]
fn test_dialect_overrides_without_touching_parent() {
    let app = app();
    let base = app.parent().map(Rc::clone).unwrap();

    let custom = app.first_level().button(args!["ok"]);
    assert_eq!(names(&custom), vec!["app:button"]);
    assert_eq!(markup(&app, custom), r#"<button class="btn">ok</button>"#);

    let plain = base.first_level().button(args!["ok"]);
    assert_eq!(names(&plain), vec!["html:button"]);
    assert_eq!(markup(&base, plain), "<button>ok</button>");
}

#[test]
fn test_atomic_and_first_level_render_alike() {
    let app = app();
    let first = app.first_level().call("card", args!["Inbox"]);
    let atomic = app.atomic().call("card", args!["Inbox"]);

    assert_eq!(names(&first), vec!["app:card"]);
    assert!(atomic.lexems().iter().all(|l| html::ATOMS.contains(&l.name())));

    let expected = r#"<section class="card"><h2>Inbox</h2><button class="btn">open</button></section>"#;
    assert_eq!(markup(&app, first), expected);
    assert_eq!(markup(&app, atomic), expected);
}

#[test]
fn test_translate_and_develop_to_atoms() {
    let app = app();
    let first = app.first_level().div(args![app.first_level().call("card", args!["x"])]);
    let translated = app.translate(&first, Level::Atomic);
    assert_eq!(translated.level(), Level::Atomic);
    assert_eq!(names(&translated), vec!["html:tag"]);
    assert_eq!(markup(&app, translated), markup(&app, first.clone()));

    let atoms = app.develop_to_atoms(&first.lexems()[0]).unwrap();
    assert_eq!(names(&atoms), vec!["html:tag"]);
    assert!(matches!(
        app.develop_to_atoms(&app.first_level().text("t").lexems()[0]),
        Err(LexiconError::MissingDevelopment { ref word, .. }) if word == "text"
    ));
}

#[test]
fn test_switching_vocabulary_mid_chain() {
    let widgets = Lexicon::builder("widgets")
        .add_atoms(["spinner"])
        .add_compounds(|c| {
            c.define("loading", |h, this, _| this.use_sentence(&h.call("spinner", args![]).call("spinner", args![])));
        })
        .build();
    let mut registry = Registry::new();
    registry.register(&html::lexicon()).register(&widgets);

    let h = html::lexicon().atomic();
    let sentence = h.text("wait").with_lexicon(&registry, "widgets").unwrap().call("loading", args![]);
    assert_eq!(names(&sentence), vec!["html:text", "widgets:spinner", "widgets:spinner"]);
    assert_eq!(sentence.lexicon().name(), "widgets");

    let referenced = h.empty().use_ref(&registry, "widgets:loading", args![]).unwrap();
    assert_eq!(referenced.len(), 2);
    assert_eq!(
        h.empty().with_lexicon(&registry, "svg").unwrap_err(),
        LexiconError::UnknownLexicon("svg".into())
    );
}

#[test]
fn test_unknown_words_as_values() {
    let lexicon = html::lexicon();
    let error = lexicon.first_level().try_call("marquee", args![]).unwrap_err();
    assert_eq!(error.to_string(), "Word `marquee` is not defined in lexicon html");
}

#[test]
#[should_panic(expected = "Word `marquee` is not defined in lexicon html")]
fn test_unknown_words_panic_when_called() {
    html::lexicon().first_level().div(args![]).call("marquee", args![]);
}

#[test]
fn test_dialect_words_are_listed() {
    let app = app();
    assert_eq!(app.own_words(), vec!["button", "card"]);
    assert_eq!(app.chain().map(|l| l.name()).collect::<Vec<_>>(), vec!["app", "html"]);
    assert!(app.has_word("div"));
}

#[test]
fn test_compound_shadowing_an_atom_is_developed() {
    let boxed = boxed();
    assert_eq!(boxed.kind_of("text"), Some(WordKind::Compound));
    assert_eq!(html::lexicon().kind_of("text"), Some(WordKind::Atom));

    let first = boxed.first_level().div(args![boxed.first_level().text("hi")]);
    let atomic = boxed.atomic().div(args![boxed.atomic().text("hi")]);
    assert_eq!(names(&first.lexems()[0].args()[0].as_sentence().unwrap()), vec!["boxed:text"]);

    let expected = r#"<div><span class="t">hi</span></div>"#;
    assert_eq!(markup(&boxed, atomic), expected);
    assert_eq!(markup(&boxed, first), expected);
}

#[test]
fn test_compound_shadowing_an_atom_diffs_like_a_fresh_render() {
    let boxed = boxed();
    let engine = Reconciler::new().target(&boxed);
    let mut host = MemoryHost::new();
    let root = host.root();
    let view = |value: &str| boxed.first_level().div(args![boxed.first_level().text(value)]);

    let rendered = engine.render(&mut host, root, view("hi")).unwrap();
    let span = host.find_by_tag("span")[0];
    engine.diff(&mut host, root, view("yo"), rendered).unwrap();

    assert_eq!(host.find_by_tag("span"), vec![span]);
    assert_eq!(host.to_html(root), markup(&boxed, view("yo")));
    assert_eq!(host.to_html(root), r#"<div><span class="t">yo</span></div>"#);
}
