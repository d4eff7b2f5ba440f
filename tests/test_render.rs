use std::cell::RefCell;
use std::rc::Rc;

use lexidom::{
    args, html, Arg, ArgList, DomHook, EngineConfig, HostTree, HtmlWords, Lexicon, MemoryHost, Mutation, NodeId,
    ReconcileError, Reconciler, Sentence,
};
use pretty_assertions::assert_eq;

fn setup() -> (Rc<Lexicon>, Reconciler, MemoryHost) {
    let lexicon = html::lexicon();
    let engine = Reconciler::new().target(&lexicon);
    (lexicon, engine, MemoryHost::new())
}

fn render_html(sentence: Sentence) -> String {
    let (_, engine, mut host) = setup();
    let root = host.root();
    engine.render(&mut host, root, sentence).unwrap();
    host.to_html(root)
}

struct Recorder {
    log: Rc<RefCell<Vec<String>>>,
}

impl DomHook for Recorder {
    fn render(&self, host: &mut dyn HostTree, node: NodeId, args: &[Arg]) {
        host.set_attribute(node, "data-hook", &args.at(0).to_text());
        self.log.borrow_mut().push(format!("render {}", args.at(0).to_text()));
    }

    fn diff(&self, host: &mut dyn HostTree, node: NodeId, args: &[Arg], previous: &[Arg]) {
        if !args.at(0).same(&previous.at(0)) {
            host.set_attribute(node, "data-hook", &args.at(0).to_text());
        }
        self.log.borrow_mut().push(format!("diff {}", args.at(0).to_text()));
    }

    fn remove(&self, _host: &mut dyn HostTree, _node: NodeId, args: &[Arg]) {
        self.log.borrow_mut().push(format!("remove {}", args.at(0).to_text()));
    }
}

#[test]
fn test_single_element_with_id_attribute() {
    let (lexicon, engine, mut host) = setup();
    let root = host.root();
    let h = lexicon.first_level();
    let sentence = h.tag("div", args![h.attr("id", "x")]);

    let rendered = engine.render(&mut host, root, sentence.clone()).unwrap();
    let div = host.children(root)[0];
    assert_eq!(
        host.take_mutations(),
        vec![
            Mutation::CreateElement { node: div, tag: "div".into() },
            Mutation::Append { parent: root, child: div },
            Mutation::SetAttribute { node: div, name: "id".into(), value: "x".into() },
        ]
    );

    let rendered = engine.diff(&mut host, root, sentence.clone(), rendered).unwrap();
    assert!(host.mutations().is_empty());

    engine.diff(&mut host, root, h.tag("div", args![h.attr("id", "x")]), rendered).unwrap();
    assert!(host.mutations().is_empty());
}

#[test]
fn test_compound_tags_match_plain_tags() {
    let (lexicon, _, _) = setup();
    let h = lexicon.first_level();
    let compound = render_html(h.div(args![h.class("a"), h.span(args!["x"])]));
    let plain = render_html(h.tag("div", args![h.class("a"), h.tag("span", args!["x"])]));
    assert_eq!(compound, r#"<div class="a"><span>x</span></div>"#);
    assert_eq!(compound, plain);
}

#[test]
fn test_scalar_children_become_text() {
    let (lexicon, engine, mut host) = setup();
    let root = host.root();
    let h = lexicon.first_level();
    engine.render(&mut host, root, h.p(args!["a", Arg::Null, 3])).unwrap();

    let p = host.find_by_tag("p")[0];
    assert_eq!(host.children(p).len(), 3);
    assert_eq!(host.to_html(root), "<p>a3</p>");
}

#[test]
fn test_helpers() {
    let (lexicon, _, _) = setup();
    let h = lexicon.first_level();
    assert_eq!(render_html(h.a("/home", args!["home"])), r#"<a href="/home">home</a>"#);
    assert_eq!(
        render_html(h.text_input("hello", Some(h.class("edit")))),
        r#"<input class="edit" type="text"></input>"#
    );
    assert_eq!(
        render_html(h.div(args![h.visible(false).disabled(true)])),
        r#"<div style="visibility: hidden;"></div>"#
    );
    assert_eq!(render_html(h.span(args![h.nbsp()])), "<span>\u{a0}</span>");
}

#[test]
fn test_untargeted_namespaces_are_skipped() {
    let (lexicon, engine, mut host) = setup();
    let root = host.root();
    let analytics = Lexicon::builder("analytics").add_atoms(["track"]).build();

    let sentence = lexicon
        .first_level()
        .div(args!["x"])
        .use_sentence(&analytics.first_level().call("track", args!["view"]));
    let rendered = engine.render(&mut host, root, sentence).unwrap();
    assert_eq!(rendered.len(), 2);
    assert_eq!(host.to_html(root), "<div>x</div>");
}

#[test]
fn test_witness_labels() {
    let (lexicon, engine, mut host) = setup();
    let root = host.root();
    let h = lexicon.first_level();
    let sentence = || h.if_(true, h.text("a"), None).each(args![1], |item, _| html::lexicon().first_level().text(item.clone()));

    engine.render(&mut host, root, sentence()).unwrap();
    assert_eq!(host.to_html_with_markers(root), "a<!--if-->1<!--each-->");

    let quiet = Reconciler::with_config(EngineConfig { label_markers: false, ..EngineConfig::default() }).target(&lexicon);
    let mut other = MemoryHost::new();
    let other_root = other.root();
    quiet.render(&mut other, other_root, sentence()).unwrap();
    assert_eq!(other.to_html_with_markers(other_root), "a<!---->1<!---->");
}

#[test]
fn test_raw_markup_is_replaced_when_changed() {
    let (lexicon, engine, mut host) = setup();
    let root = host.root();
    let h = lexicon.first_level();

    let rendered = engine.render(&mut host, root, h.html("<b>x</b>").text("!")).unwrap();
    assert_eq!(host.to_html(root), "<b>x</b>!");
    let rendered = engine.diff(&mut host, root, h.html("<i>y</i>").text("!"), rendered).unwrap();
    assert_eq!(host.to_html(root), "<i>y</i>!");
    engine.remove(&mut host, root, rendered);
    assert_eq!(host.to_html_with_markers(root), "");
}

#[test]
fn test_dom_hooks_follow_the_lexem() {
    let (lexicon, engine, mut host) = setup();
    let root = host.root();
    let h = lexicon.first_level();
    let log = Rc::new(RefCell::new(Vec::new()));
    let hook = Arg::hook(Recorder { log: Rc::clone(&log) });

    let view = |value: &str| h.div(args![h.on_dom(hook.clone(), args![value])]);
    let rendered = engine.render(&mut host, root, view("a")).unwrap();
    let rendered = engine.diff(&mut host, root, view("b"), rendered).unwrap();
    assert_eq!(host.to_html(root), r#"<div data-hook="b"></div>"#);
    engine.remove(&mut host, root, rendered);

    assert_eq!(*log.borrow(), vec!["render a", "diff b", "remove b"]);
}

#[test]
fn test_execute_runs_again_only_on_change() {
    let (lexicon, engine, mut host) = setup();
    let root = host.root();
    let h = lexicon.first_level();
    let runs = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&runs);
    let callback = Arg::callback(move |args| sink.borrow_mut().push(args.at(0).to_text()));

    let view = |value: i32| h.execute(callback.clone(), args![value]);
    let rendered = engine.render(&mut host, root, view(1)).unwrap();
    let rendered = engine.diff(&mut host, root, view(1), rendered).unwrap();
    engine.diff(&mut host, root, view(2), rendered).unwrap();
    assert_eq!(*runs.borrow(), vec!["1", "2"]);
}

#[test]
fn test_listener_must_be_a_function() {
    let (lexicon, engine, mut host) = setup();
    let root = host.root();
    let h = lexicon.first_level();

    let error = engine.render(&mut host, root, h.div(args![h.on("click", "nope")])).unwrap_err();
    assert!(matches!(error, ReconcileError::NotAListener { ref event } if event == "click"));
    assert_eq!(error.to_string(), "Listener for `click` is not a function");
}
