use std::fmt::Write;

use crate::arg::{format_number, Arg};
use crate::lexem::Lexem;
use crate::sentence::{Level, Sentence};

const MAX_TEXT: usize = 24;

/// Prints a sentence as an indented tree.
///
/// Sentence arguments are printed below the lexem that holds them. Compounds
/// of a FirstLevel sentence are developed one step at a time, `depth` times,
/// with every development shown after `=>`.
pub struct SentenceVisualizer {
    output: String,
    indent: usize,
    depth: usize,
}

impl Default for SentenceVisualizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentenceVisualizer {
    pub fn new() -> Self {
        Self { output: String::new(), indent: 0, depth: 1 }
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn visualize(sentence: &Sentence) -> String {
        SentenceVisualizer::new().render(sentence)
    }

    pub fn render(mut self, sentence: &Sentence) -> String {
        let level = match sentence.level() {
            Level::Atomic => "atomic",
            Level::FirstLevel => "first-level",
        };
        let _ = writeln!(self.output, "Sentence {} ({}, {} lexems)", sentence.lexicon().name(), level, sentence.len());
        self.indent += 1;
        self.visit_sentence(sentence, self.depth);
        self.indent -= 1;
        self.output
    }

    fn indent(&mut self) {
        for _ in 0..self.indent {
            self.output.push_str("  ");
        }
    }

    fn visit_sentence(&mut self, sentence: &Sentence, depth: usize) {
        for lexem in sentence.lexems() {
            self.visit_lexem(sentence, lexem, depth);
        }
    }

    fn visit_lexem(&mut self, sentence: &Sentence, lexem: &Lexem, depth: usize) {
        self.indent();
        let args: Vec<String> = lexem.args().iter().map(summarize).collect();
        let _ = writeln!(self.output, "{}:{}({})", lexem.namespace(), lexem.name(), args.join(", "));

        self.indent += 1;
        for (index, arg) in lexem.args().iter().enumerate() {
            self.visit_nested(index, arg, depth);
        }

        let second_level = sentence.lexicon().second_level();
        if depth > 0 && sentence.level() == Level::FirstLevel && second_level.has(lexem.name()) {
            match second_level.develop(lexem) {
                Ok(developed) => {
                    self.indent();
                    self.output.push_str("=>\n");
                    self.indent += 1;
                    self.visit_sentence(&developed, depth - 1);
                    self.indent -= 1;
                }
                Err(error) => {
                    self.indent();
                    let _ = writeln!(self.output, "=> error: {}", error);
                }
            }
        }
        self.indent -= 1;
    }

    fn visit_nested(&mut self, index: usize, arg: &Arg, depth: usize) {
        match arg {
            Arg::Sentence(nested) => {
                self.indent();
                let _ = writeln!(self.output, "#{}", index);
                self.indent += 1;
                self.visit_sentence(nested, depth);
                self.indent -= 1;
            }
            Arg::List(items) => {
                for (item_index, item) in items.iter().enumerate() {
                    if let Arg::Sentence(nested) = item {
                        self.indent();
                        let _ = writeln!(self.output, "#{}.{}", index, item_index);
                        self.indent += 1;
                        self.visit_sentence(nested, depth);
                        self.indent -= 1;
                    }
                }
            }
            _ => {}
        }
    }
}

/// One-line summary of an argument.
pub fn summarize(arg: &Arg) -> String {
    match arg {
        Arg::Null => "null".to_string(),
        Arg::Bool(flag) => flag.to_string(),
        Arg::Number(number) => format_number(*number),
        Arg::Str(text) if text.chars().count() > MAX_TEXT => {
            format!("{:?}...", text.chars().take(MAX_TEXT).collect::<String>())
        }
        Arg::Str(text) => format!("{:?}", &**text),
        Arg::Sentence(nested) => format!("<sentence {}>", nested.len()),
        Arg::List(items) => format!("[{}]", items.len()),
        other => format!("<{}>", other.kind()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::html::{self, HtmlWords};

    #[test]
    fn test_compounds_develop_to_depth() {
        let lexicon = html::lexicon();
        let h = lexicon.first_level();
        let sentence = h.div(args![h.class("x")]);

        let tree = SentenceVisualizer::visualize(&sentence);
        let lines: Vec<&str> = tree.lines().collect();
        assert_eq!(lines[0], "Sentence html (first-level, 1 lexems)");
        assert_eq!(lines[1], "  html:div(<sentence 1>)");
        assert_eq!(lines[2], "    #0");
        assert_eq!(lines[3], "      html:class(\"x\")");
        assert_eq!(lines[4], "    =>");
        assert_eq!(lines[5], "      html:tag(\"div\", [1])");

        let flat = SentenceVisualizer::new().with_depth(0).render(&sentence);
        assert!(!flat.contains("=>"));
    }

    #[test]
    fn test_summaries() {
        assert_eq!(summarize(&Arg::from(2.5)), "2.5");
        assert_eq!(summarize(&Arg::from("a".repeat(30))), format!("{:?}...", "a".repeat(24)));
        assert_eq!(summarize(&Arg::handler(|_, _| {})), "<handler>");
    }
}
