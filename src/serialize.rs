//! # Sentence Documents
//!
//! JSON form of sentences, for the CLI and the wasm entry point:
//!
//! ```json
//! {
//!   "lexicon": "html",
//!   "level": "first-level",
//!   "lexems": [
//!     { "namespace": "html", "name": "div", "args": [{ "type": "str", "value": "hi" }] }
//!   ]
//! }
//! ```
//!
//! Only scalar, list and sentence arguments have a document form. Reading a
//! document back needs a [`Registry`] holding every lexicon it names, and
//! every word must be defined in the lexicon of its namespace.

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::arg::Arg;
use crate::lexem::Lexem;
use crate::lexicon::LexiconError;
use crate::registry::Registry;
use crate::sentence::{Level, Sentence};

#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("Invalid sentence document: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Vocabulary(#[from] LexiconError),

    #[error("Argument {index} of `{word}` is {kind} and has no document form")]
    Opaque { word: String, index: usize, kind: &'static str },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceDoc {
    pub lexicon: String,
    pub level: Level,
    pub lexems: Vec<LexemDoc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexemDoc {
    pub namespace: String,
    pub name: String,
    pub args: Vec<ArgDoc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum ArgDoc {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Sentence(SentenceDoc),
    List(Vec<ArgDoc>),
}

impl Sentence {
    pub fn to_doc(&self) -> Result<SentenceDoc, SerializeError> {
        let mut lexems = Vec::with_capacity(self.len());
        for lexem in self.lexems() {
            let args = lexem
                .args()
                .iter()
                .enumerate()
                .map(|(index, arg)| arg_doc(lexem, index, arg))
                .collect::<Result<_, _>>()?;
            lexems.push(LexemDoc { namespace: lexem.namespace().to_string(), name: lexem.name().to_string(), args });
        }
        Ok(SentenceDoc { lexicon: self.lexicon().name().to_string(), level: self.level(), lexems })
    }

    pub fn to_json(&self) -> Result<String, SerializeError> {
        Ok(serde_json::to_string(&self.to_doc()?)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, SerializeError> {
        Ok(serde_json::to_string_pretty(&self.to_doc()?)?)
    }

    pub fn from_doc(doc: &SentenceDoc, registry: &Registry) -> Result<Sentence, SerializeError> {
        let lexicon = registry.get(&doc.lexicon)?;
        let mut lexems = Vec::with_capacity(doc.lexems.len());
        for lexem in &doc.lexems {
            if !registry.get(&lexem.namespace)?.has_word(&lexem.name) {
                let (lexicon, word) = (lexem.namespace.clone(), lexem.name.clone());
                return Err(LexiconError::UnknownWord { lexicon, word }.into());
            }
            let args = lexem.args.iter().map(|arg| from_arg_doc(arg, registry)).collect::<Result<_, _>>()?;
            lexems.push(Lexem::new(&lexem.namespace, &lexem.name, args));
        }
        Ok(Sentence::from_parts(Rc::clone(lexicon), doc.level, lexems))
    }

    pub fn from_json(json: &str, registry: &Registry) -> Result<Sentence, SerializeError> {
        let doc: SentenceDoc = serde_json::from_str(json)?;
        Self::from_doc(&doc, registry)
    }
}

fn arg_doc(lexem: &Lexem, index: usize, arg: &Arg) -> Result<ArgDoc, SerializeError> {
    let doc = match arg {
        Arg::Null => ArgDoc::Null,
        Arg::Bool(value) => ArgDoc::Bool(*value),
        Arg::Number(value) => ArgDoc::Number(*value),
        Arg::Str(value) => ArgDoc::Str(value.to_string()),
        Arg::Sentence(sentence) => ArgDoc::Sentence(sentence.to_doc()?),
        Arg::List(items) => {
            ArgDoc::List(items.iter().map(|item| arg_doc(lexem, index, item)).collect::<Result<_, _>>()?)
        }
        opaque => {
            return Err(SerializeError::Opaque { word: lexem.name().to_string(), index, kind: opaque.kind() })
        }
    };
    Ok(doc)
}

fn from_arg_doc(doc: &ArgDoc, registry: &Registry) -> Result<Arg, SerializeError> {
    let arg = match doc {
        ArgDoc::Null => Arg::Null,
        ArgDoc::Bool(value) => Arg::Bool(*value),
        ArgDoc::Number(value) => Arg::Number(*value),
        ArgDoc::Str(value) => Arg::str(value),
        ArgDoc::Sentence(sentence) => Arg::sentence(Sentence::from_doc(sentence, registry)?),
        ArgDoc::List(items) => {
            Arg::list(items.iter().map(|item| from_arg_doc(item, registry)).collect::<Result<_, _>>()?)
        }
    };
    Ok(arg)
}
