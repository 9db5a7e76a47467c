use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{Diagram, EXIT_TYPE, PipeModel, RECEIVER_TYPE, Result, ShareLock, TypeDictionary};

/// Marker carried by receiver pipe names, eg. `(receiver): Foo`.
pub const RECEIVER_MARKER: &str = "(receiver):";

/// Visual classification of a pipe.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PipeKind {
    /// Terminal node; only accepts incoming connections.
    Exit,
    /// Named after the receiver convention; no icon.
    Receiver,
    /// Any other pipe; shows the icon of its type.
    Activity,
}

impl PipeKind {
    /// Type tag written into the model, `None` keeps the dictionary default.
    pub fn type_tag(&self) -> Option<&'static str> {
        match self {
            PipeKind::Exit => Some(EXIT_TYPE),
            PipeKind::Receiver => Some(RECEIVER_TYPE),
            PipeKind::Activity => None,
        }
    }

    pub fn is_source(&self) -> bool {
        !matches!(self, PipeKind::Exit)
    }
}

/// Whether `name` follows the receiver naming convention of a diagram.
///
/// Either the name carries the `(receiver):` marker, or the dictionary maps
/// its `receiver <name>` form to `Receiver`.
pub fn is_receiver(
    name: &str,
    types: &TypeDictionary,
) -> bool {
    if name.contains(RECEIVER_MARKER) {
        return true;
    }
    let bare = name.replacen("(receiver): ", "", 1);
    types.get(&format!("receiver {}", bare)).is_some_and(|t| t == RECEIVER_TYPE)
}

/// Exit beats Receiver beats the dictionary default; first match wins.
pub fn classify(
    model: &PipeModel,
    types: &TypeDictionary,
) -> PipeKind {
    let kind = if model.is_exit {
        PipeKind::Exit
    } else if is_receiver(&model.name, types) {
        PipeKind::Receiver
    } else {
        PipeKind::Activity
    };
    trace!(pipe = %model.name, kind = kind.as_ref(), "classified pipe");
    kind
}

/// How the scaffold of a pipe is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaffoldStyle {
    /// `hr` between name and extra text on non-exit pipes.
    pub rule: bool,
    /// Type name printed next to the type icon.
    pub type_text: bool,
    /// Every pipe auto-sized with a border, not only exits.
    pub boxed: bool,
}

/// What a classifier gets to work with during resolution.
pub struct ResolveContext<'a> {
    pub diagram: &'a Diagram,
    pub model: &'a ShareLock<PipeModel>,
    /// dictionary snapshot the pipe was built with
    pub types: &'a TypeDictionary,
}

/// Strategy deciding what a pipe looks like.
///
/// `classify` runs once, synchronously, while the scaffold is built.
/// `resolve` runs later, possibly many times, and returns the activity
/// identifier whose icon should replace the current one.
#[async_trait]
pub trait NodeClassifier: Send + Sync {
    fn classify(
        &self,
        model: &PipeModel,
        types: &TypeDictionary,
    ) -> PipeKind {
        classify(model, types)
    }

    fn scaffold_style(&self) -> ScaffoldStyle;

    async fn resolve(
        &self,
        _ctx: &ResolveContext<'_>,
    ) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Pipes whose appearance is settled at construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainClassifier;

#[async_trait]
impl NodeClassifier for PlainClassifier {
    fn scaffold_style(&self) -> ScaffoldStyle {
        ScaffoldStyle {
            rule: true,
            type_text: true,
            boxed: false,
        }
    }
}
