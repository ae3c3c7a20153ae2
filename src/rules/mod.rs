//! The text rule engine.
//!
//! A rule string is parsed once into a [`SearchRuleList`], checked, and
//! applied to a [`ProcessState`] borrowing a line buffer. See
//! [`describe`] for the language reference.

mod command;
mod describe;
mod flow;
mod list;
mod names;
mod parser;
mod position;
mod rule;
mod search;
mod state;
mod template;

pub use command::{
    Command, JumpTarget, Operand, Operator, Replace, ReplaceTarget, Source, StateVariable,
};
pub use describe::describe;
pub use flow::{FlowControl, Reaction};
pub use list::{AbortReason, Outcome, SearchRuleList};
pub use names::{MarkerName, RegisterName};
pub use parser::{COMMAND_NAMES, ParseError};
pub use position::Position;
pub use rule::{Anchor, Reposition, RuleKind, SearchRule};
pub use search::{Direction, SearchData, SearchRange};
pub use state::{Edit, LastMatch, Markers, ProcessState, Registers};
pub use template::{TextTemplate, translate_replacement};

pub(crate) use position::{char_len, split_at_col};
pub(crate) use template::substitute;
