//! User settings and adapt-variables forms.
pub mod form;
pub mod settings;

pub use form::{AdaptForm, EXAMPLE_FORM, FileRules, VariableRule};
pub use settings::Settings;
