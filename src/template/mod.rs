//! Template rendering for merchant-authored block text.
//!
//! A template goes through three steps: translation-handle resolution
//! ([`crate::i18n`]), `{placeholder}` substitution ([`TemplateBindings`]) and
//! `*emphasis*` splitting ([`split_emphasis`]). The output is a typed
//! [`Segment`] list; how emphasis is drawn is up to the presentation layer.

mod bindings;
mod flag;
mod markup;
mod render;

pub use bindings::TemplateBindings;
pub use flag::country_flag;
pub use markup::{EMPHASIS_DELIMITER, Segment, plain_text, split_emphasis};
pub use render::{render, render_or, resolve_and_bind};
