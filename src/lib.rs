//! Library entry for checkout-blocks: localized templates, cart-line sync and
//! derived metrics for merchant-configured checkout blocks.
//!
//! The three cores are [`i18n`] + [`template`] (translatable merchant text),
//! [`cart`] (keeping an "add this item" toggle consistent with the host cart)
//! and [`metrics`] (threshold progress, decaying stock, countdown, savings).
//! [`widgets`] renders them into host-agnostic [`widgets::Block`] trees, and
//! [`app`] drives everything from a scenario file for the preview binary.

pub mod app;
pub mod cart;
pub mod i18n;
pub mod metrics;
pub mod settings;
pub mod sources;
pub mod template;
pub mod util;
pub mod widgets;
