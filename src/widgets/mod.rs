//! Checkout blocks rendered from settings, translations and derived metrics.
//!
//! Each widget module turns its settings table plus live state into a
//! [`Block`] tree. Rendering is pure: fetching, timers and cart mutations live
//! in [`crate::metrics`], [`crate::cart`] and [`crate::sources`], and the
//! caller passes their latest values in.

pub mod checkbox_upsell;
pub mod countdown;
pub mod generic_image;
pub mod metafield_upsells;
mod output;
pub mod payment_icons;
pub mod progress_bar;
pub mod remove_line;
pub mod reviews;
pub mod savings;
pub mod stock_bar;
pub mod upsell_list;
pub mod usps;

pub use output::{Block, Tone, preview};
