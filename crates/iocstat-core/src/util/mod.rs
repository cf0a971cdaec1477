//! Utility modules for iocstat.

mod text;

pub use text::{truncate_bounded, unescape_octal};
