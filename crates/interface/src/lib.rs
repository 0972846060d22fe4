#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[macro_use]
extern crate tracing;

/// Pluralize a word based on a count.
#[macro_export]
#[rustfmt::skip]
macro_rules! pluralize {
    // Pluralize based on count (e.g., apples)
    ($x:expr) => {
        if $x == 1 { "" } else { "s" }
    };
    ("has", $x:expr) => {
        if $x == 1 { "has" } else { "have" }
    };
    ("is", $x:expr) => {
        if $x == 1 { "is" } else { "are" }
    };
    ("was", $x:expr) => {
        if $x == 1 { "was" } else { "were" }
    };
}

pub mod diagnostics;
use diagnostics::ErrorGuaranteed;

mod pos;
pub use pos::{BytePos, CharPos};

pub mod source_map;
pub use source_map::{FileName, SourceFile};

mod span;
pub use span::Span;

pub use solcst_config as config;

/// The current version of solcst.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type whose error has already been reported.
pub type Result<T = (), E = ErrorGuaranteed> = std::result::Result<T, E>;
