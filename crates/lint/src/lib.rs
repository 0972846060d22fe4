#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[macro_use]
extern crate tracing;

mod findings;
pub use findings::Findings;

pub mod checks;
pub use checks::{FileListener, MissingRestricted, MissingVirtual, Unrestricted, new_listener};

mod driver;
pub use driver::{DriverError, FileReport, check_dir, check_file, check_source, collect_sources};

pub use solcst_config::CheckKind;
