#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

use std::num::NonZeroUsize;

#[macro_use]
mod macros;

mod opts;
pub use opts::{CheckArgs, Command, Opts, ParseArgs};

str_enum! {
    /// How errors and other messages are produced.
    #[derive(Default)]
    #[strum(serialize_all = "kebab-case")]
    pub enum ErrorFormat {
        /// Human-readable output.
        #[default]
        Human,
        /// One JSON object per diagnostic, one per line.
        Json,
    }
}

str_enum! {
    /// When to use colored output.
    #[derive(Default)]
    #[strum(serialize_all = "kebab-case")]
    pub enum ColorChoice {
        /// Color when writing to a terminal that supports it.
        #[default]
        Auto,
        Always,
        Never,
    }
}

str_enum! {
    /// Which analysis listener to run over a source tree.
    #[derive(strum::EnumIs)]
    #[strum(serialize_all = "kebab-case")]
    pub enum CheckKind {
        /// Public and external functions of service or component contracts that are not `virtual`.
        MissingVirtual,
        /// State-changing public and external functions of access-managed contracts without a
        /// `restricted()` modifier.
        MissingRestricted,
        /// State-changing public and external functions without a `restricted()` modifier, in any
        /// contract.
        Unrestricted,
    }
}

str_enum! {
    /// How a parse tree is printed.
    #[derive(Default)]
    #[strum(serialize_all = "kebab-case")]
    pub enum TreeFormat {
        /// Lisp-style nested lists: `(sourceUnit (pragmaDirective pragma ...) <EOF>)`.
        #[default]
        Sexpr,
        /// Nested JSON objects.
        Json,
    }
}

/// Wrapper to implement a custom `Default` value for the number of threads.
#[derive(Clone, Copy)]
pub struct Threads(pub NonZeroUsize);

impl From<Threads> for NonZeroUsize {
    fn from(threads: Threads) -> Self {
        threads.0
    }
}

impl From<NonZeroUsize> for Threads {
    fn from(n: NonZeroUsize) -> Self {
        Self(n)
    }
}

impl Default for Threads {
    fn default() -> Self {
        Self::available()
    }
}

impl Threads {
    /// One thread per logical core, or a single thread if that cannot be determined.
    pub fn available() -> Self {
        Self(std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN))
    }

    /// Returns the number of threads.
    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl std::str::FromStr for Threads {
    type Err = <NonZeroUsize as std::str::FromStr>::Err;

    /// `0` means "number of logical cores".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<usize>().map(|n| NonZeroUsize::new(n).map(Self).unwrap_or_else(Self::available))
    }
}

impl std::fmt::Display for Threads {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::fmt::Debug for Threads {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn string_enum() {
        for value in CheckKind::iter() {
            let s = value.to_str();
            assert_eq!(value.to_string(), s);
            assert_eq!(value, s.parse().unwrap());
        }
        assert_eq!(CheckKind::MissingVirtual.to_str(), "missing-virtual");
        assert_eq!(TreeFormat::default(), TreeFormat::Sexpr);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_string_enum() {
        for value in ErrorFormat::iter() {
            let json_s = format!("\"{value}\"");
            assert_eq!(serde_json::to_string(&value).unwrap(), json_s);
            assert_eq!(serde_json::from_str::<ErrorFormat>(&json_s).unwrap(), value);
        }
        assert!(serde_json::from_str::<ErrorFormat>("\"xml\"").is_err());
    }

    #[test]
    fn threads() {
        assert_eq!("3".parse::<Threads>().unwrap().get(), 3);
        assert!("0".parse::<Threads>().unwrap().get() >= 1);
        assert!("x".parse::<Threads>().is_err());
    }
}
