//! # prose-lint-core
//!
//! Core engine for linting Markdown prose.
//!
//! This crate provides the building blocks the rules are made of:
//!
//! - [`Document`] wraps `pulldown-cmark` output as line/column-addressed tokens
//! - [`ContextMap`] marks code, links, HTML and math as excluded contexts
//! - [`classify`] recognizes code-like spans (paths, commands, identifiers)
//! - [`disambiguate`] resolves overlapping matches into one per region
//! - [`safety`] scores candidate fixes into auto-fix, needs-review or skip
//! - [`Analyzer`] discovers files, runs [`Rule`]s and collects [`Violation`]s
//!
//! ## Example
//!
//! ```ignore
//! use prose_lint_core::Analyzer;
//!
//! let analyzer = Analyzer::builder()
//!     .root("./docs")
//!     .rule(MyRule::new())
//!     .build()?;
//!
//! let result = analyzer.analyze()?;
//! for violation in &result.violations {
//!     println!("{violation}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
pub mod classify;
mod config;
mod context;
pub mod disambiguate;
mod document;
mod fix;
mod link_cache;
pub mod linkify;
pub mod options;
pub mod ranges;
mod report;
mod rule;
pub mod safety;
pub mod slug;
mod types;

/// Utility modules for rule implementations.
pub mod utils;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError, CONFIG_VIOLATION_CODE};
pub use config::{AnalyzerConfig, Config, ConfigError, RuleConfig};
pub use context::FileContext;
pub use document::{Document, LinkKind, Token, TokenKind};
pub use fix::{apply_fixes, FixOutcome};
pub use link_cache::{AnchorSet, CacheStats, LinkCache};
pub use options::{validate_options, ConfigIssue, RuleOptions};
pub use ranges::{ContextKind, ContextMap, SkipOptions};
pub use report::{ReviewItem, ReviewReport};
pub use rule::{Rule, RuleBox};
pub use safety::{should_apply_autofix, FixContext, SafetyConfig, SafetyVerdict};
pub use types::{FixInfo, LintResult, Location, Severity, Tier, Violation, ViolationDiagnostic};
