//! # prose-lint-rules
//!
//! Built-in rules for prose-lint.
//!
//! Each rule is a thin adapter over the core engine: it walks the
//! tokenized [`Document`](prose_lint_core::Document), asks the classifiers
//! and the safety engine what to report, and attaches a position-exact fix
//! when the fix lands in the auto-fix tier.
//!
//! ## Available Rules
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | PL001 | `sentence-case-heading` | Headings use sentence case |
//! | PL002 | `backtick-code-elements` | Code elements in prose are wrapped in backticks |
//! | PL003 | `no-bare-urls` | URLs are autolinks or links, never bare text |
//! | PL004 | `no-literal-ampersand` | A standalone `&` is written as "and" |
//! | PL005 | `no-dead-internal-links` | Internal links point at existing files and anchors |
//! | PL006 | `no-empty-list-items` | List items have content |
//!
//! ## Usage
//!
//! ```ignore
//! use prose_lint_core::Analyzer;
//! use prose_lint_rules::{NoBareUrls, SentenceCaseHeading};
//!
//! let analyzer = Analyzer::builder()
//!     .root("./docs")
//!     .rule(SentenceCaseHeading::new().special_terms(&["GitHub Actions"]))
//!     .rule(NoBareUrls::new())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backtick_code_elements;
mod from_config;
pub mod no_bare_urls;
pub mod no_dead_internal_links;
pub mod no_empty_list_items;
pub mod no_literal_ampersand;
mod presets;
pub mod sentence_case_heading;

pub use backtick_code_elements::BacktickCodeElements;
pub use from_config::{rules_from_config, RULE_NAMES};
pub use no_bare_urls::NoBareUrls;
pub use no_dead_internal_links::NoDeadInternalLinks;
pub use no_empty_list_items::NoEmptyListItems;
pub use no_literal_ampersand::NoLiteralAmpersand;
pub use presets::{all_rules, minimal_rules, recommended_rules, strict_rules, Preset, UnknownPreset};
pub use sentence_case_heading::SentenceCaseHeading;

/// Re-export core types for convenience.
pub use prose_lint_core::{Rule, Severity, Violation};
