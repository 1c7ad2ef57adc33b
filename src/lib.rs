#![forbid(unsafe_code)]
//! Apple `.strings` parsing and template context building for typed
//! localization accessors.
//!
//! Tables are parsed into ordered [`Entry`] values whose printf-style
//! placeholders are classified into [`PlaceholderType`]s. The accumulated
//! entries are then exposed to a template engine both as a flat list and as a
//! namespace tree built from dot-delimited keys.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use stringsgen::StringsFileParser;
//!
//! let mut parser = StringsFileParser::new();
//! parser.parse_file("en.lproj/Localizable.strings")?;
//!
//! let output = parser.stencil_context(Some("L10n"));
//! for conflict in &output.conflicts {
//!     eprintln!("warning: {conflict}");
//! }
//! println!("{}", output.context.to_json_string_pretty()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Placeholders
//!
//! ```rust
//! use stringsgen::PlaceholderType;
//!
//! let types = PlaceholderType::placeholders("%2$d apples for %1$@")?;
//! assert_eq!(types, vec![PlaceholderType::Object, PlaceholderType::Int]);
//! # Ok::<(), stringsgen::Error>(())
//! ```

pub mod context;
pub mod error;
pub mod formats;
pub mod options;
pub mod parser;
pub mod placeholder;
pub mod traits;
pub mod types;

// Re-export most used types for easy consumption
pub use crate::{
    context::{
        ContextOutput, FlatEntry, LeafEntry, Namespace, Node, StringsContext, StructuralConflict,
        build_context,
    },
    error::Error,
    options::{ConflictPolicy, ContextOptions, DEFAULT_ENUM_NAME},
    parser::StringsFileParser,
    placeholder::placeholders,
    types::{Entry, PlaceholderType},
};
