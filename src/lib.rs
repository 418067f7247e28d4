//! Compile text templates into an embedded scripting language, keeping a
//! position map back to the template.
//!
//! A template mixes literal text with four kinds of blocks:
//!
//! - `{{ expr }}` or `{{ expr :000.00}}` - content: evaluate an expression,
//!   optionally through a numeric picture format
//! - `{% code %}` - statements spliced into the unit verbatim, so a loop or
//!   conditional can span the text between blocks
//! - `{# note #}` - comments, removed from the output
//! - `{$Name: payload $}` - custom blocks resolved at build time by
//!   registered [`CustomBlock`] handlers
//!
//! Building turns the whole template into one script unit and compiles it;
//! rendering runs the unit against the declared parameters. Diagnostics from
//! any phase point at *template* positions, translated through the
//! [`SourceMap`] that is constructed alongside the unit.
//!
//! ```
//! use gabarit::{Dynamic, TemplateBuilder};
//!
//! # fn main() -> Result<(), gabarit::Error> {
//! let template = TemplateBuilder::new("Hello, {{ name }}!")
//!     .with_parameter("name")
//!     .build()?;
//! let out = template.render([Dynamic::from("world")])?;
//! assert_eq!(out, "Hello, world!");
//! # Ok(())
//! # }
//! ```

pub mod blocks;
mod builder;
mod codegen;
pub mod config;
mod error;
mod eval;
mod format;
mod lexer;
mod location;
mod map;
mod scan;
mod token;
pub mod toolchain;

pub use blocks::{CustomBlock, EnvBlock};
pub use builder::{Template, TemplateBuilder};
pub use config::TemplateConfig;
pub use error::{CompilerError, ConfigError, Error, ErrorDetail, Result, RuntimeError, SyntaxError};
pub use eval::RhaiToolchain;
pub use location::Location;
pub use map::SourceMap;
pub use toolchain::{InvokeError, SnippetDiagnostic, Toolchain};

// Re-exported so callers can hand arguments to `render` without depending
// on the scripting crate directly.
pub use rhai::Dynamic;
