// ABOUTME: Core library converting editor-exported HTML into WordPress Gutenberg block markup.
// ABOUTME: Pipeline: style inlining, artifact removal, cleanup, policy checks, block emission.

//! Converts messy editor HTML (Google Docs, Word exports) into WordPress
//! Gutenberg block markup.
//!
//! The top-level entry point is [`convert`] (or [`convert_named`] when file
//! names should appear in the report):
//!
//! ```
//! use docpress_core::{convert, Config};
//!
//! let config = Config::builder().disable("requireH2").disable("minImageCount").build();
//! let result = convert("<p>Hello</p>", &config);
//! assert!(result.html.starts_with("<!-- wp:paragraph -->"));
//! ```
//!
//! Each stage is a pure string-to-string function; conversions share no
//! state and can run concurrently without locking.

pub mod blocks;
pub mod clean;
pub mod convert;
pub mod dom;
pub mod error;
pub mod options;
pub mod pipeline;
pub mod policy;
pub mod result;
pub mod styles;

pub use error::{ConvertError, ErrorCode};
pub use options::{Config, ConfigBuilder, Mode, OutputFormat};
pub use pipeline::{convert, convert_named};
pub use policy::{register, Policy, PolicyOutcome, PolicySetting};
pub use result::{Conversion, ConversionReport};
