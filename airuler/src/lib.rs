//! airuler - AI rule template compiler
//!
//! Compiles one set of rule templates into the rule files of several AI
//! coding assistants. Each template is rendered once per target with the
//! target name in scope, so a single source can carry tool-specific headers
//! and sections.
//!
//! # Layout
//!
//! ```text
//! templates/
//! ├── go.tmpl              -> compiled/cursor/go.mdc, compiled/claude/go.md, ...
//! ├── lang/rust.tmpl       -> compiled/cursor/lang/rust.mdc, ...
//! └── partials/
//!     └── header.tmpl      -> included as {{> partials/header}}, never compiled
//! ```
//!
//! # Modules
//!
//! - [`target`] - Closed registry of targets and their output paths
//! - [`frontmatter`] - YAML front matter parsing
//! - [`loader`] - Template and partial discovery across roots
//! - [`render`] - Handlebars rendering per target
//! - [`compiler`] - Orchestration and output writing
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use airuler::Compiler;
//!
//! let compiler = Compiler::new(vec!["templates".into()], "compiled");
//! let outputs = compiler.compile_templates(&["cursor", "claude"])?;
//! ```

pub mod cli;
pub mod compiler;
pub mod config;
pub mod error;
pub mod frontmatter;
pub mod loader;
pub mod render;
pub mod target;

// Re-export commonly used types
pub use compiler::{CompileReport, CompiledOutput, Compiler, compile_templates};
pub use config::Config;
pub use error::{CompileError, PairFailure};
pub use frontmatter::{TemplateFrontMatter, parse_template_front_matter, split_front_matter};
pub use loader::{
    PARTIALS_SEGMENT, PartialSource, TEMPLATE_SUFFIX, TemplateSet, TemplateSource, load_templates_from_dirs,
};
pub use render::{RenderContext, Renderer};
pub use target::{Target, is_valid_target, parse_targets, target_names};
