//! Per-target rendering
//!
//! Templates use Handlebars syntax. The context exposes the target name and
//! the template's front matter, so one source can emit different output per
//! target:
//!
//! ```text
//! {{#if (eq target "cursor")}}
//! ---
//! description: {{description}}
//! globs: {{globs}}
//! ---
//! {{/if}}
//! {{> partials/header}}
//! ```
//!
//! Partials are registered under their logical name (`partials/header`) and
//! inherit the including template's context.

use std::collections::BTreeMap;

use handlebars::{Handlebars, RenderError, RenderErrorReason};
use serde::Serialize;
use serde_yaml::Value;
use tracing::{debug, warn};

use crate::error::{CompileError, PairFailure};
use crate::frontmatter::{TemplateFrontMatter, split_front_matter};
use crate::loader::PartialSource;
use crate::target::Target;

/// Data bound to a template while rendering it for one target
#[derive(Debug, Clone, Serialize)]
pub struct RenderContext<'a> {
    /// Target name, e.g. "cursor"
    pub target: &'static str,
    /// Logical name of the template being rendered
    pub name: &'a str,
    pub description: &'a str,
    pub claude_mode: &'a str,
    pub globs: &'a str,
    pub project_type: &'a str,
    pub language: &'a str,
    pub framework: &'a str,
    pub tags: &'a [String],
    pub always_apply: &'a str,
    pub documentation: &'a str,
    pub style_guide: &'a str,
    pub examples: &'a str,
    pub custom: &'a BTreeMap<String, Value>,
}

impl<'a> RenderContext<'a> {
    pub fn new(target: Target, name: &'a str, front_matter: &'a TemplateFrontMatter) -> Self {
        Self {
            target: target.name(),
            name,
            description: &front_matter.description,
            claude_mode: &front_matter.claude_mode,
            globs: &front_matter.globs,
            project_type: &front_matter.project_type,
            language: &front_matter.language,
            framework: &front_matter.framework,
            tags: &front_matter.tags,
            always_apply: &front_matter.always_apply,
            documentation: &front_matter.documentation,
            style_guide: &front_matter.style_guide,
            examples: &front_matter.examples,
            custom: &front_matter.custom,
        }
    }
}

/// Renders template bodies with a fixed set of partials
pub struct Renderer {
    /// Handlebars registry holding the partials
    hbs: Handlebars<'static>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// Create a renderer with no partials
    ///
    /// Output is not HTML-escaped; rule files are plain text.
    pub fn new() -> Self {
        let mut hbs = Handlebars::new();
        hbs.register_escape_fn(handlebars::no_escape);
        Self { hbs }
    }

    /// Create a renderer with every partial registered
    ///
    /// Partials whose front matter or body fail to parse are skipped and returned as failures;
    /// templates including them will then fail with an unresolved partial.
    pub fn with_partials<'p>(partials: impl IntoIterator<Item = &'p PartialSource>) -> (Self, Vec<PairFailure>) {
        let mut renderer = Self::new();
        let mut failures = Vec::new();
        for partial in partials {
            if let Err(e) = renderer.register_partial(partial) {
                warn!(name = %partial.name, error = %e, "Failed to register partial");
                failures.push(PairFailure::new(partial.name.clone(), None, e));
            }
        }
        (renderer, failures)
    }

    /// Make a partial includable as `{{> <name>}}`
    ///
    /// A partial's own front matter is dropped; only its body is included.
    pub fn register_partial(&mut self, partial: &PartialSource) -> Result<(), CompileError> {
        debug!(name = %partial.name, "Renderer::register_partial: called");
        let (_, body) = split_front_matter(&partial.content)?;
        self.hbs
            .register_partial(&partial.name, body)
            .map_err(|e| CompileError::Render(e.to_string()))
    }

    #[cfg(test)]
    fn has_partial(&self, name: &str) -> bool {
        self.hbs.has_template(name)
    }

    /// Render a template body for one target
    ///
    /// `body` is the template source with its front matter already stripped.
    pub fn render(
        &self,
        name: &str,
        body: &str,
        front_matter: &TemplateFrontMatter,
        target: Target,
    ) -> Result<String, CompileError> {
        debug!(%name, %target, "Renderer::render: called");
        let context = RenderContext::new(target, name, front_matter);
        self.hbs.render_template(body, &context).map_err(render_error)
    }
}

fn render_error(err: RenderError) -> CompileError {
    match err.reason() {
        RenderErrorReason::PartialNotFound(partial) => CompileError::UnresolvedPartial { name: partial.clone() },
        _ => CompileError::Render(err.to_string()),
    }
}
