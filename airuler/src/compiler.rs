//! Compilation orchestrator
//!
//! Loads every template and partial from the configured roots, renders each
//! template once per requested target and writes the result to
//! `<output-dir>/<target>/<name>.<ext>`.
//!
//! Failures are collected per (template, target) pair. A failing pair never
//! stops the others, so everything that compiles is written even when the
//! run as a whole fails.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{CompileError, PairFailure};
use crate::frontmatter::split_front_matter;
use crate::loader::{TemplateSet, TemplateSource, load_templates_from_dirs};
use crate::render::Renderer;
use crate::target::{Target, parse_targets};

/// A rendered template written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledOutput {
    pub template: String,
    pub target: Target,
    pub path: PathBuf,
    pub bytes: usize,
}

/// Everything a run produced, successes and failures alike
#[derive(Debug, Default)]
pub struct CompileReport {
    pub outputs: Vec<CompiledOutput>,
    pub failures: Vec<PairFailure>,
}

impl CompileReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Collapse into the written outputs, or the aggregate failure
    pub fn into_result(self) -> Result<Vec<CompiledOutput>, CompileError> {
        if self.failures.is_empty() {
            Ok(self.outputs)
        } else {
            Err(CompileError::Failed {
                failures: self.failures,
            })
        }
    }
}

/// Compiles template roots into per-target output files
#[derive(Debug, Clone)]
pub struct Compiler {
    /// Template roots, later roots override earlier ones
    source_dirs: Vec<PathBuf>,
    /// Root of the compiled tree
    output_dir: PathBuf,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl Compiler {
    pub fn new(source_dirs: Vec<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dirs,
            output_dir: output_dir.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.source_dirs(), config.output_dir.clone())
    }

    pub fn source_dirs(&self) -> &[PathBuf] {
        &self.source_dirs
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Load templates and partials from the configured roots
    pub fn load(&self) -> Result<TemplateSet, CompileError> {
        load_templates_from_dirs(&self.source_dirs)
    }

    /// Validate target names and compile for them
    ///
    /// An unknown name fails before anything is read or written. An empty
    /// list compiles for every target. Returns the written outputs, or
    /// `CompileError::Failed` listing every failing pair.
    pub fn compile_templates<S: AsRef<str>>(&self, targets: &[S]) -> Result<Vec<CompiledOutput>, CompileError> {
        let targets = parse_targets(targets)?;
        self.compile(&targets)?.into_result()
    }

    /// Compile every template for every given target
    ///
    /// Only a failure to load the sources is returned as `Err`; per-pair
    /// failures are collected in the report.
    pub fn compile(&self, targets: &[Target]) -> Result<CompileReport, CompileError> {
        let targets: &[Target] = if targets.is_empty() { &Target::ALL } else { targets };
        debug!(?targets, output_dir = ?self.output_dir, "Compiler::compile: called");

        let set = self.load()?;
        let (renderer, failures) = Renderer::with_partials(set.partials.values());
        let mut report = CompileReport {
            outputs: Vec::new(),
            failures,
        };

        for template in set.templates.values() {
            self.compile_template(&renderer, template, targets, &mut report);
        }

        info!(
            written = report.outputs.len(),
            failed = report.failures.len(),
            "Compilation finished"
        );
        Ok(report)
    }

    fn compile_template(
        &self,
        renderer: &Renderer,
        template: &TemplateSource,
        targets: &[Target],
        report: &mut CompileReport,
    ) {
        debug!(name = %template.name, "Compiler::compile_template: called");
        let (front_matter, body) = match split_front_matter(&template.content) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(name = %template.name, error = %e, "Invalid front matter");
                let reason = match e {
                    CompileError::MalformedFrontMatter { reason } => reason,
                    other => other.to_string(),
                };
                // No target can render without metadata; report each pair.
                for &target in targets {
                    let error = CompileError::malformed(reason.clone());
                    report.failures.push(PairFailure::new(&template.name, Some(target), error));
                }
                return;
            }
        };

        for &target in targets {
            let result = renderer
                .render(&template.name, body, &front_matter, target)
                .and_then(|rendered| self.write_output(&template.name, target, &rendered));
            match result {
                Ok(output) => report.outputs.push(output),
                Err(e) => {
                    warn!(name = %template.name, %target, error = %e, "Failed to compile template");
                    report.failures.push(PairFailure::new(&template.name, Some(target), e));
                }
            }
        }
    }

    fn write_output(&self, name: &str, target: Target, rendered: &str) -> Result<CompiledOutput, CompileError> {
        let path = target.output_path(&self.output_dir, name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| CompileError::io(parent, e))?;
        }
        fs::write(&path, rendered).map_err(|e| CompileError::io(&path, e))?;

        debug!(?path, bytes = rendered.len(), "Compiler::write_output: written");
        Ok(CompiledOutput {
            template: name.to_string(),
            target,
            path,
            bytes: rendered.len(),
        })
    }
}

/// Compile `./templates` into `./compiled` for the given targets
pub fn compile_templates<S: AsRef<str>>(targets: &[S]) -> Result<Vec<CompiledOutput>, CompileError> {
    Compiler::default().compile_templates(targets)
}
