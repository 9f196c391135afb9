//! Template source loading
//!
//! Walks one or more root directories for `*.tmpl` files. A file below a
//! directory named `partials` is a partial; everything else is a main
//! template. Both are keyed by their logical name: the path relative to the
//! root, slash-separated, without the `.tmpl` suffix.
//!
//! Roots are processed in order and later roots override earlier ones with
//! the same logical name, so a project's `templates/` can replace a vendor
//! template simply by defining a file at the same relative path.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::CompileError;

/// Suffix of template files; all other files are ignored
pub const TEMPLATE_SUFFIX: &str = ".tmpl";

/// Directory name marking its contents as partials
pub const PARTIALS_SEGMENT: &str = "partials";

/// One loaded template file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSource {
    /// Logical name, e.g. `subdir/nested` or `partials/header`
    pub name: String,
    /// Raw file content, front matter included
    pub content: String,
    /// File the content was read from
    pub path: PathBuf,
}

/// Partials share the template representation; only their map differs
pub type PartialSource = TemplateSource;

/// Result of loading a set of roots
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    pub templates: BTreeMap<String, TemplateSource>,
    pub partials: BTreeMap<String, PartialSource>,
}

impl TemplateSet {
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty() && self.partials.is_empty()
    }

    /// Look up a name in templates first, then partials
    pub fn get(&self, name: &str) -> Option<&TemplateSource> {
        self.templates.get(name).or_else(|| self.partials.get(name))
    }

    fn insert(&mut self, source: TemplateSource, is_partial: bool) {
        let map = if is_partial {
            &mut self.partials
        } else {
            &mut self.templates
        };
        if let Some(previous) = map.insert(source.name.clone(), source) {
            debug!(name = %previous.name, overridden = ?previous.path, "TemplateSet::insert: overridden");
        }
    }
}

/// Load templates and partials from the given roots
///
/// A root that does not exist contributes nothing. Invalid UTF-8 in a file
/// is replaced rather than rejected. Any other I/O failure aborts the load
/// with the offending path.
pub fn load_templates_from_dirs<P: AsRef<Path>>(roots: &[P]) -> Result<TemplateSet, CompileError> {
    debug!(root_count = roots.len(), "load_templates_from_dirs: called");
    let mut set = TemplateSet::default();

    for root in roots {
        load_root(root.as_ref(), &mut set)?;
    }

    info!(
        templates = set.templates.len(),
        partials = set.partials.len(),
        "Loaded template sources"
    );
    Ok(set)
}

fn load_root(root: &Path, set: &mut TemplateSet) -> Result<(), CompileError> {
    debug!(?root, "load_root: called");
    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            warn!(?root, "Template root is not a directory, skipping");
            return Ok(());
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(?root, "load_root: root does not exist, skipping");
            return Ok(());
        }
        Err(e) => return Err(CompileError::io(root, e)),
    }

    // Sorted walk keeps override order within a root deterministic.
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.io_error().map(|io| io.kind()) == Some(ErrorKind::NotFound) => {
                debug!(path = ?e.path(), "load_root: entry vanished during walk");
                continue;
            }
            Err(e) => {
                let path = e.path().unwrap_or(root).to_path_buf();
                let source = e.into_io_error().unwrap_or_else(|| std::io::Error::other("filesystem loop"));
                return Err(CompileError::io(path, source));
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let Some((name, is_partial)) = classify(relative) else {
            debug!(?path, "load_root: skipping non-template file");
            continue;
        };

        // Follows symlinks; a link to a directory is not a template.
        if !path.is_file() {
            warn!(?path, "Template path is not a regular file, skipping");
            continue;
        }

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(?path, "Template file disappeared, skipping");
                continue;
            }
            Err(e) => return Err(CompileError::io(path, e)),
        };
        let content = match String::from_utf8(bytes) {
            Ok(content) => content,
            Err(e) => {
                warn!(?path, "Template is not valid UTF-8, replacing invalid bytes");
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };

        debug!(%name, is_partial, ?path, "load_root: loaded");
        set.insert(
            TemplateSource {
                name,
                content,
                path: path.to_path_buf(),
            },
            is_partial,
        );
    }

    Ok(())
}

/// Derive the logical name of a root-relative path and whether it is a partial
///
/// Returns `None` for files without the template suffix.
fn classify(relative: &Path) -> Option<(String, bool)> {
    let segments: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    let (file_name, dirs) = segments.split_last()?;
    let stem = file_name.strip_suffix(TEMPLATE_SUFFIX)?;
    if stem.is_empty() {
        return None;
    }

    let is_partial = dirs.iter().any(|dir| dir == PARTIALS_SEGMENT);
    let mut name = dirs.join("/");
    if !name.is_empty() {
        name.push('/');
    }
    name.push_str(stem);
    Some((name, is_partial))
}
