//! Multi-module resolution.
//!
//! A wildcard import reads the absorbed module's finished root table, so
//! modules are resolved in layers: a module runs only after every module it
//! absorbs. Modules within one layer are independent and may run in
//! parallel.

use std::sync::Arc;

use indexmap::IndexMap;
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::base::FileId;
use crate::syntax::{Ast, NodeKind};

use super::absorb::ResolvedModules;
use super::build::build_module_scopes;
use super::diagnostics::{Diagnostic, DiagnosticCollector};
use super::error::ScopeError;
use super::input::SourceRoot;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkspaceConfig {
    /// Resolve the modules of a layer on the rayon pool.
    pub parallel: bool,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl WorkspaceConfig {
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// The modules of one compilation and their display paths.
#[derive(Debug, Default)]
pub struct Workspace {
    config: WorkspaceConfig,
    modules: IndexMap<FileId, Ast>,
    source_root: SourceRoot,
}

/// Outcome of [`Workspace::resolve_all`].
#[derive(Debug, Default)]
pub struct WorkspaceReport {
    pub resolved: ResolvedModules,
    /// Diagnostics per module, in registration order. Every module has an
    /// entry, possibly empty.
    pub diagnostics: IndexMap<FileId, Vec<Diagnostic>>,
    /// Modules whose walk was aborted.
    pub failures: Vec<(FileId, ScopeError)>,
    /// The resolution order that was used.
    pub layers: Vec<Vec<FileId>>,
}

impl WorkspaceReport {
    pub fn has_errors(&self) -> bool {
        !self.failures.is_empty() || self.diagnostics.values().any(|d| !d.is_empty())
    }

    pub fn diagnostics_for(&self, file: FileId) -> &[Diagnostic] {
        self.diagnostics.get(&file).map_or(&[], Vec::as_slice)
    }

    pub fn diagnostic_count(&self) -> usize {
        self.diagnostics.values().map(Vec::len).sum()
    }
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: WorkspaceConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    /// Add a module. A module already registered under the same file is
    /// replaced.
    pub fn add_module(
        &mut self,
        ast: Ast,
        mod_path: impl Into<Arc<str>>,
        rel_path: impl Into<Arc<str>>,
    ) -> FileId {
        let file = ast.file();
        self.source_root.insert(file, mod_path, rel_path);
        self.modules.insert(file, ast);
        file
    }

    pub fn ast(&self, file: FileId) -> Option<&Ast> {
        self.modules.get(&file)
    }

    pub fn source_root(&self) -> &SourceRoot {
        &self.source_root
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Build the symbol tables of every module, absorbed modules first.
    #[tracing::instrument(skip_all, fields(modules = self.modules.len(), parallel = self.config.parallel))]
    pub fn resolve_all(&mut self) -> WorkspaceReport {
        let layers = plan_layers(&self.absorb_dependencies());
        let Self {
            config,
            modules,
            source_root,
        } = self;
        let source_root: &SourceRoot = source_root;

        let mut resolved = ResolvedModules::new();
        let mut diagnostics: FxHashMap<FileId, Vec<Diagnostic>> = FxHashMap::default();
        let mut failures = Vec::new();

        for (depth, layer) in layers.iter().enumerate() {
            tracing::debug!(depth, modules = layer.len(), "resolving layer");
            let batch: Vec<&mut Ast> = modules
                .iter_mut()
                .filter(|(file, _)| layer.contains(*file))
                .map(|(_, ast)| ast)
                .collect();

            let resolve = |ast: &mut Ast| {
                let mut collector = DiagnosticCollector::new();
                let outcome = build_module_scopes(ast, source_root, &resolved, &mut collector);
                (ast.file(), outcome, collector.take())
            };
            let outcomes: Vec<_> = if config.parallel {
                batch.into_par_iter().map(resolve).collect()
            } else {
                batch.into_iter().map(resolve).collect()
            };

            for (file, outcome, found) in outcomes {
                match outcome {
                    Ok(scopes) => resolved.insert(scopes),
                    Err(err) => {
                        tracing::warn!(%file, error = %err, "module resolution aborted");
                        failures.push((file, err));
                    }
                }
                diagnostics.insert(file, found);
            }
        }

        let diagnostics = modules
            .keys()
            .map(|file| (*file, diagnostics.remove(file).unwrap_or_default()))
            .collect();

        WorkspaceReport {
            resolved,
            diagnostics,
            failures,
            layers,
        }
    }

    /// For each module, the workspace modules it absorbs.
    fn absorb_dependencies(&self) -> IndexMap<FileId, FxHashSet<FileId>> {
        self.modules
            .iter()
            .map(|(&file, ast)| {
                let deps = ast
                    .iter()
                    .filter_map(|(_, node)| match &node.kind {
                        NodeKind::Import {
                            is_absorb: true,
                            sub_module: Some(target),
                            ..
                        } => Some(*target),
                        _ => None,
                    })
                    .filter(|target| *target != file && self.modules.contains_key(target))
                    .collect();
                (file, deps)
            })
            .collect()
    }
}

/// Kahn layering.
///
/// When every pending module waits on another, the earliest registered
/// module whose pending dependencies all lead back to it is forced through
/// alone. Such a module always exists and always lies on an absorb cycle;
/// its absorbs of the rest of the cycle then report as unresolved. Modules
/// that merely depend on a cycle wait for it as usual.
fn plan_layers(deps: &IndexMap<FileId, FxHashSet<FileId>>) -> Vec<Vec<FileId>> {
    let mut done = FxHashSet::default();
    let mut pending: Vec<FileId> = deps.keys().copied().collect();
    let mut layers = Vec::new();

    while !pending.is_empty() {
        let mut ready: Vec<FileId> = pending
            .iter()
            .copied()
            .filter(|file| deps[file].iter().all(|dep| done.contains(dep)))
            .collect();
        if ready.is_empty() {
            let stuck = cycle_entry(deps, &pending).unwrap_or(pending[0]);
            tracing::warn!(file = %stuck, "absorb cycle, resolving module before its dependencies");
            ready.push(stuck);
        }
        pending.retain(|file| !ready.contains(file));
        done.extend(ready.iter().copied());
        layers.push(ready);
    }
    layers
}

/// Earliest pending module every pending dependency of which can reach it
/// back through pending modules.
fn cycle_entry(deps: &IndexMap<FileId, FxHashSet<FileId>>, pending: &[FileId]) -> Option<FileId> {
    let waiting: FxHashSet<FileId> = pending.iter().copied().collect();
    pending.iter().copied().find(|&file| {
        let mut waits_on = deps[&file].iter().copied().filter(|dep| waiting.contains(dep)).peekable();
        waits_on.peek().is_some() && waits_on.all(|dep| reaches(deps, &waiting, dep, file))
    })
}

fn reaches(
    deps: &IndexMap<FileId, FxHashSet<FileId>>,
    waiting: &FxHashSet<FileId>,
    from: FileId,
    target: FileId,
) -> bool {
    let mut seen = FxHashSet::default();
    let mut stack = vec![from];
    while let Some(file) = stack.pop() {
        if file == target {
            return true;
        }
        if seen.insert(file) {
            stack.extend(deps[&file].iter().copied().filter(|dep| waiting.contains(dep)));
        }
    }
    false
}
