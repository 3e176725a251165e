//! Wildcard-import absorption.
//!
//! `include:jac foo;` (an import marked absorb) copies every entry of the
//! already-resolved module's root table into the importer's active scope,
//! under the same uniqueness rule as any other binding.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::base::FileId;

use super::build::ModuleScopes;
use super::symtab::{Occurrence, ScopeTable};

/// Modules whose symbol tables are already built, by file.
#[derive(Debug, Default)]
pub struct ResolvedModules {
    modules: FxHashMap<FileId, ModuleScopes>,
}

impl ResolvedModules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, scopes: ModuleScopes) {
        self.modules.insert(scopes.file, scopes);
    }

    pub fn get(&self, file: FileId) -> Option<&ModuleScopes> {
        self.modules.get(&file)
    }

    pub fn remove(&mut self, file: FileId) -> Option<ModuleScopes> {
        self.modules.remove(&file)
    }

    /// Root table of `file`, if it was resolved and had a module node.
    pub fn root_table(&self, file: FileId) -> Option<&ScopeTable> {
        self.get(file).and_then(ModuleScopes::root_table)
    }

    pub fn contains(&self, file: FileId) -> bool {
        self.modules.contains_key(&file)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FileId, &ModuleScopes)> {
        self.modules.iter().map(|(&file, scopes)| (file, scopes))
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// An absorbed name that was already bound in the importing scope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AbsorbCollision {
    pub name: SmolStr,
    /// What the importing scope already held.
    pub existing: Occurrence,
    /// The occurrence the sub-module contributed.
    pub absorbed: Occurrence,
}

/// Copy every entry of `source` into `target`.
///
/// Each record is re-inserted through its declaration if it has one, else
/// through its latest definition. Colliding names are left as they were in
/// `target` and returned, in `source` order.
pub fn absorb_into(target: &mut ScopeTable, source: &ScopeTable) -> Vec<AbsorbCollision> {
    let mut collisions = Vec::new();
    let mut absorbed = 0usize;

    for (name, record) in source.iter() {
        let Some((hit, occurrence)) = record.representative() else {
            continue;
        };
        match target.insert(name.clone(), hit, occurrence, true) {
            Some(existing) => collisions.push(AbsorbCollision {
                name: name.clone(),
                existing,
                absorbed: occurrence,
            }),
            None => absorbed += 1,
        }
    }

    tracing::debug!(absorbed, collisions = collisions.len(), "absorbed module scope");
    collisions
}
