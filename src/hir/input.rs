//! Module display paths.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::base::FileId;

/// Paths of one module, as the front end resolved them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModulePaths {
    /// Absolute (or import-resolved) path of the module.
    pub mod_path: Arc<str>,
    /// Path relative to the compilation root; this is what diagnostics cite.
    pub rel_path: Arc<str>,
}

/// The set of modules taking part in a compilation.
///
/// Diagnostics only carry a [`FileId`]; this maps it back to something a
/// user recognises.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceRoot {
    modules: IndexMap<FileId, ModulePaths>,
}

impl SourceRoot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module. Re-registering a file replaces its paths.
    pub fn insert(&mut self, file: FileId, mod_path: impl Into<Arc<str>>, rel_path: impl Into<Arc<str>>) {
        self.modules.insert(
            file,
            ModulePaths {
                mod_path: mod_path.into(),
                rel_path: rel_path.into(),
            },
        );
    }

    pub fn remove(&mut self, file: FileId) -> Option<ModulePaths> {
        self.modules.shift_remove(&file)
    }

    pub fn paths(&self, file: FileId) -> Option<&ModulePaths> {
        self.modules.get(&file)
    }

    pub fn rel_path(&self, file: FileId) -> Option<&str> {
        self.paths(file).map(|p| p.rel_path.as_ref())
    }

    pub fn mod_path(&self, file: FileId) -> Option<&str> {
        self.paths(file).map(|p| p.mod_path.as_ref())
    }

    pub fn contains(&self, file: FileId) -> bool {
        self.modules.contains_key(&file)
    }

    /// Modules in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (FileId, &ModulePaths)> + '_ {
        self.modules.iter().map(|(&id, paths)| (id, paths))
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rel_and_mod_paths() {
        let mut root = SourceRoot::new();
        let main = FileId::new(0);
        root.insert(main, "/work/app/main.jac", "main.jac");

        assert_eq!(root.rel_path(main), Some("main.jac"));
        assert_eq!(root.mod_path(main), Some("/work/app/main.jac"));
        assert_eq!(root.rel_path(FileId::new(9)), None);
    }

    #[test]
    fn test_iteration_follows_registration_order() {
        let mut root = SourceRoot::new();
        root.insert(FileId::new(5), "/b.jac", "b.jac");
        root.insert(FileId::new(1), "/a.jac", "a.jac");
        root.remove(FileId::new(5));
        root.insert(FileId::new(5), "/b.jac", "b.jac");

        let order: Vec<_> = root.iter().map(|(id, _)| id).collect();
        assert_eq!(order, vec![FileId::new(1), FileId::new(5)]);
    }
}
