//! Scoping diagnostics reported by the symbol-table build pass.
//!
//! Two classes exist. A duplicate binding is a user error: a name was
//! bound twice in one scope. An internal error means the tree handed to
//! the pass broke an assumption the pass relies on (missing module link,
//! unresolved wildcard import, malformed ability definition target).
//! Both are collected; neither stops the walk.

use std::fmt;
use std::sync::Arc;

use crate::base::{FileId, LineCol};

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Which class of problem a diagnostic reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    DuplicateBinding,
    Internal,
}

impl DiagnosticKind {
    pub fn code(self) -> &'static str {
        match self {
            DiagnosticKind::DuplicateBinding => codes::DUPLICATE_BINDING,
            DiagnosticKind::Internal => codes::INTERNAL_ERROR,
        }
    }

    /// Heading used when rendering.
    pub fn heading(self) -> &'static str {
        match self {
            DiagnosticKind::DuplicateBinding => "error",
            DiagnosticKind::Internal => "internal compiler error",
        }
    }
}

/// Standard diagnostic codes.
pub mod codes {
    /// A name bound twice in the same scope.
    pub const DUPLICATE_BINDING: &str = "E0004";
    /// The pass met a tree it cannot have been given by a healthy front end.
    pub const INTERNAL_ERROR: &str = "ICE0001";
}

/// A diagnostic message with location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// Module the offending node belongs to.
    pub file: FileId,
    pub pos: LineCol,
    pub kind: DiagnosticKind,
    pub code: &'static str,
    pub message: Arc<str>,
    /// Other sites the message refers to.
    pub related: Vec<RelatedInfo>,
}

/// Related information for a diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelatedInfo {
    /// `None` when the cited node had no module link.
    pub file: Option<FileId>,
    pub pos: LineCol,
    pub message: Arc<str>,
}

impl Diagnostic {
    pub fn duplicate_binding(file: FileId, pos: LineCol, message: impl Into<Arc<str>>) -> Self {
        Self::new(file, pos, DiagnosticKind::DuplicateBinding, message)
    }

    pub fn internal(file: FileId, pos: LineCol, message: impl Into<Arc<str>>) -> Self {
        Self::new(file, pos, DiagnosticKind::Internal, message)
    }

    fn new(file: FileId, pos: LineCol, kind: DiagnosticKind, message: impl Into<Arc<str>>) -> Self {
        Self {
            file,
            pos,
            kind,
            code: kind.code(),
            message: message.into(),
            related: Vec::new(),
        }
    }

    pub fn with_related(mut self, info: RelatedInfo) -> Self {
        self.related.push(info);
        self
    }

    pub fn is_internal(&self) -> bool {
        self.kind == DiagnosticKind::Internal
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}]: {} ({}:{})",
            self.kind.heading(),
            self.code,
            self.message,
            self.file,
            self.pos
        )
    }
}

// ============================================================================
// MESSAGE FORMATTING
// ============================================================================

/// Human label for the construct whose name collided.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstructLabel {
    GlobalVar,
    Test,
    ImportItem,
    IncludeItem,
    Architype,
    Ability,
    AbilityDef,
    Enum,
}

impl ConstructLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            ConstructLabel::GlobalVar => "global var",
            ConstructLabel::Test => "test",
            ConstructLabel::ImportItem => "import item",
            ConstructLabel::IncludeItem => "include item",
            ConstructLabel::Architype => "architype",
            ConstructLabel::Ability => "ability",
            ConstructLabel::AbilityDef => "ability def",
            ConstructLabel::Enum => "enum",
        }
    }
}

impl fmt::Display for ConstructLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A prior occurrence, ready to be cited.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CitedSite {
    pub file: Option<FileId>,
    /// Display path of the module.
    pub path: Arc<str>,
    pub pos: LineCol,
}

/// Message for a duplicate binding. The first site is the occupant the new
/// binding collided with; any further site is cited as "also declared at".
pub fn already_declared_message(name: &str, label: ConstructLabel, sites: &[CitedSite]) -> String {
    let mut message = format!("Name used for {label} '{name}' already declared");
    let mut sites = sites.iter();
    if let Some(first) = sites.next() {
        message.push_str(&format!(
            " at {}, line {}",
            first.path,
            first.pos.line_one_indexed()
        ));
    }
    for site in sites {
        message.push_str(&format!(
            ", also declared at {}, line {}",
            site.path,
            site.pos.line_one_indexed()
        ));
    }
    message
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// The diagnostics sink. A compilation has failed iff it is non-empty.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Add a duplicate-binding error at `pos`, citing every prior site.
    pub fn duplicate_binding(
        &mut self,
        file: FileId,
        pos: LineCol,
        name: &str,
        label: ConstructLabel,
        sites: &[CitedSite],
    ) {
        let mut diag = Diagnostic::duplicate_binding(
            file,
            pos,
            already_declared_message(name, label, sites),
        );
        for (i, site) in sites.iter().enumerate() {
            let message = if i == 0 {
                format!("'{name}' first declared here")
            } else {
                format!("'{name}' also declared here")
            };
            diag = diag.with_related(RelatedInfo {
                file: site.file,
                pos: site.pos,
                message: Arc::from(message),
            });
        }
        self.add(diag);
    }

    /// Add an internal compiler error.
    pub fn internal_error(&mut self, file: FileId, pos: LineCol, message: impl Into<Arc<str>>) {
        self.add(Diagnostic::internal(file, pos, message));
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn diagnostics_for_file(&self, file: FileId) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.file == file).collect()
    }

    pub fn duplicate_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::DuplicateBinding)
            .count()
    }

    pub fn internal_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_internal()).count()
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Take all diagnostics, leaving the collector empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }
}
