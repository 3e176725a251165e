//! Symbol-table keys for abilities.
//!
//! An ability written inside an architype body is keyed `Type.name`, so
//! methods of different types never collide. An out-of-body ability
//! definition names its owner explicitly through a dotted target path and
//! lands on the same key, which is how a declaration and its definition
//! meet in one record.

use smol_str::{SmolStr, format_smolstr};
use thiserror::Error;

use crate::syntax::{Ast, NodeId, NodeKind};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QualifyError {
    #[error("Expected reference to Architype! ability def target ends in a {found}")]
    OwnerNotArchitype { found: &'static str },
    #[error("ability def has no ability reference")]
    MissingAbilityRef,
}

/// Key of an ability definition, plus a problem found with its target.
///
/// When the target does not end in an arch reference the key falls back to
/// the unqualified name and `owner_error` says why.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefinitionKey {
    pub key: SmolStr,
    pub owner_error: Option<QualifyError>,
}

/// Key for an in-body ability declaration. `None` if `ability` is not an
/// ability node.
pub fn ability_key(ast: &Ast, ability: NodeId) -> Option<SmolStr> {
    let NodeKind::Ability { name } = ast.kind(ability) else {
        return None;
    };
    let simple = name.resolve();
    Some(match owning_architype(ast, ability) {
        Some(owner) => format_smolstr!("{owner}.{simple}"),
        None => simple,
    })
}

/// Name of the architype whose body directly holds `ability`.
fn owning_architype(ast: &Ast, ability: NodeId) -> Option<&SmolStr> {
    let block = ast.parent(ability)?;
    if !matches!(ast.kind(block), NodeKind::ArchBlock) {
        return None;
    }
    match ast.kind(ast.parent(block)?) {
        NodeKind::Architype { name, .. } => Some(name),
        _ => None,
    }
}

/// Key for an out-of-body ability definition.
///
/// The ability reference is the definition's first `ArchRef` child; the
/// optional target is its first `DottedNameList` child.
pub fn ability_def_key(ast: &Ast, def: NodeId) -> Result<DefinitionKey, QualifyError> {
    let ability = ast
        .child_where(def, |k| matches!(k, NodeKind::ArchRef { .. }))
        .ok_or(QualifyError::MissingAbilityRef)?;
    let NodeKind::ArchRef { name, .. } = ast.kind(ability) else {
        return Err(QualifyError::MissingAbilityRef);
    };
    let simple = name.resolve();

    let Some(target) = ast.child_where(def, |k| matches!(k, NodeKind::DottedNameList)) else {
        return Ok(DefinitionKey {
            key: simple,
            owner_error: None,
        });
    };

    let owner = ast.children(target).last().map(|&last| ast.kind(last));
    Ok(match owner {
        Some(NodeKind::ArchRef { name: owner, .. }) => DefinitionKey {
            key: format_smolstr!("{}.{simple}", owner.resolve()),
            owner_error: None,
        },
        other => DefinitionKey {
            key: simple,
            owner_error: Some(QualifyError::OwnerNotArchitype {
                found: other.map_or("empty path", NodeKind::label),
            }),
        },
    })
}
