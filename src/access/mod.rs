//! Access resolution for animal-scoped resources.
//!
//! Every authorization decision funnels through two pieces:
//! - [`resolve_level`] turns (owner, caller, collaboration) into a
//!   [`PermissionLevel`],
//! - [`AccessPolicy::allows`] turns a level plus an [`Operation`] into an
//!   allow/deny decision.
//!
//! Both are pure; the database-facing half lives in [`repo`].

pub mod filter;
pub mod repo;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a user may do with an animal and its child resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionLevel {
    Owner,
    Edit,
    ReadOnly,
}

impl PermissionLevel {
    /// Parses the value stored in `collaborations.permission`.
    /// `OWNER` is never persisted; it is derived from `animals.owner_id`.
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "EDIT" => Some(Self::Edit),
            "READ_ONLY" => Some(Self::ReadOnly),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Owner => "OWNER",
            Self::Edit => "EDIT",
            Self::ReadOnly => "READ_ONLY",
        }
    }
}

/// The intent of a request, independent of HTTP verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
    Create,
    Delete,
}

/// Per-resource policy knobs.
///
/// `owner_only` gates destructive operations and collaboration management
/// behind ownership. `allow_create_on_edit` lets EDIT-level collaborators
/// create child resources (diets under an animal, ingredients under a diet).
#[derive(Debug, Clone, Copy)]
pub struct AccessPolicy {
    pub owner_only: bool,
    pub allow_create_on_edit: bool,
}

impl AccessPolicy {
    /// Owner full access, EDIT may read/write, READ_ONLY may read.
    pub const SHARED: Self = Self {
        owner_only: false,
        allow_create_on_edit: false,
    };

    /// Like [`Self::SHARED`], but EDIT collaborators may also create
    /// child resources under the animal.
    pub const SHARED_WITH_CREATE: Self = Self {
        owner_only: false,
        allow_create_on_edit: true,
    };

    /// Only the owner passes, regardless of collaboration level.
    pub const OWNER_ONLY: Self = Self {
        owner_only: true,
        allow_create_on_edit: false,
    };

    pub fn allows(&self, level: Option<PermissionLevel>, op: Operation) -> bool {
        let Some(level) = level else {
            return false;
        };

        if self.owner_only {
            return level == PermissionLevel::Owner;
        }

        match level {
            PermissionLevel::Owner => true,
            PermissionLevel::Edit => match op {
                Operation::Read | Operation::Write => true,
                Operation::Create => self.allow_create_on_edit,
                Operation::Delete => false,
            },
            PermissionLevel::ReadOnly => op == Operation::Read,
        }
    }
}

/// Resolves the caller's permission level for an animal.
///
/// Ownership wins; otherwise the active collaboration level applies. The
/// animal's own `is_active` flag is deliberately not consulted: a soft-deleted
/// animal stays visible to whoever could see it, so it can be restored.
pub fn resolve_level(
    owner_id: Uuid,
    user_id: Uuid,
    collaboration: Option<PermissionLevel>,
) -> Option<PermissionLevel> {
    if owner_id == user_id {
        return Some(PermissionLevel::Owner);
    }
    collaboration
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_resolves_before_collaboration() {
        let user = Uuid::new_v4();
        // even a READ_ONLY collaboration row cannot demote the owner
        assert_eq!(
            resolve_level(user, user, Some(PermissionLevel::ReadOnly)),
            Some(PermissionLevel::Owner)
        );
    }

    #[test]
    fn collaborator_resolves_to_collaboration_level() {
        let owner = Uuid::new_v4();
        let user = Uuid::new_v4();
        assert_eq!(
            resolve_level(owner, user, Some(PermissionLevel::Edit)),
            Some(PermissionLevel::Edit)
        );
        assert_eq!(
            resolve_level(owner, user, Some(PermissionLevel::ReadOnly)),
            Some(PermissionLevel::ReadOnly)
        );
    }

    #[test]
    fn stranger_resolves_to_none() {
        assert_eq!(resolve_level(Uuid::new_v4(), Uuid::new_v4(), None), None);
    }

    #[test]
    fn permission_matrix() {
        use Operation::*;
        use PermissionLevel::*;

        let cases: &[(Option<PermissionLevel>, Operation, bool)] = &[
            (Some(Owner), Read, true),
            (Some(Owner), Write, true),
            (Some(Owner), Delete, true),
            (Some(Edit), Read, true),
            (Some(Edit), Write, true),
            (Some(Edit), Delete, false),
            (Some(ReadOnly), Read, true),
            (Some(ReadOnly), Write, false),
            (Some(ReadOnly), Delete, false),
            (None, Read, false),
            (None, Write, false),
            (None, Delete, false),
        ];

        for &(level, op, expected) in cases {
            assert_eq!(
                AccessPolicy::SHARED.allows(level, op),
                expected,
                "level {level:?}, op {op:?}"
            );
        }
    }

    #[test]
    fn owner_only_rejects_collaborators() {
        for level in [PermissionLevel::Edit, PermissionLevel::ReadOnly] {
            assert!(!AccessPolicy::OWNER_ONLY.allows(Some(level), Operation::Read));
            assert!(!AccessPolicy::OWNER_ONLY.allows(Some(level), Operation::Delete));
        }
        assert!(AccessPolicy::OWNER_ONLY.allows(Some(PermissionLevel::Owner), Operation::Delete));
    }

    #[test]
    fn create_requires_edit_and_flag() {
        let edit = Some(PermissionLevel::Edit);
        let read_only = Some(PermissionLevel::ReadOnly);

        assert!(AccessPolicy::SHARED_WITH_CREATE.allows(edit, Operation::Create));
        assert!(!AccessPolicy::SHARED_WITH_CREATE.allows(read_only, Operation::Create));
        assert!(!AccessPolicy::SHARED.allows(edit, Operation::Create));
        assert!(AccessPolicy::SHARED.allows(Some(PermissionLevel::Owner), Operation::Create));
    }

    #[test]
    fn db_round_trip_for_collaboration_levels() {
        assert_eq!(PermissionLevel::from_db("EDIT"), Some(PermissionLevel::Edit));
        assert_eq!(
            PermissionLevel::from_db("READ_ONLY"),
            Some(PermissionLevel::ReadOnly)
        );
        assert_eq!(PermissionLevel::from_db("ADMIN"), None);
    }
}
