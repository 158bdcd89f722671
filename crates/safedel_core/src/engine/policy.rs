//! Effective-policy resolution.

use crate::model::policy::DeletionPolicy;

/// A deletion policy after `HardDeleteNoCascade` has been settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedPolicy {
    NoDelete,
    SoftDelete,
    SoftDeleteCascade,
    HardDelete,
}

impl ResolvedPolicy {
    pub fn as_str(self) -> &'static str {
        self.policy().as_str()
    }

    pub fn policy(self) -> DeletionPolicy {
        match self {
            Self::NoDelete => DeletionPolicy::NoDelete,
            Self::SoftDelete => DeletionPolicy::SoftDelete,
            Self::SoftDeleteCascade => DeletionPolicy::SoftDeleteCascade,
            Self::HardDelete => DeletionPolicy::HardDelete,
        }
    }
}

/// Settles the policy one `delete` call runs with.
///
/// `HardDeleteNoCascade` becomes `HardDelete` for types without cascade
/// rules. With cascade rules it falls back once to the type's declared policy,
/// or to `SoftDelete` when that declared policy would hard-delete too.
pub fn resolve_delete_policy(
    requested: DeletionPolicy,
    declared: DeletionPolicy,
    has_cascade_rules: bool,
) -> ResolvedPolicy {
    match requested {
        DeletionPolicy::NoDelete => ResolvedPolicy::NoDelete,
        DeletionPolicy::SoftDelete => ResolvedPolicy::SoftDelete,
        DeletionPolicy::SoftDeleteCascade => ResolvedPolicy::SoftDeleteCascade,
        DeletionPolicy::HardDelete => ResolvedPolicy::HardDelete,
        DeletionPolicy::HardDeleteNoCascade if !has_cascade_rules => ResolvedPolicy::HardDelete,
        DeletionPolicy::HardDeleteNoCascade => match declared {
            DeletionPolicy::NoDelete => ResolvedPolicy::NoDelete,
            DeletionPolicy::SoftDeleteCascade => ResolvedPolicy::SoftDeleteCascade,
            DeletionPolicy::SoftDelete
            | DeletionPolicy::HardDelete
            | DeletionPolicy::HardDeleteNoCascade => ResolvedPolicy::SoftDelete,
        },
    }
}

/// Policy a cascade applies to a dependent whose type declares `declared`.
///
/// Dependents are always soft-deleted; only a `SoftDeleteCascade` dependent
/// carries the cascade one level further.
pub fn cascade_policy_for(declared: DeletionPolicy) -> DeletionPolicy {
    if declared == DeletionPolicy::SoftDeleteCascade {
        DeletionPolicy::SoftDeleteCascade
    } else {
        DeletionPolicy::SoftDelete
    }
}
