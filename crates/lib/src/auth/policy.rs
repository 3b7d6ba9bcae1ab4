//! Role allow-lists per resource.
//!
//! The policy is a plain table: for every [`Resource`] a set of roles that
//! may edit it. Anything not on the list is denied, including resources the
//! table has no entry for.

use std::collections::{BTreeMap, BTreeSet};

use super::errors::AuthError;
use super::types::{Resource, Role};
use crate::content::PathBuf;

/// Top-level content key edited under [`Resource::JobListings`].
pub const JOB_LISTINGS_KEY: &str = "careers";

/// Which roles may edit which resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    rules: BTreeMap<Resource, BTreeSet<Role>>,
}

impl AccessPolicy {
    /// A policy that denies everything.
    pub fn new() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// Replaces the allow-list for `resource`.
    pub fn allow(mut self, resource: Resource, roles: impl IntoIterator<Item = Role>) -> Self {
        self.rules.insert(resource, roles.into_iter().collect());
        self
    }

    /// Whether `role` may edit `resource`.
    pub fn can_edit(&self, resource: Resource, role: Role) -> bool {
        self.rules
            .get(&resource)
            .is_some_and(|roles| roles.contains(&role))
    }

    /// Like [`can_edit`](Self::can_edit) but as a `Result`.
    pub fn require(&self, resource: Resource, role: Role) -> Result<(), AuthError> {
        if self.can_edit(resource, role) {
            Ok(())
        } else {
            Err(AuthError::PermissionDenied { role, resource })
        }
    }

    /// The roles allowed on `resource`, in privilege order.
    pub fn allowed_roles(&self, resource: Resource) -> Vec<Role> {
        self.rules
            .get(&resource)
            .map(|roles| roles.iter().copied().collect())
            .unwrap_or_default()
    }

    /// The resource a content path belongs to.
    ///
    /// Everything under `careers` is job listings; the rest is content.
    pub fn resource_for_path(path: &PathBuf) -> Resource {
        match path.top_level() {
            Some(top) if top == JOB_LISTINGS_KEY => Resource::JobListings,
            _ => Resource::Content,
        }
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        use Role::*;

        Self::new()
            .allow(Resource::Content, [Master, SuperAdmin, Admin])
            .allow(Resource::Credentials, [Master, SuperAdmin])
            .allow(Resource::JobListings, [Master, SuperAdmin, Admin, Hr])
            .allow(Resource::History, [Master, SuperAdmin])
    }
}
