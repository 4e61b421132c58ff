//! Request context supplied by the authentication layer
//!
//! The HTTP/auth layer resolves the session and hands the engine a snapshot
//! of who is asking. The engine never consults the store for identity.

/// Identity and tenancy of the principal behind a request
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user_id: i64,
    pub organization_id: Option<i64>,
    pub branch_id: Option<i64>,
    pub role_id: Option<i64>,
    privileged: bool,
}

impl RequestContext {
    /// Context for a regular organization member
    pub fn member(user_id: i64, organization_id: i64) -> Self {
        Self {
            user_id,
            organization_id: Some(organization_id),
            branch_id: None,
            role_id: None,
            privileged: false,
        }
    }

    /// Context for an organization admin or owner
    pub fn privileged(user_id: i64, organization_id: i64) -> Self {
        Self {
            privileged: true,
            ..Self::member(user_id, organization_id)
        }
    }

    /// Context for a standalone user without an organization
    pub fn standalone(user_id: i64) -> Self {
        Self {
            user_id,
            organization_id: None,
            branch_id: None,
            role_id: None,
            privileged: false,
        }
    }

    pub fn with_branch(mut self, branch_id: i64) -> Self {
        self.branch_id = Some(branch_id);
        self
    }

    pub fn with_role(mut self, role_id: i64) -> Self {
        self.role_id = Some(role_id);
        self
    }

    /// Whether the principal may see predicates that constrain on
    /// tenant or branch identity (admin/owner roles)
    pub fn is_privileged(&self) -> bool {
        self.privileged
    }
}
