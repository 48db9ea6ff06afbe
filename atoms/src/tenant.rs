use thiserror::Error;

/// Acting tenant does not own the resource.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("invalid tenant code")]
pub struct TenantMismatch;

/// Guard for every mutation path: the acting tenant must match the tenant
/// embedded in the resource key. Reads by key skip this check.
pub fn ensure_tenant(acting: &str, resource: &str) -> Result<(), TenantMismatch> {
    if acting != resource {
        return Err(TenantMismatch);
    }
    Ok(())
}
