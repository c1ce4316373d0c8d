use crate::infra::error::AppError;

/// Durable per-installation client identifier, the terminal counterpart of a browser-scoped id.
pub trait IdentityStore {
    /// Returns the stored identifier, creating and persisting a fresh one when absent or invalid.
    fn load_or_create(&self) -> Result<String, AppError>;

    /// Forgets the identifier. Returns whether one existed.
    fn clear(&self) -> Result<bool, AppError>;
}
