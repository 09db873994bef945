use uuid::Uuid;

/// Source of high-entropy salts used to escape short code collisions.
pub trait SaltSource: Send + Sync + 'static {
    /// Returns a fresh salt. Consecutive calls must not repeat.
    fn salt(&self) -> String;
}

/// Salts drawn from random version-4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidSalt;

impl SaltSource for UuidSalt {
    fn salt(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}
