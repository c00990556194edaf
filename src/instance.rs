//! Process-lifetime instance identity.
//!
//! Chosen once at manager construction (a random 128-bit identifier
//! rendered as hex text, the same shape `pbs-datastore`'s index writers use
//! for archive UUIDs via `proxmox_uuid::Uuid::generate()`). The
//! instance-scoped staging directory is namespaced by this id so that two
//! live managers — including a crashed instance whose files linger — never
//! race on the same staging path.

use proxmox_uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceId(String);

impl InstanceId {
    /// Generates a fresh instance identity.
    pub fn generate() -> Self {
        Self(Uuid::generate().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
