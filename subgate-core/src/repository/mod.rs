pub mod flags;
pub mod membership;
pub mod settings;
pub mod storage;

pub use flags::{FlagStore, StoredFlags, DEFAULT_FLAG_FETCH_CONCURRENCY};
pub use membership::{MembershipResolver, PgMembershipResolver};
pub use settings::{PgSettingsSource, SettingsSource};
pub use storage::{KeyValueStore, PgPluginStorage};

#[cfg(test)]
pub use membership::MockMembershipResolver;
