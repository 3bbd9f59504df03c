//! Process-local backend with the same uniqueness rules as the Mongo stores.
//! Used by tests and local runs without a database.

mod awards;
mod badges;
mod points;

pub use awards::MemoryAwards;
pub use badges::MemoryBadges;
pub use points::MemoryPoints;
