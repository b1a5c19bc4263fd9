//! Working directory resolution for the Terraform Buildkite plugin.
//!
//! A [`WorkingSpec`](tbk_config::WorkingSpec) names either one directory or
//! a rule for discovering several. [`resolve`] turns it into the ordered
//! list of directories this job should process, applying the parallel job
//! shard assignment with [`partition`] when one is configured.
//!
//! Discovered directories are sorted by name. Parallel shards list the
//! parent directory independently, so they must agree on an order for the
//! shards to cover every directory exactly once.

mod error;
mod list;
mod partition;
mod resolve;

pub use error::WorkingDirError;
pub use list::list_dirs;
pub use partition::partition;
pub use resolve::resolve;

#[cfg(test)]
mod tests;
