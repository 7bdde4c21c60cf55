//! Explicit process-group handle
//!
//! Rank and world size are established once by the caller before any
//! trainer is built and torn down with [`ProcessGroup::shutdown`]. Nothing
//! in this crate joins a group as a side effect. Trainers and evaluators
//! borrow the handle at construction and keep only its [`Membership`].

use tracing::debug;

use crate::error::{Error, Result};

/// Rank and world size of this process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Membership {
    rank: usize,
    world_size: usize,
}

impl Membership {
    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn world_size(&self) -> usize {
        self.world_size
    }

    /// Rank 0 owns logging, telemetry and sample output
    pub fn is_primary(&self) -> bool {
        self.rank == 0
    }
}

/// Membership of this process in a data-parallel group
///
/// One handle per process; it is consumed by [`ProcessGroup::shutdown`].
#[derive(Debug)]
pub struct ProcessGroup {
    membership: Membership,
}

impl ProcessGroup {
    /// Join a group of `world_size` processes as `rank`
    pub fn init(rank: usize, world_size: usize) -> Result<Self> {
        if world_size == 0 || rank >= world_size {
            return Err(Error::InvalidProcessGroup { rank, world_size });
        }
        debug!(rank, world_size, "process group initialised");
        Ok(Self { membership: Membership { rank, world_size } })
    }

    /// Group containing only this process
    pub fn single() -> Self {
        Self { membership: Membership { rank: 0, world_size: 1 } }
    }

    pub fn membership(&self) -> Membership {
        self.membership
    }

    pub fn rank(&self) -> usize {
        self.membership.rank
    }

    pub fn world_size(&self) -> usize {
        self.membership.world_size
    }

    pub fn is_primary(&self) -> bool {
        self.membership.is_primary()
    }

    pub fn shutdown(self) {
        debug!(rank = self.rank(), world_size = self.world_size(), "process group shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_is_primary() {
        let group = ProcessGroup::single();
        assert!(group.is_primary());
        assert_eq!(group.world_size(), 1);
    }

    #[test]
    fn test_init_rejects_out_of_range_rank() {
        assert!(matches!(
            ProcessGroup::init(4, 4),
            Err(Error::InvalidProcessGroup { rank: 4, world_size: 4 })
        ));
        assert!(ProcessGroup::init(0, 0).is_err());
    }

    #[test]
    fn test_secondary_rank() {
        let group = ProcessGroup::init(2, 4).unwrap();
        assert!(!group.is_primary());
        assert_eq!(group.rank(), 2);
        group.shutdown();
    }

    #[test]
    fn test_membership_outlives_shutdown() {
        let group = ProcessGroup::init(1, 3).unwrap();
        let membership = group.membership();
        group.shutdown();

        assert_eq!(membership.rank(), 1);
        assert_eq!(membership.world_size(), 3);
        assert!(!membership.is_primary());
    }
}
