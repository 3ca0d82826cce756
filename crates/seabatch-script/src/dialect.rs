//! Dialect dispatch.

use seabatch_core::{Dialect, Scheduler};
use seabatch_slurm::Slurm;
use seabatch_torque::Torque;

/// The scheduler implementation for a dialect.
pub fn scheduler_for(dialect: Dialect) -> &'static dyn Scheduler {
    match dialect {
        Dialect::Slurm => &Slurm,
        Dialect::Torque => &Torque,
    }
}
