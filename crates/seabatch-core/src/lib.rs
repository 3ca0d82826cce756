//! Run descriptions, cluster profiles, and resource layouts for seabatch.
//!
//! Everything here is pure data and arithmetic; rendering and
//! submission live in the scheduler-specific crates.

pub mod cluster;
pub mod layout;
pub mod result_type;
pub mod run_desc;
pub mod scheduler;

pub use cluster::{ClusterId, ClusterProfile, Dialect, Partition};
pub use layout::{NodeMemory, ResourceLayout, compute_layout, deflate_layout};
pub use result_type::ResultType;
pub use run_desc::{RunDescError, RunDescription};
pub use scheduler::{Account, DirectiveRequest, Scheduler};
pub use seabatch_parsers::WallTime;
