//! Node and task layout for a requested processor count.

use std::fmt;

use crate::cluster::ClusterProfile;
use crate::result_type::ResultType;

/// Memory requested per node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeMemory {
    /// All of the node's memory; rendered as the scheduler's `0` sentinel
    WholeNode,
    /// A fixed amount such as `125G`
    Amount(&'static str),
}

impl fmt::Display for NodeMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeMemory::WholeNode => f.write_str("0"),
            NodeMemory::Amount(amount) => f.write_str(amount),
        }
    }
}

/// Resources a job asks the scheduler for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLayout {
    pub constraint: Option<&'static str>,
    pub processors_per_node: u32,
    pub node_count: u32,
    pub memory_per_node: NodeMemory,
    pub total_processors: u32,
}

/// Compute the layout for `total_processors` on a cluster.
///
/// Clusters without a partition table get everything on one node.
pub fn compute_layout(
    total_processors: u32,
    cluster: &ClusterProfile,
    use_alt_partition: bool,
) -> ResourceLayout {
    match cluster.select_partition(use_alt_partition) {
        Some(partition) => ResourceLayout {
            constraint: Some(partition.constraint),
            processors_per_node: partition.processors_per_node,
            node_count: total_processors
                .div_ceil(partition.processors_per_node)
                .max(1),
            memory_per_node: partition.memory,
            total_processors,
        },
        None => ResourceLayout {
            constraint: None,
            processors_per_node: total_processors.max(1),
            node_count: 1,
            memory_per_node: NodeMemory::WholeNode,
            total_processors,
        },
    }
}

/// Single-processor layout for a dependent deflate job.
pub fn deflate_layout(
    result_type: ResultType,
    cluster: &ClusterProfile,
    use_alt_partition: bool,
) -> ResourceLayout {
    ResourceLayout {
        memory_per_node: NodeMemory::Amount(result_type.slurm_memory()),
        ..compute_layout(1, cluster, use_alt_partition)
    }
}
