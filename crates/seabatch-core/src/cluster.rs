//! Cluster identity and the per-cluster lookup table.
//!
//! Every cluster-specific constant lives in [`CLUSTERS`]; adding a
//! cluster means adding one entry. Unknown clusters resolve to
//! [`GENERIC`], which assumes a single TORQUE node with no modules.

use std::fmt;
use tracing::debug;

use crate::layout::NodeMemory;

/// Batch scheduler directive dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Node-oriented `#SBATCH` directives, submitted with `sbatch`.
    Slurm,
    /// Core-count-oriented `#PBS` directives, submitted with `qsub`.
    Torque,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Slurm => write!(f, "slurm"),
            Dialect::Torque => write!(f, "torque"),
        }
    }
}

/// A homogeneous set of nodes on a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    /// Hardware constraint name (e.g. `skylake`)
    pub constraint: &'static str,
    pub processors_per_node: u32,
    pub memory: NodeMemory,
}

/// Everything seabatch needs to know about one cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterProfile {
    pub name: &'static str,
    pub dialect: Dialect,
    /// Default partition, or None for single-node layouts
    pub partition: Option<Partition>,
    /// Partition selected by the alternate-partition flag
    pub alt_partition: Option<Partition>,
    /// Whether to emit a hardware constraint directive
    pub constraint_directive: bool,
    /// Shell variable holding the user's home directory in a job
    pub home_var: &'static str,
    /// MPI launcher
    pub mpirun: &'static str,
    /// Environment modules loaded before the run
    pub modules: &'static [&'static str],
    /// Extra module needed before deflating results
    pub deflate_module: Option<&'static str>,
    /// Account assumed when the run description has none
    pub default_account: Option<&'static str>,
    /// Directives appended after the main directive block
    pub extra_directives: &'static [&'static str],
}

const COMPUTE_CANADA_MODULES: &[&str] = &["netcdf-fortran-mpi/4.4.4"];

pub static CLUSTERS: &[ClusterProfile] = &[
    ClusterProfile {
        name: "cedar",
        dialect: Dialect::Slurm,
        partition: Some(Partition {
            constraint: "skylake",
            processors_per_node: 48,
            memory: NodeMemory::WholeNode,
        }),
        alt_partition: Some(Partition {
            constraint: "broadwell",
            processors_per_node: 32,
            memory: NodeMemory::Amount("125G"),
        }),
        constraint_directive: true,
        home_var: "${HOME}",
        mpirun: "mpirun",
        modules: COMPUTE_CANADA_MODULES,
        deflate_module: Some("nco/4.6.6"),
        default_account: Some("rrg-allen"),
        extra_directives: &[],
    },
    ClusterProfile {
        name: "graham",
        dialect: Dialect::Slurm,
        partition: Some(Partition {
            constraint: "broadwell",
            processors_per_node: 32,
            memory: NodeMemory::Amount("125G"),
        }),
        alt_partition: None,
        constraint_directive: false,
        home_var: "${HOME}",
        mpirun: "mpirun",
        modules: COMPUTE_CANADA_MODULES,
        deflate_module: Some("nco/4.6.6"),
        default_account: Some("def-allen"),
        extra_directives: &[],
    },
    ClusterProfile {
        name: "orcinus",
        dialect: Dialect::Torque,
        partition: None,
        alt_partition: None,
        constraint_directive: false,
        home_var: "${PBS_O_HOME}",
        mpirun: "mpirun",
        modules: &[
            "intel",
            "intel/14.0/netcdf-4.3.3.1_mpi",
            "intel/14.0/netcdf-fortran-4.4.0_mpi",
            "intel/14.0/hdf5-1.8.15p1_mpi",
            "intel/14.0/nco-4.5.2",
            "python",
        ],
        deflate_module: None,
        default_account: None,
        extra_directives: &["#PBS -l partition=QDR"],
    },
    ClusterProfile {
        name: "salish",
        dialect: Dialect::Torque,
        partition: None,
        alt_partition: None,
        constraint_directive: false,
        home_var: "${HOME}",
        mpirun: "/usr/bin/mpirun",
        modules: &[],
        deflate_module: None,
        default_account: None,
        extra_directives: &[],
    },
];

pub static GENERIC: ClusterProfile = ClusterProfile {
    name: "generic",
    dialect: Dialect::Torque,
    partition: None,
    alt_partition: None,
    constraint_directive: false,
    home_var: "${HOME}",
    mpirun: "mpirun",
    modules: &[],
    deflate_module: None,
    default_account: None,
    extra_directives: &[],
};

impl ClusterProfile {
    /// Profile for a cluster name, falling back to [`GENERIC`].
    pub fn lookup(name: &str) -> &'static ClusterProfile {
        CLUSTERS.iter().find(|c| c.name == name).unwrap_or(&GENERIC)
    }

    pub fn is_generic(&self) -> bool {
        self.name == GENERIC.name
    }

    /// Partition for the alternate-partition flag.
    ///
    /// Clusters without an alternate partition ignore the flag.
    pub fn select_partition(&self, use_alt_partition: bool) -> Option<&Partition> {
        if use_alt_partition {
            self.alt_partition.as_ref().or(self.partition.as_ref())
        } else {
            self.partition.as_ref()
        }
    }
}

/// Name of the cluster seabatch is running on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterId(String);

impl ClusterId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Detect the cluster from `$WGSYSTEM`, then `$CC_CLUSTER`, then the
    /// first label of the hostname.
    pub fn detect() -> Self {
        let hostname = gethostname::gethostname().to_string_lossy().into_owned();
        Self::from_sources(
            std::env::var("WGSYSTEM").ok().as_deref(),
            std::env::var("CC_CLUSTER").ok().as_deref(),
            &hostname,
        )
    }

    /// Pick the first non-empty of `wgsystem` and `cc_cluster`, else the
    /// first label of `hostname`.
    pub fn from_sources(wgsystem: Option<&str>, cc_cluster: Option<&str>, hostname: &str) -> Self {
        for (var, value) in [("WGSYSTEM", wgsystem), ("CC_CLUSTER", cc_cluster)] {
            if let Some(name) = value.and_then(seabatch_parsers::non_empty_string) {
                debug!("cluster {} from ${}", name, var);
                return Self(name);
            }
        }
        let name = hostname.split('.').next().unwrap_or_default().to_string();
        debug!("cluster {} from hostname {}", name, hostname);
        Self(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn profile(&self) -> &'static ClusterProfile {
        ClusterProfile::lookup(&self.0)
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_detection_precedence() {
        let host = "orcinus.westgrid.ca";
        assert_eq!(
            ClusterId::from_sources(Some("salish"), Some("cedar"), host).as_str(),
            "salish"
        );
        assert_eq!(
            ClusterId::from_sources(None, Some("cedar"), host).as_str(),
            "cedar"
        );
        assert_eq!(
            ClusterId::from_sources(Some(" "), Some(""), host).as_str(),
            "orcinus"
        );
        assert_eq!(ClusterId::from_sources(None, None, "salish").as_str(), "salish");
    }

    #[test]
    fn test_dialect_by_cluster() {
        assert_eq!(ClusterProfile::lookup("cedar").dialect, Dialect::Slurm);
        assert_eq!(ClusterProfile::lookup("graham").dialect, Dialect::Slurm);
        assert_eq!(ClusterProfile::lookup("orcinus").dialect, Dialect::Torque);
        assert_eq!(ClusterProfile::lookup("salish").dialect, Dialect::Torque);
    }

    #[test]
    fn test_unknown_cluster_is_generic() {
        let profile = ClusterProfile::lookup("laptop");
        assert!(profile.is_generic());
        assert_eq!(profile.dialect, Dialect::Torque);
        assert!(profile.modules.is_empty());
        assert!(profile.partition.is_none());
        assert!(!ClusterProfile::lookup("cedar").is_generic());
    }

    #[test]
    fn test_select_partition() {
        let cedar = ClusterProfile::lookup("cedar");
        assert_eq!(cedar.select_partition(false).unwrap().constraint, "skylake");
        assert_eq!(cedar.select_partition(true).unwrap().constraint, "broadwell");
        let graham = ClusterProfile::lookup("graham");
        assert_eq!(graham.select_partition(true), graham.select_partition(false));
        assert!(ClusterProfile::lookup("orcinus").select_partition(true).is_none());
    }

    #[test]
    fn test_cluster_names_are_unique() {
        for (i, a) in CLUSTERS.iter().enumerate() {
            assert!(CLUSTERS[i + 1..].iter().all(|b| b.name != a.name));
        }
    }

    #[test]
    fn test_cluster_id_profile() {
        assert_eq!(ClusterId::new("graham").profile().name, "graham");
        assert!(ClusterId::new("nowhere").profile().is_generic());
    }
}
