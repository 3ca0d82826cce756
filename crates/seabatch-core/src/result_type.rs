//! Result file families deflated by dependent post-processing jobs.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultType {
    Grid,
    Ptrc,
    Dia,
}

impl ResultType {
    /// Submission order for dependent deflate jobs.
    pub const ALL: [ResultType; 3] = [ResultType::Grid, ResultType::Ptrc, ResultType::Dia];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResultType::Grid => "grid",
            ResultType::Ptrc => "ptrc",
            ResultType::Dia => "dia",
        }
    }

    /// Shell glob matching this family's output files.
    pub fn pattern(&self) -> &'static str {
        match self {
            ResultType::Grid => "*_grid_[TUVW]*.nc",
            ResultType::Ptrc => "*_ptrc_T*.nc",
            ResultType::Dia => "*_dia[12n]_T*.nc",
        }
    }

    /// Per-node memory for the SLURM deflate job.
    pub fn slurm_memory(&self) -> &'static str {
        match self {
            ResultType::Grid => "8G",
            ResultType::Ptrc => "12G",
            ResultType::Dia => "8G",
        }
    }

    /// Per-processor memory for the TORQUE deflate job.
    pub fn pmem(&self) -> &'static str {
        match self {
            ResultType::Ptrc => "2500mb",
            ResultType::Grid | ResultType::Dia => "2000mb",
        }
    }

    pub fn script_name(&self) -> String {
        format!("deflate_{}.sh", self.as_str())
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
