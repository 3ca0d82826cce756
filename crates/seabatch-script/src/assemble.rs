//! Primary model-run batch script.
//!
//! Stanzas, in order: shebang, directives, variable definitions,
//! module loads, execution, permission fixes, cleanup.

use camino::Utf8Path;
use seabatch_core::{ClusterProfile, RunDescription, compute_layout};
use std::fmt::Write;

use crate::ScriptError;
use crate::directives::{JobKind, PRIMARY_EMAIL_DOMAIN, render_directives, resolve_email};

/// Result files deflated in-line when deflation isn't split into jobs.
const INLINE_DEFLATE_PATTERNS: &str = "*_ptrc_T*.nc *_prod_T*.nc *_carp_T*.nc *_grid_[TUVW]*.nc \\
  *_turb_T*.nc *_dia[12n]_T*.nc FVCOM*.nc Slab_[UV]*.nc *_mtrc_T*.nc";

/// Knobs for one primary script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptOptions {
    pub nemo_processors: u32,
    /// I/O server processes; 0 for none
    pub xios_processors: u32,
    pub max_deflate_jobs: u32,
    /// Deflate results after the run
    pub deflate: bool,
    /// Deflate in dependent jobs instead of in this script
    pub separate_deflate: bool,
    pub use_alt_partition: bool,
}

impl Default for ScriptOptions {
    fn default() -> Self {
        Self {
            nemo_processors: 1,
            xios_processors: 0,
            max_deflate_jobs: 4,
            deflate: true,
            separate_deflate: false,
            use_alt_partition: false,
        }
    }
}

impl ScriptOptions {
    fn inline_deflate(&self) -> bool {
        self.deflate && !self.separate_deflate
    }
}

/// Command alias for a `salishsea` sub-command, resolved in the job's home.
pub(crate) fn salishsea_cmd(cluster: &ClusterProfile, sub_command: &str) -> String {
    format!("{}/.local/bin/salishsea {}", cluster.home_var, sub_command)
}

/// `module load` lines for a cluster; empty when it has none.
pub(crate) fn modules(cluster: &ClusterProfile) -> String {
    cluster
        .modules
        .iter()
        .map(|module| format!("module load {module}\n"))
        .collect()
}

fn definitions(
    run_id: &str,
    desc_file: &Utf8Path,
    run_dir: &Utf8Path,
    results_dir: &Utf8Path,
    cluster: &ClusterProfile,
    deflate: bool,
) -> String {
    let mut defns = String::new();
    let _ = writeln!(defns, "RUN_ID=\"{run_id}\"");
    let _ = writeln!(defns, "RUN_DESC=\"{desc_file}\"");
    let _ = writeln!(defns, "WORK_DIR=\"{run_dir}\"");
    let _ = writeln!(defns, "RESULTS_DIR=\"{results_dir}\"");
    let _ = writeln!(defns, "COMBINE=\"{}\"", salishsea_cmd(cluster, "combine"));
    if deflate {
        let _ = writeln!(defns, "DEFLATE=\"{}\"", salishsea_cmd(cluster, "deflate"));
    }
    let _ = writeln!(defns, "GATHER=\"{}\"", salishsea_cmd(cluster, "gather"));
    defns
}

fn mpirun(cluster: &ClusterProfile, options: &ScriptOptions) -> String {
    let mut cmd = format!(
        "{} -np {} ./nemo.exe",
        cluster.mpirun, options.nemo_processors
    );
    if options.xios_processors > 0 {
        let _ = write!(cmd, " : -np {} ./xios_server.exe", options.xios_processors);
    }
    cmd
}

fn execute(cluster: &ClusterProfile, options: &ScriptOptions) -> String {
    let mut script = String::from(
        "mkdir -p ${RESULTS_DIR}\n\
         \n\
         cd ${WORK_DIR}\n\
         echo \"working dir: $(pwd)\"\n\
         \n\
         echo \"Starting run at $(date)\"\n",
    );
    let _ = writeln!(script, "{}", mpirun(cluster, options));
    script.push_str(
        "MPIRUN_EXIT_CODE=$?\n\
         echo \"Ended run at $(date)\"\n\
         \n\
         echo \"Results combining started at $(date)\"\n\
         ${COMBINE} ${RUN_DESC} --debug\n\
         echo \"Results combining ended at $(date)\"\n",
    );
    if options.inline_deflate() {
        if let Some(module) = cluster.deflate_module {
            let _ = write!(script, "\nmodule load {module}\n");
        }
        script.push_str("\necho \"Results deflation started at $(date)\"\n");
        let _ = writeln!(script, "${{DEFLATE}} {INLINE_DEFLATE_PATTERNS} \\");
        let _ = writeln!(script, "  --jobs {} --debug", options.max_deflate_jobs);
        script.push_str("echo \"Results deflation ended at $(date)\"\n");
    }
    script.push_str(
        "\n\
         echo \"Results gathering started at $(date)\"\n\
         ${GATHER} ${RESULTS_DIR} --debug\n\
         echo \"Results gathering ended at $(date)\"\n",
    );
    script
}

const FIX_PERMISSIONS: &str = "\
chmod go+rx ${RESULTS_DIR}
chmod g+rw ${RESULTS_DIR}/*
chmod o+r ${RESULTS_DIR}/*
";

const CLEANUP: &str = "\
echo \"Deleting run directory\" >>${RESULTS_DIR}/stdout
rmdir $(pwd)
echo \"Finished at $(date)\" >>${RESULTS_DIR}/stdout
exit ${MPIRUN_EXIT_CODE}
";

/// Assemble the primary batch script for a run.
pub fn assemble_script(
    run_desc: &RunDescription,
    desc_file: &Utf8Path,
    options: &ScriptOptions,
    results_dir: &Utf8Path,
    run_dir: &Utf8Path,
    cluster: &ClusterProfile,
) -> Result<String, ScriptError> {
    let email = resolve_email(run_desc, PRIMARY_EMAIL_DOMAIN);
    let total_processors = options
        .nemo_processors
        .checked_add(options.xios_processors)
        .ok_or(ScriptError::TooManyProcessors {
            nemo: options.nemo_processors,
            xios: options.xios_processors,
        })?;
    let layout = compute_layout(total_processors, cluster, options.use_alt_partition);

    let mut script = String::from("#!/bin/bash\n\n");
    script.push_str(&render_directives(
        run_desc,
        cluster,
        &layout,
        &email,
        results_dir,
        JobKind::Primary,
    )?);
    for directive in cluster.extra_directives {
        let _ = writeln!(script, "{directive}");
    }
    script.push('\n');
    script.push_str(&definitions(
        &run_desc.run_id()?,
        desc_file,
        run_dir,
        results_dir,
        cluster,
        options.deflate,
    ));
    script.push('\n');
    script.push_str(&modules(cluster));
    script.push('\n');
    script.push_str(&execute(cluster, options));
    script.push('\n');
    script.push_str(FIX_PERMISSIONS);
    script.push('\n');
    script.push_str(CLEANUP);
    Ok(script)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RUN_DESC: &str = "\
run_id: 01jan07hindcast
walltime: '10:00:00'
email: me@example.com
MPI decomposition: 7x6
";

    fn options(xios_processors: u32) -> ScriptOptions {
        ScriptOptions {
            nemo_processors: 42,
            xios_processors,
            max_deflate_jobs: 4,
            deflate: true,
            separate_deflate: false,
            use_alt_partition: true,
        }
    }

    fn assemble(cluster: &str, options: &ScriptOptions) -> String {
        let run_desc = RunDescription::from_yaml_str(RUN_DESC).unwrap();
        assemble_script(
            &run_desc,
            Utf8Path::new("01jan07hindcast.yaml"),
            options,
            Utf8Path::new("/results/01jan07"),
            Utf8Path::new("/runs/01jan07hindcast_2024"),
            ClusterProfile::lookup(cluster),
        )
        .unwrap()
    }

    #[test]
    fn test_cedar_script() {
        let expected = r#"#!/bin/bash

#SBATCH --job-name=01jan07hindcast
#SBATCH --constraint=broadwell
#SBATCH --nodes=2
#SBATCH --ntasks-per-node=32
#SBATCH --mem=125G
#SBATCH --time=10:00:00
#SBATCH --mail-user=me@example.com
#SBATCH --mail-type=ALL
#SBATCH --account=rrg-allen
# stdout and stderr file paths/names
#SBATCH --output=/results/01jan07/stdout
#SBATCH --error=/results/01jan07/stderr

RUN_ID="01jan07hindcast"
RUN_DESC="01jan07hindcast.yaml"
WORK_DIR="/runs/01jan07hindcast_2024"
RESULTS_DIR="/results/01jan07"
COMBINE="${HOME}/.local/bin/salishsea combine"
DEFLATE="${HOME}/.local/bin/salishsea deflate"
GATHER="${HOME}/.local/bin/salishsea gather"

module load netcdf-fortran-mpi/4.4.4

mkdir -p ${RESULTS_DIR}

cd ${WORK_DIR}
echo "working dir: $(pwd)"

echo "Starting run at $(date)"
mpirun -np 42 ./nemo.exe : -np 1 ./xios_server.exe
MPIRUN_EXIT_CODE=$?
echo "Ended run at $(date)"

echo "Results combining started at $(date)"
${COMBINE} ${RUN_DESC} --debug
echo "Results combining ended at $(date)"

module load nco/4.6.6

echo "Results deflation started at $(date)"
${DEFLATE} *_ptrc_T*.nc *_prod_T*.nc *_carp_T*.nc *_grid_[TUVW]*.nc \
  *_turb_T*.nc *_dia[12n]_T*.nc FVCOM*.nc Slab_[UV]*.nc *_mtrc_T*.nc \
  --jobs 4 --debug
echo "Results deflation ended at $(date)"

echo "Results gathering started at $(date)"
${GATHER} ${RESULTS_DIR} --debug
echo "Results gathering ended at $(date)"

chmod go+rx ${RESULTS_DIR}
chmod g+rw ${RESULTS_DIR}/*
chmod o+r ${RESULTS_DIR}/*

echo "Deleting run directory" >>${RESULTS_DIR}/stdout
rmdir $(pwd)
echo "Finished at $(date)" >>${RESULTS_DIR}/stdout
exit ${MPIRUN_EXIT_CODE}
"#;
        assert_eq!(assemble("cedar", &options(1)), expected);
    }

    #[test]
    fn test_processor_total_overflow_is_an_error() {
        let run_desc = RunDescription::from_yaml_str(RUN_DESC).unwrap();
        let options = ScriptOptions {
            nemo_processors: u32::MAX,
            ..options(1)
        };
        let result = assemble_script(
            &run_desc,
            Utf8Path::new("01jan07hindcast.yaml"),
            &options,
            Utf8Path::new("/results/01jan07"),
            Utf8Path::new("/runs/01jan07hindcast_2024"),
            ClusterProfile::lookup("cedar"),
        );
        assert!(matches!(
            result,
            Err(ScriptError::TooManyProcessors { nemo: u32::MAX, xios: 1 })
        ));
    }

    #[test]
    fn test_no_xios_launch_group_for_zero_servers() {
        let script = assemble("graham", &options(0));
        assert!(script.contains("\nmpirun -np 42 ./nemo.exe\n"));
        assert!(!script.contains("xios_server.exe"));
        assert!(!script.contains("-np 0"));
    }

    #[test]
    fn test_orcinus_script() {
        let script = assemble("orcinus", &options(1));
        assert!(script.contains(
            "#PBS -e /results/01jan07/stderr\n#PBS -l partition=QDR\n\nRUN_ID="
        ));
        assert!(script.contains("COMBINE=\"${PBS_O_HOME}/.local/bin/salishsea combine\"\n"));
        assert!(script.contains("module load intel/14.0/nco-4.5.2\n"));
        assert!(!script.contains("module load nco/4.6.6"));
        assert!(script.contains("${DEFLATE} *_ptrc_T*.nc"));
    }

    #[test]
    fn test_salish_launcher_path() {
        let script = assemble("salish", &options(1));
        assert!(script.contains("\n/usr/bin/mpirun -np 42 ./nemo.exe : -np 1 ./xios_server.exe\n"));
        assert!(script.contains("COMBINE=\"${HOME}/.local/bin/salishsea combine\"\n"));
    }

    #[test]
    fn test_unknown_cluster_has_empty_module_block() {
        let script = assemble("somewhere-new", &options(1));
        assert!(!script.contains("module load"));
        assert!(script.contains("#PBS -l procs=43\n"));
        assert!(script.contains("GATHER=\"${HOME}/.local/bin/salishsea gather\"\n\n\nmkdir -p"));
    }

    #[test]
    fn test_no_deflate() {
        let opts = ScriptOptions {
            deflate: false,
            ..options(1)
        };
        let script = assemble("cedar", &opts);
        assert!(!script.contains("DEFLATE"));
        assert!(!script.contains("nco"));
        assert!(script.contains("${COMBINE} ${RUN_DESC} --debug\n"));
        assert!(script.contains("${GATHER} ${RESULTS_DIR} --debug\n"));
    }

    #[test]
    fn test_separate_deflate_defines_alias_but_skips_inline_deflate() {
        let opts = ScriptOptions {
            separate_deflate: true,
            ..options(1)
        };
        let script = assemble("graham", &opts);
        assert!(script.contains("DEFLATE=\"${HOME}/.local/bin/salishsea deflate\"\n"));
        assert!(!script.contains("${DEFLATE}"));
        assert!(!script.contains("module load nco/4.6.6"));
    }

    #[test]
    fn test_stanza_order() {
        let script = assemble("graham", &options(1));
        let positions: Vec<usize> = [
            "#!/bin/bash",
            "#SBATCH --job-name",
            "RUN_ID=",
            "module load netcdf",
            "mkdir -p ${RESULTS_DIR}",
            "MPIRUN_EXIT_CODE=$?",
            "${COMBINE}",
            "${DEFLATE}",
            "${GATHER}",
            "chmod go+rx",
            "rmdir $(pwd)",
            "exit ${MPIRUN_EXIT_CODE}",
        ]
        .iter()
        .map(|needle| script.find(needle).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");
        assert!(script.ends_with("exit ${MPIRUN_EXIT_CODE}\n"));
    }
}
