//! Dependent deflate scripts, one per result type.

use camino::Utf8Path;
use seabatch_core::{ClusterProfile, ResultType, RunDescription, deflate_layout};
use std::fmt::Write;

use crate::ScriptError;
use crate::assemble::{modules, salishsea_cmd};
use crate::directives::{DEFLATE_EMAIL_DOMAIN, JobKind, render_directives, resolve_email};

/// Assemble a single-processor script that deflates one result type.
pub fn assemble_deflate_script(
    run_desc: &RunDescription,
    result_type: ResultType,
    results_dir: &Utf8Path,
    cluster: &ClusterProfile,
    use_alt_partition: bool,
) -> Result<String, ScriptError> {
    let email = resolve_email(run_desc, DEFLATE_EMAIL_DOMAIN);
    let layout = deflate_layout(result_type, cluster, use_alt_partition);

    let mut script = String::from("#!/bin/bash\n\n");
    script.push_str(&render_directives(
        run_desc,
        cluster,
        &layout,
        &email,
        results_dir,
        JobKind::Deflate(result_type),
    )?);
    for directive in cluster.extra_directives {
        let _ = writeln!(script, "{directive}");
    }
    script.push('\n');
    let _ = writeln!(script, "RESULTS_DIR=\"{results_dir}\"");
    let _ = writeln!(script, "DEFLATE=\"{}\"", salishsea_cmd(cluster, "deflate"));
    script.push('\n');
    script.push_str(&modules(cluster));
    if let Some(module) = cluster.deflate_module {
        let _ = writeln!(script, "module load {module}");
    }
    script.push('\n');
    script.push_str("cd ${RESULTS_DIR}\n");
    script.push_str("echo \"Results deflation started at $(date)\"\n");
    let _ = writeln!(
        script,
        "${{DEFLATE}} {} --jobs 1 --debug",
        result_type.pattern()
    );
    script.push_str(
        "DEFLATE_EXIT_CODE=$?\n\
         echo \"Results deflation ended at $(date)\"\n\
         \n\
         chmod g+rw ${RESULTS_DIR}/*\n\
         chmod o+r ${RESULTS_DIR}/*\n\
         \n\
         exit ${DEFLATE_EXIT_CODE}\n",
    );
    Ok(script)
}
