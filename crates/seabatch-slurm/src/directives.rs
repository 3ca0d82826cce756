//! `#SBATCH` directive rendering.

use seabatch_core::DirectiveRequest;
use std::fmt::Write;

pub const PREFIX: &str = "#SBATCH";

/// Account assumed on SLURM clusters with no default of their own.
pub const DEFAULT_ACCOUNT: &str = "def-allen";

/// Render a node-oriented directive block.
pub fn render(request: &DirectiveRequest<'_>) -> String {
    let layout = request.layout;
    let mut out = String::with_capacity(512);

    let _ = writeln!(out, "{PREFIX} --job-name={}", request.job_name);
    if request.constraint_directive {
        if let Some(constraint) = layout.constraint {
            let _ = writeln!(out, "{PREFIX} --constraint={constraint}");
        }
    }
    let _ = writeln!(out, "{PREFIX} --nodes={}", layout.node_count);
    let _ = writeln!(
        out,
        "{PREFIX} --ntasks-per-node={}",
        layout.processors_per_node
    );
    let _ = writeln!(out, "{PREFIX} --mem={}", layout.memory_per_node);
    let _ = writeln!(out, "{PREFIX} --time={}", request.walltime);
    let _ = writeln!(out, "{PREFIX} --mail-user={}", request.email);
    let _ = writeln!(out, "{PREFIX} --mail-type=ALL");
    if let Some(account) = &request.account {
        let _ = writeln!(out, "{PREFIX} --account={}", account.name());
    }
    let _ = writeln!(out, "# stdout and stderr file paths/names");
    let _ = writeln!(out, "{PREFIX} --output={}", request.stdout);
    let _ = writeln!(out, "{PREFIX} --error={}", request.stderr);
    out
}
