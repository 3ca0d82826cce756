//! `#PBS` directive rendering.

use seabatch_core::DirectiveRequest;
use std::fmt::Write;

pub const PREFIX: &str = "#PBS";

/// Render a core-count-oriented directive block.
///
/// TORQUE places processes anywhere, so only the total count and the
/// per-processor memory are requested; node layout is ignored.
pub fn render(request: &DirectiveRequest<'_>) -> String {
    let mut out = String::with_capacity(512);

    let _ = writeln!(out, "{PREFIX} -N {}", request.job_name);
    let _ = writeln!(out, "{PREFIX} -S /bin/bash");
    let _ = writeln!(out, "{PREFIX} -l procs={}", request.layout.total_processors);
    let _ = writeln!(out, "# memory per processor");
    let _ = writeln!(out, "{PREFIX} -l pmem={}", request.pmem);
    let _ = writeln!(out, "{PREFIX} -l walltime={}", request.walltime);
    let _ = writeln!(
        out,
        "# email when the job [b]egins and [e]nds, or is [a]borted"
    );
    let _ = writeln!(out, "{PREFIX} -m bea");
    let _ = writeln!(out, "{PREFIX} -M {}", request.email);
    if let Some(account) = &request.account {
        let _ = writeln!(out, "{PREFIX} -A {}", account.name());
    }
    let _ = writeln!(out, "# stdout and stderr file paths/names");
    let _ = writeln!(out, "{PREFIX} -o {}", request.stdout);
    let _ = writeln!(out, "{PREFIX} -e {}", request.stderr);
    out
}
