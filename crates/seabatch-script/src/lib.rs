//! Batch script synthesis for seabatch.
//!
//! Builds the primary model-run script and the dependent per-result-type
//! deflate scripts, choosing the directive dialect from the cluster.

pub mod assemble;
pub mod deflate;
pub mod dialect;
pub mod directives;

pub use assemble::{ScriptOptions, assemble_script};
pub use deflate::assemble_deflate_script;
pub use dialect::scheduler_for;
pub use directives::{JobKind, render_directives};

use seabatch_core::RunDescError;
use thiserror::Error;

/// File name of the primary batch script in the run directory.
pub const BATCH_SCRIPT_NAME: &str = "SalishSeaNEMO.sh";

#[derive(Error, Debug)]
pub enum ScriptError {
    #[error(transparent)]
    RunDesc(#[from] RunDescError),
    #[error("Too many processors: {nemo} NEMO plus {xios} XIOS")]
    TooManyProcessors { nemo: u32, xios: u32 },
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    /// Log sink shared with a scoped subscriber.
    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Capture {
        type Writer = Capture;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    /// Run `f` with INFO-level logs captured into a string.
    pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
        let capture = Capture::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(capture.clone())
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .finish();
        let result = tracing::subscriber::with_default(subscriber, f);
        let logs = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        (result, logs)
    }
}
