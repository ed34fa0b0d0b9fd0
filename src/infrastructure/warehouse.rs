//! Warehouse loader: full-table replace into the analytic warehouse.
//!
//! The real implementation shells out to the `bq` CLI with `--replace`, so
//! every export rebuilds the whole table and a failed job leaves the
//! previous table untouched (the load only commits on full success).

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::infrastructure::error::{InfraError, InfraResult};
use crate::infrastructure::traits::CommandRunner;

/// Explicit column schema of the warehouse table.
pub const WAREHOUSE_SCHEMA: &str = "symbol:STRING,symbol_short:STRING,symbol_external:STRING,\
kind:STRING,parent:STRING,level:INT64,title_en:STRING,title_full:STRING,\
not_allocatable:BOOL,additional_only:BOOL,status:STRING";

/// Loads a newline-delimited JSON file into a warehouse table, replacing
/// the table's previous contents entirely.
pub trait WarehouseLoader: Send + Sync {
    fn replace_table(&self, table: &str, load_file: &Path) -> InfraResult<()>;
}

/// Loader backed by the `bq` command-line tool.
pub struct BqLoader {
    runner: Arc<dyn CommandRunner>,
}

impl BqLoader {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    fn ensure_available(&self) -> InfraResult<()> {
        let output = self.runner.run("bq", &["version"]).map_err(|_| {
            InfraError::TargetUnavailable(
                "`bq` CLI not found on PATH; install the Google Cloud SDK and authenticate"
                    .to_string(),
            )
        })?;
        if !output.status.success() {
            return Err(InfraError::TargetUnavailable(
                "`bq` CLI is present but not working; check gcloud authentication".to_string(),
            ));
        }
        Ok(())
    }
}

impl WarehouseLoader for BqLoader {
    fn replace_table(&self, table: &str, load_file: &Path) -> InfraResult<()> {
        self.ensure_available()?;

        let file_arg = load_file.display().to_string();
        debug!("bq load --replace {} {}", table, file_arg);

        let output = self
            .runner
            .run(
                "bq",
                &[
                    "load",
                    "--replace",
                    "--source_format=NEWLINE_DELIMITED_JSON",
                    table,
                    &file_arg,
                    WAREHOUSE_SCHEMA,
                ],
            )
            .map_err(|e| InfraError::io(format!("run bq load for {table}"), e))?;

        if !output.status.success() {
            return Err(InfraError::LoadFailed {
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                exit_code: output.status.code(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::os::unix::process::ExitStatusExt;
    use std::process::{ExitStatus, Output};
    use std::sync::Mutex;

    /// Runner answering every invocation, recording the argument vectors.
    struct FakeRunner {
        fail_load: bool,
        calls: Mutex<Vec<Vec<String>>>,
    }

    impl FakeRunner {
        fn new(fail_load: bool) -> Self {
            Self {
                fail_load,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(&self, cmd: &str, args: &[&str]) -> io::Result<Output> {
            let mut call = vec![cmd.to_string()];
            call.extend(args.iter().map(|s| s.to_string()));
            self.calls.lock().unwrap().push(call);

            let fail = self.fail_load && args.first() != Some(&"version");
            Ok(Output {
                status: ExitStatus::from_raw(if fail { 256 } else { 0 }),
                stdout: Vec::new(),
                stderr: if fail { b"quota exceeded".to_vec() } else { Vec::new() },
            })
        }
    }

    /// Runner simulating a missing `bq` binary.
    struct MissingRunner;

    impl CommandRunner for MissingRunner {
        fn run(&self, _cmd: &str, _args: &[&str]) -> io::Result<Output> {
            Err(io::Error::new(io::ErrorKind::NotFound, "no such binary"))
        }
    }

    #[test]
    fn given_working_bq_when_replacing_then_load_called_with_replace_flags() {
        let runner = Arc::new(FakeRunner::new(false));
        let loader = BqLoader::new(runner.clone());

        loader
            .replace_table("p.d.t", Path::new("/tmp/rows.json"))
            .unwrap();

        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls.len(), 2); // version probe + load
        let load = &calls[1];
        assert_eq!(load[0], "bq");
        assert_eq!(load[1], "load");
        assert!(load.contains(&"--replace".to_string()));
        assert!(load.contains(&"p.d.t".to_string()));
        assert!(load.contains(&WAREHOUSE_SCHEMA.to_string()));
    }

    #[test]
    fn given_failing_load_when_replacing_then_load_failed_with_stderr() {
        let loader = BqLoader::new(Arc::new(FakeRunner::new(true)));

        let result = loader.replace_table("p.d.t", Path::new("/tmp/rows.json"));

        match result {
            Err(InfraError::LoadFailed { message, exit_code }) => {
                assert_eq!(message, "quota exceeded");
                assert_eq!(exit_code, Some(1));
            }
            other => panic!("expected LoadFailed, got {other:?}"),
        }
    }

    #[test]
    fn given_missing_bq_when_replacing_then_target_unavailable() {
        let loader = BqLoader::new(Arc::new(MissingRunner));

        let result = loader.replace_table("p.d.t", Path::new("/tmp/rows.json"));

        assert!(matches!(result, Err(InfraError::TargetUnavailable(_))));
    }
}
