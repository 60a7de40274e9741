use super::command::{run_for_window, WindowOutcome};
use crate::configuration::types::TerminatorConfig;
use crate::connection_tracking::ConnectionRecord;
use crate::error_handling::types::TerminatorError;
use log::debug;
use std::future::Future;
use std::time::Duration;

/// Capability to sever one TCP flow at the network layer.
pub trait ConnectionTerminator: Send + Sync {
    fn terminate(
        &self,
        record: &ConnectionRecord,
    ) -> impl Future<Output = Result<(), TerminatorError>> + Send;
}

/// Resets flows by running an external program, `tcpkill -9 "host <src> and port <port>"`
/// by default.
#[derive(Debug, Clone)]
pub struct CommandTerminator {
    program: String,
    args: Vec<String>,
    window: Duration,
}

impl CommandTerminator {
    pub fn new(config: &TerminatorConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            window: Duration::from_secs(config.window_secs),
        }
    }

    /// Argument list with the record's endpoints filled in.
    pub fn render_args(&self, record: &ConnectionRecord) -> Vec<String> {
        let src_port = record.source_port.to_string();
        let dst_port = record.dest_port.to_string();

        self.args
            .iter()
            .map(|arg| {
                arg.replace("{src_address}", &record.source_address)
                    .replace("{src_port}", &src_port)
                    .replace("{dst_address}", &record.dest_address)
                    .replace("{dst_port}", &dst_port)
            })
            .collect()
    }
}

impl ConnectionTerminator for CommandTerminator {
    async fn terminate(&self, record: &ConnectionRecord) -> Result<(), TerminatorError> {
        let args = self.render_args(record);

        let outcome = run_for_window(&self.program, &args, self.window)
            .await
            .map_err(|e| TerminatorError::CommandFailed(self.program.clone(), e))?;

        match outcome {
            WindowOutcome::Exited => debug!("{} exited for {}", self.program, record),
            WindowOutcome::WindowElapsed => {
                debug!("{} reset window elapsed for {}", self.program, record)
            }
        }
        Ok(())
    }
}
