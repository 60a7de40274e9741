use super::command::run_to_completion;
use crate::configuration::types::EnumeratorConfig;
use crate::error_handling::types::EnumeratorError;
use std::future::Future;
use std::time::Duration;

/// Capability to list the host's current TCP sessions as line-oriented text.
pub trait ConnectionEnumerator: Send + Sync {
    fn list_connections(&self) -> impl Future<Output = Result<String, EnumeratorError>> + Send;
}

/// Lists connections by running an external program, `ss -tanp` by default.
#[derive(Debug, Clone)]
pub struct CommandEnumerator {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandEnumerator {
    pub fn new(config: &EnumeratorConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

impl ConnectionEnumerator for CommandEnumerator {
    async fn list_connections(&self) -> Result<String, EnumeratorError> {
        run_to_completion(&self.program, &self.args, self.timeout)
            .await
            .map_err(|e| EnumeratorError::CommandFailed(self.program.clone(), e))
    }
}
