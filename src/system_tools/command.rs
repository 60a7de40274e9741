use crate::error_handling::types::CommandError;
use log::trace;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// How a windowed run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowOutcome {
    /// The program exited successfully on its own.
    Exited,
    /// The program was still running when the window closed and has been killed.
    WindowElapsed,
}

fn build(program: &str, args: &[String]) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd
}

fn exit_error(output: &std::process::Output) -> CommandError {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    CommandError::ExitStatus(output.status.code(), stderr)
}

/// Runs `program` to completion and returns its standard output.
///
/// The child is killed if it has not exited after `timeout`. A non-zero exit status is an
/// error. Output that is not valid UTF-8 is decoded lossily.
pub async fn run_to_completion(
    program: &str,
    args: &[String],
    timeout: Duration,
) -> Result<String, CommandError> {
    trace!("Running {} {:?}", program, args);

    let child = build(program, args)
        .spawn()
        .map_err(CommandError::SpawnFailed)?;

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result.map_err(CommandError::WaitFailed)?,
        Err(_) => return Err(CommandError::TimedOut(timeout.as_secs())),
    };

    if !output.status.success() {
        return Err(exit_error(&output));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Runs a program that normally keeps going until killed, for at most `window`.
///
/// Exiting early with a failure status is an error; still running at the end of the window
/// is not.
pub async fn run_for_window(
    program: &str,
    args: &[String],
    window: Duration,
) -> Result<WindowOutcome, CommandError> {
    trace!("Running {} {:?} for {:?}", program, args, window);

    let child = build(program, args)
        .spawn()
        .map_err(CommandError::SpawnFailed)?;

    match tokio::time::timeout(window, child.wait_with_output()).await {
        Ok(Ok(output)) if output.status.success() => Ok(WindowOutcome::Exited),
        Ok(Ok(output)) => Err(exit_error(&output)),
        Ok(Err(e)) => Err(CommandError::WaitFailed(e)),
        // dropping the future drops the child, which kills it
        Err(_) => Ok(WindowOutcome::WindowElapsed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec![String::from("-c"), String::from(script)]
    }

    #[tokio::test]
    async fn test_run_to_completion_captures_stdout() {
        let out = run_to_completion("sh", &sh("echo ESTAB"), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(out, "ESTAB\n");
    }

    #[tokio::test]
    async fn test_run_to_completion_reports_exit_status() {
        let err = run_to_completion("sh", &sh("echo denied >&2; exit 3"), Duration::from_secs(5))
            .await
            .unwrap_err();

        match err {
            CommandError::ExitStatus(code, stderr) => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "denied");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_to_completion_missing_program() {
        let err = run_to_completion("/nonexistent/conn-nanny-tool", &[], Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::SpawnFailed(_)));
    }

    #[tokio::test]
    async fn test_run_to_completion_times_out() {
        let err = run_to_completion("sleep", &[String::from("5")], Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::TimedOut(_)));
    }

    #[tokio::test]
    async fn test_run_for_window_outcomes() {
        let window = Duration::from_millis(200);

        tokio_test::assert_ok!(run_for_window("true", &[], window).await);
        assert_eq!(
            run_for_window("sleep", &[String::from("5")], window).await.unwrap(),
            WindowOutcome::WindowElapsed
        );
        tokio_test::assert_err!(run_for_window("sh", &sh("exit 1"), window).await);
    }
}
