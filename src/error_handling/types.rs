use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(String),
    NotInRange(String),
    BadColumns(String),
    EmptyValue(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            ConfigError::NotInRange(e) => write!(f, "Value out of range: {}", e),
            ConfigError::BadColumns(e) => write!(f, "Column layout error: {}", e),
            ConfigError::EmptyValue(e) => write!(f, "Empty value: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

/// Failure to run an external program to completion.
#[derive(Debug)]
pub enum CommandError {
    SpawnFailed(std::io::Error),
    WaitFailed(std::io::Error),
    ExitStatus(Option<i32>, String),
    TimedOut(u64),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::SpawnFailed(e) => write!(f, "failed to spawn: {}", e),
            CommandError::WaitFailed(e) => write!(f, "failed to wait for process: {}", e),
            CommandError::ExitStatus(Some(code), stderr) if stderr.is_empty() => {
                write!(f, "exited with status {}", code)
            }
            CommandError::ExitStatus(Some(code), stderr) => {
                write!(f, "exited with status {}: {}", code, stderr)
            }
            CommandError::ExitStatus(None, _) => write!(f, "terminated by signal"),
            CommandError::TimedOut(secs) => write!(f, "timed out after {}s", secs),
        }
    }
}

impl std::error::Error for CommandError {}

#[derive(Debug)]
pub enum EnumeratorError {
    CommandFailed(String, CommandError),
}

impl fmt::Display for EnumeratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumeratorError::CommandFailed(program, e) => {
                write!(f, "connection enumerator `{}` {}", program, e)
            }
        }
    }
}

impl std::error::Error for EnumeratorError {}

#[derive(Debug)]
pub enum TerminatorError {
    CommandFailed(String, CommandError),
}

impl fmt::Display for TerminatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminatorError::CommandFailed(program, e) => {
                write!(f, "connection terminator `{}` {}", program, e)
            }
        }
    }
}

impl std::error::Error for TerminatorError {}

#[derive(Debug)]
pub enum ControllerError {
    ConfigurationError(ConfigError),
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::ConfigurationError(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl std::error::Error for ControllerError {}

impl From<ConfigError> for ControllerError {
    fn from(err: ConfigError) -> Self {
        ControllerError::ConfigurationError(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_error_display() {
        let e = CommandError::ExitStatus(Some(1), String::from("permission denied"));
        assert_eq!(e.to_string(), "exited with status 1: permission denied");

        let e = CommandError::ExitStatus(Some(2), String::new());
        assert_eq!(e.to_string(), "exited with status 2");

        let e = EnumeratorError::CommandFailed(String::from("ss"), CommandError::TimedOut(10));
        assert_eq!(e.to_string(), "connection enumerator `ss` timed out after 10s");
    }
}
