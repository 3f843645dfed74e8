//! Notification delivery failures.

use thiserror::Error;

/// Why a notification command did not complete successfully.
///
/// These never leave [`CompletionNotifier`](crate::CompletionNotifier): the
/// handler logs them (verbose) or drops them (silent).
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{program}` exited with {}", describe_exit(.code, .stderr))]
    ExitStatus {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("invoker error: {0}")]
    Invoker(String),
}

fn describe_exit(code: &Option<i32>, stderr: &str) -> String {
    let status = match code {
        Some(c) => format!("code {c}"),
        None => "signal".to_string(),
    };
    let stderr = stderr.trim();
    if stderr.is_empty() {
        status
    } else {
        format!("{status}: {stderr}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_status_display() {
        let err = DeliveryError::ExitStatus {
            program: "se".into(),
            code: Some(2),
            stderr: "bad token\n".into(),
        };
        assert_eq!(err.to_string(), "`se` exited with code 2: bad token");

        let err = DeliveryError::ExitStatus {
            program: "se".into(),
            code: None,
            stderr: String::new(),
        };
        assert_eq!(err.to_string(), "`se` exited with signal");
    }

    #[test]
    fn test_spawn_display() {
        let err = DeliveryError::Spawn {
            program: "se".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().starts_with("failed to spawn `se`"));
    }
}
