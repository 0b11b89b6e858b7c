//! Decoding of `compose ps --format json` output
//!
//! Older compose releases print a single JSON array, newer ones print one
//! JSON object per line. Both are accepted.

use crate::error::{Result, RunnerError};
use crate::runner::ServiceProcess;

/// Parse `compose ps` output into container records
pub fn parse_ps_output(output: &str) -> Result<Vec<ServiceProcess>> {
    let trimmed = output.trim();

    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).map_err(|e| RunnerError::StatusParse {
            reason: e.to_string(),
        });
    }

    trimmed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            serde_json::from_str::<ServiceProcess>(line).map_err(|e| RunnerError::StatusParse {
                reason: format!("{}: {}", e, line),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_output() {
        assert!(parse_ps_output("").unwrap().is_empty());
        assert!(parse_ps_output("  \n").unwrap().is_empty());
        assert!(parse_ps_output("[]").unwrap().is_empty());
    }

    #[test]
    fn test_line_delimited_output() {
        let output = r#"{"ID":"c0ffee","Name":"sample_web","Service":"web","State":"running","ExitCode":0,"Status":"Up 2 seconds","Image":"nginx"}
{"ID":"beef","Name":"sample_db","Service":"db","State":"exited","ExitCode":1,"Status":"Exited (1) 3 seconds ago"}
"#;
        let processes = parse_ps_output(output).unwrap();
        assert_eq!(processes.len(), 2);
        assert_eq!(processes[0].container_id, "c0ffee");
        assert_eq!(processes[0].service_name, "web");
        assert_eq!(processes[0].running_state, "running");
        assert_eq!(processes[1].exit_code, 1);
        assert_eq!(processes[1].status_text, "Exited (1) 3 seconds ago");
    }

    #[test]
    fn test_array_output() {
        let output = r#"[{"ID":"c0ffee","Name":"sample_web","Service":"web","State":"running","ExitCode":0,"Status":"Up"}]"#;
        let processes = parse_ps_output(output).unwrap();
        assert_eq!(processes.len(), 1);
        assert_eq!(processes[0].container_name, "sample_web");
    }

    #[test]
    fn test_garbage_output() {
        let result = parse_ps_output("no such service");
        assert!(matches!(result, Err(RunnerError::StatusParse { .. })));
    }
}
