//! Picking which game instance to attach to.
use std::io::{BufRead, Write};

use anyhow::{Result, bail};
use bot_runtime::{ProcessInfo, RuntimeError};

/// Returns the only candidate, or asks on `input` when there are several.
///
/// Invalid answers are re-prompted; end of input aborts.
pub fn choose_process<R, W>(
    name: &str,
    mut candidates: Vec<ProcessInfo>,
    mut input: R,
    mut output: W,
) -> Result<ProcessInfo>
where
    R: BufRead,
    W: Write,
{
    match candidates.len() {
        0 => return Err(RuntimeError::ProcessNotFound(name.to_string()).into()),
        1 => return Ok(candidates.remove(0)),
        _ => {}
    }

    writeln!(output, "Multiple {} processes found:", name)?;
    for (index, process) in candidates.iter().enumerate() {
        writeln!(output, "  {}: {} (PID: {})", index + 1, process.name, process.pid)?;
    }

    let mut line = String::new();
    loop {
        write!(output, "Select process #: ")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            bail!("no process selected");
        }
        match line.trim().parse::<usize>() {
            Ok(choice) if (1..=candidates.len()).contains(&choice) => {
                return Ok(candidates.remove(choice - 1));
            }
            _ => writeln!(output, "Invalid choice.")?,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn candidates(pids: &[u32]) -> Vec<ProcessInfo> {
        pids.iter()
            .map(|&pid| ProcessInfo {
                pid,
                name: "Endless.exe".to_string(),
            })
            .collect()
    }

    #[test]
    fn single_candidate_needs_no_prompt() {
        let mut output = Vec::new();
        let chosen =
            choose_process("endless.exe", candidates(&[42]), Cursor::new(""), &mut output).unwrap();
        assert_eq!(chosen.pid, 42);
        assert!(output.is_empty());
    }

    #[test]
    fn no_candidate_is_process_not_found() {
        let err = choose_process("endless.exe", Vec::new(), Cursor::new(""), Vec::new())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RuntimeError>(),
            Some(RuntimeError::ProcessNotFound(name)) if name == "endless.exe"
        ));
    }

    #[test]
    fn invalid_answers_are_reprompted() {
        let mut output = Vec::new();
        let chosen = choose_process(
            "endless.exe",
            candidates(&[10, 20, 30]),
            Cursor::new("abc\n7\n 2 \n"),
            &mut output,
        )
        .unwrap();

        assert_eq!(chosen.pid, 20);
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("3: Endless.exe (PID: 30)"));
        assert_eq!(text.matches("Invalid choice.").count(), 2);
    }

    #[test]
    fn end_of_input_aborts() {
        let result = choose_process(
            "endless.exe",
            candidates(&[1, 2]),
            Cursor::new("9\n"),
            Vec::new(),
        );
        assert!(result.is_err());
    }
}
