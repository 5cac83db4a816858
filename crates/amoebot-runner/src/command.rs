//! Text command parsing for the interactive console.

/// A parsed console command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Begin running rounds continuously.
    Start,
    /// Stop at the next round boundary.
    Stop,
    /// Execute exactly one round.
    Round,
    /// Run a fixed number of rounds, then stop.
    Run(u64),
    /// Report the scheduler state and round count.
    Status,
    /// Write a snapshot of the current state.
    Snapshot,
    /// Shut the engine down and exit.
    Quit,
}

/// Parses one console line. Commands are case-insensitive; `run` takes a
/// positive round count.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let word = parts.next().ok_or_else(|| "empty command".to_string())?;

    let command = match word.to_ascii_lowercase().as_str() {
        "start" => Command::Start,
        "stop" => Command::Stop,
        "round" | "step" => Command::Round,
        "run" => {
            let arg = parts
                .next()
                .ok_or_else(|| "run requires a round count".to_string())?;
            let rounds: u64 = arg
                .parse()
                .map_err(|_| format!("invalid round count: {}", arg))?;
            if rounds == 0 {
                return Err("round count must be positive".to_string());
            }
            Command::Run(rounds)
        }
        "status" => Command::Status,
        "snapshot" | "snap" => Command::Snapshot,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command: {}", other)),
    };

    if let Some(extra) = parts.next() {
        return Err(format!("unexpected argument: {}", extra));
    }
    Ok(command)
}
