use uploadq_core::QueueViewModel;

/// A line typed on stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CancelAll,
    CancelOne(String),
    Help,
    Quit,
    Unknown(String),
}

pub const HELP: &str = "commands: 'cancel all' | 'cancel <id>' | 'help' | 'quit'";

/// Parses one input line; blank lines are ignored.
pub fn parse(line: &str) -> Option<Command> {
    let mut words = line.split_whitespace();
    let command = match words.next()? {
        "cancel" | "c" => match (words.next(), words.next()) {
            (Some("all"), None) => Command::CancelAll,
            (Some(id), None) => Command::CancelOne(id.to_string()),
            _ => Command::Unknown(line.trim().to_string()),
        },
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        _ => Command::Unknown(line.trim().to_string()),
    };
    Some(command)
}

/// Explains why `cancel <id>` would be ignored for the shown queue.
pub fn cancel_one_refusal(view: &QueueViewModel, id: &str) -> Option<String> {
    match view.row_for_upload(id) {
        Some(row) if row.offers_cancel() => None,
        Some(row) if row.complete => Some(format!("upload {id} has already finished")),
        Some(_) => Some(format!("upload {id} has already started")),
        None => Some(format!("no cancelable upload {id:?} in the queue")),
    }
}
