use std::process::Command;

use tracing::{debug, warn};

use crate::config::NarratorConfig;

/// Reads accepted text aloud. Best effort: failures are logged, never raised.
pub trait Narrator {
    fn speak(&self, text: &str);
}

/// The first `max_chars` characters of `text`.
pub fn truncate_for_speech(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Runs an OS speech utility (`say`, `espeak`, ...) with the text as its only
/// argument and waits for it to finish.
pub struct CommandNarrator {
    program: String,
    max_chars: usize,
}

impl CommandNarrator {
    pub fn new(config: &NarratorConfig) -> Self {
        Self {
            program: config.command.clone(),
            max_chars: config.max_chars,
        }
    }

    fn command_for(&self, text: &str) -> Command {
        let mut command = Command::new(&self.program);
        command.arg(truncate_for_speech(text, self.max_chars));
        command
    }
}

impl Narrator for CommandNarrator {
    fn speak(&self, text: &str) {
        match self.command_for(text).status() {
            Ok(status) if status.success() => debug!(program = %self.program, "Narration finished"),
            Ok(status) => warn!(program = %self.program, %status, "Speech command failed"),
            Err(e) => warn!(program = %self.program, "Could not run speech command: {}", e),
        }
    }
}
