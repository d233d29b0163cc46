#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    /// The line ended in a continuation marker; keep reading.
    Continue,
    Submit(String),
    Quit,
}

const CONTINUATION: char = '\\';
const QUIT_COMMANDS: [&str; 2] = ["/quit", "/exit"];

/// Assembles terminal lines into messages. A trailing backslash keeps the
/// message open and becomes a newline.
#[derive(Debug, Default)]
pub struct InputBuffer {
    pending: Vec<String>,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(&mut self, line: &str) -> InputAction {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if let Some(head) = line.strip_suffix(CONTINUATION) {
            self.pending.push(head.to_string());
            return InputAction::Continue;
        }

        if self.pending.is_empty() && QUIT_COMMANDS.contains(&line.trim()) {
            return InputAction::Quit;
        }

        self.pending.push(line.to_string());
        InputAction::Submit(self.drain())
    }

    /// Whatever was left open when input ended.
    pub fn take_pending(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.drain())
        }
    }

    fn drain(&mut self) -> String {
        std::mem::take(&mut self.pending).join("\n")
    }
}
