use std::io::{self, Write};

use crossterm::cursor::MoveToColumn;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};

use crate::error::{AskbotError, Result};
use crate::message::{Message, Sender};

const TYPING_LABEL: &str = "typing...";
const PROMPT: &str = "> ";

/// Where the conversation is drawn. Only the controller's event loop calls
/// into a surface, so implementations need no synchronization.
pub trait ChatSurface {
    fn append(&mut self, message: &Message) -> Result<()>;
    fn clear_input(&mut self) -> Result<()>;
    fn show_typing(&mut self) -> Result<()>;
    fn hide_typing(&mut self) -> Result<()>;

    fn prompt(&mut self) -> Result<()> {
        Ok(())
    }
}

fn io_err(err: io::Error) -> AskbotError {
    AskbotError::Runtime(err.to_string())
}

/// Line-oriented renderer for a cooked-mode terminal. The typing indicator
/// is a complete line of its own, so text the tty echoes while a reply is
/// pending lands below it instead of on it. While replies are pending the
/// indicator is drawn again under every new bubble.
pub struct TerminalSurface<W: Write> {
    out: W,
    typing_visible: bool,
}

impl TerminalSurface<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            typing_visible: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Drops the prompt (and anything left on the cursor line) before a
    /// bubble is drawn at column zero.
    fn clear_cursor_line(&mut self) -> io::Result<()> {
        queue!(self.out, MoveToColumn(0), Clear(ClearType::CurrentLine))
    }

    fn write_bubble(&mut self, message: &Message) -> io::Result<()> {
        let sender = message.sender();
        let mut lines = message.text().lines();
        let first = lines.next().unwrap_or("");
        writeln!(self.out, "{} {}", sender.avatar(), first)?;
        for line in lines {
            writeln!(self.out, "   {line}")?;
        }
        writeln!(self.out, "   {}", message.timestamp())
    }

    fn write_typing(&mut self) -> io::Result<()> {
        writeln!(self.out, "{} {}", Sender::Ai.avatar(), TYPING_LABEL)
    }
}

impl<W: Write> ChatSurface for TerminalSurface<W> {
    fn append(&mut self, message: &Message) -> Result<()> {
        self.clear_cursor_line().map_err(io_err)?;
        self.write_bubble(message).map_err(io_err)?;
        if self.typing_visible {
            self.write_typing().map_err(io_err)?;
        }
        self.out.flush().map_err(io_err)
    }

    fn clear_input(&mut self) -> Result<()> {
        // The terminal line discipline already consumed the submitted line.
        Ok(())
    }

    fn show_typing(&mut self) -> Result<()> {
        if self.typing_visible {
            return Ok(());
        }
        self.typing_visible = true;
        self.write_typing().map_err(io_err)?;
        self.out.flush().map_err(io_err)
    }

    fn hide_typing(&mut self) -> Result<()> {
        // Nothing to erase: the next bubble simply is not followed by the
        // indicator line.
        self.typing_visible = false;
        Ok(())
    }

    fn prompt(&mut self) -> Result<()> {
        self.out.write_all(PROMPT.as_bytes()).map_err(io_err)?;
        self.out.flush().map_err(io_err)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Appended(Message),
    InputCleared,
    TypingShown,
    TypingHidden,
}

/// Keeps every call in order. Used by tests and by callers that render
/// elsewhere.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    events: Vec<SurfaceEvent>,
    typing_visible: bool,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[SurfaceEvent] {
        &self.events
    }

    pub fn typing_visible(&self) -> bool {
        self.typing_visible
    }

    pub fn appended(&self) -> Vec<&Message> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SurfaceEvent::Appended(message) => Some(message),
                _ => None,
            })
            .collect()
    }
}

impl ChatSurface for RecordingSurface {
    fn append(&mut self, message: &Message) -> Result<()> {
        self.events.push(SurfaceEvent::Appended(message.clone()));
        Ok(())
    }

    fn clear_input(&mut self) -> Result<()> {
        self.events.push(SurfaceEvent::InputCleared);
        Ok(())
    }

    fn show_typing(&mut self) -> Result<()> {
        self.typing_visible = true;
        self.events.push(SurfaceEvent::TypingShown);
        Ok(())
    }

    fn hide_typing(&mut self) -> Result<()> {
        self.typing_visible = false;
        self.events.push(SurfaceEvent::TypingHidden);
        Ok(())
    }
}
