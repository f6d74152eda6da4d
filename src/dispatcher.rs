//! Single-key command loop over the exim queue.

use crate::action::{save_path, Action};
use crate::agent::{AgentError, MailAgent, Sink};
use crate::config::Settings;
use crate::operator::Operator;
use crate::queue::{list_pending_ids, parse_entered_ids, MessageId};
use crate::session::Session;
use std::fs::File;
use std::io::{self, Write};
use std::process::ExitStatus;
use thiserror::Error;

pub const ID_PROMPT: &str = "Message ID: ";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Agent(#[from] AgentError),
    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),
}

pub type SessionResult<T> = Result<T, SessionError>;

// =============================================================================
// Commands
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Next,
    EnterIds,
    RefreshIds,
    Run(Action),
    Help,
    Quit,
}

/// Key bindings, in the order they are listed by `?`.
pub const COMMAND_KEYS: [(char, Command); 15] = [
    ('d', Command::Run(Action::Deliver)),
    ('l', Command::Run(Action::Log)),
    ('h', Command::Run(Action::Headers)),
    ('b', Command::Run(Action::Body)),
    ('c', Command::Run(Action::Complete)),
    ('D', Command::Run(Action::Delete)),
    ('f', Command::Run(Action::Freeze)),
    ('t', Command::Run(Action::Thaw)),
    ('s', Command::Run(Action::Save)),
    ('n', Command::Next),
    ('e', Command::EnterIds),
    ('r', Command::RefreshIds),
    // Historically bound to a misspelled refresh action that never resolved;
    // kept as an alias of `r`.
    ('Q', Command::RefreshIds),
    ('?', Command::Help),
    ('q', Command::Quit),
];

impl Command {
    #[must_use]
    pub fn from_key(key: char) -> Option<Self> {
        COMMAND_KEYS
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, command)| *command)
    }

    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            Command::Next => "next message",
            Command::EnterIds => "enter message ids",
            Command::RefreshIds => "reload ids from the queue",
            Command::Run(action) => action.name(),
            Command::Help => "show this list",
            Command::Quit => "quit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Owns the session and forwards operator commands to the mail agent.
///
/// Banners and prompts go to `out`; child processes write to the real
/// standard output, so `out` is flushed before every spawn.
pub struct Dispatcher<A, O, W> {
    agent: A,
    operator: O,
    out: W,
    settings: Settings,
    session: Session,
}

impl<A: MailAgent, O: Operator, W: Write> Dispatcher<A, O, W> {
    #[must_use]
    pub fn new(agent: A, operator: O, out: W, settings: Settings) -> Self {
        Self {
            agent,
            operator,
            out,
            settings,
            session: Session::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }

    pub fn operator(&self) -> &O {
        &self.operator
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Seeds the queue (from `seed`, or from exim when `seed` is empty),
    /// selects the first message and runs commands until quit or end of
    /// input.
    pub fn run(&mut self, seed: Vec<MessageId>) -> SessionResult<()> {
        let ids = if seed.is_empty() {
            list_pending_ids(&self.agent)?
        } else {
            seed
        };
        self.session.replace_pending(ids);

        if self.next_id()? == Flow::Quit {
            return Ok(());
        }

        loop {
            let prompt = self.prompt();
            let Some(key) = self.operator.read_key(&prompt)? else {
                return Ok(());
            };
            let Some(command) = Command::from_key(key) else {
                tracing::debug!("ignoring key {key:?}");
                continue;
            };
            if self.dispatch(command)? == Flow::Quit {
                tracing::debug!("operator quit");
                return Ok(());
            }
        }
    }

    fn dispatch(&mut self, command: Command) -> SessionResult<Flow> {
        match command {
            Command::Next => self.next_id(),
            Command::EnterIds => self.enter_ids(),
            Command::RefreshIds => self.refresh_ids(),
            Command::Help => {
                self.print_help()?;
                Ok(Flow::Continue)
            }
            Command::Quit => Ok(Flow::Quit),
            Command::Run(action) => {
                let Some(id) = self.session.current().cloned() else {
                    return self.next_id();
                };
                self.perform(action, &id)?;
                if action == Action::Delete {
                    return self.next_id();
                }
                Ok(Flow::Continue)
            }
        }
    }

    /// Selects the next pending id, asking the operator while none are left,
    /// and runs the default action on it.
    fn next_id(&mut self) -> SessionResult<Flow> {
        loop {
            if let Some(id) = self.session.advance().cloned() {
                self.perform(self.settings.default_action, &id)?;
                return Ok(Flow::Continue);
            }
            if !self.ask_for_ids()? {
                return Ok(Flow::Quit);
            }
        }
    }

    fn enter_ids(&mut self) -> SessionResult<Flow> {
        if !self.ask_for_ids()? {
            return Ok(Flow::Quit);
        }
        self.next_id()
    }

    fn refresh_ids(&mut self) -> SessionResult<Flow> {
        let ids = list_pending_ids(&self.agent)?;
        self.session.replace_pending(ids);
        self.next_id()
    }

    /// Replaces the pending queue with whatever the operator types.
    /// Returns false once input has ended.
    fn ask_for_ids(&mut self) -> SessionResult<bool> {
        let Some(line) = self.operator.read_line(ID_PROMPT)? else {
            return Ok(false);
        };
        let ids = parse_entered_ids(&line);
        for id in ids.iter().filter(|id| !id.is_well_formed()) {
            tracing::debug!("{id} does not look like an exim message id");
        }
        self.session.replace_pending(ids);
        Ok(true)
    }

    fn perform(&mut self, action: Action, id: &MessageId) -> SessionResult<()> {
        writeln!(self.out, ">>> {action} {id}")?;
        self.out.flush()?;

        let status = match action {
            Action::Save => self.save(id)?,
            _ => Some(self.agent.message_action(action, id, Sink::Terminal)?),
        };

        writeln!(self.out, "<<< {action} {id}{}", exit_note(status))?;
        self.out.flush()?;
        Ok(())
    }

    fn save(&mut self, id: &MessageId) -> SessionResult<Option<ExitStatus>> {
        let path = save_path(&self.settings.save_dir, id);
        let file = match File::create(&path) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!("cannot create {}: {e}", path.display());
                writeln!(self.out, "cannot write {}: {e}", path.display())?;
                return Ok(None);
            }
        };

        let status = self.agent.message_action(Action::Save, id, Sink::File(file))?;
        tracing::info!("saved {id} to {}", path.display());
        writeln!(self.out, "saved to {}", path.display())?;
        Ok(Some(status))
    }

    fn prompt(&self) -> String {
        let keys: String = COMMAND_KEYS.iter().map(|(k, _)| *k).collect();
        let current = self.session.current().map_or("-", MessageId::as_str);
        format!(
            "{current} [{} pending] ({keys}) > ",
            self.session.remaining()
        )
    }

    fn print_help(&mut self) -> io::Result<()> {
        for (key, command) in COMMAND_KEYS {
            match command {
                Command::Run(action) => writeln!(
                    self.out,
                    "  {key}  {:<26} exim -v {} <id>",
                    command.describe(),
                    action.switch()
                )?,
                _ => writeln!(self.out, "  {key}  {}", command.describe())?,
            }
        }
        self.out.flush()
    }
}

fn exit_note(status: Option<ExitStatus>) -> String {
    match status {
        Some(status) if !status.success() => match status.code() {
            Some(code) => format!(" (exit {code})"),
            None => format!(" ({status})"),
        },
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_action_has_a_key() {
        for action in Action::ALL {
            assert!(
                COMMAND_KEYS.iter().any(|(_, c)| *c == Command::Run(action)),
                "{action} has no key"
            );
        }
    }

    #[test]
    fn keys_are_unique() {
        for (i, (key, _)) in COMMAND_KEYS.iter().enumerate() {
            assert!(COMMAND_KEYS[i + 1..].iter().all(|(k, _)| k != key));
        }
    }

    #[test]
    fn capital_q_refreshes_and_lowercase_quits() {
        assert_eq!(Command::from_key('Q'), Some(Command::RefreshIds));
        assert_eq!(Command::from_key('q'), Some(Command::Quit));
        assert_eq!(Command::from_key('D'), Some(Command::Run(Action::Delete)));
        assert_eq!(Command::from_key('z'), None);
    }

    #[test]
    fn exit_note_only_for_failures() {
        assert_eq!(exit_note(None), "");
        assert_eq!(exit_note(Some(ExitStatus::default())), "");
    }

    #[cfg(unix)]
    #[test]
    fn exit_note_shows_failing_code_and_signal() {
        use std::os::unix::process::ExitStatusExt;

        assert_eq!(exit_note(Some(ExitStatus::from_raw(1 << 8))), " (exit 1)");
        let killed = exit_note(Some(ExitStatus::from_raw(9)));
        assert!(killed.contains("signal"), "{killed}");
    }
}
