use crate::queue::MessageId;
use clap::ValueEnum;
use std::fmt;
use std::path::{Path, PathBuf};

/// Prefix of every file written by [`Action::Save`].
pub const SAVE_PREFIX: &str = "mailq-inspect";

/// Single-message operations forwarded to the mail agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Action {
    Deliver,
    Log,
    Headers,
    Body,
    Complete,
    Delete,
    Freeze,
    Thaw,
    Save,
}

impl Action {
    pub const ALL: [Action; 9] = [
        Action::Deliver,
        Action::Log,
        Action::Headers,
        Action::Body,
        Action::Complete,
        Action::Delete,
        Action::Freeze,
        Action::Thaw,
        Action::Save,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Action::Deliver => "deliver",
            Action::Log => "log",
            Action::Headers => "headers",
            Action::Body => "body",
            Action::Complete => "complete",
            Action::Delete => "delete",
            Action::Freeze => "freeze",
            Action::Thaw => "thaw",
            Action::Save => "save",
        }
    }

    /// The exim switch placed before the message id.
    #[must_use]
    pub const fn switch(self) -> &'static str {
        match self {
            Action::Deliver => "-M",
            Action::Log => "-Mvl",
            Action::Headers => "-Mvh",
            Action::Body => "-Mvb",
            Action::Complete | Action::Save => "-Mvc",
            Action::Delete => "-Mrm",
            Action::Freeze => "-Mf",
            Action::Thaw => "-Mt",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `<dir>/mailq-inspect.<id>`
#[must_use]
pub fn save_path(dir: &Path, id: &MessageId) -> PathBuf {
    dir.join(format!("{SAVE_PREFIX}.{id}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_path_is_deterministic() {
        let id = MessageId::from("H6ab12-Q9zz31-7x");
        assert_eq!(
            save_path(Path::new("/tmp"), &id),
            PathBuf::from("/tmp/mailq-inspect.H6ab12-Q9zz31-7x")
        );
    }

    #[test]
    fn save_reads_complete_message() {
        assert_eq!(Action::Save.switch(), Action::Complete.switch());
    }

    #[test]
    fn names_parse_back_as_value_enum() {
        for action in Action::ALL {
            assert_eq!(Action::from_str(action.name(), false), Ok(action));
        }
        assert!(Action::from_str("purge", false).is_err());
    }
}
