use crate::action::Action;
use std::path::PathBuf;

/// Knobs the dispatcher reads on every command.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Run each time a new message becomes current.
    pub default_action: Action,
    /// Directory that receives saved messages.
    pub save_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_action: Action::Headers,
            save_dir: std::env::temp_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_headers_in_the_temp_dir() {
        let settings = Settings::default();
        assert_eq!(settings.default_action, Action::Headers);
        assert_eq!(settings.save_dir, std::env::temp_dir());
    }
}
