use clap::Parser;
use mailq_inspect::agent::DEFAULT_EXIM;
use mailq_inspect::operator::Terminal;
use mailq_inspect::{Action, Dispatcher, Exim, MessageId, Settings};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "mailq-inspect", version)]
#[command(about = "Step through the exim queue and act on one message at a time")]
struct Args {
    /// Message ids to inspect; the current queue is used when none are given
    ids: Vec<String>,

    /// Path to the exim binary
    #[arg(long, env = "EXIM", default_value = DEFAULT_EXIM)]
    exim: PathBuf,

    /// Action run whenever a new message becomes current
    #[arg(long, env = "DEFAULT_ACTION", value_enum, default_value_t = Action::Headers)]
    default_action: Action,

    /// Directory for saved messages [default: system temp directory]
    #[arg(long, env = "TMPDIR")]
    save_dir: Option<PathBuf>,
}

impl Args {
    fn settings(&self) -> Settings {
        let mut settings = Settings {
            default_action: self.default_action,
            ..Settings::default()
        };
        if let Some(dir) = &self.save_dir {
            settings.save_dir = dir.clone();
        }
        settings
    }
}

fn main() -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_env("MAILQ_INSPECT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let args = Args::parse();

    let settings = args.settings();

    let exim = Exim::new(args.exim);
    tracing::debug!("using {}", exim.program().display());

    let seed = args.ids.into_iter().map(MessageId::from).collect();
    let mut dispatcher = Dispatcher::new(exim, Terminal::new(), std::io::stdout(), settings);
    dispatcher.run(seed)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn parse(argv: &[&str]) -> Args {
        let argv = std::iter::once("mailq-inspect").chain(argv.iter().copied());
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_without_arguments() {
        let args = parse(&[]);
        assert!(args.ids.is_empty());
        if env::var_os("EXIM").is_none() {
            assert_eq!(args.exim, PathBuf::from("/usr/sbin/exim"));
        }
        if env::var_os("DEFAULT_ACTION").is_none() {
            assert_eq!(args.default_action, Action::Headers);
        }
        match env::var_os("TMPDIR").filter(|dir| !dir.is_empty()) {
            Some(dir) => assert_eq!(args.save_dir, Some(PathBuf::from(dir))),
            None => assert_eq!(args.settings().save_dir, env::temp_dir()),
        }
    }

    #[test]
    fn positional_ids_and_options() {
        let args = parse(&[
            "--default-action",
            "delete",
            "--exim",
            "/opt/exim/bin/exim",
            "--save-dir",
            "/var/tmp",
            "idA",
            "idB",
        ]);
        assert_eq!(args.ids, ["idA", "idB"]);
        assert_eq!(args.exim, PathBuf::from("/opt/exim/bin/exim"));

        let settings = args.settings();
        assert_eq!(settings.default_action, Action::Delete);
        assert_eq!(settings.save_dir, PathBuf::from("/var/tmp"));
    }

    #[test]
    fn unknown_default_action_is_rejected() {
        let argv = ["mailq-inspect", "--default-action", "purge"];
        assert!(Args::try_parse_from(argv).is_err());
    }

    #[test]
    fn options_are_bound_to_the_environment() {
        let command = <Args as clap::CommandFactory>::command();
        let env_of = |id: &str| {
            command
                .get_arguments()
                .find(|a| a.get_id() == id)
                .and_then(|a| a.get_env())
                .map(|e| e.to_string_lossy().into_owned())
        };
        assert_eq!(env_of("exim").as_deref(), Some("EXIM"));
        assert_eq!(env_of("default_action").as_deref(), Some("DEFAULT_ACTION"));
        assert_eq!(env_of("save_dir").as_deref(), Some("TMPDIR"));
    }
}
