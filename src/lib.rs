pub mod action;
pub mod agent;
pub mod config;
pub mod dispatcher;
pub mod operator;
pub mod queue;
pub mod session;

pub use action::Action;
pub use agent::{Exim, MailAgent};
pub use config::Settings;
pub use dispatcher::Dispatcher;
pub use queue::MessageId;
