#![cfg(unix)]

use mailq_inspect::agent::{AgentError, MailAgent, Sink};
use mailq_inspect::queue::list_pending_ids;
use mailq_inspect::{Action, Exim, MessageId};
use std::fs::{self, File};

// `echo` stands in for exim: it prints back the switches it was given.
const ECHO: &str = "/bin/echo";

#[test]
fn missing_binary_is_a_launch_error() {
    let exim = Exim::new("/nonexistent/sbin/exim");

    let err = exim.queue_listing().unwrap_err();
    assert!(matches!(err, AgentError::Launch { .. }));

    let err = exim
        .message_action(Action::Headers, &MessageId::from("idA"), Sink::Terminal)
        .unwrap_err();
    assert!(err.to_string().contains("/nonexistent/sbin/exim"));
}

#[test]
fn queue_listing_passes_verbose_and_bp() {
    let exim = Exim::new(ECHO);
    assert_eq!(exim.queue_listing().unwrap(), "-v -bp\n");
    assert!(list_pending_ids(&exim).unwrap().is_empty());
}

#[test]
fn file_sink_receives_child_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out");
    let id = MessageId::from("H6ab12-Q9zz31-7x");

    let status = Exim::new(ECHO)
        .message_action(Action::Save, &id, Sink::File(File::create(&path).unwrap()))
        .unwrap();

    assert!(status.success());
    assert_eq!(fs::read_to_string(&path).unwrap(), "-v -Mvc H6ab12-Q9zz31-7x\n");
}

#[test]
fn nonzero_exit_is_returned_not_raised() {
    let status = Exim::new("/bin/false")
        .message_action(Action::Thaw, &MessageId::from("idA"), Sink::Terminal)
        .unwrap();
    assert!(!status.success());
}
