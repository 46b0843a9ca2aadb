//! Tests for session teardown and transcripts

mod common;

use common::{ScriptedProver, init_logging};
use coq_serapi::{Session, SessionOptions, Transcript, transcript_path_for};

#[tokio::test]
async fn close_returns_and_persists_the_transcript() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.serapi.json");
    let options = SessionOptions::builder().transcript_path(&path).build();

    let prover = ScriptedProver::new()
        .with_feedback()
        .with_stderr("Warning: deprecated option\n");
    let mut session = Session::with_transport(prover, options).await.unwrap();
    let result = session.execute_statement("Lemma t : True.").await.unwrap();
    let session_id = session.id().clone();
    let live_window = session.response_log().window(result.add_tag);

    let transcript = session.close().await.unwrap();
    assert_eq!(transcript.session_id, session_id);
    assert_eq!(transcript.sent, ["(Add () \"Lemma t : True.\")", "(Exec 2)"]);
    assert_eq!(transcript.stderr, "Warning: deprecated option\n");
    assert!(transcript.closed_at >= transcript.started_at);
    assert!(transcript.command_line.is_none());

    let loaded = Transcript::load(&path).unwrap();
    assert_eq!(loaded, transcript);
    assert_eq!(loaded.replay_log().window(result.add_tag), live_window);
}

#[tokio::test]
async fn transcript_json_uses_flat_arrays() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.json");

    let mut session = Session::with_transport(ScriptedProver::new(), SessionOptions::default())
        .await
        .unwrap();
    session.execute_statement("intros.").await.unwrap();
    let transcript = session.close().await.unwrap();
    transcript.save(&path).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["sent"][1], "(Exec 2)");
    assert_eq!(json["response"][0], "(Answer 0 Ack)");
    assert_eq!(json["stderr"], "");
    assert!(json.get("command_line").is_none());
}

#[tokio::test]
async fn dropping_an_open_session_still_writes_a_transcript() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dropped.serapi.json");
    let options = SessionOptions::builder().transcript_path(&path).build();

    let mut session = Session::with_transport(ScriptedProver::new().with_stderr("x"), options)
        .await
        .unwrap();
    session.execute_statement("intros.").await.unwrap();
    drop(session);

    let transcript = Transcript::load(&path).unwrap();
    assert_eq!(transcript.sent.len(), 2);
    assert_eq!(transcript.response.len(), 5);
    assert!(transcript.stderr.is_empty());
}

#[tokio::test]
async fn dead_session_can_still_be_closed() {
    init_logging();
    let mut session =
        Session::with_transport(ScriptedProver::new().hang_up_on(0), SessionOptions::default())
            .await
            .unwrap();
    assert!(session.add_completed("intros.").await.is_err());

    let transcript = session.close().await.unwrap();
    assert_eq!(transcript.response, ["(Answer 0 Ack)"]);
}

#[test]
fn transcript_path_sits_next_to_the_source() {
    let path = transcript_path_for(std::path::Path::new("/proj/theories/List.v"));
    assert_eq!(path, std::path::Path::new("/proj/theories/List.v.serapi.json"));
}
