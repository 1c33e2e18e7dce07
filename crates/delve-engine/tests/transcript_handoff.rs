//! Integration test: transcript recordings across resets.
//!
//! The scripted engine appends `episode N`, `step A`, `done` and `end`
//! lines to whatever recording it holds, and flushes `end` into the old
//! recording while switching to a new one. Every byte must land in the
//! file of the episode that produced it.

use std::fs;

use delve_core::{SessionConfig, SessionError, SessionState};
use delve_engine::Session;
use delve_test_utils::{Script, ScriptedBackend};

#[test]
fn swapping_recordings_keeps_every_byte() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("ep1.ttyrec");
    let second = dir.path().join("ep2.ttyrec");

    let backend = ScriptedBackend::new(Script::default().episode_length(2));
    let mut s = Session::new(backend, SessionConfig::new("scripted").transcript(&first)).unwrap();
    s.reset().unwrap();
    s.step(4).unwrap();
    s.step(5).unwrap();
    assert!(s.done());

    s.reset_with_transcript(&second).unwrap();
    assert_eq!(s.settings().transcript_name.as_str(), "ep2.ttyrec");
    assert_eq!(s.transcript().path(), Some(second.as_path()));
    s.step(6).unwrap();
    s.close();

    assert_eq!(
        fs::read_to_string(&first).unwrap(),
        "episode 1\nstep 4\nstep 5\ndone\nend\n"
    );
    assert_eq!(
        fs::read_to_string(&second).unwrap(),
        "episode 2\nstep 6\nend\n"
    );
}

#[test]
fn existing_recording_is_appended_to() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.ttyrec");
    fs::write(&path, "previous run\n").unwrap();

    let mut s = Session::new(
        ScriptedBackend::default(),
        SessionConfig::new("scripted").transcript(&path),
    )
    .unwrap();
    s.reset().unwrap();
    assert_eq!(s.transcript().bytes_on_disk().unwrap(), Some(23));
    drop(s);

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "previous run\nepisode 1\nend\n"
    );
}

#[test]
fn plain_reset_keeps_recording_into_the_same_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("same.ttyrec");
    let backend = ScriptedBackend::new(Script::default().episode_length(1));
    let calls = backend.calls();
    let mut s = Session::new(backend, SessionConfig::new("scripted").transcript(&path)).unwrap();

    s.reset().unwrap();
    s.step(0).unwrap();
    s.reset().unwrap();
    s.close();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "episode 1\nstep 0\ndone\nepisode 2\nend\n"
    );
    assert_eq!(calls.snapshot().transcript_names, vec!["", ""]);
}

#[test]
fn unopenable_path_keeps_the_old_recording() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("keep.ttyrec");
    let backend = ScriptedBackend::default();
    let calls = backend.calls();
    let mut s = Session::new(backend, SessionConfig::new("scripted")).unwrap();
    s.reset_with_transcript(&first).unwrap();

    let err = s
        .reset_with_transcript(dir.path().join("no").join("such.ttyrec"))
        .unwrap_err();
    assert!(matches!(err, SessionError::Io { .. }));
    assert_eq!(s.transcript().path(), Some(first.as_path()));
    assert_eq!(s.settings().transcript_name.as_str(), "keep.ttyrec");
    assert_eq!(calls.snapshot().resets, 0);
    assert_eq!(s.state(), SessionState::Ready);
}

#[test]
fn oversized_name_is_rejected_before_creating_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = Session::new(ScriptedBackend::default(), SessionConfig::new("scripted")).unwrap();
    let long = dir.path().join("x".repeat(5000));
    let err = s.reset_with_transcript(&long).unwrap_err();
    assert!(matches!(err, SessionError::PathTooLong { .. }));
    assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
}

#[cfg(unix)]
#[test]
fn non_utf8_name_is_rejected_before_creating_the_file() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempfile::tempdir().unwrap();
    let keep = dir.path().join("keep.ttyrec");
    let backend = ScriptedBackend::default();
    let calls = backend.calls();
    let mut s = Session::new(backend, SessionConfig::new("scripted")).unwrap();
    s.reset_with_transcript(&keep).unwrap();

    let bad = dir.path().join(OsStr::from_bytes(b"ep\xff.ttyrec"));
    let err = s.reset_with_transcript(&bad).unwrap_err();
    assert!(matches!(err, SessionError::NonUtf8Name { .. }));
    assert!(!bad.exists());
    assert_eq!(s.settings().transcript_name.as_str(), "keep.ttyrec");
    assert_eq!(s.transcript().path(), Some(keep.as_path()));
    assert_eq!(calls.snapshot().starts, 1);
    assert_eq!(calls.snapshot().resets, 0);
}

#[test]
fn close_twice_is_a_no_op() {
    let backend = ScriptedBackend::default();
    let calls = backend.calls();
    let mut s = Session::new(backend, SessionConfig::new("scripted")).unwrap();
    s.reset().unwrap();
    s.close();
    s.close();
    assert_eq!(calls.snapshot().ends, 1);
    assert!(matches!(
        s.step(0),
        Err(SessionError::Lifecycle {
            state: SessionState::Closed,
            ..
        })
    ));
}
