//! Tests for the synthesis request pipeline

mod common;

use common::{client_for, voice, FakeProvider};
use futures_util::future::join_all;
use monster_tts::{
    CredentialContext, JobRegistry, JobState, SynthesisPipeline, TtsError, TtsProvider, Voice,
};
use serde_json::json;
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::Notify;

fn pipeline(api_key: &str, provider: Arc<dyn TtsProvider>, dir: &Path) -> SynthesisPipeline {
    SynthesisPipeline::new(
        CredentialContext::new(api_key),
        provider,
        JobRegistry::new(None),
        dir.to_path_buf(),
    )
}

#[tokio::test]
async fn test_missing_credential_makes_no_network_calls() {
    let dir = tempfile::tempdir().unwrap();
    let fake = Arc::new(FakeProvider::with_audio(b"RIFF"));
    let pipeline = pipeline("", fake.clone(), dir.path());

    assert!(pipeline.request_tts(&voice("Ann"), "hello", true).await.is_none());
    assert_eq!(fake.network_calls(), 0);
    assert!(pipeline.registry().is_empty());

    let err = pipeline.try_request_tts(&voice("Ann"), "hello", true).await.unwrap_err();
    assert!(matches!(err, TtsError::Configuration(_)));
}

#[tokio::test]
async fn test_missing_voice_or_text_makes_no_network_calls() {
    let dir = tempfile::tempdir().unwrap();
    let fake = Arc::new(FakeProvider::with_audio(b"RIFF"));
    let pipeline = pipeline("key", fake.clone(), dir.path());

    assert!(pipeline.request_tts(&Voice::new("", "Nameless"), "hello", true).await.is_none());
    assert!(pipeline.request_tts(&voice("Ann"), "", false).await.is_none());

    let err = pipeline.try_request_tts(&voice("Ann"), "", true).await.unwrap_err();
    assert!(matches!(err, TtsError::Validation(_)));
    assert_eq!(fake.network_calls(), 0);
    assert!(pipeline.registry().is_empty());
}

#[tokio::test]
async fn test_waiting_request_writes_file_before_returning() {
    let dir = tempfile::tempdir().unwrap();
    let fake = Arc::new(FakeProvider::with_audio(&[9, 8, 7]));
    let pipeline = pipeline("key", fake.clone(), dir.path());

    let token = pipeline.request_tts(&voice("Ann"), "hello", true).await.unwrap();

    let job = pipeline.registry().get(&token).unwrap();
    assert!(job.is_finished());
    assert_eq!(job.target_path(), dir.path().join(format!("{}.wav", token)));
    assert_eq!(std::fs::read(job.target_path()).unwrap(), vec![9, 8, 7]);

    let requests = fake.requests.lock();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].voice_id.as_deref(), Some("id-ann"));
    assert_eq!(requests[0].message, "hello");
    assert!(requests[0].wait_for_completion);
}

#[tokio::test]
async fn test_waiting_request_against_http_provider() {
    let mut server = mockito::Server::new_async().await;
    let media_url = format!("{}/media/hello.wav", server.url());
    let _generate = server
        .mock("POST", "/generate")
        .match_header("authorization", "key")
        .with_status(200)
        .with_body(json!({ "url": media_url }).to_string())
        .create_async()
        .await;
    let _media = server
        .mock("GET", "/media/hello.wav")
        .with_status(200)
        .with_body(vec![1u8, 2, 3, 4, 5])
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let client = Arc::new(client_for(&server.url(), "key"));
    let pipeline = pipeline("key", client, dir.path());

    let token = pipeline.request_tts(&voice("Ann"), "hello", true).await.unwrap();

    let target = dir.path().join(format!("{}.wav", token));
    assert_eq!(std::fs::read(target).unwrap(), vec![1u8, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_waiting_request_failure_returns_none_but_stays_registered() {
    let dir = tempfile::tempdir().unwrap();
    let fake = Arc::new(FakeProvider {
        fail_synthesis: true,
        ..Default::default()
    });
    let pipeline = pipeline("key", fake.clone(), dir.path());

    assert!(pipeline.request_tts(&voice("Ann"), "hello", true).await.is_none());
    assert_eq!(fake.synth_calls.load(Ordering::SeqCst), 1);

    let tokens = pipeline.registry().tokens();
    assert_eq!(tokens.len(), 1);
    let job = pipeline.registry().get(&tokens[0]).unwrap();
    assert!(matches!(job.state(), JobState::Failed(_)));
}

#[tokio::test]
async fn test_fire_and_forget_returns_while_pending() {
    let dir = tempfile::tempdir().unwrap();
    let gate = Arc::new(Notify::new());
    let fake = Arc::new(FakeProvider {
        audio: b"RIFF".to_vec(),
        gate: Some(gate.clone()),
        ..Default::default()
    });
    let pipeline = pipeline("key", fake, dir.path());

    let token = pipeline.request_tts(&voice("Ann"), "hello", false).await.unwrap();
    let job = pipeline.registry().get(&token).unwrap();
    assert!(matches!(job.state(), JobState::Pending));

    gate.notify_one();
    let output = job.wait().await.unwrap().unwrap();

    assert!(matches!(job.state(), JobState::Completed(_)));
    assert_eq!(output.status, "ok");
    assert_eq!(std::fs::read(output.file_name).unwrap(), b"RIFF".to_vec());
}

#[tokio::test]
async fn test_fire_and_forget_failure_is_observable_through_job() {
    let dir = tempfile::tempdir().unwrap();
    let fake = Arc::new(FakeProvider {
        fail_synthesis: true,
        ..Default::default()
    });
    let pipeline = pipeline("key", fake, dir.path());

    let token = pipeline.request_tts(&voice("Ann"), "hello", false).await.unwrap();
    let job = pipeline.registry().get(&token).unwrap();

    let err = job.wait().await.unwrap_err();
    assert!(err.is_remote());
}

#[tokio::test]
async fn test_every_request_gets_a_distinct_token() {
    let dir = tempfile::tempdir().unwrap();
    let fake = Arc::new(FakeProvider::with_audio(b"RIFF"));
    let pipeline = pipeline("key", fake.clone(), dir.path());
    let ann = voice("Ann");

    // Identical voice and text on purpose
    let requests = (0..20).map(|_| pipeline.request_tts(&ann, "same words", false));
    let tokens: Vec<_> = join_all(requests).await.into_iter().map(Option::unwrap).collect();

    let unique: HashSet<_> = tokens.iter().cloned().collect();
    assert_eq!(unique.len(), 20);
    assert_eq!(pipeline.registry().len(), 20);
    for token in &tokens {
        let job = pipeline.registry().get(token).unwrap();
        assert!(job.wait().await.is_ok());
    }
    assert_eq!(fake.synth_calls.load(Ordering::SeqCst), 20);
}

#[tokio::test]
async fn test_directory_failure_makes_no_network_calls() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"file").unwrap();

    let fake = Arc::new(FakeProvider::with_audio(b"RIFF"));
    let pipeline = pipeline("key", fake.clone(), &blocker.join("tmp"));

    assert!(pipeline.request_tts(&voice("Ann"), "hello", true).await.is_none());
    assert_eq!(fake.network_calls(), 0);
    assert!(pipeline.registry().is_empty());

    let err = pipeline.try_request_tts(&voice("Ann"), "hello", true).await.unwrap_err();
    assert!(matches!(err, TtsError::Filesystem(_)));
}

#[tokio::test]
async fn test_output_directory_is_created_on_demand() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("cache").join("tmp");
    let fake = Arc::new(FakeProvider::with_audio(b"RIFF"));
    let pipeline = pipeline("key", fake, &nested);

    assert!(pipeline.request_tts(&voice("Ann"), "hello", true).await.is_some());
    assert!(nested.is_dir());
    assert_eq!(pipeline.output_dir(), nested.as_path());
}

#[tokio::test]
async fn test_credential_change_applies_to_next_request() {
    let dir = tempfile::tempdir().unwrap();
    let fake = Arc::new(FakeProvider::with_audio(b"RIFF"));
    let credential = CredentialContext::new("");
    let pipeline = SynthesisPipeline::new(
        credential.clone(),
        fake.clone(),
        JobRegistry::new(None),
        dir.path().to_path_buf(),
    );

    assert!(pipeline.request_tts(&voice("Ann"), "hello", true).await.is_none());

    credential.configure("fresh-key");
    assert!(pipeline.request_tts(&voice("Ann"), "hello", true).await.is_some());
    assert_eq!(fake.synth_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_finished_jobs_expire_on_next_registration() {
    let dir = tempfile::tempdir().unwrap();
    let fake = Arc::new(FakeProvider::with_audio(b"RIFF"));
    let pipeline = SynthesisPipeline::new(
        CredentialContext::new("key"),
        fake,
        JobRegistry::new(Some(std::time::Duration::ZERO)),
        dir.path().to_path_buf(),
    );

    let first = pipeline.request_tts(&voice("Ann"), "one", true).await.unwrap();
    let second = pipeline.request_tts(&voice("Ann"), "two", true).await.unwrap();

    assert!(pipeline.registry().get(&first).is_none());
    assert!(pipeline.registry().get(&second).is_some());
}
