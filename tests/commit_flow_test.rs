//! End-to-end tests for the `init` and `commit` flows with the OpenAI
//! provider, a recording HTTP client and an in-memory repository.

mod common;

use common::{MockRepo, RecordingHttpClient, no_env};
use gritty::config::{ConfigStore, StoredConfig};
use gritty::dispatcher::{CANDIDATE_COUNT, CommandDispatcher, CommitOutcome};
use gritty::error::GrittyError;
use gritty::provider::{ProviderContext, ProviderRegistry, SecretPrompt};
use std::io::Cursor;
use std::sync::Arc;
use tempfile::TempDir;

const DIFF: &str = "diff --git a/x b/x\n+hello";

struct TypedKey(&'static str);

impl SecretPrompt for TypedKey {
    fn read_secret(&self, _prompt: &str) -> Result<String, GrittyError> {
        Ok(self.0.to_string())
    }
}

fn openai_store(dir: &TempDir, api_key: &str) -> ConfigStore {
    let store = ConfigStore::at(dir.path().join(".gritty").join("config.yaml"));
    let settings = serde_yaml::from_str(&format!("apiKey: '{}'", api_key)).unwrap();
    store.save(&StoredConfig::new("openai", settings)).unwrap();
    store
}

fn context(http: &Arc<RecordingHttpClient>) -> ProviderContext {
    ProviderContext::new(http.clone()).with_env_lookup(no_env)
}

async fn commit(
    store: ConfigStore,
    http: &Arc<RecordingHttpClient>,
    repo: &MockRepo,
    answer: &str,
) -> (Result<CommitOutcome, GrittyError>, String) {
    let registry = ProviderRegistry::builtin().unwrap();
    let dispatcher = CommandDispatcher::new(&registry, store, context(http));
    let mut input = Cursor::new(answer.as_bytes().to_vec());
    let mut output = Vec::new();
    let result = dispatcher.commit_with_io(repo, &mut input, &mut output).await;
    (result, String::from_utf8(output).unwrap())
}

#[tokio::test]
async fn test_second_candidate_is_committed() {
    let dir = TempDir::new().unwrap();
    let http = Arc::new(RecordingHttpClient::completion(&[
        "fix: add hello",
        "feat: introduce x",
        "chore: update x",
    ]));
    let repo = MockRepo::with_diff(DIFF);

    let (result, output) = commit(openai_store(&dir, "sk-test"), &http, &repo, "2\n").await;

    assert_eq!(
        result.unwrap(),
        CommitOutcome::Committed("feat: introduce x".to_string())
    );
    assert_eq!(repo.commits(), vec!["feat: introduce x"]);
    assert_eq!(http.request_count(), 1);
    assert!(output.contains("1: fix: add hello"));
    assert!(output.contains("Commit created successfully"));
}

#[tokio::test]
async fn test_request_asks_for_candidate_count_and_embeds_diff() {
    let dir = TempDir::new().unwrap();
    let http = Arc::new(RecordingHttpClient::completion(&["fix: add hello"]));
    let repo = MockRepo::with_diff(DIFF);

    let _ = commit(openai_store(&dir, "sk-test"), &http, &repo, "\n").await;

    let requests = http.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["n"], CANDIDATE_COUNT);
    let user = requests[0]["messages"][1]["content"].as_str().unwrap();
    assert!(user.contains(DIFF));
}

#[tokio::test]
async fn test_blank_answer_exits_without_commit() {
    let dir = TempDir::new().unwrap();
    let http = Arc::new(RecordingHttpClient::completion(&[
        "fix: add hello",
        "feat: introduce x",
        "chore: update x",
    ]));
    let repo = MockRepo::with_diff(DIFF);

    let (result, output) = commit(openai_store(&dir, "sk-test"), &http, &repo, "\n").await;

    assert_eq!(result.unwrap(), CommitOutcome::NoSelection);
    assert!(repo.commits().is_empty());
    assert!(output.contains("No selection made"));
}

#[tokio::test]
async fn test_out_of_range_answer_exits_without_commit() {
    let dir = TempDir::new().unwrap();
    let http = Arc::new(RecordingHttpClient::completion(&["a", "b", "c"]));
    let repo = MockRepo::with_diff(DIFF);

    let (result, _) = commit(openai_store(&dir, "sk-test"), &http, &repo, "4\n").await;

    assert_eq!(result.unwrap(), CommitOutcome::InvalidSelection("4".to_string()));
    assert!(repo.commits().is_empty());
}

#[tokio::test]
async fn test_empty_diff_makes_no_network_call() {
    for diff in ["", "   \n\t  \n"] {
        let dir = TempDir::new().unwrap();
        let http = Arc::new(RecordingHttpClient::completion(&["unused"]));
        let repo = MockRepo::with_diff(diff);

        let (result, output) = commit(openai_store(&dir, "sk-test"), &http, &repo, "1\n").await;

        assert_eq!(result.unwrap(), CommitOutcome::NothingStaged);
        assert_eq!(http.request_count(), 0);
        assert!(repo.commits().is_empty());
        assert!(output.contains("No staged changes to commit"));
    }
}

#[tokio::test]
async fn test_missing_credential_fails_before_network() {
    let dir = TempDir::new().unwrap();
    let http = Arc::new(RecordingHttpClient::completion(&["unused"]));
    let repo = MockRepo::with_diff(DIFF);

    let (result, _) = commit(openai_store(&dir, ""), &http, &repo, "1\n").await;

    let err = result.unwrap_err();
    assert!(matches!(err, GrittyError::ConfigInvalid(_)), "got {err:?}");
    assert!(err.to_string().contains("invalid configuration"));
    assert_eq!(http.request_count(), 0);
    assert!(repo.commits().is_empty());
}

#[tokio::test]
async fn test_rejected_credential_is_auth_error() {
    let dir = TempDir::new().unwrap();
    let http = Arc::new(RecordingHttpClient::new(401, r#"{"error": "bad key"}"#));
    let repo = MockRepo::with_diff(DIFF);

    let (result, _) = commit(openai_store(&dir, "sk-revoked"), &http, &repo, "1\n").await;

    assert!(matches!(result, Err(GrittyError::Auth { status: 401 })));
    assert_eq!(http.request_count(), 1);
    assert!(repo.commits().is_empty());
}

#[tokio::test]
async fn test_rate_limited_request_reports_one_line() {
    let dir = TempDir::new().unwrap();
    let body = "{\n    \"error\": {\n        \"message\": \"Rate limit reached\",\n        \"code\": \"rate_limit_exceeded\"\n    }\n}\n";
    let http = Arc::new(RecordingHttpClient::new(429, body));
    let repo = MockRepo::with_diff(DIFF);

    let (result, _) = commit(openai_store(&dir, "sk-test"), &http, &repo, "1\n").await;

    let err = result.unwrap_err();
    assert!(matches!(err, GrittyError::Upstream { status: 429, .. }), "got {err:?}");
    let shown = err.to_string();
    assert_eq!(shown.lines().count(), 1, "{shown:?}");
    assert!(shown.contains("Rate limit reached"));
    assert!(repo.commits().is_empty());
}

#[tokio::test]
async fn test_outside_repository_makes_no_network_call() {
    let dir = TempDir::new().unwrap();
    let http = Arc::new(RecordingHttpClient::completion(&["unused"]));
    let repo = MockRepo {
        inside_repository: false,
        ..MockRepo::with_diff(DIFF)
    };

    let (result, _) = commit(openai_store(&dir, "sk-test"), &http, &repo, "1\n").await;

    assert!(matches!(result, Err(GrittyError::NotARepository)));
    assert_eq!(http.request_count(), 0);
}

#[tokio::test]
async fn test_init_then_commit_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::at(dir.path().join(".gritty").join("config.yaml"));
    let http = Arc::new(RecordingHttpClient::completion(&["fix: add hello"]));
    let registry = ProviderRegistry::builtin().unwrap();

    let openai_index = registry
        .names()
        .iter()
        .position(|n| *n == "openai")
        .unwrap()
        + 1;
    let dispatcher = CommandDispatcher::new(&registry, store.clone(), context(&http));
    let mut input = Cursor::new(format!("{}\n", openai_index).into_bytes());
    let mut output = Vec::new();
    let saved = dispatcher
        .init_with_io(&TypedKey(" sk-typed "), &mut input, &mut output)
        .unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded, saved);
    assert_eq!(loaded.provider, "openai");
    assert_eq!(loaded.config["apiKey"].as_str(), Some("sk-typed"));

    let repo = MockRepo::with_diff(DIFF);
    let (result, _) = commit(store, &http, &repo, "1\n").await;
    assert_eq!(result.unwrap(), CommitOutcome::Committed("fix: add hello".to_string()));
}

#[test]
fn test_init_blank_key_is_empty_input() {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::at(dir.path().join("config.yaml"));
    let http = Arc::new(RecordingHttpClient::completion(&[]));
    let registry = ProviderRegistry::builtin().unwrap();
    let dispatcher = CommandDispatcher::new(&registry, store.clone(), context(&http));
    let mut input = Cursor::new(b"1\n".to_vec());
    let mut output = Vec::new();

    let err = dispatcher
        .init_with_io(&TypedKey("  "), &mut input, &mut output)
        .unwrap_err();

    assert!(matches!(err, GrittyError::EmptyInput(_)));
    assert!(!store.exists());
}
