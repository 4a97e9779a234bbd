use anyhow::Result;
use assert_fs::prelude::*;
use chutes::{
    ChutesClient, ChutesClientBuilder, ConfigStore, Decision, ModelRecord, Operator,
    commands::{self, CheckResult},
};
use mockall::{Sequence, mock};
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

mock! {
    pub Picker {}
    impl Operator for Picker {
        fn decide(&mut self, dead: &str, candidate: &ModelRecord) -> chutes::Result<Decision>;
    }
}

const CONFIG: &str = r#"# router settings
[router]
strategy = "round-robin"

[models]
all = ["p/a", "p/c"]
group_1 = ["p/c"]
group_2 = ["p/a", "p/c"]
"#;

fn live_model(id: &str, completion: f64) -> Value {
    json!({
        "id": id,
        "pricing": {"prompt": 0.1, "completion": completion},
        "supported_features": ["tools"]
    })
}

async fn inventory(models: Vec<Value>) -> (MockServer, ChutesClient) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": models })))
        .mount(&server)
        .await;
    let client = ChutesClientBuilder::new()
        .with_base_url(server.uri())
        .build()
        .expect("client");
    (server, client)
}

fn config_file(dir: &assert_fs::TempDir, text: &str) -> ConfigStore {
    let file = dir.child("config.toml");
    file.write_str(text).unwrap();
    ConfigStore::new(file.path())
}

#[tokio::test]
async fn test_all_live_never_prompts_or_writes() -> Result<()> {
    let (_server, client) =
        inventory(vec![live_model("p/a", 1.0), live_model("p/c", 2.0)]).await;
    let dir = assert_fs::TempDir::new()?;
    let store = config_file(&dir, CONFIG);

    let mut picker = MockPicker::new();
    picker.expect_decide().never();

    let result = commands::check(&client, &store, &mut picker).await?;

    assert_eq!(result, CheckResult::AllLive);
    dir.child("config.toml").assert(CONFIG);
    Ok(())
}

#[tokio::test]
async fn test_rejected_candidate_leaves_config_untouched() -> Result<()> {
    let (_server, client) =
        inventory(vec![live_model("p/a", 1.0), live_model("p/b", 2.0)]).await;
    let dir = assert_fs::TempDir::new()?;
    let store = config_file(&dir, CONFIG);

    let mut picker = MockPicker::new();
    picker
        .expect_decide()
        .withf(|dead, candidate| dead == "p/c" && candidate.id == "p/b")
        .times(1)
        .returning(|_, _| Ok(Decision::Reject));

    let result = commands::check(&client, &store, &mut picker).await?;

    match result {
        CheckResult::Unchanged(outcome) => {
            assert_eq!(outcome.missing, ["p/c"]);
            assert_eq!(outcome.unresolved, ["p/c"]);
            assert!(!outcome.stopped);
        }
        other => panic!("unexpected result: {other:?}"),
    }
    dir.child("config.toml").assert(CONFIG);
    Ok(())
}

#[tokio::test]
async fn test_accepted_replacement_rewrites_every_group() -> Result<()> {
    let (_server, client) = inventory(vec![
        live_model("q/x", 9.0),
        live_model("p/a", 1.0),
        live_model("p/b", 2.0),
        live_model("p/d", 4.0),
    ])
    .await;
    let dir = assert_fs::TempDir::new()?;
    let store = config_file(&dir, CONFIG);

    // same provider first, most expensive first: p/d, p/b, then q/x
    let mut seq = Sequence::new();
    let mut picker = MockPicker::new();
    picker
        .expect_decide()
        .withf(|_, candidate| candidate.id == "p/d")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(Decision::Reject));
    picker
        .expect_decide()
        .withf(|_, candidate| candidate.id == "p/b")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(Decision::Accept));

    let result = commands::check(&client, &store, &mut picker).await?;

    let replacements = result.replacements().expect("written");
    assert_eq!(replacements.get("p/c"), Some("p/b"));

    let saved = std::fs::read_to_string(dir.child("config.toml").path())?;
    assert_eq!(saved, CONFIG.replace("p/c", "p/b"));

    let reloaded = store.load()?;
    assert_eq!(reloaded.group(chutes::Group::All), ["p/a", "p/b"]);
    assert_eq!(reloaded.group(chutes::Group::Group1), ["p/b"]);
    assert_eq!(reloaded.group(chutes::Group::Group2), ["p/a", "p/b"]);
    Ok(())
}

#[tokio::test]
async fn test_stop_after_accept_still_saves() -> Result<()> {
    let (_server, client) = inventory(vec![live_model("p/a", 1.0), live_model("p/b", 2.0)]).await;
    let dir = assert_fs::TempDir::new()?;
    let store = config_file(
        &dir,
        "[models]\nall = [\"p/x\", \"p/y\", \"p/z\"]\ngroup_1 = [\"p/z\", \"p/x\"]\n",
    );

    let mut seq = Sequence::new();
    let mut picker = MockPicker::new();
    picker
        .expect_decide()
        .withf(|dead, candidate| dead == "p/x" && candidate.id == "p/b")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(Decision::Accept));
    picker
        .expect_decide()
        .withf(|dead, candidate| dead == "p/y" && candidate.id == "p/a")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(Decision::Stop));

    let result = commands::check(&client, &store, &mut picker).await?;

    match &result {
        CheckResult::Written(outcome) => {
            assert!(outcome.stopped);
            assert_eq!(outcome.replacements.len(), 1);
        }
        other => panic!("unexpected result: {other:?}"),
    }
    dir.child("config.toml").assert(
        "[models]\nall = [\"p/b\", \"p/y\", \"p/z\"]\ngroup_1 = [\"p/z\", \"p/b\"]\n",
    );
    Ok(())
}

#[tokio::test]
async fn test_remote_failure_aborts_before_config() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let client = ChutesClientBuilder::new()
        .with_base_url(server.uri())
        .build()?;
    let dir = assert_fs::TempDir::new()?;
    let store = config_file(&dir, CONFIG);

    let mut picker = MockPicker::new();
    picker.expect_decide().never();

    let err = commands::check(&client, &store, &mut picker)
        .await
        .unwrap_err();
    assert!(err.is_remote());
    dir.child("config.toml").assert(CONFIG);
    Ok(())
}

#[tokio::test]
async fn test_missing_config_is_config_error() -> Result<()> {
    let (_server, client) = inventory(vec![live_model("p/a", 1.0)]).await;
    let dir = assert_fs::TempDir::new()?;
    let store = ConfigStore::new(dir.path().join("config.toml"));

    let mut picker = MockPicker::new();
    picker.expect_decide().never();

    let err = commands::check(&client, &store, &mut picker)
        .await
        .unwrap_err();
    assert!(err.is_config());
    dir.child("config.toml").assert(predicate::path::missing());
    Ok(())
}

#[tokio::test]
async fn test_list_renders_sorted_table() -> Result<()> {
    let (_server, client) = inventory(vec![
        live_model("zai-org/GLM-4.5", 0.8),
        live_model("deepseek-ai/DeepSeek-V3", 1.05),
    ])
    .await;

    let table = commands::list(&client).await?;

    assert!(table.contains("Chutes Models (2)"));
    assert!(table.find("deepseek-ai/DeepSeek-V3") < table.find("zai-org/GLM-4.5"));
    assert!(table.contains("1.05"));
    assert!(table.contains("tools"));
    Ok(())
}

#[test]
fn test_show_config_lists_groups() -> Result<()> {
    let dir = assert_fs::TempDir::new()?;
    let store = config_file(&dir, CONFIG);

    let text = commands::show_config(&store)?;

    assert!(text.contains("(2):\n  p/a\n  p/c\n"));
    assert!(text.contains("(1):\n  p/c\n"));
    Ok(())
}
