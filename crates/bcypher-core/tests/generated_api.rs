use std::sync::{Arc, Once};

use bcypher_core::blueprint::{BlueprintConfig, BlueprintLoader, MethodCall, BLUEPRINT_FILE};
use bcypher_core::rest::{HttpTransport, Query};
use bcypher_core::CoinRegistry;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FIXTURE: &str = include_str!("fixtures/blockcypher-api-v1.md");

static TRACING_INIT: Once = Once::new();

fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("bcypher_core=debug")),
            )
            .with_target(true)
            .with_test_writer()
            .try_init();
    });
}

async fn registry(server: &MockServer, cache: &tempfile::TempDir) -> CoinRegistry {
    init_tracing();
    Mock::given(method("GET"))
        .and(path(format!("/{BLUEPRINT_FILE}")))
        .respond_with(ResponseTemplate::new(200).set_body_string(FIXTURE))
        .expect(1)
        .mount(server)
        .await;

    let loader = BlueprintLoader::new(BlueprintConfig {
        override_path: None,
        cache_dir: cache.path().to_path_buf(),
        remote_url: format!("{}/{BLUEPRINT_FILE}", server.uri()),
    })
    .expect("loader must build");
    let transport = HttpTransport::new(&server.uri(), None).expect("transport must build");
    CoinRegistry::new(Arc::new(loader), Arc::new(transport))
}

#[tokio::test]
async fn generated_methods_reach_the_api() {
    let server = MockServer::start().await;
    let cache = tempfile::tempdir().expect("tempdir");
    let registry = registry(&server, &cache).await;

    Mock::given(method("GET"))
        .and(path("/v1/btc/main/blocks/12345"))
        .and(query_param("token", "tok"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "height": 12345 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/btc/main/wallets/myWallet"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/btc/main/wallets"))
        .and(body_json(json!({ "name": "alice" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "name": "alice" })))
        .expect(1)
        .mount(&server)
        .await;

    let api = registry
        .coin("BTC", None, Some("tok"))
        .await
        .expect("generation must succeed");

    let mut query = Query::new();
    query.insert("limit".into(), json!(2));
    let block = api
        .call("blocks", "get", MethodCall::new().arg(12345).data(query))
        .await
        .expect("block must load");
    assert_eq!(block["height"], 12345);

    let removed = api
        .call("wallets", "remove", MethodCall::new().arg("myWallet"))
        .await
        .expect("delete must succeed");
    assert_eq!(removed, json!({}));

    let mut wallet = Query::new();
    wallet.insert("name".into(), json!("alice"));
    let created = api
        .call("wallets", "create", MethodCall::new().data(wallet))
        .await
        .expect("create must succeed");
    assert_eq!(created["name"], "alice");

    let again = registry.coin("BTC", Some("main"), None).await.unwrap();
    assert!(Arc::ptr_eq(&api, &again));
}

#[tokio::test]
async fn fixture_yields_expected_method_table() {
    let server = MockServer::start().await;
    let cache = tempfile::tempdir().expect("tempdir");
    let registry = registry(&server, &cache).await;

    let api = registry.coin("btc", Some("test3"), None).await.unwrap();
    let table: Vec<(String, Vec<String>)> = api
        .namespaces()
        .map(|(name, ns)| (name.to_owned(), ns.method_names().map(str::to_owned).collect()))
        .collect();

    let expected: Vec<(String, Vec<String>)> = [
        ("addresses", vec!["balance", "create", "get"]),
        ("blocks", vec!["get"]),
        ("chains", vec!["get"]),
        ("transactions", vec!["get", "list", "push"]),
        ("wallets", vec!["create", "generate", "get", "list", "remove"]),
    ]
    .into_iter()
    .map(|(ns, methods)| (ns.to_owned(), methods.into_iter().map(str::to_owned).collect()))
    .collect();
    assert_eq!(table, expected);
}
