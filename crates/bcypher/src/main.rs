mod cli;

use std::sync::Arc;

use clap::Parser;
use eyre::{eyre, WrapErr};
use serde_json::{json, Map, Value};

use bcypher_core::blueprint::{BlueprintConfig, BlueprintLoader, GeneratedApi, MethodCall};
use bcypher_core::rest::{resolve_token, HttpTransport, Query, Transport};
use bcypher_core::{BlockCypher, CoinRegistry, CoreError};

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    let token = resolve_token(args.token.as_deref(), args.token_file.as_deref())
        .context("resolve API token")?;
    if token.is_none() {
        tracing::debug!("no API token configured; requests use the anonymous rate limit");
    }

    let transport: Arc<dyn Transport> = Arc::new(
        HttpTransport::new(&args.api_root, args.requests_per_second)
            .context("configure HTTP transport")?,
    );

    let output = run(&args, transport, token.as_deref())
        .await
        .map_err(|err| eyre!(format_api_error(&args.api_root, &err)))?;

    let rendered = serde_json::to_string_pretty(&output).context("render response")?;
    println!("{rendered}");
    Ok(())
}

async fn run(
    args: &Cli,
    transport: Arc<dyn Transport>,
    token: Option<&str>,
) -> Result<Value, CoreError> {
    let client = BlockCypher::new(transport.clone(), &args.coin, &args.chain, token);

    match &args.command {
        Command::Chain => client.get_chain().await,
        Command::Block {
            hash_or_height,
            txstart,
            limit,
        } => {
            let mut params = Query::new();
            if let Some(txstart) = txstart {
                params.insert("txstart".to_owned(), json!(txstart));
            }
            if let Some(limit) = limit {
                params.insert("limit".to_owned(), json!(limit));
            }
            client.get_block(hash_or_height, &params).await
        }
        Command::Addr {
            address,
            full,
            balance,
        } => {
            let params = Query::new();
            if *balance {
                client.get_addr_bal(address, &params).await
            } else if *full {
                client.get_addr_full(address, &params).await
            } else {
                client.get_addr(address, &params).await
            }
        }
        Command::Tx { hash } => client.get_tx(hash, &Query::new()).await,
        Command::TxConf { hash } => client.get_tx_conf(hash).await,
        Command::PushTx { hex } => client.push_tx(hex).await,
        Command::DecodeTx { hex } => client.decode_tx(hex).await,
        Command::Faucet { address, amount } => client.faucet(address, *amount).await,
        Command::Wallets { hd: false } => client.list_wallets().await,
        Command::Wallets { hd: true } => client.list_hd_wallets().await,
        Command::Hooks => client.list_hooks().await,
        Command::Describe => {
            let api = generated_api(args, transport, token).await?;
            Ok(describe(&api))
        }
        Command::Call {
            namespace,
            method,
            args: call_args,
            data,
        } => {
            let data = data.as_deref().map(parse_data).transpose()?;
            let api = generated_api(args, transport, token).await?;

            let mut call = MethodCall::new();
            for arg in call_args {
                call = call.arg(arg);
            }
            if let Some(data) = data {
                call = call.data(data);
            }
            api.call(namespace, method, call).await
        }
    }
}

async fn generated_api(
    args: &Cli,
    transport: Arc<dyn Transport>,
    token: Option<&str>,
) -> Result<Arc<GeneratedApi>, CoreError> {
    let loader = BlueprintLoader::new(BlueprintConfig {
        override_path: args.blueprint.clone(),
        ..BlueprintConfig::default()
    })?;
    let registry = CoinRegistry::new(Arc::new(loader), transport);
    registry.coin(&args.coin, Some(&args.chain), token).await
}

/// `{namespace: {method: {verb, uri_template, parameters: [{name, required, description}]}}}`
fn describe(api: &GeneratedApi) -> Value {
    let namespaces: Map<String, Value> = api
        .namespaces()
        .map(|(name, namespace)| {
            let methods: Map<String, Value> = namespace
                .method_names()
                .filter_map(|method| namespace.get(method))
                .map(|method| {
                    let parameters: Vec<Value> = method
                        .parameters()
                        .iter()
                        .map(|param| {
                            json!({
                                "name": param.name,
                                "required": param.required,
                                "description": param.description,
                            })
                        })
                        .collect();
                    let entry = json!({
                        "verb": method.verb().as_str(),
                        "uri_template": method.uri_template(),
                        "parameters": parameters,
                    });
                    (method.name().to_owned(), entry)
                })
                .collect();
            (name.to_owned(), Value::Object(methods))
        })
        .collect();
    Value::Object(namespaces)
}

fn parse_data(raw: &str) -> Result<Query, CoreError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(CoreError::InvalidConfig(
            "--data must be a JSON object".to_owned(),
        )),
        Err(e) => Err(CoreError::InvalidConfig(format!("--data is not valid JSON: {e}"))),
    }
}

fn format_api_error(api_root: &str, err: &CoreError) -> String {
    let mut lines = vec![format!("request against `{api_root}` failed"), format!("error: {err}")];

    if let Some(body) = err.response_body().filter(|body| !is_empty_object(body)) {
        lines.push(format!("response body: {body}"));
    }

    match err.status() {
        Some(401) | Some(403) => lines.push(
            "hint: the API rejected the token; verify --token or --token-file".into(),
        ),
        Some(404) => lines.push(
            "hint: resource not found; verify --coin/--chain and the identifier".into(),
        ),
        Some(429) => lines.push(
            "hint: rate limited; pass a token or lower --requests-per-second".into(),
        ),
        _ => {}
    }
    if matches!(err, CoreError::BlueprintFetch(_)) {
        lines.push("hint: point --blueprint at a local copy of the API Blueprint".into());
    }

    lines.join("\n")
}

fn is_empty_object(value: &Value) -> bool {
    value.as_object().is_some_and(Map::is_empty)
}
