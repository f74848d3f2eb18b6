//! Per-process cache of generated coin APIs.
//!
//! Entries are keyed by `"coin.chain"` and only ever added. Each key owns a
//! once-cell, so concurrent first requests for the same pair share a single
//! load → parse → generate run. A failed run leaves the cell empty and the
//! next request tries again.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::blueprint::{generate_api, parse_blueprint, BlueprintSource, GeneratedApi};
use crate::callback::with_callback;
use crate::error::CoreError;
use crate::rest::Transport;

pub const DEFAULT_CHAIN: &str = "main";

type Slot = Arc<OnceCell<Arc<GeneratedApi>>>;

pub struct CoinRegistry {
    source: Arc<dyn BlueprintSource>,
    transport: Arc<dyn Transport>,
    clients: Mutex<HashMap<String, Slot>>,
}

impl CoinRegistry {
    pub fn new(source: Arc<dyn BlueprintSource>, transport: Arc<dyn Transport>) -> Self {
        Self {
            source,
            transport,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Generated API for `name`/`chain` (default `main`).
    ///
    /// The cache key is `"{name}.{chain}"` with `name` lower-cased, so `BTC`
    /// and `btc` share one entry. `chain` is used as given.
    ///
    /// The token captured is the one passed by the call that performed the
    /// generation; later calls for the same pair get the cached API whatever
    /// token they pass.
    pub async fn coin(
        &self,
        name: &str,
        chain: Option<&str>,
        token: Option<&str>,
    ) -> Result<Arc<GeneratedApi>, CoreError> {
        let chain = chain.unwrap_or(DEFAULT_CHAIN);
        let key = format!("{}.{chain}", name.to_lowercase());

        let slot = {
            let mut clients = self.clients.lock().await;
            clients.entry(key.clone()).or_default().clone()
        };
        if let Some(api) = slot.get() {
            debug!(key = %key, "coin api cache hit");
            return Ok(api.clone());
        }

        let api = slot
            .get_or_try_init(|| self.generate(name, chain, token))
            .await?;
        Ok(api.clone())
    }

    /// Callback flavour of [`Self::coin`].
    pub fn coin_with_callback<F>(
        self: &Arc<Self>,
        name: &str,
        chain: Option<&str>,
        token: Option<&str>,
        callback: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(Result<Arc<GeneratedApi>, CoreError>) + Send + 'static,
    {
        let registry = Arc::clone(self);
        let name = name.to_owned();
        let chain = chain.map(str::to_owned);
        let token = token.map(str::to_owned);
        with_callback(
            async move {
                registry
                    .coin(&name, chain.as_deref(), token.as_deref())
                    .await
            },
            callback,
        )
    }

    /// Keys with a generated API, sorted.
    pub async fn cached_keys(&self) -> Vec<String> {
        let clients = self.clients.lock().await;
        let mut keys: Vec<String> = clients
            .iter()
            .filter(|(_, slot)| slot.initialized())
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    async fn generate(
        &self,
        name: &str,
        chain: &str,
        token: Option<&str>,
    ) -> Result<Arc<GeneratedApi>, CoreError> {
        let text = self.source.load().await?;
        let blueprint = parse_blueprint(&text)?;
        let api = generate_api(&blueprint, name, chain, token, self.transport.clone())?;
        info!(
            coin = %api.coin(),
            chain = %api.chain(),
            namespaces = api.namespaces().count(),
            "generated coin api"
        );
        Ok(Arc::new(api))
    }
}
