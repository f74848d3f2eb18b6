//! Hand-written BlockCypher endpoint client.
//!
//! One method per REST endpoint. Every method funnels through [`BlockCypher::get`],
//! [`BlockCypher::post`] or [`BlockCypher::del`], which prefix the
//! `/v1/{coin}/{chain}` root and merge the API token into the query.

use std::fmt::Display;
use std::sync::Arc;

use reqwest::Method;
use serde_json::{json, Value};

use crate::error::CoreError;
use crate::rest::{ApiRequest, Query, Transport};

const API_VERSION: &str = "v1";

pub struct BlockCypher {
    transport: Arc<dyn Transport>,
    coin: String,
    chain: String,
    token: Option<String>,
}

impl BlockCypher {
    pub fn new(transport: Arc<dyn Transport>, coin: &str, chain: &str, token: Option<&str>) -> Self {
        Self {
            transport,
            coin: coin.to_lowercase(),
            chain: chain.to_owned(),
            token: token.map(str::to_owned),
        }
    }

    pub fn coin(&self) -> &str {
        &self.coin
    }

    pub fn chain(&self) -> &str {
        &self.chain
    }

    // ========================================================================
    // Request helpers
    // ========================================================================

    fn endpoint(&self, path: &str) -> String {
        format!("/{API_VERSION}/{}/{}{path}", self.coin, self.chain)
    }

    fn query(&self, params: &Query) -> Query {
        let mut query = params.clone();
        if let Some(token) = &self.token {
            query.insert("token".to_owned(), Value::String(token.clone()));
        }
        query
    }

    /// `GET` a path below the coin/chain root. Succeeds on 200.
    pub async fn get(&self, path: &str, params: &Query) -> Result<Value, CoreError> {
        let request = ApiRequest::new(Method::GET, self.endpoint(path)).with_query(self.query(params));
        self.transport.send(request).await
    }

    /// `POST` a JSON body. Succeeds on 200 or 201.
    pub async fn post(&self, path: &str, params: &Query, body: Value) -> Result<Value, CoreError> {
        let request = ApiRequest::new(Method::POST, self.endpoint(path))
            .with_query(self.query(params))
            .with_body(Some(body));
        self.transport.send(request).await
    }

    /// `DELETE` a path. Succeeds on 204 (or 200).
    pub async fn del(&self, path: &str, params: &Query) -> Result<Value, CoreError> {
        let request =
            ApiRequest::new(Method::DELETE, self.endpoint(path)).with_query(self.query(params));
        self.transport.send(request).await
    }

    // ========================================================================
    // Blockchain
    // ========================================================================

    pub async fn get_chain(&self) -> Result<Value, CoreError> {
        self.get("", &Query::new()).await
    }

    /// Fetch a block by hash or height.
    pub async fn get_block(
        &self,
        hash_or_height: impl Display,
        params: &Query,
    ) -> Result<Value, CoreError> {
        let path = format!("/blocks/{}", segment(hash_or_height));
        self.get(&path, params).await
    }

    // ========================================================================
    // Addresses
    // ========================================================================

    pub async fn get_addr_bal(&self, addr: &str, params: &Query) -> Result<Value, CoreError> {
        self.get(&format!("/addrs/{}/balance", segment(addr)), params)
            .await
    }

    pub async fn get_addr(&self, addr: &str, params: &Query) -> Result<Value, CoreError> {
        self.get(&format!("/addrs/{}", segment(addr)), params).await
    }

    pub async fn get_addr_full(&self, addr: &str, params: &Query) -> Result<Value, CoreError> {
        self.get(&format!("/addrs/{}/full", segment(addr)), params)
            .await
    }

    /// Generate a new address keypair. `data` may carry multisig parameters.
    pub async fn gen_addr(&self, data: Value) -> Result<Value, CoreError> {
        self.post("/addrs", &Query::new(), data).await
    }

    /// Fund an address on a test chain.
    pub async fn faucet(&self, addr: &str, amount: u64) -> Result<Value, CoreError> {
        self.post(
            "/faucet",
            &Query::new(),
            json!({ "address": addr, "amount": amount }),
        )
        .await
    }

    // ========================================================================
    // Wallets
    // ========================================================================

    pub async fn create_wallet(&self, data: Value) -> Result<Value, CoreError> {
        self.post("/wallets", &Query::new(), data).await
    }

    pub async fn create_hd_wallet(&self, data: Value) -> Result<Value, CoreError> {
        self.post("/wallets/hd", &Query::new(), data).await
    }

    pub async fn list_wallets(&self) -> Result<Value, CoreError> {
        self.get("/wallets", &Query::new()).await
    }

    pub async fn list_hd_wallets(&self) -> Result<Value, CoreError> {
        self.get("/wallets/hd", &Query::new()).await
    }

    pub async fn get_wallet(&self, name: &str) -> Result<Value, CoreError> {
        self.get(&format!("/wallets/{}", segment(name)), &Query::new())
            .await
    }

    pub async fn get_hd_wallet(&self, name: &str) -> Result<Value, CoreError> {
        self.get(&format!("/wallets/hd/{}", segment(name)), &Query::new())
            .await
    }

    pub async fn del_wallet(&self, name: &str) -> Result<Value, CoreError> {
        self.del(&format!("/wallets/{}", segment(name)), &Query::new())
            .await
    }

    pub async fn del_hd_wallet(&self, name: &str) -> Result<Value, CoreError> {
        self.del(&format!("/wallets/hd/{}", segment(name)), &Query::new())
            .await
    }

    pub async fn add_addr_wallet(&self, name: &str, addrs: &[&str]) -> Result<Value, CoreError> {
        self.post(
            &format!("/wallets/{}/addresses", segment(name)),
            &Query::new(),
            json!({ "addresses": addrs }),
        )
        .await
    }

    pub async fn get_addrs_wallet(&self, name: &str) -> Result<Value, CoreError> {
        self.get(&format!("/wallets/{}/addresses", segment(name)), &Query::new())
            .await
    }

    pub async fn get_addrs_hd_wallet(&self, name: &str, params: &Query) -> Result<Value, CoreError> {
        self.get(&format!("/wallets/hd/{}/addresses", segment(name)), params)
            .await
    }

    /// Remove addresses from a wallet. The API takes them `;`-joined in the
    /// `address` query parameter.
    pub async fn del_addrs_wallet(&self, name: &str, addrs: &[&str]) -> Result<Value, CoreError> {
        let mut params = Query::new();
        params.insert("address".to_owned(), Value::String(addrs.join(";")));
        self.del(&format!("/wallets/{}/addresses", segment(name)), &params)
            .await
    }

    pub async fn gen_addr_wallet(&self, name: &str) -> Result<Value, CoreError> {
        self.post(
            &format!("/wallets/{}/addresses/generate", segment(name)),
            &Query::new(),
            json!({}),
        )
        .await
    }

    pub async fn derive_addr_hd_wallet(
        &self,
        name: &str,
        params: &Query,
    ) -> Result<Value, CoreError> {
        self.post(
            &format!("/wallets/hd/{}/addresses/derive", segment(name)),
            params,
            json!({}),
        )
        .await
    }

    // ========================================================================
    // Transactions
    // ========================================================================

    pub async fn get_tx(&self, hash: &str, params: &Query) -> Result<Value, CoreError> {
        self.get(&format!("/txs/{}", segment(hash)), params).await
    }

    /// Unconfirmed transactions currently in the mempool.
    pub async fn get_un_txs(&self) -> Result<Value, CoreError> {
        self.get("/txs", &Query::new()).await
    }

    pub async fn new_tx(&self, tx: Value) -> Result<Value, CoreError> {
        self.post("/txs/new", &Query::new(), tx).await
    }

    /// Send a signed transaction skeleton returned by [`Self::new_tx`].
    pub async fn send_tx(&self, txskel: Value) -> Result<Value, CoreError> {
        self.post("/txs/send", &Query::new(), txskel).await
    }

    pub async fn push_tx(&self, hex: &str) -> Result<Value, CoreError> {
        self.post("/txs/push", &Query::new(), json!({ "tx": hex }))
            .await
    }

    pub async fn decode_tx(&self, hex: &str) -> Result<Value, CoreError> {
        self.post("/txs/decode", &Query::new(), json!({ "tx": hex }))
            .await
    }

    pub async fn embed_data(&self, hex: &str) -> Result<Value, CoreError> {
        self.post("/txs/data", &Query::new(), json!({ "data": hex }))
            .await
    }

    pub async fn send_micro(&self, micro: Value) -> Result<Value, CoreError> {
        self.post("/txs/micro", &Query::new(), micro).await
    }

    pub async fn get_tx_conf(&self, hash: &str) -> Result<Value, CoreError> {
        self.get(&format!("/txs/{}/confidence", segment(hash)), &Query::new())
            .await
    }

    // ========================================================================
    // Payment forwarding
    // ========================================================================

    pub async fn create_pay_fwd(&self, data: Value) -> Result<Value, CoreError> {
        self.post("/payments", &Query::new(), data).await
    }

    pub async fn list_pay_fwds(&self) -> Result<Value, CoreError> {
        self.get("/payments", &Query::new()).await
    }

    pub async fn get_pay_fwd(&self, id: &str) -> Result<Value, CoreError> {
        self.get(&format!("/payments/{}", segment(id)), &Query::new())
            .await
    }

    pub async fn del_pay_fwd(&self, id: &str) -> Result<Value, CoreError> {
        self.del(&format!("/payments/{}", segment(id)), &Query::new())
            .await
    }

    // ========================================================================
    // Hooks
    // ========================================================================

    pub async fn create_hook(&self, data: Value) -> Result<Value, CoreError> {
        self.post("/hooks", &Query::new(), data).await
    }

    pub async fn list_hooks(&self) -> Result<Value, CoreError> {
        self.get("/hooks", &Query::new()).await
    }

    pub async fn get_hook(&self, id: &str) -> Result<Value, CoreError> {
        self.get(&format!("/hooks/{}", segment(id)), &Query::new())
            .await
    }

    pub async fn del_hook(&self, id: &str) -> Result<Value, CoreError> {
        self.del(&format!("/hooks/{}", segment(id)), &Query::new())
            .await
    }
}

/// Percent-encode a caller-supplied path segment.
fn segment(value: impl Display) -> String {
    urlencoding::encode(&value.to_string()).into_owned()
}
