//! Shared test helpers for `bcypher-core` unit tests.
//!
//! Holds a small API Blueprint document shaped like the published BlockCypher
//! one, covering item, collection and alternate-action resources plus verbs
//! that the naming rules skip.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::blueprint::BlueprintSource;
use crate::error::CoreError;

pub const SAMPLE_BLUEPRINT: &str = r#"FORMAT: 1A
HOST: https://api.blockcypher.com

# BlockCypher API

Sample description of the BlockCypher REST API.

# Group Blockchain

## Chain [/v1/{coin}/{chain}]

### Get Chain [GET]

+ Response 200 (application/json)

## Block [/v1/{coin}/{chain}/blocks/{hash}{?txstart,limit}]

+ Parameters
    + hash (required, string, `0000000000000000189bba3564a63772107b5673c940c16f12662b3e8546b412`) ... Block hash or height.
    + txstart (optional, number) ... Transaction offset.
    + limit (optional, number) ... Number of transactions to return.

### Get Block [GET]

+ Response 200 (application/json)

# Group Addresses

## Address [/v1/{coin}/{chain}/addrs/{address}]

+ Parameters
    + address (string) ... The address.

### Get Address [GET]

+ Response 200 (application/json)

## Address Balance [/v1/{coin}/{chain}/addrs/{address}/balance]

+ Parameters
    + address (string) ... The address.

### Get Balance [GET]

+ Response 200 (application/json)

## Address Collection [/v1/{coin}/{chain}/addrs]

### Generate Address [POST]

+ Response 201 (application/json)

# Group Wallets

## Wallet Collection [/v1/{coin}/{chain}/wallets]

### List Wallets [GET]

+ Response 200 (application/json)

### Create Wallet [POST]

+ Request (application/json)

        {"name": "alice", "addresses": ["1JcX75oraJEmzXXHpDjRctw3BX6qDmFM8e"]}

+ Response 201 (application/json)

### Patch Wallets [PATCH]

+ Response 200 (application/json)

## Wallet [/v1/{coin}/{chain}/wallets/{name}]

+ Parameters
    + name (string) ... Wallet name.

### Get Wallet [GET]

+ Response 200 (application/json)

### Delete Wallet [DELETE]

+ Response 204

### Update Wallet [PUT]

+ Response 200 (application/json)

### Post Wallet [POST]

+ Response 200 (application/json)
"#;

/// Blueprint source serving [`SAMPLE_BLUEPRINT`] and counting loads.
pub struct CountingSource {
    text: String,
    loads: AtomicUsize,
}

impl CountingSource {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_owned(),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlueprintSource for CountingSource {
    async fn load(&self) -> Result<String, CoreError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        // Let concurrent callers pile up behind the first load.
        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        Ok(self.text.clone())
    }
}
