use std::path::PathBuf;

use bcypher_core::rest::DEFAULT_API_ROOT;
use clap::{Parser, Subcommand};

/// bcypher: command-line client for the BlockCypher blockchain API.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Coin to query (btc, ltc, doge, dash, bcy, beth).
    #[arg(long, global = true, default_value = "btc", env = "BCYPHER_COIN")]
    pub coin: String,

    /// Chain of the coin (main, test3, test).
    #[arg(long, global = true, default_value = "main", env = "BCYPHER_CHAIN")]
    pub chain: String,

    /// API token. Takes precedence over --token-file.
    #[arg(long, global = true, env = "BCYPHER_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// File whose first non-empty line is the API token.
    #[arg(long, global = true, env = "BCYPHER_TOKEN_FILE")]
    pub token_file: Option<PathBuf>,

    /// API root URL.
    #[arg(long, global = true, default_value = DEFAULT_API_ROOT, env = "BCYPHER_API_ROOT")]
    pub api_root: String,

    /// API Blueprint location for `describe` and `call`.
    /// Downloaded there when missing. Defaults to the temp-directory cache.
    #[arg(long, global = true, env = "BCYPHER_BLUEPRINT")]
    pub blueprint: Option<PathBuf>,

    /// Client-side request rate limit.
    #[arg(long, global = true)]
    pub requests_per_second: Option<u32>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the current state of the chain.
    Chain,

    /// Fetch a block by hash or height.
    Block {
        hash_or_height: String,

        /// Transaction offset within the block.
        #[arg(long)]
        txstart: Option<u64>,

        /// Number of transaction hashes to return.
        #[arg(long)]
        limit: Option<u64>,
    },

    /// Fetch an address.
    Addr {
        address: String,

        /// Include full transaction data.
        #[arg(long, conflicts_with = "balance")]
        full: bool,

        /// Only return balance information.
        #[arg(long)]
        balance: bool,
    },

    /// Fetch a transaction.
    Tx { hash: String },

    /// Confidence score of an unconfirmed transaction.
    TxConf { hash: String },

    /// Broadcast a raw, hex-encoded transaction.
    PushTx { hex: String },

    /// Decode a raw transaction without broadcasting it.
    DecodeTx { hex: String },

    /// Fund an address on a test chain.
    Faucet { address: String, amount: u64 },

    /// List wallets owned by the token.
    Wallets {
        /// List HD wallets instead.
        #[arg(long)]
        hd: bool,
    },

    /// List webhooks owned by the token.
    Hooks,

    /// List the methods generated from the API Blueprint.
    Describe,

    /// Invoke a blueprint-generated method, e.g. `call addresses balance <addr>`.
    Call {
        namespace: String,
        method: String,

        /// Positional arguments, in the method's declared parameter order.
        /// An empty string leaves that parameter unset.
        args: Vec<String>,

        /// JSON object sent as the body, or as query parameters for GET.
        #[arg(long)]
        data: Option<String>,
    },
}
