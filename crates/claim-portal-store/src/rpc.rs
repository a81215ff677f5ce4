// SPDX-License-Identifier: Apache-2.0

use crate::{StoreError, StoreErrorCode};
use reqwest::blocking::Client;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub const SPL_TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// Byte length of an SPL token account.
const TOKEN_ACCOUNT_SIZE: u64 = 165;

/// One token account's owner and UI balance. Several accounts may share an owner.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenAccountBalance {
    pub owner: String,
    pub amount: f64,
}

pub trait HolderSource {
    fn fetch_token_balances(&self, mint: &str) -> Result<Vec<TokenAccountBalance>, StoreError>;
}

/// `getProgramAccounts` over JSON-RPC.
pub struct JsonRpcHolderSource {
    url: String,
    client: Client,
}

impl JsonRpcHolderSource {
    #[must_use]
    pub fn new(url: String, timeout: Duration) -> Self {
        Self {
            url,
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[must_use]
pub fn program_accounts_request(mint: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "getProgramAccounts",
        "params": [
            SPL_TOKEN_PROGRAM_ID,
            {
                "encoding": "jsonParsed",
                "filters": [
                    { "dataSize": TOKEN_ACCOUNT_SIZE },
                    { "memcmp": { "offset": 0, "bytes": mint } }
                ]
            }
        ]
    })
}

impl HolderSource for JsonRpcHolderSource {
    fn fetch_token_balances(&self, mint: &str) -> Result<Vec<TokenAccountBalance>, StoreError> {
        let started = Instant::now();
        let resp = self
            .client
            .post(&self.url)
            .json(&program_accounts_request(mint))
            .send()
            .map_err(|e| StoreError::new(StoreErrorCode::Rpc, format!("rpc request failed: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(StoreError::new(
                StoreErrorCode::Rpc,
                format!("rpc endpoint returned HTTP {status}"),
            ));
        }
        let body: Value = resp
            .json()
            .map_err(|e| StoreError::new(StoreErrorCode::Rpc, format!("rpc body not json: {e}")))?;
        if let Some(err) = body.get("error") {
            return Err(StoreError::new(
                StoreErrorCode::Rpc,
                format!("rpc error: {err}"),
            ));
        }
        let result = body.get("result").ok_or_else(|| {
            StoreError::new(StoreErrorCode::Rpc, "rpc response has no result field")
        })?;
        let balances = parse_program_accounts(result)?;
        debug!(
            accounts = balances.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "fetched token accounts"
        );
        Ok(balances)
    }
}

/// Reads owner balances out of a `getProgramAccounts` result array.
/// Entries without a parsed owner or amount are skipped.
pub fn parse_program_accounts(result: &Value) -> Result<Vec<TokenAccountBalance>, StoreError> {
    let accounts = result.as_array().ok_or_else(|| {
        StoreError::new(StoreErrorCode::Rpc, "rpc result is not an array")
    })?;
    let mut out = Vec::with_capacity(accounts.len());
    for (idx, entry) in accounts.iter().enumerate() {
        let info = entry.pointer("/account/data/parsed/info");
        let owner = info.and_then(|i| i.get("owner")).and_then(Value::as_str);
        let amount = info
            .and_then(|i| i.get("tokenAmount"))
            .and_then(ui_amount);
        match (owner, amount) {
            (Some(owner), Some(amount)) => out.push(TokenAccountBalance {
                owner: owner.to_string(),
                amount,
            }),
            _ => {
                let pubkey = entry.get("pubkey").and_then(Value::as_str).unwrap_or("?");
                warn!(index = idx, pubkey, "skipping token account without parsed balance");
            }
        }
    }
    Ok(out)
}

fn ui_amount(token_amount: &Value) -> Option<f64> {
    if let Some(raw) = token_amount.get("uiAmountString").and_then(Value::as_str) {
        if let Some(v) = raw.parse::<f64>().ok().filter(|v| v.is_finite()) {
            return Some(v);
        }
    }
    token_amount
        .get("uiAmount")
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(owner: &str, ui: &str) -> Value {
        json!({
            "pubkey": format!("acct-{owner}"),
            "account": { "data": { "parsed": { "info": {
                "owner": owner,
                "tokenAmount": { "uiAmountString": ui, "uiAmount": null, "decimals": 6 }
            }}}}
        })
    }

    #[test]
    fn request_filters_on_mint_and_account_size() {
        let req = program_accounts_request("Mint111");
        assert_eq!(req["method"], "getProgramAccounts");
        assert_eq!(req["params"][0], SPL_TOKEN_PROGRAM_ID);
        assert_eq!(req["params"][1]["filters"][0]["dataSize"], 165);
        assert_eq!(req["params"][1]["filters"][1]["memcmp"]["bytes"], "Mint111");
        assert_eq!(req["params"][1]["encoding"], "jsonParsed");
    }

    #[test]
    fn parse_keeps_well_formed_entries_only() {
        let result = json!([
            account("alice", "12.5"),
            { "pubkey": "broken", "account": { "data": ["base64", "AAAA"] } },
            account("bob", "0"),
        ]);
        let parsed = parse_program_accounts(&result).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].owner, "alice");
        assert!((parsed[0].amount - 12.5).abs() < f64::EPSILON);
        assert_eq!(parsed[1].amount, 0.0);
    }

    #[test]
    fn parse_falls_back_to_numeric_ui_amount() {
        let result = json!([{ "account": { "data": { "parsed": { "info": {
            "owner": "carol", "tokenAmount": { "uiAmount": 3.25 }
        }}}}}]);
        let parsed = parse_program_accounts(&result).unwrap();
        assert_eq!(parsed[0].amount, 3.25);
    }

    #[test]
    fn parse_skips_non_finite_amount_strings() {
        let result = json!([
            account("alice", "500"),
            account("alice", "NaN"),
            account("bob", "1"),
            account("carol", "inf"),
        ]);
        let parsed = parse_program_accounts(&result).unwrap();
        let owners: Vec<_> = parsed.iter().map(|b| b.owner.as_str()).collect();
        assert_eq!(owners, vec!["alice", "bob"]);
        assert!(parsed.iter().all(|b| b.amount.is_finite()));
    }

    #[test]
    fn non_array_result_is_rpc_error() {
        let err = parse_program_accounts(&json!({"value": []})).unwrap_err();
        assert_eq!(err.code, StoreErrorCode::Rpc);
    }
}
