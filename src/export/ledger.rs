use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::ipfs::success_body;
use super::{Ledger, TransportError, TransportResult};
use crate::config::LedgerConfig;

/// `storeIpfsHash(string)`
pub const STORE_HASH_SELECTOR: [u8; 4] = [0xca, 0xcd, 0xe1, 0xd0];
/// `getIpfsHash()`
pub const GET_HASH_SELECTOR: [u8; 4] = [0xdc, 0x96, 0x38, 0xc7];

const WORD: usize = 32;
const REVERTED_STATUS: &str = "0x0";

#[derive(Debug, Deserialize)]
struct RpcReply {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// Ethereum JSON-RPC ledger backed by a contract exposing
/// `storeIpfsHash(string)` and `getIpfsHash()`.
#[derive(Debug)]
pub struct EthLedger {
    client: Client,
    rpc_url: String,
    contract_address: String,
    from_account: Option<String>,
    gas_limit: Option<u64>,
    receipt_poll: Duration,
    receipt_timeout: Duration,
    next_id: AtomicU64,
}

impl EthLedger {
    pub fn new(config: &LedgerConfig) -> TransportResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("sketchlog/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            rpc_url: config.rpc_url.clone(),
            contract_address: config.contract_address.clone(),
            from_account: config.from_account.clone(),
            gas_limit: config.gas_limit,
            receipt_poll: Duration::from_millis(config.receipt_poll_ms.max(1)),
            receipt_timeout: Duration::from_secs(config.receipt_timeout_secs),
            next_id: AtomicU64::new(1),
        })
    }

    fn rpc(&self, method: &str, params: Value) -> TransportResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        tracing::trace!(method, id, "json-rpc request");

        let response = self.client.post(&self.rpc_url).json(&request).send()?;
        let body = success_body(response)?;
        let reply: RpcReply = serde_json::from_str(&body)?;
        if let Some(error) = reply.error {
            return Err(TransportError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        Ok(reply.result.unwrap_or(Value::Null))
    }

    fn sender(&self) -> TransportResult<String> {
        if let Some(account) = &self.from_account {
            return Ok(account.clone());
        }
        let accounts = self.rpc("eth_accounts", json!([]))?;
        accounts
            .get(0)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| TransportError::UnexpectedResponse("node reported no accounts".into()))
    }

    fn wait_for_receipt(&self, transaction: &str) -> TransportResult<()> {
        let deadline = Instant::now() + self.receipt_timeout;
        loop {
            let receipt = self.rpc("eth_getTransactionReceipt", json!([transaction]))?;
            if !receipt.is_null() {
                let status = receipt.get("status").and_then(Value::as_str);
                if status == Some(REVERTED_STATUS) {
                    return Err(TransportError::Reverted {
                        transaction: transaction.to_string(),
                    });
                }
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(TransportError::Timeout {
                    transaction: transaction.to_string(),
                });
            }
            std::thread::sleep(self.receipt_poll);
        }
    }
}

impl Ledger for EthLedger {
    fn store_hash(&self, hash: &str) -> TransportResult<String> {
        let from = self.sender()?;
        let mut transaction = json!({
            "from": from,
            "to": self.contract_address,
            "data": encode_store_call(hash),
        });
        if let Some(gas) = self.gas_limit {
            transaction["gas"] = Value::String(format!("{gas:#x}"));
        }

        let sent = self.rpc("eth_sendTransaction", json!([transaction]))?;
        let tx_hash = sent
            .as_str()
            .ok_or_else(|| {
                TransportError::UnexpectedResponse(format!(
                    "eth_sendTransaction returned {sent}"
                ))
            })?
            .to_string();
        tracing::info!(transaction = %tx_hash, %hash, "ledger transaction sent");

        self.wait_for_receipt(&tx_hash)?;
        tracing::info!(transaction = %tx_hash, "ledger transaction confirmed");
        Ok(tx_hash)
    }

    fn last_hash(&self) -> TransportResult<Option<String>> {
        let call = json!({
            "to": self.contract_address,
            "data": format!("0x{}", hex::encode(GET_HASH_SELECTOR)),
        });
        let result = self.rpc("eth_call", json!([call, "latest"]))?;
        let data = result.as_str().ok_or_else(|| {
            TransportError::UnexpectedResponse(format!("eth_call returned {result}"))
        })?;
        let hash = decode_string_return(data)?;
        Ok((!hash.is_empty()).then_some(hash))
    }
}

fn word_from_usize(value: usize) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&(value as u64).to_be_bytes());
    word
}

fn usize_from_word(word: &[u8]) -> TransportResult<usize> {
    let (high, low) = word.split_at(WORD - 8);
    if high.iter().any(|byte| *byte != 0) {
        return Err(TransportError::UnexpectedResponse(
            "abi word does not fit in usize".into(),
        ));
    }
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(low);
    usize::try_from(u64::from_be_bytes(bytes))
        .map_err(|_| TransportError::UnexpectedResponse("abi word does not fit in usize".into()))
}

/// Hex calldata for `storeIpfsHash(value)`: selector, offset, length, padded bytes.
pub fn encode_store_call(value: &str) -> String {
    let bytes = value.as_bytes();
    let padded_len = bytes.len().div_ceil(WORD) * WORD;

    let mut data = Vec::with_capacity(4 + 2 * WORD + padded_len);
    data.extend_from_slice(&STORE_HASH_SELECTOR);
    data.extend_from_slice(&word_from_usize(WORD));
    data.extend_from_slice(&word_from_usize(bytes.len()));
    data.extend_from_slice(bytes);
    data.resize(4 + 2 * WORD + padded_len, 0);
    format!("0x{}", hex::encode(data))
}

/// Decodes an ABI-encoded single `string` return value. `0x` decodes to "".
pub fn decode_string_return(data: &str) -> TransportResult<String> {
    let digits = data.strip_prefix("0x").unwrap_or(data);
    let bytes = hex::decode(digits)
        .map_err(|err| TransportError::UnexpectedResponse(format!("invalid hex: {err}")))?;
    if bytes.is_empty() {
        return Ok(String::new());
    }

    let truncated = || TransportError::UnexpectedResponse("truncated abi string".into());
    let offset = usize_from_word(bytes.get(..WORD).ok_or_else(truncated)?)?;
    let len_end = offset.checked_add(WORD).ok_or_else(truncated)?;
    let len = usize_from_word(bytes.get(offset..len_end).ok_or_else(truncated)?)?;
    let end = len_end.checked_add(len).ok_or_else(truncated)?;
    let raw = bytes.get(len_end..end).ok_or_else(truncated)?;

    String::from_utf8(raw.to_vec())
        .map_err(|err| TransportError::UnexpectedResponse(format!("abi string is not utf-8: {err}")))
}
