use serde::{Deserialize, Serialize};

/// Hex identifier a node assigns to a broadcast transaction.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
    derive_more::Into,
)]
#[serde(transparent)]
pub struct TxId(pub String);

impl TxId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn random() -> Self {
        let mut bytes = [0_u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TxId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Execution outcome of a mined contract call.
///
/// `success` is false when the contract aborted the call, in which case
/// `value` holds the error representation the node reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxResult {
    pub success: bool,
    pub value: String,
}

impl TxResult {
    pub fn ok(value: impl Into<String>) -> Self {
        Self {
            success: true,
            value: value.into(),
        }
    }

    pub fn err(value: impl Into<String>) -> Self {
        Self {
            success: false,
            value: value.into(),
        }
    }
}

/// Where a transaction currently sits in the node's pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Success,
    AbortByResponse,
    Dropped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStatusResponse {
    pub status: TransactionStatus,
    pub block_height: Option<u64>,
    pub block_hash: Option<String>,
    pub result: Option<TxResult>,
}

impl TransactionStatusResponse {
    /// True once the transaction landed in a block, whatever the outcome.
    pub fn is_mined(&self) -> bool {
        matches!(
            self.status,
            TransactionStatus::Success | TransactionStatus::AbortByResponse
        )
    }
}

/// A reward address in the format the stacking contract expects: a version
/// byte plus a 20 byte hash, hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoxAddr {
    pub version: u8,
    pub hashbytes: String,
}

impl PoxAddr {
    pub fn new(version: u8, hashbytes: impl Into<String>) -> Self {
        Self {
            version,
            hashbytes: hashbytes.into(),
        }
    }
}

/// A single argument to a contract call, tagged so the node can decode it
/// without guessing at numeric widths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ClarityArg {
    /// Unsigned integers travel as strings so 128 bit amounts survive JSON.
    Uint(String),
    Principal(String),
    PoxAddr(PoxAddr),
    Some(Box<ClarityArg>),
    None,
}

impl ClarityArg {
    pub fn uint(value: u128) -> Self {
        Self::Uint(value.to_string())
    }

    pub fn principal(value: impl Into<String>) -> Self {
        Self::Principal(value.into())
    }

    pub fn optional_uint(value: Option<u64>) -> Self {
        match value {
            Some(v) => Self::Some(Box::new(Self::uint(v.into()))),
            None => Self::None,
        }
    }
}

/// A call into a deployed contract, the only payload kind this suite submits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractCall {
    pub contract_id: String,
    pub function: String,
    pub args: Vec<ClarityArg>,
}

/// The signed envelope posted to a node.
///
/// Field order matters: [`Self::signing_payload`] serializes everything but
/// the signature in declaration order, and the signature covers those bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTransaction {
    pub sender: String,
    pub public_key: String,
    pub nonce: u64,
    pub fee: u64,
    pub payload: ContractCall,
    pub signature: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SigningPayload<'a> {
    sender: &'a str,
    public_key: &'a str,
    nonce: u64,
    fee: u64,
    payload: &'a ContractCall,
}

impl SignedTransaction {
    /// Canonical bytes the sender signs over.
    pub fn signing_payload(&self) -> Vec<u8> {
        let payload = SigningPayload {
            sender: &self.sender,
            public_key: &self.public_key,
            nonce: self.nonce,
            fee: self.fee,
            payload: &self.payload,
        };
        serde_json::to_vec(&payload).unwrap_or_default()
    }
}

/// Positive acknowledgement from a node that accepted a broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastAck {
    pub txid: TxId,
}

/// Body a node returns when it refuses a broadcast outright.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectionResponse {
    pub error: String,
    #[serde(default)]
    pub reason: Option<String>,
}
