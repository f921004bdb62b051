//! RPC-compatible types for the mock chain.
//!
//! Addresses, words and curve coordinates travel as `0x` hex strings and
//! token amounts as decimal strings.

use serde::{Deserialize, Serialize};

use sale_module::{PeriodLimits, SaleInitParams};
use sale_types::{
    Address, CurvePoint, InvestorPosition, RoleAddresses, SaleEvent, SaleStatus, VestingConfiguration, Word,
};

/// Registry roles to install before the sale is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolesRpc {
    pub operator: String,
    pub fee_receiver: String,
    pub signer: String,
    pub vesting_factory: String,
}

impl RolesRpc {
    pub fn parse(&self) -> Result<RoleAddresses, String> {
        Ok(RoleAddresses {
            operator: parse_address(&self.operator)?,
            fee_receiver: parse_address(&self.fee_receiver)?,
            signer: parse_address(&self.signer)?,
            vesting_factory: parse_address(&self.vesting_factory)?,
        })
    }
}

/// Sale parameters for RPC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleParamsRpc {
    pub sale_period_seconds: u64,
    pub refund_period_seconds: u64,
    pub lockup_period_seconds: u64,
    pub legion_fee_on_capital_raised_bps: u16,
    pub legion_fee_on_tokens_sold_bps: u16,
    pub referrer_fee_on_capital_raised_bps: u16,
    pub referrer_fee_on_tokens_sold_bps: u16,
    pub minimum_invest_amount: String,
    pub bid_token: String,
    pub ask_token: Option<String>,
    pub project_admin: String,
    pub address_registry: String,
    #[serde(default)]
    pub referrer_fee_receiver: Option<String>,
    pub vesting_duration_seconds: u64,
    pub vesting_cliff_duration_seconds: u64,
    /// 1e18 = 100%
    pub token_allocation_on_tge_rate: String,
    /// Hex-encoded `x || y` (64 bytes)
    pub public_key: String,
}

impl SaleParamsRpc {
    pub fn parse(&self) -> Result<SaleInitParams, String> {
        Ok(SaleInitParams {
            sale_period_seconds: self.sale_period_seconds,
            refund_period_seconds: self.refund_period_seconds,
            lockup_period_seconds: self.lockup_period_seconds,
            legion_fee_on_capital_raised_bps: self.legion_fee_on_capital_raised_bps,
            legion_fee_on_tokens_sold_bps: self.legion_fee_on_tokens_sold_bps,
            referrer_fee_on_capital_raised_bps: self.referrer_fee_on_capital_raised_bps,
            referrer_fee_on_tokens_sold_bps: self.referrer_fee_on_tokens_sold_bps,
            minimum_invest_amount: parse_amount(&self.minimum_invest_amount)?,
            bid_token: parse_address(&self.bid_token)?,
            ask_token: self.ask_token.as_deref().map(parse_address).transpose()?,
            project_admin: parse_address(&self.project_admin)?,
            address_registry: parse_address(&self.address_registry)?,
            referrer_fee_receiver: match &self.referrer_fee_receiver {
                Some(receiver) => parse_address(receiver)?,
                None => [0u8; 20],
            },
            vesting: VestingConfiguration {
                vesting_duration_seconds: self.vesting_duration_seconds,
                vesting_cliff_duration_seconds: self.vesting_cliff_duration_seconds,
                token_allocation_on_tge_rate: parse_amount(&self.token_allocation_on_tge_rate)?,
            },
            public_key: parse_point(&self.public_key)?,
        })
    }
}

/// Parameters for `admin_initSale`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitSaleRequest {
    pub sale_address: String,
    pub roles: RolesRpc,
    pub params: SaleParamsRpc,
    /// Overrides the default 1 hour to 12 week period bounds
    #[serde(default)]
    pub limits: Option<PeriodLimits>,
}

/// Chain info response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainInfo {
    pub chain_id: u64,
    pub timestamp: u64,
    pub sale_address: Option<String>,
}

/// Events emitted by a committed call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallReceipt {
    pub call: String,
    pub events: Vec<SaleEvent>,
}

/// Sale totals for RPC responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRpc {
    pub total_capital_invested: String,
    pub total_tokens_allocated: String,
    pub total_capital_raised: String,
    pub claim_tokens_merkle_root: String,
    pub accepted_capital_merkle_root: String,
    pub is_canceled: bool,
    pub tokens_supplied: bool,
    pub capital_withdrawn: bool,
}

impl From<&SaleStatus> for StatusRpc {
    fn from(s: &SaleStatus) -> Self {
        Self {
            total_capital_invested: s.total_capital_invested.to_string(),
            total_tokens_allocated: s.total_tokens_allocated.to_string(),
            total_capital_raised: s.total_capital_raised.to_string(),
            claim_tokens_merkle_root: to_hex(s.claim_tokens_merkle_root),
            accepted_capital_merkle_root: to_hex(s.accepted_capital_merkle_root),
            is_canceled: s.is_canceled,
            tokens_supplied: s.tokens_supplied,
            capital_withdrawn: s.capital_withdrawn,
        }
    }
}

/// Investor position for RPC responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionRpc {
    pub investor: String,
    pub invested_capital: String,
    pub has_refunded: bool,
    pub has_claimed_excess: bool,
    pub has_settled: bool,
    pub vesting_address: Option<String>,
}

impl PositionRpc {
    pub fn new(investor: &Address, position: &InvestorPosition) -> Self {
        Self {
            investor: to_hex(investor),
            invested_capital: position.invested_capital.to_string(),
            has_refunded: position.has_refunded,
            has_claimed_excess: position.has_claimed_excess,
            has_settled: position.has_settled,
            vesting_address: position.vesting_address.map(to_hex),
        }
    }
}

pub fn to_hex(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}

fn decode_array<const N: usize>(s: &str) -> Result<[u8; N], String> {
    let bytes = hex::decode(s.trim_start_matches("0x")).map_err(|e| format!("invalid hex {s:?}: {e}"))?;
    let got = bytes.len();
    bytes
        .try_into()
        .map_err(|_| format!("expected {N} bytes, got {got}"))
}

/// Parse a 20-byte address. Anything but exactly 20 bytes is rejected.
pub fn parse_address(s: &str) -> Result<Address, String> {
    decode_array::<20>(s)
}

pub fn parse_word(s: &str) -> Result<Word, String> {
    decode_array::<32>(s)
}

pub fn parse_point(s: &str) -> Result<CurvePoint, String> {
    let bytes = decode_array::<64>(s)?;
    let mut x = [0u8; 32];
    let mut y = [0u8; 32];
    x.copy_from_slice(&bytes[..32]);
    y.copy_from_slice(&bytes[32..]);
    Ok(CurvePoint::new(x, y))
}

pub fn parse_amount(s: &str) -> Result<u128, String> {
    s.parse::<u128>().map_err(|e| format!("invalid amount {s:?}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params_json() -> serde_json::Value {
        serde_json::json!({
            "sale_period_seconds": 604800,
            "refund_period_seconds": 1209600,
            "lockup_period_seconds": 2592000,
            "legion_fee_on_capital_raised_bps": 250,
            "legion_fee_on_tokens_sold_bps": 250,
            "referrer_fee_on_capital_raised_bps": 0,
            "referrer_fee_on_tokens_sold_bps": 0,
            "minimum_invest_amount": "1000",
            "bid_token": format!("0x{}", "b1".repeat(20)),
            "ask_token": null,
            "project_admin": format!("0x{}", "9a".repeat(20)),
            "address_registry": format!("0x{}", "4e".repeat(20)),
            "vesting_duration_seconds": 31536000,
            "vesting_cliff_duration_seconds": 0,
            "token_allocation_on_tge_rate": "100000000000000000",
            "public_key": format!("0x{}{}", "00".repeat(31) + "01", "00".repeat(31) + "02"),
        })
    }

    #[test]
    fn test_parse_params() {
        let rpc: SaleParamsRpc = serde_json::from_value(params_json()).unwrap();
        let params = rpc.parse().unwrap();

        assert_eq!(params.minimum_invest_amount, 1000);
        assert_eq!(params.bid_token, [0xb1; 20]);
        assert_eq!(params.ask_token, None);
        assert_eq!(params.referrer_fee_receiver, [0u8; 20]);
        assert_eq!(params.vesting.token_allocation_on_tge_rate, 100_000_000_000_000_000);
        assert_eq!(params.public_key.x[31], 1);
        assert_eq!(params.public_key.y[31], 2);
    }

    #[test]
    fn test_parse_address_is_strict() {
        assert_eq!(parse_address(&format!("0x{}", "01".repeat(20))).unwrap(), [1u8; 20]);
        assert!(parse_address("0x0102").is_err());
        assert!(parse_address(&"01".repeat(32)).is_err());
        assert!(parse_address("not hex").is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("340282366920938463463374607431768211455").unwrap(), u128::MAX);
        assert!(parse_amount("-1").is_err());
        assert!(parse_amount("1e18").is_err());
    }

    #[test]
    fn test_status_rpc_hex() {
        let status = SaleStatus {
            total_capital_raised: 10_000,
            claim_tokens_merkle_root: [0xab; 32],
            ..Default::default()
        };
        let rpc = StatusRpc::from(&status);
        assert_eq!(rpc.total_capital_raised, "10000");
        assert_eq!(rpc.claim_tokens_merkle_root, format!("0x{}", "ab".repeat(32)));
    }
}
