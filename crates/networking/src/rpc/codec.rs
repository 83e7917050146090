//! Conversions between Ethereum and Qtum representations of quantities
//! and addresses.
//!
//! Ethereum clients send value and gas price in wei-denominated hex. The
//! adapter treats those hex quantities as satoshi counts (1 QTUM = 10^8),
//! so `0x64` becomes an amount of `0.000001`.

use alloy_primitives::U256;
use serde_json::{Value, json};

use crate::rpc::{clients::qtum::QtumRpc, utils::RpcErr};

pub const SATOSHI_PER_QTUM: u64 = 100_000_000;

/// The node's minimum relay gas price, in satoshi (0.0000004 QTUM).
pub const DEFAULT_GAS_PRICE_SATOSHI: u64 = 40;

/// `createcontract`'s own default, used for every broadcast operation.
pub const DEFAULT_GAS_LIMIT: u64 = 2_500_000;

/// Block gas limit; read-only executions are not charged.
pub const CALL_GAS_LIMIT: u64 = 40_000_000;

pub fn strip_hex_prefix(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}

pub fn add_hex_prefix(value: &str) -> String {
    if value.starts_with("0x") {
        value.to_owned()
    } else {
        format!("0x{value}")
    }
}

pub fn decode_hex_big(hex: &str) -> Result<U256, RpcErr> {
    let digits = strip_hex_prefix(hex);
    if digits.is_empty() {
        return Err(RpcErr::InvalidEncoding(format!("empty hex quantity {hex:?}")));
    }
    U256::from_str_radix(digits, 16)
        .map_err(|error| RpcErr::InvalidEncoding(format!("invalid hex quantity {hex:?}: {error}")))
}

pub fn encode_hex_big(value: U256) -> String {
    format!("0x{value:x}")
}

pub fn encode_hex_u64(value: u64) -> String {
    format!("{value:#x}")
}

/// Decodes a hex quantity into a native amount. An empty string means the
/// caller left the field out and yields the minimum relay gas price.
pub fn wei_hex_to_native_amount(hex: &str) -> Result<f64, RpcErr> {
    if hex.is_empty() {
        return Ok(DEFAULT_GAS_PRICE_SATOSHI as f64 / SATOSHI_PER_QTUM as f64);
    }
    let satoshi = u128::try_from(decode_hex_big(hex)?)
        .map_err(|_| RpcErr::InvalidEncoding(format!("amount {hex} out of range")))?;
    Ok(satoshi as f64 / SATOSHI_PER_QTUM as f64)
}

/// Inverse of [`wei_hex_to_native_amount`]. Wallet amounts of outgoing
/// transactions are negative; the sign is dropped.
pub fn native_amount_to_wei_hex(amount: f64) -> String {
    let satoshi = (amount.abs() * SATOSHI_PER_QTUM as f64).round() as u128;
    encode_hex_big(U256::from(satoshi))
}

/// Renders a satoshi count as a QTUM amount with 8 decimal places.
pub fn format_native_amount(satoshi: U256) -> String {
    let (whole, fraction) = satoshi.div_rem(U256::from(SATOSHI_PER_QTUM));
    // fraction < 10^8 always fits in the low limb.
    format!("{whole}.{:08}", fraction.as_limbs()[0])
}

#[derive(Debug, Clone, PartialEq)]
pub struct GasSpec {
    pub limit: U256,
    /// Price per gas unit in QTUM, 8 decimal places.
    pub price: String,
}

impl GasSpec {
    /// Gas limit as the node expects it: a JSON number when it fits,
    /// otherwise its decimal string.
    pub fn limit_json(&self) -> Value {
        match u64::try_from(self.limit) {
            Ok(limit) => json!(limit),
            Err(_) => json!(self.limit.to_string()),
        }
    }
}

/// Derives the node's gas arguments. Missing or empty fields fall back to
/// `default_limit` and the minimum relay price.
pub fn eth_gas_to_qtum(
    gas: Option<&str>,
    gas_price: Option<&str>,
    default_limit: u64,
) -> Result<GasSpec, RpcErr> {
    let limit = match gas.filter(|gas| !gas.is_empty()) {
        Some(gas) => decode_hex_big(gas)?,
        None => U256::from(default_limit),
    };
    let price = match gas_price.filter(|price| !price.is_empty()) {
        Some(price) => decode_hex_big(price)?,
        None => U256::from(DEFAULT_GAS_PRICE_SATOSHI),
    };
    Ok(GasSpec {
        limit,
        price: format_native_amount(price),
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AddressFormat {
    /// 20-byte hex, `0x` prefixed.
    Hex,
    /// Base58 as the node's wallet reports it.
    Native,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Address {
    Hex(String),
    Native(String),
}

impl Address {
    pub fn parse(address: &str) -> Self {
        let digits = strip_hex_prefix(address);
        if digits.len() == 40 && hex::decode(digits).is_ok() {
            Address::Hex(digits.to_ascii_lowercase())
        } else {
            Address::Native(address.to_owned())
        }
    }
}

/// Rewrites `address` into `target` form, asking the node when the two
/// forms differ.
pub async fn normalize_address<C: QtumRpc>(
    node: &C,
    address: &str,
    target: AddressFormat,
) -> Result<String, RpcErr> {
    match (Address::parse(address), target) {
        (Address::Hex(hex), AddressFormat::Hex) => Ok(add_hex_prefix(&hex)),
        (Address::Native(native), AddressFormat::Native) => Ok(native),
        (Address::Hex(hex), AddressFormat::Native) => {
            node.from_hex_address(&hex).await.map_err(|error| {
                tracing::debug!(address, %error, "fromhexaddress failed");
                RpcErr::from(error)
            })
        }
        (Address::Native(native), AddressFormat::Hex) => node
            .get_hex_address(&native)
            .await
            .map(|hex| add_hex_prefix(&hex))
            .map_err(|error| {
                tracing::debug!(address, %error, "gethexaddress failed");
                RpcErr::from(error)
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::utils::test_utils::FakeNode;
    use serde_json::json;

    #[test]
    fn test_hex_big_round_trip() {
        assert_eq!(decode_hex_big("0x64").unwrap(), U256::from(100u64));
        assert_eq!(decode_hex_big("ff").unwrap(), U256::from(255u64));
        assert_eq!(encode_hex_big(U256::from(100u64)), "0x64");
        assert_eq!(encode_hex_big(U256::ZERO), "0x0");
        assert_eq!(encode_hex_u64(0), "0x0");
        assert_eq!(encode_hex_u64(4063), "0xfdf");
    }

    #[test]
    fn test_decode_hex_big_rejects_malformed() {
        for bad in ["", "0x", "0xzz", "hello"] {
            assert!(
                matches!(decode_hex_big(bad), Err(RpcErr::InvalidEncoding(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_wei_hex_to_native_amount() {
        assert_eq!(wei_hex_to_native_amount("0x64").unwrap(), 0.000001);
        assert_eq!(wei_hex_to_native_amount("0x1").unwrap(), 0.00000001);
        assert_eq!(wei_hex_to_native_amount("").unwrap(), 0.0000004);
        assert!(wei_hex_to_native_amount("0xnope").is_err());
    }

    #[test]
    fn test_native_amount_to_wei_hex() {
        assert_eq!(native_amount_to_wei_hex(0.000001), "0x64");
        assert_eq!(native_amount_to_wei_hex(0.00000001), "0x1");
        assert_eq!(native_amount_to_wei_hex(-0.5), "0x2faf080");
        assert_eq!(native_amount_to_wei_hex(0.0), "0x0");
    }

    #[test]
    fn test_amount_round_trip() {
        for satoshi in [1u64, 100, 255, 40, 123_456_789, 2_100_000_000_000_000] {
            let hex = encode_hex_u64(satoshi);
            let amount = wei_hex_to_native_amount(&hex).unwrap();
            assert_eq!(native_amount_to_wei_hex(amount), hex);
        }
    }

    #[test]
    fn test_format_native_amount() {
        assert_eq!(format_native_amount(U256::from(1u64)), "0.00000001");
        assert_eq!(format_native_amount(U256::from(255u64)), "0.00000255");
        assert_eq!(format_native_amount(U256::from(150_000_000u64)), "1.50000000");
    }

    #[test]
    fn test_eth_gas_to_qtum() {
        let gas = eth_gas_to_qtum(Some("0x1"), Some("0x1"), DEFAULT_GAS_LIMIT).unwrap();
        assert_eq!(gas.limit, U256::from(1u64));
        assert_eq!(gas.price, "0.00000001");

        let gas = eth_gas_to_qtum(Some("0x1"), Some("0xff"), DEFAULT_GAS_LIMIT).unwrap();
        assert_eq!(gas.price, "0.00000255");

        let gas = eth_gas_to_qtum(Some("0x1"), Some("0x64"), DEFAULT_GAS_LIMIT).unwrap();
        assert_eq!(gas.price, "0.00000100");
    }

    #[test]
    fn test_eth_gas_to_qtum_defaults() {
        let gas = eth_gas_to_qtum(None, Some(""), DEFAULT_GAS_LIMIT).unwrap();
        assert_eq!(gas.limit, U256::from(2_500_000u64));
        assert_eq!(gas.price, "0.00000040");
        assert_eq!(gas.limit_json(), json!(2_500_000));

        assert!(eth_gas_to_qtum(Some("0xq"), None, DEFAULT_GAS_LIMIT).is_err());
    }

    #[test]
    fn test_address_parse() {
        assert_eq!(
            Address::parse("0x7926223070547D2D15b2eF5e7383E541c338FfE9"),
            Address::Hex("7926223070547d2d15b2ef5e7383e541c338ffe9".to_owned())
        );
        assert_eq!(
            Address::parse("qUbxboqjBRp96j3La8D1RYkyqx5uQbJPoW"),
            Address::Native("qUbxboqjBRp96j3La8D1RYkyqx5uQbJPoW".to_owned())
        );
    }

    #[tokio::test]
    async fn test_normalize_address_converts_through_node() {
        let node = FakeNode::new()
            .on("fromhexaddress", json!("qUbxboqjBRp96j3La8D1RYkyqx5uQbJPoW"))
            .on("gethexaddress", json!("7926223070547d2d15b2ef5e7383e541c338ffe9"));

        let native = normalize_address(
            &node,
            "0x7926223070547d2d15b2ef5e7383e541c338ffe9",
            AddressFormat::Native,
        )
        .await
        .unwrap();
        assert_eq!(native, "qUbxboqjBRp96j3La8D1RYkyqx5uQbJPoW");
        assert_eq!(
            node.calls_to("fromhexaddress"),
            vec![vec![json!("7926223070547d2d15b2ef5e7383e541c338ffe9")]]
        );

        let hex = normalize_address(&node, &native, AddressFormat::Hex)
            .await
            .unwrap();
        assert_eq!(hex, "0x7926223070547d2d15b2ef5e7383e541c338ffe9");
    }

    #[tokio::test]
    async fn test_normalize_address_is_idempotent() {
        let node = FakeNode::new()
            .on("fromhexaddress", json!("qUbxboqjBRp96j3La8D1RYkyqx5uQbJPoW"));

        let once = normalize_address(
            &node,
            "0x7926223070547d2d15b2ef5e7383e541c338ffe9",
            AddressFormat::Native,
        )
        .await
        .unwrap();
        let twice = normalize_address(&node, &once, AddressFormat::Native)
            .await
            .unwrap();
        assert_eq!(once, twice);
        // Already native: no second round trip.
        assert_eq!(node.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_normalize_address_propagates_node_error() {
        let node = FakeNode::new().fail("gethexaddress", -5, "Invalid Qtum address");
        let result = normalize_address(&node, "not-an-address", AddressFormat::Hex).await;
        assert!(matches!(
            result,
            Err(RpcErr::NodeError { code: -5, .. })
        ));
    }
}
