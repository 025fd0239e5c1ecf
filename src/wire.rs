//! JSON entry points for the lending model.
//!
//! Every model type validates itself while deserializing, so anything decoded
//! here already satisfies its invariants. Failures come back as
//! [`ModelError::MalformedInput`].

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{ModelError, ModelResult};

pub fn decode<T: DeserializeOwned>(input: &str) -> ModelResult<T> {
    serde_json::from_str(input).map_err(ModelError::from)
}

pub fn decode_slice<T: DeserializeOwned>(input: &[u8]) -> ModelResult<T> {
    serde_json::from_slice(input).map_err(ModelError::from)
}

pub fn encode<T: Serialize>(value: &T) -> ModelResult<String> {
    serde_json::to_string(value).map_err(ModelError::from)
}

pub fn encode_pretty<T: Serialize>(value: &T) -> ModelResult<String> {
    serde_json::to_string_pretty(value).map_err(ModelError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LendingContract, RatesRequest};

    #[test]
    fn test_decode_missing_field_is_malformed() {
        let err = decode::<RatesRequest>("{}").unwrap_err();
        match err {
            ModelError::MalformedInput { reason, .. } => {
                assert!(reason.contains("missing field `assets`"));
            }
            other => panic!("expected MalformedInput, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_reports_invariant_in_reason() {
        let input = r#"{"asset":"USDC","term":30,"start_amount":"1000.00",
            "current_amount":"1003.21","end_amount_estimate":"1012.08",
            "current_apr":1.45,"start_time":1700500000,
            "current_time":1700000000,"end_time":1702592000}"#;

        let err = decode::<LendingContract>(input).unwrap_err();
        assert!(err.is_malformed_input());
        assert!(err.to_string().contains("invalid current_time"));
    }

    #[test]
    fn test_decode_slice_and_encode() {
        let request: RatesRequest = decode_slice(br#"{"assets":["USDC","ETH"]}"#).unwrap();
        assert_eq!(request.assets, vec!["USDC", "ETH"]);
        assert_eq!(encode(&request).unwrap(), r#"{"assets":["USDC","ETH"]}"#);
        assert!(encode_pretty(&request).unwrap().contains('\n'));
    }
}
