//! Selected product options captured at cart-add time.
//!
//! Options are snapshotted when a line is added to the cart and copied
//! verbatim into the placed order at checkout, so later catalog edits can
//! never retroactively alter an order. Both cart lines and order line items
//! store the snapshot as a single serialized JSON text field; this module
//! owns that schema and its codec.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A customer-chosen product option with its price adjustment.
///
/// Serialized field-for-field as `{"group", "optionName", "priceAdjustment"}`
/// to stay compatible with blobs already persisted on existing orders.
/// Unknown fields in stored blobs are ignored on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedOption {
    /// Option group name (e.g., "Size").
    pub group: String,
    /// Chosen option within the group (e.g., "Large").
    pub option_name: String,
    /// Signed adjustment applied to the line's unit price. May be zero,
    /// positive, or negative.
    pub price_adjustment: Decimal,
}

/// Error produced when an options blob cannot be encoded or decoded.
#[derive(Debug, Error)]
#[error("invalid selected-options blob: {0}")]
pub struct OptionsBlobError(#[from] serde_json::Error);

/// Encode a set of selected options as the canonical stored blob.
///
/// An empty set encodes as `[]` rather than an absent value, so stored rows
/// always round-trip.
///
/// # Errors
///
/// Returns [`OptionsBlobError`] if serialization fails.
pub fn encode_options(options: &[SelectedOption]) -> Result<String, OptionsBlobError> {
    Ok(serde_json::to_string(options)?)
}

/// Decode a stored options blob back into selected options.
///
/// Blank blobs decode to an empty set.
///
/// # Errors
///
/// Returns [`OptionsBlobError`] if the blob is not valid JSON for the schema.
pub fn decode_options(blob: &str) -> Result<Vec<SelectedOption>, OptionsBlobError> {
    if blob.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(blob)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size_large() -> SelectedOption {
        SelectedOption {
            group: "Size".to_string(),
            option_name: "Large".to_string(),
            price_adjustment: Decimal::from(5_000),
        }
    }

    #[test]
    fn test_round_trip() {
        let options = vec![
            size_large(),
            SelectedOption {
                group: "Ít đường".to_string(),
                option_name: "50%".to_string(),
                price_adjustment: Decimal::from(-2_000),
            },
        ];

        let blob = encode_options(&options).expect("encode");
        let back = decode_options(&blob).expect("decode");
        assert_eq!(back, options);
    }

    #[test]
    fn test_wire_field_names_are_camel_case() {
        let blob = encode_options(&[size_large()]).expect("encode");
        assert!(blob.contains("\"group\""));
        assert!(blob.contains("\"optionName\""));
        assert!(blob.contains("\"priceAdjustment\""));
    }

    #[test]
    fn test_empty_set_encodes_as_empty_array() {
        assert_eq!(encode_options(&[]).expect("encode"), "[]");
    }

    #[test]
    fn test_blank_blob_decodes_to_empty() {
        assert!(decode_options("").expect("decode").is_empty());
        assert!(decode_options("  ").expect("decode").is_empty());
    }

    #[test]
    fn test_unknown_fields_ignored() {
        // Blobs written by older software carry extra identifiers.
        let blob = r#"[{"variantId":9,"group":"Size","optionName":"Small","priceAdjustment":"0"}]"#;
        let options = decode_options(blob).expect("decode");
        assert_eq!(options.len(), 1);
        assert_eq!(options.first().map(|o| o.option_name.as_str()), Some("Small"));
    }

    #[test]
    fn test_malformed_blob_is_an_error() {
        assert!(decode_options("{not json").is_err());
    }
}
