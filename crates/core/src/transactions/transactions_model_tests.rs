use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::transactions_errors::TransactionError;
use super::transactions_model::{
    AssetCategory, NewTransaction, Transaction, TransactionType, TransactionUpdate,
};

fn new_tx(kind: TransactionType, category: AssetCategory) -> NewTransaction {
    NewTransaction {
        portfolio_id: "pf-1".to_string(),
        category,
        symbol: "AAPL".to_string(),
        asset_name: Some("Apple Inc.".to_string()),
        kind,
        quantity: dec!(10),
        unit_price: dec!(100),
        fee: Some(dec!(1)),
        currency: "USD".to_string(),
        executed_at: Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap(),
        note: None,
    }
}

#[test]
fn test_valid_buy_passes_validation() {
    assert!(new_tx(TransactionType::Buy, AssetCategory::UsStock)
        .validate()
        .is_ok());
}

#[test]
fn test_empty_portfolio_id_rejected() {
    let mut input = new_tx(TransactionType::Buy, AssetCategory::UsStock);
    input.portfolio_id = "  ".to_string();
    assert!(matches!(
        input.validate(),
        Err(TransactionError::InvalidData(_))
    ));
}

#[test]
fn test_empty_symbol_rejected() {
    let mut input = new_tx(TransactionType::Buy, AssetCategory::UsStock);
    input.symbol = "".to_string();
    assert!(input.validate().is_err());
}

#[test]
fn test_malformed_currency_rejected() {
    for bad in ["US", "USDX", "U5D", ""] {
        let mut input = new_tx(TransactionType::Buy, AssetCategory::UsStock);
        input.currency = bad.to_string();
        assert!(input.validate().is_err(), "currency {:?} should fail", bad);
    }
}

#[test]
fn test_non_positive_quantity_rejected() {
    for bad in [Decimal::ZERO, dec!(-1)] {
        let mut input = new_tx(TransactionType::Buy, AssetCategory::UsStock);
        input.quantity = bad;
        assert!(input.validate().is_err());
    }
}

#[test]
fn test_negative_price_and_fee_rejected() {
    let mut input = new_tx(TransactionType::Buy, AssetCategory::UsStock);
    input.unit_price = dec!(-1);
    assert!(input.validate().is_err());

    let mut input = new_tx(TransactionType::Buy, AssetCategory::UsStock);
    input.fee = Some(dec!(-1));
    assert!(input.validate().is_err());
}

#[test]
fn test_zero_price_allowed() {
    // Free shares (stock grants) carry a zero unit price.
    let mut input = new_tx(TransactionType::Buy, AssetCategory::UsStock);
    input.unit_price = Decimal::ZERO;
    assert!(input.validate().is_ok());
}

#[test]
fn test_type_category_compatibility_matrix() {
    use AssetCategory::*;
    use TransactionType::*;

    for category in AssetCategory::all() {
        for kind in [Buy, Sell, Dividend, Deposit, Withdraw] {
            let result = new_tx(kind, category).validate();
            let expected_ok = match kind {
                Deposit | Withdraw => matches!(category, Fiat | Liability),
                Buy | Sell | Dividend => matches!(category, TwStock | UsStock | Crypto),
            };
            assert_eq!(
                result.is_ok(),
                expected_ok,
                "{} on {} should {}",
                kind,
                category,
                if expected_ok { "pass" } else { "fail" }
            );
        }
    }
}

#[test]
fn test_into_transaction_defaults_fee_to_zero() {
    let mut input = new_tx(TransactionType::Buy, AssetCategory::UsStock);
    input.fee = None;
    let transaction = input.into_transaction(7);

    assert_eq!(transaction.fee, Decimal::ZERO);
    assert_eq!(transaction.sequence, 7);
    assert!(!transaction.id.is_empty());
}

#[test]
fn test_total_amount_includes_fee() {
    let transaction = new_tx(TransactionType::Buy, AssetCategory::UsStock).into_transaction(1);
    assert_eq!(transaction.total_amount(), dec!(1001));
}

#[test]
fn test_sort_key_orders_by_time_then_sequence() {
    let earlier = new_tx(TransactionType::Buy, AssetCategory::UsStock).into_transaction(2);
    let mut later = new_tx(TransactionType::Buy, AssetCategory::UsStock).into_transaction(1);
    later.executed_at = earlier.executed_at + chrono::Duration::hours(1);

    assert!(earlier.sort_key() < later.sort_key());

    let mut tied = new_tx(TransactionType::Buy, AssetCategory::UsStock).into_transaction(3);
    tied.executed_at = earlier.executed_at;
    assert!(earlier.sort_key() < tied.sort_key());
}

#[test]
fn test_update_requires_id() {
    let update = TransactionUpdate {
        id: "".to_string(),
        category: AssetCategory::UsStock,
        symbol: "AAPL".to_string(),
        asset_name: None,
        kind: TransactionType::Buy,
        quantity: dec!(1),
        unit_price: dec!(1),
        fee: None,
        currency: "USD".to_string(),
        executed_at: Utc::now(),
        note: None,
    };
    assert!(update.validate().is_err());
}

#[test]
fn test_update_preserves_identity_and_sequence() {
    let existing: Transaction =
        new_tx(TransactionType::Buy, AssetCategory::UsStock).into_transaction(42);

    let update = TransactionUpdate {
        id: existing.id.clone(),
        category: AssetCategory::UsStock,
        symbol: "MSFT".to_string(),
        asset_name: None,
        kind: TransactionType::Buy,
        quantity: dec!(5),
        unit_price: dec!(300),
        fee: Some(dec!(2)),
        currency: "USD".to_string(),
        executed_at: existing.executed_at,
        note: Some("corrected".to_string()),
    };

    let updated = update.apply_to(&existing);
    assert_eq!(updated.id, existing.id);
    assert_eq!(updated.portfolio_id, existing.portfolio_id);
    assert_eq!(updated.sequence, 42);
    assert_eq!(updated.created_at, existing.created_at);
    assert_eq!(updated.symbol, "MSFT");
    assert_eq!(updated.quantity, dec!(5));
}

#[test]
fn test_category_serde_round_trip() {
    for category in AssetCategory::all() {
        let json = serde_json::to_string(&category).unwrap();
        let back: AssetCategory = serde_json::from_str(&json).unwrap();
        assert_eq!(category, back);
        assert_eq!(json.trim_matches('"'), category.as_str());
    }
}
