use alloy::primitives::{Address, U256};
use basket_trader::common::parsing::pow10;
use basket_trader::data::ledger::CrateLedger;
use basket_trader::services::orders::sell::{SellDecision, evaluate_crate};
use std::fs;

const LEDGER: &str = r#"[
  {"stockId": "AAPL", "share": "0x0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a", "minShares": "1.23456789", "name": "Apple"},
  {"stockId": "TSLA", "share": "0x0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b", "minShares": 2}
]"#;

#[test]
fn sold_quantity_is_deducted_and_extras_survive() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crates.json");
    fs::write(&path, LEDGER).unwrap();

    let mut ledger = CrateLedger::load(&path).unwrap();
    let aapl = ledger.get("AAPL").unwrap().clone();
    assert_eq!(aapl.share, Address::from([0x0a; 20]));

    let balance = U256::from(5u64) * pow10(18);
    let SellDecision::Sell { shares, .. } = evaluate_crate(&aapl, 18, balance, 12).unwrap() else {
        panic!("AAPL should be sellable");
    };
    assert_eq!(shares, "1.234567");

    assert_eq!(ledger.deduct(0, &shares).unwrap().as_deref(), Some("0.00000089"));
    assert_eq!(ledger.deduct(1, "3").unwrap().as_deref(), Some("0"));
    assert_eq!(ledger.deduct(2, "1").unwrap(), None);
    ledger.save().unwrap();

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw[0]["minShares"], "0.00000089");
    assert_eq!(raw[0]["name"], "Apple");
    assert_eq!(raw[1]["minShares"], 0);
    assert!(!dir.path().join("crates.json.tmp").exists());
}

#[test]
fn sample_ledger_loads() {
    let ledger = CrateLedger::load(std::path::Path::new("data/crates.json")).unwrap();
    assert!(!ledger.is_empty());
}
