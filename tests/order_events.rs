use alloy::primitives::{Address, Log, U256};
use alloy_sol_types::SolEvent;
use basket_trader::data::order_processor::IOrderProcessor;
use basket_trader::domain::order::OrderStatus;
use basket_trader::services::orders::report::parse_order_created;

fn order_created(id: u64, requester: Address, sell: bool) -> IOrderProcessor::OrderCreated {
    IOrderProcessor::OrderCreated {
        id: U256::from(id),
        requester,
        order: IOrderProcessor::Order {
            requestTimestamp: 1_752_000_000_000,
            recipient: requester,
            assetToken: Address::from([0x0a; 20]),
            paymentToken: Address::from([0x66; 20]),
            sell,
            orderType: 0,
            assetTokenQuantity: if sell { U256::from(10u64).pow(U256::from(16u64)) } else { U256::ZERO },
            paymentTokenQuantity: if sell { U256::ZERO } else { U256::from(5_368_000u64) },
            price: U256::ZERO,
            tif: 0,
        },
        feesEscrowed: U256::from(31_000u64),
    }
}

#[test]
fn receipt_logs_yield_created_orders_in_order() {
    let processor = Address::from([0x0f; 20]);
    let wallet = Address::from([0xda; 20]);

    // A permit-style Approval from the token sits between processor events.
    let approval = Log::new_unchecked(
        Address::from([0x66; 20]),
        vec![alloy::primitives::keccak256("Approval(address,address,uint256)")],
        vec![0u8; 32].into(),
    );
    let logs = vec![
        Log {
            address: processor,
            data: order_created(11, wallet, false).encode_log_data(),
        },
        approval,
        Log {
            address: processor,
            data: order_created(12, wallet, true).encode_log_data(),
        },
    ];

    let created = parse_order_created(processor, &logs).unwrap();
    let ids: Vec<U256> = created.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![U256::from(11u64), U256::from(12u64)]);
    assert!(created.iter().all(|o| o.requester == wallet));
    assert!(!created[0].sell && created[1].sell);
    assert_eq!(created[1].asset_quantity, U256::from(10u64).pow(U256::from(16u64)));
}

#[test]
fn events_from_another_contract_do_not_count() {
    let logs = vec![Log {
        address: Address::from([0x01; 20]),
        data: order_created(1, Address::ZERO, false).encode_log_data(),
    }];
    let err = parse_order_created(Address::from([0x0f; 20]), &logs).unwrap_err();
    assert!(err.to_string().contains("No OrderCreated events found"));
}

#[test]
fn status_codes_map_to_labels() {
    let labels: Vec<&str> = (0u8..=4).map(|c| OrderStatus::from_code(c).label()).collect();
    assert_eq!(labels, ["Unknown", "Pending", "Completed", "Cancelled", "Unknown"]);
}
