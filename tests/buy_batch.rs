use alloy::primitives::{Address, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy_sol_types::SolCall;
use basket_trader::common::parsing::parse_decimal_units;
use basket_trader::data::order_processor::IOrderProcessor;
use basket_trader::domain::basket::Basket;
use basket_trader::domain::order::OrderTif;
use basket_trader::network::dinari::FeeQuoteResponse;
use basket_trader::network::token::PermitTokenInfo;
use basket_trader::services::orders::buy::{BuyParams, assemble_plan, draft_buy_legs};
use basket_trader::services::orders::permit::{permit_domain, sign_permit};
use basket_trader::data::erc20::Permit;
use std::path::Path;

const PROCESSOR: Address = Address::new([0x0f; 20]);
const USDC: Address = Address::new([0x66; 20]);

fn quote(requester: Address, fee: u64, order_id: u64) -> FeeQuoteResponse {
    serde_json::from_value(serde_json::json!({
        "order_fee_contract_object": {
            "fee_quote": {
                "orderId": format!("0x{order_id:x}"),
                "requester": format!("{requester:#x}"),
                "fee": fee,
                "timestamp": "1752000000",
                "deadline": 1752000300u64
            },
            "fee_quote_signature": "0xabcdef"
        },
        "order_id": "ignored-extra"
    }))
    .unwrap()
}

#[test]
fn sample_basket_buy_batch_decodes_end_to_end() {
    let basket = Basket::load_from_file(Path::new("data/basket.json")).unwrap();
    let total = parse_decimal_units("13.42", 6).unwrap();
    let allocation = basket.allocate(total).unwrap();
    assert_eq!(allocation.legs.len(), 3);

    let signer = PrivateKeySigner::random();
    let wallet = signer.address();
    let params = BuyParams {
        chain_id: 11_155_111,
        recipient: wallet,
        payment_token: USDC,
        payment_decimals: 6,
        tif: OrderTif::Day,
        request_timestamp_ms: 1_752_000_000_000,
    };
    let drafts = draft_buy_legs(&params, &allocation);
    let quotes = (0..drafts.len() as u64)
        .map(|i| quote(wallet, 50_000 + i, 100 + i))
        .collect();
    let plan = assemble_plan(&params, drafts, quotes, allocation.dust).unwrap();
    assert_eq!(plan.total_order_amount() + plan.dust, total);

    let info = PermitTokenInfo {
        address: USDC,
        name: "USD Coin".into(),
        version: "2".into(),
        decimals: 6,
    };
    let permit = sign_permit(
        &signer,
        &permit_domain(&info, 11_155_111),
        USDC,
        Permit {
            owner: wallet,
            spender: PROCESSOR,
            value: plan.total_spend(),
            nonce: U256::ZERO,
            deadline: U256::from(1_752_000_300u64),
        },
    )
    .unwrap();

    let batch = plan.to_batch(&permit).unwrap();
    let outer = IOrderProcessor::multicallCall::abi_decode(&batch.calldata()).unwrap();
    assert_eq!(outer.data.len(), 4);

    let self_permit = IOrderProcessor::selfPermitCall::abi_decode(&outer.data[0]).unwrap();
    assert_eq!(self_permit.permitToken, USDC);
    assert_eq!(self_permit.owner, wallet);
    assert_eq!(self_permit.value, plan.total_spend());

    let mut spent = U256::ZERO;
    for (idx, call) in outer.data[1..].iter().enumerate() {
        let create = IOrderProcessor::createOrderCall::abi_decode(call).unwrap();
        assert_eq!(create.order.recipient, wallet);
        assert_eq!(create.order.paymentToken, USDC);
        assert_eq!(create.order.tif, 0);
        assert!(!create.order.sell);
        assert_eq!(create.feeQuote.orderId, U256::from(100 + idx as u64));
        assert_eq!(create.feeQuote.requester, wallet);
        spent += create.order.paymentTokenQuantity + create.feeQuote.fee;
    }
    assert_eq!(spent, plan.total_spend());
}
