// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use alloy::sol;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    #[sol(rpc)]
    interface IOrderProcessor {
        // orderType: 0 MARKET, 1 LIMIT. tif: 0 DAY, 1 GTC, 2 IOC, 3 FOK.
        struct Order {
            uint64 requestTimestamp;
            address recipient;
            address assetToken;
            address paymentToken;
            bool sell;
            uint8 orderType;
            uint256 assetTokenQuantity;
            uint256 paymentTokenQuantity;
            uint256 price;
            uint8 tif;
        }

        struct FeeQuote {
            uint256 orderId;
            address requester;
            uint256 fee;
            uint64 timestamp;
            uint64 deadline;
        }

        event OrderCreated(uint256 indexed id, address indexed requester, Order order, uint256 feesEscrowed);

        function createOrder(
            Order calldata order,
            FeeQuote calldata feeQuote,
            bytes calldata feeQuoteSignature
        ) external returns (uint256 id);

        function selfPermit(
            address permitToken,
            address owner,
            uint256 value,
            uint256 deadline,
            uint8 v,
            bytes32 r,
            bytes32 s
        ) external;

        function multicall(bytes[] calldata data) external returns (bytes[] memory results);

        // 0 NONE, 1 ACTIVE, 2 FULFILLED, 3 CANCELLED
        function getOrderStatus(uint256 id) external view returns (uint8);

        function orderDecimalReduction(address token) external view returns (uint8);
    }
}

#[cfg(test)]
mod tests {
    use super::IOrderProcessor::{self, FeeQuote, Order};
    use alloy::primitives::{Address, Bytes, U256};
    use alloy_sol_types::{SolCall, SolEvent};

    #[test]
    fn create_order_call_roundtrips() {
        let order = Order {
            requestTimestamp: 1_700_000_000_000,
            recipient: Address::from([1u8; 20]),
            assetToken: Address::from([2u8; 20]),
            paymentToken: Address::from([3u8; 20]),
            sell: false,
            orderType: 0,
            assetTokenQuantity: U256::ZERO,
            paymentTokenQuantity: U256::from(5_200_000u64),
            price: U256::ZERO,
            tif: 0,
        };
        let quote = FeeQuote {
            orderId: U256::from(9u64),
            requester: Address::from([1u8; 20]),
            fee: U256::from(1_000u64),
            timestamp: 10,
            deadline: 20,
        };
        let call = IOrderProcessor::createOrderCall {
            order: order.clone(),
            feeQuote: quote,
            feeQuoteSignature: Bytes::from(vec![0xab; 65]),
        };
        let encoded = call.abi_encode();
        assert_eq!(&encoded[..4], IOrderProcessor::createOrderCall::SELECTOR.as_slice());

        let decoded = IOrderProcessor::createOrderCall::abi_decode(&encoded).unwrap();
        assert_eq!(decoded.order, order);
        assert!(format!("{:?}", decoded.order).contains("paymentTokenQuantity"));
        assert_eq!(decoded.feeQuote.orderId, U256::from(9u64));
        assert_eq!(decoded.feeQuoteSignature.len(), 65);
    }

    #[test]
    fn order_created_signature_uses_tuple_encoding() {
        assert_eq!(
            IOrderProcessor::OrderCreated::SIGNATURE,
            "OrderCreated(uint256,address,(uint64,address,address,address,bool,uint8,uint256,uint256,uint256,uint8),uint256)"
        );
    }
}
