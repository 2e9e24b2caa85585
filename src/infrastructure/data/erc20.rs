// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use alloy::sol;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    #[sol(rpc)]
    interface IERC20Permit {
        function name() external view returns (string memory);
        function decimals() external view returns (uint8);
        function version() external view returns (string memory);
        function nonces(address owner) external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
    }

    /// EIP-2612 typed-data payload.
    #[derive(Debug, PartialEq, Eq)]
    struct Permit {
        address owner;
        address spender;
        uint256 value;
        uint256 nonce;
        uint256 deadline;
    }
}
