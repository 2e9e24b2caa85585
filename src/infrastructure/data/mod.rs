// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

pub mod deployment;
pub mod erc20;
pub mod ledger;
pub mod order_processor;
