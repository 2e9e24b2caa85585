// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

pub mod backend;
pub mod dinari;
pub mod gas;
pub mod processor;
pub mod provider;
pub mod token;
