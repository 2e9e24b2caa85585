// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

pub const READ_ATTEMPTS: usize = 3;
pub const READ_BACKOFF: Duration = Duration::from_millis(150);

/// Retry an async read with exponential backoff; `label` names the call in logs.
pub async fn retry_async<F, Fut, T, E>(
    label: &str,
    mut op: F,
    attempts: usize,
    initial_delay: Duration,
) -> Result<T, E>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut delay = initial_delay;
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(v) => return Ok(v),
            Err(e) if attempt < attempts => {
                tracing::debug!(target: "rpc", call = label, attempt, error = %e, "Retrying");
                sleep(delay).await;
                delay = delay.saturating_mul(2);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Shorthand for chain reads with the default attempt budget.
pub async fn retry_read<F, Fut, T, E>(label: &str, op: F) -> Result<T, E>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    retry_async(label, op, READ_ATTEMPTS, READ_BACKOFF).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn retries_until_success() {
        let counter = AtomicUsize::new(0);
        let res: Result<u32, String> = retry_async(
            "test",
            |_| {
                let current = counter.fetch_add(1, Ordering::Relaxed);
                async move {
                    if current < 2 {
                        Err("not yet".to_string())
                    } else {
                        Ok(7)
                    }
                }
            },
            4,
            Duration::from_millis(1),
        )
        .await;

        assert_eq!(res.unwrap(), 7);
        assert_eq!(counter.load(Ordering::Relaxed), 3);
    }

    #[tokio::test]
    async fn gives_up_after_budget() {
        let counter = AtomicUsize::new(0);
        let res: Result<u32, String> = retry_async(
            "test",
            |attempt| {
                counter.fetch_add(1, Ordering::Relaxed);
                async move { Err(format!("fail {attempt}")) }
            },
            2,
            Duration::from_millis(1),
        )
        .await;

        assert_eq!(res.unwrap_err(), "fail 2");
        assert_eq!(counter.load(Ordering::Relaxed), 2);
    }
}
