//! Timer adapter.
//!
//! [`ReactorDelay`] implements [`DelayPort`] on the `async-io-mini`
//! reactor, so a waiting checker task yields to its siblings instead of
//! blocking the executor thread.

use core::time::Duration;

use async_io_mini::Timer;

use crate::app::ports::DelayPort;

#[derive(Debug, Default, Clone, Copy)]
pub struct ReactorDelay;

impl DelayPort for ReactorDelay {
    async fn delay_ms(&self, ms: u64) {
        Timer::after(Duration::from_millis(ms)).await;
    }
}
