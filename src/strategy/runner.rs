//! Strategy lifecycle and the shared timed-loop runner.
//!
//! Every strategy runs as one tokio task: check the lifecycle flag, execute
//! a cycle, sleep the strategy's interval, repeat. The sleep is the single
//! suspension point between cycles, so a stop request can never interleave
//! with a cycle body — it is observed at the top of the next iteration.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Lifecycle phases of a strategy loop. Stopped is terminal; a stopped
/// instance cannot be restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BotState {
    Idle = 0,
    Running = 1,
    Stopping = 2,
    Stopped = 3,
}

impl BotState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => BotState::Idle,
            1 => BotState::Running,
            2 => BotState::Stopping,
            _ => BotState::Stopped,
        }
    }
}

/// One strategy instance, driven by [`spawn_bot`].
///
/// `run_cycle` errors are caught and logged by the runner; they never kill
/// the loop. `next_interval` is re-queried after every cycle so strategies
/// with randomized pacing re-draw it each time.
#[async_trait]
pub trait Bot: Send {
    fn name(&self) -> &'static str;
    fn sub_account_id(&self) -> u16;
    fn next_interval(&mut self) -> Duration;
    async fn run_cycle(&mut self) -> anyhow::Result<()>;
}

/// Handle for observing and stopping a running strategy loop.
#[derive(Clone)]
pub struct BotHandle {
    name: &'static str,
    sub_account_id: u16,
    state: Arc<AtomicU8>,
}

impl BotHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn sub_account_id(&self) -> u16 {
        self.sub_account_id
    }

    pub fn state(&self) -> BotState {
        BotState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Request a cooperative stop. Advisory: an in-flight cycle completes;
    /// the loop observes the flag before starting the next one. Idempotent.
    pub fn stop(&self) {
        // A loop that never ran goes straight to Stopped.
        let _ = self.state.compare_exchange(
            BotState::Idle as u8,
            BotState::Stopped as u8,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
        let _ = self.state.compare_exchange(
            BotState::Running as u8,
            BotState::Stopping as u8,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
        info!(bot = self.name, "Stop requested");
    }
}

/// Start a strategy loop on the tokio runtime.
///
/// Transitions the instance Idle -> Running and returns its handle plus the
/// loop task. The task finishes only after the handle observes a stop and
/// the state reaches Stopped.
pub fn spawn_bot(mut bot: Box<dyn Bot>) -> (BotHandle, JoinHandle<()>) {
    let handle = BotHandle {
        name: bot.name(),
        sub_account_id: bot.sub_account_id(),
        state: Arc::new(AtomicU8::new(BotState::Idle as u8)),
    };
    handle
        .state
        .store(BotState::Running as u8, Ordering::SeqCst);

    let loop_handle = handle.clone();
    let task = tokio::spawn(async move {
        info!(
            bot = loop_handle.name,
            sub_account = loop_handle.sub_account_id,
            "Strategy loop started"
        );

        while loop_handle.state() == BotState::Running {
            if let Err(err) = bot.run_cycle().await {
                // Per-cycle failures are local: log with context and keep
                // the loop alive for the next tick.
                error!(
                    bot = loop_handle.name,
                    error = format!("{err:#}"),
                    "Cycle failed"
                );
            }

            let interval = bot.next_interval();
            tokio::time::sleep(interval).await;
        }

        loop_handle
            .state
            .store(BotState::Stopped as u8, Ordering::SeqCst);
        info!(bot = loop_handle.name, "Strategy loop stopped");
    });

    (handle, task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    struct CountingBot {
        cycles: Arc<AtomicU32>,
        fail: bool,
    }

    #[async_trait]
    impl Bot for CountingBot {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn sub_account_id(&self) -> u16 {
            9
        }

        fn next_interval(&mut self) -> Duration {
            Duration::from_millis(10)
        }

        async fn run_cycle(&mut self) -> anyhow::Result<()> {
            self.cycles.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("boom");
            }
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_cycles_until_stopped() {
        let cycles = Arc::new(AtomicU32::new(0));
        let (handle, task) = spawn_bot(Box::new(CountingBot {
            cycles: cycles.clone(),
            fail: false,
        }));
        assert_eq!(handle.state(), BotState::Running);

        tokio::time::sleep(Duration::from_millis(55)).await;
        let seen = cycles.load(Ordering::SeqCst);
        assert!(seen >= 2, "expected several cycles, saw {seen}");

        handle.stop();
        task.await.unwrap();
        assert_eq!(handle.state(), BotState::Stopped);

        // No further cycles after Stopped.
        let at_stop = cycles.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(cycles.load(Ordering::SeqCst), at_stop);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycle_errors_do_not_kill_loop() {
        let cycles = Arc::new(AtomicU32::new(0));
        let (handle, task) = spawn_bot(Box::new(CountingBot {
            cycles: cycles.clone(),
            fail: true,
        }));

        tokio::time::sleep(Duration::from_millis(55)).await;
        assert!(cycles.load(Ordering::SeqCst) >= 2);
        assert_eq!(handle.state(), BotState::Running);

        handle.stop();
        task.await.unwrap();
        assert_eq!(handle.state(), BotState::Stopped);
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let cycles = Arc::new(AtomicU32::new(0));
        let (handle, task) = spawn_bot(Box::new(CountingBot {
            cycles,
            fail: false,
        }));

        handle.stop();
        handle.stop();
        task.await.unwrap();
        assert_eq!(handle.state(), BotState::Stopped);
    }
}
