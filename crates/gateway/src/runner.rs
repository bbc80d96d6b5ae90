//! Session runner
//!
//! Runs the inbound delivery loop and a caller strategy side by side. The
//! strategy issues blocking requests on a blocking-pool thread while the
//! delivery task keeps feeding callbacks to the components that wake it.
//! Whichever finishes first (strategy, inbound channel, Ctrl-C) stops the
//! other through the shared stop flag.

use log::{error, info};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

use crate::client::Client;
use crate::error::GatewayResult;
use crate::transport::EventReceiver;

/// Caller logic driven against a connected [`Client`]
pub trait Strategy: Send + 'static {
    fn name(&self) -> &str {
        "strategy"
    }

    /// Run until done or until `stop` is raised.
    ///
    /// Called on a blocking-pool thread, so blocking requests are fine here.
    fn run(&mut self, client: &Client, stop: &AtomicBool);
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    StrategyFinished,
    InboundClosed,
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionReport {
    pub reason: StopReason,
    /// Inbound events delivered
    pub delivered: usize,
}

pub struct Session;

impl Session {
    pub async fn start<S: Strategy>(
        client: Arc<Client>,
        inbound: EventReceiver,
        mut strategy: S,
    ) -> GatewayResult<SessionReport> {
        let stop = Arc::new(AtomicBool::new(false));
        let shutdown = Arc::new(Notify::new());

        let mut delivery = tokio::spawn(Self::deliver(
            Arc::clone(&client),
            inbound,
            Arc::clone(&shutdown),
        ));

        let mut strategy_task = {
            let client = Arc::clone(&client);
            let stop = Arc::clone(&stop);
            tokio::task::spawn_blocking(move || {
                info!("Strategy {} started", strategy.name());
                strategy.run(&client, &stop);
                info!("Strategy {} finished", strategy.name());
            })
        };

        let mut delivered = None;
        let mut strategy_done = false;

        let reason = tokio::select! {
            joined = &mut strategy_task => {
                joined?;
                strategy_done = true;
                StopReason::StrategyFinished
            }
            joined = &mut delivery => {
                delivered = Some(joined?);
                StopReason::InboundClosed
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    error!("Failed to listen for Ctrl-C: {}", e);
                }
                StopReason::Interrupted
            }
        };
        info!("Stopping session: {:?}", reason);

        stop.store(true, Ordering::Release);
        shutdown.notify_one();

        if !strategy_done {
            strategy_task.await?;
        }
        let delivered = match delivered {
            Some(count) => count,
            None => delivery.await?,
        };

        info!("Session stopped after {} events", delivered);
        Ok(SessionReport { reason, delivered })
    }

    async fn deliver(
        client: Arc<Client>,
        mut inbound: EventReceiver,
        shutdown: Arc<Notify>,
    ) -> usize {
        let mut delivered = 0;
        loop {
            tokio::select! {
                event = inbound.next() => match event {
                    Some(event) => {
                        client.dispatch(&event);
                        delivered += 1;
                    }
                    None => break,
                },
                _ = shutdown.notified() => break,
            }
        }
        delivered
    }
}

/// Install the env_logger backend, `info` unless `RUST_LOG` says otherwise.
///
/// Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
