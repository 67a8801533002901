//! # Timeout Service
//!
//! Composes the intake handler and the sweeper and owns the recurring sweep
//! loop. One loop task per service instance; ticks that land while a sweep
//! is still running are skipped, never queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::codec::PayloadCodec;
use crate::config::ServiceConfig;
use crate::domain::StoreStatus;
use crate::error::{StoreError, SweepError};
use crate::handler::TimeoutRequestHandler;
use crate::ports::{BusGateway, Clock, SystemClock, TimeoutStore};
use crate::sweeper::{SweepOutcome, Sweeper};

/// The assembled timeout service: request intake, the sweep transaction,
/// and the recurring loop with start/stop lifecycle.
pub struct TimeoutService {
    config: ServiceConfig,
    store: Arc<dyn TimeoutStore>,
    handler: Arc<TimeoutRequestHandler>,
    sweeper: Arc<Sweeper>,
    shutdown: Mutex<Option<watch::Sender<bool>>>,
    loop_handle: Mutex<Option<JoinHandle<()>>>,
    is_running: AtomicBool,
}

impl TimeoutService {
    /// Assembles a service on the system clock.
    pub fn new(
        config: ServiceConfig,
        store: Arc<dyn TimeoutStore>,
        gateway: Arc<dyn BusGateway>,
        codec: PayloadCodec,
    ) -> Self {
        Self::with_clock(config, store, gateway, codec, Arc::new(SystemClock))
    }

    /// Assembles a service on an explicit time source.
    pub fn with_clock(
        config: ServiceConfig,
        store: Arc<dyn TimeoutStore>,
        gateway: Arc<dyn BusGateway>,
        codec: PayloadCodec,
        clock: Arc<dyn Clock>,
    ) -> Self {
        info!(
            input_queue = %config.input_queue,
            sweep_interval_ms = config.sweep_interval.as_millis() as u64,
            "initializing timeout service"
        );

        let codec = Arc::new(codec);
        let handler = Arc::new(TimeoutRequestHandler::new(
            store.clone(),
            codec.clone(),
            clock.clone(),
        ));
        let sweeper = Arc::new(Sweeper::new(store.clone(), gateway, codec, clock));

        Self {
            config,
            store,
            handler,
            sweeper,
            shutdown: Mutex::new(None),
            loop_handle: Mutex::new(None),
            is_running: AtomicBool::new(false),
        }
    }

    /// The inbound handler the transport dispatches deliveries to.
    #[must_use]
    pub fn handler(&self) -> Arc<TimeoutRequestHandler> {
        self.handler.clone()
    }

    /// The queue name requesters address their timeout requests to.
    #[must_use]
    pub fn input_queue(&self) -> &str {
        &self.config.input_queue
    }

    /// Whether the sweep loop is currently running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }

    /// Store counters, for health surfaces.
    pub async fn status(&self) -> Result<StoreStatus, StoreError> {
        self.store.status().await
    }

    /// Runs one sweep outside the loop. Shares the loop's overlap guard, so
    /// a call landing mid-sweep returns [`SweepOutcome::Skipped`].
    pub async fn sweep_now(&self) -> Result<SweepOutcome, SweepError> {
        self.sweeper.sweep_once().await
    }

    /// Starts the sweep loop. Idempotent: starting a running service is a
    /// no-op. Must be called within a Tokio runtime.
    pub fn start(&self) {
        if self.is_running.swap(true, Ordering::SeqCst) {
            debug!("timeout service already running");
            return;
        }

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        // tokio's interval panics on a zero period.
        let period = self.config.sweep_interval.max(Duration::from_millis(1));
        let sweeper = self.sweeper.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            info!(
                interval_ms = period.as_millis() as u64,
                "timeout sweep loop started"
            );

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(error) = sweeper.sweep_once().await {
                            warn!(error = %error, "sweep failed, batch will be retried");
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        info!("timeout sweep loop stopping");
                        break;
                    }
                }
            }
        });

        *self
            .shutdown
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(shutdown_tx);
        *self
            .loop_handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    /// Stops the sweep loop, letting an in-progress sweep finish first so
    /// no batch is left in flight. Stopping a stopped service is a no-op.
    pub async fn stop(&self) {
        if !self.is_running.swap(false, Ordering::SeqCst) {
            return;
        }

        if let Some(shutdown) = self
            .shutdown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            let _ = shutdown.send(true);
        }

        let handle = self
            .loop_handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if let Err(error) = handle.await {
                warn!(error = %error, "sweep loop task ended abnormally");
            }
        }

        info!("timeout service stopped");
    }
}
