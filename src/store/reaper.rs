// REFCUE Session Reaper
// Copyright (c) 2026 Xing_The_Creator | REFCUE
//
// Browser sessions end without telling the server. The reaper runs as a
// background task and drops practice sessions nobody has touched for a while.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::SessionStore;

pub struct SessionReaper {
    store: Arc<SessionStore>,
    ttl: Duration,
    sweep_interval: Duration,
    start_time: Instant,
    is_running: Arc<AtomicBool>,
    sweep_count: Arc<AtomicU64>,
    evicted_count: Arc<AtomicU64>,
}

impl SessionReaper {
    pub fn new(store: Arc<SessionStore>, ttl: Duration, sweep_interval: Duration) -> Self {
        Self {
            store,
            ttl,
            sweep_interval,
            start_time: Instant::now(),
            is_running: Arc::new(AtomicBool::new(false)),
            sweep_count: Arc::new(AtomicU64::new(0)),
            evicted_count: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Sweep interval for a given TTL: a tenth of it, between 1s and 10min.
    pub fn interval_for(ttl: Duration) -> Duration {
        (ttl / 10).clamp(Duration::from_secs(1), Duration::from_secs(600))
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Relaxed)
    }

    pub fn sweep_count(&self) -> u64 {
        self.sweep_count.load(Ordering::Relaxed)
    }

    pub fn evicted_count(&self) -> u64 {
        self.evicted_count.load(Ordering::Relaxed)
    }

    /// One eviction pass.
    pub fn sweep(&self) -> usize {
        sweep_once(&self.store, self.ttl, &self.sweep_count, &self.evicted_count)
    }

    /// Start the background loop. Must be called inside a tokio runtime;
    /// `stop` ends it after the current sleep.
    pub fn start(&self) {
        let is_running = self.is_running.clone();
        let store = self.store.clone();
        let sweep_count = self.sweep_count.clone();
        let evicted_count = self.evicted_count.clone();
        let ttl = self.ttl;
        let interval = self.sweep_interval;

        is_running.store(true, Ordering::Relaxed);

        tokio::spawn(async move {
            info!("[REAPER] Started (ttl: {:?}, interval: {:?})", ttl, interval);

            while is_running.load(Ordering::Relaxed) {
                tokio::time::sleep(interval).await;
                if !is_running.load(Ordering::Relaxed) {
                    break;
                }
                sweep_once(&store, ttl, &sweep_count, &evicted_count);
            }

            info!("[REAPER] Stopped.");
        });
    }

    pub fn stop(&self) {
        self.is_running.store(false, Ordering::Relaxed);
        info!("[REAPER] Shutdown requested.");
    }

    pub fn status_report(&self) -> String {
        let uptime = self.start_time.elapsed().as_secs();
        format!(
            "REFCUE Session Report\n  Uptime: {}h {}m {}s\n  Sweeps: {}\n  Expired sessions: {}\n  Live sessions: {}",
            uptime / 3600,
            (uptime % 3600) / 60,
            uptime % 60,
            self.sweep_count(),
            self.evicted_count(),
            self.store.len(),
        )
    }
}

fn sweep_once(
    store: &SessionStore,
    ttl: Duration,
    sweep_count: &AtomicU64,
    evicted_count: &AtomicU64,
) -> usize {
    let evicted = store.evict_idle(ttl);
    let count = sweep_count.fetch_add(1, Ordering::Relaxed) + 1;
    if evicted > 0 {
        evicted_count.fetch_add(evicted as u64, Ordering::Relaxed);
        info!("[REAPER] 🧹 Expired {} idle sessions (sweep #{})", evicted, count);
    } else {
        debug!("[REAPER] Sweep #{}: nothing to expire", count);
    }
    evicted
}
