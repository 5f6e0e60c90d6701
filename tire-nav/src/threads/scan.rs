//! Radio scan worker: runs blocking scans off the control thread.
//!
//! At most one scan is outstanding. The `in_flight` flag is raised by
//! [`ScanWorker::request`] and lowered by a guard on the worker side once the
//! scan has finished, failed or panicked. A request made while the flag is up
//! is dropped.
//!
//! A scan that takes longer than `window + grace` is discarded: the
//! pedestrian has moved on and the fix would pull the pose backwards.

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::{NavError, Result};
use tire_core::RadioScan;
use tire_hal::RadioScanner;

/// A request for one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanRequest {
    /// Sequence number, increasing per accepted request
    pub seq: u64,
}

/// A completed scan.
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub request: ScanRequest,
    pub scan: RadioScan,
    /// Time from request pickup to scan completion
    pub duration: Duration,
}

/// Clears the in-flight flag when dropped.
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Handle to the scan worker thread.
pub struct ScanWorker {
    request_tx: Option<Sender<ScanRequest>>,
    result_rx: Receiver<ScanResult>,
    in_flight: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    next_seq: u64,
}

impl ScanWorker {
    /// Move `scanner` onto a new `scan` thread.
    pub fn spawn(scanner: Box<dyn RadioScanner>, window: Duration, max_age: Duration) -> Result<Self> {
        let (request_tx, request_rx) = bounded::<ScanRequest>(1);
        let (result_tx, result_rx) = bounded::<ScanResult>(1);
        let in_flight = Arc::new(AtomicBool::new(false));
        let worker_flag = Arc::clone(&in_flight);

        let handle = thread::Builder::new()
            .name("scan".into())
            .spawn(move || {
                scan_loop(scanner, request_rx, result_tx, worker_flag, window, max_age);
            })
            .map_err(|e| NavError::Thread(format!("Failed to spawn scan thread: {}", e)))?;

        Ok(Self {
            request_tx: Some(request_tx),
            result_rx,
            in_flight,
            handle: Some(handle),
            next_seq: 0,
        })
    }

    /// Ask for a scan. Returns `false` if one is already in flight.
    pub fn request(&mut self) -> bool {
        let Some(tx) = self.request_tx.as_ref() else {
            return false;
        };
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::debug!("[ScanWorker] Scan already in flight, request dropped");
            return false;
        }

        let request = ScanRequest { seq: self.next_seq };
        match tx.try_send(request) {
            Ok(()) => {
                self.next_seq += 1;
                log::trace!("[ScanWorker] Requested scan #{}", request.seq);
                true
            }
            Err(TrySendError::Full(_)) => {
                self.in_flight.store(false, Ordering::Release);
                log::debug!("[ScanWorker] Request queue full, request dropped");
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                self.in_flight.store(false, Ordering::Release);
                log::warn!("[ScanWorker] Worker has stopped, request dropped");
                false
            }
        }
    }

    /// Finished scan, if any. Never blocks.
    pub fn poll(&self) -> Option<ScanResult> {
        self.result_rx.try_recv().ok()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Stop the worker and wait for it. A scan in progress runs to completion.
    pub fn shutdown(&mut self) {
        // Closing the request channel ends the worker loop
        self.request_tx.take();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            log::error!("[ScanWorker] Scan thread panicked");
        }
    }
}

impl Drop for ScanWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn scan_loop(
    mut scanner: Box<dyn RadioScanner>,
    requests: Receiver<ScanRequest>,
    results: Sender<ScanResult>,
    in_flight: Arc<AtomicBool>,
    window: Duration,
    max_age: Duration,
) {
    log::info!("[ScanWorker] Started (window {:?}, max age {:?})", window, max_age);

    for request in requests.iter() {
        let _guard = InFlightGuard(Arc::clone(&in_flight));
        let started = Instant::now();

        let scan = match scanner.scan(window) {
            Ok(scan) => scan,
            Err(e) => {
                log::warn!("[ScanWorker] Scan #{} failed: {}", request.seq, e);
                continue;
            }
        };

        let duration = started.elapsed();
        if duration > max_age {
            log::warn!(
                "[ScanWorker] Scan #{} took {:?}, discarded as stale",
                request.seq,
                duration
            );
            continue;
        }

        log::debug!(
            "[ScanWorker] Scan #{}: {} beacons in {:?}",
            request.seq,
            scan.len(),
            duration
        );
        let result = ScanResult {
            request,
            scan,
            duration,
        };
        if results.send(result).is_err() {
            break;
        }
    }

    log::info!("[ScanWorker] Stopped");
}
