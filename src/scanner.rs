// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Continuous QR scanning.
//!
//! Each tick captures at most one decoded frame. A code that differs from the
//! last one seen is verified on its own task, and the result is published
//! only if that code is still the latest when verification finishes. Late
//! results for superseded codes are dropped.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::token::{TokenVerifier, Verification};

/// Roughly one display frame.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Camera (or anything else) yielding decoded QR text.
pub trait FrameSource: Send + 'static {
    /// Text of the code in the current frame, if one was found.
    fn capture(&mut self) -> Option<String>;
}

/// Verification outcome for one scanned code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub code: String,
    pub verification: Verification,
}

/// Tracks the latest code so stale results can be discarded.
#[derive(Debug, Default)]
pub struct ScanTracker {
    latest: Mutex<Option<String>>,
}

impl ScanTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `code` as the latest. `false` if it already was.
    pub fn begin(&self, code: &str) -> bool {
        let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        if latest.as_deref() == Some(code) {
            return false;
        }
        *latest = Some(code.to_string());
        true
    }

    /// Run `publish` only while `code` is still the latest.
    ///
    /// The check and the publish happen under one lock, so a newer `begin`
    /// cannot slip in between them.
    pub fn publish_if_latest(&self, code: &str, publish: impl FnOnce()) -> bool {
        let latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        if latest.as_deref() != Some(code) {
            return false;
        }
        publish();
        true
    }
}

pub struct ScanLoop<F> {
    source: F,
    verifier: TokenVerifier,
    frame_interval: Duration,
}

impl<F: FrameSource> ScanLoop<F> {
    pub fn new(source: F, verifier: TokenVerifier) -> Self {
        Self {
            source,
            verifier,
            frame_interval: DEFAULT_FRAME_INTERVAL,
        }
    }

    pub fn with_frame_interval(mut self, frame_interval: Duration) -> Self {
        self.frame_interval = frame_interval;
        self
    }

    /// Start scanning on a background task. Cancel `shutdown` to stop.
    pub fn spawn(self, shutdown: CancellationToken) -> (JoinHandle<()>, watch::Receiver<Option<ScanResult>>) {
        let (tx, rx) = watch::channel(None);
        let handle = tokio::spawn(self.run(shutdown, tx));
        (handle, rx)
    }

    pub async fn run(mut self, shutdown: CancellationToken, results: watch::Sender<Option<ScanResult>>) {
        let tracker = Arc::new(ScanTracker::new());
        let results = Arc::new(results);
        let mut ticker = interval(self.frame_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(interval_ms = self.frame_interval.as_millis() as u64, "Scan loop started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Scan loop stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let Some(code) = self.source.capture() else {
                        continue;
                    };
                    if !tracker.begin(&code) {
                        continue;
                    }

                    let verifier = self.verifier.clone();
                    let tracker = tracker.clone();
                    let results = results.clone();
                    tokio::spawn(async move {
                        let verification = verifier.verify(&code);
                        let published = tracker.publish_if_latest(&code, || {
                            results.send_replace(Some(ScanResult {
                                code: code.clone(),
                                verification,
                            }));
                        });
                        if !published {
                            debug!("Discarded verification for a superseded code");
                        }
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    use crate::session::AuthState;
    use crate::token::fixtures::{test_signing_key, test_verifying_key};
    use crate::token::{issue, Role, TokenClaims, TokenError};

    struct Frames(VecDeque<Option<String>>);

    impl FrameSource for Frames {
        fn capture(&mut self) -> Option<String> {
            self.0.pop_front().flatten()
        }
    }

    fn jane_code() -> String {
        let claims = TokenClaims {
            sub: "7".to_string(),
            role: Role::Resident,
            name: "Jane Doe".to_string(),
            bld: "C".to_string(),
            unit: "101".to_string(),
            ic: 1,
            iss: "J.Smith-3".to_string(),
        };
        issue(&claims, &test_signing_key()).unwrap()
    }

    async fn first_result(frames: Vec<Option<String>>) -> ScanResult {
        let scan = ScanLoop::new(Frames(frames.into()), TokenVerifier::new(test_verifying_key()))
            .with_frame_interval(Duration::from_millis(1));
        let shutdown = CancellationToken::new();
        let (handle, mut rx) = scan.spawn(shutdown.clone());

        let result = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                rx.changed().await.unwrap();
                if let Some(result) = rx.borrow_and_update().clone() {
                    return result;
                }
            }
        })
        .await
        .unwrap();

        shutdown.cancel();
        handle.await.unwrap();
        result
    }

    #[tokio::test]
    async fn scanned_resident_code_yields_resident_session() {
        let code = jane_code();
        let result = first_result(vec![None, None, Some(code.clone())]).await;

        assert_eq!(result.code, code);
        let claims = result.verification.unwrap();
        assert_eq!(AuthState::derive(Some(&claims)), AuthState::Resident);
        assert_eq!(claims.name, "Jane Doe");
    }

    #[tokio::test]
    async fn garbage_frame_is_reported_not_fatal() {
        let result = first_result(vec![Some("hello world".to_string())]).await;
        assert_eq!(result.verification, Err(TokenError::MalformedToken));
    }

    #[tokio::test]
    async fn cancel_stops_an_idle_loop() {
        let scan = ScanLoop::new(Frames(VecDeque::new()), TokenVerifier::new(test_verifying_key()));
        let shutdown = CancellationToken::new();
        let (handle, rx) = scan.spawn(shutdown.clone());

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(rx.borrow().is_none());
    }

    #[test]
    fn tracker_drops_superseded_results() {
        let tracker = ScanTracker::new();
        assert!(tracker.begin("a"));
        assert!(!tracker.begin("a"));
        assert!(tracker.begin("b"));

        let mut published = Vec::new();
        assert!(!tracker.publish_if_latest("a", || published.push("a")));
        assert!(tracker.publish_if_latest("b", || published.push("b")));
        assert_eq!(published, ["b"]);
    }
}
