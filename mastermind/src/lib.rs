//! Lookup data for the image serving platform: the publisher to account table
//! and the serving directives, held as swappable immutable snapshots.

pub mod loader;
pub mod metrics_defs;
pub mod types;

use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub use types::{Directive, Fraction, N_ABTEST_BUCKETS, ScaledImage, Snapshot};

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum LookupError {
    #[error("no account found for publisher")]
    PublisherNotFound,
}

/// Maps an external publisher id onto the internal account id.
pub trait AccountResolver: Send + Sync {
    fn resolve_account(&self, publisher_id: &str) -> Result<String, LookupError>;
}

/// Read-only view of the serving directives.
pub trait DirectiveStore: Send + Sync {
    fn directive_exists(&self, account_id: &str, video_id: &str) -> bool;

    /// Returns the image url for the bucket and requested size. `None` for
    /// width or height selects the default rendition.
    fn resolve_image_url(
        &self,
        account_id: &str,
        video_id: &str,
        bucket_id: &str,
        width: Option<i64>,
        height: Option<i64>,
    ) -> Option<String>;

    fn resolve_thumbnail_id(
        &self,
        account_id: &str,
        video_id: &str,
        bucket_id: &str,
    ) -> Option<String>;
}

struct MastermindInner {
    snapshot: RwLock<Arc<Snapshot>>,
    // Used by the readiness probe. Initially false and set to true once any
    // snapshot has been installed.
    ready: AtomicBool,
}

/// Shared handle to the active snapshot.
///
/// Every lookup grabs the snapshot that is current at the time of the call,
/// so two lookups made for the same request may observe different snapshots
/// if a reload lands in between.
#[derive(Clone)]
pub struct Mastermind {
    inner: Arc<MastermindInner>,
}

impl Default for Mastermind {
    fn default() -> Self {
        Self::new()
    }
}

impl Mastermind {
    pub fn new() -> Self {
        Mastermind {
            inner: Arc::new(MastermindInner {
                snapshot: RwLock::new(Arc::new(Snapshot::default())),
                ready: AtomicBool::new(false),
            }),
        }
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mastermind = Self::new();
        mastermind.install(snapshot);
        mastermind
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.snapshot.read().clone()
    }

    /// Replaces the active snapshot. Readers holding the old one keep it
    /// until they drop their reference.
    pub fn install(&self, snapshot: Snapshot) {
        shared::gauge!(metrics_defs::MASTERMIND_PUBLISHERS).set(snapshot.publisher_count() as f64);
        shared::gauge!(metrics_defs::MASTERMIND_DIRECTIVES).set(snapshot.directive_count() as f64);

        *self.inner.snapshot.write() = Arc::new(snapshot);
        self.inner.ready.store(true, Ordering::Relaxed);
    }

    pub fn is_ready(&self) -> bool {
        self.inner.ready.load(Ordering::Relaxed)
    }
}

impl AccountResolver for Mastermind {
    fn resolve_account(&self, publisher_id: &str) -> Result<String, LookupError> {
        self.snapshot()
            .account_id(publisher_id)
            .map(str::to_string)
            .ok_or(LookupError::PublisherNotFound)
    }
}

impl DirectiveStore for Mastermind {
    fn directive_exists(&self, account_id: &str, video_id: &str) -> bool {
        self.snapshot().directive(account_id, video_id).is_some()
    }

    fn resolve_image_url(
        &self,
        account_id: &str,
        video_id: &str,
        bucket_id: &str,
        width: Option<i64>,
        height: Option<i64>,
    ) -> Option<String> {
        let snapshot = self.snapshot();
        snapshot
            .directive(account_id, video_id)?
            .select_fraction(bucket_id)?
            .image_url(width, height)
            .map(str::to_string)
    }

    fn resolve_thumbnail_id(
        &self,
        account_id: &str,
        video_id: &str,
        bucket_id: &str,
    ) -> Option<String> {
        let snapshot = self.snapshot();
        snapshot
            .directive(account_id, video_id)?
            .select_fraction(bucket_id)
            .map(|fraction| fraction.tid.clone())
            .filter(|tid| !tid.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_snapshot(url: &str) -> Snapshot {
        let mut snapshot = Snapshot::default();
        snapshot.insert_publisher("p1", "acc1");
        snapshot.insert_directive(
            "acc1",
            "vid1",
            Directive {
                fractions: vec![Fraction {
                    pct: 1.0,
                    tid: "acc1_vid1_t1".into(),
                    default_url: url.into(),
                    imgs: vec![],
                }],
            },
        );
        snapshot
    }

    #[test]
    fn test_not_ready_until_installed() {
        let mastermind = Mastermind::new();
        assert!(!mastermind.is_ready());
        assert_eq!(
            mastermind.resolve_account("p1"),
            Err(LookupError::PublisherNotFound)
        );

        mastermind.install(test_snapshot("http://img/a.jpg"));
        assert!(mastermind.is_ready());
        assert_eq!(mastermind.resolve_account("p1"), Ok("acc1".into()));
    }

    #[test]
    fn test_directive_lookups() {
        let mastermind = Mastermind::from_snapshot(test_snapshot("http://img/a.jpg"));

        assert!(mastermind.directive_exists("acc1", "vid1"));
        assert!(!mastermind.directive_exists("acc1", "vid2"));
        assert_eq!(
            mastermind.resolve_image_url("acc1", "vid1", "", None, None),
            Some("http://img/a.jpg".into())
        );
        assert_eq!(
            mastermind.resolve_thumbnail_id("acc1", "vid1", "3f"),
            Some("acc1_vid1_t1".into())
        );
        assert_eq!(mastermind.resolve_thumbnail_id("acc1", "nope", "3f"), None);
    }

    #[test]
    fn test_held_snapshot_survives_swap() {
        let mastermind = Mastermind::from_snapshot(test_snapshot("http://img/old.jpg"));
        let held = mastermind.snapshot();

        mastermind.install(test_snapshot("http://img/new.jpg"));

        let old_url = held
            .directive("acc1", "vid1")
            .and_then(|d| d.select_fraction(""))
            .and_then(|f| f.image_url(None, None));
        assert_eq!(old_url, Some("http://img/old.jpg"));
        assert_eq!(
            mastermind.resolve_image_url("acc1", "vid1", "", None, None),
            Some("http://img/new.jpg".into())
        );
    }
}
