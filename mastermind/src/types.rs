use serde::Deserialize;
use std::collections::HashMap;

/// Number of A/B test buckets a video is split into.
pub const N_ABTEST_BUCKETS: u32 = 100;

pub type AccountId = String;
pub type PublisherId = String;

/// One image rendition of a thumbnail.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ScaledImage {
    pub w: i64,
    pub h: i64,
    pub url: String,
}

/// A thumbnail and the share of traffic it should receive.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Fraction {
    pub pct: f64,
    pub tid: String,
    #[serde(default)]
    pub default_url: String,
    #[serde(default)]
    pub imgs: Vec<ScaledImage>,
}

impl Fraction {
    /// Returns the rendition matching the requested size exactly, or the default url.
    pub fn image_url(&self, width: Option<i64>, height: Option<i64>) -> Option<&str> {
        let scaled = match (width, height) {
            (Some(w), Some(h)) => self.imgs.iter().find(|img| img.w == w && img.h == h),
            _ => None,
        };

        scaled
            .map(|img| img.url.as_str())
            .or(Some(self.default_url.as_str()))
            .filter(|url| !url.is_empty())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Directive {
    pub fractions: Vec<Fraction>,
}

impl Directive {
    /// Maps a hex bucket id onto the fraction that owns that slice of traffic.
    ///
    /// Buckets are laid out in fraction order: bucket `b` belongs to the first
    /// fraction whose cumulative `pct` exceeds `b / N_ABTEST_BUCKETS`. An empty
    /// or malformed bucket falls back to the fraction with the largest share.
    pub fn select_fraction(&self, bucket_id: &str) -> Option<&Fraction> {
        match u32::from_str_radix(bucket_id, 16) {
            Ok(bucket) => {
                let point = f64::from(bucket) / f64::from(N_ABTEST_BUCKETS);
                let mut cumulative = 0.0;
                for fraction in &self.fractions {
                    cumulative += fraction.pct;
                    if point < cumulative {
                        return Some(fraction);
                    }
                }
                self.fractions.last()
            }
            Err(_) => self
                .fractions
                .iter()
                .max_by(|a, b| a.pct.total_cmp(&b.pct)),
        }
    }
}

/// Immutable view of the publisher table and the directives.
///
/// A snapshot is never mutated after it has been installed; reloads build a
/// new one and swap it in whole.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    publishers: HashMap<PublisherId, AccountId>,
    directives: HashMap<AccountId, HashMap<String, Directive>>,
}

impl Snapshot {
    pub fn insert_publisher(&mut self, publisher_id: impl Into<String>, account_id: impl Into<String>) {
        self.publishers
            .insert(publisher_id.into(), account_id.into());
    }

    pub fn insert_directive(
        &mut self,
        account_id: impl Into<String>,
        video_id: impl Into<String>,
        directive: Directive,
    ) {
        self.directives
            .entry(account_id.into())
            .or_default()
            .insert(video_id.into(), directive);
    }

    pub fn account_id(&self, publisher_id: &str) -> Option<&str> {
        self.publishers.get(publisher_id).map(String::as_str)
    }

    pub fn directive(&self, account_id: &str, video_id: &str) -> Option<&Directive> {
        self.directives.get(account_id)?.get(video_id)
    }

    pub fn publisher_count(&self) -> usize {
        self.publishers.len()
    }

    pub fn directive_count(&self) -> usize {
        self.directives.values().map(HashMap::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fraction(pct: f64, tid: &str) -> Fraction {
        Fraction {
            pct,
            tid: tid.into(),
            default_url: format!("http://img/{tid}.jpg"),
            imgs: vec![ScaledImage {
                w: 200,
                h: 100,
                url: format!("http://img/{tid}_200.jpg"),
            }],
        }
    }

    #[test]
    fn test_select_fraction_by_bucket() {
        let directive = Directive {
            fractions: vec![fraction(0.3, "t1"), fraction(0.7, "t2")],
        };

        // 0x00 = 0.00, 0x1d = 0.29, 0x1e = 0.30, 0x63 = 0.99
        assert_eq!(directive.select_fraction("0").unwrap().tid, "t1");
        assert_eq!(directive.select_fraction("1d").unwrap().tid, "t1");
        assert_eq!(directive.select_fraction("1e").unwrap().tid, "t2");
        assert_eq!(directive.select_fraction("63").unwrap().tid, "t2");
    }

    #[test]
    fn test_select_fraction_without_bucket() {
        let directive = Directive {
            fractions: vec![fraction(0.2, "t1"), fraction(0.8, "t2")],
        };
        assert_eq!(directive.select_fraction("").unwrap().tid, "t2");
        assert_eq!(directive.select_fraction("zz").unwrap().tid, "t2");

        let empty = Directive { fractions: vec![] };
        assert!(empty.select_fraction("").is_none());
        assert!(empty.select_fraction("1").is_none());
    }

    #[test]
    fn test_image_url_size_match() {
        let f = fraction(1.0, "t1");
        assert_eq!(f.image_url(Some(200), Some(100)), Some("http://img/t1_200.jpg"));
        assert_eq!(f.image_url(Some(640), Some(480)), Some("http://img/t1.jpg"));
        assert_eq!(f.image_url(None, Some(100)), Some("http://img/t1.jpg"));

        let no_default = Fraction {
            default_url: String::new(),
            ..fraction(1.0, "t2")
        };
        assert_eq!(no_default.image_url(None, None), None);
    }

    #[test]
    fn test_snapshot_lookups() {
        let mut snapshot = Snapshot::default();
        snapshot.insert_publisher("p1", "acc1");
        snapshot.insert_directive(
            "acc1",
            "vid1",
            Directive {
                fractions: vec![fraction(1.0, "t1")],
            },
        );

        assert_eq!(snapshot.account_id("p1"), Some("acc1"));
        assert_eq!(snapshot.account_id("p2"), None);
        assert!(snapshot.directive("acc1", "vid1").is_some());
        assert!(snapshot.directive("acc1", "vid2").is_none());
        assert!(snapshot.directive("acc2", "vid1").is_none());
        assert_eq!(snapshot.publisher_count(), 1);
        assert_eq!(snapshot.directive_count(), 1);
    }
}
