use http::header::{COOKIE, HeaderMap, HeaderName, HeaderValue};
use http::request::Parts;
use http::Request;
use mastermind::{Directive, Fraction, Mastermind, ScaledImage, Snapshot};

pub fn headers_with_cookies(cookies: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(COOKIE, HeaderValue::from_str(cookies).unwrap());
    headers
}

pub fn get_request(uri: &str, headers: &[(&str, &str)]) -> Parts {
    let mut builder = Request::builder().method("GET").uri(uri);
    for (name, value) in headers {
        builder = builder.header(HeaderName::from_bytes(name.as_bytes()).unwrap(), *value);
    }
    builder.body(()).unwrap().into_parts().0
}

pub const SPLIT_LOW_TID: &str = "tidSplitLow";
pub const SPLIT_LOW_URL: &str = "http://img/split_low.jpg";
pub const SPLIT_HIGH_TID: &str = "tidSplitHigh";
pub const SPLIT_HIGH_URL: &str = "http://img/split_high.jpg";

// Keys whose bucket for video `split` lands in each half.
pub const LOW_IP: &str = "10.0.0.4";
pub const HIGH_IP: &str = "10.0.0.1";
pub const LOW_USER: &str = "abcdefgh17000000";
pub const HIGH_USER: &str = "zyxwvuts17000000";

fn single_fraction(tid: &str, default_url: &str, imgs: Vec<ScaledImage>) -> Directive {
    Directive {
        fractions: vec![Fraction {
            pct: 1.0,
            tid: tid.into(),
            default_url: default_url.into(),
            imgs,
        }],
    }
}

/// Publisher `p1` maps to `acc1`, which has directives for videos `abc`,
/// `a`, `c` and `split`. `split` serves `SPLIT_LOW_*` for buckets below 50
/// and `SPLIT_HIGH_*` for the rest.
pub fn test_mastermind() -> Mastermind {
    let mut snapshot = Snapshot::default();
    snapshot.insert_publisher("p1", "acc1");
    snapshot.insert_publisher("p2", "acc2");
    snapshot.insert_directive(
        "acc1",
        "abc",
        single_fraction(
            "acc1_abc_t1",
            "http://img/abc_200.jpg",
            vec![ScaledImage {
                w: 640,
                h: 480,
                url: "http://img/abc_640.jpg".into(),
            }],
        ),
    );
    snapshot.insert_directive("acc1", "a", single_fraction("tidA", "http://img/a.jpg", vec![]));
    snapshot.insert_directive("acc1", "c", single_fraction("tidC", "http://img/c.jpg", vec![]));
    snapshot.insert_directive(
        "acc1",
        "split",
        Directive {
            fractions: vec![
                Fraction {
                    pct: 0.5,
                    tid: SPLIT_LOW_TID.into(),
                    default_url: SPLIT_LOW_URL.into(),
                    imgs: vec![],
                },
                Fraction {
                    pct: 0.5,
                    tid: SPLIT_HIGH_TID.into(),
                    default_url: SPLIT_HIGH_URL.into(),
                    imgs: vec![],
                },
            ],
        },
    );
    Mastermind::from_snapshot(snapshot)
}

#[test]
fn split_keys_land_in_expected_halves() {
    use crate::bucket;

    let value = |key: &str| u32::from_str_radix(bucket::assign(key.as_bytes(), "split").as_str(), 16).unwrap();
    assert!(value(LOW_IP) < 50);
    assert!(value(LOW_USER) < 50);
    assert!(value(HIGH_IP) >= 50);
    assert!(value(HIGH_USER) >= 50);
}
