use std::time::Duration;

use reqwest::StatusCode;
use url::Url;

use crate::scraper::{check_status, CancelToken, TraversalError};

fn page() -> Url {
    Url::parse("https://suumo.jp/jj/chintai/ichiran/FR301FC001/?sc=11101&page=2").unwrap()
}

#[test]
fn refusal_statuses_mean_blocked() {
    for status in [StatusCode::FORBIDDEN, StatusCode::TOO_MANY_REQUESTS] {
        match check_status(status, &page()) {
            Err(TraversalError::Blocked(message)) => {
                assert!(message.contains(status.as_str()), "{message}");
                assert!(message.contains("page=2"), "{message}");
            }
            other => panic!("{status}: unexpected result {other:?}"),
        }
    }
}

#[test]
fn other_failures_are_network_errors() {
    for status in [
        StatusCode::NOT_FOUND,
        StatusCode::INTERNAL_SERVER_ERROR,
        StatusCode::SERVICE_UNAVAILABLE,
    ] {
        assert!(
            matches!(check_status(status, &page()), Err(TraversalError::Network(_))),
            "{status}"
        );
    }

    assert_eq!(check_status(StatusCode::OK, &page()), Ok(()));
}

#[test]
fn request_timeout_never_outlives_the_deadline() {
    let timeout = Duration::from_secs(60);

    assert_eq!(CancelToken::new().cap(timeout), Some(timeout));

    let soon = CancelToken::with_deadline(Duration::from_secs(2));
    let capped = soon.cap(timeout).unwrap();
    assert!(capped <= Duration::from_secs(2), "{capped:?}");

    let later = CancelToken::with_deadline(Duration::from_secs(600));
    assert_eq!(later.cap(timeout), Some(timeout));

    assert_eq!(CancelToken::with_deadline(Duration::ZERO).cap(timeout), None);

    let cancelled = CancelToken::new();
    cancelled.cancel();
    assert_eq!(cancelled.cap(timeout), None);
}
