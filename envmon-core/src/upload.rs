//! Periodic upload of the readings to a remote endpoint.
//!
//! Each upload is a single unauthenticated GET carrying the readings in the query string. There is
//! no retry or queueing: a failed upload is simply superseded by the next cycle.

use crate::{
    state::{Readings, SharedState},
    stats::Statistics,
};
use core::fmt::Write;

pub type UrlString = heapless::String<256>;

/// The endpoint and query do not fit in a [`UrlString`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "no-std", derive(defmt::Format))]
pub struct UrlTooLong;

/// Builds `<endpoint>?temp=<t>&hum=<h>&obs=<0|1>&vib=<0|1>`, floats to two decimal places.
pub fn request_url(endpoint: &str, readings: &Readings) -> Result<UrlString, UrlTooLong> {
    let mut url = UrlString::new();

    write!(
        url,
        "{}?temp={:.2}&hum={:.2}&obs={}&vib={}",
        endpoint,
        readings.temperature,
        readings.humidity,
        u8::from(readings.object_detected),
        u8::from(readings.vibrating),
    )
    .map_err(|_| UrlTooLong)?;

    Ok(url)
}

/// Transport used to deliver a single request.
#[allow(async_fn_in_trait)]
pub trait Uploader {
    type Error;

    /// Issues a GET to `url` and returns the response status code.
    async fn get(&mut self, url: &str) -> Result<u16, Self::Error>;
}

#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "no-std", derive(defmt::Format))]
pub enum UploadOutcome<E> {
    /// A response was received, whatever its status.
    Delivered(u16),
    Failed(E),
    /// Nothing was sent, the URL could not be built.
    Skipped,
}

/// Snapshots the shared readings and sends them once.
pub async fn upload_once<U: Uploader>(
    uploader: &mut U,
    endpoint: &str,
    state: &SharedState,
    stats: &Statistics,
) -> UploadOutcome<U::Error> {
    let Ok(url) = request_url(endpoint, &state.snapshot()) else {
        Statistics::count(&stats.uploads_skipped);
        return UploadOutcome::Skipped;
    };

    match uploader.get(&url).await {
        Ok(status) => {
            Statistics::count(&stats.uploads_delivered);
            UploadOutcome::Delivered(status)
        }
        Err(e) => {
            Statistics::count(&stats.uploads_failed);
            UploadOutcome::Failed(e)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const ENDPOINT: &str = "https://example.com/update";

    #[test]
    fn url_format() {
        let readings = Readings {
            temperature: 25.5,
            humidity: 60.25,
            object_detected: true,
            vibrating: false,
        };

        assert_eq!(
            request_url(ENDPOINT, &readings).unwrap().as_str(),
            "https://example.com/update?temp=25.50&hum=60.25&obs=1&vib=0"
        );
    }

    #[test]
    fn url_format_negative_and_defaults() {
        assert_eq!(
            request_url(ENDPOINT, &Readings::default()).unwrap().as_str(),
            "https://example.com/update?temp=0.00&hum=0.00&obs=0&vib=0"
        );

        let readings = Readings {
            temperature: -12.3,
            vibrating: true,
            ..Default::default()
        };
        assert_eq!(
            request_url(ENDPOINT, &readings).unwrap().as_str(),
            "https://example.com/update?temp=-12.30&hum=0.00&obs=0&vib=1"
        );
    }

    #[test]
    fn url_too_long() {
        let endpoint = "x".repeat(250);
        assert_eq!(
            request_url(&endpoint, &Readings::default()),
            Err(UrlTooLong)
        );
    }

    /// Replies with the scripted results in order and records every URL requested.
    struct MockUploader {
        replies: std::vec::IntoIter<Result<u16, &'static str>>,
        requested: Vec<String>,
    }

    impl MockUploader {
        fn new(replies: &[Result<u16, &'static str>]) -> Self {
            Self {
                replies: replies.to_vec().into_iter(),
                requested: Vec::new(),
            }
        }
    }

    impl Uploader for MockUploader {
        type Error = &'static str;

        async fn get(&mut self, url: &str) -> Result<u16, Self::Error> {
            self.requested.push(url.to_string());
            self.replies.next().unwrap_or(Err("no reply scripted"))
        }
    }

    #[test]
    fn outcome_does_not_affect_next_request() {
        let state = SharedState::new();
        state.set_temperature(21.0);
        state.set_humidity(50.0);
        let stats = Statistics::new();

        let mut uploader = MockUploader::new(&[Err("timeout"), Ok(200), Ok(500)]);

        let outcomes: Vec<_> = (0..3)
            .map(|_| embassy_futures::block_on(upload_once(&mut uploader, ENDPOINT, &state, &stats)))
            .collect();

        assert_eq!(
            outcomes,
            vec![
                UploadOutcome::Failed("timeout"),
                UploadOutcome::Delivered(200),
                UploadOutcome::Delivered(500),
            ]
        );

        // Same readings, same request every time
        let expected = "https://example.com/update?temp=21.00&hum=50.00&obs=0&vib=0";
        assert_eq!(uploader.requested, vec![expected; 3]);

        let report = stats.report();
        assert_eq!(report.uploads_failed, 1);
        assert_eq!(report.uploads_delivered, 2);
        assert_eq!(report.uploads_skipped, 0);
    }

    #[test]
    fn request_follows_latest_readings() {
        let state = SharedState::new();
        let stats = Statistics::new();
        let mut uploader = MockUploader::new(&[Ok(200), Ok(200)]);

        embassy_futures::block_on(upload_once(&mut uploader, ENDPOINT, &state, &stats));
        state.set_object_detected(true);
        state.set_temperature(30.5);
        embassy_futures::block_on(upload_once(&mut uploader, ENDPOINT, &state, &stats));

        assert_eq!(
            uploader.requested[1],
            "https://example.com/update?temp=30.50&hum=0.00&obs=1&vib=0"
        );
    }

    #[test]
    fn overlong_endpoint_is_skipped() {
        let state = SharedState::new();
        let stats = Statistics::new();
        let mut uploader = MockUploader::new(&[Ok(200)]);

        let endpoint = "y".repeat(300);
        let outcome =
            embassy_futures::block_on(upload_once(&mut uploader, &endpoint, &state, &stats));

        assert_eq!(outcome, UploadOutcome::Skipped);
        assert!(uploader.requested.is_empty());
        assert_eq!(stats.report().uploads_skipped, 1);
    }
}
