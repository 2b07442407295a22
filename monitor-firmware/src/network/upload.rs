use super::STACK;
use crate::{STATE, STATS, duration};
use defmt::{Format, debug, info, warn};
use embassy_net::{
    dns::DnsSocket,
    tcp::client::{TcpClient, TcpClientState},
};
use embassy_rp::clocks::RoscRng;
use embassy_time::{Duration, Timer, with_timeout};
use embedded_nal_async::{Dns, TcpConnect};
use envmon_core::{
    UPLOAD_PERIOD,
    upload::{UploadOutcome, Uploader, upload_once},
};
use reqwless::{
    client::{HttpClient, TlsConfig, TlsVerify},
    request::Method,
};

const UPLOAD_URL: &str = env!("UPLOAD_URL");

/// Bound on each phase of a request (connect and send, then response).
const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Format)]
pub(crate) enum UploadError {
    Http(reqwless::Error),
    Timeout,
}

/// Single GET requests over HTTP(S), the response body is discarded.
struct HttpUploader<'a, T, D>
where
    T: TcpConnect + 'a,
    D: Dns + 'a,
{
    client: HttpClient<'a, T, D>,
    rx_buffer: &'a mut [u8],
}

impl<'a, T, D> Uploader for HttpUploader<'a, T, D>
where
    T: TcpConnect + 'a,
    D: Dns + 'a,
{
    type Error = UploadError;

    async fn get(&mut self, url: &str) -> Result<u16, Self::Error> {
        debug!("GET {}", url);

        let mut request = with_timeout(REQUEST_TIMEOUT, self.client.request(Method::GET, url))
            .await
            .map_err(|_| UploadError::Timeout)?
            .map_err(UploadError::Http)?;

        let response = with_timeout(REQUEST_TIMEOUT, request.send(&mut *self.rx_buffer))
            .await
            .map_err(|_| UploadError::Timeout)?
            .map_err(UploadError::Http)?;

        Ok(response.status.0)
    }
}

#[embassy_executor::task]
pub(crate) async fn task() {
    let stack = *STACK.get().await;

    let mut rng = RoscRng;

    let mut rx_buffer = [0; 4096];
    let mut tls_read_buffer = [0; 16640];
    let mut tls_write_buffer = [0; 16640];

    let client_state = TcpClientState::<1, 1024, 1024>::new();
    let tcp_client = TcpClient::new(stack, &client_state);
    let dns_client = DnsSocket::new(stack);
    let tls_config = TlsConfig::new(
        rng.next_u64(),
        &mut tls_read_buffer,
        &mut tls_write_buffer,
        TlsVerify::None,
    );

    let mut uploader = HttpUploader {
        client: HttpClient::new_with_tls(&tcp_client, &dns_client, tls_config),
        rx_buffer: &mut rx_buffer,
    };

    loop {
        if !stack.is_config_up() {
            info!("Upload waiting for network");
            stack.wait_config_up().await;
        }

        match upload_once(&mut uploader, UPLOAD_URL, &STATE, &STATS).await {
            UploadOutcome::Delivered(status) => info!("Upload complete: status={}", status),
            UploadOutcome::Failed(e) => warn!("Upload failed: {}", e),
            UploadOutcome::Skipped => warn!("Upload skipped: URL too long"),
        }

        Timer::after(duration(UPLOAD_PERIOD)).await;
    }
}
