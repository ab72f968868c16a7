//! 远程页面拉取
//! Fetches a page over HTTP and turns the response into a `PageSnapshot`.

use reqwest::Client;
use tracing::debug;
use url::Url;

use super::snapshot::PageSnapshot;
use crate::config::GlobalConfig;
use crate::error::WapResult;

/// Fetches `url` with the configured timeout, TLS verification and user agent.
pub async fn fetch_snapshot(url: &str, config: &GlobalConfig) -> WapResult<PageSnapshot> {
    let target = Url::parse(url)?;
    let client = Client::builder()
        .timeout(config.http_timeout)
        .danger_accept_invalid_certs(!config.verify_tls)
        .user_agent(config.user_agent.as_str())
        .build()?;

    let response = client.get(target).send().await?;
    debug!("拉取页面完成：{}，状态码{}", url, response.status());

    let headers = response.headers().clone();
    let body = response.text().await?;

    PageSnapshot::from_response(url, &headers, &body)
}
