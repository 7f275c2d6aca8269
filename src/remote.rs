use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};

use crate::{
    error::NetworkError,
    models::quotes::{Quote, RemotePost},
};

/// Anything that can hand back a candidate list of remote quotes.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    async fn fetch_remote(&self) -> Result<Vec<Quote>, NetworkError>;
}

#[derive(Clone, Debug)]
pub struct RemoteClient {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(RemoteClient {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// posts a single quote. the acknowledgement is returned as-is and never merged.
    #[tracing::instrument(skip(self))]
    pub async fn post_quote(&self, quote: &Quote) -> Result<serde_json::Value, NetworkError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(quote)
            .send()
            .await
            .map_err(|source| NetworkError::Transport {
                url: self.endpoint.clone(),
                source,
            })
            .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when posting quote"))?;

        let resp = check_status(&self.endpoint, resp)?;

        resp.json()
            .await
            .map_err(|source| NetworkError::Decode {
                url: self.endpoint.clone(),
                source,
            })
            .inspect_err(
                |e| tracing::error!(err = ?e, "an error occurred when decoding post acknowledgement"),
            )
    }
}

#[async_trait]
impl RemoteSource for RemoteClient {
    #[tracing::instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn fetch_remote(&self) -> Result<Vec<Quote>, NetworkError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|source| NetworkError::Transport {
                url: self.endpoint.clone(),
                source,
            })
            .inspect_err(
                |e| tracing::error!(err = ?e, "an error occurred when fetching remote quotes"),
            )?;

        let resp = check_status(&self.endpoint, resp)?;

        let posts: Vec<RemotePost> = resp
            .json()
            .await
            .map_err(|source| NetworkError::Decode {
                url: self.endpoint.clone(),
                source,
            })
            .inspect_err(
                |e| tracing::error!(err = ?e, "an error occurred when decoding remote quotes"),
            )?;

        tracing::debug!(count = posts.len(), "fetched remote quotes");

        Ok(posts.into_iter().map(Quote::from).collect())
    }
}

/// drops remote records with a blank text or category, so they never reach the store.
pub fn accept_remote(quotes: Vec<Quote>) -> Vec<Quote> {
    quotes
        .into_iter()
        .filter(|quote| match quote.validate() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(id = ?quote.id, err = %e, "skipping invalid remote quote");
                false
            }
        })
        .collect()
}

fn check_status(url: &str, resp: reqwest::Response) -> Result<reqwest::Response, NetworkError> {
    let status = resp.status();

    if !status.is_success() {
        tracing::error!(status = %status, url = %url, "remote answered with a non-success status");

        return Err(NetworkError::Status {
            url: url.to_string(),
            status,
        });
    }

    Ok(resp)
}

#[cfg(test)]
mod tests {
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    use super::*;

    /// serves exactly one HTTP response and hands back the URL to hit.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = vec![];
            let mut buf = [0u8; 1024];

            // read the headers, then as much body as content-length announces.
            let header_end = loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);

                if let Some(pos) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };

            let headers = String::from_utf8_lossy(&request[..header_end]).to_ascii_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|len| len.trim().parse::<usize>().ok())
                .unwrap_or(0);

            while request.len() < header_end + content_length {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{addr}/posts")
    }

    fn local_client(endpoint: String) -> RemoteClient {
        RemoteClient {
            client: reqwest::Client::builder().no_proxy().build().unwrap(),
            endpoint,
        }
    }

    #[tokio::test]
    async fn fetch_maps_posts_to_server_quotes() {
        let url = serve_once(
            "200 OK",
            r#"[{"userId": 1, "id": 1, "title": "sunt aut facere", "body": "..."},
                {"userId": 1, "id": 2, "title": "qui est esse", "body": "..."}]"#,
        )
        .await;

        let quotes = local_client(url).fetch_remote().await.unwrap();

        assert_eq!(
            quotes,
            vec![
                Quote {
                    text: "sunt aut facere".to_string(),
                    category: "Server".to_string(),
                    id: Some(1),
                },
                Quote {
                    text: "qui est esse".to_string(),
                    category: "Server".to_string(),
                    id: Some(2),
                },
            ]
        );
    }

    #[tokio::test]
    async fn fetch_fails_on_error_status() {
        let url = serve_once("503 Service Unavailable", "{}").await;

        let err = local_client(url).fetch_remote().await.unwrap_err();

        assert!(matches!(
            err,
            NetworkError::Status { status, .. } if status == reqwest::StatusCode::SERVICE_UNAVAILABLE
        ));
    }

    #[tokio::test]
    async fn fetch_fails_on_non_array_body() {
        let url = serve_once("200 OK", r#"{"not": "an array"}"#).await;

        let err = local_client(url).fetch_remote().await.unwrap_err();

        assert!(matches!(err, NetworkError::Decode { .. }));
    }

    #[tokio::test]
    async fn fetch_fails_when_nobody_listens() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = local_client(format!("http://{addr}/posts"))
            .fetch_remote()
            .await
            .unwrap_err();

        assert!(matches!(err, NetworkError::Transport { .. }));
    }

    #[tokio::test]
    async fn post_returns_acknowledgement() {
        let url = serve_once(
            "201 Created",
            r#"{"text": "be kind", "category": "Life", "id": 101}"#,
        )
        .await;
        let quote = Quote::new("be kind", "Life").unwrap();

        let ack = local_client(url).post_quote(&quote).await.unwrap();

        assert_eq!(ack["id"], 101);
    }

    #[test]
    fn accept_remote_drops_blank_records() {
        let quotes = vec![
            Quote {
                text: "   ".to_string(),
                category: "Server".to_string(),
                id: Some(1),
            },
            Quote {
                text: "kept".to_string(),
                category: "Server".to_string(),
                id: Some(2),
            },
        ];

        let accepted = accept_remote(quotes);

        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].id, Some(2));
    }
}
