use std::time::Duration;

use async_trait::async_trait;
use marquee_model::RemoteUser;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use super::identity::{
    IdentityError, IdentityService, LoginRequest, RegisterRequest,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// [`IdentityService`] over JSON HTTP: `POST {base}/users/login` and
/// `POST {base}/users/register`. Failure codes travel in the `message`
/// field of the error body.
#[derive(Debug, Clone)]
pub struct HttpIdentityService {
    client: Client,
    base_url: Url,
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(default)]
    user: Option<RemoteUser>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl HttpIdentityService {
    pub fn new(base_url: Url) -> Result<Self, IdentityError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: Url,
        timeout: Duration,
    ) -> Result<Self, IdentityError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IdentityError::Transport(e.to_string()))?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/{path}")
    }

    fn post<B>(&self, path: &str, body: &B) -> RequestBuilder
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path);
        debug!(%url, "identity request");
        self.client.post(url).json(body)
    }

    async fn send(
        &self,
        request: RequestBuilder,
    ) -> Result<reqwest::Response, IdentityError> {
        let response = request
            .send()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.is_empty())
        {
            Some(code) => {
                warn!(%status, %code, "identity service rejected request");
                Err(IdentityError::Rejected { code })
            }
            None => Err(IdentityError::Status {
                status: status.as_u16(),
            }),
        }
    }
}

#[async_trait]
impl IdentityService for HttpIdentityService {
    async fn login(
        &self,
        request: &LoginRequest,
    ) -> Result<Option<RemoteUser>, IdentityError> {
        let response =
            self.send(self.post("users/login", request)).await?;
        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::InvalidResponse(e.to_string()))?;
        Ok(body.user)
    }

    async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<(), IdentityError> {
        self.send(self.post("users/register", request)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    /// Answer a single request on a local port with `status` and `body`.
    async fn serve_once(status: &'static str, body: &'static str) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request_complete(&request) {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status}\r\n\
                 Content-Type: application/json\r\n\
                 Content-Length: {}\r\n\
                 Connection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });
        Url::parse(&format!("http://{addr}/api")).unwrap()
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(head_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let length = text[..head_end]
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        raw.len() >= head_end + 4 + length
    }

    fn service(base: Url) -> HttpIdentityService {
        HttpIdentityService::new(base).unwrap()
    }

    fn registration() -> RegisterRequest {
        RegisterRequest {
            email: "a@b.io".into(),
            password: "secret".into(),
            name: Some("A".into()),
        }
    }

    #[test]
    fn endpoints_ignore_trailing_slash() {
        let with = service(Url::parse("http://localhost:4000/api/").unwrap());
        let without = service(Url::parse("http://localhost:4000/api").unwrap());

        assert_eq!(
            with.endpoint("users/login"),
            "http://localhost:4000/api/users/login"
        );
        assert_eq!(
            with.endpoint("users/login"),
            without.endpoint("users/login")
        );
    }

    #[test]
    fn login_body_sends_null_password() {
        let body = serde_json::to_value(LoginRequest {
            email: "a@b.io".into(),
            password: None,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "email": "a@b.io", "password": null })
        );
    }

    #[tokio::test]
    async fn error_message_becomes_rejection_code() {
        let base =
            serve_once("409 Conflict", r#"{"message":"ACCOUNT_EXISTS"}"#).await;

        let err = service(base).register(&registration()).await.unwrap_err();
        assert!(matches!(
            err,
            IdentityError::Rejected { ref code } if code == "ACCOUNT_EXISTS"
        ));
    }

    #[tokio::test]
    async fn failure_without_message_reports_status() {
        let base =
            serve_once("500 Internal Server Error", r#"{"error":"boom"}"#)
                .await;

        let err = service(base).register(&registration()).await.unwrap_err();
        assert!(matches!(err, IdentityError::Status { status: 500 }));
    }

    #[tokio::test]
    async fn login_returns_the_user_record() {
        let base = serve_once(
            "200 OK",
            r#"{"user":{"id":7,"email":"a@b.io","name":"A"}}"#,
        )
        .await;
        let request = LoginRequest {
            email: "a@b.io".into(),
            password: Some("secret".into()),
        };

        let user = service(base).login(&request).await.unwrap().unwrap();
        assert_eq!(user.id.as_deref(), Some("7"));
        assert_eq!(user.email, "a@b.io");
    }

    #[tokio::test]
    async fn login_without_user_is_none() {
        let base = serve_once("200 OK", "{}").await;
        let request = LoginRequest {
            email: "a@b.io".into(),
            password: None,
        };

        assert!(service(base).login(&request).await.unwrap().is_none());
    }
}
