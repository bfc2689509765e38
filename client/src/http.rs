//! HTTP implementation of the post aggregate service client

use crate::error::PostServiceError;
use crate::service::{PostService, ServiceFuture};
use crate::types::{CommentPayload, LikeResponse, NewComment, NewPost, PostPayload, UpdatePost};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Error body the service attaches to non-success responses.
#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// Post aggregate service client over HTTP
#[derive(Clone)]
pub struct HttpPostService {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpPostService {
    /// Create a new client from environment configuration
    ///
    /// Reads the API base URL from `DAYLOG_API_URL` and an optional bearer
    /// token from `DAYLOG_API_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns [`PostServiceError::MissingBaseUrl`] if `DAYLOG_API_URL` is
    /// not set.
    pub fn from_env() -> Result<Self, PostServiceError> {
        let base_url =
            std::env::var("DAYLOG_API_URL").map_err(|_| PostServiceError::MissingBaseUrl)?;
        let token = std::env::var("DAYLOG_API_TOKEN").ok();

        Ok(Self::new(base_url, token))
    }

    /// Create a new client with an explicit base URL and optional token
    #[must_use]
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Self {
            client: Client::new(),
            base_url,
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Map a response to the expected payload, or a status-derived error.
    async fn handle<T: DeserializeOwned>(response: Response) -> Result<T, PostServiceError> {
        let status = response.status();

        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| PostServiceError::ResponseParseFailed(e.to_string()));
        }

        Err(Self::status_error(status, response).await)
    }

    /// Like `handle`, but discards any success body.
    async fn handle_unit(response: Response) -> Result<(), PostServiceError> {
        let status = response.status();

        if status.is_success() {
            return Ok(());
        }

        Err(Self::status_error(status, response).await)
    }

    async fn status_error(status: StatusCode, response: Response) -> PostServiceError {
        match status {
            StatusCode::UNAUTHORIZED => PostServiceError::Unauthorized,
            StatusCode::FORBIDDEN => PostServiceError::Forbidden,
            StatusCode::NOT_FOUND => PostServiceError::NotFound,
            status => {
                let message = response
                    .json::<ApiErrorBody>()
                    .await
                    .ok()
                    .and_then(|body| body.error)
                    .unwrap_or_default();

                PostServiceError::ApiError {
                    status: status.as_u16(),
                    message,
                }
            },
        }
    }
}

impl PostService for HttpPostService {
    fn get_post(&self, post_id: String) -> ServiceFuture<'_, PostPayload> {
        Box::pin(async move {
            tracing::debug!(post_id = %post_id, "GET post");
            let response = self
                .request(self.client.get(self.url(&format!("/posts/{post_id}"))))
                .send()
                .await
                .map_err(|e| PostServiceError::RequestFailed(e.to_string()))?;

            Self::handle(response).await
        })
    }

    fn update_post(&self, post_id: String, update: UpdatePost) -> ServiceFuture<'_, PostPayload> {
        Box::pin(async move {
            tracing::debug!(post_id = %post_id, "PUT post (full-content replace)");
            let response = self
                .request(self.client.put(self.url(&format!("/posts/{post_id}"))))
                .json(&update)
                .send()
                .await
                .map_err(|e| PostServiceError::RequestFailed(e.to_string()))?;

            Self::handle(response).await
        })
    }

    fn create_post(&self, new_post: NewPost) -> ServiceFuture<'_, PostPayload> {
        Box::pin(async move {
            tracing::debug!(title = %new_post.title, "POST post");
            let response = self
                .request(self.client.post(self.url("/posts")))
                .json(&new_post)
                .send()
                .await
                .map_err(|e| PostServiceError::RequestFailed(e.to_string()))?;

            Self::handle(response).await
        })
    }

    fn toggle_like(&self, post_id: String) -> ServiceFuture<'_, LikeResponse> {
        Box::pin(async move {
            tracing::debug!(post_id = %post_id, "POST like toggle");
            // Deliberately bodyless: the server decides like vs. unlike.
            let response = self
                .request(
                    self.client
                        .post(self.url(&format!("/posts/{post_id}/like"))),
                )
                .send()
                .await
                .map_err(|e| PostServiceError::RequestFailed(e.to_string()))?;

            Self::handle(response).await
        })
    }

    fn list_comments(&self, post_id: String) -> ServiceFuture<'_, Vec<CommentPayload>> {
        Box::pin(async move {
            tracing::debug!(post_id = %post_id, "GET comments");
            let response = self
                .request(
                    self.client
                        .get(self.url(&format!("/posts/{post_id}/comments"))),
                )
                .send()
                .await
                .map_err(|e| PostServiceError::RequestFailed(e.to_string()))?;

            Self::handle(response).await
        })
    }

    fn create_comment(
        &self,
        post_id: String,
        comment: NewComment,
    ) -> ServiceFuture<'_, CommentPayload> {
        Box::pin(async move {
            tracing::debug!(post_id = %post_id, "POST comment");
            let response = self
                .request(
                    self.client
                        .post(self.url(&format!("/posts/{post_id}/comments"))),
                )
                .json(&comment)
                .send()
                .await
                .map_err(|e| PostServiceError::RequestFailed(e.to_string()))?;

            Self::handle(response).await
        })
    }

    fn delete_comment(&self, comment_id: String) -> ServiceFuture<'_, ()> {
        Box::pin(async move {
            tracing::debug!(comment_id = %comment_id, "DELETE comment");
            let response = self
                .request(
                    self.client
                        .delete(self.url(&format!("/comments/{comment_id}"))),
                )
                .send()
                .await
                .map_err(|e| PostServiceError::RequestFailed(e.to_string()))?;

            Self::handle_unit(response).await
        })
    }
}
