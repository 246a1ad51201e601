use crate::models::{
    CreatePostData, LikeResponse, LikeStatus, LoginResponse, MessageResponse, Post, PostsResponse,
    Tag, UploadResponse, User,
};
use crate::storage::{TOKEN_KEY, USER_KEY};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Unauthorized,
    NotFound,
    Network,
    Http,
    Parse,
}

#[derive(Clone, Debug)]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    fn unauthorized() -> Self {
        Self {
            kind: ApiErrorKind::Unauthorized,
            message: "Unauthorized".to_string(),
        }
    }

    fn not_found(ctx: &str) -> Self {
        Self {
            kind: ApiErrorKind::NotFound,
            message: format!("{ctx}: not found"),
        }
    }

    fn http(status: reqwest::StatusCode, body: String, ctx: &str) -> Self {
        Self {
            kind: ApiErrorKind::Http,
            message: format!("{ctx} ({status}): {body}"),
        }
    }

    /// An unauthorized response means the credential is dead; the session must
    /// be wiped and the viewer sent to login, no matter which page issued the
    /// request. Everything else is handled where it happened.
    pub fn ends_session(&self) -> bool {
        self.kind == ApiErrorKind::Unauthorized
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct EnvConfig {
    pub api_url: String,
}

impl EnvConfig {
    pub fn new() -> Self {
        let default_api_url = "http://localhost:8080/api".to_string();

        // We support BOTH `window.ENV.API_URL` (documented in README) and
        // `window.ENV.api_url` (legacy/implementation detail) for compatibility.
        if let Some(window) = web_sys::window() {
            if let Some(env) = window.get("ENV") {
                if !env.is_undefined() && env.is_object() {
                    // 1) Prefer README style: API_URL
                    if let Ok(api_url) = js_sys::Reflect::get(&env, &"API_URL".into()) {
                        if let Some(url_str) = api_url.as_string() {
                            return Self { api_url: url_str };
                        }
                    }

                    // 2) Fallback: api_url
                    if let Ok(api_url) = js_sys::Reflect::get(&env, &"api_url".into()) {
                        if let Some(url_str) = api_url.as_string() {
                            return Self { api_url: url_str };
                        }
                    }
                }
            }
        }

        Self {
            api_url: default_api_url,
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn get_api_url() -> String {
    EnvConfig::new().api_url
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct AdminChangeUserPasswordRequest {
    pub user_id: i64,
    pub new_password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct TagData {
    pub name: String,
    pub color: String,
}

/// Query parameters for `GET /posts`. Empty strings are omitted from the URL
/// so the backend applies no filter for them.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct PostListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: String,
    pub tag: String,
    pub published: String,
    pub sort_by: String,
}

impl PostListQuery {
    pub(crate) fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs: Vec<(&'static str, String)> = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if !self.search.is_empty() {
            pairs.push(("search", self.search.clone()));
        }
        if !self.tag.is_empty() {
            pairs.push(("tag", self.tag.clone()));
        }
        if !self.published.is_empty() {
            pairs.push(("published", self.published.clone()));
        }
        if !self.sort_by.is_empty() {
            pairs.push(("sort_by", self.sort_by.clone()));
        }
        pairs
    }
}

#[derive(Clone)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
    pub(crate) token: Option<String>,
}

impl ApiClient {
    #[allow(dead_code)]
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            token: None,
        }
    }

    pub fn load_from_storage() -> Self {
        let base_url = get_api_url();
        let token = leptos::web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .and_then(|s| s.get_item(TOKEN_KEY).ok().flatten());

        Self { base_url, token }
    }

    pub fn save_to_storage(&self) {
        if let Some(storage) =
            leptos::web_sys::window().and_then(|w| w.local_storage().ok().flatten())
        {
            if let Some(token) = &self.token {
                let _ = storage.set_item(TOKEN_KEY, token);
            }
        }
    }

    pub fn clear_storage() {
        if let Some(storage) =
            leptos::web_sys::window().and_then(|w| w.local_storage().ok().flatten())
        {
            let _ = storage.remove_item(TOKEN_KEY);
            let _ = storage.remove_item(USER_KEY);
        }
    }

    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub(crate) fn get_auth_token(&self) -> Option<String> {
        self.token.clone()
    }

    pub fn logout(&mut self) {
        self.token = None;
        Self::clear_storage();
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Origin for server-relative asset URLs (`/files/x.png`). Uploaded files
    /// are served next to the API, not under its `/api` prefix.
    pub fn asset_base(&self) -> String {
        self.base_url
            .strip_suffix("/api")
            .unwrap_or(&self.base_url)
            .to_string()
    }

    pub fn absolute_asset_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}{}", self.asset_base(), path)
    }

    fn with_auth_headers(
        mut req: reqwest::RequestBuilder,
        token: Option<String>,
    ) -> reqwest::RequestBuilder {
        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }
        req
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        res: reqwest::Response,
        ctx: &str,
    ) -> ApiResult<T> {
        if res.status().is_success() {
            res.json().await.map_err(ApiError::parse)
        } else if res.status().as_u16() == 401 {
            Err(ApiError::unauthorized())
        } else if res.status().as_u16() == 404 {
            Err(ApiError::not_found(ctx))
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status, body, ctx))
        }
    }

    async fn handle_empty_response(res: reqwest::Response, ctx: &str) -> ApiResult<()> {
        if res.status().is_success() {
            Ok(())
        } else if res.status().as_u16() == 401 {
            Err(ApiError::unauthorized())
        } else if res.status().as_u16() == 404 {
            Err(ApiError::not_found(ctx))
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status, body, ctx))
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let client = reqwest::Client::new();
        let url = format!("{}{}", self.base_url, path);
        let mut req = client.get(url);
        req = Self::with_auth_headers(req, self.get_auth_token());
        if !query.is_empty() {
            req = req.query(query);
        }

        let res = req.send().await.map_err(ApiError::network)?;
        Self::handle_response(res, path).await
    }

    async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&impl serde::Serialize>,
    ) -> ApiResult<T> {
        let client = reqwest::Client::new();
        let url = format!("{}{}", self.base_url, path);
        let mut req = client.request(method, url);
        req = Self::with_auth_headers(req, self.get_auth_token());

        if let Some(b) = body {
            req = req.json(b);
        }

        let res = req.send().await.map_err(ApiError::network)?;
        Self::handle_response(res, path).await
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        let client = reqwest::Client::new();
        let url = format!("{}{}", self.base_url, path);
        let mut req = client.delete(url);
        req = Self::with_auth_headers(req, self.get_auth_token());

        let res = req.send().await.map_err(ApiError::network)?;
        Self::handle_empty_response(res, path).await
    }

    // --- auth ---

    pub async fn login(&self, username: &str, password: &str) -> ApiResult<LoginResponse> {
        self.send_json(
            reqwest::Method::POST,
            "/auth/login",
            Some(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            }),
        )
        .await
    }

    pub async fn register(
        &self,
        username: &str,
        password: &str,
        email: Option<String>,
    ) -> ApiResult<LoginResponse> {
        self.send_json(
            reqwest::Method::POST,
            "/auth/register",
            Some(&RegisterRequest {
                username: username.to_string(),
                password: password.to_string(),
                email: email.filter(|e| !e.trim().is_empty()),
            }),
        )
        .await
    }

    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> ApiResult<MessageResponse> {
        self.send_json(
            reqwest::Method::POST,
            "/change-password",
            Some(&ChangePasswordRequest {
                current_password: current_password.to_string(),
                new_password: new_password.to_string(),
            }),
        )
        .await
    }

    pub async fn admin_change_user_password(
        &self,
        user_id: i64,
        new_password: &str,
    ) -> ApiResult<MessageResponse> {
        self.send_json(
            reqwest::Method::POST,
            "/admin/change-user-password",
            Some(&AdminChangeUserPasswordRequest {
                user_id,
                new_password: new_password.to_string(),
            }),
        )
        .await
    }

    pub async fn get_profile(&self) -> ApiResult<User> {
        self.get("/profile", &[]).await
    }

    pub async fn get_all_users(&self) -> ApiResult<Vec<User>> {
        self.get("/admin/users", &[]).await
    }

    // --- posts ---

    pub async fn get_posts(&self, query: &PostListQuery) -> ApiResult<PostsResponse> {
        self.get("/posts", &query.to_pairs()).await
    }

    pub async fn get_post(&self, id: i64) -> ApiResult<Post> {
        self.get(&format!("/posts/{}", id), &[]).await
    }

    pub async fn create_post(&self, data: &CreatePostData) -> ApiResult<Post> {
        self.send_json(reqwest::Method::POST, "/posts", Some(data))
            .await
    }

    pub async fn update_post(&self, id: i64, data: &CreatePostData) -> ApiResult<Post> {
        self.send_json(reqwest::Method::PUT, &format!("/posts/{}", id), Some(data))
            .await
    }

    pub async fn delete_post(&self, id: i64) -> ApiResult<()> {
        self.delete(&format!("/posts/{}", id)).await
    }

    pub async fn like_post(&self, id: i64) -> ApiResult<LikeResponse> {
        self.send_json::<LikeResponse>(
            reqwest::Method::POST,
            &format!("/posts/{}/like", id),
            None::<&()>,
        )
        .await
    }

    pub async fn check_like(&self, id: i64) -> ApiResult<LikeStatus> {
        self.get(&format!("/posts/{}/like/check", id), &[]).await
    }

    // --- tags ---

    pub async fn get_tags(&self) -> ApiResult<Vec<Tag>> {
        self.get("/tags", &[]).await
    }

    pub async fn create_tag(&self, name: &str, color: &str) -> ApiResult<Tag> {
        self.send_json(
            reqwest::Method::POST,
            "/tags",
            Some(&TagData {
                name: name.to_string(),
                color: color.to_string(),
            }),
        )
        .await
    }

    pub async fn update_tag(&self, id: i64, name: &str, color: &str) -> ApiResult<Tag> {
        self.send_json(
            reqwest::Method::PUT,
            &format!("/tags/{}", id),
            Some(&TagData {
                name: name.to_string(),
                color: color.to_string(),
            }),
        )
        .await
    }

    pub async fn delete_tag(&self, id: i64) -> ApiResult<()> {
        self.delete(&format!("/tags/{}", id)).await
    }

    // --- upload ---

    pub async fn upload_file(
        &self,
        filename: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> ApiResult<UploadResponse> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(mime)
            .map_err(ApiError::parse)?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let client = reqwest::Client::new();
        let url = format!("{}/upload", self.base_url);
        let mut req = client.post(url);
        req = Self::with_auth_headers(req, self.get_auth_token());

        let res = req
            .multipart(form)
            .send()
            .await
            .map_err(ApiError::network)?;
        Self::handle_response(res, "/upload").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_client_new() {
        let client = ApiClient::new("http://localhost:8080/api".to_string());
        assert_eq!(client.base_url, "http://localhost:8080/api");
        assert!(client.token.is_none());
        assert!(!client.is_authenticated());
    }

    #[test]
    fn test_api_client_set_token() {
        let mut client = ApiClient::new("http://localhost:8080/api".to_string());
        client.set_token("my-jwt-token".to_string());
        assert_eq!(client.get_auth_token().as_deref(), Some("my-jwt-token"));
        assert!(client.is_authenticated());
    }

    #[test]
    fn test_asset_base_strips_api_suffix() {
        let client = ApiClient::new("http://localhost:8080/api".to_string());
        assert_eq!(client.asset_base(), "http://localhost:8080");
        assert_eq!(
            client.absolute_asset_url("/files/x.png"),
            "http://localhost:8080/files/x.png"
        );
    }

    #[test]
    fn test_absolute_asset_url_keeps_absolute_urls() {
        let client = ApiClient::new("http://localhost:8080/api".to_string());
        assert_eq!(
            client.absolute_asset_url("https://cdn.example.com/a.png"),
            "https://cdn.example.com/a.png"
        );
    }

    #[test]
    fn test_post_list_query_omits_empty_params() {
        let query = PostListQuery {
            page: Some(2),
            limit: Some(10),
            search: String::new(),
            tag: "go".to_string(),
            published: "true".to_string(),
            sort_by: "created_at".to_string(),
        };
        let pairs = query.to_pairs();
        assert!(pairs.iter().all(|(k, _)| *k != "search"));
        assert!(pairs.contains(&("page", "2".to_string())));
        assert!(pairs.contains(&("tag", "go".to_string())));
        assert!(pairs.contains(&("published", "true".to_string())));
    }

    #[test]
    fn test_only_unauthorized_ends_session() {
        assert!(ApiError::unauthorized().ends_session());
        assert!(!ApiError::not_found("/posts/9").ends_session());
        assert!(!ApiError::http(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            "boom".to_string(),
            "/posts"
        )
        .ends_session());
        assert!(!ApiError::parse("bad json").ends_session());
    }

    #[test]
    fn test_register_request_omits_blank_email() {
        let req = RegisterRequest {
            username: "u".to_string(),
            password: "p".to_string(),
            email: None,
        };
        let v = serde_json::to_value(req).expect("should serialize");
        assert!(v.get("email").is_none());
    }
}
