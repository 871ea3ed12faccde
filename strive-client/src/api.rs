use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::debug;

use strive_types::{ClientError, Comment, LeaderboardEntry, PointsRecord, TaskHistory, TaskItem};

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub session_token: String,
    pub profile_photo: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatedAccount {
    pub session_token: String,
}

#[derive(Debug, Deserialize)]
pub struct RenamedAccount {
    pub new_token: String,
    pub new_username: String,
}

#[derive(Debug, Deserialize)]
pub struct RotatedToken {
    pub new_token: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadedFile {
    #[serde(rename = "filePath")]
    pub file_path: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Transport gateway. Normalizes every remote failure into `ClientError`
/// and attaches the bearer token where an operation requires auth. No
/// retries and no request timeout; a hung call blocks its caller.
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        }
    }

    /// Installs (or clears) the token used for authenticated requests.
    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    async fn bearer(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        requires_auth: bool,
    ) -> Result<T, ClientError> {
        let mut req = self.http.request(method, self.url(path));
        if requires_auth {
            if let Some(token) = self.bearer().await {
                req = req.bearer_auth(token);
            }
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req
            .send()
            .await
            .map_err(|e| ClientError::network(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(error_from_response(status, response).await);
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::network(e.to_string()))
    }

    // --- credentials & account ---

    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginResponse, ClientError> {
        self.request(
            Method::POST,
            "/login",
            Some(json!({ "username": username, "password": password })),
            false,
        )
        .await
    }

    pub async fn add_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<CreatedAccount, ClientError> {
        self.request(
            Method::POST,
            "/add_user",
            Some(json!({ "username": username, "password": password })),
            false,
        )
        .await
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        let _: serde_json::Value = self.request(Method::POST, "/logout", None, true).await?;
        Ok(())
    }

    pub async fn update_username(&self, new_username: &str) -> Result<RenamedAccount, ClientError> {
        self.request(
            Method::POST,
            "/update_username",
            Some(json!({ "new_username": new_username })),
            true,
        )
        .await
    }

    pub async fn update_password(&self, new_password: &str) -> Result<RotatedToken, ClientError> {
        self.request(
            Method::POST,
            "/update_password",
            Some(json!({ "new_password": new_password })),
            true,
        )
        .await
    }

    /// Multipart upload. Failures carry no status-code distinction; callers
    /// get one generic upload error either way.
    pub async fn upload_profile_picture(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedFile, ClientError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("profile_pic", part);
        let mut req = self.http.post(self.url("/upload_profile_picture")).multipart(form);
        if let Some(token) = self.bearer().await {
            req = req.bearer_auth(token);
        }
        let response = req.send().await.map_err(|e| {
            debug!("upload transport failure: {}", e);
            upload_failed()
        })?;
        if !response.status().is_success() {
            return Err(upload_failed());
        }
        response.json::<UploadedFile>().await.map_err(|e| {
            debug!("upload response decode failure: {}", e);
            upload_failed()
        })
    }

    // --- tasks ---

    pub async fn get_my_tasks(&self) -> Result<Vec<TaskItem>, ClientError> {
        self.request(Method::GET, "/get_my_tasks", None, true).await
    }

    pub async fn add_task(&self, text: &str) -> Result<(), ClientError> {
        let _: serde_json::Value = self
            .request(
                Method::POST,
                "/add_task",
                Some(json!({ "task_text": text })),
                true,
            )
            .await?;
        Ok(())
    }

    pub async fn update_task(&self, task_id: &str, completed: bool) -> Result<(), ClientError> {
        let _: serde_json::Value = self
            .request(
                Method::POST,
                "/update_task",
                Some(json!({ "task_id": task_id, "completed": completed })),
                true,
            )
            .await?;
        Ok(())
    }

    pub async fn delete_task(&self, task_id: &str) -> Result<(), ClientError> {
        let _: serde_json::Value = self
            .request(
                Method::DELETE,
                "/update_task",
                Some(json!({ "task_id": task_id })),
                true,
            )
            .await?;
        Ok(())
    }

    pub async fn get_task_history(&self) -> Result<TaskHistory, ClientError> {
        self.request(Method::GET, "/get_task_history", None, true)
            .await
    }

    // --- dashboard feeds ---

    pub async fn get_my_points(&self) -> Result<Vec<PointsRecord>, ClientError> {
        self.request(Method::GET, "/get_my_points", None, true).await
    }

    pub async fn get_points(&self) -> Result<Vec<LeaderboardEntry>, ClientError> {
        self.request(Method::GET, "/get_points", None, false).await
    }

    pub async fn get_comments(&self) -> Result<Vec<Comment>, ClientError> {
        self.request(Method::GET, "/get_comments", None, false).await
    }

    pub async fn add_comment(&self, text: &str) -> Result<(), ClientError> {
        let _: serde_json::Value = self
            .request(
                Method::POST,
                "/add_comment",
                Some(json!({ "text": text })),
                true,
            )
            .await?;
        Ok(())
    }
}

async fn error_from_response(status: StatusCode, response: reqwest::Response) -> ClientError {
    // Unparseable error bodies degrade to a generic message, never a panic.
    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.error)
        .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
    ClientError::api(status.as_u16(), message)
}

fn upload_failed() -> ClientError {
    ClientError::network("File upload failed.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:5000/");
        assert_eq!(client.url("/login"), "http://localhost:5000/login");
    }

    #[test]
    fn test_login_response_with_null_photo() {
        let parsed: LoginResponse = serde_json::from_str(
            r#"{"message": "Login successful", "session_token": "tok", "profile_photo": null}"#,
        )
        .unwrap();
        assert_eq!(parsed.session_token, "tok");
        assert!(parsed.profile_photo.is_none());
    }

    #[test]
    fn test_upload_response_field_rename() {
        let parsed: UploadedFile =
            serde_json::from_str(r#"{"message": "ok", "filePath": "uploads/a.png"}"#).unwrap();
        assert_eq!(parsed.file_path, "uploads/a.png");
    }

    #[test]
    fn test_task_wire_shape() {
        let parsed: TaskItem = serde_json::from_str(
            r#"{"id": "3f2a", "text": "water plants", "completed": false, "date_added": "2026-08-23T09:15:00.123456"}"#,
        )
        .unwrap();
        assert_eq!(parsed.id, "3f2a");
        assert!(!parsed.completed);
    }

    #[test]
    fn test_comment_timestamp_parses_naive_iso() {
        let parsed: Comment = serde_json::from_str(
            r#"{"username": "bob", "text": "hi", "profile_photo": "default_dp.png", "timestamp": "2026-08-23T10:11:12.123456"}"#,
        )
        .unwrap();
        assert_eq!(parsed.timestamp.format("%Y-%m-%d").to_string(), "2026-08-23");
    }

    #[test]
    fn test_history_map_keys_parse_as_dates() {
        let parsed: TaskHistory =
            serde_json::from_str(r#"{"2026-08-22": 3, "2026-08-23": 0}"#).unwrap();
        assert_eq!(parsed.len(), 2);
        let first = parsed.keys().next().unwrap();
        assert_eq!(first.format("%Y-%m-%d").to_string(), "2026-08-22");
    }
}
