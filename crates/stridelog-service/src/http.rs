use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use stridelog_core::account::User;
use stridelog_core::focus::FocusTally;
use stridelog_core::habit::{CreateHabit, Habit, MarkStatus, UpdateHabit};
use stridelog_core::task::{CreateTask, Task, TaskFilter, UpdateTask};

use crate::session::{Identity, SessionHandle};
use crate::traits::{ServiceError, TrackerService};

#[derive(Serialize)]
struct AuthRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct AuthResponse {
    user: User,
    token: String,
}

#[derive(Serialize)]
struct MarkRequest {
    date: NaiveDate,
    status: MarkStatus,
}

#[derive(Serialize)]
struct WorkedTimeRequest {
    minutes: i64,
}

/// [`TrackerService`] over the HTTP API; holds the bearer token obtained
/// at login and refuses calls for any owner other than the one logged in.
pub struct HttpService {
    base_url: String,
    client: reqwest::Client,
    token: RwLock<Option<String>>,
    session: SessionHandle,
}

impl HttpService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            token: RwLock::new(None),
            session: SessionHandle::new(),
        }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn authed(&self, builder: RequestBuilder) -> Result<RequestBuilder, ServiceError> {
        let token = self.token.read().await;
        match token.as_deref() {
            Some(t) => Ok(builder.bearer_auth(t)),
            None => Err(ServiceError::Unauthorized("not logged in".into())),
        }
    }

    async fn ensure_owner(&self, owner_id: &str) -> Result<(), ServiceError> {
        match self.session.current() {
            Some(identity) if identity.user_id == owner_id => Ok(()),
            Some(_) => Err(ServiceError::Unauthorized(
                "owner does not match the logged-in user".into(),
            )),
            None => Err(ServiceError::Unauthorized("not logged in".into())),
        }
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<T, ServiceError> {
        let status = response.status();
        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| ServiceError::Internal(format!("invalid response body: {e}")))
        } else {
            Err(Self::parse_error(status, response).await)
        }
    }

    async fn expect_ok(&self, response: Response) -> Result<(), ServiceError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::parse_error(status, response).await)
        }
    }

    async fn parse_error(status: StatusCode, response: Response) -> ServiceError {
        #[derive(Deserialize)]
        struct ErrorBody {
            error: String,
        }
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status.to_string(),
        };
        match status {
            StatusCode::NOT_FOUND => ServiceError::NotFound(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ServiceError::InvalidInput(message)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ServiceError::Unauthorized(message)
            }
            _ => ServiceError::Internal(message),
        }
    }

    async fn finish_auth(&self, response: Response) -> Result<User, ServiceError> {
        let auth: AuthResponse = self.handle_response(response).await?;
        *self.token.write().await = Some(auth.token);
        self.session.set(Identity {
            user_id: auth.user.id.clone(),
            email: auth.user.email.clone(),
        });
        debug!(user_id = %auth.user.id, "logged in");
        Ok(auth.user)
    }

    /// Unauthenticated server liveness probe.
    pub async fn health_check(&self) -> Result<(), ServiceError> {
        let response = self
            .client
            .get(self.url("/api/health"))
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        self.expect_ok(response).await
    }

    pub async fn signup(&self, email: &str, password: &str) -> Result<User, ServiceError> {
        let response = self
            .client
            .post(self.url("/api/auth/signup"))
            .json(&AuthRequest { email, password })
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        self.finish_auth(response).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, ServiceError> {
        let response = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&AuthRequest { email, password })
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        self.finish_auth(response).await
    }

    /// Revokes the session server-side; local state is cleared even if the
    /// request fails so the client never stays half-logged-in.
    pub async fn logout(&self) -> Result<(), ServiceError> {
        let request = self.authed(self.client.post(self.url("/api/auth/logout"))).await?;
        let result = request
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()));

        *self.token.write().await = None;
        self.session.clear();

        match result {
            Ok(response) => self.expect_ok(response).await,
            Err(e) => Err(e),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        let request = self.authed(self.client.get(self.url(path))).await?;
        let response = request
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        self.handle_response(response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        let request = self.authed(self.client.post(self.url(path))).await?;
        let response = request
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        self.handle_response(response).await
    }

    async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        let request = self.authed(self.client.put(self.url(path))).await?;
        let response = request
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        self.handle_response(response).await
    }

    async fn delete(&self, path: &str) -> Result<(), ServiceError> {
        let request = self.authed(self.client.delete(self.url(path))).await?;
        let response = request
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        self.expect_ok(response).await
    }
}

#[async_trait]
impl TrackerService for HttpService {
    async fn create_habit(
        &self,
        owner_id: &str,
        input: CreateHabit,
    ) -> Result<Habit, ServiceError> {
        self.ensure_owner(owner_id).await?;
        self.post_json("/api/habits", &input).await
    }

    async fn get_habit(&self, owner_id: &str, id: &str) -> Result<Habit, ServiceError> {
        self.ensure_owner(owner_id).await?;
        self.get_json(&format!("/api/habits/{id}")).await
    }

    async fn list_habits(&self, owner_id: &str) -> Result<Vec<Habit>, ServiceError> {
        self.ensure_owner(owner_id).await?;
        self.get_json("/api/habits").await
    }

    async fn habits_due_on(
        &self,
        owner_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Habit>, ServiceError> {
        self.ensure_owner(owner_id).await?;
        self.get_json(&format!("/api/habits?due={date}")).await
    }

    async fn update_habit(
        &self,
        owner_id: &str,
        id: &str,
        update: UpdateHabit,
    ) -> Result<Habit, ServiceError> {
        self.ensure_owner(owner_id).await?;
        self.put_json(&format!("/api/habits/{id}"), &update).await
    }

    async fn delete_habit(&self, owner_id: &str, id: &str) -> Result<(), ServiceError> {
        self.ensure_owner(owner_id).await?;
        self.delete(&format!("/api/habits/{id}")).await
    }

    async fn mark_habit(
        &self,
        owner_id: &str,
        id: &str,
        date: NaiveDate,
        status: MarkStatus,
    ) -> Result<Habit, ServiceError> {
        self.ensure_owner(owner_id).await?;
        self.post_json(&format!("/api/habits/{id}/mark"), &MarkRequest { date, status })
            .await
    }

    async fn create_task(&self, owner_id: &str, input: CreateTask) -> Result<Task, ServiceError> {
        self.ensure_owner(owner_id).await?;
        self.post_json("/api/tasks", &input).await
    }

    async fn get_task(&self, owner_id: &str, id: &str) -> Result<Task, ServiceError> {
        self.ensure_owner(owner_id).await?;
        self.get_json(&format!("/api/tasks/{id}")).await
    }

    async fn list_tasks(
        &self,
        owner_id: &str,
        filter: TaskFilter,
    ) -> Result<Vec<Task>, ServiceError> {
        self.ensure_owner(owner_id).await?;
        let mut query = Vec::new();
        if let Some(deadline) = filter.deadline {
            query.push(format!("date={deadline}"));
        }
        if let Some(ref category) = filter.category {
            query.push(format!("category={category}"));
        }
        if let Some(completed) = filter.completed {
            query.push(format!("completed={completed}"));
        }
        let path = if query.is_empty() {
            "/api/tasks".to_string()
        } else {
            format!("/api/tasks?{}", query.join("&"))
        };
        self.get_json(&path).await
    }

    async fn update_task(
        &self,
        owner_id: &str,
        id: &str,
        update: UpdateTask,
    ) -> Result<Task, ServiceError> {
        self.ensure_owner(owner_id).await?;
        self.put_json(&format!("/api/tasks/{id}"), &update).await
    }

    async fn delete_task(&self, owner_id: &str, id: &str) -> Result<(), ServiceError> {
        self.ensure_owner(owner_id).await?;
        self.delete(&format!("/api/tasks/{id}")).await
    }

    async fn add_worked_minutes(
        &self,
        owner_id: &str,
        id: &str,
        minutes: i64,
    ) -> Result<Task, ServiceError> {
        self.ensure_owner(owner_id).await?;
        self.post_json(
            &format!("/api/tasks/{id}/worked-time"),
            &WorkedTimeRequest { minutes },
        )
        .await
    }

    async fn focus_tally(&self, owner_id: &str) -> Result<FocusTally, ServiceError> {
        self.ensure_owner(owner_id).await?;
        self.get_json("/api/focus").await
    }

    async fn complete_focus_session(&self, owner_id: &str) -> Result<FocusTally, ServiceError> {
        self.ensure_owner(owner_id).await?;
        self.post_json("/api/focus/complete", &serde_json::json!({})).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn calls_require_login() {
        let svc = HttpService::new("http://localhost:9");
        let err = svc.list_habits("u1").await;
        assert!(matches!(err, Err(ServiceError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn owner_must_match_logged_in_user() {
        let svc = HttpService::new("http://localhost:9");
        svc.session().set(Identity {
            user_id: "u1".into(),
            email: "a@example.com".into(),
        });
        *svc.token.write().await = Some("token".into());

        let err = svc.list_habits("someone-else").await;
        assert!(matches!(err, Err(ServiceError::Unauthorized(_))));
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let svc = HttpService::new("http://localhost:8080/");
        assert_eq!(svc.url("/api/habits"), "http://localhost:8080/api/habits");
    }
}
