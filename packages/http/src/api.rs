//! Typed client for the time tracking REST API.

use std::rc::Rc;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::Error;
use crate::executor::{HttpExecutor, ReqwestExecutor};
use crate::models::{
    Activity, EntityId, NewActivity, NewTrack, NewUser, Page, Recap, RecapQuery, Track,
    TrackQuery, User,
};
use crate::types::HttpRequest;

const USERS: &str = "/api/users/";
const ACTIVITIES: &str = "/api/activities/";
const TRACKS: &str = "/api/tracks/";
const RECAP: &str = "/api/recap/";

fn detail_path(collection: &str, id: EntityId) -> String {
    format!("{}{}/", collection, id)
}

/// Stateless request/response wrapper around the REST API.
///
/// Non-2xx responses become [`Error::Status`] carrying the server's message.
#[derive(Clone)]
pub struct ApiClient {
    executor: Rc<dyn HttpExecutor>,
}

impl ApiClient {
    pub fn new(executor: impl HttpExecutor + 'static) -> Self {
        Self {
            executor: Rc::new(executor),
        }
    }

    /// Client backed by reqwest against `base_url`.
    pub fn connect(base_url: &str, timeout: Duration) -> Result<Self, Error> {
        Ok(Self::new(ReqwestExecutor::new(base_url, timeout)?))
    }

    /// Execute a request, turning transport failures and non-2xx statuses
    /// into errors.
    pub async fn send(&self, request: HttpRequest) -> Result<crate::HttpResponse, Error> {
        let request = request.with_header("Accept", "application/json");
        tracing::debug!(request = %request.key(), "sending request");

        let response = self
            .executor
            .execute(&request)
            .await
            .map_err(|message| Error::Transport { message })?;

        if !response.is_success() {
            let error = Error::from_response(&response);
            tracing::debug!(request = %request.key(), status = response.status, %error, "request failed");
            return Err(error);
        }

        Ok(response)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T, Error> {
        let response = self.send(request).await?;
        Ok(response.json()?)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, Error> {
        self.fetch(HttpRequest::get(USERS)).await
    }

    pub async fn create_user(&self, payload: &NewUser) -> Result<User, Error> {
        self.fetch(HttpRequest::post(USERS).with_body(payload)?).await
    }

    pub async fn delete_user(&self, id: EntityId) -> Result<(), Error> {
        self.send(HttpRequest::delete(detail_path(USERS, id)))
            .await
            .map(|_| ())
    }

    pub async fn list_activities(&self) -> Result<Vec<Activity>, Error> {
        self.fetch(HttpRequest::get(ACTIVITIES)).await
    }

    pub async fn create_activity(&self, payload: &NewActivity) -> Result<Activity, Error> {
        self.fetch(HttpRequest::post(ACTIVITIES).with_body(payload)?)
            .await
    }

    pub async fn delete_activity(&self, id: EntityId) -> Result<(), Error> {
        self.send(HttpRequest::delete(detail_path(ACTIVITIES, id)))
            .await
            .map(|_| ())
    }

    pub async fn list_tracks(&self, query: &TrackQuery) -> Result<Page<Track>, Error> {
        self.fetch(HttpRequest::get(TRACKS).with_queries(query.params()))
            .await
    }

    pub async fn create_track(&self, payload: &NewTrack) -> Result<Track, Error> {
        self.fetch(HttpRequest::post(TRACKS).with_body(payload)?).await
    }

    pub async fn delete_track(&self, id: EntityId) -> Result<(), Error> {
        self.send(HttpRequest::delete(detail_path(TRACKS, id)))
            .await
            .map(|_| ())
    }

    pub async fn recap(&self, query: &RecapQuery) -> Result<Recap, Error> {
        let path = format!("{}{}/", RECAP, query.mode);
        self.fetch(HttpRequest::get(path).with_queries(query.params()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::mock::MockExecutor;
    use crate::models::RecapMode;
    use chrono::NaiveDate;
    use serde_json::json;

    #[tokio::test]
    async fn list_users_decodes_array() {
        let executor = MockExecutor::new().with_json(
            "GET /api/users/",
            200,
            json!([{"id": 1, "name": "Ada"}, {"id": 2, "name": "Grace"}]),
        );
        let api = ApiClient::new(executor);

        let users = api.list_users().await.unwrap();

        assert_eq!(users.len(), 2);
        assert_eq!(users[1].name, "Grace");
    }

    #[tokio::test]
    async fn create_user_posts_payload() {
        let executor =
            MockExecutor::new().with_json("POST /api/users/", 201, json!({"id": 3, "name": "Lin"}));
        let api = ApiClient::new(executor.clone());

        let user = api
            .create_user(&NewUser {
                name: "Lin".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(user.id, 3);
        let recorded = executor.recorded_requests();
        assert_eq!(recorded[0].body, Some(json!({"name": "Lin"})));
        assert_eq!(
            recorded[0].headers.get("Accept").map(String::as_str),
            Some("application/json")
        );
    }

    #[tokio::test]
    async fn non_2xx_maps_to_status_error_with_detail() {
        let executor = MockExecutor::new().with_json(
            "POST /api/activities/",
            400,
            json!({"detail": "Name already exists"}),
        );
        let api = ApiClient::new(executor);

        let err = api
            .create_activity(&NewActivity {
                name: "Coding".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(400));
        assert_eq!(err.to_string(), "Name already exists");
    }

    #[tokio::test]
    async fn transport_failure_maps_to_transport_error() {
        let executor = MockExecutor::new().with_failure("GET /api/users/", "connection refused");
        let api = ApiClient::new(executor);

        let err = api.list_users().await.unwrap_err();

        assert!(matches!(err, Error::Transport { .. }));
    }

    #[tokio::test]
    async fn delete_uses_detail_path_and_accepts_no_content() {
        let executor =
            MockExecutor::new().with_response("DELETE /api/tracks/7/", MockExecutor::no_content());
        let api = ApiClient::new(executor.clone());

        api.delete_track(7).await.unwrap();

        assert_eq!(executor.count("DELETE /api/tracks/7/"), 1);
    }

    #[tokio::test]
    async fn list_tracks_sends_filter() {
        let executor = MockExecutor::new().with_json(
            "GET /api/tracks/?date=2024-05-01",
            200,
            json!({"count": 0, "next": null, "previous": null, "results": []}),
        );
        let api = ApiClient::new(executor);
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        let page = api.list_tracks(&TrackQuery::for_date(date)).await.unwrap();

        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn recap_uses_mode_path() {
        let executor = MockExecutor::new().with_json(
            "GET /api/recap/monthly/?month=5&year=2024",
            200,
            json!({
                "mode": "monthly",
                "start": "2024-05-01",
                "end": "2024-06-01",
                "total_minutes": 0.0,
                "entries": []
            }),
        );
        let api = ApiClient::new(executor);

        let recap = api.recap(&RecapQuery::monthly(2024, 5)).await.unwrap();

        assert_eq!(recap.mode, RecapMode::Monthly);
        assert_eq!(recap.end, "2024-06-01");
    }
}
