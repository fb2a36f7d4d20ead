// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

pub(crate) mod endpoint;
mod model;

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    client::{self, AccessRecord, AccessUpdate, Deletion, Filter, Registered, VisitRegistration},
    error::{self, Detail, Error, Result},
    metadata,
    session::Session,
};

use endpoint::{Endpoints, Exit};

/// Talks to the NexusAccess REST API over HTTP.
pub(crate) struct Client {
    http: reqwest::Client,
    base: Url,
    endpoints: Endpoints,
}

impl Client {
    pub(crate) fn new(base: Url, endpoints: Endpoints, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(metadata::USER_AGENT.as_str());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build().map_err(Error::Connection)?,
            base: with_trailing_slash(base),
            endpoints,
        })
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path)?)
    }

    pub(crate) fn access_list_url(&self, filter: &Filter) -> Result<Url> {
        let mut url = self.url("access/")?;
        let pairs = filter.query_pairs();
        if !pairs.is_empty() {
            _ = url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }

    fn access_url(&self, id: i64) -> Result<Url> {
        self.url(&format!("access/{id}"))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!("{} {}", method, url.path());
        self.http.request(method, url)
    }

    fn authorized(&self, method: Method, url: Url, session: &Session) -> RequestBuilder {
        self.request(method, url).bearer_auth(session.token())
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(Error::Connection)?;
        let status = response.status();
        debug!("Server answered {}", status);
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await?;
        Err(error::Api::from_status(status, Detail::from_body(&body)).into())
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body)
        .map_err(|e| error::Api::UnexpectedResponse(e.to_string()).into())
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[async_trait]
impl client::Client for Client {
    async fn login(&self, username: &str, password: &SecretString) -> Result<Session> {
        let request = self.request(Method::POST, self.url("auth/token")?).form(&[
            ("username", username),
            ("password", password.expose_secret().as_str()),
            ("grant_type", "password"),
        ]);
        let token: model::Token = decode(self.send(request).await?).await?;

        let access_token = token
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                error::Api::UnexpectedResponse(
                    "the response does not include an access token".to_owned(),
                )
            })?;
        info!("Logged in as user {:?} at venue {:?}", token.user_id, token.venue_id);
        Ok(Session::new(access_token, token.user_id, token.venue_id))
    }

    async fn register_visit(
        &self,
        session: &Session,
        visit: &VisitRegistration,
    ) -> Result<Registered> {
        let url = self.url(self.endpoints.register.path())?;
        let request = self.authorized(Method::POST, url, session).json(visit);
        let registered: model::Registered = decode(self.send(request).await?).await?;
        Ok(registered.into())
    }

    async fn list_access(&self, session: &Session, filter: &Filter) -> Result<Vec<AccessRecord>> {
        let url = self.access_list_url(filter)?;
        let request = self.authorized(Method::GET, url, session);
        let records: Vec<model::Access> = decode(self.send(request).await?).await?;
        Ok(records.into_iter().map(Into::into).collect())
    }

    async fn get_access(&self, session: &Session, id: i64) -> Result<AccessRecord> {
        let request = self.authorized(Method::GET, self.access_url(id)?, session);
        let record: model::Access = decode(self.send(request).await?).await?;
        Ok(record.into())
    }

    async fn mark_exit(&self, session: &Session, id: i64) -> Result<()> {
        match self.endpoints.exit {
            Exit::Timestamp => {
                let update = AccessUpdate {
                    exit_date: Some(Utc::now()),
                    status: None,
                };
                client::Client::update_access(self, session, id, &update).await
            }
            Exit::Endpoint => {
                let url = self.url(&format!("access/{id}/exit"))?;
                _ = self.send(self.authorized(Method::PATCH, url, session)).await?;
                Ok(())
            }
        }
    }

    async fn update_access(
        &self,
        session: &Session,
        id: i64,
        update: &AccessUpdate,
    ) -> Result<()> {
        let request = self
            .authorized(Method::PATCH, self.access_url(id)?, session)
            .json(update);
        _ = self.send(request).await?;
        Ok(())
    }

    async fn delete_access(&self, session: &Session, id: i64) -> Result<Deletion> {
        let request = self.authorized(Method::DELETE, self.access_url(id)?, session);
        let response = self.send(request).await?;
        Ok(match response.status() {
            StatusCode::NO_CONTENT => Deletion::Confirmed,
            other => Deletion::Unconfirmed(other),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::{
            header::{AUTHORIZATION, CONTENT_TYPE},
            HeaderMap, HeaderName, Uri,
        },
        response::{IntoResponse, Response},
        routing::{get, patch, post},
        Json, Router,
    };
    use chrono::NaiveDate;
    use serde_json::json;

    use crate::error::Api;

    use super::*;

    /// A request as the test server received it.
    #[derive(Clone, Debug)]
    struct Seen {
        line: String,
        authorization: Option<String>,
        content_type: Option<String>,
        body: String,
    }

    type Log = Arc<Mutex<Vec<Seen>>>;

    fn remember(log: &Log, method: &Method, uri: &Uri, headers: &HeaderMap, body: String) {
        let header = |name: HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };
        log.lock().expect("poisoned").push(Seen {
            line: format!("{method} {uri}"),
            authorization: header(AUTHORIZATION),
            content_type: header(CONTENT_TYPE),
            body,
        });
    }

    fn access(id: i64) -> serde_json::Value {
        json!({
            "id": id,
            "entry_date": "2024-05-01T08:15:00",
            "exit_date": null,
            "visitor_name": "Laura",
            "visitor_id_card": "0012345",
            "id_card_type_name": "Cédula",
            "venue_name": "Sede Norte",
            "supervisor_name": "Ana",
            "access_reason": "Entrevista",
            "status": "Activo",
        })
    }

    async fn token(
        State(log): State<Log>,
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: String,
    ) -> Response {
        let accepted = body.contains("password=hunter2");
        remember(&log, &method, &uri, &headers, body);
        if accepted {
            Json(json!({
                "access_token": "abc",
                "token_type": "bearer",
                "user_id": 7,
                "venue_id": 3,
            }))
            .into_response()
        } else {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({"detail": "Usuario o contraseña incorrectos"})),
            )
                .into_response()
        }
    }

    async fn register(
        State(log): State<Log>,
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: String,
    ) -> Response {
        remember(&log, &method, &uri, &headers, body);
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"detail": [
                {"loc": ["body", "email"], "msg": "value is not a valid email address", "type": "value_error"}
            ]})),
        )
            .into_response()
    }

    async fn list(
        State(log): State<Log>,
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: String,
    ) -> Response {
        remember(&log, &method, &uri, &headers, body);
        if headers.get(AUTHORIZATION).is_some_and(|v| v == "Bearer stale") {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"detail": "Could not validate credentials"})),
            )
                .into_response();
        }
        Json(json!([access(1)])).into_response()
    }

    async fn get_one(
        State(log): State<Log>,
        Path(id): Path<i64>,
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: String,
    ) -> Response {
        remember(&log, &method, &uri, &headers, body);
        if id == 9 {
            return ([(CONTENT_TYPE, "application/json")], r#"{"id": "#).into_response();
        }
        Json(access(id)).into_response()
    }

    async fn update(
        State(log): State<Log>,
        Path(id): Path<i64>,
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: String,
    ) -> Response {
        remember(&log, &method, &uri, &headers, body);
        Json(json!({"id": id})).into_response()
    }

    async fn remove(
        State(log): State<Log>,
        Path(id): Path<i64>,
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: String,
    ) -> Response {
        remember(&log, &method, &uri, &headers, body);
        match id {
            1 => StatusCode::NO_CONTENT.into_response(),
            2 => Json(json!({"message": "Registro eliminado"})).into_response(),
            _ => (
                StatusCode::NOT_FOUND,
                Json(json!({"detail": "Registro de acceso no encontrado o no autorizado"})),
            )
                .into_response(),
        }
    }

    /// Starts a server on a free local port that answers like the API and
    /// records every request it gets.
    async fn serve(endpoints: Endpoints) -> Result<(Client, Log)> {
        let log = Log::default();
        let app = Router::new()
            .route("/app/v1/auth/token", post(token))
            .route("/app/v1/receptionist/register_full_visit", post(register))
            .route("/app/v1/access/", get(list))
            .route("/app/v1/access/{id}", get(get_one).patch(update).delete(remove))
            .route("/app/v1/access/{id}/exit", patch(update))
            .with_state(Arc::clone(&log));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        _ = tokio::spawn(async move { axum::serve(listener, app).await });

        let base = Url::parse(&format!("http://{addr}/app/v1"))?;
        Ok((Client::new(base, endpoints, Some(Duration::from_secs(5)))?, log))
    }

    fn seen(log: &Log) -> Vec<Seen> {
        log.lock().expect("poisoned").clone()
    }

    fn session(token: &str) -> Session {
        Session::new(token.to_owned(), Some(7), Some(3))
    }

    fn client(base: &str) -> Result<Client> {
        Client::new(Url::parse(base)?, Endpoints::default(), None)
    }

    #[tokio::test]
    async fn login_sends_a_password_grant_form() -> Result<()> {
        let (api, log) = serve(Endpoints::default()).await?;

        let session = client::Client::login(&api, "recepcion", &SecretString::new("hunter2".to_owned())).await?;

        assert_eq!(session.token(), "abc");
        assert_eq!(session.user_id(), Some(7));
        assert_eq!(session.venue_id(), Some(3));

        let requests = seen(&log);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].line, "POST /app/v1/auth/token");
        assert_eq!(requests[0].authorization, None);
        assert_eq!(
            requests[0].content_type.as_deref(),
            Some("application/x-www-form-urlencoded")
        );
        assert!(requests[0].body.contains("username=recepcion"));
        assert!(requests[0].body.contains("grant_type=password"));
        Ok(())
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() -> Result<()> {
        let (api, _log) = serve(Endpoints::default()).await?;

        let err = client::Client::login(&api, "recepcion", &SecretString::new("nope".to_owned()))
            .await
            .err();

        assert!(err.as_ref().is_some_and(Error::is_unauthorized));
        assert_eq!(
            err.map(|e| e.to_string()).as_deref(),
            Some("error 401: Usuario o contraseña incorrectos")
        );
        Ok(())
    }

    #[tokio::test]
    async fn listing_carries_the_bearer_token_and_filters() -> Result<()> {
        let (api, log) = serve(Endpoints::default()).await?;
        let filter = Filter {
            date: NaiveDate::from_ymd_opt(2024, 5, 1),
            ..Filter::default()
        };

        let records = client::Client::list_access(&api, &session("abc"), &filter).await?;

        assert_eq!(records.len(), 1);
        assert!(records[0].is_pending());
        let requests = seen(&log);
        assert_eq!(requests[0].line, "GET /app/v1/access/?date_filter=2024-05-01");
        assert_eq!(requests[0].authorization.as_deref(), Some("Bearer abc"));
        Ok(())
    }

    #[tokio::test]
    async fn stale_token_is_unauthorized() -> Result<()> {
        let (api, _log) = serve(Endpoints::default()).await?;

        let result = client::Client::list_access(&api, &session("stale"), &Filter::default()).await;

        assert!(result.is_err_and(|e| e.is_unauthorized()));
        Ok(())
    }

    #[tokio::test]
    async fn validation_errors_keep_their_fields() -> Result<()> {
        let (api, log) = serve(Endpoints::default()).await?;
        let visit = VisitRegistration {
            name: "Laura".to_owned(),
            last_name: "Gómez".to_owned(),
            id_card: "0012345".to_owned(),
            phone: String::new(),
            email: "laura".to_owned(),
            id_card_type_id: Some(1),
            date: NaiveDate::from_ymd_opt(2024, 5, 1),
            time: None,
            reason_visit: "Entrevista".to_owned(),
            venue_id: Some(3),
            supervisor_id: Some(7),
        };

        let result = client::Client::register_visit(&api, &session("abc"), &visit).await;

        match result {
            Err(Error::Api(Api::Status { status, ref detail })) => {
                assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
                assert!(matches!(*detail, Detail::Validation(ref errors) if errors.len() == 1));
            }
            ref other => panic!("unexpected result: {other:?}"),
        }
        let requests = seen(&log);
        assert_eq!(requests[0].content_type.as_deref(), Some("application/json"));
        assert!(requests[0].body.contains(r#""sede":3"#));
        Ok(())
    }

    #[tokio::test]
    async fn deletion_is_confirmed_only_by_no_content() -> Result<()> {
        let (api, _log) = serve(Endpoints::default()).await?;
        let session = session("abc");

        assert_eq!(
            client::Client::delete_access(&api, &session, 1).await?,
            Deletion::Confirmed
        );
        assert_eq!(
            client::Client::delete_access(&api, &session, 2).await?,
            Deletion::Unconfirmed(StatusCode::OK)
        );
        assert!(matches!(
            client::Client::delete_access(&api, &session, 3).await,
            Err(Error::Api(Api::Status { status, .. })) if status == StatusCode::NOT_FOUND
        ));
        Ok(())
    }

    #[tokio::test]
    async fn exit_through_the_dedicated_route() -> Result<()> {
        let (api, log) = serve(Endpoints {
            exit: Exit::Endpoint,
            ..Endpoints::default()
        })
        .await?;

        client::Client::mark_exit(&api, &session("abc"), 5).await?;

        let requests = seen(&log);
        assert_eq!(requests[0].line, "PATCH /app/v1/access/5/exit");
        assert_eq!(requests[0].authorization.as_deref(), Some("Bearer abc"));
        assert!(requests[0].body.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn exit_as_a_timestamp_update() -> Result<()> {
        let (api, log) = serve(Endpoints::default()).await?;

        client::Client::mark_exit(&api, &session("abc"), 5).await?;

        let requests = seen(&log);
        assert_eq!(requests[0].line, "PATCH /app/v1/access/5");
        assert!(requests[0].body.contains("exit_date"));
        assert!(!requests[0].body.contains("status"));
        Ok(())
    }

    #[tokio::test]
    async fn malformed_bodies_are_unexpected() -> Result<()> {
        let (api, _log) = serve(Endpoints::default()).await?;

        let result = client::Client::get_access(&api, &session("abc"), 9).await;

        assert!(matches!(result, Err(Error::Api(Api::UnexpectedResponse(_)))));
        Ok(())
    }

    #[test]
    fn version_prefix_survives_joins() -> Result<()> {
        let api = client("http://127.0.0.1:8000/app/v1")?;
        assert_eq!(
            api.access_url(12)?.as_str(),
            "http://127.0.0.1:8000/app/v1/access/12"
        );
        assert_eq!(
            api.url(endpoint::Register::FullVisit.path())?.as_str(),
            "http://127.0.0.1:8000/app/v1/receptionist/register_full_visit"
        );
        Ok(())
    }

    #[test]
    fn list_url_with_date_only() -> Result<()> {
        let api = client("http://127.0.0.1:8000/app/v1/")?;
        let filter = Filter {
            date: NaiveDate::from_ymd_opt(2024, 5, 1),
            id_card: Some(String::new()),
            ..Filter::default()
        };

        let url = api.access_list_url(&filter)?;
        assert_eq!(url.query(), Some("date_filter=2024-05-01"));
        assert!(!url.as_str().contains("id_card_filter"));
        Ok(())
    }

    #[test]
    fn list_url_without_filters_has_no_query() -> Result<()> {
        let api = client("http://127.0.0.1:8000/app/v1")?;
        let url = api.access_list_url(&Filter::default())?;
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/app/v1/access/");
        assert_eq!(url.query(), None);
        Ok(())
    }

    #[test]
    fn id_card_filter_is_encoded() -> Result<()> {
        let api = client("https://access.example.com/app/v1")?;
        let filter = Filter {
            id_card: Some("AB 12&3".to_owned()),
            ..Filter::default()
        };
        let url = api.access_list_url(&filter)?;
        assert_eq!(url.query(), Some("id_card_filter=AB+12%263"));
        Ok(())
    }
}
