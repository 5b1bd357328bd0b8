//! Command execution with tracing instrumentation.
//!
//! This module provides the [`FogBugz`] client: discovery on construction,
//! logon/logoff, and generic dispatch of any command name.

use std::fmt;
use std::time::Duration;

use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use tracing::{debug, info, instrument, warn, Span};
use url::Url;

use super::discovery::discover;
use super::session::Session;
use crate::command::{Attachment, Command, CommandRequest};
use crate::config::ClientConfig;
use crate::error::{ConnectionError, FogBugzError, LogonError};
use crate::multipart;
use crate::response::{ApiDescriptor, Response};
use crate::token::SessionToken;

const LOGON: &str = "logon";
const LOGOFF: &str = "logoff";
const SEARCH: &str = "search";
const LIST_FILTERS: &str = "listFilters";
const SET_CURRENT_FILTER: &str = "setCurrentFilter";

/// Builder for configuring a [`FogBugz`] client.
#[derive(Debug)]
pub struct FogBugzBuilder {
    config: ClientConfig,
}

impl FogBugzBuilder {
    fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Starts the session with an existing token instead of logging on.
    pub fn token(mut self, token: impl Into<SessionToken>) -> Self {
        self.config.token = Some(token.into());
        self
    }

    /// Sets a whole-request timeout.
    ///
    /// ## Examples
    ///
    /// ```rust,ignore
    /// use std::time::Duration;
    ///
    /// let client = FogBugz::builder("https://example.fogbugz.com")
    ///     .timeout(Duration::from_secs(60))
    ///     .connect()
    ///     .await?;
    /// ```
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Sets the `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Builds the HTTP client and discovers the command endpoint.
    ///
    /// ## Errors
    ///
    /// Returns [`FogBugzError::Connection`] if `api.xml` cannot be fetched
    /// or does not advertise an endpoint.
    pub async fn connect(self) -> Result<FogBugz, FogBugzError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(self.config.user_agent.as_str())
            .pool_max_idle_per_host(0);
        if let Some(timeout) = self.config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|source| ConnectionError::Request {
                url: self.config.base_url.clone(),
                source,
            })?;

        let (endpoint, descriptor) = discover(&http, &self.config.base_url).await?;

        Ok(FogBugz {
            http,
            session: Session::new(endpoint, self.config.token),
            descriptor,
        })
    }
}

/// Async client for the FogBugz XML API.
///
/// Requests are issued one at a time: every method that talks to the server
/// takes `&mut self` and completes its exchange before returning.
///
/// ## Examples
///
/// ```rust,ignore
/// use fogbugz::{Attachment, FogBugz};
///
/// let mut client = FogBugz::builder("https://example.fogbugz.com")
///     .token("stored-token")
///     .connect()
///     .await?;
///
/// let new_case = client.command("new")?;
/// let response = client
///     .execute(
///         new_case
///             .request()
///             .arg("sTitle", "Crash on save")
///             .file(Attachment::new("trace.log", trace_bytes)),
///     )
///     .await?;
/// ```
#[derive(Debug)]
pub struct FogBugz {
    http: reqwest::Client,
    session: Session,
    descriptor: ApiDescriptor,
}

impl FogBugz {
    /// Creates a builder for the installation at `base_url`.
    pub fn builder(base_url: impl Into<String>) -> FogBugzBuilder {
        FogBugzBuilder::new(ClientConfig::new(base_url))
    }

    /// Creates a builder from a prepared configuration.
    pub fn from_config(config: ClientConfig) -> FogBugzBuilder {
        FogBugzBuilder::new(config)
    }

    /// Connects with default settings.
    ///
    /// ## Errors
    ///
    /// Returns [`FogBugzError::Connection`] if discovery fails.
    pub async fn connect(base_url: impl Into<String>) -> Result<Self, FogBugzError> {
        Self::builder(base_url).connect().await
    }

    /// The command endpoint discovered at construction.
    pub fn endpoint(&self) -> &Url {
        self.session.endpoint()
    }

    /// The parsed `api.xml` descriptor.
    pub fn descriptor(&self) -> &ApiDescriptor {
        &self.descriptor
    }

    /// The session state.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The current token, if logged on.
    pub fn token(&self) -> Option<&SessionToken> {
        self.session.token()
    }

    /// Uses a token obtained elsewhere. Nothing is sent to the server; an
    /// invalid token only shows up as an error on the next command.
    pub fn set_token(&mut self, token: impl Into<SessionToken>) {
        self.session.set_token(token.into());
    }

    /// Forgets the token locally without calling `logoff`.
    pub fn clear_token(&mut self) -> Option<SessionToken> {
        self.session.clear_token()
    }

    /// The filter last selected with [`set_current_filter`](Self::set_current_filter).
    pub fn current_filter(&self) -> Option<&str> {
        self.session.current_filter()
    }

    /// Looks up the descriptor for a command name, caching it.
    ///
    /// ## Errors
    ///
    /// Returns [`FogBugzError::NoSuchCommand`] for reserved names
    /// (starting with `__`) and the empty name. No request is made.
    pub fn command(&mut self, name: &str) -> Result<Command, FogBugzError> {
        self.session.command(name)
    }

    /// Calls any command by name with text fields and attachments.
    ///
    /// ## Errors
    ///
    /// Returns [`FogBugzError::NoSuchCommand`] for reserved names,
    /// [`FogBugzError::Connection`] for transport failures and
    /// [`FogBugzError::Api`] when the server answers with an `<error>`.
    pub async fn invoke<K, V>(
        &mut self,
        name: &str,
        fields: impl IntoIterator<Item = (K, V)>,
        files: Vec<Attachment>,
    ) -> Result<Response, FogBugzError>
    where
        K: Into<String>,
        V: fmt::Display,
    {
        let request = self.command(name)?.request().args(fields).files(files);
        self.execute(request).await
    }

    /// Sends a prepared request.
    ///
    /// ## Errors
    ///
    /// Same as [`invoke`](Self::invoke), minus the name check.
    pub async fn execute(&mut self, request: CommandRequest) -> Result<Response, FogBugzError> {
        self.send(request).await
    }

    /// Logs on and stores the returned token.
    ///
    /// An existing session is logged off first; if that fails the local
    /// token is still dropped and the logon goes ahead.
    ///
    /// ## Errors
    ///
    /// Service errors are reported as [`FogBugzError::Logon`]; transport
    /// failures stay [`FogBugzError::Connection`].
    #[instrument(name = "fogbugz_logon", skip_all)]
    pub async fn logon(&mut self, email: &str, password: &str) -> Result<(), FogBugzError> {
        if self.session.is_authenticated() {
            if let Err(err) = self.logoff().await {
                warn!(error = %err, "logoff before logon failed; continuing");
            }
        }

        let request = self
            .command(LOGON)?
            .request()
            .arg("email", email)
            .arg("password", password);

        let response = match self.execute(request).await {
            Ok(response) => response,
            Err(FogBugzError::Api(err)) => return Err(LogonError::from(err).into()),
            Err(err) => return Err(err),
        };

        let token = response
            .text_of("token")
            .filter(|token| !token.is_empty())
            .ok_or(LogonError::MissingToken)?;
        self.session.set_token(SessionToken::new(token));
        info!("logged on");
        Ok(())
    }

    /// Logs off. The local token is cleared even if the server reports an
    /// error, which is then returned.
    ///
    /// ## Errors
    ///
    /// Returns whatever the `logoff` command failed with.
    #[instrument(name = "fogbugz_logoff", skip_all)]
    pub async fn logoff(&mut self) -> Result<(), FogBugzError> {
        let request = self.command(LOGOFF)?.request();
        let result = self.execute(request).await;
        self.session.clear_token();
        result.map(|_| ())
    }

    /// Runs the `search` command.
    ///
    /// `cols` is sent comma-separated and omitted when empty.
    pub async fn search(&mut self, query: &str, cols: &[&str]) -> Result<Response, FogBugzError> {
        let mut request = self.command(SEARCH)?.request().arg("q", query);
        if !cols.is_empty() {
            request = request.arg("cols", cols.join(","));
        }
        self.execute(request).await
    }

    /// Runs `listFilters`.
    pub async fn list_filters(&mut self) -> Result<Response, FogBugzError> {
        let request = self.command(LIST_FILTERS)?.request();
        self.execute(request).await
    }

    /// Runs `setCurrentFilter` and remembers the filter on success.
    pub async fn set_current_filter(&mut self, filter: &str) -> Result<Response, FogBugzError> {
        let request = self
            .command(SET_CURRENT_FILTER)?
            .request()
            .arg("sFilter", filter);
        let response = self.execute(request).await?;
        self.session.set_current_filter(filter);
        Ok(response)
    }

    /// Encodes, posts and classifies one command.
    #[instrument(
        name = "fogbugz_command",
        skip(self, request),
        fields(
            fogbugz.command = tracing::field::Empty,
            http.url = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
            otel.kind = "client",
            otel.status_code = tracing::field::Empty,
        )
    )]
    async fn send(&self, request: CommandRequest) -> Result<Response, FogBugzError> {
        let url = self.session.endpoint().clone();
        Span::current().record("fogbugz.command", request.command().name());
        Span::current().record("http.url", url.as_str());

        let (fields, files) = request.into_form(self.session.token());
        let body = multipart::encode(&fields, &files);
        debug!(
            fields = fields.len(),
            files = files.len(),
            bytes = body.content_length(),
            "sending command"
        );

        let response = self
            .http
            .post(url.clone())
            .header(CONTENT_TYPE, body.content_type())
            .header(CONTENT_LENGTH, body.content_length())
            .body(body.into_bytes())
            .send()
            .await
            .map_err(|source| ConnectionError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        Span::current().record("http.status_code", status.as_u16());
        if !status.is_success() {
            Span::current().record("otel.status_code", "ERROR");
            return Err(ConnectionError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| ConnectionError::Request {
                url: url.to_string(),
                source,
            })?;

        let parsed = Response::parse(&bytes).map_err(|source| ConnectionError::MalformedResponse {
            url: url.to_string(),
            source,
        })?;

        match parsed.into_result() {
            Ok(response) => {
                Span::current().record("otel.status_code", "OK");
                Ok(response)
            }
            Err(err) => {
                Span::current().record("otel.status_code", "ERROR");
                debug!(code = err.code(), message = err.message(), "FogBugz returned an error");
                Err(err.into())
            }
        }
    }
}
