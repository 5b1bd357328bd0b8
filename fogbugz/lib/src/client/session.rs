//! Per-client session state.

use std::collections::HashMap;

use url::Url;

use crate::command::Command;
use crate::error::FogBugzError;
use crate::token::SessionToken;

/// Mutable state owned by one client: the endpoint, the token and the
/// command cache.
///
/// The endpoint is fixed when the session is created.
#[derive(Debug)]
pub struct Session {
    endpoint: Url,
    token: Option<SessionToken>,
    commands: HashMap<String, Command>,
    current_filter: Option<String>,
}

impl Session {
    pub(crate) fn new(endpoint: Url, token: Option<SessionToken>) -> Self {
        Self {
            endpoint,
            token,
            commands: HashMap::new(),
            current_filter: None,
        }
    }

    /// The discovered command endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The current token, if logged on.
    pub fn token(&self) -> Option<&SessionToken> {
        self.token.as_ref()
    }

    /// Returns `true` if a token is held.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// The last filter selected through this client.
    pub fn current_filter(&self) -> Option<&str> {
        self.current_filter.as_deref()
    }

    /// Names of every command looked up so far.
    pub fn cached_commands(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    pub(crate) fn set_token(&mut self, token: SessionToken) {
        self.token = Some(token);
    }

    pub(crate) fn clear_token(&mut self) -> Option<SessionToken> {
        self.token.take()
    }

    pub(crate) fn set_current_filter(&mut self, filter: impl Into<String>) {
        self.current_filter = Some(filter.into());
    }

    /// Returns the cached descriptor for `name`, creating it on first use.
    pub(crate) fn command(&mut self, name: &str) -> Result<Command, FogBugzError> {
        if let Some(command) = self.commands.get(name) {
            return Ok(command.clone());
        }
        let command = Command::new(name)?;
        self.commands.insert(name.to_owned(), command.clone());
        Ok(command)
    }
}
