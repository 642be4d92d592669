//! Turning chat lines into replies.
//!
//! The chat connection itself lives outside this crate; it is reached only
//! through [`Responder`].

use async_trait::async_trait;
use leader_config::LeaderConfig;
use leader_http::FetchRequest;
use std::time::Duration;
use thiserror::Error;

use crate::command::{Command, parse_command};
use crate::links::extract_url;
use crate::lookup::{lmgtfy_url, urban_dictionary_url};
use crate::stats::{StatsSource, fetch_stats};
use crate::title::extract_title;

/// An incoming message.
#[derive(Debug, Clone)]
pub struct ChatLine {
    pub nick: String,
    /// Channel (or nick, for private messages) a reply should go to.
    pub target: String,
    pub text: String,
}

impl ChatLine {
    pub fn new(
        nick: impl Into<String>,
        target: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            nick: nick.into(),
            target: target.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Error)]
#[error("couldn't deliver reply to {target}: {message}")]
pub struct ReplyError {
    pub target: String,
    pub message: String,
}

/// Outbound side of the chat connection.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn privmsg(&self, target: &str, text: &str) -> Result<(), ReplyError>;
}

pub struct CommandHandler {
    prefix: String,
    /// Lines from this nick are never answered.
    own_nick: Option<String>,
    stats: Option<StatsSource>,
    link_titles: bool,
    connect_timeout: Duration,
    io_timeout: Duration,
}

impl CommandHandler {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            own_nick: None,
            stats: None,
            link_titles: true,
            connect_timeout: leader_http::DEFAULT_CONNECT_TIMEOUT,
            io_timeout: leader_http::DEFAULT_IO_TIMEOUT,
        }
    }

    pub fn from_config(cfg: &LeaderConfig) -> Self {
        Self::new(cfg.bot.command_prefix.clone())
            .with_own_nick(cfg.bot.nick.clone())
            .with_stats(StatsSource::from_config(cfg))
            .with_timeouts(
                Duration::from_secs(cfg.http.connect_timeout_secs),
                Duration::from_secs(cfg.http.io_timeout_secs),
            )
    }

    /// Ignore the bot's own messages, compared case-insensitively as IRC does.
    pub fn with_own_nick(mut self, nick: impl Into<String>) -> Self {
        let nick = nick.into();
        self.own_nick = (!nick.trim().is_empty()).then_some(nick);
        self
    }

    pub fn with_stats(mut self, source: Option<StatsSource>) -> Self {
        self.stats = source;
        self
    }

    pub fn with_link_titles(mut self, enabled: bool) -> Self {
        self.link_titles = enabled;
        self
    }

    /// Bounds used when fetching pages for posted links.
    pub fn with_timeouts(mut self, connect: Duration, io: Duration) -> Self {
        self.connect_timeout = connect;
        self.io_timeout = io;
        self
    }

    /// The reply for `line`, if it deserves one. Failures are logged and
    /// swallowed: a broken stats page or link simply gets no answer.
    pub async fn handle(&self, line: &ChatLine) -> Option<String> {
        if self
            .own_nick
            .as_deref()
            .is_some_and(|own| line.nick.eq_ignore_ascii_case(own))
        {
            return None;
        }
        let Some(command) = parse_command(&self.prefix, &line.text) else {
            return self.link_title(line).await;
        };

        match command {
            Command::Urban(term) => Some(format!(
                "{}: Urban Dictionary says - {}",
                line.nick,
                urban_dictionary_url(&term)
            )),
            Command::Lmgtfy(query) => Some(format!(
                "{}: Let me google that for you - {}",
                line.nick,
                lmgtfy_url(&query)
            )),
            Command::Stats => {
                let Some(source) = &self.stats else {
                    tracing::debug!(nick = %line.nick, "stats.not_configured");
                    return None;
                };
                let stats = fetch_stats(source).await.ok()?;
                Some(format!("{}: {}", line.nick, stats.summary()))
            }
            Command::Unknown(text) => {
                tracing::debug!(nick = %line.nick, %text, "command.unknown");
                None
            }
        }
    }

    /// Handle `line` and send the reply (if any) back to its target.
    /// Returns whether anything was sent.
    pub async fn dispatch<R>(&self, line: &ChatLine, responder: &R) -> Result<bool, ReplyError>
    where
        R: Responder + ?Sized,
    {
        match self.handle(line).await {
            Some(reply) => {
                responder.privmsg(&line.target, &reply).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn link_title(&self, line: &ChatLine) -> Option<String> {
        if !self.link_titles {
            return None;
        }
        let url = extract_url(&line.text).ok()?;
        let page = FetchRequest::new(url)
            .with_connect_timeout(self.connect_timeout)
            .with_io_timeout(self.io_timeout)
            .send()
            .await
            .ok()?;
        let title = extract_title(&page)?;
        Some(format!("{}: [ {} ]", line.nick, title))
    }
}
