//! Chat command handlers for the Leader-1 bot.
//!
//! - [`lookup`]: Urban Dictionary / LMGTFY link builders (no network)
//! - [`links`]: first-link scanner for chat lines
//! - [`stats`]: SHOUTcast status XML decoding and retrieval
//! - [`title`]: `<title>` extraction for posted links
//! - [`command`] / [`handler`]: parsing chat lines and producing replies
//!
//! ```
//! # async fn demo() {
//! use leader_commands::handler::{ChatLine, CommandHandler};
//!
//! let handler = CommandHandler::new("!");
//! let reply = handler.handle(&ChatLine::new("bob", "#radio", "!urban yeet")).await;
//! assert_eq!(
//!     reply.as_deref(),
//!     Some("bob: Urban Dictionary says - http://www.urbandictionary.com/define.php?term=yeet")
//! );
//! # }
//! ```

pub mod command;
pub mod handler;
pub mod links;
pub mod lookup;
pub mod stats;
pub mod title;

pub use handler::{ChatLine, CommandHandler, ReplyError, Responder};
pub use links::{LinkError, extract_url};
pub use stats::{StatsError, StatsRecord, StatsSource, decode_stats, fetch_stats};
