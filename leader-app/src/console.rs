use async_trait::async_trait;
use leader_commands::{ReplyError, Responder};

/// Prints replies to stdout as `<target> <text>`; stands in for the IRC link.
pub struct Console;

#[async_trait]
impl Responder for Console {
    async fn privmsg(&self, target: &str, text: &str) -> Result<(), ReplyError> {
        println!("{target} {text}");
        Ok(())
    }
}
