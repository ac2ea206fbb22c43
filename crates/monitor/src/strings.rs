//! User-facing text.

/// Title of the status card. Reconciliation recognises previously posted
/// status messages by it.
pub const STATUS_TITLE: &str = "**__CHANNEL STATUS__**";

/// Accent colour of the status card.
pub const STATUS_COLOR: u32 = 0xCC_CC_00;

pub const FREE_HEADER: &str = "__**Free**__";
pub const BUSY_HEADER: &str = "__**Busy**__";
pub const FREE_MARK: &str = ":green_circle:";
pub const BUSY_MARK: &str = ":red_circle:";
pub const NONE_LISTED: &str = "_none_";
/// Header for channels outside any category once a category run ended.
pub const UNGROUPED_HEADER: &str = "**Other**";

pub const NEW_QUESTION: &str = "Thank you for asking a question. This channel is now marked as \
                                busy; once your question is answered, please use `/free` so \
                                others know the channel is available again.";

pub const MARKED_FREE: &str = "This channel is now free for someone else to ask a question.";

pub const ALREADY_FREE: &str = "This channel is already free, no changes made.";

pub const NOT_MONITORED: &str = "This channel is not being monitored for free/busy status. If \
                                 you believe it should be, please contact a moderator.";

pub const NOT_READY: &str = "The bot is still starting up, please try again in a moment.";

/// Guild without any help-channel setup.
#[must_use]
pub fn not_configured(guild_name: &str) -> String {
    format!(
        "This guild ({guild_name}) is not configured to use the `/free` command, please ask a \
         moderator to add it to the bot configuration."
    )
}

/// Annotation next to a busy channel.
#[must_use]
pub fn claimed_by(user_mention: &str) -> String {
    format!("claimed by {user_mention}")
}
