use {
    serde::{Deserialize, Serialize},
    std::fmt,
};

macro_rules! snowflake_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

snowflake_id!(
    /// A guild (community) that groups channels and members.
    GuildId
);
snowflake_id!(
    /// A text channel inside a guild.
    ChannelId
);
snowflake_id!(
    /// A platform user.
    UserId
);
snowflake_id!(
    /// A message posted in a channel.
    MessageId
);

impl ChannelId {
    /// Inline channel link understood by the chat client.
    #[must_use]
    pub fn mention(self) -> String {
        format!("<#{}>", self.0)
    }
}

impl UserId {
    /// Inline user mention understood by the chat client.
    #[must_use]
    pub fn mention(self) -> String {
        format!("<@{}>", self.0)
    }
}
