//! Status summary rendering.

use {
    freebot_channels::{ChannelId, StatusCard, UserId},
    std::fmt::Write,
};

use crate::strings;

/// One monitored channel as it appears in the summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    pub channel_id: ChannelId,
    /// Display group (category) the channel sits under.
    pub group: Option<String>,
    pub occupant: Option<UserId>,
}

/// Render the summary body. Entries must already be in display order; free
/// and busy channels are split into two sections that both keep that order.
pub fn render_status(entries: &[StatusEntry]) -> String {
    let (free, busy): (Vec<&StatusEntry>, Vec<&StatusEntry>) =
        entries.iter().partition(|entry| entry.occupant.is_none());

    let mut out = String::new();
    render_section(&mut out, strings::FREE_HEADER, &free);
    out.push('\n');
    render_section(&mut out, strings::BUSY_HEADER, &busy);
    out.truncate(out.trim_end().len());
    out
}

fn render_section(out: &mut String, header: &str, entries: &[&StatusEntry]) {
    let _ = writeln!(out, "{header}");
    if entries.is_empty() {
        let _ = writeln!(out, "{}", strings::NONE_LISTED);
        return;
    }

    let mut current_group: Option<&str> = None;
    for entry in entries {
        let group = entry.group.as_deref();
        if group != current_group {
            match group {
                Some(name) => {
                    let _ = writeln!(out, "**{name}**");
                },
                None => {
                    let _ = writeln!(out, "{}", strings::UNGROUPED_HEADER);
                },
            }
        }
        current_group = group;

        match entry.occupant {
            None => {
                let _ = writeln!(out, "{} {}", strings::FREE_MARK, entry.channel_id.mention());
            },
            Some(user) => {
                let _ = writeln!(
                    out,
                    "{} {} {}",
                    strings::BUSY_MARK,
                    entry.channel_id.mention(),
                    strings::claimed_by(&user.mention())
                );
            },
        }
    }
}

/// Wrap a rendered body into the card posted to the status channel.
pub fn status_card(body: String) -> StatusCard {
    StatusCard {
        title: strings::STATUS_TITLE.to_string(),
        body,
        color: strings::STATUS_COLOR,
    }
}

/// Split a rendered summary back into its free and busy sections.
#[cfg(test)]
pub(crate) fn sections(rendered: &str) -> (&str, &str) {
    let busy_at = rendered.find(strings::BUSY_HEADER).unwrap_or(rendered.len());
    rendered.split_at(busy_at)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(channel: u64, group: Option<&str>, occupant: Option<u64>) -> StatusEntry {
        StatusEntry {
            channel_id: ChannelId::new(channel),
            group: group.map(str::to_owned),
            occupant: occupant.map(UserId::new),
        }
    }

    #[test]
    fn splits_free_and_busy() {
        let text = render_status(&[entry(1, None, None), entry(2, None, Some(9))]);
        let (free, busy) = sections(&text);
        assert!(free.contains("<#1>"));
        assert!(!free.contains("<#2>"));
        assert!(busy.contains("<#2> claimed by <@9>"));
        assert!(!busy.contains("<#1>"));
    }

    #[test]
    fn empty_sections_say_none() {
        let text = render_status(&[entry(1, None, None)]);
        let (_, busy) = sections(&text);
        assert!(busy.contains(strings::NONE_LISTED));

        let text = render_status(&[]);
        assert_eq!(text.matches(strings::NONE_LISTED).count(), 2);
    }

    #[test]
    fn groups_are_headed_once_per_run() {
        let text = render_status(&[
            entry(1, Some("Help"), None),
            entry(2, Some("Help"), None),
            entry(3, Some("Java"), None),
            entry(4, Some("Help"), Some(7)),
        ]);
        let (free, busy) = sections(&text);
        assert_eq!(free.matches("**Help**").count(), 1);
        assert_eq!(free.matches("**Java**").count(), 1);
        assert!(free.find("<#2>") < free.find("**Java**"));
        assert_eq!(busy.matches("**Help**").count(), 1);
    }

    #[test]
    fn ungrouped_run_after_a_category_gets_its_own_header() {
        let text = render_status(&[
            entry(1, None, None),
            entry(2, Some("Help"), None),
            entry(3, None, None),
        ]);
        let (free, _) = sections(&text);
        assert_eq!(free.matches(strings::UNGROUPED_HEADER).count(), 1);
        assert!(free.find("<#1>") < free.find("**Help**"));
        assert!(free.find("<#2>") < free.find(strings::UNGROUPED_HEADER));
        assert!(free.find(strings::UNGROUPED_HEADER) < free.find("<#3>"));
    }

    #[test]
    fn leading_ungrouped_channels_have_no_header() {
        let text = render_status(&[entry(1, None, None), entry(2, None, None)]);
        assert!(!text.contains(strings::UNGROUPED_HEADER));
    }

    #[test]
    fn preserves_given_order() {
        let text = render_status(&[entry(30, None, None), entry(10, None, None)]);
        assert!(text.find("<#30>") < text.find("<#10>"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let entries = [entry(1, Some("A"), Some(5)), entry(2, None, None)];
        assert_eq!(render_status(&entries), render_status(&entries));
    }

    #[test]
    fn card_carries_title_and_colour() {
        let card = status_card("body".into());
        assert_eq!(card.title, strings::STATUS_TITLE);
        assert_eq!(card.color, 0xCCCC00);
        assert_eq!(card.body, "body");
    }
}
