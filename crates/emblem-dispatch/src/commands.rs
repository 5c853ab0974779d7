// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat commands for managing per-channel customization.
//!
//! Who may run them is decided by the platform connection before the event
//! reaches the dispatcher.

/// A parsed admin command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    /// `!theme <text>`
    SetTheme(String),
    /// `!theme clear`
    ClearTheme,
    /// `!meaning <user> <text>`
    SetMeaning { user: String, meaning: String },
    /// `!meaning <user> clear`
    ClearMeaning { user: String },
    /// `!ignore <user>`
    Ignore(String),
    /// `!unignore <user>`
    Unignore(String),
    /// `!bangifter <user>`
    BanGifter(String),
    /// `!unbangifter <user>`
    UnbanGifter(String),
    /// `!avatar <user> [style]`
    Avatar { user: String, style: Option<String> },
}

impl AdminCommand {
    /// Parses one chat line. Returns `None` for anything that is not a
    /// well-formed command.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let body = text.strip_prefix('!')?;
        let (name, rest) = match body.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (body, ""),
        };

        match name.to_ascii_lowercase().as_str() {
            "theme" => match rest {
                "" => None,
                r if r.eq_ignore_ascii_case("clear") => Some(AdminCommand::ClearTheme),
                r => Some(AdminCommand::SetTheme(r.to_string())),
            },
            "meaning" => {
                let (user, meaning) = split_user(rest)?;
                match meaning {
                    "" => None,
                    m if m.eq_ignore_ascii_case("clear") => Some(AdminCommand::ClearMeaning { user }),
                    m => Some(AdminCommand::SetMeaning {
                        user,
                        meaning: m.to_string(),
                    }),
                }
            }
            "ignore" => single_user(rest).map(AdminCommand::Ignore),
            "unignore" => single_user(rest).map(AdminCommand::Unignore),
            "bangifter" => single_user(rest).map(AdminCommand::BanGifter),
            "unbangifter" => single_user(rest).map(AdminCommand::UnbanGifter),
            "avatar" => {
                let (user, style) = split_user(rest)?;
                let style = match style {
                    "" => None,
                    s => Some(s.to_string()),
                };
                Some(AdminCommand::Avatar { user, style })
            }
            _ => None,
        }
    }
}

/// Splits `@user rest...` into the username (without `@`) and the remainder.
fn split_user(rest: &str) -> Option<(String, &str)> {
    let (user, remainder) = match rest.split_once(char::is_whitespace) {
        Some((user, remainder)) => (user, remainder.trim()),
        None => (rest, ""),
    };
    let user = user.trim_start_matches('@');
    if user.is_empty() {
        None
    } else {
        Some((user.to_string(), remainder))
    }
}

/// Exactly one username argument.
fn single_user(rest: &str) -> Option<String> {
    match split_user(rest)? {
        (user, "") => Some(user),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_commands() {
        assert_eq!(
            AdminCommand::parse("!theme  deep sea explorers "),
            Some(AdminCommand::SetTheme("deep sea explorers".into()))
        );
        assert_eq!(AdminCommand::parse("!THEME Clear"), Some(AdminCommand::ClearTheme));
        assert_eq!(AdminCommand::parse("!theme"), None);
    }

    #[test]
    fn meaning_commands() {
        assert_eq!(
            AdminCommand::parse("!meaning @NightOwl a librarian who never sleeps"),
            Some(AdminCommand::SetMeaning {
                user: "NightOwl".into(),
                meaning: "a librarian who never sleeps".into()
            })
        );
        assert_eq!(
            AdminCommand::parse("!meaning nightowl clear"),
            Some(AdminCommand::ClearMeaning {
                user: "nightowl".into()
            })
        );
        assert_eq!(AdminCommand::parse("!meaning nightowl"), None);
    }

    #[test]
    fn user_list_commands() {
        assert_eq!(
            AdminCommand::parse("!ignore @Shadow1"),
            Some(AdminCommand::Ignore("Shadow1".into()))
        );
        assert_eq!(
            AdminCommand::parse("!unignore shadow1"),
            Some(AdminCommand::Unignore("shadow1".into()))
        );
        assert_eq!(
            AdminCommand::parse("!bangifter santa"),
            Some(AdminCommand::BanGifter("santa".into()))
        );
        assert_eq!(
            AdminCommand::parse("!unbangifter santa"),
            Some(AdminCommand::UnbanGifter("santa".into()))
        );
        assert_eq!(AdminCommand::parse("!ignore"), None);
        assert_eq!(AdminCommand::parse("!ignore two users"), None);
    }

    #[test]
    fn avatar_command_with_optional_style() {
        assert_eq!(
            AdminCommand::parse("!avatar fox"),
            Some(AdminCommand::Avatar {
                user: "fox".into(),
                style: None
            })
        );
        assert_eq!(
            AdminCommand::parse("!avatar @fox watercolor"),
            Some(AdminCommand::Avatar {
                user: "fox".into(),
                style: Some("watercolor".into())
            })
        );
    }

    #[test]
    fn non_commands_are_ignored() {
        assert_eq!(AdminCommand::parse("hello chat"), None);
        assert_eq!(AdminCommand::parse("!dance"), None);
        assert_eq!(AdminCommand::parse("!"), None);
        assert_eq!(AdminCommand::parse("!ignore @"), None);
    }
}
