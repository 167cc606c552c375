use std::{env, fmt};

/// Everything the run needs from the process environment.
pub struct Config {
    pub cookies: Vec<String>,
    pub game_lines: Vec<String>,
    pub discord_webhook: Option<String>,
    pub discord_user: Option<String>,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::from_parts(
            &env::var("COOKIE").unwrap_or_default(),
            &env::var("GAMES").unwrap_or_default(),
            optional_var("DISCORD_WEBHOOK"),
            optional_var("DISCORD_USER"),
            optional_var("TELEGRAM_BOT_TOKEN"),
            optional_var("TELEGRAM_CHAT_ID"),
        )
    }

    pub fn from_parts(
        cookie_raw: &str,
        games_raw: &str,
        discord_webhook: Option<String>,
        discord_user: Option<String>,
        telegram_bot_token: Option<String>,
        telegram_chat_id: Option<String>,
    ) -> Result<Self, ConfigError> {
        if cookie_raw.trim().is_empty() {
            return Err(ConfigError::CookieMissing);
        }
        if games_raw.trim().is_empty() {
            return Err(ConfigError::GamesMissing);
        }

        Ok(Self {
            cookies: split_lines(cookie_raw),
            game_lines: split_lines(games_raw),
            discord_webhook,
            discord_user,
            telegram_bot_token,
            telegram_chat_id,
        })
    }

    /// Games line for the given account, empty if the account has none.
    pub fn game_line(&self, index: usize) -> &str {
        self.game_lines.get(index).map(String::as_str).unwrap_or("")
    }
}

// Lines are trimmed but empty lines are kept, an empty games line means
// "fall back to the previous account's list".
fn split_lines(raw: &str) -> Vec<String> {
    raw.split('\n').map(|line| line.trim().to_string()).collect()
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

#[derive(Debug)]
pub enum ConfigError {
    CookieMissing,
    GamesMissing,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::CookieMissing => write!(f, "COOKIE environment variable not set!"),
            ConfigError::GamesMissing => write!(f, "GAMES environment variable not set!"),
        }
    }
}
