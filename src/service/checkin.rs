use std::fmt;

use json::JsonValue;
use once_cell::sync::Lazy;
use reqwest::{
    blocking::Client,
    header::{self, HeaderMap, HeaderValue, InvalidHeaderValue},
    Url,
};

use crate::model::{game::Game, message::Severity};
use crate::service::report::{render_json, Report};

// Header set captured from a valid browser request. The non-standard
// content-type string is part of the wire contract, keep it verbatim.
static BROWSER_HEADERS: Lazy<HeaderMap> = Lazy::new(|| {
    let mut headers = HeaderMap::new();
    headers.insert("accept", HeaderValue::from_static("application/json, text/plain, */*"));
    headers.insert("accept-encoding", HeaderValue::from_static("gzip, deflate, br, zstd"));
    headers.insert("accept-language", HeaderValue::from_static("en-US,en;q=0.6"));
    headers.insert("connection", HeaderValue::from_static("keep-alive"));

    headers.insert("origin", HeaderValue::from_static("https://act.hoyolab.com"));
    headers.insert("referrer", HeaderValue::from_static("https://act.hoyolab.com"));
    headers.insert("content-type", HeaderValue::from_static("application.json;charset=UTF-8"));

    headers.insert(
        "sec-ch-ua",
        HeaderValue::from_static("\"Not/A)Brand\";v=\"8\", \"Chromium\";v=\"126\", \"Brave\";v=\"126\""),
    );
    headers.insert("sec-ch-ua-mobile", HeaderValue::from_static("?0"));
    headers.insert("sec-ch-ua-platform", HeaderValue::from_static("\"Linux\""));
    headers.insert("sec-fetch-dest", HeaderValue::from_static("empty"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("cors"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("same-site"));
    headers.insert("sec-gpc", HeaderValue::from_static("1"));

    headers.insert(
        "user-agent",
        HeaderValue::from_static(
            "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
        ),
    );

    headers
});

/// Performs the per-game check-in requests for one account after another.
/// Keeps the most recently resolved game list so accounts without their own
/// games line reuse the previous account's list.
pub struct CheckinRunner {
    client: Client,
    latest_games: Vec<String>,
}

impl CheckinRunner {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            latest_games: Vec::new(),
        }
    }

    /// Checks in one account. Every outcome is logged and processing always
    /// continues with the next game, nothing is retried or aborted.
    pub fn run(&mut self, report: &mut Report, cookie: &str, game_line: &str) {
        for raw in self.resolve_games(game_line) {
            let code = raw.to_lowercase();

            report.log(Severity::Debug, format!("\n----- CHECKING IN FOR {} -----", code));

            let game = match Game::parse(&code) {
                Some(game) => game,
                None => {
                    report.log(
                        Severity::Error,
                        format!("Game {} is invalid. Available games are: zzz, gi, hsr, hi3, and tot", code),
                    );
                    continue;
                }
            };

            match self.check_in(cookie, game) {
                Ok((body, headers)) => record_outcome(report, game, &body, &headers),
                Err(error) => {
                    report.log_game(Severity::Error, game, &format!("Check-in request failed: {}", error))
                }
            }
        }
    }

    // Non-empty lines are remembered as the latest list, empty lines fall
    // back to it (chains across consecutive accounts).
    fn resolve_games(&mut self, game_line: &str) -> Vec<String> {
        if game_line.is_empty() {
            return self.latest_games.clone();
        }

        let games: Vec<String> = game_line.split(' ').map(str::to_string).collect();
        self.latest_games = games.clone();
        games
    }

    fn check_in(&self, cookie: &str, game: Game) -> Result<(JsonValue, HeaderMap), CheckinError> {
        let mut url = Url::parse(game.endpoint()).map_err(|error| CheckinError::BadEndpoint(error.to_string()))?;
        let act_id = game
            .act_id()
            .ok_or_else(|| CheckinError::BadEndpoint(format!("no act_id in endpoint for {}", game.code())))?;
        url.query_pairs_mut().append_pair("lang", "en-us");

        let body = json::stringify(json::object! {
            lang: "en-us",
            act_id: act_id,
        });

        let response = self
            .client
            .post(url)
            .headers(request_headers(cookie, game)?)
            .body(body)
            .send()?;
        let response_headers = response.headers().clone();
        let text = response.text()?;
        let json = json::parse(&text)?;

        Ok((json, response_headers))
    }
}

// Browser header set plus the per-request credential and signature headers.
// The cookie is an opaque credential blob, keep it out of debug output.
fn request_headers(cookie: &str, game: Game) -> Result<HeaderMap, CheckinError> {
    let mut headers = BROWSER_HEADERS.clone();

    let mut cookie_value = HeaderValue::from_str(cookie)?;
    cookie_value.set_sensitive(true);
    headers.insert(header::COOKIE, cookie_value);
    headers.insert("x-rpc-signgame", HeaderValue::from_str(game.code())?);

    Ok(headers)
}

/// Platform retcodes are classified through an explicit table, everything
/// outside it is a distinct undocumented case rather than a fallthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Success(&'static str),
    Failure(&'static str),
    Undocumented,
}

pub fn classify(code: &str) -> Classification {
    match code {
        "0" => Classification::Success("Successfully checked in!"),
        "-5003" => Classification::Success("Already checked in for today"),
        "-100" => Classification::Failure("Error not logged in. Your cookie is invalid, try setting up again"),
        "-10002" => Classification::Failure("Error not found. You haven't played this game"),
        _ => Classification::Undocumented,
    }
}

fn record_outcome(report: &mut Report, game: Game, body: &JsonValue, headers: &HeaderMap) {
    let retcode = &body["retcode"];
    let code = match retcode.as_str() {
        Some(code) => code.to_string(),
        None => retcode.dump(),
    };

    match classify(&code) {
        Classification::Success(message) => report.log_game(Severity::Info, game, message),
        classification => {
            // dump the full response before the error entry
            report.log_game(
                Severity::Debug,
                game,
                &format!("Headers {}", render_json(&headers_to_json(headers))),
            );
            report.log_game(Severity::Debug, game, &format!("Response {}", render_json(body)));

            match classification {
                Classification::Failure(message) => report.log_game(Severity::Error, game, message),
                _ => report.log_game(
                    Severity::Error,
                    game,
                    "Error undocumented, report to Issues page if this persists",
                ),
            }
        }
    }
}

fn headers_to_json(headers: &HeaderMap) -> JsonValue {
    let mut object = JsonValue::new_object();
    for (name, value) in headers {
        object[name.as_str()] = value.to_str().unwrap_or("<unreadable>").into();
    }
    object
}

#[derive(Debug)]
pub enum CheckinError {
    ClientFailed(reqwest::Error),
    BadEndpoint(String),
    HeaderInvalid(InvalidHeaderValue),
    MalformedResponse(json::Error),
}

impl fmt::Display for CheckinError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CheckinError::ClientFailed(error) => write!(f, "Client error: {}", error),
            CheckinError::BadEndpoint(message) => write!(f, "Endpoint invalid: {}", message),
            CheckinError::HeaderInvalid(error) => write!(f, "Header value invalid: {}", error),
            CheckinError::MalformedResponse(error) => write!(f, "Response is not valid JSON: {}", error),
        }
    }
}

impl From<reqwest::Error> for CheckinError {
    fn from(error: reqwest::Error) -> Self {
        CheckinError::ClientFailed(error)
    }
}

impl From<InvalidHeaderValue> for CheckinError {
    fn from(error: InvalidHeaderValue) -> Self {
        CheckinError::HeaderInvalid(error)
    }
}

impl From<json::Error> for CheckinError {
    fn from(error: json::Error) -> Self {
        CheckinError::MalformedResponse(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::message::Severity;

    #[test]
    fn classification_table() {
        assert_eq!(classify("0"), Classification::Success("Successfully checked in!"));
        assert_eq!(classify("-5003"), Classification::Success("Already checked in for today"));
        assert!(matches!(classify("-100"), Classification::Failure(_)));
        assert!(matches!(classify("-10002"), Classification::Failure(_)));
        assert_eq!(classify("12345"), Classification::Undocumented);
        assert_eq!(classify("null"), Classification::Undocumented);
    }

    #[test]
    fn sticky_games_fallback_chains() {
        let mut runner = CheckinRunner::new(Client::new());
        assert_eq!(runner.resolve_games("gi hsr"), vec!["gi", "hsr"]);
        assert_eq!(runner.resolve_games(""), vec!["gi", "hsr"]);
        // a list resolved through fallback stays sticky itself
        assert_eq!(runner.resolve_games(""), vec!["gi", "hsr"]);
        assert_eq!(runner.resolve_games("zzz"), vec!["zzz"]);
        assert_eq!(runner.resolve_games(""), vec!["zzz"]);
    }

    #[test]
    fn no_games_resolved_before_any_line() {
        let mut runner = CheckinRunner::new(Client::new());
        assert!(runner.resolve_games("").is_empty());
    }

    #[test]
    fn unknown_games_log_errors_and_continue() {
        let mut runner = CheckinRunner::new(Client::new());
        let mut report = Report::new();
        runner.run(&mut report, "cookie", "pokemon minesweeper");

        let errors: Vec<_> = report
            .entries()
            .iter()
            .filter(|entry| entry.severity == Severity::Error)
            .collect();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].text.contains("Game pokemon is invalid"));
        assert!(errors[0].text.contains("zzz, gi, hsr, hi3, and tot"));
        assert!(errors[1].text.contains("Game minesweeper is invalid"));
    }

    #[test]
    fn cookie_header_is_sensitive() {
        let headers = request_headers("ltoken=secret", Game::Gi).unwrap();
        assert!(headers[header::COOKIE].is_sensitive());
        assert_eq!(headers["x-rpc-signgame"], "gi");
        assert_eq!(headers["content-type"], "application.json;charset=UTF-8");
    }

    #[test]
    fn success_retcode_logs_info() {
        let mut report = Report::new();
        let body = json::parse(r#"{"retcode": 0, "message": "OK"}"#).unwrap();
        record_outcome(&mut report, Game::Gi, &body, &HeaderMap::new());

        assert_eq!(report.entries().len(), 1);
        assert_eq!(report.entries()[0].severity, Severity::Info);
        assert_eq!(report.entries()[0].text, "GI: Successfully checked in!");
        assert!(!report.has_errors());
    }

    #[test]
    fn known_error_retcode_logs_debug_dumps_then_error() {
        let mut report = Report::new();
        let body = json::parse(r#"{"retcode": -100}"#).unwrap();
        record_outcome(&mut report, Game::Hsr, &body, &HeaderMap::new());

        let entries = report.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].severity, Severity::Debug);
        assert!(entries[0].text.starts_with("HSR: Headers"));
        assert_eq!(entries[1].severity, Severity::Debug);
        assert!(entries[1].text.starts_with("HSR: Response"));
        assert_eq!(entries[2].severity, Severity::Error);
        assert!(entries[2].text.contains("Your cookie is invalid"));
        assert!(report.has_errors());
    }

    #[test]
    fn undocumented_retcode_logs_generic_error() {
        let mut report = Report::new();
        let body = json::parse(r#"{"retcode": 9999}"#).unwrap();
        record_outcome(&mut report, Game::Tot, &body, &HeaderMap::new());

        let last = report.entries().last().unwrap();
        assert_eq!(last.severity, Severity::Error);
        assert_eq!(last.text, "TOT: Error undocumented, report to Issues page if this persists");
    }

    #[test]
    fn missing_retcode_counts_as_undocumented() {
        let mut report = Report::new();
        let body = json::parse(r#"{"message": "weird"}"#).unwrap();
        record_outcome(&mut report, Game::Zzz, &body, &HeaderMap::new());
        assert!(report.has_errors());
    }

    #[test]
    fn string_retcode_matches_like_numeric() {
        let mut report = Report::new();
        let body = json::parse(r#"{"retcode": "-5003"}"#).unwrap();
        record_outcome(&mut report, Game::Gi, &body, &HeaderMap::new());
        assert_eq!(report.entries()[0].text, "GI: Already checked in for today");
        assert!(!report.has_errors());
    }
}
