use reqwest::{blocking::Client, header::CONTENT_TYPE, StatusCode};

use crate::model::message::{Entry, Severity};
use crate::service::report::Report;

const WEBHOOK_PREFIX: &str = "https://discord.com/api/webhooks/";

/// Renders the whole report as plain text and posts it to a Discord webhook.
/// Delivery failures are logged into the report, never propagated.
pub fn send(client: &Client, report: &mut Report, webhook: &str, user: Option<&str>) {
    report.log(Severity::Debug, "\n----- DISCORD WEBHOOK -----");

    if !webhook.trim().to_lowercase().starts_with(WEBHOOK_PREFIX) {
        report.log(
            Severity::Error,
            "DISCORD_WEBHOOK is not a Discord webhook URL. Must start with `https://discord.com/api/webhooks/`",
        );
        return;
    }

    let content = compose(report.entries(), user);
    let payload = json::stringify(json::object! { content: content });

    match client
        .post(webhook)
        .header(CONTENT_TYPE, "application/json")
        .body(payload)
        .send()
    {
        Ok(response) if response.status() == StatusCode::NO_CONTENT => {
            report.log(Severity::Info, "Successfully sent message to Discord webhook!");
        }
        _ => report.log(
            Severity::Error,
            "Error sending message to Discord webhook, please check URL and permissions",
        ),
    }
}

fn compose(entries: &[Entry], user: Option<&str>) -> String {
    let mut message = String::new();
    if let Some(user) = user {
        message.push_str(&format!("<@{}>\n", user));
    }

    let lines: Vec<String> = entries
        .iter()
        .map(|entry| format!("({}) {}", entry.severity.as_str().to_uppercase(), entry.text))
        .collect();
    message.push_str(&lines.join("\n"));
    message
}
