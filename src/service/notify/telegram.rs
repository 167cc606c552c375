use chrono::{DateTime, FixedOffset, Utc};
use reqwest::{blocking::Client, header::CONTENT_TYPE};

use crate::model::message::{Entry, Severity};
use crate::service::report::{render_json, Report};

const API_BASE: &str = "https://api.telegram.org";

/// Renders the report as an HTML message grouped by account and posts it via
/// the Telegram Bot API. Delivery failures are logged, never propagated.
pub fn send(client: &Client, report: &mut Report, token: Option<&str>, chat_id: Option<&str>) {
    report.log(Severity::Debug, "\n----- TELEGRAM BOT -----");

    let (token, chat_id) = match (token, chat_id) {
        (Some(token), Some(chat_id)) => (token, chat_id),
        _ => {
            report.log(
                Severity::Error,
                "TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID must be set to use Telegram notifications",
            );
            return;
        }
    };

    // Asia/Shanghai is a fixed UTC+8, no DST
    let now = Utc::now().with_timezone(&FixedOffset::east_opt(8 * 3600).unwrap());
    let text = compose(report.entries(), now);

    let payload = json::stringify(json::object! {
        chat_id: chat_id,
        text: text,
        parse_mode: "HTML",
    });
    let url = format!("{}/bot{}/sendMessage", API_BASE, token);

    let raw = match client
        .post(url)
        .header(CONTENT_TYPE, "application/json")
        .body(payload)
        .send()
        .and_then(|response| response.text())
    {
        Ok(raw) => raw,
        Err(_) => {
            report.log(Severity::Error, "Error sending message to Telegram: Unknown error");
            return;
        }
    };

    match json::parse(&raw) {
        Ok(response) if response["ok"].as_bool().unwrap_or(false) => {
            report.log(Severity::Info, "Successfully sent message to Telegram!");
        }
        Ok(response) => {
            let description = response["description"].as_str().unwrap_or("Unknown error").to_string();
            report.log(Severity::Error, format!("Error sending message to Telegram: {}", description));
            report.log(
                Severity::Debug,
                format!("Telegram API Response: {}", render_json(&response)),
            );
        }
        Err(_) => report.log(Severity::Error, "Error sending message to Telegram: Unknown error"),
    }
}

fn compose(entries: &[Entry], now: DateTime<FixedOffset>) -> String {
    let mut text = String::new();
    text.push_str("🎮 <b>HoYoLAB Auto Check-in Report</b>\n");
    text.push_str(&format!("📅 <i>{} (UTC+8)</i>\n", now.format("%b %-d, %Y, %I:%M %p")));
    text.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    let groups = group_by_account(entries);
    let total_groups = groups.len();

    for (index, (account, group)) in groups.iter().enumerate() {
        if group.is_empty() {
            continue;
        }

        if let Some(account) = account {
            text.push_str(&format!("👤 <b>Account {}</b>\n", account));
            text.push_str("┌─────────────────────────┐\n");
        }

        for entry in group {
            let emoji = match entry.severity {
                Severity::Info => "✅",
                Severity::Error => "❌",
                Severity::Warn => "⚠️",
                _ => "📝",
            };

            let escaped = escape_html(&entry.text);
            match escaped.split_once(':') {
                Some((label, status)) => {
                    text.push_str(&format!("│ {} <b>{}</b>: {}\n", emoji, label.trim(), status.trim()))
                }
                None => text.push_str(&format!("│ {} {}\n", emoji, escaped)),
            }
        }

        if account.is_some() {
            text.push_str("└─────────────────────────┘\n");
            if index < total_groups - 1 {
                text.push('\n');
            }
        }
    }

    let successes = entries.iter().filter(|e| e.severity == Severity::Info).count();
    let errors = entries.iter().filter(|e| e.severity == Severity::Error).count();
    let warnings = entries.iter().filter(|e| e.severity == Severity::Warn).count();
    let accounts = groups.iter().filter(|(account, _)| account.is_some()).count();

    text.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    text.push_str("📊 <b>Summary:</b>\n");
    text.push_str(&format!("✅ Success: {} | ❌ Errors: {}", successes, errors));
    if warnings > 0 {
        text.push_str(&format!(" | ⚠️ Warnings: {}", warnings));
    }
    text.push_str(&format!("\n👥 Total Accounts: {}", accounts));
    text.push_str("\n\n🤖 <i>Automated by GitHub Actions</i>");

    text
}

// Groups in first-appearance order, keyed by the entry's account tag.
// Untagged entries form the unboxed "General" group; marker entries open
// their group without being part of its body.
fn group_by_account(entries: &[Entry]) -> Vec<(Option<usize>, Vec<&Entry>)> {
    let mut groups: Vec<(Option<usize>, Vec<&Entry>)> = Vec::new();

    for entry in entries {
        match groups.iter_mut().find(|(account, _)| *account == entry.account) {
            Some((_, group)) => {
                if !entry.marker {
                    group.push(entry);
                }
            }
            None => {
                let group = if entry.marker { Vec::new() } else { vec![entry] };
                groups.push((entry.account, group));
            }
        }
    }

    groups
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
