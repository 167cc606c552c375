use std::{process, time::Duration};

use reqwest::{blocking::Client, Url};

use crate::service::{
    checkin::CheckinRunner,
    config::Config,
    notify::{discord, telegram},
    report::Report,
};

mod model;
mod service;

fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{}", error);
            process::exit(1);
        }
    };

    // no request timeout: a hung call blocks the run, nothing is retried
    let client = match Client::builder().timeout(None::<Duration>).build() {
        Ok(client) => client,
        Err(error) => {
            eprintln!("Failed to build HTTP client: {}", error);
            process::exit(1);
        }
    };

    let mut report = Report::new();
    let mut runner = CheckinRunner::new(client.clone());

    for (index, cookie) in config.cookies.iter().enumerate() {
        report.begin_account(index + 1);
        runner.run(&mut report, cookie, config.game_line(index));
    }

    if let Some(webhook) = &config.discord_webhook {
        if Url::parse(webhook).is_ok() {
            discord::send(&client, &mut report, webhook, config.discord_user.as_deref());
        }
    }

    if config.telegram_bot_token.is_some() && config.telegram_chat_id.is_some() {
        telegram::send(
            &client,
            &mut report,
            config.telegram_bot_token.as_deref(),
            config.telegram_chat_id.as_deref(),
        );
    }

    if report.has_errors() {
        println!();
        eprintln!("Error(s) occured.");
        process::exit(1);
    }
}
