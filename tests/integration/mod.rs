// Integration test helpers for Stadtwohnung Watcher
// The listing page and the Telegram Bot API are both served by wiremock.


use serde_json::json;
use stadtwohnung_watcher::{
    AppConfig, Watcher,
    config::{DatabaseConfig, RetryConfig, SourceConfig, TelegramConfig},
};
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const BOT_TOKEN: &str = "123456:TEST";
pub const CHAT_ID: &str = "-1001234567890";
pub const SEND_PATH: &str = "/bot123456:TEST/sendMessage";

/// Test configuration pointing both HTTP boundaries at `server`.
pub fn get_test_config(server: &MockServer, db_path: &Path) -> AppConfig {
    AppConfig {
        source: SourceConfig {
            listing_url: format!("{}/publication/apartment/", server.uri()),
            base_url: "https://www.vermietungen.stadt-zuerich.ch".to_string(),
            user_agent: "StadtwohnungWatcher-Test/1.0".to_string(),
            request_timeout: 5,
        },
        database: DatabaseConfig {
            path: db_path.to_string_lossy().to_string(),
        },
        telegram: TelegramConfig {
            bot_token: Some(BOT_TOKEN.to_string()),
            chat_id: Some(CHAT_ID.to_string()),
            api_base_url: server.uri(),
            connect_timeout: 2,
            request_timeout: 1,
        },
        retry: RetryConfig {
            max_attempts: 3,
            delay_ms: 10,
        },
    }
}

pub async fn create_test_watcher(server: &MockServer, db_path: &Path) -> anyhow::Result<Watcher> {
    let config = get_test_config(server, db_path);
    config.validate()?;
    Ok(Watcher::from_config(&config).await?)
}

/// One table row as the city's page renders it.
pub fn listing_row(address: &str, rent: &str, floor: Option<&str>, apply_path: &str) -> String {
    let floor_cell = floor
        .map(|f| format!(r#"<td class="floor">{}</td>"#, f))
        .unwrap_or_default();

    format!(
        r#"<tr>
            <td class="publicated_adress">{address}</td>
            <td class="rentalgross">{rent}</td>
            <td class="rooms">3</td>
            {floor_cell}
            <td class="area">80m²</td>
            <td class="move_in_date">01.05.2025</td>
            <td class="metropolitan">Kreis 4</td>
            <td><a class="apply_button" href="{apply_path}">Bewerben</a></td>
        </tr>"#
    )
}

pub fn listing_page(rows: &[String]) -> String {
    format!(
        r#"<!DOCTYPE html>
        <html><body>
            <table class="publication">
                <thead><tr><th>Adresse</th><th>Bruttomiete</th></tr></thead>
                <tbody>{}</tbody>
            </table>
        </body></html>"#,
        rows.join("\n")
    )
}

pub async fn mount_listing_page(server: &MockServer, rows: &[String]) {
    Mock::given(method("GET"))
        .and(path("/publication/apartment/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(listing_page(rows)),
        )
        .mount(server)
        .await;
}

pub fn telegram_ok(message_id: i64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "ok": true,
        "result": { "message_id": message_id }
    }))
}

/// Texts of all `sendMessage` calls the server has seen, in arrival order.
pub async fn sent_texts(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request: &&Request| request.url.path() == SEND_PATH)
        .filter_map(|request| serde_json::from_slice::<serde_json::Value>(&request.body).ok())
        .filter_map(|body| body["text"].as_str().map(str::to_string))
        .collect()
}
