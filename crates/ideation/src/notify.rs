//! Discord webhook notifications for generation outcomes.
//!
//! Delivery is best effort: failures are logged and never reach the caller.

use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use roulette_core::Combination;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::error::IdeationResult;

const SUCCESS_COLOR: u32 = 0x00ff00;
const FAILURE_COLOR: u32 = 0xff0000;
const FOOTER: &str = "Build Roulette";
/// Discord limit on an embed field value
const FIELD_VALUE_LIMIT: usize = 1024;
/// Upper bound on a single webhook delivery, connect included
pub const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct WebhookPayload {
    embeds: Vec<Embed>,
}

#[derive(Debug, Serialize)]
struct Embed {
    title: String,
    description: String,
    color: u32,
    fields: Vec<EmbedField>,
    timestamp: String,
    footer: EmbedFooter,
}

#[derive(Debug, Serialize)]
struct EmbedField {
    name: String,
    value: String,
    inline: bool,
}

#[derive(Debug, Serialize)]
struct EmbedFooter {
    text: String,
}

impl EmbedField {
    fn inline(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            inline: true,
        }
    }
}

fn combination_fields(combination: &Combination) -> Vec<EmbedField> {
    vec![
        EmbedField::inline("🏢 Market", combination.market.as_str()),
        EmbedField::inline("👥 User Type", combination.user_type.as_str()),
        EmbedField::inline("🎯 Problem Type", combination.problem_type.as_str()),
        EmbedField::inline("⚡ Tech Stack", combination.tech_stack.as_str()),
        EmbedField::inline("📅 Project Scope", combination.project_scope.as_str()),
    ]
}

fn truncate_chars(value: &str, limit: usize) -> String {
    value.chars().take(limit).collect()
}

fn embed(title: &str, description: &str, color: u32, fields: Vec<EmbedField>) -> Embed {
    Embed {
        title: title.to_string(),
        description: description.to_string(),
        color,
        fields,
        timestamp: Utc::now().to_rfc3339(),
        footer: EmbedFooter {
            text: FOOTER.to_string(),
        },
    }
}

/// Posts generation outcomes to a Discord webhook, if one is configured.
#[derive(Clone)]
pub struct DiscordNotifier {
    client: Client,
    webhook_url: Option<String>,
}

impl DiscordNotifier {
    /// Notifier whose deliveries give up after `timeout`.
    pub fn new(webhook_url: Option<String>, timeout: Duration) -> IdeationResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, webhook_url))
    }

    pub fn with_client(client: Client, webhook_url: Option<String>) -> Self {
        let webhook_url = webhook_url.filter(|url| !url.trim().is_empty());
        Self {
            client,
            webhook_url,
        }
    }

    pub fn disabled() -> Self {
        Self::with_client(Client::new(), None)
    }

    pub fn is_enabled(&self) -> bool {
        self.webhook_url.is_some()
    }

    pub async fn notify_success(&self, combination: &Combination) {
        let embed = embed(
            "✅ Product Ideas Generated",
            "New product ideas were successfully generated!",
            SUCCESS_COLOR,
            combination_fields(combination),
        );
        self.send(embed).await;
    }

    pub async fn notify_failure(&self, message: &str, combination: Option<&Combination>) {
        let mut fields = vec![EmbedField {
            name: "❌ Error Message".to_string(),
            value: truncate_chars(message, FIELD_VALUE_LIMIT),
            inline: false,
        }];
        if let Some(combination) = combination {
            fields.extend(combination_fields(combination));
        }

        let embed = embed(
            "❌ Product Generation Failed",
            "An error occurred while generating product ideas.",
            FAILURE_COLOR,
            fields,
        );
        self.send(embed).await;
    }

    /// Fire-and-forget variant of [`Self::notify_success`].
    pub fn spawn_success(&self, combination: Combination) {
        if !self.is_enabled() {
            return;
        }
        let notifier = self.clone();
        tokio::spawn(async move {
            notifier.notify_success(&combination).await;
        });
    }

    /// Fire-and-forget variant of [`Self::notify_failure`].
    pub fn spawn_failure(&self, message: String, combination: Option<Combination>) {
        if !self.is_enabled() {
            return;
        }
        let notifier = self.clone();
        tokio::spawn(async move {
            notifier
                .notify_failure(&message, combination.as_ref())
                .await;
        });
    }

    async fn send(&self, embed: Embed) {
        let Some(url) = &self.webhook_url else {
            return;
        };

        let payload = WebhookPayload {
            embeds: vec![embed],
        };

        match self.client.post(url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                debug!("Discord notification delivered");
            }
            Ok(response) => {
                warn!(status = response.status().as_u16(), "Discord webhook failed");
            }
            Err(e) => {
                error!(error = %e, "Failed to send Discord notification");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roulette_core::{Market, ProblemType, ProjectScope, TechStack, UserType};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn combination() -> Combination {
        Combination::new(
            Market::FinTech,
            UserType::SmallBusinesses,
            ProblemType::Analytics,
            TechStack::ApiMcp,
            ProjectScope::OneMonth,
        )
    }

    #[test]
    fn test_truncate_is_char_safe() {
        let long = "é".repeat(2000);
        let truncated = truncate_chars(&long, FIELD_VALUE_LIMIT);
        assert_eq!(truncated.chars().count(), 1024);
    }

    #[test]
    fn test_blank_url_disables_notifier() {
        assert!(!DiscordNotifier::new(Some("  ".to_string()), DEFAULT_WEBHOOK_TIMEOUT)
            .unwrap()
            .is_enabled());
        assert!(!DiscordNotifier::disabled().is_enabled());
    }

    #[tokio::test]
    async fn test_success_embed_lists_dimensions() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhook"))
            .and(body_partial_json(json!({
                "embeds": [{
                    "color": 0x00ff00,
                    "footer": {"text": "Build Roulette"}
                }]
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = DiscordNotifier::new(
            Some(format!("{}/webhook", server.uri())),
            DEFAULT_WEBHOOK_TIMEOUT,
        )
        .unwrap();
        notifier.notify_success(&combination()).await;

        let received = server.received_requests().await.unwrap();
        let body: serde_json::Value = received[0].body_json().unwrap();
        let fields = body["embeds"][0]["fields"].as_array().unwrap();
        assert_eq!(fields.len(), 5);
        assert_eq!(fields[3]["value"], "API/MCP");
    }

    #[tokio::test]
    async fn test_failure_embed_truncates_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = DiscordNotifier::new(Some(server.uri()), DEFAULT_WEBHOOK_TIMEOUT).unwrap();
        notifier.notify_failure(&"x".repeat(5000), None).await;

        let received = server.received_requests().await.unwrap();
        let body: serde_json::Value = received[0].body_json().unwrap();
        let embed = &body["embeds"][0];
        assert_eq!(embed["color"], 0xff0000);
        assert_eq!(embed["fields"].as_array().unwrap().len(), 1);
        assert_eq!(embed["fields"][0]["value"].as_str().unwrap().len(), 1024);
    }

    #[tokio::test]
    async fn test_webhook_errors_are_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = DiscordNotifier::new(Some(server.uri()), DEFAULT_WEBHOOK_TIMEOUT).unwrap();
        notifier
            .notify_failure("boom", Some(&combination()))
            .await;
    }

    #[tokio::test]
    async fn test_hanging_webhook_is_abandoned_after_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(204).set_delay(Duration::from_secs(3600)))
            .mount(&server)
            .await;

        let notifier =
            DiscordNotifier::new(Some(server.uri()), Duration::from_millis(200)).unwrap();

        let delivered = tokio::time::timeout(
            Duration::from_secs(5),
            notifier.notify_success(&combination()),
        )
        .await;
        assert!(delivered.is_ok());
    }
}
