use crate::config::AppConfig;
use ideation::{DiscordNotifier, IdeaPipeline, IdeationResult};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<IdeaPipeline>,
    pub notifier: DiscordNotifier,
    pub cors: bool,
}

impl AppState {
    pub fn new(pipeline: IdeaPipeline, notifier: DiscordNotifier) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            notifier,
            cors: true,
        }
    }

    pub fn from_config(config: &AppConfig) -> IdeationResult<Self> {
        let pipeline = IdeaPipeline::new(config.pipeline.clone())?;
        let notifier = DiscordNotifier::new(
            config.notifications.discord_webhook_url.clone(),
            config.notifications.timeout(),
        )?;

        tracing::info!(
            topology = ?config.pipeline.topology,
            primary_model = %config.pipeline.primary.model,
            web_search = config.pipeline.web_search.enabled,
            notifications = notifier.is_enabled(),
            "Idea pipeline ready"
        );

        Ok(Self::new(pipeline, notifier).with_cors(config.server.cors))
    }

    pub fn with_cors(mut self, cors: bool) -> Self {
        self.cors = cors;
        self
    }
}
