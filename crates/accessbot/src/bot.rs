// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builds the configured messaging bot.

use std::sync::Arc;

use accessbot_config::AccessBotConfig;
use accessbot_config::model::Platform;
use accessbot_core::error::AccessBotError;
use accessbot_core::plugindata::PluginDataCodec;
use accessbot_core::traits::MessagingBot;
use accessbot_format::MessageFormatter;

/// A bot together with the plugin-data codec its message ids need.
pub struct ConfiguredBot {
    pub bot: Arc<dyn MessagingBot>,
    pub codec: PluginDataCodec,
}

pub fn formatter(config: &AccessBotConfig) -> MessageFormatter {
    MessageFormatter::new(
        config.teleport.cluster_name.clone(),
        config.teleport.web_proxy_url.clone(),
    )
}

/// Instantiates the bot for the single configured platform.
///
/// # Errors
///
/// Returns [`AccessBotError::Config`] when no platform is configured or the
/// platform's crate was not compiled in.
pub fn build_bot(config: &AccessBotConfig) -> Result<ConfiguredBot, AccessBotError> {
    let platform = config
        .platform()
        .ok_or_else(|| AccessBotError::Config("no messaging platform configured".into()))?;

    match platform {
        #[cfg(feature = "discord")]
        Platform::Discord => {
            let section = section(config.discord.as_ref(), platform)?;
            Ok(ConfiguredBot {
                bot: Arc::new(accessbot_discord::DiscordBot::new(section, formatter(config))?),
                codec: PluginDataCodec::default(),
            })
        }
        #[cfg(feature = "slack")]
        Platform::Slack => {
            let section = section(config.slack.as_ref(), platform)?;
            Ok(ConfiguredBot {
                bot: Arc::new(accessbot_slack::SlackBot::new(section, formatter(config))?),
                codec: PluginDataCodec::default(),
            })
        }
        #[cfg(feature = "msteams")]
        Platform::MsTeams => {
            let section = section(config.msteams.as_ref(), platform)?;
            Ok(ConfiguredBot {
                bot: Arc::new(accessbot_msteams::MsTeamsBot::new(section, formatter(config))?),
                codec: PluginDataCodec::new(accessbot_msteams::MESSAGE_FORMAT),
            })
        }
        #[allow(unreachable_patterns)]
        other => Err(AccessBotError::Config(format!(
            "accessbot was built without {other} support"
        ))),
    }
}

#[allow(dead_code)]
fn section<T>(section: Option<&T>, platform: Platform) -> Result<&T, AccessBotError> {
    section.ok_or_else(|| AccessBotError::Config(format!("[{platform}] section missing")))
}
