use std::time::UNIX_EPOCH;

use crate::{
    commands::get_bot_avatar,
    constants::{version::get_version, POISE_VERSION, STARTUP_TIME},
    Context, Error,
};
use poise::serenity_prelude as serenity;

/// get the bot's status.
#[poise::command(prefix_command)]
#[tracing::instrument(skip_all)]
pub async fn status(ctx: Context<'_>) -> Result<(), Error> {
    let count = ctx.data().store.lock().await.len();

    let last_sync = match *ctx.data().last_sync.lock().await {
        Some(at) => format!("<t:{}:R>", at.unix_timestamp()),
        None => "never".to_string(),
    };

    let uptime = STARTUP_TIME
        .duration_since(UNIX_EPOCH)
        .map(|since| format!("<t:{}:R>", since.as_secs()))
        .unwrap_or_else(|_| "unknown".to_string());

    ctx.send(poise::CreateReply::default().embed(
        serenity::CreateEmbed::new()
        .field(
            "about the bot",
            "quotekeeper keeps a list of quotes for your server, shows them at random and mirrors them against a remote collection, using the [poise](https://github.com/serenity-rs/poise) framework.".to_string(),
            false
        )
        .field("version", get_version(), false)
        .field("rust", format!("[{0}](https://releases.rs/docs/{0})", rustc_version_runtime::version()), true)
        .field("poise", format!("[{0}](https://docs.rs/crate/poise/{0})", POISE_VERSION), true)
        .field("quotes stored", format!("{}", count), true)
        .field("last sync", last_sync, true)
        .field("uptime", uptime, true)
        .thumbnail(get_bot_avatar(ctx))
    ))
    .await
    .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;

    Ok(())
}
