use std::{str::FromStr, sync::Arc, time::Duration};

use anyhow::Context as _;
use futures::StreamExt;
use poise::serenity_prelude::{self as serenity, *};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};
use tokio::{
    sync::Mutex,
    time::{Interval, MissedTickBehavior},
};
use tracing::Instrument;

use crate::{
    commands,
    constants::quotes::{DEFAULT_SYNC_INTERVAL_SECS, REMOTE_QUOTES_ENDPOINT},
    remote::RemoteClient,
    storage::SqliteSlot,
    store::{QuoteStore, SharedStore},
    sync, telemetry, Data,
};

async fn init_database() -> anyhow::Result<Pool<Sqlite>> {
    let db_url = std::env::var("DATABASE_URL").context("missing DATABASE_URL")?;

    tracing::info!("initializing database connection...");
    let opts = SqliteConnectOptions::from_str(&db_url)
        .context("invalid DATABASE_URL")?
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);
    let db = SqlitePoolOptions::new()
        .max_connections(20)
        .connect_with(opts)
        .await?;

    tracing::info!("running migrations...");
    sqlx::migrate!("./migrations").run(&db).await?;
    tracing::info!("finished running migrations!");

    Ok(db)
}

async fn init_store(db: Pool<Sqlite>) -> SharedStore {
    tracing::info!("loading quotes...");
    let store = QuoteStore::load(SqliteSlot::new(db)).await;
    tracing::info!(count = store.len(), "loaded quote store!");

    Arc::new(Mutex::new(store))
}

fn init_sync_channel_id() -> Option<ChannelId> {
    let quote_sync_channel_id = std::env::var("QUOTE_SYNC_CHANNEL_ID")
        .ok()
        .and_then(|id| id.parse::<u64>().ok())
        .map(|id| {
            tracing::info!("sending quote sync reports to channel with id {}.", id);
            ChannelId::new(id)
        });

    if quote_sync_channel_id.is_none() {
        tracing::warn!("no quote sync channel id found. sync reports will only be logged.");
    }

    quote_sync_channel_id
}

fn init_remote() -> anyhow::Result<RemoteClient> {
    let endpoint = std::env::var("QUOTES_REMOTE_URL")
        .unwrap_or_else(|_| REMOTE_QUOTES_ENDPOINT.to_string());

    let remote = RemoteClient::new(endpoint)?;
    tracing::info!("mirroring quotes against {}.", remote.endpoint());

    Ok(remote)
}

fn parse_sync_interval(raw: Option<&str>) -> Duration {
    match raw.map(|raw| raw.trim().parse::<u64>()) {
        Some(Ok(secs)) if secs > 0 => Duration::from_secs(secs),
        Some(_) => {
            tracing::warn!(
                "invalid QUOTE_SYNC_INTERVAL_SECS, defaulting to {} seconds.",
                DEFAULT_SYNC_INTERVAL_SECS
            );
            Duration::from_secs(DEFAULT_SYNC_INTERVAL_SECS)
        }
        None => Duration::from_secs(DEFAULT_SYNC_INTERVAL_SECS),
    }
}

fn init_sync_interval() -> Duration {
    parse_sync_interval(std::env::var("QUOTE_SYNC_INTERVAL_SECS").ok().as_deref())
}

async fn init_discord_client(token: &str, data: Data) -> anyhow::Result<Client> {
    let intents =
        serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::MESSAGE_CONTENT;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::help::help(),
                commands::status::status(),
                commands::quote::quote(),
            ],
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some("q>".into()),
                ..Default::default()
            },
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands)
                    .await
                    .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when registering commands"))?;

                Ok(data)
            }.in_current_span())
        })
        .build();

    let client = ClientBuilder::new(token, intents)
        .framework(framework)
        .activity(serenity::ActivityData {
            name: "q>quote".into(),
            kind: serenity::ActivityType::Listening,
            state: None,
            url: None,
        })
        .await?;

    Ok(client)
}

/// a ticker that waits a full period after a slow cycle instead of catching up.
fn sync_ticker(period: Duration) -> Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    interval
}

fn spawn_background_tasks(client: &Client, data: &Data, sync_interval: Duration) {
    let sync_data = data.clone();
    let sync_http = client.http.clone();

    tracing::info!(interval = ?sync_interval, "initialized quote sync!");

    tokio::spawn(
        async move {
            let interval = sync_ticker(sync_interval);
            let task = futures::stream::unfold(interval, |mut interval| async {
                interval.tick().await;

                let _ = sync::quote_sync(&sync_http, &sync_data).await;
                Some(((), interval))
            });

            task.for_each(|_| async {}).await;
        }
        .in_current_span(),
    );
}

pub async fn init() -> anyhow::Result<Client> {
    telemetry::init_telemetry().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!("initializing... please wait warmly.");

    let token = std::env::var("DISCORD_TOKEN").context("missing DISCORD_TOKEN")?;

    let db = init_database().await?;
    let store = init_store(db).await;
    let remote = init_remote()?;
    let quote_sync_channel_id = init_sync_channel_id();
    let sync_interval = init_sync_interval();

    let data = Data {
        quote_sync_channel_id,
        store,
        remote,
        last_sync: Arc::new(Mutex::new(None)),
    };

    let client = init_discord_client(&token, data.clone()).await?;
    spawn_background_tasks(&client, &data, sync_interval);

    tracing::info!("finished initializing!");
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_interval_defaults_to_thirty_seconds() {
        assert_eq!(parse_sync_interval(None), Duration::from_secs(30));
    }

    #[test]
    fn sync_interval_reads_seconds() {
        assert_eq!(parse_sync_interval(Some(" 120 ")), Duration::from_secs(120));
    }

    #[tokio::test]
    async fn sync_ticker_delays_missed_ticks() {
        let ticker = sync_ticker(Duration::from_secs(30));

        assert_eq!(ticker.missed_tick_behavior(), MissedTickBehavior::Delay);
        assert_eq!(ticker.period(), Duration::from_secs(30));
    }

    #[test]
    fn invalid_sync_interval_falls_back() {
        assert_eq!(parse_sync_interval(Some("0")), Duration::from_secs(30));
        assert_eq!(parse_sync_interval(Some("soon")), Duration::from_secs(30));
    }
}
