use std::sync::Arc;

use constants::STARTUP_TIME;
use poise::serenity_prelude::ChannelId;
use remote::RemoteClient;
use store::SharedStore;
use time::OffsetDateTime;
use tokio::sync::Mutex;

#[derive(Clone)]
struct Data {
    quote_sync_channel_id: Option<ChannelId>,
    store: SharedStore,
    remote: RemoteClient,
    last_sync: Arc<Mutex<Option<OffsetDateTime>>>,
}

type Error = Box<dyn std::error::Error + Send + Sync>;
type Context<'a> = poise::Context<'a, Data, Error>;

mod commands;
mod constants;
mod error;
mod init;
mod models;
mod reconcile;
mod remote;
mod render;
mod storage;
mod store;
mod sync;
mod telemetry;
mod transfer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let _ = &*STARTUP_TIME;

    let mut client = init::init().await?;

    client
        .start()
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when running the client"))?;

    Ok(())
}
