use poise::serenity_prelude::*;
use tracing::Instrument;

use crate::{
    constants::quotes::{EXPORT_FILE_NAME, QUOTES_PER_PAGE},
    models::quotes::Quote,
    render::{pick_random, Pick},
    sync::sync_now,
    Context, Error,
};

const MAX_LISTED_TEXT_CHARS: usize = 120;

fn quote_embed(quote: &Quote) -> CreateEmbed {
    CreateEmbed::default()
        .description(format!("**{}**", quote.text))
        .footer(CreateEmbedFooter::new(format!("category: {}", quote.category)))
}

/// show a random quote, optionally from a single category.
#[tracing::instrument(skip(ctx))]
#[poise::command(
    prefix_command,
    aliases("quotes"),
    subcommands(
        "add_quote",
        "list_quotes",
        "categories",
        "export_quotes",
        "import_quotes",
        "sync_quotes"
    )
)]
pub async fn quote(ctx: Context<'_>, #[rest] category: Option<String>) -> Result<(), Error> {
    let embed = {
        let store = ctx.data().store.lock().await;
        let mut rng = rand::thread_rng();

        match pick_random(store.quotes(), category.as_deref(), &mut rng) {
            Pick::Quote(quote) => Some(quote_embed(quote)),
            Pick::Empty => None,
        }
    };

    let reply = match (embed, category) {
        (Some(embed), _) => poise::CreateReply::default().embed(embed),
        (None, Some(category)) => poise::CreateReply::default()
            .content(format!("no quotes found in category \"{category}\".")),
        (None, None) => poise::CreateReply::default().content("no quotes available."),
    };

    ctx.send(reply)
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;

    Ok(())
}

/// add a quote: `quote add <category> <text>`.
#[poise::command(prefix_command, rename = "add")]
#[tracing::instrument(skip(ctx))]
pub async fn add_quote(
    ctx: Context<'_>,
    category: String,
    #[rest] text: String,
) -> Result<(), Error> {
    let result = ctx.data().store.lock().await.add(&text, &category).await;

    let quote = match result {
        Ok(quote) => quote,
        Err(e) => {
            tracing::warn!(err = %e, "couldn't add quote");

            ctx.send(poise::CreateReply::default().content(e.to_string()))
                .await
                .inspect_err(
                    |e| tracing::error!(err = ?e, "an error occurred when sending reply"),
                )?;

            return Ok(());
        }
    };

    ctx.send(
        poise::CreateReply::default()
            .content("added quote!")
            .embed(quote_embed(&quote)),
    )
    .await
    .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;

    let remote = ctx.data().remote.clone();

    tokio::spawn(
        async move {
            match remote.post_quote(&quote).await {
                Ok(ack) => tracing::info!(ack = %ack, "posted quote to the server"),
                Err(e) => tracing::warn!(err = %e, "couldn't post quote to the server"),
            }
        }
        .in_current_span(),
    );

    Ok(())
}

fn list_page(pages: &[String], current_page: usize) -> CreateEmbed {
    CreateEmbed::default()
        .title("list of quotes")
        .description(pages[current_page].clone())
        .footer(CreateEmbedFooter::new(format!(
            "page {}/{}",
            current_page + 1,
            pages.len(),
        )))
}

fn list_buttons(ids: &[String; 4], pages: &[String], current_page: usize) -> Vec<CreateActionRow> {
    let [first_id, prev_id, next_id, last_id] = ids;
    let at_start = current_page == 0;
    let at_end = current_page == pages.len() - 1;

    vec![CreateActionRow::Buttons(vec![
        CreateButton::new(first_id).emoji('⏮').disabled(at_start),
        CreateButton::new(prev_id).emoji('◀').disabled(at_start),
        CreateButton::new(next_id).emoji('▶').disabled(at_end),
        CreateButton::new(last_id).emoji('⏭').disabled(at_end),
    ])]
}

fn list_entry(idx: usize, quote: &Quote) -> String {
    let mut text: String = quote.text.chars().take(MAX_LISTED_TEXT_CHARS).collect();

    if text.len() < quote.text.len() {
        text.push('…');
    }

    match quote.id {
        Some(id) => format!("{}. {} ({}, #{})\n", idx, text, quote.category, id),
        None => format!("{}. {} ({})\n", idx, text, quote.category),
    }
}

/// list every stored quote.
#[poise::command(prefix_command, rename = "list")]
#[tracing::instrument(skip_all)]
pub async fn list_quotes(ctx: Context<'_>) -> Result<(), Error> {
    let pages: Vec<String> = {
        let store = ctx.data().store.lock().await;

        store
            .quotes()
            .chunks(QUOTES_PER_PAGE)
            .enumerate()
            .map(|(page, chunk)| {
                chunk
                    .iter()
                    .enumerate()
                    .map(|(idx, quote)| list_entry(idx + 1 + page * QUOTES_PER_PAGE, quote))
                    .collect::<String>()
            })
            .collect()
    };

    if pages.is_empty() {
        ctx.send(
            poise::CreateReply::default()
                .reply(true)
                .allowed_mentions(CreateAllowedMentions::new().replied_user(false))
                .content("no quotes stored yet!"),
        )
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;

        return Ok(());
    }

    let ctx_id = ctx.id();
    let author_id = ctx.author().id;
    let ids = [
        format!("{}first", ctx_id),
        format!("{}prev", ctx_id),
        format!("{}next", ctx_id),
        format!("{}last", ctx_id),
    ];
    let mut current_page: usize = 0;

    let msg = ctx
        .send(
            poise::CreateReply::default()
                .reply(true)
                .allowed_mentions(CreateAllowedMentions::new().replied_user(false))
                .embed(list_page(&pages, current_page))
                .components(list_buttons(&ids, &pages, current_page)),
        )
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;

    while let Some(press) = collector::ComponentInteractionCollector::new(ctx)
        .filter(move |press| press.data.custom_id.starts_with(&ctx_id.to_string()))
        .timeout(std::time::Duration::from_secs(60))
        .await
    {
        if press.user.id != author_id {
            press
                .create_response(
                    ctx,
                    CreateInteractionResponse::Message(
                        CreateInteractionResponseMessage::new()
                            .content("you cannot interact with another user's invoked command!")
                            .ephemeral(true),
                    ),
                )
                .await
                .inspect_err(
                    |e| tracing::error!(err = ?e, "an error occurred when creating response"),
                )?;

            continue;
        }

        let [first_id, prev_id, next_id, last_id] = &ids;

        if press.data.custom_id == *prev_id {
            current_page = current_page.saturating_sub(1);
        } else if press.data.custom_id == *next_id {
            current_page = (current_page + 1).min(pages.len() - 1);
        } else if press.data.custom_id == *first_id {
            current_page = 0;
        } else if press.data.custom_id == *last_id {
            current_page = pages.len() - 1;
        } else {
            continue;
        }

        press
            .create_response(
                ctx,
                CreateInteractionResponse::UpdateMessage(
                    CreateInteractionResponseMessage::new()
                        .embed(list_page(&pages, current_page))
                        .components(list_buttons(&ids, &pages, current_page)),
                ),
            )
            .await
            .inspect_err(
                |e| tracing::error!(err = ?e, "an error occurred when creating response"),
            )?;
    }

    msg.into_message()
        .await?
        .edit(ctx, EditMessage::default().components(vec![]))
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when editing message"))?;

    Ok(())
}

/// list the categories in use and how many quotes each has.
#[poise::command(prefix_command)]
#[tracing::instrument(skip_all)]
pub async fn categories(ctx: Context<'_>) -> Result<(), Error> {
    let categories = ctx.data().store.lock().await.categories();

    let reply = if categories.is_empty() {
        poise::CreateReply::default().content("no quotes stored yet!")
    } else {
        let description: String = categories
            .iter()
            .map(|(category, count)| format!("- {}: {}\n", category, count))
            .collect();

        poise::CreateReply::default().embed(
            CreateEmbed::default()
                .title("quote categories")
                .description(description),
        )
    };

    ctx.send(reply)
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;

    Ok(())
}

/// download every quote as a JSON file.
#[poise::command(prefix_command, rename = "export")]
#[tracing::instrument(skip_all)]
pub async fn export_quotes(ctx: Context<'_>) -> Result<(), Error> {
    let exported = {
        let store = ctx.data().store.lock().await;
        store.export_all().map(|document| (document, store.len()))
    };

    let reply = match exported {
        Ok((document, count)) => poise::CreateReply::default()
            .content(format!("exported {count} quotes."))
            .attachment(CreateAttachment::bytes(
                document.into_bytes(),
                EXPORT_FILE_NAME,
            )),
        Err(e) => {
            tracing::error!(err = %e, "an error occurred when exporting quotes");
            poise::CreateReply::default().content(e.to_string())
        }
    };

    ctx.send(reply)
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;

    Ok(())
}

/// append the quotes of an attached JSON file.
#[poise::command(prefix_command, rename = "import")]
#[tracing::instrument(skip_all, fields(file = %file.filename))]
pub async fn import_quotes(ctx: Context<'_>, file: Attachment) -> Result<(), Error> {
    let bytes = file.download().await.inspect_err(
        |e| tracing::error!(err = ?e, "an error occurred when downloading attachment"),
    )?;

    let content = match String::from_utf8(bytes) {
        Ok(document) => {
            let result = ctx.data().store.lock().await.import_append(&document).await;

            match result {
                Ok(count) => format!("imported {count} quotes."),
                Err(e) => {
                    tracing::warn!(err = %e, "couldn't import quotes");
                    e.to_string()
                }
            }
        }
        Err(_) => "format error: the attached file is not UTF-8 text.".to_string(),
    };

    ctx.send(poise::CreateReply::default().content(content))
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;

    Ok(())
}

/// sync quotes with the server right away. the server's copy wins on conflicts.
#[poise::command(prefix_command, rename = "sync")]
#[tracing::instrument(skip_all)]
pub async fn sync_quotes(ctx: Context<'_>) -> Result<(), Error> {
    let content = match sync_now(ctx.data()).await {
        Ok(report) => report.summary(),
        Err(e) => e.to_string(),
    };

    ctx.send(poise::CreateReply::default().content(content))
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;

    Ok(())
}
