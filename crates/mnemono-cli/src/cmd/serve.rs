use crate::context::Context;
use anyhow::{Context as _, Result};
use mnemono_core::store::JsonFileStore;
use mnemono_telegram::{BotClient, Poller};

// ---------------------------------------------------------------------------
// serve
// ---------------------------------------------------------------------------

/// Run the Telegram poller and the liveness server until either stops or
/// the process receives Ctrl-C. A missing or rejected token is fatal;
/// network failures talking to Telegram are retried.
pub fn run(mut ctx: Context, port: Option<u16>, token: Option<String>) -> Result<()> {
    if let Some(token) = token {
        ctx.config.telegram.token = Some(token);
    }
    if let Some(port) = port {
        ctx.config.port = port;
    }
    let token = ctx.config.require_token()?.to_string();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_async(ctx, token))
}

async fn run_async(ctx: Context, token: String) -> Result<()> {
    let client = BotClient::new(&ctx.config.telegram.api_base, &token)?;
    let poller = Poller::new(client, ctx.assistant(), ctx.config.telegram.poll_timeout_secs);
    tracing::info!(state_file = %ctx.config.state_file.display(), "starting");

    // Both futures are polled together, so the liveness port binds even
    // while the bot is still unreachable.
    tokio::select! {
        result = run_bot(poller) => result.context("telegram polling stopped"),
        result = mnemono_server::serve(ctx.config.state_file.clone(), ctx.config.port) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
            Ok(())
        }
    }
}

async fn run_bot(poller: Poller<JsonFileStore>) -> mnemono_telegram::Result<()> {
    if let Some(me) = poller.identify().await? {
        tracing::info!(
            bot = me.username.as_deref().unwrap_or(&me.first_name),
            "bot authorized"
        );
    }
    poller.run().await
}
