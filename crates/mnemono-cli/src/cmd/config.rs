use crate::context::Context;
use crate::output::print_json;
use clap::Subcommand;
use mnemono_core::config::WarnLevel;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the effective configuration (token redacted)
    Show,

    /// Validate the config for common mistakes
    Validate,

    /// Write the effective configuration to the config file
    Init,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(ctx: &Context, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(ctx, json),
        ConfigSubcommand::Validate => validate(ctx, json),
        ConfigSubcommand::Init => init(ctx),
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(ctx: &Context, json: bool) -> anyhow::Result<()> {
    let mut config = ctx.config.clone();
    if config.telegram.token.is_some() {
        config.telegram.token = Some("***".to_string());
    }

    if json {
        return print_json(&config);
    }

    println!("Config file:   {}", ctx.config_path.display());
    println!("State file:    {}", config.state_file.display());
    println!("Port:          {}", config.port);
    println!("Default days:  {}", config.default_days);
    println!("Minimum days:  {}", config.min_days);
    println!("Maximum days:  {}", config.max_days);
    println!("Bot API:       {}", config.telegram.api_base);
    println!(
        "Bot token:     {}",
        config.telegram.token.as_deref().unwrap_or("(not set)")
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(ctx: &Context, json: bool) -> anyhow::Result<()> {
    let warnings = ctx.config.validate();

    if json {
        print_json(&serde_json::json!({ "warnings": warnings }))?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

fn init(ctx: &Context) -> anyhow::Result<()> {
    if ctx.config_path.exists() {
        anyhow::bail!("{} already exists", ctx.config_path.display());
    }
    ctx.config.save(&ctx.config_path)?;
    println!("Wrote {}", ctx.config_path.display());
    Ok(())
}
