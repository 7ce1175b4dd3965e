mod cli;

use shotsync::{
    config,
    frame_range::{self, FrameRange, ProjectSettings, ScriptRoot},
    hierarchy::ResolveOptions,
    session::Session,
};
use shotsync_common::{NaturalKey, Record};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, ShotArgs};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "shotsync=trace,shotsync_db=debug,shotsync_common=debug".to_string()
        } else {
            "shotsync=info,shotsync_db=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Validate { file } => {
            let path = file.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("shotsync {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        command => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run(command, config))
        }
    }
}

async fn run(command: Commands, config: config::Config) -> Result<()> {
    let session = Session::from_config(&config)?;

    match command {
        Commands::Resolve {
            entity_type,
            code,
            filters,
            json,
        } => {
            let key = NaturalKey::new(entity_type, filters, code);
            let (record, origin) = session.resolver.resolve_key(&key).await?;
            tracing::debug!(key = %key, ?origin, "resolved");
            print_record(&record, json)
        }
        Commands::Shot {
            item,
            no_thumbnails,
            json,
        } => resolve_shot(&session, &item, no_thumbnails, json).await,
        Commands::Keyword { keyword, item } => {
            let value = session
                .keywords
                .resolve_keyword(&keyword, &item.track_item())
                .await?;
            println!("{}", value);
            Ok(())
        }
        Commands::Template { template, item } => {
            let value = session
                .keywords
                .resolve_template(&template, &item.track_item())
                .await?;
            println!("{}", value);
            Ok(())
        }
        Commands::Frames { item, script } => {
            apply_frames(&session, &config, &item, script.as_deref()).await
        }
        Commands::Validate { .. } | Commands::Version => Ok(()),
    }
}

async fn resolve_shot(
    session: &Session,
    item: &ShotArgs,
    no_thumbnails: bool,
    json: bool,
) -> Result<()> {
    let options = if no_thumbnails {
        ResolveOptions::without_thumbnails()
    } else {
        ResolveOptions::default()
    };
    let track_item = item.track_item();

    let episode = session
        .hierarchy
        .resolve_episode(&track_item.sequence)
        .await?;
    let sequence = session
        .hierarchy
        .resolve_sequence(&track_item.sequence, options)
        .await?;
    let shot = session.hierarchy.resolve_shot(&track_item, options).await?;

    if json {
        let out = serde_json::json!({
            "episode": episode,
            "sequence": sequence,
            "shot": shot,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for record in [&episode, &sequence, &shot] {
            println!(
                "{:<10} {:<12} #{}",
                record.get_string("type"),
                record.get_string("code"),
                record.get_string("id")
            );
        }
    }
    Ok(())
}

async fn apply_frames(
    session: &Session,
    config: &config::Config,
    item: &ShotArgs,
    script: Option<&Path>,
) -> Result<()> {
    let shot = session
        .hierarchy
        .resolve_shot(&item.track_item(), ResolveOptions::without_thumbnails())
        .await?;
    let range = FrameRange::from_record(
        &shot,
        &config.frame_range.cut_in_field,
        &config.frame_range.cut_out_field,
    )
    .with_context(|| format!("Shot {} has no cut range", item.shot))?;

    let Some(path) = script else {
        println!("{}", range);
        return Ok(());
    };

    let mut root = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script root: {:?}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid script root: {:?}", path))?
    } else {
        ScriptRoot::default()
    };

    let settings = ProjectSettings::from(&config.frame_range);
    frame_range::set_frame_range(&mut root, range, &settings)?;

    std::fs::write(path, serde_json::to_string_pretty(&root)?)
        .with_context(|| format!("Failed to write script root: {:?}", path))?;
    println!("{} -> {}", range, path.display());
    Ok(())
}

fn print_record(record: &Record, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
    } else {
        for (field, value) in record.fields() {
            println!("{:<16} {}", field, value);
        }
    }
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    println!("  Project: {}", config.project.id);
    println!("  Store: {}", config.store.kind);
    println!(
        "  Episode tag prefix: {}",
        config.hierarchy.episode_tag_prefix
    );
    println!("  Return fields: {}", config.keywords.return_fields.len());

    Ok(())
}
