//! Novel command handlers: fetching, listing and maintaining stored novels.

use std::time::Duration;

use eyre::Result;
use novella_core::Library;
use novella_storage::NovelFilter;
use novella_types::{CountTarget, Novel, Translator};

use crate::cli::NovelCommands;
use crate::config::Config;
use crate::utils::{format_time, or_unset};

pub async fn handle_novel_command(cmd: NovelCommands, library: &Library, config: &Config) -> Result<()> {
    match cmd {
        NovelCommands::Show { novel, json } => {
            let novel = library
                .get_or_refresh(&novel.key(), config.refresh.expiry())
                .await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&novel)?);
            } else {
                print_novel(&novel);
            }
            Ok(())
        }
        NovelCommands::List { provider, title } => handle_list_novels(library, provider, title).await,
        NovelCommands::Refresh { novel } => {
            let before = library.get_novel(&novel.key()).await.ok();
            let after = library.get_or_refresh(&novel.key(), Duration::ZERO).await?;

            match before {
                Some(before) if before.sync_at == after.sync_at => {
                    println!("⚠️  {} was not refreshed (paused, exempt or unreachable)", novel.key());
                }
                Some(before) if before.update_at != after.update_at => {
                    println!(
                        "✅ {} updated: {} → {} chapters",
                        novel.key(),
                        before.toc_chapter_count(),
                        after.toc_chapter_count()
                    );
                }
                Some(_) => println!("✅ {} is up to date", novel.key()),
                None => println!("✅ Added {} ({})", novel.key(), after.title_jp),
            }
            Ok(())
        }
        NovelCommands::Recount { novel } => {
            let counts = library.recount(&novel.key()).await?;
            println!("✅ Recounted {}", novel.key());
            println!("  jp: {}", counts.jp);
            for translator in Translator::ALL {
                println!("  {}: {}", translator, counts.get(CountTarget::Translator(translator)));
            }
            Ok(())
        }
        NovelCommands::Pause { novel, resume } => {
            library.set_pause_update(&novel.key(), !resume).await?;
            if resume {
                println!("✅ Resumed updates of {}", novel.key());
            } else {
                println!("✅ Paused updates of {}", novel.key());
            }
            Ok(())
        }
    }
}

async fn handle_list_novels(
    library: &Library,
    provider: Option<String>,
    title: Option<String>,
) -> Result<()> {
    let filter = NovelFilter {
        provider_ids: provider.into_iter().collect(),
        title_contains: title,
    };

    let novels = library.list_novels(&filter).await?;
    if novels.is_empty() {
        println!("No novels in library");
        return Ok(());
    }

    println!("Library ({} novels):", novels.len());
    for novel in novels {
        println!(
            "  {} - {} [{}/{} chapters stored, updated {}]",
            novel.key,
            novel.title_zh.as_deref().unwrap_or(&novel.title_jp),
            novel.jp_chapters,
            novel.total_chapters,
            format_time(novel.update_at)
        );
    }
    Ok(())
}

fn print_novel(novel: &Novel) {
    println!("{}", novel.title_jp);
    println!("Translated title: {}", or_unset(novel.title_zh.as_deref()));
    println!("Key: {}", novel.key());
    println!("Authors: {}", novel.authors.join(", "));
    println!("Type: {:?}", novel.novel_type);
    if !novel.keywords.is_empty() {
        println!("Keywords: {}", novel.keywords.join(", "));
    }
    if let Some(points) = novel.points {
        println!("Points: {}", points);
    }
    println!("Views: {}", novel.visited);
    println!(
        "Chapters: {} in TOC, {} stored",
        novel.toc_chapter_count(),
        novel.counts.jp
    );
    for translator in Translator::ALL {
        println!(
            "  {}: {}",
            translator,
            novel.counts.get(CountTarget::Translator(translator))
        );
    }
    println!("Glossary: {} terms ({})", novel.glossary.len(), novel.glossary_id);
    if novel.pause_update {
        println!("Updates: paused");
    }
    println!("Synced: {}", format_time(novel.sync_at));
    println!("Updated: {}", format_time(novel.update_at));

    println!();
    for item in &novel.toc {
        match &item.chapter_id {
            Some(id) => println!(
                "  [{}] {}{}",
                id,
                item.title_jp,
                item.title_zh
                    .as_deref()
                    .map(|t| format!(" / {}", t))
                    .unwrap_or_default()
            ),
            None => println!("  {}", item.title_jp),
        }
    }
}
