use eyre::Result;
use novella_core::Library;
use novella_types::{NovelKey, TocItem};

use crate::cli::HistoryCommands;
use crate::utils::format_time;

fn print_toc(label: &str, toc: &[TocItem]) {
    println!("{} ({} items):", label, toc.len());
    for item in toc {
        println!(
            "  [{}] {}",
            item.chapter_id.as_deref().unwrap_or("-"),
            item.title_jp
        );
    }
}

pub async fn handle_history_command(cmd: HistoryCommands, library: &Library) -> Result<()> {
    match cmd {
        HistoryCommands::List { provider, novel_id } => {
            let novel = provider.zip(novel_id).map(|(p, n)| NovelKey::new(p, n));
            let entries = library.merge_history(novel.as_ref()).await?;
            if entries.is_empty() {
                println!("No merges awaiting review");
                return Ok(());
            }

            println!("Merges awaiting review ({}):", entries.len());
            for entry in entries {
                println!(
                    "  {} {} {}: {}",
                    entry.id,
                    format_time(entry.created_at),
                    entry.novel,
                    entry.reason
                );
            }
            Ok(())
        }
        HistoryCommands::Show { id } => {
            let entry = library.merge_history_entry(&id).await?;
            println!("{} ({})", entry.novel, format_time(entry.created_at));
            println!("Reason: {}", entry.reason);
            print_toc("Before", &entry.toc_old);
            print_toc("After", &entry.toc_new);
            Ok(())
        }
        HistoryCommands::Delete { id } => {
            library.delete_merge_history(&id).await?;
            println!("✅ Dismissed {}", id);
            Ok(())
        }
    }
}
