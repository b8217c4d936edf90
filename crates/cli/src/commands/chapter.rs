//! Chapter command handlers.

use eyre::Result;
use novella_core::Library;
use novella_types::{TranslationState, Translator};

use crate::cli::ChapterCommands;
use crate::utils::read_json_file;

pub async fn handle_chapter_command(cmd: ChapterCommands, library: &Library) -> Result<()> {
    match cmd {
        ChapterCommands::Get {
            chapter,
            translator,
        } => {
            let chapter = library.get_or_fetch_chapter(&chapter.key()).await?;
            let paragraphs = match translator {
                None => &chapter.paragraphs,
                Some(translator) => match chapter.translation(translator) {
                    Some(slot) => &slot.paragraphs,
                    None => {
                        println!("❌ No {} translation of {}", translator, chapter.key());
                        return Ok(());
                    }
                },
            };
            for paragraph in paragraphs {
                println!("{}", paragraph);
            }
            Ok(())
        }
        ChapterCommands::Translate {
            chapter,
            translator,
            glossary_id,
            file,
        } => {
            let paragraphs: Vec<String> = read_json_file(&file).await?;
            let count = library
                .record_translation(&chapter.key(), translator, &glossary_id, paragraphs)
                .await?;
            println!(
                "✅ Recorded {} translation of {} ({} chapters translated)",
                translator,
                chapter.key(),
                count
            );
            Ok(())
        }
        ChapterCommands::State { chapter } => {
            let key = chapter.key();
            println!("{}:", key);
            for translator in Translator::ALL {
                let state = library.translation_state(&key, translator).await?;
                let label = match state {
                    TranslationState::Missing => "missing",
                    TranslationState::Current => "current",
                    TranslationState::Expired => "expired (glossary changed)",
                };
                println!("  {}: {}", translator, label);
            }
            Ok(())
        }
    }
}
