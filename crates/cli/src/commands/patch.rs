use eyre::Result;
use novella_core::Library;
use novella_types::{NovelPatch, TextChange};

use crate::cli::PatchCommands;
use crate::utils::{or_unset, read_json_file};

fn print_change(label: &str, before: Option<&str>, after: Option<&str>) {
    println!("  {}: {} → {}", label, or_unset(before), or_unset(after));
}

fn print_text_change(label: &str, change: &TextChange) {
    print_change(label, change.before.as_deref(), change.after.as_deref());
}

pub async fn handle_patch_command(cmd: PatchCommands, library: &Library) -> Result<()> {
    match cmd {
        PatchCommands::Apply { novel, file } => {
            let patch: NovelPatch = read_json_file(&file).await?;
            if patch.is_empty() {
                println!("Patch is empty, nothing to do");
                return Ok(());
            }

            match library.apply_patch(&novel.key(), patch).await? {
                Some(entry) => {
                    println!("✅ Applied patch {} to {}", entry.id, novel.key());
                    if let Some(change) = &entry.title_zh {
                        print_text_change("title", change);
                    }
                    if let Some(change) = &entry.introduction_zh {
                        print_text_change("introduction", change);
                    }
                    for change in &entry.toc {
                        print_change(
                            &change.title_jp,
                            change.before.as_deref(),
                            change.after.as_deref(),
                        );
                    }
                }
                None => println!("Patch matches the stored text, nothing recorded"),
            }
            Ok(())
        }
        PatchCommands::Revoke { novel } => {
            let revoked = library.revoke_patches(&novel.key()).await?;
            if revoked == 0 {
                println!("No patches recorded for {}", novel.key());
            } else {
                println!("✅ Revoked {} patches of {}", revoked, novel.key());
            }
            Ok(())
        }
    }
}
