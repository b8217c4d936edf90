use eyre::Result;
use novella_core::{IdStability, merge_toc};
use novella_types::TocItem;

use crate::cli::TocCommands;
use crate::utils::read_json_file;

pub async fn handle_toc_command(cmd: TocCommands) -> Result<()> {
    match cmd {
        TocCommands::Merge {
            remote,
            local,
            unstable,
        } => {
            let remote: Vec<TocItem> = read_json_file(&remote).await?;
            let local: Vec<TocItem> = read_json_file(&local).await?;
            let stability = if unstable {
                IdStability::Unstable
            } else {
                IdStability::Stable
            };

            let outcome = merge_toc(&remote, &local, stability);

            println!("{}", serde_json::to_string_pretty(&outcome.toc)?);
            eprintln!("Changed: {}", outcome.has_changed);
            match outcome.review_reason {
                Some(reason) => eprintln!("⚠️  Needs review: {}", reason),
                None => eprintln!("Needs review: no"),
            }
            Ok(())
        }
    }
}
