use eyre::Result;
use novella_core::Library;
use novella_types::Glossary;

use crate::cli::GlossaryCommands;
use crate::utils::read_json_file;

pub async fn handle_glossary_command(cmd: GlossaryCommands, library: &Library) -> Result<()> {
    match cmd {
        GlossaryCommands::Set { novel, file } => {
            let glossary: Glossary = read_json_file(&file).await?;
            let key = novel.key();
            let previous = library.get_novel(&key).await?.glossary_id;

            let glossary_id = library.update_glossary(&key, glossary).await?;
            if glossary_id == previous {
                println!("Glossary of {} unchanged ({})", key, glossary_id);
            } else {
                println!("✅ Glossary of {} is now {}", key, glossary_id);
                println!("💡 Existing translations of {} are now expired", key);
            }
            Ok(())
        }
    }
}
