use std::collections::BTreeMap;

use eyre::Result;
use novella_core::{Library, RankOptions};

pub async fn handle_rank_command(
    library: &Library,
    provider: String,
    list: String,
    page: u32,
    keyword: Option<String>,
) -> Result<()> {
    let options = RankOptions {
        list,
        page,
        filters: keyword
            .map(|k| BTreeMap::from([("keyword".to_string(), k)]))
            .unwrap_or_default(),
    };

    let items = library.get_rank(&provider, &options).await?;
    if items.is_empty() {
        println!("No novels on {} {} page {}", provider, options.list, page);
        return Ok(());
    }

    for (i, item) in items.iter().enumerate() {
        println!(
            "{:>3}. [{}] {}",
            i + 1,
            item.novel_id,
            item.title
        );
        if !item.keywords.is_empty() {
            println!("     {}", item.keywords.join(", "));
        }
    }
    Ok(())
}
