use std::path::PathBuf;

use novella_types::{ChapterKey, NovelKey, Translator};
use uuid::Uuid;

#[derive(clap::Parser, Debug)]
#[clap(name = "novella", about = "Web novel metadata and translation progress tracker")]
pub struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the configured storage directory
    #[clap(long, global = true)]
    pub storage_path: Option<PathBuf>,

    /// Show what would change without writing the configuration
    #[clap(long, global = true)]
    pub dry_run: bool,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Fetch, inspect and maintain stored novels
    Novel {
        #[clap(subcommand)]
        command: NovelCommands,
    },
    /// Merge two table of contents snapshots offline
    Toc {
        #[clap(subcommand)]
        command: TocCommands,
    },
    /// Read chapters and record translations
    Chapter {
        #[clap(subcommand)]
        command: ChapterCommands,
    },
    /// Manage novel glossaries
    Glossary {
        #[clap(subcommand)]
        command: GlossaryCommands,
    },
    /// Correct translated titles and introductions
    Patch {
        #[clap(subcommand)]
        command: PatchCommands,
    },
    /// Review TOC merges flagged for inspection
    History {
        #[clap(subcommand)]
        command: HistoryCommands,
    },
    /// Show a provider ranking list
    Rank {
        /// Provider id
        provider: String,
        /// Ranking list name
        list: String,
        #[clap(long, default_value_t = 0)]
        page: u32,
        /// Only list novels tagged with this keyword
        #[clap(long)]
        keyword: Option<String>,
    },
    /// Manage configuration
    Config {
        #[clap(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct NovelArgs {
    /// Provider id
    pub provider: String,
    /// Novel id on the provider
    pub novel_id: String,
}

impl NovelArgs {
    pub fn key(&self) -> NovelKey {
        NovelKey::new(&self.provider, &self.novel_id)
    }
}

#[derive(clap::Args, Debug, Clone)]
pub struct ChapterArgs {
    #[clap(flatten)]
    pub novel: NovelArgs,
    /// Chapter id on the provider
    pub chapter_id: String,
}

impl ChapterArgs {
    pub fn key(&self) -> ChapterKey {
        self.novel.key().chapter(&self.chapter_id)
    }
}

#[derive(clap::Subcommand, Debug)]
pub enum NovelCommands {
    /// Show a novel, fetching or refreshing it when needed
    Show {
        #[clap(flatten)]
        novel: NovelArgs,
        /// Print the stored record as JSON
        #[clap(long)]
        json: bool,
    },
    /// List stored novels
    List {
        #[clap(long)]
        provider: Option<String>,
        /// Only novels whose title contains this text
        #[clap(long)]
        title: Option<String>,
    },
    /// Refresh a novel now, ignoring the configured expiry
    Refresh {
        #[clap(flatten)]
        novel: NovelArgs,
    },
    /// Recompute translation counters from stored chapters
    Recount {
        #[clap(flatten)]
        novel: NovelArgs,
    },
    /// Stop or resume refreshing a novel from its provider
    Pause {
        #[clap(flatten)]
        novel: NovelArgs,
        /// Resume refreshing instead
        #[clap(long)]
        resume: bool,
    },
}

#[derive(clap::Subcommand, Debug)]
pub enum TocCommands {
    /// Merge a fresh TOC into a stored one and print the verdict
    Merge {
        /// JSON file with the freshly fetched TOC
        remote: PathBuf,
        /// JSON file with the stored TOC
        local: PathBuf,
        /// Treat chapter ids as unreliable across fetches
        #[clap(long)]
        unstable: bool,
    },
}

#[derive(clap::Subcommand, Debug)]
pub enum ChapterCommands {
    /// Print a chapter, fetching it on first access
    Get {
        #[clap(flatten)]
        chapter: ChapterArgs,
        /// Print this engine's translation instead of the original
        #[clap(long)]
        translator: Option<Translator>,
    },
    /// Record a translation from a JSON array of paragraphs
    Translate {
        #[clap(flatten)]
        chapter: ChapterArgs,
        #[clap(long)]
        translator: Translator,
        /// Glossary version the translation was made with
        #[clap(long)]
        glossary_id: String,
        /// JSON file containing the translated paragraphs
        #[clap(long)]
        file: PathBuf,
    },
    /// Show per-engine translation state of a chapter
    State {
        #[clap(flatten)]
        chapter: ChapterArgs,
    },
}

#[derive(clap::Subcommand, Debug)]
pub enum GlossaryCommands {
    /// Replace a novel's glossary with the JSON object in a file
    Set {
        #[clap(flatten)]
        novel: NovelArgs,
        file: PathBuf,
    },
}

#[derive(clap::Subcommand, Debug)]
pub enum PatchCommands {
    /// Apply the JSON patch in a file
    Apply {
        #[clap(flatten)]
        novel: NovelArgs,
        file: PathBuf,
    },
    /// Undo every recorded patch of a novel
    Revoke {
        #[clap(flatten)]
        novel: NovelArgs,
    },
}

#[derive(clap::Subcommand, Debug)]
pub enum HistoryCommands {
    /// List flagged merges, newest first
    List {
        #[clap(long, requires = "novel_id")]
        provider: Option<String>,
        #[clap(long, requires = "provider")]
        novel_id: Option<String>,
    },
    /// Show both TOC snapshots of an entry
    Show { id: Uuid },
    /// Dismiss a reviewed entry
    Delete { id: Uuid },
}

#[derive(clap::Subcommand, Debug)]
pub enum ConfigCommands {
    /// Set a configuration value
    Set { key: String, value: String },
    /// Get a configuration value
    Get { key: String },
    /// Show all configuration
    Show,
    /// Reset configuration to defaults
    Reset {
        /// Skip confirmation prompt
        #[clap(long)]
        force: bool,
    },
}
