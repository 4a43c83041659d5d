use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use parallels_core::{DocumentSortKey, Feature, GenreFilter, StoplistBasis, UnitType};

#[derive(Parser)]
#[command(
    name = "parallels",
    about = "Intertextual parallel search client",
    version
)]
pub struct Cli {
    /// RON configuration file (defaults to ./parallels.ron if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the texts available for a language
    Corpus(CorpusArgs),

    /// Run a parallel search between two texts and print the results
    Search(SearchArgs),

    /// Add a text file to the corpus
    Ingest(IngestArgs),
}

#[derive(Args)]
pub struct CorpusArgs {
    #[arg(long, default_value = "latin")]
    pub language: String,

    /// Zero-based page index
    #[arg(long, default_value_t = 0)]
    pub page: usize,

    #[arg(long)]
    pub page_size: Option<usize>,

    #[arg(long, value_enum, default_value_t = CorpusSort::Author)]
    pub sort: CorpusSort,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,

    /// Case-insensitive author substring
    #[arg(long)]
    pub author: Option<String>,

    /// Case-insensitive title substring
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long, value_enum, default_value_t = Genre::All)]
    pub genre: Genre,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Id of the source text
    #[arg(long)]
    pub source: String,

    /// Id of the target text
    #[arg(long)]
    pub target: String,

    #[arg(long, default_value = "latin")]
    pub language: String,

    #[arg(long, value_enum, default_value_t = FeatureArg::Lemma)]
    pub feature: FeatureArg,

    #[arg(long, value_enum, default_value_t = UnitArg::Phrase)]
    pub unit: UnitArg,

    /// Number of stopwords
    #[arg(long, default_value_t = 10)]
    pub stoplist: u32,

    #[arg(long, value_enum, default_value_t = StoplistBasisArg::Corpus)]
    pub stoplist_basis: StoplistBasisArg,

    #[arg(long, default_value_t = 10)]
    pub max_distance: u32,

    #[arg(long, default_value_t = 6.0)]
    pub min_score: f64,

    /// Zero-based server page index
    #[arg(long, default_value_t = 0)]
    pub page: usize,

    #[arg(long)]
    pub page_size: Option<usize>,
}

#[derive(Args)]
pub struct IngestArgs {
    /// Plain-text file to upload
    #[arg(long)]
    pub file: PathBuf,

    #[arg(long)]
    pub author: String,

    #[arg(long)]
    pub title: String,

    /// Year of composition; negative for BCE
    #[arg(long, allow_hyphen_values = true)]
    pub year: i32,

    #[arg(long)]
    pub prose: bool,

    #[arg(long, default_value = "latin")]
    pub language: String,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum CorpusSort {
    Author,
    Title,
    Year,
    Genre,
}

impl From<CorpusSort> for DocumentSortKey {
    fn from(value: CorpusSort) -> Self {
        match value {
            CorpusSort::Author => DocumentSortKey::Author,
            CorpusSort::Title => DocumentSortKey::Title,
            CorpusSort::Year => DocumentSortKey::Year,
            CorpusSort::Genre => DocumentSortKey::Genre,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Genre {
    All,
    Poetry,
    Prose,
}

impl From<Genre> for GenreFilter {
    fn from(value: Genre) -> Self {
        match value {
            Genre::All => GenreFilter::All,
            Genre::Poetry => GenreFilter::Poetry,
            Genre::Prose => GenreFilter::Prose,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FeatureArg {
    Form,
    Lemma,
    Semantic,
    LemmaSemantic,
    Sound,
}

impl From<FeatureArg> for Feature {
    fn from(value: FeatureArg) -> Self {
        match value {
            FeatureArg::Form => Feature::Form,
            FeatureArg::Lemma => Feature::Lemma,
            FeatureArg::Semantic => Feature::Semantic,
            FeatureArg::LemmaSemantic => Feature::LemmaSemantic,
            FeatureArg::Sound => Feature::Sound,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum UnitArg {
    Word,
    Phrase,
    Line,
}

impl From<UnitArg> for UnitType {
    fn from(value: UnitArg) -> Self {
        match value {
            UnitArg::Word => UnitType::Word,
            UnitArg::Phrase => UnitType::Phrase,
            UnitArg::Line => UnitType::Line,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StoplistBasisArg {
    Corpus,
    Source,
    Target,
    SourceTarget,
}

impl From<StoplistBasisArg> for StoplistBasis {
    fn from(value: StoplistBasisArg) -> Self {
        match value {
            StoplistBasisArg::Corpus => StoplistBasis::Corpus,
            StoplistBasisArg::Source => StoplistBasis::Source,
            StoplistBasisArg::Target => StoplistBasis::Target,
            StoplistBasisArg::SourceTarget => StoplistBasis::SourceTarget,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_search_with_defaults() {
        let cli = Cli::parse_from(["parallels", "search", "--source", "a", "--target", "b"]);
        let Commands::Search(args) = cli.command else {
            panic!("expected search");
        };
        assert_eq!(args.source, "a");
        assert_eq!(args.stoplist, 10);
        assert_eq!(Feature::from(args.feature), Feature::Lemma);
        assert_eq!(args.page_size, None);
    }

    #[test]
    fn ingest_accepts_negative_year() {
        let cli = Cli::parse_from([
            "parallels", "ingest", "--file", "a.tess", "--author", "Ennius", "--title",
            "Annales", "--year", "-169",
        ]);
        let Commands::Ingest(args) = cli.command else {
            panic!("expected ingest");
        };
        assert_eq!(args.year, -169);
        assert!(!args.prose);
    }
}
