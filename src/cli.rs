//! Command-line interface definitions.
//!
//! All page-scoped identifiers are optional; each page type stamps only the
//! ones it needs into its records.

use clap::Parser;
use scorecard_scrape::models::PageType;

/// Extract cricket statistics from saved or live stats pages.
///
/// # Examples
///
/// ```sh
/// # Season results from a saved page
/// scorecard_scrape --page season --season 2011 -i pages/ipl-2011.html -o ./out
///
/// # Two scorecards fetched live, retrying pages that fail to render
/// scorecard_scrape --page scorecard --retry-failed \
///     -i https://www.espncricinfo.com/series/ipl-2011-466304/csk-vs-kkr-1st-match-501198/full-scorecard \
///     -i https://www.espncricinfo.com/series/ipl-2011-466304/dc-vs-rr-2nd-match-501199/full-scorecard
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Page layout of every input
    #[arg(short, long, value_enum)]
    pub page: PageType,

    /// URL or path of a page to extract (repeatable)
    #[arg(short, long = "input", required = true)]
    pub inputs: Vec<String>,

    /// Output directory for the JSON reports
    #[arg(short, long, default_value = "./out")]
    pub output_dir: String,

    /// Optional path to a YAML site configuration
    #[arg(short, long, env = "SCORECARD_CONFIG")]
    pub config: Option<String>,

    /// Match id stamped into scorecard records; derived from the input URL when absent
    #[arg(long)]
    pub match_id: Option<i64>,

    /// Season stamped into season records
    #[arg(long)]
    pub season: Option<String>,

    #[arg(long)]
    pub player_id: Option<i64>,

    #[arg(long)]
    pub player_name: Option<String>,

    #[arg(long)]
    pub team_id: Option<i64>,

    /// Known team name in batting order (repeatable); used when a scorecard heading is missing
    #[arg(long = "team")]
    pub teams: Vec<String>,

    /// Pages fetched and extracted at once
    #[arg(long, default_value_t = 8)]
    pub concurrency: usize,

    /// Re-fetch pages that produced no table, up to the configured retry attempts
    #[arg(long)]
    pub retry_failed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "scorecard_scrape",
            "--page",
            "career-batting",
            "--input",
            "pages/253802.html",
            "--output-dir",
            "./json",
            "--player-id",
            "253802",
            "--player-name",
            "Virat Kohli",
        ]);

        assert_eq!(cli.page, PageType::CareerBatting);
        assert_eq!(cli.inputs, vec!["pages/253802.html"]);
        assert_eq!(cli.output_dir, "./json");
        assert_eq!(cli.player_id, Some(253802));
        assert_eq!(cli.player_name.as_deref(), Some("Virat Kohli"));
        assert_eq!(cli.concurrency, 8);
        assert!(!cli.retry_failed);
    }

    #[test]
    fn test_cli_short_and_repeated_flags() {
        let cli = Cli::parse_from([
            "scorecard_scrape",
            "-p",
            "scorecard",
            "-i",
            "a.html",
            "-i",
            "b.html",
            "--team",
            "CSK",
            "--team",
            "KKR",
            "--retry-failed",
        ]);

        assert_eq!(cli.page, PageType::Scorecard);
        assert_eq!(cli.inputs, vec!["a.html", "b.html"]);
        assert_eq!(cli.teams, vec!["CSK", "KKR"]);
        assert_eq!(cli.output_dir, "./out");
        assert!(cli.retry_failed);
    }

    #[test]
    fn test_cli_requires_input() {
        assert!(Cli::try_parse_from(["scorecard_scrape", "--page", "season"]).is_err());
    }
}
