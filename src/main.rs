use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use semrel::config;
use semrel::history::ReleaseHistory;
use semrel::ui;
use semrel::vcs::{Git2Repository, Repository};

#[derive(clap::Parser)]
#[command(
    name = "semrel",
    version,
    about = "Compute the next release version from commit history"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short, long, help = "Branch to analyze (defaults to the checked-out branch)")]
    branch: Option<String>,

    #[arg(long, help = "Force a prerelease regardless of the branch channel")]
    prerelease: bool,

    #[arg(long, help = "Force a full release regardless of the branch channel")]
    full_release: bool,

    #[arg(long, help = "Build metadata to append to the computed version")]
    build_metadata: Option<String>,

    #[arg(long, help = "Print the rendered tag name instead of the version")]
    print_tag: bool,

    #[arg(short, long, help = "Only print the computed version")]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("SEMREL_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if args.prerelease && args.full_release {
        ui::display_error("--prerelease and --full-release are mutually exclusive");
        std::process::exit(2);
    }
    let prerelease_override = match (args.prerelease, args.full_release) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    };

    let config = config::load_config(args.config.as_deref()).context("loading configuration")?;
    let analyzer = config.build_analyzer().context("validating configuration")?;

    let repo = Git2Repository::open(".").context("opening git repository")?;
    let branch = match args.branch {
        Some(branch) => branch,
        None => repo.current_branch().context("resolving current branch")?,
    };

    let tags = repo.all_tags().context("listing tags")?;
    let history = ReleaseHistory::releases_from_tags(&tags, analyzer.tag_format());
    let last_release = history.last_release(false);

    if !args.quiet {
        let head = repo.branch_head(&branch).context("resolving branch head")?;
        let unreleased = history
            .unreleased_commits(&repo, &head)
            .context("walking unreleased commits")?;
        let parsed: Vec<_> = unreleased
            .iter()
            .flat_map(|commit| analyzer.parse_commit(commit))
            .collect();
        ui::display_commit_analysis(&parsed, &branch);
    }

    let next = analyzer
        .next_version_with(
            &repo,
            &branch,
            prerelease_override,
            args.build_metadata.as_deref(),
        )
        .context("computing next version")?;

    let rendered = if args.print_tag {
        analyzer.tag_format().format(&next)
    } else {
        next.to_string()
    };

    if args.quiet {
        println!("{}", rendered);
        return Ok(());
    }

    ui::display_next_version(last_release.map(|release| &release.version), &next);
    ui::display_status(&format!("tag: {}", analyzer.tag_format().format(&next)));

    Ok(())
}
