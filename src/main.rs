use anyhow::{Context, Result};
use bit_core::commands::porcelain::log::display_commit;
use bit_core::{Config, LogFormat, MergeResult, Repository};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "bit-core",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "A minimal local version control engine",
    long_about = "Content-addressed objects, branches, a staging index and three-way merges. \
    Everything is local: there is no network transport.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command initializes a new repository in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<PathBuf>,
    },
    #[command(name = "add", about = "Stage files and directories for the next commit")]
    Add {
        #[arg(index = 1, required = true, help = "Files or directories to stage")]
        paths: Vec<PathBuf>,
    },
    #[command(
        name = "commit",
        about = "Create a new commit with the specified message",
        long_about = "This command records the staged files on top of HEAD. \
        While a merge is pending it concludes the merge instead."
    )]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(name = "branch", about = "Create a branch, or list branches when no name is given")]
    Branch {
        #[arg(index = 1)]
        name: Option<String>,
    },
    #[command(name = "switch", about = "Switch to a branch or detach HEAD at a commit")]
    Switch {
        #[arg(index = 1, help = "Branch name or full commit id")]
        target: String,
    },
    #[command(name = "current-branch", about = "Print the checked-out branch")]
    CurrentBranch,
    #[command(name = "log", about = "Show the first-parent history of HEAD")]
    Log {
        #[arg(long, help = "One line per commit")]
        oneline: bool,
    },
    #[command(name = "merge", about = "Merge a branch into the current branch")]
    Merge {
        #[arg(index = 1)]
        branch: String,
    },
    #[command(name = "status", about = "Show the staged files")]
    Status,
    #[command(
        name = "cat-file",
        about = "Print the content of an object",
        long_about = "This command prints the content of an object in the repository. \
        It requires the id of the object to be specified."
    )]
    CatFile {
        #[arg(index = 1, help = "The object id to print")]
        oid: String,
    },
    #[command(
        name = "hash-object",
        about = "Hash a file and optionally write it to the object database"
    )]
    HashObject {
        #[arg(short, long, required = false, help = "Write the object to the object database")]
        write: bool,
        #[arg(index = 1)]
        file: PathBuf,
    },
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let pwd = std::env::current_dir().context("Failed to read the current directory")?;
    let config = Config::from_env();

    let output = match cli.command {
        Commands::Init { path } => {
            let path = path.map(|path| pwd.join(path)).unwrap_or_else(|| pwd.clone());
            std::fs::create_dir_all(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;

            Repository::open(&path, config)?.init()?.to_string()
        }
        Commands::Add { paths } => {
            let paths = paths.iter().map(|path| pwd.join(path)).collect::<Vec<_>>();
            Repository::open(&pwd, config)?.add(&paths)?.to_string()
        }
        Commands::Commit { message } => Repository::open(&pwd, config)?.commit(&message)?.to_string(),
        Commands::Branch { name: Some(name) } => {
            Repository::open(&pwd, config)?.create_branch(&name)?.to_string()
        }
        Commands::Branch { name: None } => {
            Repository::open(&pwd, config)?.branch_listing()?.to_string()
        }
        Commands::Switch { target } => {
            Repository::open(&pwd, config)?.switch_branch(&target)?.to_string()
        }
        Commands::CurrentBranch => Repository::open(&pwd, config)?.current_branch()?,
        Commands::Log { oneline } => {
            let format = if oneline { LogFormat::Oneline } else { LogFormat::Medium };
            let separator = if oneline { "\n" } else { "\n\n" };

            Repository::open(&pwd, config)?
                .log()?
                .iter()
                .map(|(oid, commit)| display_commit(oid, commit, format))
                .collect::<Vec<_>>()
                .join(separator)
        }
        Commands::Merge { branch } => {
            let result = Repository::open(&pwd, config)?.merge(&branch)?;
            println!("{}", result);

            if let MergeResult::Conflicts(_) = result {
                return Ok(ExitCode::FAILURE);
            }
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Status => Repository::open(&pwd, config)?.status()?.to_string(),
        Commands::CatFile { oid } => {
            let payload = Repository::open(&pwd, config)?.cat_file(&oid)?;
            std::io::stdout()
                .write_all(&payload)
                .context("Failed to write object")?;
            return Ok(ExitCode::SUCCESS);
        }
        Commands::HashObject { write, file } => Repository::open(&pwd, config)?
            .hash_object(&pwd.join(&file), write)?
            .to_string(),
    };

    if !output.is_empty() {
        println!("{}", output);
    }

    Ok(ExitCode::SUCCESS)
}
