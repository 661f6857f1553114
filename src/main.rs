use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use wit::areas::repository::Repository;

#[derive(Parser)]
#[command(
    name = "wit",
    version = "0.1.0",
    about = "A simple content tracker",
    long_about = "This is a simple implementation of a content-addressable \
    version-control store, written in Rust. It is not meant to be a full \
    replacement for git, but rather a learning project to understand how \
    such a store works under the hood.",
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
    #[command(
        name = "cat-file",
        about = "Print the content of an object",
        long_about = "This command prints the content of an object in the repository. \
        It accepts a full object id or an unambiguous prefix."
    )]
    CatFile {
        #[arg(short = 'p', long, help = "The object id (or prefix) to print")]
        sha: String,
    },
    #[command(
        name = "hash-object",
        about = "Hash a file and optionally write it to the object database",
        long_about = "This command hashes a file as a blob and can write it to the object database."
    )]
    HashObject {
        #[arg(short, long, required = false, help = "Write the object to the object database")]
        write: bool,
        #[arg(index = 1)]
        file: PathBuf,
    },
    #[command(
        name = "tag",
        about = "Create a tag",
        long_about = "This command creates a lightweight tag ref, or an annotated tag object with -a."
    )]
    Tag {
        #[arg(index = 1, help = "The tag name")]
        name: String,
        #[arg(index = 2, help = "The object the tag points to (defaults to HEAD)")]
        object: Option<String>,
        #[arg(short, long, required = false, help = "Create an annotated tag object")]
        annotate: bool,
        #[arg(short, long, help = "The tag message (annotated tags only)")]
        message: Option<String>,
    },
    #[command(
        name = "show-ref",
        about = "List references",
        long_about = "This command lists the refs in the repository together with the ids they resolve to."
    )]
    ShowRef,
}

fn open_enclosing_repository() -> Result<Repository> {
    let pwd = std::env::current_dir()?;
    Repository::discover(&pwd, true, Box::new(std::io::stdout()))?
        .ok_or_else(|| anyhow::anyhow!("no repository found at {}", pwd.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Init { path } => {
            let path = match path {
                Some(path) => path.clone(),
                None => std::env::current_dir()?,
            };

            Repository::init(&path, Box::new(std::io::stdout()))?
        }
        Commands::CatFile { sha } => {
            let repository = open_enclosing_repository()?;

            repository.cat_file(sha)?
        }
        Commands::HashObject { write, file } => {
            let repository = open_enclosing_repository()?;

            repository.hash_object(file, *write)?
        }
        Commands::Tag {
            name,
            object,
            annotate,
            message,
        } => {
            let repository = open_enclosing_repository()?;

            repository.tag(name, object.as_deref(), *annotate, message.as_deref())?
        }
        Commands::ShowRef => {
            let repository = open_enclosing_repository()?;

            repository.show_ref()?
        }
    }

    Ok(())
}
