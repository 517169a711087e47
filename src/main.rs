//! caption-curator command line
//!
//! Thin caller over the annotation core: one-shot subcommands for scripted
//! use plus an interactive loop for working through a folder by hand. All
//! state lives in the library's `AnnotationSession`; this file only parses
//! arguments and prints results.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use caption_curator::config::AppConfig;
use caption_curator::ollama::OllamaClient;
use caption_curator::state::corpus::Direction;
use caption_curator::state::session::{AnnotationSession, CaptionOutcome};
use caption_curator::{Error, Result};

#[derive(Parser)]
#[command(
    name = "caption-curator",
    version,
    about = "Curate an image-captioning dataset: sidecar captions, a reusable tag library, hidden images, and local-model captioning"
)]
struct Cli {
    /// Corpus folder (defaults to the last opened folder)
    #[arg(short, long)]
    folder: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show captioning progress for the corpus
    Status,
    /// List active images and their captions
    List,
    /// Print one image's caption
    Show { image: String },
    /// Append tags to one image's caption
    Tag { image: String, tags: Vec<String> },
    /// Remove a tag from one image's caption
    Untag { image: String, tag: String },
    /// Hide an image from the active corpus (files stay on disk)
    Hide { image: String },
    /// Append a tag to every active image that lacks it
    TagAll { tag: String },
    /// Manage the reusable tag library
    Library {
        #[command(subcommand)]
        action: LibraryAction,
    },
    /// Caption one image with the local model
    Auto { image: Option<String> },
    /// Work through the corpus interactively
    Annotate,
}

#[derive(Subcommand)]
enum LibraryAction {
    /// Print the library tags
    List,
    /// Add a tag to the library
    Add { tag: String },
    /// Remove a tag from the library
    Remove { tag: String },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("⚠️  {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;

    let folder = cli
        .folder
        .or_else(|| config.last_folder.clone())
        .ok_or_else(|| {
            Error::Config("no folder given and none remembered (pass --folder)".to_string())
        })?;

    let mut session = AnnotationSession::open(&folder)?;
    if let Err(e) = config.remember_folder(&folder) {
        eprintln!("⚠️  could not remember the folder: {e}");
    }

    match cli.command {
        Command::Status => print_status(&session)?,
        Command::List => {
            for image in session.images() {
                let tags = session.load_caption(image)?;
                if tags.is_empty() {
                    println!("{image}: (uncaptioned)");
                } else {
                    println!("{image}: {}", tags.join(", "));
                }
            }
        }
        Command::Show { image } => {
            select_or_exit(&mut session, &image);
            println!("{}", session.load_current_caption()?.join(", "));
        }
        Command::Tag { image, tags } => {
            select_or_exit(&mut session, &image);
            let mut caption = Vec::new();
            for tag in &tags {
                caption = session.apply_tag_to_current(tag)?;
            }
            println!("✅ {image}: {}", caption.join(", "));
        }
        Command::Untag { image, tag } => {
            select_or_exit(&mut session, &image);
            let caption = session.remove_tag_from_current(&tag)?;
            println!("✅ {image}: {}", caption.join(", "));
        }
        Command::Hide { image } => {
            select_or_exit(&mut session, &image);
            match session.hide(&image) {
                Ok(()) => println!("✅ {image} hidden"),
                Err(Error::EmptyCorpus(_)) => {
                    println!("✅ {image} hidden; no active images remain")
                }
                Err(e) => return Err(e),
            }
            print_status(&session)?;
        }
        Command::TagAll { tag } => {
            let report = session.add_tag_to_all(&tag);
            println!(
                "✅ tagged {} image(s), {} skipped on error",
                report.modified, report.failed
            );
        }
        Command::Library { action } => match action {
            LibraryAction::List => {
                for tag in session.tag_library().iter() {
                    println!("{tag}");
                }
            }
            LibraryAction::Add { tag } => {
                if session.add_library_tag(&tag)? {
                    println!("✅ \"{}\" added to the library", tag.trim());
                }
            }
            LibraryAction::Remove { tag } => {
                if session.remove_library_tag(&tag)? {
                    println!("✅ \"{}\" removed from the library", tag.trim());
                }
            }
        },
        Command::Auto { image } => {
            if let Some(image) = image {
                select_or_exit(&mut session, &image);
            }
            generate_for_current(&mut session, &config, &OllamaClient::new()).await?;
        }
        Command::Annotate => annotate_loop(&mut session, &config).await?,
    }

    Ok(())
}

fn select_or_exit(session: &mut AnnotationSession, image: &str) {
    if !session.select_image(image) {
        eprintln!("⚠️  no active image named {image}");
        std::process::exit(1);
    }
}

fn print_status(session: &AnnotationSession) -> Result<()> {
    let progress = session.progress()?;
    println!(
        "📁 {}: {} active, {} hidden",
        session.directory().display(),
        session.images().len(),
        session.hidden_count()
    );
    println!(
        "Progress: {} / {} images captioned ({:.0}%)",
        progress.captioned,
        progress.total,
        progress.ratio * 100.0
    );
    Ok(())
}

/// Ask the local model to caption the current image and merge the result.
async fn generate_for_current(
    session: &mut AnnotationSession,
    config: &AppConfig,
    client: &OllamaClient,
) -> Result<()> {
    let Some(request) = session.begin_caption_request() else {
        return Ok(());
    };
    println!("⏳ captioning {} with {}...", request.image(), config.model);
    let caption = client
        .generate(request.image_path(), &config.model, &config.prompt)
        .await?;
    match session.apply_generated_caption(request, &caption)? {
        CaptionOutcome::Applied(tags) => println!("✅ {}", tags.join(", ")),
        CaptionOutcome::Discarded => println!("result discarded (image no longer current)"),
    }
    Ok(())
}

const LOOP_HELP: &str = "\
commands:
  n / p / r        next, previous, random image
  t <tag>          add a tag to this image's caption
  x <tag>          remove a tag from this image's caption
  a <tag>          add a tag to the library
  d <tag>          remove a tag from the library
  lib              print the library
  g                caption this image with the local model
  h                hide this image
  st               show progress
  ? / q            help / quit";

/// Interactive annotation loop over stdin.
async fn annotate_loop(session: &mut AnnotationSession, config: &AppConfig) -> Result<()> {
    let client = OllamaClient::new();
    let stdin = std::io::stdin();
    println!("{LOOP_HELP}");

    loop {
        let Some(name) = session.current_image() else {
            println!("no active images remain");
            break;
        };
        let caption = session.load_current_caption()?;
        println!(
            "\n[{}/{}] {}  |  {}",
            session.cursor() + 1,
            session.images().len(),
            name,
            if caption.is_empty() {
                "(uncaptioned)".to_string()
            } else {
                caption.join(", ")
            }
        );
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        let (command, rest) = match line.split_once(' ') {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "" => {}
            "n" => session.advance(Direction::Next),
            "p" => session.advance(Direction::Prev),
            "r" => session.jump_random(),
            "t" => {
                session.apply_tag_to_current(rest)?;
            }
            "x" => {
                session.remove_tag_from_current(rest)?;
            }
            "a" => {
                session.add_library_tag(rest)?;
            }
            "d" => {
                session.remove_library_tag(rest)?;
            }
            "lib" => {
                for tag in session.tag_library().iter() {
                    println!("{tag}");
                }
            }
            "g" => {
                let request = match session.begin_caption_request() {
                    Some(request) => request,
                    None => continue,
                };
                println!("⏳ captioning {} with {}...", request.image(), config.model);
                match client
                    .generate(request.image_path(), &config.model, &config.prompt)
                    .await
                {
                    Ok(text) => match session.apply_generated_caption(request, &text)? {
                        CaptionOutcome::Applied(tags) => println!("✅ {}", tags.join(", ")),
                        CaptionOutcome::Discarded => println!("result discarded"),
                    },
                    Err(e) => eprintln!("⚠️  {e}"),
                }
            }
            "h" => match session.hide_current() {
                Ok(()) => println!("✅ image hidden"),
                Err(Error::EmptyCorpus(_)) => {
                    println!("✅ image hidden; nothing left to annotate");
                    break;
                }
                Err(e) => return Err(e),
            },
            "st" => print_status(session)?,
            "?" => println!("{LOOP_HELP}"),
            "q" => break,
            other => println!("unknown command '{other}' (? for help)"),
        }
    }

    print_status(session)
}
