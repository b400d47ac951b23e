use anyhow::{Context, bail};
use md2docx::generator::pandoc::{PandocDocxGenerator, pandoc_available};
use md2docx::parser::LineParser;
use md2docx::parser::pandoc::PandocDocxReader;
use md2docx::server::{AppState, StoreTarget};
use md2docx::settings::{Settings, StorageSettings};
use md2docx::storage::{ObjectStore, Store};
use std::io;
use std::path::{Path, PathBuf};
use structopt::StructOpt;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, StructOpt)]
#[structopt(name = "md2docx", about = "Converts Markdown to DOCX and keeps the results in object storage")]
struct Opt {
    /// Settings file; `MD2DOCX_*` environment variables override it
    #[structopt(long = "config", parse(from_os_str), default_value = "md2docx.toml")]
    config: PathBuf,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Run the HTTP server
    Serve {
        #[structopt(long = "bind")]
        bind: Option<String>,
    },
    /// Convert a Markdown file (`-` for stdin) to DOCX
    Convert {
        #[structopt(parse(from_os_str))]
        input: PathBuf,
        #[structopt(parse(from_os_str))]
        output: PathBuf,
    },
    /// Print the text of a DOCX file as Markdown
    Extract {
        #[structopt(parse(from_os_str))]
        input: PathBuf,
    },
    /// Upload a local file to the configured bucket
    Upload {
        key: String,
        #[structopt(parse(from_os_str))]
        file: PathBuf,
    },
    /// Download an object from the configured bucket
    Download {
        key: String,
        #[structopt(parse(from_os_str))]
        file: PathBuf,
    },
    /// List object keys in the configured bucket
    List {
        #[structopt(long = "prefix", default_value = "")]
        prefix: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Default to INFO if RUST_LOG is not set
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    let opt = Opt::from_args();
    let settings = Settings::load(&opt.config)
        .with_context(|| format!("Failed to load settings from {}", opt.config.display()))?;

    match opt.command {
        Command::Serve { bind } => serve(settings, bind).await,
        Command::Convert { input, output } => {
            let markdown_text = read_markdown_input(&input, tokio::io::stdin()).await?;

            let conversion = settings.conversion.clone();
            let docx = tokio::task::spawn_blocking(move || {
                md2docx::convert(&markdown_text, &conversion)
            })
            .await??;

            tokio::fs::write(&output, &docx).await?;
            log::info!("Wrote {} ({} bytes)", output.display(), docx.len());
            Ok(())
        }
        Command::Extract { input } => {
            let docx = tokio::fs::read(&input)
                .await
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let markdown = tokio::task::spawn_blocking(move || {
                PandocDocxReader.read_markdown(&docx)
            })
            .await??;
            print!("{}", markdown);
            Ok(())
        }
        Command::Upload { key, file } => {
            let storage = storage_settings(&settings)?;
            Store::from_settings(storage)
                .upload_file(&storage.bucket, &key, &file)
                .await?;
            Ok(())
        }
        Command::Download { key, file } => {
            let storage = storage_settings(&settings)?;
            Store::from_settings(storage)
                .download_file(&storage.bucket, &key, &file)
                .await?;
            Ok(())
        }
        Command::List { prefix } => {
            let storage = storage_settings(&settings)?;
            let keys = Store::from_settings(storage)
                .list(&storage.bucket, &prefix)
                .await?;
            for key in keys {
                println!("{}", key);
            }
            Ok(())
        }
    }
}

async fn serve(settings: Settings, bind: Option<String>) -> anyhow::Result<()> {
    if !pandoc_available() {
        log::warn!("pandoc was not found on PATH, conversions will fail");
    }

    let store = settings.storage.as_ref().map(|storage| StoreTarget {
        store: Store::from_settings(storage),
        bucket: storage.bucket.clone(),
        key_prefix: storage.key_prefix.clone(),
    });
    if store.is_none() {
        log::info!("No storage configured, converted documents will not be kept");
    }

    let state = AppState {
        parser: LineParser::new(&settings.conversion),
        generator: PandocDocxGenerator,
        store,
        attachment_name: settings.server.attachment_name.clone(),
    };

    let addr = bind.unwrap_or(settings.server.bind);
    md2docx::server::run(&addr, state).await
}

fn storage_settings(settings: &Settings) -> anyhow::Result<&StorageSettings> {
    match settings.storage.as_ref() {
        Some(storage) => Ok(storage),
        None => bail!("No [storage] section configured"),
    }
}

/// Reads `input`, or all of `stdin` when `input` is `-`
async fn read_markdown_input(
    input: &Path,
    mut stdin: impl AsyncRead + Unpin,
) -> anyhow::Result<String> {
    if input.as_os_str() == "-" {
        let mut content = String::new();
        stdin.read_to_string(&mut content).await?;
        Ok(content)
    } else {
        tokio::fs::read_to_string(input)
            .await
            .with_context(|| format!("Failed to read {}", input.display()))
    }
}
