use anyhow::Result;
use clap::{Parser, Subcommand};
use event_bus::{SourceIngestionEvent, TypeIndexEvent};
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use type_index::{IngestionWorker, MetadataSource, RegistryFileSource, SourceCatalog};

use crate::cli::{ListArgs, PathArgs, PropertiesArgs};
use crate::commands::{exists, item, list, properties};
use crate::host::TypeHost;

const LOAD_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug)]
enum ShellCommand {
    /// List the namespaces and types below a path
    Ls(ListArgs),
    /// Change the current namespace
    Cd {
        #[arg(default_value = "")]
        path: String,
    },
    /// Print the current namespace
    Pwd,
    /// Describe the namespace or type at a path
    Item(PathArgs),
    /// Show the formatted members of a type
    Props(PropertiesArgs),
    /// Check whether a path names a namespace or a type
    Exists(PathArgs),
    /// Make a registry file available; it is ingested in the background
    Load { path: PathBuf },
    /// List the ingested sources
    Sources,
    /// Leave the shell
    #[command(alias = "quit")]
    Exit,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ShellFlow {
    Continue,
    Exit,
}

/// Interactive session state: the current namespace and output mode.
pub struct Shell {
    host: TypeHost,
    location: String,
    json: bool,
}

impl Shell {
    pub fn new(host: TypeHost, json: bool) -> Self {
        Self {
            host,
            location: String::new(),
            json,
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn prompt(&self) -> String {
        let separator = self.host.engine.path_resolver().separator();
        format!("{separator}{}> ", self.location())
    }

    /// Joins `target` onto the current namespace.
    ///
    /// A leading separator or `/` makes the target absolute and `..` steps up one level.
    fn resolve(&self, target: &str) -> String {
        let engine = &self.host.engine;
        let separator = engine.path_resolver().separator();

        if target.is_empty() {
            return self.location.clone();
        }
        if target == ".." {
            return engine.parent_path(&self.location);
        }
        if let Some(absolute) = target
            .strip_prefix(separator)
            .or_else(|| target.strip_prefix('/'))
        {
            return absolute.to_string();
        }
        if self.location.is_empty() {
            target.to_string()
        } else {
            format!("{}{separator}{target}", self.location)
        }
    }

    pub async fn execute(&mut self, line: &str, out: &mut dyn Write) -> Result<ShellFlow> {
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            return Ok(ShellFlow::Continue);
        }

        let command = match ShellLine::try_parse_from(words) {
            Ok(parsed) => parsed.command,
            Err(e) => {
                write!(out, "{}", e.render())?;
                return Ok(ShellFlow::Continue);
            }
        };

        let engine = &self.host.engine;
        match command {
            ShellCommand::Ls(mut args) => {
                args.path = self.resolve(&args.path);
                list::run(engine, &args, self.json, out)?;
            }
            ShellCommand::Cd { path } => {
                let target = if path.is_empty() {
                    String::new()
                } else {
                    self.resolve(&path)
                };
                if !engine.is_container(&target) {
                    anyhow::bail!("Not a namespace: {}", path);
                }
                self.location = engine.path_resolver().to_host(
                    &engine.path_resolver().canonicalize(&target),
                );
            }
            ShellCommand::Pwd => {
                writeln!(out, "{}", self.location)?;
            }
            ShellCommand::Item(mut args) => {
                args.path = self.resolve(&args.path);
                item::run(engine, &args, self.json, out)?;
            }
            ShellCommand::Props(mut args) => {
                args.path = self.resolve(&args.path);
                properties::run(engine, &args, self.json, out)?;
            }
            ShellCommand::Exists(mut args) => {
                args.path = self.resolve(&args.path);
                exists::run(engine, &args, self.json, out)?;
            }
            ShellCommand::Load { path } => {
                self.load(path, out).await?;
            }
            ShellCommand::Sources => {
                let ingested = self
                    .host
                    .index
                    .with_view(|view| view.ingested_sources().to_vec());
                for source_id in ingested {
                    writeln!(out, "{source_id}")?;
                }
            }
            ShellCommand::Exit => return Ok(ShellFlow::Exit),
        }
        Ok(ShellFlow::Continue)
    }

    /// Publishes a registry to the catalog and waits for the worker's verdict on it.
    async fn load(&self, path: PathBuf, out: &mut dyn Write) -> Result<()> {
        let source = RegistryFileSource::from_path(path);
        let source_id = source.id().clone();
        if self.host.index.is_ingested(&source_id) {
            writeln!(out, "{source_id} is already loaded")?;
            return Ok(());
        }

        let mut events = self.host.event_bus.subscribe();
        self.host.catalog.publish(Arc::new(source));

        match tokio::time::timeout(
            LOAD_TIMEOUT,
            wait_for_outcome(&mut events, source_id.as_str()),
        )
        .await
        {
            Ok(Some(SourceIngestionEvent::Completed(done))) => writeln!(
                out,
                "Loaded {}: {} types in {} namespaces",
                done.source_id, done.type_count, done.namespace_count
            )?,
            Ok(Some(SourceIngestionEvent::Failed(failed))) => writeln!(
                out,
                "Failed to load {}: {}",
                failed.source_id, failed.error
            )?,
            Ok(Some(_)) | Ok(None) => writeln!(out, "Loading {source_id} was interrupted")?,
            Err(_) => writeln!(out, "{source_id} is still loading in the background")?,
        }
        Ok(())
    }
}

async fn wait_for_outcome(
    events: &mut broadcast::Receiver<TypeIndexEvent>,
    source_id: &str,
) -> Option<SourceIngestionEvent> {
    loop {
        match events.recv().await {
            Ok(event) if event.source_id() == source_id => {
                let TypeIndexEvent::SourceIngestion(event) = event;
                match event {
                    SourceIngestionEvent::Started(_) => continue,
                    outcome => return Some(outcome),
                }
            }
            Ok(_) => continue,
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                debug!("Shell missed {} ingestion events", missed);
            }
            Err(broadcast::error::RecvError::Closed) => return None,
        }
    }
}

pub async fn run(host: TypeHost, json: bool, cancellation_token: CancellationToken) -> Result<()> {
    let catalog: Arc<dyn SourceCatalog> = host.catalog.clone();
    let worker = IngestionWorker::spawn(
        Arc::clone(&host.index),
        catalog,
        cancellation_token.clone(),
    );

    let mut shell = Shell::new(host, json);
    let interactive = std::io::stdin().is_terminal();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        if interactive {
            let mut stdout = std::io::stdout();
            write!(stdout, "{}", shell.prompt())?;
            stdout.flush()?;
        }

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = cancellation_token.cancelled() => break,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, leaving shell");
                break;
            }
        };
        let Some(line) = line else {
            break;
        };

        let mut stdout = std::io::stdout();
        match shell.execute(&line, &mut stdout).await {
            Ok(ShellFlow::Exit) => break,
            Ok(ShellFlow::Continue) => {}
            Err(e) => eprintln!("Error: {e:#}"),
        }
        stdout.flush()?;
    }

    let report = worker.shutdown().await;
    debug!(
        "Shell ingestion worker stopped: {} ingested, {} skipped, {} failed",
        report.ingested.len(),
        report.skipped.len(),
        report.failed.len()
    );
    Ok(())
}
