//! posixmq CLI - Command-line helpers for POSIX message queues

mod interrupt;
mod logging;

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tabled::{Table, Tabled};
use tracing::{info, warn};

use posixmq_core::application::{group_by_hash, listen_until, CompileCommand, UnlinkGuard};
use posixmq_core::application::DEFAULT_SENTINEL;
use posixmq_core::domain::queue::{DEFAULT_MAX_MESSAGE_SIZE, DEFAULT_MAX_QUEUE_DEPTH};
use posixmq_core::domain::{Message, OpenOptions, QueueAttributes, QueueName};
use posixmq_core::port::{MessageQueue, QueueNamespace};
use posixmq_infra_system::PosixNamespace;

#[derive(Parser)]
#[command(name = "posixmq")]
#[command(about = "POSIX message queue helpers", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one message to an existing queue
    Send {
        /// Queue name (e.g., /jobs)
        queue: String,

        /// Message text
        message: String,

        /// Priority (higher = dequeued first)
        priority: u32,

        /// Fail instead of blocking when the queue is full
        #[arg(long)]
        nonblock: bool,
    },

    /// Receive messages, blocking until one is available
    Receive {
        /// Queue name
        queue: String,

        /// Number of messages to receive
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,

        /// Fail instead of blocking when the queue is empty
        #[arg(long)]
        nonblock: bool,
    },

    /// Create a queue (opens it if it already exists)
    Create {
        /// Queue name
        queue: String,

        #[command(flatten)]
        capacity: CapacityArgs,

        /// Fail if the queue already exists
        #[arg(long)]
        exclusive: bool,

        /// Permission bits, octal
        #[arg(long, default_value = "644", value_parser = parse_permissions)]
        mode: u32,
    },

    /// Remove a queue name
    Unlink {
        /// Queue name
        queue: String,
    },

    /// Show queue attributes
    Info {
        /// Queue name
        queue: String,
    },

    /// Create a queue, collect messages until the sentinel, then unlink it
    Listen {
        /// Queue name
        queue: String,

        #[command(flatten)]
        capacity: CapacityArgs,

        /// Payload that ends the session
        #[arg(long, default_value = DEFAULT_SENTINEL)]
        sentinel: String,

        /// Decode trace records and write them as compile_commands.json
        #[arg(long)]
        compile_commands: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct CapacityArgs {
    /// Maximum message size in bytes
    #[arg(long, env = "POSIXMQ_MAX_MESSAGE_SIZE", default_value_t = DEFAULT_MAX_MESSAGE_SIZE)]
    max_message_size: usize,

    /// Maximum number of queued messages
    #[arg(long, env = "POSIXMQ_MAX_MESSAGES", default_value_t = DEFAULT_MAX_QUEUE_DEPTH)]
    max_messages: usize,
}

impl CapacityArgs {
    fn attributes(&self) -> QueueAttributes {
        QueueAttributes::new(self.max_message_size, self.max_messages)
    }
}

#[derive(Tabled)]
struct QueueInfo {
    name: String,
    max_message_size: usize,
    max_messages: usize,
    pending: usize,
}

fn parse_permissions(s: &str) -> std::result::Result<u32, String> {
    u32::from_str_radix(s, 8).map_err(|e| format!("invalid octal mode '{}': {}", s, e))
}

fn print_message(msg: &Message) {
    println!("{}\t{}", msg.priority, msg.to_string_lossy());
}

fn write_compile_commands(path: &Path, messages: &[Message]) -> Result<usize> {
    let records: Vec<String> = messages
        .iter()
        .map(|m| m.to_string_lossy().into_owned())
        .collect();
    let commands: Vec<CompileCommand> = group_by_hash(records.iter().map(String::as_str))
        .into_values()
        .flatten()
        .collect();

    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &commands)
        .context("Failed to write compile commands")?;

    Ok(commands.len())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging()?;

    let ns = PosixNamespace::new();

    match cli.command {
        Commands::Send {
            queue,
            message,
            priority,
            nonblock,
        } => {
            let name = QueueName::new(queue);
            let mq = ns
                .open_with(&name, OpenOptions::new().nonblocking(nonblock))
                .with_context(|| format!("Opening queue {} failed", name))?;

            mq.send(message.as_bytes(), priority)
                .context("Message send failed")?;
            mq.close().context("Closing queue failed")?;

            info!(queue = %name, priority, "Message sent");
        }

        Commands::Receive {
            queue,
            count,
            nonblock,
        } => {
            let name = QueueName::new(queue);
            let mq = ns
                .open_with(&name, OpenOptions::new().nonblocking(nonblock))
                .with_context(|| format!("Opening queue {} failed", name))?;

            for _ in 0..count {
                let msg = mq.recv().context("Message receive failed")?;
                print_message(&msg);
            }
            mq.close().context("Closing queue failed")?;
        }

        Commands::Create {
            queue,
            capacity,
            exclusive,
            mode,
        } => {
            let name = QueueName::new(queue);
            let mut options = OpenOptions::new().permissions(mode);
            if exclusive {
                options = options.exclusive();
            }

            let mq = ns
                .create_with(&name, capacity.attributes(), options)
                .with_context(|| format!("Creating queue {} failed", name))?;
            let attrs = mq.attributes();
            mq.close().context("Closing queue failed")?;

            println!(
                "{}",
                format!(
                    "✓ Queue {} ready ({} bytes x {} messages)",
                    name, attrs.max_message_size, attrs.max_queue_depth
                )
                .green()
                .bold()
            );
        }

        Commands::Unlink { queue } => {
            let name = QueueName::new(queue);
            ns.unlink(&name)
                .with_context(|| format!("Unlinking queue {} failed", name))?;

            println!("{}", format!("✓ Queue {} unlinked", name).green().bold());
        }

        Commands::Info { queue } => {
            let name = QueueName::new(queue);
            let mq = ns
                .open_with(&name, OpenOptions::new().nonblocking(true))
                .with_context(|| format!("Opening queue {} failed", name))?;

            let attrs = mq.attributes();
            let row = QueueInfo {
                name: name.to_string(),
                max_message_size: attrs.max_message_size,
                max_messages: attrs.max_queue_depth,
                pending: mq.pending().context("Reading queue attributes failed")?,
            };
            mq.close().context("Closing queue failed")?;

            println!("{}", Table::new(vec![row]));
        }

        Commands::Listen {
            queue,
            capacity,
            sentinel,
            compile_commands,
        } => {
            let name = QueueName::new(queue);
            interrupt::install()?;

            let messages = match listen_session(&ns, &name, capacity.attributes(), &sentinel) {
                Ok(messages) => messages,
                Err(e) if interrupt::interrupted() => {
                    warn!(queue = %name, error = %e, "Listen interrupted, queue unlinked");
                    std::process::exit(130);
                }
                Err(e) => return Err(e),
            };

            match compile_commands {
                Some(path) => {
                    let written = write_compile_commands(&path, &messages)?;
                    println!(
                        "{}",
                        format!("✓ Logged {} commands to {}", written, path.display())
                            .green()
                            .bold()
                    );
                }
                None => messages.iter().for_each(print_message),
            }
        }
    }

    Ok(())
}

/// Create `name`, collect messages up to the sentinel, then unlink it
///
/// The name is unlinked on every return path, including a receive cut short
/// by SIGINT/SIGTERM once `interrupt::install` has run.
fn listen_session(
    ns: &PosixNamespace,
    name: &QueueName,
    attributes: QueueAttributes,
    sentinel: &str,
) -> Result<Vec<Message>> {
    let mq = ns
        .create(name, attributes)
        .with_context(|| format!("Creating queue {} failed", name))?;
    let guard = UnlinkGuard::new(ns, name.clone());

    info!(queue = %name, sentinel = %sentinel, "Listening");
    let messages = listen_until(&mq, sentinel.as_bytes()).context("Listening failed")?;

    mq.close().context("Closing queue failed")?;
    guard
        .unlink()
        .with_context(|| format!("Unlinking queue {} failed", name))?;
    Ok(messages)
}
