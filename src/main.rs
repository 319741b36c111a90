//! Zentinel WS-Management SOAP tool.
//!
//! Run with: `zentinel-wsman-soap inspect request.xml`
//! or: `zentinel-wsman-soap build --to http://host:5985/wsman --action <uri>`

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;
use zentinel_wsman_soap::parser::{parse_document_with, ParseOptions};
use zentinel_wsman_soap::writer::WriteOptions;
use zentinel_wsman_soap::{Fault, HeaderBuilder, HeaderOption, Message, NodeId, SoapConfig};

/// Validate SOAP 1.2 envelopes and build WS-Management requests.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML)
    #[arg(short, long, default_value = "config.yaml", global = true)]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a message and print its headers and body
    Inspect {
        /// Input XML file ("-" for stdin)
        file: PathBuf,
    },

    /// Assemble a WS-Management request and print it
    Build {
        /// Endpoint address (wsa:To)
        #[arg(long)]
        to: String,

        /// Action URI (wsa:Action)
        #[arg(long)]
        action: String,

        /// Resource URI (wsman:ResourceURI)
        #[arg(long)]
        resource_uri: Option<String>,

        /// Reply address (wsa:ReplyTo)
        #[arg(long)]
        reply_to: Option<String>,

        /// Message ID; a random uuid is used when omitted
        #[arg(long)]
        message_id: Option<String>,

        /// Shell selector
        #[arg(long)]
        shell_id: Option<String>,

        /// Request option (KEY=VALUE), may be repeated
        #[arg(long = "option", value_parser = parse_option)]
        options: Vec<HeaderOption>,

        /// XML fragment to place in the Body
        #[arg(long)]
        body: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = args.log_level.parse().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    debug!("Config file: {}", args.config.display());
    let config = load_config(&args.config)?;
    let parse_options = ParseOptions::from(&config.parsing);
    let options = WriteOptions::from(&config.serialization);

    match args.command {
        Command::Inspect { file } => inspect(&file, &parse_options),
        Command::Build {
            to,
            action,
            resource_uri,
            reply_to,
            message_id,
            shell_id,
            options: request_options,
            body,
        } => {
            let mut builder = HeaderBuilder::new(Message::new())
                .with_defaults(&config.headers)
                .to(to)
                .action(action)
                .options(request_options);
            builder = match message_id {
                Some(id) => builder.id(id),
                None => builder.random_message_id(),
            };
            if let Some(uri) = resource_uri {
                builder = builder.resource_uri(uri);
            }
            if let Some(uri) = reply_to {
                builder = builder.reply_to(uri);
            }
            if let Some(shell_id) = shell_id {
                builder = builder.shell_id(shell_id);
            }

            let mut msg = builder.build();
            if let Some(path) = body {
                let data = std::fs::read(&path)
                    .with_context(|| format!("Failed to read body file {}", path.display()))?;
                let doc = parse_document_with(&data, &parse_options).context("Failed to parse body file")?;
                let Some(root) = doc.root() else {
                    bail!("Body file {} has no root element", path.display());
                };
                msg.set_body([doc.to_element(root)]);
            }

            println!("{}", msg.to_xml_with(&options)?);
            Ok(())
        }
    }
}

fn load_config(path: &Path) -> Result<SoapConfig> {
    if path.exists() {
        let content = std::fs::read_to_string(path).context("Failed to read config file")?;
        serde_yaml::from_str(&content).context("Failed to parse config file")
    } else {
        debug!("Config file not found, using defaults");
        Ok(SoapConfig::default())
    }
}

fn inspect(path: &Path, options: &ParseOptions) -> Result<()> {
    let data = if path == Path::new("-") {
        let mut data = Vec::new();
        std::io::stdin()
            .read_to_end(&mut data)
            .context("Failed to read stdin")?;
        data
    } else {
        std::fs::read(path).with_context(|| format!("Failed to open {}", path.display()))?
    };
    let msg = Message::parse_with(&data, options)
        .with_context(|| format!("{} is not a valid SOAP message", path.display()))?;

    info!(
        headers = msg.headers().len(),
        body = msg.body().len(),
        "Message is valid SOAP"
    );

    println!("Header:");
    for &id in msg.headers() {
        print_entry(&msg, id);
    }
    println!("Body:");
    for &id in msg.body() {
        print_entry(&msg, id);
    }

    if let Some(fault) = Fault::from_message(&msg) {
        let subcodes: Vec<String> = fault.subcodes.iter().map(ToString::to_string).collect();
        println!("Fault: {} ({})", fault.code, subcodes.join(", "));
        println!("Reason: {}", fault.reason);
    }
    Ok(())
}

fn print_entry(msg: &Message, id: NodeId) {
    let node = msg.node(id);
    let marker = if node.must_understand() { " [mustUnderstand]" } else { "" };
    match node.text() {
        Some(text) => println!("  {}{} = {}", node.name(), marker, text),
        None => println!("  {}{}", node.name(), marker),
    }
}

fn parse_option(s: &str) -> Result<HeaderOption, String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok(HeaderOption::new(key, value)),
        _ => Err(format!("expected KEY=VALUE, got `{s}`")),
    }
}
