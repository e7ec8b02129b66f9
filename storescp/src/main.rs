use std::{
    net::{Ipv4Addr, SocketAddrV4, TcpListener},
    path::PathBuf,
    time::Duration,
};

use clap::Parser;
use dcm_ul::{ServerAssociationOptions, ServiceProvider};
use snafu::{Report, ResultExt, Whatever};
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

mod store;
mod transfer;

use store::DirectoryStore;

/// DICOM C-STORE SCP
#[derive(Debug, Parser)]
#[command(version)]
struct App {
    /// Verbose mode
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
    /// Application Entity title of this node
    #[arg(long = "calling-ae-title", default_value = "STORE-SCP")]
    calling_ae_title: String,
    /// Enforce max pdu length
    #[arg(short = 's', long = "strict")]
    strict: bool,
    /// Only accept native/uncompressed transfer syntaxes
    #[arg(long)]
    uncompressed_only: bool,
    /// Accept unknown SOP classes
    #[arg(long)]
    promiscuous: bool,
    /// Maximum PDU length
    #[arg(
        short = 'm',
        long = "max-pdu-length",
        default_value = "16384",
        value_parser(clap::value_parser!(u32).range(4096..=131_072))
    )]
    max_pdu_length: u32,
    /// Seconds to wait for the peer before aborting an association
    #[arg(short = 't', long = "timeout", default_value = "60")]
    timeout: u64,
    /// Output directory for incoming objects
    #[arg(short = 'o', default_value = ".")]
    out_dir: PathBuf,
    /// Which port to listen on
    #[arg(short, default_value = "11111")]
    port: u16,
}

fn main() {
    let app = App::parse();
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(if app.verbose {
                    Level::DEBUG.into()
                } else {
                    Level::INFO.into()
                }),
            )
            .finish(),
    )
    .whatever_context("Could not set up global logging subscriber")
    .unwrap_or_else(|e: Whatever| {
        eprintln!("[ERROR] {}", Report::from_error(e));
    });

    run(app).unwrap_or_else(|e| {
        error!("{}", Report::from_error(e));
        std::process::exit(-2);
    });
}

fn run(args: App) -> Result<(), Whatever> {
    let App {
        verbose: _,
        calling_ae_title,
        strict,
        uncompressed_only,
        promiscuous,
        max_pdu_length,
        timeout,
        out_dir,
        port,
    } = args;

    std::fs::create_dir_all(&out_dir).whatever_context("Could not create output directory")?;

    let timeout = Duration::from_secs(timeout);
    let mut options = ServerAssociationOptions::new()
        .accept_any()
        .ae_title(calling_ae_title.clone())
        .strict(strict)
        .promiscuous(promiscuous)
        .max_pdu_length(max_pdu_length)
        .read_timeout(timeout)
        .write_timeout(timeout);
    for ts in transfer::transfer_syntaxes(uncompressed_only) {
        options = options.with_transfer_syntax(ts);
    }
    for uid in transfer::abstract_syntaxes() {
        options = options.with_abstract_syntax(uid);
    }

    let provider = ServiceProvider::new(options).with_store_handler(DirectoryStore::new(out_dir));

    let listen_addr = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port);
    let listener = TcpListener::bind(listen_addr)
        .with_whatever_context(|_| format!("Could not listen on {}", listen_addr))?;
    info!("{} listening on: tcp://{}", calling_ae_title, listen_addr);

    provider
        .run(listener)
        .whatever_context("Could not accept connections")
}
