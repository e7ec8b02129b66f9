use std::time::Duration;

use clap::Parser;
use dcm_dictionary_std::uids;
use dcm_ul::{association, dimse, ClientAssociationOptions};
use snafu::prelude::*;
use tracing::{error, info, Level};

/// DICOM C-ECHO SCU
#[derive(Debug, Parser)]
#[command(version)]
struct App {
    /// socket address to SCP,
    /// optionally with AE title
    /// (example: "QUERY-SCP@127.0.0.1:1045")
    addr: String,
    /// verbose mode
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
    /// the calling AE title
    #[arg(long = "calling-ae-title", default_value = "ECHOSCU")]
    calling_ae_title: String,
    /// the called AE title,
    /// overrides the AE title in the address if present
    #[arg(long = "called-ae-title")]
    called_ae_title: Option<String>,
    /// the maximum PDU length
    #[arg(
        long = "max-pdu-length",
        default_value = "16384",
        value_parser(clap::value_parser!(u32).range(4096..=131_072))
    )]
    max_pdu_length: u32,
    /// seconds to wait for the peer before giving up
    #[arg(short = 't', long = "timeout", default_value = "30")]
    timeout: u64,
}

#[derive(Debug, Snafu)]
enum Error {
    /// Could not establish association
    Establish { source: association::Error },

    /// C-ECHO failed
    Echo { source: dimse::Error },

    /// Could not release association
    Release { source: association::Error },

    #[snafu(display("C-ECHO returned {}", message))]
    Unsuccessful { message: String },
}

fn main() {
    let app = App::parse();

    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(if app.verbose {
                Level::DEBUG
            } else {
                Level::INFO
            })
            .finish(),
    )
    .unwrap_or_else(|e| {
        eprintln!(
            "Could not set up global logging subscriber: {}",
            snafu::Report::from_error(e)
        );
    });

    run(app).unwrap_or_else(|err| {
        error!("{}", snafu::Report::from_error(err));
        std::process::exit(-2);
    });
}

fn run(app: App) -> Result<(), Error> {
    let App {
        addr,
        verbose,
        calling_ae_title,
        called_ae_title,
        max_pdu_length,
        timeout,
    } = app;

    let timeout = Duration::from_secs(timeout);
    let mut options = ClientAssociationOptions::new()
        .with_abstract_syntax(uids::VERIFICATION)
        .calling_ae_title(calling_ae_title)
        .max_pdu_length(max_pdu_length)
        .read_timeout(timeout)
        .write_timeout(timeout)
        .connection_timeout(timeout);
    if let Some(called_ae_title) = called_ae_title {
        options = options.called_ae_title(called_ae_title);
    }

    let mut association = options.establish_with(&addr).context(EstablishSnafu)?;
    if verbose {
        info!("Association with {} successful", addr);
    }

    let outcome = association.c_echo().context(EchoSnafu)?;
    association.release().context(ReleaseSnafu)?;

    ensure!(
        outcome.success,
        UnsuccessfulSnafu {
            message: outcome.message
        }
    );
    info!("C-ECHO successful: {}", outcome);
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::App;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        App::command().debug_assert();
    }
}
