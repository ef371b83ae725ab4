use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::{fs, io};

use clap::{Parser, ValueEnum};
use fern::FormatCallback;
use file_rotate::compression::Compression;
use file_rotate::suffix::AppendCount;
use file_rotate::{ContentLimit, FileRotate};
use log::LevelFilter;
use time::format_description::well_known::Iso8601;
use tokio::net::TcpListener;
use tokio::signal::unix::{signal, SignalKind};

use crate::game::SharedMatch;
use crate::protocol::constants::{SERVER_IP, SERVER_PORT};

mod accept_tasks;
mod game;
mod protocol;
mod server;
mod session;

#[derive(Parser)]
#[command(about, long_about = None)]
struct Cli {
    /// Set the IP address to bind the listening socket on.
    #[arg(long, short, default_value_t = SERVER_IP)]
    address: IpAddr,

    /// Set the port number to bind the listening socket on.
    #[arg(long, short, default_value_t = SERVER_PORT)]
    port: u16,

    /// Set the folder path.
    ///
    /// The given path can be absolute or relative.
    /// The server will attempt to create all the folders nested in the path.
    #[arg(long, short, default_value = "./log/", value_name = "PATH")]
    log_folder: String,

    /// Set where the printed logging is outputted.
    #[arg(value_enum, long, short, default_value_t)]
    console_channel: ConsoleChannel,

    /// Set the most verbose level printed on the console. Log files always get everything.
    #[arg(long, default_value_t = LevelFilter::Info, value_name = "LEVEL")]
    log_level: LevelFilter,
}

#[derive(Copy, Clone, ValueEnum, Default)]
enum ConsoleChannel {
    /// Print to stdout
    #[default]
    Out,
    /// Print to stderr
    Err,
}

/// The tokio-ran main function runs a server hosting one pong match on the address given on the command line. All
/// errors are logged, the [`Result`] returned is only given for command-line environments.
#[tokio::main]
async fn main() -> Result<(), ()> {
    let cli = Cli::parse();
    setup_logger(cli.log_folder, cli.console_channel, cli.log_level)
        .map_err(|e| eprintln!("Error while configuring logging : {e}"))?;
    let listen_address = SocketAddr::new(cli.address, cli.port);
    log::info!("Server started. Listening on {listen_address}.");
    match server::bind_listener(listen_address) {
        Ok(tcp_listener) => run_until_signaled(tcp_listener).await,
        Err(e) => {
            log::error!("Failed to bind to address {listen_address} with error : {e}.");
            Err(())
        }
    }
}

#[derive(thiserror::Error, Debug)]
enum LoggerError {
    #[error("failed to create the log file : {0}")]
    LogFile(#[from] io::Error),

    #[error("a logger is already set : {0}")]
    AlreadySet(#[from] log::SetLoggerError),
}

/// Set up the global logger to log to stdout/stderr and to a file named as the current timestamp.
fn setup_logger(
    log_folder: String,
    console_channel: ConsoleChannel,
    console_level: LevelFilter,
) -> Result<(), LoggerError> {
    // Configure log output on the given console
    let console_config = fern::Dispatch::new()
        .level(console_level)
        .format(format_log);
    let console_config = match console_channel {
        ConsoleChannel::Out => console_config.chain(io::stdout()),
        ConsoleChannel::Err => console_config.chain(io::stderr()),
    };

    // Configure log output in rotating log files
    let rotator = make_rotator(log_folder)?;
    let file_config = fern::Dispatch::new()
        .level(LevelFilter::Trace)
        .format(format_log)
        .chain(rotator as Box<(dyn io::Write + Send)>);

    fern::Dispatch::new()
        .chain(console_config)
        .chain(file_config)
        .apply()?;
    Ok(())
}

/// Make the rotating file middleware to give to the logger.
fn make_rotator(log_folder: String) -> io::Result<Box<FileRotate<AppendCount>>> {
    fs::create_dir_all(&log_folder)?;
    let log_file_path = log_folder + "/" + &utc_now_wrapper() + ".log";
    let rotator = Box::new(FileRotate::new(
        log_file_path,
        AppendCount::new(10),
        ContentLimit::Lines(4000),
        Compression::None,
        #[cfg(unix)]
        None,
    ));
    Ok(rotator)
}

/// The function given to the logging crate [`fern`] to format messages.
fn format_log(out: FormatCallback, message: &std::fmt::Arguments, record: &log::Record) {
    out.finish(format_args!(
        "[{} {} {}] {}",
        utc_now_wrapper(),
        record.level(),
        record.target().rsplit("::").next().unwrap_or_default(),
        message
    ))
}

/// Create a [`String`] of the current time in the UTC timezone, with a default in case of error.
fn utc_now_wrapper() -> String {
    time::OffsetDateTime::now_utc()
        .format(&Iso8601::DATE_TIME)
        .unwrap_or(String::from("invalid date"))
}

/// Serve the match until an interrupt or terminate signal is received. Every connection and the simulation are then
/// dropped with the server.
async fn run_until_signaled(tcp_listener: TcpListener) -> Result<(), ()> {
    let (mut sigint_handler, mut sigterm_handler) = match signal(SignalKind::interrupt())
        .and_then(|si| signal(SignalKind::terminate()).map(|st| (si, st)))
    {
        Ok(s) => s,
        Err(e) => {
            log::error!("Failed to create the signal handlers with error : {e:?}.");
            return Err(());
        }
    };
    let serving = server::serve(tcp_listener, Arc::new(SharedMatch::new()));
    let res = tokio::select! {
        biased;
        signal = sigint_handler.recv() => match signal {
            Some(()) => {
                log::info!("Received an interrupt signal.");
                Ok(())
            }
            None => {
                log::error!("The interrupt signal handler stopped working, have to stop now.");
                Err(())
            }
        },
        signal = sigterm_handler.recv() => match signal {
            Some(()) => {
                log::info!("Received a terminate signal.");
                Ok(())
            }
            None => {
                log::error!("The terminate signal handler stopped working, have to stop now.");
                Err(())
            }
        },
        () = serving => Ok(()),
    };
    log::info!("Closing all connections and shutting down the match.");
    res
}
