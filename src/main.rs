use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use log::{debug, error, info, warn};

use olaoutput::{Config, DmxClient, Message, Notice, OlaClient, OlaOutput, load_config};

#[derive(Parser)]
#[command(name = "olaoutput")]
#[command(about = "Send DMX channel values to the OLA daemon.\n\nReads one message per line on stdin (list, int, float, channel, universe, blackout, connect, state) and prints notices as JSON lines on stdout.", long_about = None)]
struct Cli {
    /// Path to configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Universe to send to, overrides the config file
    #[arg(short, long)]
    universe: Option<u32>,

    /// More logging on stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn level(&self, configured: log::LevelFilter) -> log::LevelFilter {
        let requested = match self.verbose {
            0 => log::LevelFilter::Off,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        configured.max(requested)
    }
}

fn write_notice(out: &mut impl Write, notice: &Notice) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *out, notice)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

fn flush_notices(notices: &Receiver<Notice>, out: &mut impl Write) -> anyhow::Result<()> {
    for notice in notices.try_iter() {
        write_notice(out, &notice)?;
    }
    Ok(())
}

/// Run one line of input and print whatever it produced. Lines that do not
/// parse, blank ones included, come back as error notices.
fn handle_line<C: DmxClient>(
    output: &mut OlaOutput<C>,
    line: &str,
    notices: &Receiver<Notice>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match line.parse::<Message>() {
        Ok(message) => output.handle(message),
        Err(e) => {
            warn!("{}", e);
            write_notice(
                out,
                &Notice::Error {
                    message: e.to_string(),
                },
            )?;
        }
    }
    flush_notices(notices, out)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    if let Some(universe) = cli.universe {
        config.output.universe = universe;
    }

    let mut clog = colog::default_builder();
    clog.filter(None, cli.level(config.log.level_filter()?));
    clog.init();
    debug!("Loaded config: {:?}", config);

    let (shutdown_tx, shutdown_rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.send(());
    })
    .context("Failed to install Ctrl-C handler")?;

    // stdin blocks, so it gets its own thread; the channel closes at EOF.
    let (line_tx, line_rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if line_tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to read stdin: {:?}", e);
                    break;
                }
            }
        }
    });

    let client = OlaClient::new(&config.ola)?;
    info!(
        "Sending universe {} to olad at {}",
        config.output.universe,
        client.base_url()
    );

    let (notice_tx, notice_rx) = mpsc::channel();
    let mut output = OlaOutput::from_config(client, &config.output, notice_tx);
    let mut stdout = io::stdout().lock();

    if config.output.connect_on_start {
        output.connect();
    }
    flush_notices(&notice_rx, &mut stdout)?;

    loop {
        if shutdown_rx.try_recv().is_ok() {
            info!("Shutdown signal received, exiting...");
            break;
        }

        match line_rx.recv_timeout(Duration::from_millis(10)) {
            Ok(line) => handle_line(&mut output, &line, &notice_rx, &mut stdout)?,
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                debug!("stdin closed, exiting");
                break;
            }
        }
    }

    Ok(())
}
