#![warn(clippy::unwrap_used)]

use std::io;

use clap::Parser;
use compspec::{
    cmd,
    config::Config,
    interface::{CompspecCommand, CompspecParser, LogFormat},
    registry::Registry,
};
use eyre::{Result, WrapErr};
use microxdg::XdgApp;
use tracing::{Instrument, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let args = <CompspecParser as Parser>::parse();

    color_eyre::install().wrap_err("installing 'color-eyre'")?;
    init_tracing(&args);

    if let CompspecCommand::Completions(_) = args.command {
        return cmd::complete::run(args).await;
    }

    let xdg_app = XdgApp::new("compspec").wrap_err("resolving XDG directories")?;
    let conf: Config = Config::figment(&xdg_app)?
        .extract()
        .wrap_err("reading configuration")?;

    tracing::debug!(?conf, "loaded configuration");

    let (registry, failures) = Registry::load(conf.sources(), conf.pins.clone())
        .instrument(tracing::debug_span!("loading registry"))
        .await;

    match &args.command {
        CompspecCommand::Check => cmd::check::run(&registry, &failures),
        CompspecCommand::List => cmd::list::run(&registry),
        CompspecCommand::Options(options) => {
            cmd::query::options(&registry, options, conf.visibility())
        }
        CompspecCommand::Subcommand(subcommand) => cmd::query::subcommand(&registry, subcommand),
        CompspecCommand::Show(show) => cmd::show::run(&registry, show),
        CompspecCommand::Completions(_) => cmd::complete::run(args.clone()).await,
    }
}

fn init_tracing(args: &CompspecParser) {
    let level = match (args.quiet, args.verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::INFO,
        (false, 2) => Level::DEBUG,
        (false, _) => Level::TRACE,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr);

    match args.format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}
