use agendabot::{
    AgendaPublisher,
    cli::{Args, load_dotenv},
    forge::github::Github,
    repo::GitCloner,
};
use chrono::Local;
use clap::Parser;
use color_eyre::eyre::Result;
use log::*;

fn initialize_logger(debug: bool) -> Result<()> {
    let filter = if debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("agendabot")
        .build();

    simplelog::TermLogger::init(
        filter,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let dotenv = std::env::current_dir()
        .ok()
        .and_then(|dir| load_dotenv(&dir));

    let args = Args::parse();

    initialize_logger(args.debug)?;

    if let Some(path) = dotenv {
        debug!("loaded environment from {}", path.display());
    }

    let config = args.into_run_config(Local::now().date_naive())?;

    info!(
        "preparing agenda {} for {}/{} against {}",
        config.branch_name(),
        config.organization,
        config.repo,
        config.pr_base
    );
    debug!("run config: {:#?}", config);

    let forge = Github::new(
        &config.api_base_url,
        config.pr_username.clone(),
        config.credentials.token.clone(),
    )?;
    let cloner = GitCloner;

    let publisher = AgendaPublisher::new(&config, &cloner, &forge);

    if let Err(err) = publisher.run().await {
        error!("{} step failed: {err}", err.step());
        return Err(err.into());
    }

    Ok(())
}
