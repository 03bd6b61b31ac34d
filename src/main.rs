use anyhow::{bail, Context};
use clap::Parser;
use sms_dispatch::utils::{logger, validation::Validate};
use sms_dispatch::{
    Account, BatchSource, CliConfig, DispatchConfig, Dispatcher, HttpGateway, MemoryLedger,
    MemoryStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting sms-dispatch CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = DispatchConfig::from_file(&cli.config)
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;
    config.validate().context("configuration is invalid")?;

    let account = Account {
        id: "cli".to_string(),
        credits: cli.credits,
        is_blocked: false,
        is_verified: true,
    };

    let gateway = HttpGateway::new(&config.gateway)?;
    let store = MemoryStore::default();
    let ledger = MemoryLedger::with_balance(&account.id, cli.credits);
    let dispatcher = Dispatcher::new(gateway, store, ledger, &config);

    if let Some(recipient) = &cli.to {
        let report = dispatcher
            .send_single(&account, recipient, &cli.message)
            .await?;
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if let Some(numbers) = &cli.numbers {
        let report = dispatcher
            .send_batch(&account, BatchSource::Manual(numbers.clone()), &cli.message)
            .await?;
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if let Some(file) = &cli.file {
        let report = dispatcher
            .send_batch(&account, BatchSource::Upload(file.clone()), &cli.message)
            .await?;
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        bail!("provide a recipient via --to, --numbers, or --file");
    }

    Ok(())
}
