mod cli;
mod executor;

use std::{process, thread};

use clap::Parser;
use env_logger::Builder;
use log::{error, trace, warn};

use r53utils::{
    cancel::CancelToken,
    provider::{Route53Provider, Route53ProviderConfig},
};

use cli::Cli;
use executor::{exit_code, Executor};

fn main() {
    let cli = Cli::parse();

    Builder::new().filter_level(cli.loglevel.into()).init();

    let provider = match Route53Provider::from_config(&Route53ProviderConfig {
        profile: cli.profile.as_deref(),
        region: cli.region.as_deref(),
    }) {
        Ok(p) => p,
        Err(e) => {
            error!("Unable to create provider: {}", e);
            process::exit(11);
        }
    };

    let cancel = CancelToken::new();
    cancel_on_ctrl_c(cancel.clone());

    let executor = Executor::new(&provider, cli.page_size, cli.wait_options(), cancel);
    if let Err(e) = executor.run(cli.command) {
        error!("{}", e);
        process::exit(exit_code(&e));
    }
}

// The first Ctrl-C interrupts running waits, a second one exits immediately
fn cancel_on_ctrl_c(token: CancelToken) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                warn!("Unable to install Ctrl-C handler: {}", e);
                return;
            }
        };
        if runtime.block_on(tokio::signal::ctrl_c()).is_err() {
            return;
        }
        trace!("Received Ctrl-C, cancelling");
        token.cancel();
        if runtime.block_on(tokio::signal::ctrl_c()).is_ok() {
            process::exit(130);
        }
    });
}
