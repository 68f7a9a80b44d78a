// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use clap::Parser;

use ero_recon::cli::{Cli, Command};
use ero_recon::config::OutputMode;
use ero_recon::error::CoreError;
use ero_recon::{logging, modes};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {e}", console::style("error:").red().bold());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CoreError> {
    let (args, mode) = match cli.command {
        Command::Image(a) => (a, OutputMode::Image),
        Command::Expos(a) => (a, OutputMode::Exposure),
        Command::Event(a) => (a, OutputMode::Event),
    };

    let args = args.merge_args_file().map_err(CoreError::Config)?;
    let config = args.into_config(mode).map_err(CoreError::Config)?;

    let data = modes::load(&config)?;

    match mode {
        OutputMode::Image => modes::image::run(&config, data),
        OutputMode::Exposure => modes::exposure::run(&config, data),
        OutputMode::Event => modes::event::run(&config, data),
    }
}
