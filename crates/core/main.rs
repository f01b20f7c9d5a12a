#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::perf,
    clippy::style,
    clippy::missing_safety_doc,
    clippy::missing_const_for_fn
)]
#![allow(clippy::as_conversions, clippy::mod_module_files)]

use std::{path::PathBuf, process, time::Duration};

mod app;
mod commands;
mod file;
mod interact;

use commands::Commands;

use bookseek::Config;

use clap::{Args, Parser};
use log::trace;

fn main() {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        process::exit(2);
    }
}

fn try_main() -> eyre::Result<()> {
    let Cli {
        command,
        global_opts:
            GlobalOpts {
                file,
                interact,
                verbosity,
                quiet,
                timeout,
                google_books_url,
                openbd_url,
            },
    } = Cli::parse();

    setup_errlog(verbosity as usize, quiet)?;

    // `quiet` and `interact` cannot be set at the same time
    let interact = interact && !quiet;

    if interact {
        trace!("Interact mode enabled");
    }

    let config = Config {
        google_books_url,
        openbd_url,
        timeout: Duration::from_secs(timeout),
    };

    let message = if command.uses_shelf() {
        let mut file = file::open_or_create_shelf_file(file)?;
        let mut shelf = file.read_shelf()?;

        let command_res = command.execute(&mut shelf, &config, interact);

        if shelf.dirty() {
            trace!("Updating the shelf file..");
            file.write_shelf(&shelf)?;
            trace!("Done!");
        }

        command_res?
    } else {
        command.execute(&mut bookseek::shelf::Shelf::new(), &config, interact)?
    };

    if !quiet {
        println!("{message}");
    }
    Ok(())
}

fn setup_errlog(verbosity: usize, quiet: bool) -> eyre::Result<()> {
    // if quiet then ignore verbosity but still show errors
    let verbosity = if quiet { 0 } else { verbosity + 1 };

    stderrlog::new().verbosity(verbosity).init()?;
    Ok(())
}

#[derive(Parser)]
#[clap(name = "bookseek")]
#[clap(about = "Look up books by ISBN and keep track of a lending shelf in the terminal")]
#[clap(version, author)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    #[clap(flatten)]
    global_opts: GlobalOpts,
}

#[derive(Debug, Args)]
struct GlobalOpts {
    /// The name of the shelf file
    #[clap(short, long, parse(from_os_str), global = true)]
    file: Option<PathBuf>,

    /// Enables interactive mode, which allows entering book information by hand when it cannot be
    /// found.
    #[clap(short, long, global = true)]
    interact: bool,

    /// How chatty the program is when performing commands
    ///
    /// The number of times this flag is used will increase how chatty
    /// the program is.
    #[clap(short, long, parse(from_occurrences), global = true)]
    verbosity: u8,

    /// Prevents the program from writing to stdout, errors will still be printed to stderr.
    #[clap(short, long, global = true)]
    quiet: bool,

    /// Seconds to wait for each request to a book information service
    #[clap(long, global = true, default_value_t = bookseek::DEFAULT_TIMEOUT.as_secs())]
    timeout: u64,

    /// Endpoint of the Google Books volumes API
    #[clap(long, global = true, default_value = bookseek::source::GOOGLE_BOOKS_URL)]
    google_books_url: String,

    /// Endpoint of the OpenBD API
    #[clap(long, global = true, default_value = bookseek::source::OPENBD_URL)]
    openbd_url: String,
}
