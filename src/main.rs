mod cli;
mod lib;
mod load;

use chrono::Datelike;
use clap::{value_t, App, Arg, ArgMatches};
use std::path::PathBuf;
use std::sync::Once;

use cli::{
    charts::{Context, Registry},
    driver::Driver,
    table::{format_currency, Table},
};
use lib::summary;
use load::{
    config::Config,
    error::{Report, Result},
};

static TRACING_INIT: Once = Once::new();

fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("spendplot=info"));

        fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    });
}

struct Options {
    sheets: PathBuf,
    untracked: PathBuf,
    income: PathBuf,
    config: PathBuf,
    out: PathBuf,
    year: Option<i32>,
    quiet: bool,
}

fn matches<'a>() -> ArgMatches<'a> {
    let path = |name: &'static str, value: &'static str, help: &'static str| {
        Arg::with_name(name)
            .long(name)
            .value_name(value)
            .takes_value(true)
            .help(help)
    };
    App::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(path("sheets", "DIR", "Directory of monthly CSV sheets").default_value("spending"))
        .arg(path(
            "untracked",
            "FILE",
            "Ledger of spending outside the sheets [default: <DIR>/untracked.csv]",
        ))
        .arg(path("income", "FILE", "File starting with the yearly income").default_value("income.txt"))
        .arg(path("config", "FILE", "YAML configuration").default_value("config.yml"))
        .arg(path("out", "DIR", "Where to write the charts").default_value("plots"))
        .arg(path("year", "YEAR", "Year of the sheets [default: from the config, else this year]"))
        .arg(
            Arg::with_name("quiet")
                .long("quiet")
                .short("q")
                .help("Do not print the summary table"),
        )
        .get_matches()
}

impl Options {
    fn from_args() -> Self {
        let m = matches();
        let path = |name: &str| PathBuf::from(m.value_of(name).unwrap_or_default());
        let sheets = path("sheets");
        let untracked = m
            .value_of("untracked")
            .map(PathBuf::from)
            .unwrap_or_else(|| sheets.join("untracked.csv"));
        let year = if m.is_present("year") {
            Some(value_t!(m, "year", i32).unwrap_or_else(|e| e.exit()))
        } else {
            None
        };
        Self {
            untracked,
            income: path("income"),
            config: path("config"),
            out: path("out"),
            year,
            quiet: m.is_present("quiet"),
            sheets,
        }
    }
}

fn run(opts: &Options) -> Result<()> {
    // configuration errors surface before any data is read
    let config = Config::load(&opts.config)?;
    let registry = Registry::new(config.plots()?, config.globals.charts.as_deref())?;
    let year = opts
        .year
        .or(config.globals.year)
        .unwrap_or_else(|| chrono::Local::now().year());
    tracing::info!("summarizing {}", year);

    let income = load::read_income(&opts.income)?;
    let combined = load::combined(&opts.sheets, &opts.untracked, year)?;
    let untracked = load::read_data(&opts.untracked, year)?;
    tracing::info!(
        "spent {} in total, untracked included",
        format_currency(summary::total_spent(&combined, &untracked))
    );

    let ctx = Context {
        income,
        year,
        sankey_other_threshold: config.globals.sankey_other_threshold,
        large_transaction_threshold: config.globals.large_transaction_threshold,
        untracked,
    };
    let rows = Driver::new(registry, &ctx, &opts.out).run(&combined)?;
    if !opts.quiet {
        println!("{}", Table::from(&rows).with_title(format!("Spending in {}", year)));
    }
    Ok(())
}

fn main() {
    init_tracing();
    let opts = Options::from_args();
    if let Err(err) = run(&opts) {
        eprint!("{}", Report(&err));
        std::process::exit(1);
    }
}
