use std::{
    io::{IsTerminal, Write},
    process::ExitCode,
    time::Duration,
};

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

use crate::{
    cli::Cli,
    cover::CoverFetcher,
    fetch::HttpFetcher,
    search::Search,
    tellico::TellicoDocument,
};

mod cli;
mod cover;
mod fetch;
mod item;
mod links;
mod rules;
mod search;
mod tellico;

fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Cli::parse();
    let Some(title) = args.title.as_deref() else {
        println!("{}", cli::usage());
        return Ok(ExitCode::FAILURE);
    };

    let fetcher = HttpFetcher::new(Duration::from_secs(args.timeout));
    let covers = match &args.tmp_dir {
        Some(dir) => CoverFetcher::new(dir, args.keep_covers),
        None => CoverFetcher::new(std::env::temp_dir(), args.keep_covers),
    };

    let spinner = if std::io::stderr().is_terminal() {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    } else {
        ProgressBar::hidden()
    };

    let search = Search::new(&fetcher, args.base_url.clone(), covers)
        .max_pages(args.max_pages)
        .progress(spinner.clone());

    let mut doc = TellicoDocument::new();
    let found = search.run(title, &mut doc);
    spinner.finish_and_clear();
    let found = found?;
    if doc.is_empty() {
        log::info!("no results for {title:?}");
    }

    let xml = doc.to_xml()?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(xml.as_bytes())?;
    stdout.flush()?;

    summary(found, &doc);
    Ok(ExitCode::SUCCESS)
}

fn summary(found: usize, doc: &TellicoDocument) {
    debug_assert_eq!(found, doc.len());
    let covers = doc.entries().iter().filter(|e| e.record.cover.is_some()).count();
    let colour = std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none();
    let tick = if colour {
        "✓".green().to_string()
    } else {
        "✓".to_string()
    };
    eprintln!("{tick} {found} entries, {covers} covers");
}
