// src/bin/occ.rs

//! Driver program _occ_ drives the [_occlib_].
//!
//! Processes user-passed command-line arguments. Then queries the Outlook
//! SQLite index for event rows whose start falls within the requested day
//! window. For each row, the referenced binary event file is read and
//! decoded by an [`EventReader`] on a bounded worker pool; results are
//! re-ordered by index-row order before printing. Decoded records are
//! written as one CSV row each.
//!
//! If passed CLI option `--sync-cache`, the export is diffed against the
//! persisted synchronization cache and a create/update/skip/delete plan
//! is printed, then the cache is rewritten.
//!
//! If passed CLI option `--summary`, a summary of carving outcomes is
//! printed.
//!
//! A malformed event file never aborts the batch; per-file problems are
//! logged to stderr and processing continues.
//!
//! [_occlib_]: occlib
//! [`EventReader`]: occlib::readers::eventreader::EventReader

#![allow(non_camel_case_types)]

use std::collections::BTreeMap;
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;

use ::clap::Parser;
use ::chrono::FixedOffset;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};
use ::termcolor::ColorChoice;

use ::occlib::common::FPath;
use ::occlib::data::datetime::{
    parse_tz_offset_label,
    ScanRange,
    Year,
    SCAN_YEAR_FIRST_DEFAULT,
    SCAN_YEAR_LAST_DEFAULT,
};
use ::occlib::data::event::{DbEvent, DecodeConfig, EventRecord};
use ::occlib::printer::printers::{print_summary, CsvPrinter};
use ::occlib::readers::eventreader::EventReader;
use ::occlib::readers::helpers::{path_to_fpath, resolve_data_file};
use ::occlib::readers::indexreader::{IndexReader, QueryWindow};
use ::occlib::readers::summary::RunSummary;
use ::occlib::readers::synccache::{plan_sync, SyncCache, SyncPlan};
use ::occlib::{e_err, e_wrn};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// command-line parsing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Default Outlook profile data directory on Mac OS.
const OUTLOOK_DATA_DIR_DEFAULT: &str =
    "~/Library/Group Containers/UBF8T346G9.Office/Outlook/Outlook 15 Profiles/Main Profile/Data";
/// The SQLite index file under the profile data directory.
const INDEX_FILE_NAME: &str = "Outlook.sqlite";
/// Default output CSV path.
const OUTPUT_DEFAULT: &str = "dump_outlook_calendar.csv";
/// Default user timezone for the `Starts`/`Ends` columns.
const TIMEZONE_DEFAULT: &str = "UTC+8";

/// `--timezone` value parser; wraps the canonical label parser.
fn cli_process_tz_offset(tzs: &str) -> std::result::Result<FixedOffset, String> {
    match parse_tz_offset_label(tzs) {
        Some(tz) => Ok(tz),
        None => Err(format!(
            "unable to parse timezone offset {:?}; expected a form like \"UTC+8\" or \"UTC-5:30\"",
            tzs
        )),
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "occ",
    version,
    about = "Carve Mac Outlook calendar events to CSV",
    verbatim_doc_comment,
)]
struct CLI_Args {
    /// Outlook profile data directory holding the SQLite index and the
    /// binary event data files. A leading "~/" expands to $HOME.
    #[clap(
        long = "data-dir",
        verbatim_doc_comment,
        default_value_t = String::from(OUTLOOK_DATA_DIR_DEFAULT),
    )]
    data_dir: String,

    /// Path of the SQLite index. Defaults to "Outlook.sqlite" under
    /// DATA_DIR.
    #[clap(long = "db", verbatim_doc_comment)]
    db_path: Option<String>,

    /// Export events starting within this many days from today.
    #[clap(short = 'd', long, default_value_t = 14)]
    days: u32,

    /// User timezone for the "Starts"/"Ends" columns,
    /// e.g. "UTC+8", "UTC-5:30", "UTC".
    #[clap(
        short = 't',
        long = "timezone",
        verbatim_doc_comment,
        value_parser = cli_process_tz_offset,
        default_value = TIMEZONE_DEFAULT,
    )]
    timezone: FixedOffset,

    /// Output CSV path.
    #[clap(
        short = 'o',
        long,
        default_value_t = String::from(OUTPUT_DEFAULT),
    )]
    output: String,

    /// First plausible year for timestamps carved out of event files.
    /// The binary format supports the full 1601-epoch range; this bound
    /// only filters noise.
    #[clap(
        long = "year-first",
        verbatim_doc_comment,
        default_value_t = SCAN_YEAR_FIRST_DEFAULT,
    )]
    year_first: Year,

    /// Last plausible year for timestamps carved out of event files.
    #[clap(
        long = "year-last",
        verbatim_doc_comment,
        default_value_t = SCAN_YEAR_LAST_DEFAULT,
    )]
    year_last: Year,

    /// Synchronization-cache JSON path. When passed, the export is
    /// diffed against the cache, a create/update/skip/delete plan is
    /// printed, and the cache is rewritten.
    #[clap(long = "sync-cache", verbatim_doc_comment)]
    sync_cache: Option<String>,

    /// With --sync-cache, classify unchanged records as updates anyway.
    #[clap(long = "force-update", requires = "sync_cache")]
    force_update: bool,

    /// Print a summary of carving outcomes.
    #[clap(short = 's', long)]
    summary: bool,
}

/// Expand a leading `~/` against `$HOME`.
fn expand_tilde(path: &str) -> String {
    match path.strip_prefix("~/") {
        Some(rest) => match std::env::var("HOME") {
            Ok(home) => format!("{}/{}", home, rest),
            Err(_) => path.to_string(),
        },
        None => path.to_string(),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// processing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One unit of work for a decode worker: index-row ordinal, the
/// authoritative row, and the resolved data-file path.
type DecodeJob = (usize, DbEvent, PathBuf);
/// A worker's answer: the ordinal plus either the decoded record or the
/// path and error of an unreadable file.
type DecodeAnswer = (usize, std::result::Result<EventRecord, (FPath, String)>);

/// Decode all resolved event files on a bounded worker pool, returning
/// records in index-row order.
fn decode_batch(
    jobs: Vec<DecodeJob>,
    config: &DecodeConfig,
    summary: &mut RunSummary,
) -> Vec<EventRecord> {
    defn!("({} jobs)", jobs.len());
    let njobs: usize = jobs.len();
    if njobs == 0 {
        defx!("return; no jobs");
        return Vec::new();
    }
    let nworkers: usize = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(njobs);
    defo!("{} workers for {} jobs", nworkers, njobs);

    let (job_send, job_recv) = ::crossbeam_channel::bounded::<DecodeJob>(njobs);
    let (answer_send, answer_recv) = ::crossbeam_channel::unbounded::<DecodeAnswer>();
    let mut handles: Vec<thread::JoinHandle<()>> = Vec::with_capacity(nworkers);
    for _ in 0..nworkers {
        let job_recv = job_recv.clone();
        let answer_send = answer_send.clone();
        let config = config.clone();
        handles.push(thread::spawn(move || {
            for (ordinal, db_event, path) in job_recv.iter() {
                let fpath: FPath = path_to_fpath(&path);
                let answer: DecodeAnswer = match EventReader::new(fpath.clone(), config.clone()) {
                    Ok(reader) => (ordinal, Ok(reader.decode(Some(&db_event)))),
                    Err(err) => (ordinal, Err((fpath, err.to_string()))),
                };
                if answer_send.send(answer).is_err() {
                    break;
                }
            }
        }));
    }
    drop(job_recv);
    drop(answer_send);
    for job in jobs.into_iter() {
        // bounded at njobs; cannot block
        if job_send.send(job).is_err() {
            break;
        }
    }
    drop(job_send);

    let mut ordered: BTreeMap<usize, EventRecord> = BTreeMap::new();
    for (ordinal, result) in answer_recv.iter() {
        match result {
            Ok(record) => {
                summary.update(&record);
                ordered.insert(ordinal, record);
            }
            Err((fpath, err)) => {
                e_wrn!("cannot read event file {:?}: {}", fpath, err);
                summary.files_unreadable += 1;
            }
        }
    }
    for handle in handles.into_iter() {
        // worker loops have ended; join cannot block long
        let _ = handle.join();
    }
    defx!("return {} records", ordered.len());

    ordered.into_values().collect()
}

/// Print the synchronization plan and rewrite the cache file.
fn run_sync_plan(
    records: &[EventRecord],
    cache_path: &str,
    force_update: bool,
) -> std::io::Result<()> {
    let cache_path = std::path::Path::new(cache_path);
    let cache: SyncCache = SyncCache::load(cache_path)?;
    let plan: SyncPlan = plan_sync(records, &cache, force_update);
    let (create, update, skip) = plan.counts();
    println!(
        "Sync plan: {} create, {} update, {} skip, {} deleted",
        create,
        update,
        skip,
        plan.deleted.len()
    );
    for record_id in plan.deleted.iter() {
        println!("  deleted {}", record_id);
    }
    plan.next_cache().save(cache_path)?;

    Ok(())
}

fn main() -> ExitCode {
    let args = CLI_Args::parse();

    let scan_range: ScanRange = match ScanRange::from_years(args.year_first, args.year_last) {
        Some(range) => range,
        None => {
            e_err!(
                "bad year bounds {}..{}; year-first must not exceed year-last",
                args.year_first,
                args.year_last
            );
            return ExitCode::FAILURE;
        }
    };
    let config = DecodeConfig {
        scan_range,
        ..DecodeConfig::default()
    };

    let data_dir: PathBuf = PathBuf::from(expand_tilde(&args.data_dir));
    let db_path: FPath = match args.db_path.as_deref() {
        Some(path) => expand_tilde(path),
        None => path_to_fpath(&data_dir.join(INDEX_FILE_NAME)),
    };

    let index: IndexReader = match IndexReader::open(&db_path) {
        Ok(index) => index,
        Err(err) => {
            e_err!("cannot open index {:?}: {}", db_path, err);
            return ExitCode::FAILURE;
        }
    };
    let window: QueryWindow = QueryWindow::from_today(args.days);
    let db_events: Vec<DbEvent> = match index.query_window(&window) {
        Ok(db_events) => db_events,
        Err(err) => {
            e_err!("query of index {:?} failed: {}", db_path, err);
            return ExitCode::FAILURE;
        }
    };
    if db_events.is_empty() {
        e_err!("no events within {} days in index {:?}", args.days, db_path);
        return ExitCode::FAILURE;
    }

    let mut summary = RunSummary::default();
    let mut jobs: Vec<DecodeJob> = Vec::with_capacity(db_events.len());
    for (ordinal, db_event) in db_events.into_iter().enumerate() {
        match resolve_data_file(&data_dir, &db_event.data_path) {
            Some(path) => jobs.push((ordinal, db_event, path)),
            None => {
                e_wrn!("no data file {:?} under {:?}", db_event.data_path, data_dir);
                summary.files_missing += 1;
            }
        }
    }
    let records: Vec<EventRecord> = decode_batch(jobs, &config, &mut summary);

    let output_file: File = match File::create(&args.output) {
        Ok(file) => file,
        Err(err) => {
            e_err!("cannot create output {:?}: {}", args.output, err);
            return ExitCode::FAILURE;
        }
    };
    let result = CsvPrinter::new(output_file, args.timezone).and_then(|mut printer| {
        for record in records.iter() {
            printer.write_event(record)?;
        }
        printer.flush()?;

        Ok(())
    });
    if let Err(err) = result {
        e_err!("writing CSV {:?} failed: {}", args.output, err);
        return ExitCode::FAILURE;
    }
    println!("Exported {} events to {}", records.len(), args.output);

    if let Some(cache_path) = args.sync_cache.as_deref() {
        if let Err(err) = run_sync_plan(&records, cache_path, args.force_update) {
            e_err!("sync cache {:?} failed: {}", cache_path, err);
            return ExitCode::FAILURE;
        }
    }

    if args.summary {
        if let Err(err) = print_summary(&summary, &args.timezone, ColorChoice::Auto) {
            e_err!("printing summary failed: {}", err);
        }
    }

    ExitCode::SUCCESS
}
