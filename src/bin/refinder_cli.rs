use refinder::export;
use refinder::ncbi;
use refinder::search::{self, SearchParams, SearchProgress};
use refinder::target;
use serde::Serialize;
use std::env;

fn usage() {
    eprintln!(
        "Usage:\n  \
  refinder_cli --version\n  \
  refinder_cli search --pattern IUPAC (--fasta FILE | --sequence SEQ)\n               \
  [--tis N] [--threshold PCT] [--csv OUT.csv] [--json]\n  \
  refinder_cli promoter GENE_ID SPECIES [--upstream N] [--downstream N]\n\n  \
  'promoter' prints a FASTA-like record that can be fed back into\n  \
  'search' (its TIS equals the upstream margin)."
    );
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    if args.len() <= 1 {
        usage();
        return Err("Missing command".to_string());
    }
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("refinder {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    match args[1].as_str() {
        "search" => run_search(&args[2..]),
        "promoter" => run_promoter(&args[2..]),
        command => {
            usage();
            Err(format!("Unknown command '{command}'"))
        }
    }
}

fn flag_value(args: &[String], i: &mut usize, flag: &str) -> Result<String, String> {
    let value = args
        .get(*i + 1)
        .ok_or_else(|| format!("Missing value for {flag}"))?
        .clone();
    *i += 2;
    Ok(value)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Could not serialize JSON output: {e}"))?;
    println!("{text}");
    Ok(())
}

fn report_progress(progress: SearchProgress) {
    match progress {
        SearchProgress::PatternCompiled { variants } => {
            eprintln!("Generate variants -> Done ({variants} variants)")
        }
        SearchProgress::TargetScanned { target, candidates } => {
            eprintln!("Scan {target} -> Done ({candidates} candidates)")
        }
        SearchProgress::TargetResolved { target, occurrences } => {
            eprintln!("Resolve {target} -> Done ({occurrences} occurrences)")
        }
        SearchProgress::TargetRanked { target, rows } => {
            eprintln!("Rank {target} -> Done ({rows} rows)")
        }
    }
}

fn run_search(args: &[String]) -> Result<(), String> {
    let mut params = SearchParams::new("");
    let mut fasta: Option<String> = None;
    let mut sequence: Option<String> = None;
    let mut csv_out: Option<String> = None;
    let mut json = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--pattern" => params.pattern = flag_value(args, &mut i, "--pattern")?,
            "--fasta" => fasta = Some(flag_value(args, &mut i, "--fasta")?),
            "--sequence" => sequence = Some(flag_value(args, &mut i, "--sequence")?),
            "--tis" => {
                let value = flag_value(args, &mut i, "--tis")?;
                params.tis_offset = value
                    .parse()
                    .map_err(|_| format!("Invalid TIS offset '{value}'"))?;
            }
            "--threshold" => {
                let value = flag_value(args, &mut i, "--threshold")?;
                params.threshold = value
                    .parse()
                    .map_err(|_| format!("Invalid threshold '{value}'"))?;
            }
            "--csv" => csv_out = Some(flag_value(args, &mut i, "--csv")?),
            "--json" => {
                json = true;
                i += 1;
            }
            other => {
                usage();
                return Err(format!("Unknown argument '{other}'"));
            }
        }
    }

    if params.pattern.is_empty() {
        usage();
        return Err("search needs --pattern".to_string());
    }
    let records = match (fasta, sequence) {
        (Some(filename), None) => {
            target::parse_fasta_file(&filename).map_err(|e| e.to_string())?
        }
        (None, Some(text)) => target::parse_block(&text),
        _ => {
            usage();
            return Err("search needs exactly one of --fasta or --sequence".to_string());
        }
    };

    let mut on_progress = report_progress;
    let table = search::search_records(&params, &records, &mut on_progress)
        .map_err(|e| e.to_string())?;

    if json {
        print_json(&table)?;
    } else {
        print!("{table}");
    }
    if let Some(filename) = csv_out {
        export::write_csv_file(&table, &filename).map_err(|e| e.to_string())?;
        eprintln!("Wrote result table to '{filename}'");
    }
    Ok(())
}

fn run_promoter(args: &[String]) -> Result<(), String> {
    if args.len() < 2 {
        usage();
        return Err("promoter requires: GENE_ID SPECIES".to_string());
    }
    let gene_id = &args[0];
    let species = &args[1];
    let mut upstream = ncbi::DEFAULT_UPSTREAM;
    let mut downstream = ncbi::DEFAULT_DOWNSTREAM;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--upstream" => {
                let value = flag_value(args, &mut i, "--upstream")?;
                upstream = value
                    .parse()
                    .map_err(|_| format!("Invalid upstream margin '{value}'"))?;
            }
            "--downstream" => {
                let value = flag_value(args, &mut i, "--downstream")?;
                downstream = value
                    .parse()
                    .map_err(|_| format!("Invalid downstream margin '{value}'"))?;
            }
            other => {
                usage();
                return Err(format!("Unknown argument '{other}'"));
            }
        }
    }

    let promoter = ncbi::fetch_promoter(gene_id, species, upstream, downstream)
        .map_err(|e| format!("Could not retrieve promoter for gene {gene_id}: {e}"))?;
    println!(
        ">{} | {} | TIS: {}",
        promoter.gene_name, promoter.accession, promoter.tis_offset
    );
    println!("{}", promoter.sequence);
    Ok(())
}
