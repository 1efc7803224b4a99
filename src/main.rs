use env_logger::Env;
use std::env;
use std::fs;
use std::path::Path;
use std::process;

use triads::{database, load_config, GeneratorConfig, TriadDatabase};

const USAGE: &str = "Usage: triads generate [policy.yaml] [output.json]
       triads identify <note> <note> <note>
       triads voicings <symbol> [max-fret]
       triads query <root> <quality>
       triads stats [dataset.json]";

fn usage() -> ! {
    eprintln!("{}", USAGE);
    process::exit(1);
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        usage();
    }

    match args[1].as_str() {
        "generate" => generate(args.get(2), args.get(3)),
        "identify" => identify(&args[2..]),
        "voicings" => voicings(&args[2..]),
        "query" => query(&args[2..]),
        "stats" => stats(args.get(2)),
        _ => usage(),
    }
}

fn generate(policy_path: Option<&String>, output_path: Option<&String>) {
    let config = match policy_path {
        Some(path) => match load_config(Path::new(path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        None => GeneratorConfig::default(),
    };

    let dataset = match triads::generate_dataset(&config) {
        Ok(dataset) => dataset,
        Err(e) => {
            eprintln!("Generation error: {}", e);
            process::exit(1);
        }
    };

    let json = match serde_json::to_string_pretty(&dataset) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Serialization error: {}", e);
            process::exit(1);
        }
    };

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, &json) {
                eprintln!("Error writing to '{}': {}", path, e);
                process::exit(1);
            }
            eprintln!(
                "Wrote {} triads, {} voicings to {}",
                dataset.stats.total_triads, dataset.stats.total_voicings, path
            );
        }
        None => {
            println!("{}", json);
        }
    }
}

fn identify(names: &[String]) {
    if names.len() != 3 {
        usage();
    }
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    match triads::identify_names(&names) {
        Ok(Some(triad)) => {
            println!("{} ({} {})", triad.symbol, triad.root, triad.quality);
        }
        Ok(None) => {
            println!("{} {} {} is not a triad", names[0], names[1], names[2]);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn voicings(args: &[String]) {
    let Some(symbol) = args.first() else { usage() };
    let max_fret = match args.get(1).map(|s| s.parse::<u8>()) {
        Some(Ok(fret)) => fret,
        Some(Err(_)) => {
            eprintln!("Error: max fret must be a number from 0 to 24");
            process::exit(1);
        }
        None => 12,
    };

    match triads::voicings_for_symbol(symbol, max_fret) {
        Ok(voicings) => {
            for v in &voicings {
                println!(
                    "{:<12} fret {:>2}  {:<12} score {:>2}  {:?}",
                    v.shape(),
                    v.neck_position,
                    v.difficulty.name(),
                    v.score,
                    v.inversion
                );
            }
            eprintln!("{} voicings", voicings.len());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn query(args: &[String]) {
    if args.len() != 2 {
        usage();
    }
    let db = database();
    match db.get_triad(&args[0], &args[1]) {
        Some(entry) => {
            println!("{}: {} voicings", entry.symbol(), entry.voicings().len());
            for v in entry.common_voicings() {
                println!("  {:<12} {} (score {})", v.shape(), v.difficulty, v.score);
            }
        }
        None => {
            eprintln!("No triad for {} {}", args[0], args[1]);
            process::exit(1);
        }
    }
}

fn stats(dataset_path: Option<&String>) {
    let loaded;
    let db = match dataset_path {
        Some(path) => match TriadDatabase::load(Path::new(path)) {
            Ok(db) => {
                loaded = db;
                &loaded
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        None => database(),
    };

    let stats = db.get_database_stats();
    println!("version:      {}", stats.version);
    println!("generated:    {}", stats.generated);
    println!("instrument:   {}", stats.instrument);
    println!("triads:       {}", stats.total_triads);
    println!("voicings:     {}", stats.total_voicings);
    println!("  beginner:     {}", stats.by_difficulty.beginner);
    println!("  intermediate: {}", stats.by_difficulty.intermediate);
    println!("  advanced:     {}", stats.by_difficulty.advanced);
}
