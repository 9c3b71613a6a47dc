use encoding_rs::WINDOWS_1252;
use glob::glob;
use parley::Dictionary;
use regex::Regex;
use std::env;
use std::fs::File;
use std::io::{BufReader, Read};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <input_dir> <output.prlb>", args[0]);
        std::process::exit(1);
    }

    let input_dir = &args[1];
    let output_path = &args[2];

    println!("Processing wordlists from {}...", input_dir);
    let pairs = collect_pairs(input_dir);
    println!("Collected {} entries", pairs.len());

    let dict = Dictionary::from_pairs(pairs);
    dict.save(output_path).expect("Failed to write phrasebook");
    println!("Wrote {}", output_path);

    println!("Conversion complete!");
}

fn collect_pairs(input_dir: &str) -> Vec<(String, String)> {
    let pattern = format!("{}/*.csv", input_dir);
    // canonical source phrases: lowercase words, apostrophes allowed
    let source_regex = Regex::new(r"^[a-z][a-z' ]*$").unwrap();

    let mut pairs = Vec::new();
    let mut rejected = 0usize;

    for entry in glob(&pattern).expect("Failed to read glob pattern") {
        match entry {
            Ok(path) => {
                println!("Processing {:?}...", path);
                let file = File::open(&path).expect("Failed to open file");
                let mut reader = BufReader::new(file);

                let mut buffer = Vec::new();
                reader
                    .read_to_end(&mut buffer)
                    .expect("Failed to read file");

                let decoded = match String::from_utf8(buffer) {
                    Ok(text) => text,
                    Err(err) => {
                        eprintln!(
                            "Warning: {:?} is not UTF-8, decoding as Windows-1252",
                            path
                        );
                        let bytes = err.into_bytes();
                        let (text, _, had_errors) = WINDOWS_1252.decode(&bytes);
                        if had_errors {
                            eprintln!("Warning: encoding errors in {:?}", path);
                        }
                        text.into_owned()
                    }
                };

                for line in decoded.lines() {
                    let line = line.trim();
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }

                    let (source, target) = match line.split_once(',') {
                        Some(pair) => pair,
                        None => {
                            rejected += 1;
                            continue;
                        }
                    };

                    let source = source.trim().to_lowercase();
                    let target = target.trim();
                    if !source_regex.is_match(&source) || target.is_empty() {
                        rejected += 1;
                        continue;
                    }

                    pairs.push((source, target.to_string()));
                }
            }
            Err(e) => eprintln!("Error reading glob entry: {}", e),
        }
    }

    if rejected > 0 {
        println!("Skipped {} malformed lines", rejected);
    }

    pairs
}
