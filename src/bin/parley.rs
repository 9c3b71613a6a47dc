use parley::{translate, translate_interactive, Dictionary};
use std::env;

fn main() {
    let args: Vec<String> = env::args().collect();
    match args.len() {
        1 => run_demo(),
        2 => {
            let dict = Dictionary::builtin();
            println!("{}", translate(&args[1], &dict));
        }
        3 => {
            let dict = Dictionary::load(&args[1]).expect("Failed to load phrasebook");
            println!("Loaded {} phrasebook entries", dict.len());
            println!("{}", translate(&args[2], &dict));
        }
        _ => {
            eprintln!("Usage: {} [phrasebook.prlb] [text]", args[0]);
            std::process::exit(1);
        }
    }
}

fn run_demo() {
    println!("Welcome to the pirate translator! I translate sentences from English to Pirate.");
    let dict = Dictionary::builtin();

    let answer = translate_interactive(&dict).expect("Failed to read input");
    println!("{}", answer);

    let first = translate(
        "Excuse me, boy, have you seen my fellow pirate in the hotel?",
        &dict,
    );
    println!("{}", first);
    let second = translate(
        "Hello madame, my friend will pay you five coins if you tell us where the officer is!",
        &dict,
    );
    println!("{}", second);

    assert_eq!(
        first,
        "Arrr, matey, have ye seen me fellow buccaneer in th' fleabag inn? "
    );
    assert_eq!(
        second,
        "Ahoy proud beauty, me mate will pay ye five doubloons if ye tell us where th' foul blaggart be! "
    );
    assert_ne!(
        translate("Where are your coins", &dict),
        "Where be your coins?"
    );
}
