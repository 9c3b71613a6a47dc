use parley::roman::roman_to_decimal;
use std::env;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        for numeral in ["MCMLXIX", "MDXLVI", "MMCCCXLIX"] {
            let decimal = roman_to_decimal(numeral).expect("demo numerals are valid");
            println!("{} to decimal = {}", numeral, decimal);
        }
        return;
    }

    for numeral in &args[1..] {
        match roman_to_decimal(numeral) {
            Ok(decimal) => println!("{} to decimal = {}", numeral, decimal),
            Err(err) => {
                eprintln!("{}: {}", numeral, err);
                std::process::exit(1);
            }
        }
    }
}
