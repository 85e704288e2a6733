use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tt_mechanics::{Die, RandomSource, roll_formula};

pub fn run(formula: Option<&str>, seed: Option<u64>) -> Result<(), String> {
    let mut rng: Box<dyn RandomSource> = match seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(rand::rng()),
    };

    match formula {
        Some(formula) => roll_one(formula, rng.as_mut()),
        None => {
            roll_quick(rng.as_mut());
            Ok(())
        }
    }
}

fn roll_one(formula: &str, rng: &mut dyn RandomSource) -> Result<(), String> {
    // A bare die tag like "d20" rolls one die.
    let expanded = Die::from_str_tag(formula).map(Die::formula);
    let formula = expanded.as_deref().unwrap_or(formula);

    let outcome = roll_formula(formula, rng);
    if !outcome.is_valid() {
        return Err(format!("invalid formula: \"{formula}\""));
    }

    println!(
        "  {} {}",
        outcome.result.to_string().bold(),
        format!("[{}]", outcome.breakdown).dimmed()
    );
    Ok(())
}

fn roll_quick(rng: &mut dyn RandomSource) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Die", "Roll"]);

    for die in Die::QUICK {
        let outcome = roll_formula(&die.formula(), rng);
        table.add_row(vec![die.to_string(), outcome.result.to_string()]);
    }

    println!("{table}");
}
