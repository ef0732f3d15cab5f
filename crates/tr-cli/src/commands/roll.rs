use colored::Colorize;

use tr_dice::evaluate;
use tr_tables::ResolverConfig;

pub fn run(notation: &str, times: u32, seed: Option<u64>) -> Result<(), String> {
    let spec = tr_dice::parse(notation).map_err(|e| e.to_string())?;

    let config = ResolverConfig {
        seed,
        ..ResolverConfig::default()
    };
    let (mut rng, seed) = config.make_rng();

    let mut sum: i64 = 0;
    for _ in 0..times {
        let outcome = evaluate(&spec, &mut rng).map_err(|e| e.to_string())?;
        println!("  {outcome}");
        sum = sum.saturating_add(outcome.final_value());
    }

    if times > 1 {
        println!();
        println!("  sum: {sum}");
    }
    eprintln!("  {}", format!("seed {seed}").dimmed());

    Ok(())
}
