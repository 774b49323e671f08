use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SimilarityConfig;
use crate::error::Result;
use crate::player::{PlayerId, PlayerTable};

const POSITIONS: &[&str] = &["1B", "2B", "3B", "SS", "OF", "C", "DH"];
const FIRST_NAMES: &[&str] = &[
    "Aaron", "Bryce", "Carlos", "Dee", "Eddie", "Freddie", "Giancarlo", "Hunter", "Ian", "Jose",
    "Kris", "Luis", "Manny", "Nolan", "Ozzie", "Paul",
];
const LAST_NAMES: &[&str] = &[
    "Alvarez", "Betts", "Cruz", "Diaz", "Escobar", "Freeman", "Gordon", "Harper", "Iglesias",
    "Judge", "Kemp", "Lindor", "Machado", "Nunez", "Ortiz", "Perez",
];

/// A reproducible league of `players` batters with the default stat columns.
///
/// Positions cycle so every default position is populated once `players >= 7`.
pub fn synthetic_table(players: usize, seed: u64) -> Result<PlayerTable> {
    let statistics: Vec<String> = SimilarityConfig::default()
        .weights
        .into_iter()
        .map(|w| w.statistic)
        .collect();
    let mut table = PlayerTable::new(statistics);
    let mut rng = StdRng::seed_from_u64(seed);

    for idx in 0..players {
        let id = idx as PlayerId;
        let name = format!(
            "{} {}",
            FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())],
            LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())]
        );
        let position = POSITIONS[idx % POSITIONS.len()];
        table.insert(id, name, position, season_line(&mut rng))?;
    }
    Ok(table)
}

fn season_line(rng: &mut StdRng) -> Vec<(&'static str, f64)> {
    let g = rng.gen_range(20..=162) as f64;
    let ab = (g * rng.gen_range(2.5..4.2)).round();
    let h = (ab * rng.gen_range(0.18..0.33)).round();
    let doubles = (h * rng.gen_range(0.12..0.25)).round();
    let triples = (h * rng.gen_range(0.0..0.04)).round();
    let hr = (h * rng.gen_range(0.0..0.25)).round();
    let singles = (h - doubles - triples - hr).max(0.0);
    let bb = (ab * rng.gen_range(0.04..0.15)).round();
    let hbp = rng.gen_range(0..15) as f64;
    let sf = rng.gen_range(0..9) as f64;
    let sh = rng.gen_range(0..6) as f64;

    let avg = if ab > 0.0 { h / ab } else { 0.0 };
    let on_base_denom = ab + bb + hbp + sf;
    let obp = if on_base_denom > 0.0 {
        (h + bb + hbp) / on_base_denom
    } else {
        0.0
    };
    let total_bases = singles + 2.0 * doubles + 3.0 * triples + 4.0 * hr;
    let slg = if ab > 0.0 { total_bases / ab } else { 0.0 };

    vec![
        ("G", g),
        ("AB", ab),
        ("R", (h * rng.gen_range(0.3..0.7)).round()),
        ("H", h),
        ("2B", doubles),
        ("3B", triples),
        ("HR", hr),
        ("RBI", (h * rng.gen_range(0.3..0.8)).round()),
        ("SB", rng.gen_range(0..40) as f64),
        ("CS", rng.gen_range(0..12) as f64),
        ("BB", bb),
        ("SO", (ab * rng.gen_range(0.12..0.32)).round()),
        ("SH", sh),
        ("SF", sf),
        ("HBP", hbp),
        ("AVG", avg),
        ("OBP", obp),
        ("SLG", slg),
        ("OPS", obp + slg),
    ]
}
