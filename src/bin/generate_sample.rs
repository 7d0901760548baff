use anyhow::{Context, Result};

use cfs_allocator::data::export::table_to_xlsx;
use cfs_allocator::data::model::{CellValue, Table, CBM_COLUMN, CONSOLE_COLUMN, WEIGHT_COLUMN};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

fn cargo_sheet() -> Table {
    Table::new(vec![
        CONSOLE_COLUMN.to_string(),
        "SHIPPER".to_string(),
        WEIGHT_COLUMN.to_string(),
        CBM_COLUMN.to_string(),
    ])
}

/// Rows for `consoles`, 1-3 packages each, with densities drawn around
/// `density` kg/CBM.
fn fill(table: &mut Table, rng: &mut SimpleRng, consoles: std::ops::Range<i64>, density: (f64, f64)) {
    let shippers = ["ACME", "Globex", "Initech", "Umbrella"];
    for console in consoles {
        let packages = 1 + (rng.next_u64() % 3) as usize;
        for _ in 0..packages {
            let cbm = (rng.range(0.2, 3.0) * 100.0).round() / 100.0;
            let weight = (cbm * rng.range(density.0, density.1)).round();
            let shipper = shippers[(rng.next_u64() % shippers.len() as u64) as usize];
            table.push_row(vec![
                CellValue::Integer(console),
                CellValue::String(shipper.to_string()),
                CellValue::from_float(weight),
                CellValue::Float(cbm),
            ]);
        }
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let mut triway = cargo_sheet();
    fill(&mut triway, &mut rng, 1000..1006, (150.0, 260.0));

    let mut thirurani = cargo_sheet();
    fill(&mut thirurani, &mut rng, 2000..2005, (280.0, 340.0));

    // Overlaps both ledgers (1003, 2001) so the filter has something to drop.
    let mut tracking = cargo_sheet();
    fill(&mut tracking, &mut rng, 1003..1004, (150.0, 260.0));
    fill(&mut tracking, &mut rng, 2001..2002, (280.0, 340.0));
    fill(&mut tracking, &mut rng, 3000..3020, (60.0, 900.0));

    for (name, table) in [
        ("sample_triway_cfs.xlsx", &triway),
        ("sample_thirurani_cfs.xlsx", &thirurani),
        ("sample_cargo_tracking.xlsx", &tracking),
    ] {
        let bytes = table_to_xlsx(table).with_context(|| format!("serializing {name}"))?;
        std::fs::write(name, bytes).with_context(|| format!("writing {name}"))?;
        println!("Wrote {} rows to {name}", table.len());
    }

    Ok(())
}
