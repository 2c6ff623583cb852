use std::path::PathBuf;

use anyhow::{Context, Result};

/// Seismic source regions: (name, centre latitude, centre longitude, spread in degrees).
const REGIONS: &[(&str, f64, f64, f64)] = &[
    ("Sumatra", 2.0, 96.5, 2.2),
    ("Java", -8.3, 110.0, 1.8),
    ("Sulawesi", -1.5, 121.0, 1.5),
    ("Banda Sea", -6.5, 129.5, 1.7),
    ("Papua", -3.5, 138.5, 1.9),
];

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() -> Result<()> {
    let out: PathBuf = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_quakes.csv".to_string())
        .into();
    let n_events = 1500;

    let mut rng = SimpleRng::new(42);
    let mut writer = csv::Writer::from_path(&out)
        .with_context(|| format!("creating {}", out.display()))?;
    writer.write_record([
        "latitude",
        "longitude",
        "depth",
        "mag",
        "region",
        "cluster",
        "dbscan_cluster",
    ])?;

    for _ in 0..n_events {
        let k = (rng.next_f64() * REGIONS.len() as f64) as usize % REGIONS.len();
        let (name, lat0, lon0, spread) = REGIONS[k];
        let lat = rng.gauss(lat0, spread);
        let lon = rng.gauss(lon0, spread);
        let depth = rng.gauss(60.0, 40.0).abs();
        let mag = (rng.gauss(4.6, 0.6)).clamp(2.5, 8.5);

        // Events far from their region centre are DBSCAN noise (blank label).
        let dist = ((lat - lat0).powi(2) + (lon - lon0).powi(2)).sqrt();
        let dbscan = if dist > 1.6 * spread {
            String::new()
        } else {
            k.to_string()
        };

        writer.write_record([
            format!("{lat:.4}"),
            format!("{lon:.4}"),
            format!("{depth:.1}"),
            format!("{mag:.1}"),
            name.to_string(),
            k.to_string(),
            dbscan,
        ])?;
    }

    writer.flush()?;
    println!("Wrote {n_events} events to {}", out.display());
    Ok(())
}
