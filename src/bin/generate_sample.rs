use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{json, Value as JsonValue};

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

/// Round to the precision instruments report.
fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// One secondary observation near a primary one, with instrument bias and
/// noise. Salinity is occasionally missing, as it is for many platforms.
fn secondary_obs(
    rng: &mut SimpleRng,
    source: &str,
    sst: f64,
    sss: f64,
    bias: f64,
    noise: f64,
) -> JsonValue {
    let mut obs = json!({
        "source": source,
        "sea_water_temperature": round3(sst - bias + rng.gauss(0.0, noise)),
        "x": round3(rng.gauss(0.0, 0.05)),
        "y": round3(rng.gauss(0.0, 0.05)),
    });
    if rng.next_f64() > 0.3 {
        obs["sea_water_salinity"] = json!(round3(sss + rng.gauss(0.0, 0.1)));
    }
    obs
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let execution_id = "sample";
    let primary = "MUR25-JPL-L4-GLOB-v04.2";
    let secondaries = [("ICOADS Release 3.0", 0.15, 0.4), ("SAMOS", -0.05, 0.25)];

    let mut data = Vec::new();
    let mut matched = 0usize;
    for i in 0..500 {
        let lat = -60.0 + 120.0 * rng.next_f64();
        // Warmer towards the equator.
        let sst = 28.0 - 0.35 * lat.abs() + rng.gauss(0.0, 0.5);
        let sss = 35.0 + rng.gauss(0.0, 0.4);

        let n_matches = (rng.next_f64() * 4.0) as usize;
        let matches: Vec<JsonValue> = (0..n_matches)
            .map(|_| {
                let (source, bias, noise) = secondaries[(rng.next_f64() * 2.0) as usize % 2];
                secondary_obs(&mut rng, source, sst, sss, bias, noise)
            })
            .collect();
        if !matches.is_empty() {
            matched += 1;
        }

        data.push(json!({
            "id": format!("p{i:04}"),
            "x": round3(-180.0 + 360.0 * rng.next_f64()),
            "y": round3(lat),
            "sea_water_temperature": round3(sst),
            "sea_water_salinity": round3(sss),
            "matches": matches,
        }));
    }

    let total = data.len();
    let matchup: Vec<&str> = secondaries.iter().map(|(s, _, _)| *s).collect();
    let stored = json!({
        "params": {
            "primary": primary,
            "matchup": matchup,
            "startTime": "2017-01-01T00:00:00Z",
            "endTime": "2017-01-31T23:59:59Z",
            "tt": 86400,
            "rt": 1000.0,
        },
        "stats": {
            "numPrimaryMatched": matched,
            "numPrimaryTotal": total,
        },
        "data": data,
    });

    let dir = Path::new("sample_results");
    std::fs::create_dir_all(dir).context("creating sample_results")?;
    let path = dir.join(format!("{execution_id}.json"));
    let text = serde_json::to_string_pretty(&stored)?;
    std::fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;

    println!(
        "Wrote {total} primary records ({matched} matched) to {}",
        path.display()
    );
    Ok(())
}
