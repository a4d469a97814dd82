use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::{Rgb, RgbImage};

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

fn generate_signal(
    len: usize,
    peaks: &[(f64, f64, f64)],
    noise_level: f64,
    rng: &mut SimpleRng,
) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let t = i as f64;
            let signal: f64 = peaks
                .iter()
                .map(|&(mu, sigma, amp)| gaussian(t, mu, sigma, amp))
                .sum();
            signal + rng.gauss(0.0, noise_level)
        })
        .collect()
}

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

fn write_signal(path: &Path, samples: &[f64]) -> Result<()> {
    let mut file = fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writeln!(file, "amplitude")?;
    for v in samples {
        writeln!(file, "{v}")?;
    }
    Ok(())
}

/// Gradient with a bright disc so the edge overlay has something to find.
fn generate_image(w: u32, h: u32, rng: &mut SimpleRng) -> RgbImage {
    let cx = w as f64 * (0.3 + 0.4 * rng.next_f64());
    let cy = h as f64 * (0.3 + 0.4 * rng.next_f64());
    let radius = w.min(h) as f64 * 0.2;
    RgbImage::from_fn(w, h, |x, y| {
        let dx = x as f64 - cx;
        let dy = y as f64 - cy;
        if dx * dx + dy * dy < radius * radius {
            Rgb([240, 230, 200])
        } else {
            let r = (x * 255 / w.max(1)) as u8;
            let g = (y * 255 / h.max(1)) as u8;
            Rgb([r / 2, g / 2, 60])
        }
    })
}

fn main() -> Result<()> {
    let root = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_input"));
    let mut rng = SimpleRng::new(42);

    // Signals: three peak shapes × four noise levels
    let signal_dir = root.join("signals");
    fs::create_dir_all(&signal_dir).context("creating signal directory")?;

    let shapes: Vec<(&str, Vec<(f64, f64, f64)>)> = vec![
        ("single", vec![(250.0, 20.0, 2.0)]),
        ("double", vec![(150.0, 15.0, 1.5), (350.0, 25.0, 1.0)]),
        ("triple", vec![(100.0, 10.0, 0.8), (250.0, 30.0, 1.2), (420.0, 12.0, 2.5)]),
    ];
    let noise_levels = [0.01, 0.05, 0.1, 0.2];

    let mut n_signals = 0;
    for (name, peaks) in &shapes {
        for (j, &noise) in noise_levels.iter().enumerate() {
            let samples = generate_signal(500, peaks, noise, &mut rng);
            write_signal(&signal_dir.join(format!("{name}_{j}.csv")), &samples)?;
            n_signals += 1;
        }
    }

    // Images
    let image_dir = root.join("images");
    fs::create_dir_all(&image_dir).context("creating image directory")?;

    let sizes = [(64, 48), (128, 96), (200, 150)];
    let mut n_images = 0;
    for (i, &(w, h)) in sizes.iter().enumerate() {
        let path = image_dir.join(format!("sample_{i}.png"));
        generate_image(w, h, &mut rng)
            .save(&path)
            .with_context(|| format!("writing {}", path.display()))?;
        n_images += 1;
    }

    println!(
        "Wrote {n_signals} signals to {} and {n_images} images to {}",
        signal_dir.display(),
        image_dir.display()
    );
    Ok(())
}
