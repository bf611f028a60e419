//! Drives a table with generated keys and writes JSON snapshots plus a
//! manifest for the web viewer.
//!
//! ```sh
//! cargo run --example snapshot_demo -- --strategy=LINEAR --size=101 --inserts=200 --dist=uniform --interval=5
//! ```

use std::error::Error;
use std::fs;
use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use clap::Parser;
use clap::ValueEnum;
use log::error;
use log::info;
use log::warn;
use probe_hash::HashTable;
use probe_hash::Strategy;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand_distr::Zipf;
use serde::Serialize;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Distribution {
    /// 1, 2, 3, ...
    Sequential,
    /// Uniform over `1..=i + 1000` for the i-th key.
    Uniform,
    /// Tight clusters of 20 keys around five centers.
    Clustered,
    /// Zipf-distributed over `1..=1000`, heavily skewed towards small keys.
    Zipf,
}

#[derive(Parser, Debug)]
struct Args {
    /// CHAINING, LINEAR, QUADRATIC or DOUBLE; anything else means CHAINING.
    #[arg(long, default_value = "CHAINING")]
    strategy: Strategy,

    #[arg(long, default_value_t = 101)]
    size: usize,

    #[arg(long, default_value_t = 100)]
    inserts: usize,

    #[arg(long, value_enum, default_value = "sequential")]
    dist: Distribution,

    /// Write a snapshot every this many inserts; 0 writes only the final one.
    #[arg(long, default_value_t = 1)]
    interval: usize,

    #[arg(long, default_value_t = 0x5eed)]
    seed: u64,

    #[arg(long, default_value = "ui/snapshots")]
    out_dir: PathBuf,
}

struct KeySource {
    dist: Distribution,
    rng: SmallRng,
    zipf: Zipf<f64>,
}

impl KeySource {
    fn new(dist: Distribution, seed: u64) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            dist,
            rng: SmallRng::seed_from_u64(seed),
            zipf: Zipf::new(1000.0, 1.1)?,
        })
    }

    fn key(&mut self, i: usize) -> i32 {
        let i = i32::try_from(i).unwrap_or(i32::MAX - 1000);
        match self.dist {
            Distribution::Sequential => i.saturating_add(1),
            Distribution::Uniform => self.rng.random_range(1..=i.saturating_add(1000)),
            Distribution::Clustered => {
                let center: i32 = self.rng.random_range(0..5) * 50 + 1;
                center + self.rng.random_range(0..20)
            }
            Distribution::Zipf => self.rng.sample(&self.zipf) as i32,
        }
    }
}

#[derive(Serialize)]
struct Manifest<'a> {
    snapshots: &'a [String],
}

struct SnapshotWriter {
    dir: PathBuf,
    files: Vec<String>,
}

impl SnapshotWriter {
    fn new(dir: &Path) -> Result<Self, Box<dyn Error>> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            files: Vec::new(),
        })
    }

    /// Writes the next numbered snapshot and rewrites the manifest to include
    /// it.
    fn write(&mut self, table: &HashTable) -> Result<PathBuf, Box<dyn Error>> {
        let name = format!("snap_{:05}.json", self.files.len());
        let path = self.dir.join(&name);

        let mut out = BufWriter::new(File::create(&path)?);
        table.write_snapshot(&mut out)?;
        out.flush()?;

        self.files.push(name);
        self.write_manifest()?;
        Ok(path)
    }

    fn write_manifest(&self) -> Result<(), Box<dyn Error>> {
        let mut out = BufWriter::new(File::create(self.dir.join("manifest.json"))?);
        serde_json::to_writer_pretty(
            &mut out,
            &Manifest {
                snapshots: &self.files,
            },
        )?;
        out.write_all(b"\n")?;
        out.flush()?;
        Ok(())
    }
}

/// Whether the periodic snapshot is due after insert `i`.
fn snapshot_due(i: usize, interval: usize) -> bool {
    interval > 0 && i % interval == 0
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut table = HashTable::new(args.size, args.strategy)?;
    let mut keys = KeySource::new(args.dist, args.seed)?;
    let mut writer = SnapshotWriter::new(&args.out_dir)?;
    let mut last_snapshot = None;

    info!(
        "{} table with {} slots, {} {:?} keys, seed {}",
        table.strategy(),
        table.table_size(),
        args.inserts,
        args.dist,
        args.seed
    );

    for i in 0..args.inserts {
        let key = keys.key(i);
        if let Err(err) = table.insert(key) {
            warn!("{err}");
        }

        if snapshot_due(i, args.interval) {
            match writer.write(&table) {
                Ok(path) => {
                    info!("Wrote snapshot {}", path.display());
                    last_snapshot = Some(i);
                }
                Err(err) => error!("Failed to write snapshot after insert {i}: {err}"),
            }
        }
    }

    if args.inserts > 0 && last_snapshot != Some(args.inserts - 1) {
        let path = writer.write(&table)?;
        info!("Wrote final snapshot {}", path.display());
    }

    let stats = table.stats();
    info!(
        "done: {} inserted, {} collisions, {} probes",
        stats.inserted, stats.collisions, stats.probes
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_interval_disables_periodic_snapshots() {
        assert!((0..50).all(|i| !snapshot_due(i, 0)));
    }

    #[test]
    fn interval_counts_from_first_insert() {
        let due = (0..10).filter(|&i| snapshot_due(i, 4)).collect::<Vec<_>>();
        assert_eq!(due, [0, 4, 8]);
        assert!((0..10).all(|i| snapshot_due(i, 1)));
    }
}
