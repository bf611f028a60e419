use clap::Parser;
use probe_hash::HashTable;
use probe_hash::Strategy;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 's', long = "table-size", default_value_t = 211)]
    table_size: usize,

    /// Fraction of the table to fill with sequential keys.
    #[arg(short = 'l', long = "load", default_value_t = 0.9)]
    load: f64,
}

fn main() {
    let args = Args::parse();
    let target = (args.table_size as f64 * args.load.clamp(0.0, 1.0)) as usize;

    for strategy in Strategy::ALL {
        let mut table = match HashTable::new(args.table_size, strategy) {
            Ok(table) => table,
            Err(err) => {
                eprintln!("{strategy}: {err}");
                continue;
            }
        };

        println!("== {strategy} ==");
        println!("Filling {} slots with {} keys...", table.table_size(), target);

        let mut num_failures = 0;
        for key in 1..=target as i32 {
            if table.insert(key).is_err() {
                num_failures += 1;
            }
        }

        let stats = table.stats();
        println!(
            "Inserted {} keys, {} collisions, {} probes",
            stats.inserted, stats.collisions, stats.probes
        );

        table.print_probe_histogram();
        table.debug_stats().print();
        println!(
            "Number of failed inserts: {} ({:.02}%)",
            num_failures,
            num_failures as f64 / target.max(1) as f64 * 100.0
        );
        println!();
    }
}
