use std::sync::Arc;

use arrow::array::{Float64Array, Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            // splitmix64
            x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
            let mut z = x;
            z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
            *slot = z ^ (z >> 31);
        }
        Self { state: s }
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

    /// Integer score clamped to 0..=100.
    fn score(&mut self, mean: f64, std_dev: f64) -> f64 {
        self.gauss(mean, std_dev).round().clamp(0.0, 100.0)
    }
}

#[derive(Serialize)]
struct Row {
    state: String,
    gender: String,
    year: i32,
    math_score: f64,
    reading_score: f64,
    writing_score: f64,
}

fn main() {
    let mut rng = SimpleRng::new(42);

    // (state, baseline offset)
    let states = [
        ("California", 2.0),
        ("Texas", -1.0),
        ("New York", 3.0),
        ("Florida", -2.0),
        ("Illinois", 0.5),
        ("Ohio", -0.5),
        ("Washington", 1.5),
    ];
    let genders = ["female", "male"];
    let years = 2015..=2022;
    let students_per_group = 12;

    let mut rows = Vec::new();
    for year in years {
        let trend = (year - 2015) as f64 * 0.6;
        for &(state, offset) in &states {
            for gender in genders {
                // Slight subject skew per gender, as in typical score tables.
                let (m, r, w) = if gender == "female" {
                    (-1.5, 3.0, 4.0)
                } else {
                    (2.0, -1.5, -2.5)
                };
                for _ in 0..students_per_group {
                    let ability = rng.gauss(0.0, 9.0);
                    let base = 66.0 + offset + trend + ability;
                    rows.push(Row {
                        state: state.to_string(),
                        gender: gender.to_string(),
                        year,
                        math_score: rng.score(base + m, 6.0),
                        reading_score: rng.score(base + r, 6.0),
                        writing_score: rng.score(base + w, 6.0),
                    });
                }
            }
        }
    }

    // Write CSV
    let csv_path = "student_scores.csv";
    let mut writer = csv::Writer::from_path(csv_path).expect("Failed to create CSV file");
    for row in &rows {
        writer.serialize(row).expect("Failed to write CSV row");
    }
    writer.flush().expect("Failed to flush CSV file");

    // Build Arrow arrays
    let schema = Arc::new(Schema::new(vec![
        Field::new("state", DataType::Utf8, false),
        Field::new("gender", DataType::Utf8, false),
        Field::new("year", DataType::Int32, false),
        Field::new("math_score", DataType::Float64, false),
        Field::new("reading_score", DataType::Float64, false),
        Field::new("writing_score", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.state.as_str()))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.gender.as_str()))),
            Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.year))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.math_score))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.reading_score))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.writing_score))),
        ],
    )
    .expect("Failed to create RecordBatch");

    // Write Parquet
    let parquet_path = "student_scores.parquet";
    let file = std::fs::File::create(parquet_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    println!(
        "Wrote {} records ({} states, {} genders) to {csv_path} and {parquet_path}",
        rows.len(),
        states.len(),
        genders.len()
    );
}
