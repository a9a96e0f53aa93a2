use std::env;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

fn main() {
    let out_dir = env::var("OUT_DIR").unwrap();

    generate_name_map(
        &out_dir,
        "data/mp_regen_equipment.csv",
        "mp_regen_equipment.rs",
        "MP_REGEN_EQUIPMENT",
        "i32",
    );
    generate_name_map(
        &out_dir,
        "data/skill_mp_costs.csv",
        "skill_mp_costs.rs",
        "SKILL_MP_COSTS",
        "u32",
    );

    println!("cargo:rerun-if-changed=data/mp_regen_equipment.csv");
    println!("cargo:rerun-if-changed=data/skill_mp_costs.csv");
}

/// Two-column csv (lowercase name, number) into a `phf::Map<&str, ty>`.
fn generate_name_map(out_dir: &str, csv_path: &str, out_name: &str, static_name: &str, ty: &str) {
    let csv = fs::read_to_string(csv_path).unwrap_or_else(|e| panic!("failed to read {csv_path}: {e}"));

    let mut entries: Vec<(String, String)> = Vec::new();
    for line in csv.lines().skip(1) {
        let Some((name, value)) = line.rsplit_once(',') else {
            continue;
        };
        let name = name.trim().to_lowercase();
        let value = value.trim();
        if name.is_empty() || value.parse::<i64>().is_err() {
            continue;
        }
        // First entry wins on duplicates
        if entries.iter().any(|(n, _)| *n == name) {
            continue;
        }
        entries.push((name, value.to_string()));
    }
    entries.sort();

    let path = Path::new(out_dir).join(out_name);
    let mut file = BufWriter::new(fs::File::create(&path).unwrap());

    let mut builder = phf_codegen::Map::new();
    for (name, value) in &entries {
        builder.entry(name.as_str(), value);
    }

    writeln!(
        file,
        "pub static {static_name}: phf::Map<&'static str, {ty}> = {};",
        builder.build()
    )
    .unwrap();
}
