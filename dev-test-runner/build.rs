use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

fn main() {
    let schema_path = Path::new("fixtures/nodes.json");
    println!("cargo:rerun-if-changed={}", schema_path.display());

    let schema = match nodegen::Schema::load_file(schema_path, None) {
        Ok(x) => x,
        Err(error) => panic!("failed to load fixture schema: {error}"),
    };

    let out_dir = PathBuf::from(std::env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    let file = File::create(out_dir.join("nodes.rs")).expect("create generated module");
    let mut sink = BufWriter::new(file);
    if let Err(error) = nodegen::driver::generate(&schema, &nodegen::SnakeCase::default(), &mut sink) {
        panic!("failed to generate node module: {error}");
    }
}
