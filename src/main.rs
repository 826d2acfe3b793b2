use std::env;
use std::fs;
use std::process;

use flirt_reader::{decompress_gzip, is_flirt, parse};

fn main() {
    let path = env::args()
        .nth(1)
        .expect("usage: flirt-dump <file.sig[.gz]>");
    let mut data = fs::read(&path).expect("Failed to read input file");

    // .sig.gz containers are unwrapped transparently.
    if data.starts_with(&[0x1f, 0x8b]) {
        data = decompress_gzip(&data);
        assert!(!data.is_empty(), "gzip container could not be decompressed");
    }

    if is_flirt(&data).is_none() {
        eprintln!("{}: not a FLIRT signature file", path);
        process::exit(1);
    }

    let file = match parse(&data) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("{}: {}", path, e);
            process::exit(1);
        }
    };

    let h = &file.header;
    println!("Library:      {}", file.library_name);
    println!("Version:      {}", h.version);
    println!("Architecture: {}", h.arch);
    println!("File types:   {:#010x}", h.file_types);
    println!("OS types:     {:#06x}", h.os_types);
    println!("App types:    {:#06x}", h.app_types);
    println!("Features:     {:#06x}", h.features);
    println!("Modules:      {}", file.modules.len());
    println!("Functions:    {}", file.functions().count());
    println!();

    for module in &file.modules {
        let names: Vec<&str> = module
            .public_functions
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        println!(
            "{}  crc {:3}/{:04x}  len {:5}  {}",
            module.pattern_path_hex(),
            module.crc_length,
            module.crc16,
            module.length,
            names.join(", ")
        );
    }
}
