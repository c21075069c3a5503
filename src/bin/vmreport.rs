//! Report the VM names and owners recorded in an inventory export.

use std::path::PathBuf;
use std::process;

use clap::Parser;

use sortbox::inventory;
use sortbox::AppError;

#[derive(Parser)]
#[command(
    name = "vmreport",
    version,
    about = "Print the VM names and owners in an inventory JSON export"
)]
struct Cli {
    /// Inventory file to read
    #[arg(default_value = "sample_data.json")]
    file: PathBuf,
}

fn main() {
    sortbox::init_logging();
    let cli = Cli::parse();

    let document = match inventory::load_document(&cli.file) {
        Ok(document) => document,
        Err(AppError::FileNotFound { path }) => {
            eprintln!("Error: The file {path} was not found.");
            process::exit(1);
        }
        Err(AppError::ParseError { path, .. }) => {
            eprintln!("Error: Could not parse JSON in {path}. Check for syntax errors.");
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    println!("\n--- Successfully Parsed Data ---");
    println!("Request ID: {}", document.request_id_display());

    let names = inventory::extract_vm_names(&document, |vm| {
        println!("Found VM: {}, Owner: {}", vm.name, vm.owner);
    });

    println!("\n--- Final List ---");
    println!("Total VM Names extracted: {names:?}");
}
