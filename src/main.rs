use anyhow::{bail, Context, Result};
use clap::Parser;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use xml_cloak::{cloak, is_cloaked, uncloak};

/// xml-cloak - reversible masking of XML constructs
///
/// Cloak a document before handing it to an XML toolchain, uncloak the result
/// afterwards. The direction is picked automatically from the cloak marker.
#[derive(Parser)]
#[command(name = "xml-cloak")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Parameters in `-name:value` form: `-src:source.xml -dest:destination.xml`
    #[arg(allow_hyphen_values = true)]
    params: Vec<String>,
}

const PARAM_SRC: &str = "-src";
const PARAM_DEST: &str = "-dest";

/// Splits `-name:value` tokens on their first colon. A token whose first
/// colon is leading, trailing or absent is ignored.
fn parse_params(params: &[String]) -> HashMap<&str, &str> {
    let mut map = HashMap::new();

    for param in params {
        if let Some(index) = param.find(':') {
            if index > 0 && index < param.len() - 1 {
                map.insert(&param[..index], &param[index + 1..]);
            }
        }
    }

    map
}

fn print_usage() {
    println!("Usage:");
    println!("xml-cloak");
    println!("     -src:source.xml");
    println!("     -dest:destination.xml");
}

/// Reads the source, cloaks or uncloaks based on the marker, writes the
/// destination (overwriting if present).
fn run(source: &Path, destination: &Path) -> Result<()> {
    if !source.exists() {
        bail!("The specified path was not found: {}", source.display());
    }

    let content = fs::read_to_string(source)
        .with_context(|| format!("Failed to read file: {:?}", source))?;

    let transformed = if is_cloaked(&content) {
        uncloak(&content)
    } else {
        cloak(&content)
    };

    fs::write(destination, transformed)
        .with_context(|| format!("Failed to write file: {:?}", destination))?;

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let values = parse_params(&cli.params);

    match (values.get(PARAM_SRC), values.get(PARAM_DEST)) {
        (Some(source), Some(destination)) => run(Path::new(source), Path::new(destination)),
        _ => {
            print_usage();
            Ok(())
        }
    }
}
