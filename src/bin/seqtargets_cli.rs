use seqtargets::nested::flatten;
use seqtargets::{ChipSeqConfig, RnaSeqConfig};
use std::env;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

fn usage() {
    eprintln!(
        "Usage:\n  \
  seqtargets_cli --version\n  \
  seqtargets_cli [--config PATH] rnaseq [tree|flat]\n  \
  seqtargets_cli [--config PATH] chipseq [tree|flat]\n\n  \
  tree (default) prints the nested target tree as JSON;\n  \
  flat prints one target path per line"
    );
}

fn parse_global_config_arg(args: &[String]) -> (String, usize) {
    if args.len() >= 3 && args[1] == "--config" {
        return (args[2].clone(), 3);
    }
    (DEFAULT_CONFIG_PATH.to_string(), 1)
}

fn print_tree(tree: &seqtargets::Node) -> Result<(), String> {
    let text = serde_json::to_string_pretty(tree)
        .map_err(|e| format!("Could not serialize JSON output: {e}"))?;
    println!("{text}");
    Ok(())
}

fn print_targets(tree: &seqtargets::Node, mode: &str) -> Result<(), String> {
    match mode {
        "tree" => print_tree(tree),
        "flat" => {
            for target in flatten(tree) {
                println!("{target}");
            }
            Ok(())
        }
        other => {
            usage();
            Err(format!("Unknown output mode '{other}'"))
        }
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    if args.len() <= 1 {
        usage();
        return Err("Missing command".to_string());
    }
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("seqtargets_cli {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let (config_path, cmd_idx) = parse_global_config_arg(&args);
    if args.len() <= cmd_idx {
        usage();
        return Err("Missing command".to_string());
    }

    let command = &args[cmd_idx];
    let mode = args.get(cmd_idx + 1).map(String::as_str).unwrap_or("tree");

    match command.as_str() {
        "rnaseq" => {
            let rnaseq =
                RnaSeqConfig::from_config_file(&config_path).map_err(|e| e.to_string())?;
            print_targets(rnaseq.targets(), mode)
        }
        "chipseq" => {
            let chipseq =
                ChipSeqConfig::from_config_file(&config_path).map_err(|e| e.to_string())?;
            print_targets(chipseq.targets(), mode)
        }
        other => {
            usage();
            Err(format!("Unknown command '{other}'"))
        }
    }
}
