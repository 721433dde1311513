use anyhow::Context;
use clap::Parser;
use dbus_marshal_gen::gen::policy::{DefaultGeneratorPolicy, GeneratorPolicy, OrderedMapPolicy};
use dbus_marshal_gen::interface::Interface;
use dbus_marshal_gen::{render_module, Session};
use log::info;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dbus-marshal-gen")]
#[command(about = "Generate DBus marshalling procedures from type signatures")]
#[command(version)]
struct Cli {
    /// Message body signature to generate a reader for
    #[arg(long = "read", value_name = "SIG")]
    reads: Vec<String>,

    /// Message body signature to generate a writer for
    #[arg(long = "write", value_name = "SIG")]
    writes: Vec<String>,

    /// JSON file holding a list of interface descriptions
    #[arg(long, value_name = "FILE")]
    interfaces: Option<PathBuf>,

    /// Use BTreeMap instead of HashMap for dictionaries
    #[arg(long)]
    ordered_maps: bool,

    /// Write the generated module here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let interfaces: Vec<Interface> = match &cli.interfaces {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))?
        }
        None => Vec::new(),
    };

    if cli.ordered_maps {
        run(&cli, &interfaces, Session::with_policy(OrderedMapPolicy))
    } else {
        run(&cli, &interfaces, Session::with_policy(DefaultGeneratorPolicy))
    }
}

fn run<P: GeneratorPolicy>(
    cli: &Cli,
    interfaces: &[Interface],
    mut session: Session<P>,
) -> anyhow::Result<()> {
    let mut failures = 0;
    for signature in &cli.reads {
        if let Err(e) = session.read_entry(signature, false) {
            eprintln!("[ERROR] --read {}: {}", signature, e);
            failures += 1;
        }
    }
    for signature in &cli.writes {
        if let Err(e) = session.write_entry(signature, false) {
            eprintln!("[ERROR] --write {}: {}", signature, e);
            failures += 1;
        }
    }
    for report in session.process_interfaces(interfaces) {
        for failure in &report.failures {
            eprintln!(
                "[ERROR] {}.{}: {}",
                report.interface, failure.member, failure.error
            );
        }
        failures += report.failures.len();
    }

    let artifact = session.finish();
    info!(
        "{} procedures generated, {} failures",
        artifact.len(),
        failures
    );
    let module = render_module(&artifact);
    match &cli.output {
        Some(path) => std::fs::write(path, module)
            .with_context(|| format!("writing {}", path.display()))?,
        None => print!("{}", module),
    }

    if failures > 0 {
        anyhow::bail!("{} signatures could not be generated", failures);
    }
    Ok(())
}
