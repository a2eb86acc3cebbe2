use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the command tree in src/main.rs
// We need to duplicate this here since build scripts can't access src/ modules
const TEXT_FORMATS: &[&str] = &["bitmark++", "bitmark--", "text", "latex", "json", "xml"];
const TEXT_LOCATIONS: &[&str] = &["body", "tag"];
const FORMATS: &[&str] = &["bitmark", "json", "text"];

fn text_command(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(
            Arg::new("file")
                .index(1)
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .value_parser(clap::builder::PossibleValuesParser::new(TEXT_FORMATS)),
        )
        .arg(
            Arg::new("location")
                .long("location")
                .value_parser(clap::builder::PossibleValuesParser::new(TEXT_LOCATIONS)),
        )
}

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("bitmark")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for working with bitmark text and bit configuration")
        .arg(
            Arg::new("config")
                .long("config")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .subcommand(text_command("breakscape", "Escape text so it reads back literally"))
        .subcommand(text_command("unbreakscape", "Remove the escaping added by breakscape"))
        .subcommand(Command::new("bits").about("List bit types and their aliases"))
        .subcommand(
            Command::new("info")
                .about("Show the resolved configuration of a bit type")
                .arg(Arg::new("bit").required(true).index(1))
                .arg(Arg::new("chains").long("chains").action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert a text AST between formats")
                .arg(
                    Arg::new("input")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .value_parser(clap::builder::PossibleValuesParser::new(FORMATS)),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .required(true)
                        .value_parser(clap::builder::PossibleValuesParser::new(FORMATS)),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("validate")
                .about("Validate parsed bit content against the bit configuration")
                .arg(
                    Arg::new("input")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(Arg::new("bit").long("bit").required(true))
                .arg(Arg::new("resource").long("resource")),
        );

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "bitmark", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "bitmark", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "bitmark", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
