// Command-line interface for bitmark
//
// This binary is a thin shell over the bitmark-babel library: escaping text, inspecting the bit
// configuration, validating parsed bit content and converting text ASTs.
//
// Usage:
//  bitmark breakscape [FILE] [--format <fmt>] [--location <loc>]    - Escape text (stdin when no file)
//  bitmark unbreakscape [FILE] [--format <fmt>] [--location <loc>]  - Undo the escaping
//  bitmark bits                                                       - List bit types and aliases
//  bitmark info <bit-type> [--chains]                                 - Show the resolved config of a bit
//  bitmark convert <input> --to <format> [--from <format>] [-o FILE]  - Convert a text AST
//  bitmark validate <input> --bit <type> [--resource <type>]          - Validate parsed bit content
//
// Extra Parameters:
//
// Format-specific parameters can be passed to convert using --extra-<parameter-name> <value>.
// The CLI layer strips the "extra-" prefix and passes the parameters to the format.
// Example:
//  bitmark convert doc.json --to bitmark --extra-text_format bitmark--
//
// Logging goes to stderr and is controlled by BITMARK_LOG (default "warn").

use bitmark_babel::breakscape::{breakscape, unbreakscape, BreakscapeOptions};
use bitmark_babel::config::ConfigResolver;
use bitmark_babel::validator::{BitContent, TagValidator, ValidationContext, ValidationWarning};
use bitmark_babel::FormatRegistry;
use bitmark_config::{BitmarkConfig, Loader};
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Read};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const TEXT_FORMATS: &[&str] = &["bitmark++", "bitmark--", "text", "latex", "json", "xml"];
const TEXT_LOCATIONS: &[&str] = &["body", "tag"];

/// Parse extra-* arguments from command line args
/// Returns (cleaned_args_without_extras, extra_params_map)
///
/// Supports both:
/// - `--extra-<key> <value>` (explicit value)
/// - `--extra-<key>` (boolean flag, defaults to "true")
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        if let Some(key) = arg.strip_prefix("--extra-") {
            let has_value = args.get(i + 1).is_some_and(|next| !next.starts_with('-'));
            if has_value {
                extra_params.insert(key.to_string(), args[i + 1].clone());
                i += 2;
            } else {
                extra_params.insert(key.to_string(), "true".to_string());
                i += 1;
            }
            continue;
        }

        cleaned_args.push(arg.clone());
        i += 1;
    }

    (cleaned_args, extra_params)
}

fn text_options_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("file")
            .help("Input file (reads stdin when omitted or '-')")
            .index(1)
            .value_hint(ValueHint::FilePath),
    )
    .arg(
        Arg::new("format")
            .long("format")
            .help("Text format (defaults to the configured breakscape.format)")
            .value_parser(clap::builder::PossibleValuesParser::new(TEXT_FORMATS)),
    )
    .arg(
        Arg::new("location")
            .long("location")
            .help("Text location (defaults to the configured breakscape.location)")
            .value_parser(clap::builder::PossibleValuesParser::new(TEXT_LOCATIONS)),
    )
}

fn build_cli() -> Command {
    Command::new("bitmark")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for working with bitmark text and bit configuration")
        .long_about(
            "bitmark escapes and unescapes bitmark text, inspects the bit configuration,\n\
            validates parsed bit content and converts text ASTs.\n\n\
            Examples:\n  \
            echo 'a**b' | bitmark breakscape           # a*^*b\n  \
            bitmark info recipe --chains               # resolved config of a bit\n  \
            bitmark convert doc.json --to bitmark      # text AST to bitmark text\n  \
            bitmark validate bit.json --bit article    # validated content and warnings",
        )
        .arg_required_else_help(true)
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a bitmark.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .subcommand(text_options_args(
            Command::new("breakscape").about("Escape text so it reads back literally"),
        ))
        .subcommand(text_options_args(
            Command::new("unbreakscape").about("Remove the escaping added by breakscape"),
        ))
        .subcommand(Command::new("bits").about("List bit types and their aliases"))
        .subcommand(
            Command::new("info")
                .about("Show the resolved configuration of a bit type")
                .arg(
                    Arg::new("bit")
                        .help("Bit type or alias")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("chains")
                        .long("chains")
                        .help("Include the tags allowed in tag chains")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert a text AST between formats")
                .long_about(
                    "Convert a text AST between formats.\n\n\
                    Supported formats:\n  \
                    - json:    Text AST as JSON (.json), parse and serialize\n  \
                    - bitmark: Bitmark text (.bitmark), serialize only\n  \
                    - text:    Text content without markup (.txt), serialize only\n\n\
                    The source format is auto-detected from the file extension.\n\
                    Output goes to stdout by default, or use -o to specify a file.",
                )
                .arg(
                    Arg::new("input")
                        .help("Input file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source format (auto-detected from file extension if not specified)"),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target format (required)")
                        .required(true),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("validate")
                .about("Validate parsed bit content against the bit configuration")
                .long_about(
                    "Validate parsed bit content against the bit configuration.\n\n\
                    The input is JSON: either an array of content items, or an object\n\
                    with a 'content' array and optional 'body' and 'footer' strings.\n\
                    The validated content and the warnings are written to stdout as JSON.",
                )
                .arg(
                    Arg::new("input")
                        .help("Input file (reads stdin when '-')")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("bit")
                        .long("bit")
                        .help("Bit type of the content")
                        .required(true),
                )
                .arg(
                    Arg::new("resource")
                        .long("resource")
                        .help("Resource type attached in the bit header"),
                ),
        )
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("BITMARK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let (cleaned_args, extra_params) = parse_extra_args(&args);
    let matches = build_cli().get_matches_from(cleaned_args);

    let config_path = matches.get_one::<String>("config").map(|s| s.as_str());

    match matches.subcommand() {
        Some(("breakscape", sub_matches)) => {
            let config = load_cli_config(config_path, sub_matches);
            handle_breakscape_command(sub_matches, &config, false);
        }
        Some(("unbreakscape", sub_matches)) => {
            let config = load_cli_config(config_path, sub_matches);
            handle_breakscape_command(sub_matches, &config, true);
        }
        Some(("bits", _)) => handle_bits_command(),
        Some(("info", sub_matches)) => {
            let bit = sub_matches
                .get_one::<String>("bit")
                .expect("bit is required");
            handle_info_command(bit, sub_matches.get_flag("chains"));
        }
        Some(("convert", sub_matches)) => {
            let config = load_cli_config(config_path, sub_matches);
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            let to = sub_matches.get_one::<String>("to").expect("to is required");

            // Auto-detect --from if not provided
            let from = match sub_matches.get_one::<String>("from") {
                Some(from) => from.to_string(),
                None => FormatRegistry::default()
                    .detect_format_from_filename(input)
                    .unwrap_or_else(|| {
                        eprintln!("Error: Could not detect format from filename '{input}'");
                        eprintln!("Please specify --from explicitly");
                        std::process::exit(1);
                    }),
            };

            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_convert_command(input, &from, to, output, &extra_params, &config);
        }
        Some(("validate", sub_matches)) => {
            let config = load_cli_config(config_path, sub_matches);
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            let bit = sub_matches
                .get_one::<String>("bit")
                .expect("bit is required");
            let resource = sub_matches.get_one::<String>("resource").map(|s| s.as_str());
            handle_validate_command(input, bit, resource, &config);
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

/// Loads the configuration: defaults, ./bitmark.toml, --config, then command flags
fn load_cli_config(explicit_path: Option<&str>, sub_matches: &ArgMatches) -> BitmarkConfig {
    let mut loader = Loader::new().with_optional_file("bitmark.toml");
    if let Some(path) = explicit_path {
        debug!(path, "loading configuration file");
        loader = loader.with_file(path);
    }

    let overrides = [("format", "breakscape.format"), ("location", "breakscape.location")];
    for (arg, key) in overrides {
        let value = sub_matches
            .try_get_one::<String>(arg)
            .ok()
            .flatten()
            .cloned();
        if let Some(value) = value {
            loader = loader.set_override(key, value).unwrap_or_else(|err| {
                eprintln!("Invalid --{arg}: {err}");
                std::process::exit(1);
            });
        }
    }

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}

fn read_input(path: Option<&str>) -> String {
    match path {
        None | Some("-") => {
            let mut source = String::new();
            io::stdin().read_to_string(&mut source).unwrap_or_else(|e| {
                eprintln!("Error reading stdin: {e}");
                std::process::exit(1);
            });
            source
        }
        Some(path) => fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("Error reading file '{path}': {e}");
            std::process::exit(1);
        }),
    }
}

/// Handle the breakscape and unbreakscape commands
fn handle_breakscape_command(sub_matches: &ArgMatches, config: &BitmarkConfig, reverse: bool) {
    let source = read_input(sub_matches.get_one::<String>("file").map(|s| s.as_str()));
    let options = BreakscapeOptions::from(&config.breakscape);
    debug!(format = %options.format, location = %options.location, reverse, "breakscape");

    if reverse {
        print!("{}", unbreakscape(&source, options));
    } else {
        print!("{}", breakscape(&source, options));
    }
}

fn resolver() -> &'static ConfigResolver {
    ConfigResolver::global().unwrap_or_else(|err| {
        eprintln!("Error: {err}");
        std::process::exit(1);
    })
}

/// Handle the bits command
fn handle_bits_command() {
    let resolver = resolver();
    for name in resolver.bit_type_names() {
        let bit_type = resolver.get_bit_type(name);
        if bit_type.alias == bit_type.root {
            println!("{name}");
        } else {
            println!("{name} (alias of {})", bit_type.root);
        }
    }
}

/// Handle the info command
fn handle_info_command(bit: &str, include_chains: bool) {
    let resolver = resolver();
    let bit_type = resolver.get_bit_type(bit);
    if bit_type.is_error() && bit.trim_start_matches('|').trim() != bit_type.root {
        eprintln!("Error: Unknown bit type '{bit}'");
        std::process::exit(1);
    }

    let config = resolver.get_bit_config(&bit_type).unwrap_or_else(|err| {
        eprintln!("Error: {err}");
        std::process::exit(1);
    });
    print!("{}", config.describe(include_chains));
}

/// Handle the convert command
fn handle_convert_command(
    input: &str,
    from: &str,
    to: &str,
    output: Option<&str>,
    extra_params: &HashMap<String, String>,
    config: &BitmarkConfig,
) {
    let registry = FormatRegistry::default();

    // Validate formats exist
    for name in [from, to] {
        if let Err(e) = registry.get(name) {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }

    let source = read_input(Some(input));

    let ast = registry.parse(&source, from).unwrap_or_else(|e| {
        eprintln!("Parse error: {e}");
        std::process::exit(1);
    });

    let mut format_options = HashMap::new();
    if to == "bitmark" {
        let generate = &config.generate;
        format_options.insert("text_format".to_string(), generate.text_format.to_string());
        format_options.insert(
            "text_location".to_string(),
            generate.text_location.to_string(),
        );
        format_options.insert(
            "plain_text_divider".to_string(),
            generate.plain_text_divider_allowed.to_string(),
        );
    }
    for (key, value) in extra_params {
        format_options.insert(key.clone(), value.clone());
    }

    let result = registry
        .serialize_with_options(&ast, to, &format_options)
        .unwrap_or_else(|e| {
            eprintln!("Serialization error: {e}");
            std::process::exit(1);
        });

    match output {
        Some(path) => fs::write(path, result).unwrap_or_else(|e| {
            eprintln!("Error writing file '{path}': {e}");
            std::process::exit(1);
        }),
        None => print!("{result}"),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ValidateInput {
    Content(Vec<BitContent>),
    Bit {
        content: Vec<BitContent>,
        #[serde(default)]
        body: Option<String>,
        #[serde(default)]
        footer: Option<String>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidateOutput {
    bit_type: String,
    content: Vec<BitContent>,
    warnings: Vec<ValidationWarning>,
}

/// Handle the validate command
fn handle_validate_command(input: &str, bit: &str, resource: Option<&str>, config: &BitmarkConfig) {
    let source = read_input(Some(input));
    let (content, body, footer) = match serde_json::from_str(&source) {
        Ok(ValidateInput::Content(content)) => (content, None, None),
        Ok(ValidateInput::Bit {
            content,
            body,
            footer,
        }) => (content, body, footer),
        Err(e) => {
            eprintln!("Parse error: {e}");
            std::process::exit(1);
        }
    };

    let resolver = resolver();
    let bit_type = resolver.get_bit_type(bit);
    let validator =
        TagValidator::new(resolver).with_common_mistakes(config.validate.check_common_mistakes);
    let mut ctx = ValidationContext::new();

    let validated = validator
        .validate_bit_tags(&mut ctx, &bit_type, resource, content)
        .and_then(|validated| {
            if let Some(body) = &body {
                validator.check_body(&mut ctx, &bit_type, body)?;
                validator.check_body_part(&mut ctx, &bit_type, body);
            }
            if let Some(footer) = &footer {
                validator.check_footer(&mut ctx, &bit_type, footer)?;
            }
            Ok(validated)
        })
        .unwrap_or_else(|err| {
            eprintln!("Error: {err}");
            std::process::exit(1);
        });

    let output = ValidateOutput {
        bit_type: bit_type.to_string(),
        content: validated,
        warnings: ctx.into_warnings(),
    };
    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Serialization error: {e}");
            std::process::exit(1);
        }
    }
}
