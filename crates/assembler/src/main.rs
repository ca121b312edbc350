//! CLI entry point for the `ebpf-asm` assembler binary.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use assembler::assembler::{assemble, AssembleResult};
use assembler::errors::AssembleFileError;
use ebpf_core::{disassemble_program, DisassemblyRow};
#[cfg(test)]
use tempfile as _;
use thiserror as _;

const USAGE_TEXT: &str = "\
Usage: ebpf-asm <command> [options]

Commands:
  build <input> [-o <output>] [--hex] [--verbose]  Assemble source to binary
  disasm <binary>                                  Disassemble a program image

Options:
  -o, --output <file>  Output file path (default: input stem + .bin)
      --hex            Print one hex word per line instead of writing a file
  -v, --verbose        Print listing to stderr (build only)
  -h, --help           Show this help message

Examples:
  ebpf-asm build program.s
  ebpf-asm build program.s -o program.bin
  ebpf-asm disasm program.bin
";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Build(BuildArgs),
    Disasm(DisasmArgs),
}

#[derive(Debug, PartialEq, Eq)]
struct BuildArgs {
    input: PathBuf,
    output: Option<PathBuf>,
    hex: bool,
    verbose: bool,
}

#[derive(Debug, PartialEq, Eq)]
struct DisasmArgs {
    input: PathBuf,
}

#[derive(Debug)]
enum ParseResult {
    Command(Command),
    Help,
}

fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let first = args.next().ok_or_else(|| "missing command".to_string())?;

    if first == "--help" || first == "-h" {
        return Ok(ParseResult::Help);
    }

    let command_str = first.to_string_lossy().to_string();

    match command_str.as_str() {
        "build" => parse_build_args(args)
            .map(Command::Build)
            .map(ParseResult::Command),
        "disasm" => parse_disasm_args(args)
            .map(Command::Disasm)
            .map(ParseResult::Command),
        other => Err(format!("unknown command: {other}")),
    }
}

#[allow(clippy::while_let_on_iterator)]
fn parse_build_args(mut args: impl Iterator<Item = OsString>) -> Result<BuildArgs, String> {
    let mut input: Option<PathBuf> = None;
    let mut output: Option<PathBuf> = None;
    let mut hex = false;
    let mut verbose = false;

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }

        if arg == "--verbose" || arg == "-v" {
            verbose = true;
            continue;
        }

        if arg == "--hex" {
            hex = true;
            continue;
        }

        if arg == "-o" || arg == "--output" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for -o".to_string())?;
            output = Some(PathBuf::from(value));
            continue;
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if input.is_some() {
            return Err("multiple input paths provided".to_string());
        }
        input = Some(PathBuf::from(arg));
    }

    let input = input.ok_or_else(|| "missing input path".to_string())?;
    Ok(BuildArgs {
        input,
        output,
        hex,
        verbose,
    })
}

fn parse_disasm_args(args: impl Iterator<Item = OsString>) -> Result<DisasmArgs, String> {
    let mut input: Option<PathBuf> = None;

    for arg in args {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if input.is_some() {
            return Err("multiple input paths provided".to_string());
        }
        input = Some(PathBuf::from(arg));
    }

    let input = input.ok_or_else(|| "missing input path".to_string())?;
    Ok(DisasmArgs { input })
}

fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("out");

    let parent = input.parent().unwrap_or_else(|| Path::new(""));

    parent.join(format!("{stem}.bin"))
}

fn run_build(args: BuildArgs) -> Result<(), i32> {
    let result = match assemble(&args.input) {
        Ok(r) => r,
        Err(e) => {
            report_assemble_error(&args.input, &e);
            return Err(1);
        }
    };

    if args.verbose {
        print_listing(&result);
    }

    if args.hex {
        for word in result.words() {
            println!("{}", format_hex_word(word));
        }
        return Ok(());
    }

    let output_path = args
        .output
        .unwrap_or_else(|| default_output_path(&args.input));

    if let Err(e) = fs::write(&output_path, &result.binary) {
        eprintln!("error: failed to write output: {e}");
        return Err(1);
    }

    println!(
        "Assembled {} ({} bytes) -> {}",
        args.input.display(),
        result.binary.len(),
        output_path.display()
    );

    Ok(())
}

fn report_assemble_error(input: &Path, e: &AssembleFileError) {
    match e {
        AssembleFileError::Assemble(err) => {
            eprintln!("{}", err.format_for_stderr(&input.display().to_string()));
        }
        AssembleFileError::Read { .. } => eprintln!("error: {e}"),
    }
}

fn format_hex_word(word: &[u8]) -> String {
    word.iter().map(|b| format!("{b:02x}")).collect()
}

fn print_listing(result: &AssembleResult) {
    for entry in &result.listing {
        eprintln!("{entry}");
    }
}

fn format_row(row: &DisassemblyRow) -> String {
    let marker = if row.is_illegal { "  ; illegal" } else { "" };
    format!(
        "{:04x}: {:<8} {}{marker}",
        row.addr_start, row.mnemonic, row.operands
    )
}

fn run_disasm(args: &DisasmArgs) -> Result<(), i32> {
    let program = match fs::read(&args.input) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("error: cannot read {}: {e}", args.input.display());
            return Err(1);
        }
    };

    for row in disassemble_program(&program) {
        println!("{}", format_row(&row));
    }

    Ok(())
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Command(Command::Build(args))) => match run_build(args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Ok(ParseResult::Command(Command::Disasm(args))) => match run_disasm(&args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Err(error) => {
            if error.starts_with("Usage:") {
                println!("{error}");
            } else {
                eprintln!("error: {error}");
                eprintln!("{USAGE_TEXT}");
            }
            1
        }
    };

    std::process::exit(exit_code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ebpf_core::disassemble_one;
    use std::ffi::OsString;
    use std::path::PathBuf;

    #[test]
    fn parses_build_command() {
        let result = parse_build_args(
            [
                OsString::from("program.s"),
                OsString::from("-o"),
                OsString::from("out.bin"),
                OsString::from("--verbose"),
                OsString::from("--hex"),
            ]
            .into_iter(),
        )
        .expect("valid build args should parse");

        assert_eq!(
            result,
            BuildArgs {
                input: PathBuf::from("program.s"),
                output: Some(PathBuf::from("out.bin")),
                hex: true,
                verbose: true,
            }
        );
    }

    #[test]
    fn parses_disasm_command() {
        let result = parse_args([OsString::from("disasm"), OsString::from("prog.bin")].into_iter())
            .expect("valid disasm args should parse");

        assert!(matches!(
            result,
            ParseResult::Command(Command::Disasm(DisasmArgs { ref input })) if input == Path::new("prog.bin")
        ));
    }

    #[test]
    fn parses_help_flag() {
        let result = parse_args([OsString::from("--help")].into_iter())
            .expect("help should parse without error");
        assert!(matches!(result, ParseResult::Help));
    }

    #[test]
    fn rejects_unknown_command() {
        let error = parse_args([OsString::from("unknown")].into_iter())
            .expect_err("unknown command should fail parse");
        assert!(error.contains("unknown command"));
    }

    #[test]
    fn default_output_path_simple() {
        assert_eq!(
            default_output_path(&PathBuf::from("program.s")),
            PathBuf::from("program.bin")
        );
    }

    #[test]
    fn default_output_path_with_dir() {
        assert_eq!(
            default_output_path(&PathBuf::from("src/program.s")),
            PathBuf::from("src/program.bin")
        );
    }

    #[test]
    fn default_output_path_no_extension() {
        assert_eq!(
            default_output_path(&PathBuf::from("program")),
            PathBuf::from("program.bin")
        );
    }

    #[test]
    fn parse_build_missing_input() {
        let error = parse_build_args(std::iter::empty()).expect_err("missing input should fail");
        assert!(error.contains("missing input"));
    }

    #[test]
    fn parse_disasm_rejects_options() {
        let error = parse_disasm_args([OsString::from("--hex")].into_iter())
            .expect_err("disasm should reject options");
        assert!(error.contains("unknown option"));
    }

    #[test]
    fn hex_word_is_lowercase_without_separators() {
        assert_eq!(
            format_hex_word(&[0x14, 0, 0, 0, 0, 0, 0x06, 0xb7]),
            "14000000000006b7"
        );
    }

    #[test]
    fn formats_disassembly_rows() {
        let program = [0x14, 0, 0, 0, 0, 0, 0x06, 0xb7, 0, 0, 0, 0, 0, 0, 0, 0x06];
        let rows: Vec<_> = (0..2)
            .filter_map(|i| disassemble_one(i * 8, &program))
            .collect();
        assert_eq!(format_row(&rows[0]), "0000: MOVI     0->6 @ 0 #00000014");
        assert_eq!(
            format_row(&rows[1]),
            "0008: .word    0->0 @ 0 #00000000  ; illegal"
        );
    }
}
