#![forbid(unsafe_code)]

//! Property tests for dump layout and file conversion.
//!
//! Run:
//!   cargo test -p bined-cli --test proptest_cli

use bined_cli::cli::{Cli, ConvertArgs, Commands};
use bined_cli::commands::run_convert;
use bined_cli::dump::{self, DumpLayout};
use bined_core::{CodeCharactersCase, CodeType};
use clap::Parser;
use proptest::prelude::*;

fn code_type_strategy() -> impl Strategy<Value = CodeType> {
    prop_oneof![
        Just(CodeType::Binary),
        Just(CodeType::Octal),
        Just(CodeType::Decimal),
        Just(CodeType::Hexadecimal),
    ]
}

fn convert_args(args: &[String]) -> ConvertArgs {
    let mut full = vec!["bined".to_string(), "convert".to_string()];
    full.extend_from_slice(args);
    match Cli::try_parse_from(full).unwrap().command {
        Commands::Convert(args) => args,
        other => panic!("expected convert, got {other:?}"),
    }
}

proptest! {
    #[test]
    fn dump_rows_cover_every_byte(
        bytes in prop::collection::vec(any::<u8>(), 0..200),
        bytes_per_row in 1u64..=32,
        base in 0u64..0x1_0000,
        code_type in code_type_strategy(),
    ) {
        let layout = DumpLayout {
            code_type,
            case: CodeCharactersCase::Upper,
            bytes_per_row,
        };
        let rendered = dump::render(&bytes, base, layout);
        let lines: Vec<&str> = rendered.lines().collect();
        let per_row = bytes_per_row as usize;
        prop_assert_eq!(lines.len(), bytes.len().div_ceil(per_row));

        let digits = code_type.max_digits_for_byte() as usize;
        let text_column = 8 + 2 + per_row * (digits + 1) - 1 + 2;
        for (row, (line, chunk)) in lines.iter().zip(bytes.chunks(per_row)).enumerate() {
            let offset = u64::from_str_radix(&line[..8], 16).unwrap();
            prop_assert_eq!(offset, base + (row * per_row) as u64);
            prop_assert_eq!(line[text_column..].chars().count(), chunk.len());
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn inverting_twice_restores_the_file(
        bytes in prop::collection::vec(any::<u8>(), 1..64),
        start_fraction in 0.0f64..1.0,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.bin");
        let once = dir.path().join("once.bin");
        let twice = dir.path().join("twice.bin");
        std::fs::write(&input, &bytes).unwrap();
        let start = (bytes.len() as f64 * start_fraction) as u64;

        for (from, to) in [(&input, &once), (&once, &twice)] {
            let args = convert_args(&[
                "--op".into(),
                "invert".into(),
                "--start".into(),
                start.to_string(),
                from.display().to_string(),
                "-o".into(),
                to.display().to_string(),
            ]);
            run_convert(&args).unwrap();
        }

        let inverted = std::fs::read(&once).unwrap();
        let prefix = usize::try_from(start).unwrap();
        prop_assert_eq!(&inverted[..prefix], &bytes[..prefix]);
        for (changed, original) in inverted[prefix..].iter().zip(&bytes[prefix..]) {
            prop_assert_eq!(*changed, !*original);
        }
        prop_assert_eq!(std::fs::read(&twice).unwrap(), bytes);
    }

    #[test]
    fn ranges_past_the_end_are_usage_errors(
        size in 0usize..32,
        past in 1u64..1000,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.bin");
        std::fs::write(&input, vec![0u8; size]).unwrap();
        let args = convert_args(&[
            "--op".into(),
            "swap-pairs".into(),
            "--start".into(),
            "0".into(),
            "--length".into(),
            (size as u64 + past).to_string(),
            input.display().to_string(),
        ]);
        let err = run_convert(&args).unwrap_err();
        prop_assert_eq!(err.exit_code(), 2);
    }
}
