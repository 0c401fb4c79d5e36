//! Subcommand implementations.
//!
//! Each command returns a [`CommandOutput`] holding both renderings; the
//! caller prints one of them depending on `--json`.

use std::fmt::Write as _;
use std::path::Path;

use bined_core::{ByteArrayData, CaretPosition, CodeAreaSection, SelectionRange};
use bined_runtime::{
    BinarySearch, BinaryEditor, BitSwapOperation, BitSwapping, BookmarkPreferences,
    BookmarkRecord, CodeArea, CodeAreaView, EditorConfig, JsonFilePreferences, MacroManager,
    Rgb, parse_step,
};
use serde_json::{Value, json};

use crate::cli::{BookmarkAction, BookmarksArgs, ConvertArgs, DumpArgs, ListArgs, RunArgs};
use crate::dump::{self, DumpLayout};
use crate::error::{CliError, Result};

/// Bytes shown when converting without an output file.
const PREVIEW_LIMIT: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    pub text: String,
    pub json: Value,
}

type Manager = MacroManager<JsonFilePreferences, BinarySearch>;

fn open_manager(path: &Path, config: &EditorConfig) -> Result<Manager> {
    let store = JsonFilePreferences::open(path)?;
    Ok(MacroManager::with_settings(
        store,
        Some(BinarySearch::new()),
        config.macros.clone(),
    ))
}

/// `[start, start + length)` checked against `size`; defaults cover the rest.
fn checked_range(start: Option<u64>, length: Option<u64>, size: u64) -> Result<SelectionRange> {
    let start = start.unwrap_or(0);
    if start > size {
        return Err(CliError::invalid(format!(
            "start {start} is past the end of the file ({size} bytes)"
        )));
    }
    let length = length.unwrap_or(size - start);
    let end = start
        .checked_add(length)
        .filter(|&end| end <= size)
        .ok_or_else(|| {
            CliError::invalid(format!(
                "range {start}+{length} exceeds the file ({size} bytes)"
            ))
        })?;
    Ok(SelectionRange::new(start, end))
}

pub fn load_config(path: Option<&Path>) -> Result<EditorConfig> {
    let Some(path) = path else {
        return Ok(EditorConfig::default());
    };
    let config = if path.extension().is_some_and(|ext| ext == "json") {
        EditorConfig::from_json_file(path)?
    } else {
        EditorConfig::from_toml_file(path)?
    };
    Ok(config.validated()?)
}

// ============================================================================
// list
// ============================================================================

pub fn run_list(args: &ListArgs) -> Result<CommandOutput> {
    let manager = open_manager(&args.prefs, &EditorConfig::default())?;
    let last = manager.last_active_macro();
    let mut text = String::new();
    let mut entries = Vec::new();
    for (index, record) in manager.macro_records().iter().enumerate() {
        let problem = if args.check {
            record
                .steps
                .iter()
                .enumerate()
                .find_map(|(i, step)| parse_step(step).err().map(|e| (i + 1, e)))
        } else {
            None
        };
        let marker = if last == Some(index) { '*' } else { ' ' };
        let _ = writeln!(
            text,
            "{marker}{index:>3}  {}  ({} steps)",
            record.name,
            record.len()
        );
        if let Some((line, error)) = &problem {
            let _ = writeln!(text, "      line {line}: {error}");
        }
        entries.push(json!({
            "index": index,
            "name": record.name,
            "steps": record.steps,
            "error": problem.map(|(line, error)| json!({
                "line": line,
                "message": error.message,
                "position": error.position,
            })),
        }));
    }
    if entries.is_empty() {
        text.push_str("no macros stored\n");
    }
    Ok(CommandOutput {
        text,
        json: json!({ "macros": entries, "last_active": last }),
    })
}

// ============================================================================
// run
// ============================================================================

pub fn run_macro(args: &RunArgs) -> Result<CommandOutput> {
    let config = load_config(args.config.as_deref())?;
    let bytes = std::fs::read(&args.input)?;
    let mut editor = BinaryEditor::with_config(ByteArrayData::from(bytes), &config);
    if args.text {
        editor
            .view
            .area
            .set_caret_position(CaretPosition::new(0, 0).with_section(CodeAreaSection::TextPreview));
    }

    let mut manager = open_manager(&args.prefs, &config)?;
    let index = args
        .index
        .or_else(|| manager.last_active_macro())
        .ok_or_else(|| CliError::NoMacro {
            path: args.prefs.clone(),
        })?;
    manager.execute_macro(&mut editor, index)?;
    let name = manager.macro_records()[index].name.clone();

    let result = editor.bytes();
    if let Some(output) = &args.output {
        std::fs::write(output, &result)?;
    }
    let caret = editor.view.area.caret_position();
    tracing::info!(macro_name = %name, size = result.len(), "macro applied");
    Ok(CommandOutput {
        text: format!(
            "{name}: {} bytes, caret at {}:{}, {} undo steps\n",
            result.len(),
            caret.data_position,
            caret.code_offset,
            editor.view.history.undo_depth()
        ),
        json: json!({
            "macro": name,
            "index": index,
            "size": result.len(),
            "caret": { "position": caret.data_position, "offset": caret.code_offset },
            "undo_depth": editor.view.history.undo_depth(),
            "written": args.output,
        }),
    })
}

// ============================================================================
// convert
// ============================================================================

pub fn run_convert(args: &ConvertArgs) -> Result<CommandOutput> {
    let operation = BitSwapOperation::from(args.op);
    let bytes = std::fs::read(&args.input)?;
    let range = checked_range(args.start, args.length, bytes.len() as u64)?;

    let Some(output) = &args.output else {
        let data = ByteArrayData::from(bytes);
        let preview = BitSwapping::preview(&data, range, operation, PREVIEW_LIMIT)
            .map_err(|e| CliError::invalid(e.to_string()))?;
        let layout = DumpLayout {
            code_type: bined_core::CodeType::Hexadecimal,
            case: bined_core::CodeCharactersCase::Upper,
            bytes_per_row: 16,
        };
        return Ok(CommandOutput {
            text: dump::render(&preview, range.first(), layout),
            json: json!({
                "operation": operation.name(),
                "start": range.first(),
                "length": range.length(),
                "preview": preview,
            }),
        });
    };

    let mut view = CodeAreaView::new(CodeArea::new(ByteArrayData::from(bytes)));
    if !range.is_empty() {
        view.area.set_selection(range);
        if let Some(command) = BitSwapping::create_command(&view.area, operation) {
            view.execute(Box::new(command))?;
        }
    }
    let result = view.data_snapshot().map_err(|e| CliError::invalid(e.to_string()))?;
    std::fs::write(output, &result)?;
    Ok(CommandOutput {
        text: format!(
            "{operation}: converted {} bytes at {}\n",
            range.length(),
            range.first()
        ),
        json: json!({
            "operation": operation.name(),
            "start": range.first(),
            "length": range.length(),
            "written": output,
        }),
    })
}

// ============================================================================
// dump
// ============================================================================

pub fn run_dump(args: &DumpArgs) -> Result<CommandOutput> {
    if args.bytes_per_row == 0 {
        return Err(CliError::invalid("bytes-per-row must be at least 1"));
    }
    let bytes = std::fs::read(&args.input)?;
    let range = checked_range(Some(args.offset), args.length, bytes.len() as u64)?;
    let (start, end) = (
        usize::try_from(range.first()).map_err(|e| CliError::invalid(e.to_string()))?,
        usize::try_from(range.first() + range.length())
            .map_err(|e| CliError::invalid(e.to_string()))?,
    );
    let slice = &bytes[start..end];
    let layout = DumpLayout {
        code_type: args.code_type.into(),
        case: args.characters_case(),
        bytes_per_row: args.bytes_per_row,
    };
    let codes = layout.code_type.format_bytes(slice, layout.case);
    Ok(CommandOutput {
        text: dump::render(slice, range.first(), layout),
        json: json!({
            "offset": range.first(),
            "length": range.length(),
            "code_type": layout.code_type.name(),
            "codes": codes,
        }),
    })
}

// ============================================================================
// bookmarks
// ============================================================================

fn bookmark_json(record: &BookmarkRecord) -> Value {
    json!({
        "start": record.start_position,
        "length": record.length,
        "color": record.color.map(|c| c.to_string()),
    })
}

pub fn run_bookmarks(args: &BookmarksArgs) -> Result<CommandOutput> {
    let mut prefs = BookmarkPreferences::new(JsonFilePreferences::open(&args.prefs)?);
    let mut records = prefs.load_records();
    match &args.action {
        None | Some(BookmarkAction::List) => {}
        Some(BookmarkAction::Add {
            start,
            length,
            color,
        }) => {
            let color = color
                .as_deref()
                .map(|text| {
                    Rgb::from_hex(text)
                        .ok_or_else(|| CliError::invalid(format!("invalid colour {text:?}")))
                })
                .transpose()?;
            records.push(BookmarkRecord::new(*start, *length, color));
            prefs.save_records(&records)?;
        }
        Some(BookmarkAction::Remove { index }) => {
            if *index >= records.len() {
                return Err(CliError::invalid(format!(
                    "no bookmark at index {index} ({} stored)",
                    records.len()
                )));
            }
            records.remove(*index);
            prefs.save_records(&records)?;
        }
    }

    let mut text = String::new();
    for (i, record) in records.iter().enumerate() {
        let color = record.color.map(|c| c.to_string()).unwrap_or_default();
        let _ = writeln!(
            text,
            "{i:>3}  {:#x}+{}  {color}",
            record.start_position, record.length
        );
    }
    Ok(CommandOutput {
        text,
        json: json!({ "bookmarks": records.iter().map(bookmark_json).collect::<Vec<_>>() }),
    })
}
