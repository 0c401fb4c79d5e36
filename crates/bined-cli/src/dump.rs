//! Row-oriented code dump.

use std::fmt::Write as _;

use bined_core::{CodeCharactersCase, CodeType};

/// Layout of a rendered dump.
#[derive(Debug, Clone, Copy)]
pub struct DumpLayout {
    pub code_type: CodeType,
    pub case: CodeCharactersCase,
    pub bytes_per_row: u64,
}

/// Render `bytes` as rows of `offset  codes  text`.
///
/// `base_offset` is the document position of the first byte. The text column
/// shows printable ASCII and `.` for everything else.
#[must_use]
pub fn render(bytes: &[u8], base_offset: u64, layout: DumpLayout) -> String {
    let per_row = usize::try_from(layout.bytes_per_row.max(1)).unwrap_or(16);
    let digits = layout.code_type.max_digits_for_byte() as usize;
    let codes_width = per_row * (digits + 1) - 1;
    let mut out = String::new();
    for (row, chunk) in bytes.chunks(per_row).enumerate() {
        let offset = base_offset + (row * per_row) as u64;
        let codes = layout.code_type.format_bytes(chunk, layout.case);
        let text: String = chunk
            .iter()
            .map(|&b| if (0x20..0x7f).contains(&b) { char::from(b) } else { '.' })
            .collect();
        let _ = writeln!(out, "{offset:08X}  {codes:<codes_width$}  {text}");
    }
    out
}
