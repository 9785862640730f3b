use std::fmt::Write;

/// Hex dump, 16 bytes per row with an 8-digit offset column.
pub fn hexdump(bytes: &[u8]) -> String {
    let mut out = String::new();
    for (row, chunk) in bytes.chunks(16).enumerate() {
        let hexs = chunk
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(out, "{:08X}  {}", row * 16, hexs);
    }
    out
}
