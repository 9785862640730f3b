use std::fmt::Write;
use thiserror::Error;
use vmobj::error::FormatError;
use vmobj::exec::Executable;

pub const MEM_SIZE: usize = 65536;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("Program does not fit in memory: {0} bytes")]
    TooLarge(usize),

    #[error("Failed to read file: {0}")]
    FileRead(String, #[source] std::io::Error),
}

/// Flat memory image prepared for execution: text copied to address 0,
/// data directly after it, `pc` pointing at the entry.
pub struct Image {
    pub mem: Vec<u8>,
    pub pc: u32,
    pub text_size: usize,
    pub data_size: usize,
}

impl Image {
    pub fn load(exe: &Executable) -> Result<Image, LoadError> {
        let used = exe.text.len() + exe.data.len();
        if used > MEM_SIZE {
            return Err(LoadError::TooLarge(used));
        }
        let mut mem = vec![0u8; MEM_SIZE];
        mem[..exe.text.len()].copy_from_slice(&exe.text);
        mem[exe.text.len()..used].copy_from_slice(&exe.data);
        Ok(Image {
            mem,
            pc: exe.entry,
            text_size: exe.text.len(),
            data_size: exe.data.len(),
        })
    }

    pub fn load_file(path: &str) -> Result<Image, LoadError> {
        let raw =
            std::fs::read(path).map_err(|e| LoadError::FileRead(path.to_string(), e))?;
        let exe = Executable::parse(path, &raw)?;
        Image::load(&exe)
    }

    /// Dump `len` bytes starting at `start`, 16 per row.
    pub fn dump(&self, start: usize, len: usize) -> String {
        let end = (start + len).min(self.mem.len());
        let mut out = String::new();
        for (row, chunk) in self.mem[start..end].chunks(16).enumerate() {
            let _ = write!(out, "{:04X}: ", start + row * 16);
            let hexs = chunk
                .iter()
                .map(|b| format!("{b:02X}"))
                .collect::<Vec<_>>()
                .join(" ");
            out.push_str(&hexs);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vmobj::section::Section;

    fn exe() -> Executable {
        Executable {
            text: vec![0x0F, 0, 0, 0, 0, 0, 0, 0],
            data: vec![0xAA, 0xBB],
            symbols: vec![vmobj::object::Symbol {
                name: "main".to_string(),
                section: Section::Text,
                value: 0,
                global: true,
            }],
            entry: 0,
        }
    }

    #[test]
    fn sections_land_back_to_back() {
        let img = Image::load(&exe()).unwrap();
        assert_eq!(img.mem.len(), MEM_SIZE);
        assert_eq!(&img.mem[..8], &[0x0F, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(&img.mem[8..10], &[0xAA, 0xBB]);
        assert_eq!(img.mem[10], 0);
        assert_eq!(img.pc, 0);
    }

    #[test]
    fn entry_becomes_pc() {
        let mut e = exe();
        e.entry = 8;
        assert_eq!(Image::load(&e).unwrap().pc, 8);
    }

    #[test]
    fn oversized_program_is_rejected() {
        let mut e = exe();
        e.data = vec![0; MEM_SIZE];
        assert!(matches!(Image::load(&e), Err(LoadError::TooLarge(_))));
    }

    #[test]
    fn dump_rows() {
        let img = Image::load(&exe()).unwrap();
        let out = img.dump(0, 10);
        assert_eq!(out, "0000: 0F 00 00 00 00 00 00 00 AA BB\n");
    }
}
