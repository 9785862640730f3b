use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use vmobj::exec::Executable;
use vmobj::object::{Object, Symbol, RELOC_ABS32};
use vmobj::section::Section;

use crate::error::LinkError;

/// A resolved symbol in the merged layout.
#[derive(Debug, Clone)]
pub struct GlobalSym {
    pub section: Section,
    /// Absolute address: text blocks first, all data blocks after.
    pub addr: u32,
    pub global: bool,
    pub def_obj: usize,
}

/// Per-object placement of both sections in the merged image. Offsets index
/// the merged text/data buffers; a data symbol's absolute address adds the
/// total text length on top of its buffer offset.
struct Layout {
    text_off: Vec<u32>,
    data_off: Vec<u32>,
    total_text: u32,
}

impl Layout {
    /// Concatenation order equals input order; entry point and every
    /// absolute address depend on it.
    fn of(objs: &[Object]) -> Layout {
        let mut text_off = Vec::with_capacity(objs.len());
        let mut total_text = 0u32;
        for obj in objs {
            text_off.push(total_text);
            total_text += obj.text.len() as u32;
        }
        let mut data_off = Vec::with_capacity(objs.len());
        let mut total_data = 0u32;
        for obj in objs {
            data_off.push(total_data);
            total_data += obj.data.len() as u32;
        }
        Layout {
            text_off,
            data_off,
            total_text,
        }
    }

    fn addr_of(&self, oi: usize, sym: &Symbol) -> u32 {
        match sym.section {
            Section::Text => self.text_off[oi] + sym.value,
            _ => self.total_text + self.data_off[oi] + sym.value,
        }
    }
}

/// Merge the objects in input order, resolve every symbol, patch every
/// relocation and pick the entry point (`main` if defined, else 0).
pub fn link(objs: &[Object]) -> Result<Executable, LinkError> {
    let layout = Layout::of(objs);

    // global symbol table: every defined symbol, duplicates are fatal
    let mut gsym: IndexMap<&str, GlobalSym> = IndexMap::new();
    for (oi, obj) in objs.iter().enumerate() {
        for sym in &obj.symbols {
            if sym.section == Section::Undef {
                continue;
            }
            if let Some(old) = gsym.get(sym.name.as_str()) {
                return Err(LinkError::DuplicateSymbol(
                    sym.name.clone(),
                    objs[old.def_obj].path.clone(),
                    obj.path.clone(),
                ));
            }
            gsym.insert(
                sym.name.as_str(),
                GlobalSym {
                    section: sym.section,
                    addr: layout.addr_of(oi, sym),
                    global: sym.global,
                    def_obj: oi,
                },
            );
        }
    }

    // every name referenced by a relocation or an Undef symbol entry must
    // resolve; report the full list at once
    let mut referenced: IndexSet<&str> = IndexSet::new();
    for obj in objs {
        for rel in &obj.relocs {
            referenced.insert(rel.name.as_str());
        }
        for sym in &obj.symbols {
            if sym.section == Section::Undef {
                referenced.insert(sym.name.as_str());
            }
        }
    }
    let undefined: Vec<&str> = referenced
        .iter()
        .copied()
        .filter(|name| !gsym.contains_key(name))
        .collect();
    if !undefined.is_empty() {
        return Err(LinkError::UndefinedSymbols(undefined.iter().join(" ")));
    }

    // merge sections
    let mut text = Vec::with_capacity(layout.total_text as usize);
    for obj in objs {
        text.extend_from_slice(&obj.text);
    }
    let mut data = Vec::new();
    for obj in objs {
        data.extend_from_slice(&obj.data);
    }

    // apply relocations: absolute address, little-endian, 4 bytes
    for (oi, obj) in objs.iter().enumerate() {
        for rel in &obj.relocs {
            let addr = gsym
                .get(rel.name.as_str())
                .map(|g| g.addr)
                .ok_or_else(|| LinkError::SymbolNotFound(rel.name.clone()))?;
            let (buf, base) = match rel.section {
                Section::Text => (&mut text, layout.text_off[oi]),
                Section::Data => (&mut data, layout.data_off[oi]),
                Section::Undef => return Err(LinkError::BadRelocSection(obj.path.clone())),
            };
            let at = (base + rel.offset) as usize;
            if at + 4 > buf.len() {
                return Err(LinkError::RelocOutOfRange(
                    obj.path.clone(),
                    rel.name.clone(),
                ));
            }
            if rel.kind != RELOC_ABS32 {
                return Err(LinkError::UnsupportedRelocType(rel.kind, obj.path.clone()));
            }
            buf[at..at + 4].copy_from_slice(&addr.to_le_bytes());
        }
    }

    let entry = gsym.get("main").map(|g| g.addr).unwrap_or(0);

    // executable symbol table: all defined symbols, marked global; the
    // section is recovered from the address alone
    let symbols = gsym
        .iter()
        .map(|(name, g)| Symbol {
            name: name.to_string(),
            section: if g.addr >= layout.total_text {
                Section::Data
            } else {
                Section::Text
            },
            value: g.addr,
            global: true,
        })
        .collect();

    Ok(Executable {
        text,
        data,
        symbols,
        entry,
    })
}
