use vmasm::assemble;
use vmobj::object::{Object, RELOC_ABS32};
use vmobj::section::Section;

fn case(src: &str) -> Object {
    assemble("test.vmasm", src).unwrap()
}

#[test]
fn smoke() {
    let obj = case("ldi r1, 0x2A\nhalt\n");
    assert_eq!(
        obj.text,
        vec![
            0x01, 0x01, 0x00, 0x00, 0x2A, 0x00, 0x00, 0x00, // ldi r1, 0x2A
            0x0F, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // halt
        ]
    );
    assert!(obj.data.is_empty());
    assert!(obj.symbols.is_empty());
    assert!(obj.relocs.is_empty());

    let blob = obj.to_bytes();
    assert_eq!(&blob[..8], &[0x46, 0x4F, 0x4D, 0x56, 0x02, 0x00, 0x00, 0x00]);
}

#[test]
fn label_and_branch() {
    let obj = case("L: beq r0, r0, L\n");
    assert_eq!(obj.text, vec![11, 0, 0, 0, 0, 0, 0, 0]);

    assert_eq!(obj.symbols.len(), 1);
    let sym = &obj.symbols[0];
    assert_eq!(sym.name, "L");
    assert_eq!(sym.section, Section::Text);
    assert_eq!(sym.value, 0);
    assert!(!sym.global);

    assert_eq!(obj.relocs.len(), 1);
    let rel = &obj.relocs[0];
    assert_eq!(rel.section, Section::Text);
    assert_eq!(rel.kind, RELOC_ABS32);
    assert_eq!(rel.offset, 4);
    assert_eq!(rel.name, "L");
}

#[test]
fn macro_invocation() {
    let obj = case(".macro INC 1\nadd $1, $1, $1\n.endm\nINC r3\n");
    assert_eq!(obj.text, vec![0x03, 0x03, 0x03, 0x03, 0x00, 0x00, 0x00, 0x00]);
}

#[test]
fn macro_directives_any_case() {
    let obj = case(".MACRO INC 1\nadd $1, $1, $1\n.ENDM\nINC r3\n");
    assert_eq!(obj.text, vec![0x03, 0x03, 0x03, 0x03, 0x00, 0x00, 0x00, 0x00]);
}

#[test]
fn data_relocation() {
    let obj = case(".data\nptr:\n.word main\n.text\nmain:\nhalt\n");

    let ptr = obj.symbols.iter().find(|s| s.name == "ptr").unwrap();
    assert_eq!((ptr.section, ptr.value), (Section::Data, 0));
    let main = obj.symbols.iter().find(|s| s.name == "main").unwrap();
    assert_eq!((main.section, main.value), (Section::Text, 0));

    assert_eq!(obj.relocs.len(), 1);
    let rel = &obj.relocs[0];
    assert_eq!(rel.section, Section::Data);
    assert_eq!(rel.kind, RELOC_ABS32);
    assert_eq!(rel.offset, 0);
    assert_eq!(rel.name, "main");

    // placeholder until the linker patches it
    assert_eq!(obj.data, vec![0, 0, 0, 0]);
}

#[test]
fn reserialization_is_byte_identical() {
    let src = "\
.global main
.data
ptr:
.word main
vals:
.byte 1, 2, 3
.text
main:
ldi r1, 5
loop:
beq r1, r0, done
sub r1, r1, r2
jmp loop
done:
halt
";
    let obj = case(src);
    let blob = obj.to_bytes();
    let back = Object::parse("test.vmasm", &blob).unwrap();
    assert_eq!(back.to_bytes(), blob);
}

#[test]
fn text_reloc_fields_lie_within_text() {
    let obj = case("start:\njmp fwd\nbeq r1, r2, fwd\ncall fwd\nfwd:\nhalt\n");
    for rel in obj.relocs.iter().filter(|r| r.section == Section::Text) {
        assert_eq!(rel.offset % 8, 4);
        assert!(rel.offset as usize + 4 <= obj.text.len());
    }
}

#[test]
fn symbol_values_within_sections() {
    let obj = case(".data\na:\n.byte 9\nb:\n.byte 9\n.text\nmain:\nhalt\nend:\nhalt\n");
    for sym in &obj.symbols {
        match sym.section {
            Section::Text => {
                assert_eq!(sym.value % 8, 0);
                assert!((sym.value as usize) < obj.text.len());
            }
            Section::Data => assert!((sym.value as usize) < obj.data.len()),
            Section::Undef => panic!("unexpected undef symbol"),
        }
    }
}

#[test]
fn undefined_global_becomes_undef_symbol() {
    let obj = case(".global helper\ncall helper\nhalt\n");
    let sym = obj.symbols.iter().find(|s| s.name == "helper").unwrap();
    assert_eq!(sym.section, Section::Undef);
    assert_eq!(sym.value, 0);
    assert!(sym.global);
}

#[test]
fn empty_source_is_legal() {
    let obj = case("");
    assert!(obj.text.is_empty());
    assert!(obj.data.is_empty());
    // all offsets still chain through the bare header
    assert!(Object::parse("empty", &obj.to_bytes()).is_ok());
}

#[test]
fn word_of_local_label_still_relocates() {
    let obj = case(".data\nself_ref:\n.word self_ref\n");
    assert_eq!(obj.relocs.len(), 1);
    assert_eq!(obj.relocs[0].name, "self_ref");
    assert_eq!(obj.data, vec![0, 0, 0, 0]);
}
