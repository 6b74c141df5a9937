//! Illustrative machine-code listing.
//!
//! THIS IS NOT AN ENCODER. Real x86-64 encoding depends on operand kinds,
//! REX prefixes, and ModRM bytes; this module only looks up a
//! representative opcode byte sequence per mnemonic so the listing can
//! show roughly what the assembler would produce. It exists for display
//! purposes only.

/// Representative opcode bytes per mnemonic.
fn opcode_bytes(mnemonic: &str) -> Option<&'static str> {
    let bytes = match mnemonic {
        "movq" => "48 89",
        "movzbq" => "48 0F B6",
        "leaq" => "48 8D",
        "addq" => "48 01",
        "subq" => "48 29",
        "imulq" => "48 0F AF",
        "idivq" => "48 F7",
        "cqo" => "48 99",
        "negq" => "48 F7 D8",
        "andq" => "48 21",
        "orq" => "48 09",
        "cmpq" => "48 39",
        "sete" => "0F 94",
        "setne" => "0F 95",
        "setl" => "0F 9C",
        "setg" => "0F 9F",
        "setle" => "0F 9E",
        "setge" => "0F 9D",
        "pushq" => "55",
        "popq" => "5D",
        "ret" => "C3",
        "call" => "E8",
        "jmp" => "E9",
        "je" => "0F 84",
        "syscall" => "0F 05",
        _ => return None,
    };
    Some(bytes)
}

/// Annotates an assembly listing with representative opcode bytes.
///
/// Labels pass through unchanged; directives, comments, and blank lines
/// are dropped; unknown mnemonics get a `??` placeholder.
pub fn annotate_machine_code(assembly: &str) -> String {
    let mut out = String::new();

    for raw in assembly.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('.') || line.starts_with('#') {
            continue;
        }
        if line.ends_with(':') {
            out.push_str(line);
            out.push('\n');
            continue;
        }

        let mnemonic = line.split_whitespace().next().unwrap_or_default();
        let bytes = opcode_bytes(mnemonic).unwrap_or("??");
        out.push_str(&format!("{:<12} {}\n", bytes, line));
    }

    out
}
