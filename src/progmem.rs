use std::io::Write;

/// Name of the emitted array, fixed by the firmware that includes it.
const ARRAY_DECL: &str = "const uint8_t patches[] PROGMEM = {";

/// Writes `bytes` as a C array initializer, one `0xhh, ` token per line.
///
/// Nothing is written for an empty buffer, not even the brackets.
pub fn write_array<W: Write>(out: &mut W, bytes: &[u8]) -> std::io::Result<()> {
    if bytes.is_empty() {
        return Ok(());
    }

    writeln!(out, "{}", ARRAY_DECL)?;
    for b in bytes {
        writeln!(out, "0x{:02x}, ", b)?;
    }
    writeln!(out, "}};")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(bytes: &[u8]) -> String {
        let mut out = Vec::new();
        write_array(&mut out, bytes).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn empty_buffer_prints_nothing() {
        assert_eq!(render(&[]), "");
    }

    #[test]
    fn renders_declaration_and_tokens() {
        assert_eq!(
            render(&[0x00, 0xab, 0xff]),
            "const uint8_t patches[] PROGMEM = {\n0x00, \n0xab, \n0xff, \n};\n"
        );
    }

    #[test]
    fn every_token_is_two_lowercase_hex_digits() {
        let bytes: Vec<u8> = (0..=255).collect();
        let text = render(&bytes);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.first(), Some(&ARRAY_DECL));
        assert_eq!(lines.last(), Some(&"};"));

        let tokens = &lines[1..lines.len() - 1];
        assert_eq!(tokens.len(), 256);
        for (i, tok) in tokens.iter().enumerate() {
            assert_eq!(tok.len(), 6, "token {:?}", tok);
            assert!(tok.starts_with("0x"));
            assert!(tok.ends_with(", "));
            assert!(tok[2..4]
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
            assert_eq!(u8::from_str_radix(&tok[2..4], 16).unwrap(), i as u8);
        }
    }

    #[test]
    fn rendering_is_repeatable() {
        let bytes = [0x13, 0x37, 0x42];
        assert_eq!(render(&bytes), render(&bytes));
    }
}
