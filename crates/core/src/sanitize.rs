/// Strips characters that could smuggle markup or template syntax into
/// prompts, stored records, or the rendered chat page.
pub fn sanitize_input(input: &str) -> String {
    input
        .chars()
        .filter(|character| !matches!(character, '<' | '>' | '\\' | '{' | '}' | '[' | ']' | '^' | '`'))
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::sanitize_input;

    #[test]
    fn strips_markup_characters_and_trims() {
        assert_eq!(sanitize_input("  <b>olá</b> {x} [y] ^`\\  "), "bolá/b x y");
    }

    #[test]
    fn leaves_accented_text_untouched() {
        assert_eq!(sanitize_input("Orçamento para aplicação média"), "Orçamento para aplicação média");
    }
}
