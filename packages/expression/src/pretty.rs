use crate::error::ParseError;

/// Pretty-print a parse error with source context using ariadne
pub fn format_parse_error(source: &str, name: &str, error: &ParseError) -> String {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let start = error.pos().min(source.len());
    let end = (start + 1).min(source.len()).max(start);

    let label = match error {
        ParseError::UnexpectedToken { expected, .. } => format!("expected {}", expected),
        ParseError::UnexpectedEof { .. } => "expression ends here".to_string(),
        ParseError::InvalidSyntax { message, .. } => message.clone(),
        ParseError::LexerError { .. } => "unexpected character".to_string(),
    };

    let mut output = Vec::new();
    let written = Report::build(ReportKind::Error, name, start)
        .with_message(error.to_string())
        .with_label(
            Label::new((name, start..end))
                .with_color(Color::Red)
                .with_message(label),
        )
        .finish()
        .write((name, Source::from(source)), &mut output);

    match written {
        Ok(()) => String::from_utf8(output).unwrap_or_else(|_| error.to_string()),
        Err(_) => error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn test_format_mentions_message() {
        let source = "items +";
        let err = parse(source).unwrap_err();
        let formatted = format_parse_error(source, "condition", &err);
        assert!(formatted.contains("Unexpected end of expression"));
    }
}
