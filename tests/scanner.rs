#[cfg(test)]
mod scanner_tests {
    use pretty_assertions::assert_eq;

    use rlox::scanner::*;
    use rlox::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source);
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    #[test]
    fn test_scanner_01_symbols() {
        assert_token_sequence(
            "({*.,+*})",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::STAR, "*"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn two_character_operators() {
        assert_token_sequence(
            "! != = == < <= > >= /",
            &[
                (TokenType::BANG, "!"),
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::EQUAL, "="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::LESS, "<"),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::GREATER, ">"),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::SLASH, "/"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_unexpected_chars_token_sequence() {
        let results: Vec<_> = Scanner::new(",.$(#").collect();

        // COMMA, DOT, error '$', LEFT_PAREN, error '#', EOF
        assert_eq!(results.len(), 6, "Expected 6 items in result");

        assert_token_matches(&results[0], TokenType::COMMA, ",");
        assert_token_matches(&results[1], TokenType::DOT, ".");
        assert_token_matches(&results[3], TokenType::LEFT_PAREN, "(");
        assert_token_matches(&results[5], TokenType::EOF, "");

        let errors: Vec<String> = results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .map(|e| e.to_string())
            .collect();

        assert_eq!(
            errors,
            vec![
                "[line 1] Error: Unexpected character: $".to_string(),
                "[line 1] Error: Unexpected character: #".to_string(),
            ]
        );

        fn assert_token_matches(
            result: &rlox::error::Result<Token>,
            expected_type: TokenType,
            expected_lexeme: &str,
        ) {
            match result {
                Ok(token) => {
                    assert_eq!(token.token_type, expected_type);
                    assert_eq!(token.lexeme, expected_lexeme);
                }
                Err(e) => panic!("Expected token but got error: {}", e),
            }
        }
    }

    #[test]
    fn non_ascii_character_is_skipped_whole() {
        let (tokens, errors) = scan("é;");

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "[line 1] Error: Unexpected character: é"
        );
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].token_type, TokenType::SEMICOLON);
    }

    #[test]
    fn numbers_need_a_digit_after_the_dot() {
        let (tokens, errors) = scan("123 45.67 8.");

        assert!(errors.is_empty());

        let kinds: Vec<&TokenType> = tokens.iter().map(|t| &t.token_type).collect();
        assert!(matches!(kinds[0], TokenType::NUMBER(n) if *n == 123.0));
        assert!(matches!(kinds[1], TokenType::NUMBER(n) if *n == 45.67));
        assert!(matches!(kinds[2], TokenType::NUMBER(n) if *n == 8.0));
        assert_eq!(tokens[2].lexeme, "8");
        assert_eq!(*kinds[3], TokenType::DOT);
        assert_eq!(*kinds[4], TokenType::EOF);
    }

    #[test]
    fn strings_may_span_lines() {
        let (tokens, errors) = scan("\"a\nb\" x");

        assert!(errors.is_empty());
        assert!(matches!(&tokens[0].token_type, TokenType::STRING(s) if s == "a\nb"));
        assert_eq!(tokens[0].lexeme, "\"a\nb\"");
        assert_eq!(tokens[1].token_type, TokenType::IDENTIFIER);
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn unterminated_string_is_reported_and_scanning_finishes() {
        let (tokens, errors) = scan("print \"abc");

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "[line 1] Error: Unterminated string.");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].token_type, TokenType::PRINT);
        assert_eq!(tokens[1].token_type, TokenType::EOF);
    }

    #[test]
    fn keywords_shadow_identifiers_only_on_exact_match() {
        assert_token_sequence(
            "and andy _x class1 nil super this",
            &[
                (TokenType::AND, "and"),
                (TokenType::IDENTIFIER, "andy"),
                (TokenType::IDENTIFIER, "_x"),
                (TokenType::IDENTIFIER, "class1"),
                (TokenType::NIL, "nil"),
                (TokenType::SUPER, "super"),
                (TokenType::THIS, "this"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn comments_are_skipped_and_lines_counted() {
        let (tokens, errors) = scan("// a comment\nprint // another\n1;");

        assert!(errors.is_empty());
        assert_eq!(tokens[0].token_type, TokenType::PRINT);
        assert_eq!(tokens[0].line, 2);
        assert_eq!(tokens[1].line, 3);
        assert_eq!(tokens.last().map(|t| t.line), Some(3));
    }

    #[test]
    fn exactly_one_eof_is_emitted() {
        let mut scanner = Scanner::new("");

        assert!(matches!(scanner.next(), Some(Ok(ref t)) if t.token_type == TokenType::EOF));
        assert!(scanner.next().is_none());
        assert!(scanner.next().is_none());
    }

    #[test]
    fn token_display_matches_tokenize_output() {
        let (tokens, _) = scan("3 \"hi\" x");

        assert_eq!(tokens[0].to_string(), "NUMBER 3 3.0");
        assert_eq!(tokens[1].to_string(), "STRING \"hi\" hi");
        assert_eq!(tokens[2].to_string(), "IDENTIFIER x null");
        assert_eq!(tokens[3].to_string(), "EOF  null");
    }
}
