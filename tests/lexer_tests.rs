use ruscript::lexer::{Lexer, TokenKind};
use ruscript::ErrorKind;

fn kinds_of(input: &str) -> Vec<TokenKind> {
    let mut lexer = Lexer::new(input);
    let mut kinds = Vec::new();
    while lexer.tk != TokenKind::Eof {
        kinds.push(lexer.tk);
        lexer.advance();
    }
    kinds
}

#[test]
fn lex_identifiers_and_keywords() {
    let mut lexer = Lexer::new("var foo = true;");
    assert_eq!(lexer.tk, TokenKind::Var);
    lexer.advance();
    assert_eq!(lexer.tk, TokenKind::Id);
    assert_eq!(lexer.tk_str, "foo");
    lexer.advance();
    assert_eq!(lexer.tk, TokenKind::Char(b'='));
    lexer.advance();
    assert_eq!(lexer.tk, TokenKind::True);
    lexer.advance();
    assert_eq!(lexer.tk, TokenKind::Char(b';'));
    lexer.advance();
    assert_eq!(lexer.tk, TokenKind::Eof);
}

#[test]
fn lex_all_reserved_words() {
    let kinds = kinds_of("if else do while for break continue function return var true false null undefined new");
    assert_eq!(
        kinds,
        vec![
            TokenKind::If,
            TokenKind::Else,
            TokenKind::Do,
            TokenKind::While,
            TokenKind::For,
            TokenKind::Break,
            TokenKind::Continue,
            TokenKind::Function,
            TokenKind::Return,
            TokenKind::Var,
            TokenKind::True,
            TokenKind::False,
            TokenKind::Null,
            TokenKind::Undefined,
            TokenKind::New,
        ]
    );
}

#[test]
fn lex_compound_operators() {
    let kinds = kinds_of("== === != !== <= << <<= >= >> >>> >>= += -= ++ -- &= && |= || ^=");
    assert_eq!(
        kinds,
        vec![
            TokenKind::Equal,
            TokenKind::TypeEqual,
            TokenKind::NotEqual,
            TokenKind::NotTypeEqual,
            TokenKind::LessEqual,
            TokenKind::LShift,
            TokenKind::LShiftEqual,
            TokenKind::GreaterEqual,
            TokenKind::RShift,
            TokenKind::RShiftUnsigned,
            TokenKind::RShiftEqual,
            TokenKind::PlusEqual,
            TokenKind::MinusEqual,
            TokenKind::PlusPlus,
            TokenKind::MinusMinus,
            TokenKind::AndEqual,
            TokenKind::AndAnd,
            TokenKind::OrEqual,
            TokenKind::OrOr,
            TokenKind::XorEqual,
        ]
    );
}

#[test]
fn lex_single_char_tokens() {
    let kinds = kinds_of("{ } ( ) [ ] ; , . ? : < > ! * / % & | ^");
    for kind in kinds {
        assert!(matches!(kind, TokenKind::Char(_)));
    }
}

#[test]
fn lex_numbers() {
    let mut lexer = Lexer::new("42 0xFF 0377 3.14 2e3 1.5e-2");
    let mut tokens = Vec::new();
    while lexer.tk != TokenKind::Eof {
        tokens.push((lexer.tk, lexer.tk_str.clone()));
        lexer.advance();
    }
    assert_eq!(
        tokens,
        vec![
            (TokenKind::Int, "42".to_string()),
            (TokenKind::Int, "0xFF".to_string()),
            (TokenKind::Int, "0377".to_string()),
            (TokenKind::Float, "3.14".to_string()),
            (TokenKind::Float, "2e3".to_string()),
            (TokenKind::Float, "1.5e-2".to_string()),
        ]
    );
}

#[test]
fn lex_double_quoted_string_escapes() {
    let lexer = Lexer::new(r#""a\nb\"c\\d""#);
    assert_eq!(lexer.tk, TokenKind::Str);
    assert_eq!(lexer.tk_str, "a\nb\"c\\d");
}

#[test]
fn lex_unknown_escape_yields_the_character() {
    let lexer = Lexer::new(r#""a\qb""#);
    assert_eq!(lexer.tk_str, "aqb");
}

#[test]
fn lex_single_quoted_string_escapes() {
    let lexer = Lexer::new(r"'\x41\101\t\a'");
    assert_eq!(lexer.tk, TokenKind::Str);
    assert_eq!(lexer.tk_str, "AA\t\x07");
}

#[test]
fn lex_skips_comments() {
    let kinds = kinds_of("a // line comment\n b /* block\ncomment */ c");
    assert_eq!(kinds, vec![TokenKind::Id, TokenKind::Id, TokenKind::Id]);
}

#[test]
fn position_reports_line_and_column() {
    let mut lexer = Lexer::new("foo bar");
    lexer.advance();
    assert_eq!(lexer.tk_str, "bar");
    assert_eq!(lexer.position(Some(lexer.token_start)), "(line: 1, col: 5)");
}

#[test]
fn position_counts_lines() {
    let mut lexer = Lexer::new("foo\nbar");
    lexer.advance();
    assert_eq!(lexer.tk_str, "bar");
    assert!(lexer.position(Some(lexer.token_start)).starts_with("(line: 2,"));
}

#[test]
fn sub_string_excludes_trailing_whitespace() {
    let mut lexer = Lexer::new("foo bar baz");
    lexer.advance();
    let start = lexer.token_start;
    lexer.advance();
    // current token is baz; capture covers up to the end of bar
    assert_eq!(lexer.get_sub_string(start), "bar");
}

#[test]
fn sub_lexer_replays_a_range() {
    let mut lexer = Lexer::new("1 + 2 ;");
    let start = lexer.token_start;
    while lexer.tk != TokenKind::Char(b';') {
        lexer.advance();
    }
    let mut sub = lexer.get_sub_lex(start);
    let mut kinds = Vec::new();
    while sub.tk != TokenKind::Eof {
        kinds.push(sub.tk);
        sub.advance();
    }
    assert_eq!(
        kinds,
        vec![
            TokenKind::Int,
            TokenKind::Char(b'+'),
            TokenKind::Int,
        ]
    );
    // a reset starts the same range over
    sub.reset();
    assert_eq!(sub.tk, TokenKind::Int);
    assert_eq!(sub.tk_str, "1");
}

#[test]
fn match_token_reports_both_tokens() {
    let mut lexer = Lexer::new("foo");
    let err = lexer.match_token(TokenKind::Int).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Syntax);
    assert!(err.message.contains("Got ID expected INT"));
    assert!(err.message.contains("(line: 1, col: 1)"));
}

#[test]
fn match_token_advances_on_success() {
    let mut lexer = Lexer::new("foo bar");
    lexer.match_token(TokenKind::Id).unwrap();
    assert_eq!(lexer.tk_str, "bar");
}
