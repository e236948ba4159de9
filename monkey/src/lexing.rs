use std::fmt::Display;

use regex::Regex;


/// Enumerates all the different kinds of tokens in the Monkey language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Illegal,
    Eof,

    Ident,
    Int,
    String,

    Assign,
    Plus,
    Minus,
    Bang,
    Asterisk,
    Slash,
    Less,
    Greater,
    DoubleEq,
    ExclamEq,
    Question,

    Comma,
    SemiColon,
    Colon,
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,

    Function,
    Let,
    True,
    False,
    If,
    Else,
    Return,
    Null,
}

// These names appear verbatim in parse error messages.
impl Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Illegal => "ILLEGAL",
            Self::Eof => "EOF",
            Self::Ident => "IDENT",
            Self::Int => "INT",
            Self::String => "STRING",
            Self::Assign => "=",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Bang => "!",
            Self::Asterisk => "*",
            Self::Slash => "/",
            Self::Less => "<",
            Self::Greater => ">",
            Self::DoubleEq => "==",
            Self::ExclamEq => "!=",
            Self::Question => "?",
            Self::Comma => ",",
            Self::SemiColon => ";",
            Self::Colon => ":",
            Self::OpenParen => "(",
            Self::CloseParen => ")",
            Self::OpenBrace => "{",
            Self::CloseBrace => "}",
            Self::OpenBracket => "[",
            Self::CloseBracket => "]",
            Self::Function => "FUNCTION",
            Self::Let => "LET",
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::If => "IF",
            Self::Else => "ELSE",
            Self::Return => "RETURN",
            Self::Null => "NULL",
        })
    }
}

impl TokenType {
    /// Map a name to its keyword token type, or [`TokenType::Ident`] if it
    /// isn't a keyword.
    pub fn lookup(name: &str) -> TokenType {
        match name {
            "fn" => Self::Function,
            "let" => Self::Let,
            "true" => Self::True,
            "false" => Self::False,
            "if" => Self::If,
            "else" => Self::Else,
            "return" => Self::Return,
            "null" => Self::Null,
            _ => Self::Ident,
        }
    }
}


/// A token is a token type together with the slice of source code it was
/// read from. For string literals, the slice excludes the quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenType,
    pub literal: &'a str,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenType, literal: &'a str) -> Token<'a> {
        Token { kind, literal }
    }
}


lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"^[ \t\r\n]*").unwrap();
    static ref NAME: Regex = Regex::new(r"^[[:alpha:]_][[:alnum:]_]*").unwrap();
    static ref DIGITS: Regex = Regex::new(r"^[[:digit:]]+").unwrap();
    static ref STRING: Regex = Regex::new(r#"^"([^"]*)"?"#).unwrap();
}


/// The lexer is a cheap, copyable cursor into the source code. Each call to
/// [`Lexer::next_token`] consumes one token and returns the advanced cursor.
#[derive(Clone, Copy)]
pub struct Lexer<'a> {
    code: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(code: &'a str) -> Lexer<'a> {
        Lexer { code }
    }

    fn peek(&self) -> Option<char> {
        self.code.chars().next()
    }

    fn satisfies_at(&self, i: usize, f: impl FnOnce(char) -> bool) -> bool {
        self.code.chars().nth(i).is_some_and(f)
    }

    fn skip(self, offset: usize) -> Self {
        Lexer { code: &self.code[offset..] }
    }

    fn skip_tag(self, offset: usize, kind: TokenType) -> (Self, Token<'a>) {
        let tok = Token::new(kind, &self.code[..offset]);
        (self.skip(offset), tok)
    }

    fn traverse(self, regex: &Regex, kind: TokenType) -> (Self, Token<'a>) {
        // Callers only traverse after checking the first character, so every
        // regex matches at least one character here.
        let end = regex.find(self.code).map_or(1, |m| m.end());
        self.skip_tag(end, kind)
    }

    fn skip_whitespace(self) -> Self {
        let end = WHITESPACE.find(self.code).map_or(0, |m| m.end());
        self.skip(end)
    }

    fn next_name(self) -> (Self, Token<'a>) {
        let (lex, tok) = self.traverse(&NAME, TokenType::Ident);
        (lex, Token::new(TokenType::lookup(tok.literal), tok.literal))
    }

    fn next_string(self) -> (Self, Token<'a>) {
        match STRING.captures(self.code) {
            Some(caps) => {
                let end = caps.get(0).map_or(1, |m| m.end());
                let literal = caps.get(1).map_or("", |m| m.as_str());
                (self.skip(end), Token::new(TokenType::String, literal))
            }
            None => self.skip_tag(1, TokenType::Illegal),
        }
    }

    /// Read the next token. At end of input this returns an EOF token and
    /// leaves the cursor where it is.
    pub fn next_token(mut self) -> (Self, Token<'a>) {
        self = self.skip_whitespace();

        match self.peek() {
            None => (self, Token::new(TokenType::Eof, "")),

            Some(c) if c.is_ascii_alphabetic() || c == '_' => self.next_name(),
            Some(c) if c.is_ascii_digit() => self.traverse(&DIGITS, TokenType::Int),
            Some('"') => self.next_string(),

            Some('=') if self.satisfies_at(1, |x| x == '=') => self.skip_tag(2, TokenType::DoubleEq),
            Some('!') if self.satisfies_at(1, |x| x == '=') => self.skip_tag(2, TokenType::ExclamEq),

            Some('=') => self.skip_tag(1, TokenType::Assign),
            Some('+') => self.skip_tag(1, TokenType::Plus),
            Some('-') => self.skip_tag(1, TokenType::Minus),
            Some('!') => self.skip_tag(1, TokenType::Bang),
            Some('*') => self.skip_tag(1, TokenType::Asterisk),
            Some('/') => self.skip_tag(1, TokenType::Slash),
            Some('<') => self.skip_tag(1, TokenType::Less),
            Some('>') => self.skip_tag(1, TokenType::Greater),
            Some('?') => self.skip_tag(1, TokenType::Question),
            Some(',') => self.skip_tag(1, TokenType::Comma),
            Some(';') => self.skip_tag(1, TokenType::SemiColon),
            Some(':') => self.skip_tag(1, TokenType::Colon),
            Some('(') => self.skip_tag(1, TokenType::OpenParen),
            Some(')') => self.skip_tag(1, TokenType::CloseParen),
            Some('{') => self.skip_tag(1, TokenType::OpenBrace),
            Some('}') => self.skip_tag(1, TokenType::CloseBrace),
            Some('[') => self.skip_tag(1, TokenType::OpenBracket),
            Some(']') => self.skip_tag(1, TokenType::CloseBracket),

            Some(c) => self.skip_tag(c.len_utf8(), TokenType::Illegal),
        }
    }
}


/// Convert source code to a sequence of tokens. This never fails: unknown
/// characters become [`TokenType::Illegal`] tokens, and the sequence always
/// ends with exactly one [`TokenType::Eof`] token.
pub fn tokenize(code: &str) -> Vec<Token<'_>> {
    let mut lexer = Lexer::new(code);
    let mut tokens = Vec::new();

    loop {
        let (next, tok) = lexer.next_token();
        lexer = next;
        tokens.push(tok);
        if tok.kind == TokenType::Eof {
            break;
        }
    }

    tokens
}
