use nom::{
    IResult, Parser as NomParser, Err as NomError,
    branch::alt,
    combinator::{map, opt},
    error::{ErrorKind, ParseError},
    multi::many0,
    sequence::{preceded, tuple},
};

use crate::ast::{Block, Expr, Program, Statement};
use crate::error::SyntaxError;
use crate::lexing::{tokenize, Token, TokenType};
use crate::types::{BinOp, Key, UnOp};


type In<'a> = &'a [Token<'a>];
type Out<'a, T> = IResult<In<'a>, T, SyntaxError>;

trait Parser<'a, T>: NomParser<In<'a>, T, SyntaxError> {}
impl<'a, T, P> Parser<'a, T> for P where P: NomParser<In<'a>, T, SyntaxError> {}


/// The type of the next token. The token stream always ends with EOF, so an
/// exhausted stream also reports EOF.
fn peek(input: In<'_>) -> TokenType {
    input.first().map_or(TokenType::Eof, |tok| tok.kind)
}

impl<'a> ParseError<In<'a>> for SyntaxError {
    fn from_error_kind(input: In<'a>, _: ErrorKind) -> Self {
        SyntaxError::Unexpected(peek(input))
    }

    fn append(_: In<'a>, _: ErrorKind, other: Self) -> Self {
        other
    }
}


/// Convert errors to failures, reporting that a specific token was expected.
///
/// Failures are not recoverable by alternatives, so this should be used
/// whenever the preceding input has committed the parser to a production.
fn expect<'a, O>(
    mut parser: impl Parser<'a, O>,
    expected: TokenType,
) -> impl Parser<'a, O> {
    move |input: In<'a>| {
        parser.parse(input).map_err(|err| match err {
            NomError::Error(_) => NomError::Failure(SyntaxError::Expected {
                expected,
                found: peek(input),
            }),
            _ => err,
        })
    }
}


/// Convert errors to failures, reporting that the next token can't start an
/// expression.
fn required<'a, O>(
    mut parser: impl Parser<'a, O>,
) -> impl Parser<'a, O> {
    move |input: In<'a>| {
        parser.parse(input).map_err(|err| match err {
            NomError::Error(_) => NomError::Failure(SyntaxError::NoPrefix(peek(input))),
            _ => err,
        })
    }
}


/// Separated list with delimiters and no trailing separator.
///
/// The opening delimiter is allowed to fail normally. Once it has matched,
/// every other mismatch is a failure.
fn seplist<'a, Item, ItemR>(
    open: TokenType,
    mut item: Item,
    close: TokenType,
) -> impl Parser<'a, Vec<ItemR>>
where
    Item: Parser<'a, ItemR>,
{
    move |input: In<'a>| {
        let (mut i, _) = token(open).parse(input)?;
        let mut items = Vec::new();

        if peek(i) == close {
            return Ok((&i[1..], items));
        }

        loop {
            let (j, it) = item.parse(i)?;
            items.push(it);
            i = j;

            match peek(i) {
                TokenType::Comma => { i = &i[1..]; }
                kind if kind == close => return Ok((&i[1..], items)),
                found => return Err(NomError::Failure(SyntaxError::Expected {
                    expected: close,
                    found,
                })),
            }
        }
    }
}


fn token<'a>(kind: TokenType) -> impl Parser<'a, Token<'a>> {
    move |input: In<'a>| match input.split_first() {
        Some((tok, rest)) if tok.kind == kind => Ok((rest, *tok)),
        _ => Err(NomError::Error(SyntaxError::Expected {
            expected: kind,
            found: peek(input),
        })),
    }
}


macro_rules! tok {
    ($pname:ident, $toktype:ident) => {
        fn $pname<'a>(input: In<'a>) -> Out<'a, Token<'a>> {
            token(TokenType::$toktype).parse(input)
        }
    };
}


tok!{assign, Assign}
tok!{asterisk, Asterisk}
tok!{bang, Bang}
tok!{close_paren, CloseParen}
tok!{colon, Colon}
tok!{double_eq, DoubleEq}
tok!{exclam_eq, ExclamEq}
tok!{greater, Greater}
tok!{less, Less}
tok!{minus, Minus}
tok!{open_paren, OpenParen}
tok!{plus, Plus}
tok!{question, Question}
tok!{semicolon, SemiColon}
tok!{slash, Slash}

tok!{kw_else, Else}
tok!{kw_false, False}
tok!{kw_fn, Function}
tok!{kw_if, If}
tok!{kw_let, Let}
tok!{kw_null, Null}
tok!{kw_return, Return}
tok!{kw_true, True}


/// Matches an identifier.
fn identifier<'a>(input: In<'a>) -> Out<'a, Key> {
    map(token(TokenType::Ident), |tok| Key::new(tok.literal)).parse(input)
}


/// Matches an integer literal. Literals that overflow 64 bits are failures.
fn integer<'a>(input: In<'a>) -> Out<'a, Expr> {
    let (rest, tok) = token(TokenType::Int).parse(input)?;
    tok.literal.parse::<i64>().map_or_else(
        |_| Err(NomError::Failure(SyntaxError::Integer(tok.literal.to_owned()))),
        |value| Ok((rest, Expr::Integer(value))),
    )
}


/// Matches any atomic (non-divisible) expression.
fn atomic<'a>(input: In<'a>) -> Out<'a, Expr> {
    alt((
        map(identifier, Expr::Identifier),
        integer,
        map(token(TokenType::String), |tok| Expr::String(tok.literal.to_owned())),
        map(kw_true, |_| Expr::Boolean(true)),
        map(kw_false, |_| Expr::Boolean(false)),
        map(kw_null, |_| Expr::Null),
    ))(input)
}


/// Matches a parenthesized expression.
fn paren<'a>(input: In<'a>) -> Out<'a, Expr> {
    map(
        tuple((
            open_paren,
            required(expression),
            expect(close_paren, TokenType::CloseParen),
        )),
        |(_, expr, _)| expr,
    )(input)
}


/// Matches an array literal: a bracketed, comma-separated list of expressions.
fn array<'a>(input: In<'a>) -> Out<'a, Expr> {
    map(
        seplist(TokenType::OpenBracket, required(expression), TokenType::CloseBracket),
        Expr::Array,
    ).parse(input)
}


/// Matches a hash literal: a braced, comma-separated list of `key: value`
/// pairs, where both keys and values are arbitrary expressions.
fn hash<'a>(input: In<'a>) -> Out<'a, Expr> {
    map(
        seplist(
            TokenType::OpenBrace,
            map(
                tuple((
                    required(expression),
                    expect(colon, TokenType::Colon),
                    required(expression),
                )),
                |(key, _, value)| (key, value),
            ),
            TokenType::CloseBrace,
        ),
        Expr::Hash,
    ).parse(input)
}


/// Matches a braced block of statements.
///
/// Stray semicolons between statements are ignored.
fn block<'a>(input: In<'a>) -> Out<'a, Block> {
    let (mut i, _) = token(TokenType::OpenBrace).parse(input)?;
    let mut statements = Vec::new();

    loop {
        match peek(i) {
            TokenType::CloseBrace => return Ok((&i[1..], Block::new(statements))),
            TokenType::SemiColon => { i = &i[1..]; }
            TokenType::Eof => return Err(NomError::Failure(SyntaxError::Expected {
                expected: TokenType::CloseBrace,
                found: TokenType::Eof,
            })),
            _ => {
                let (j, stmt) = statement(i)?;
                statements.push(stmt);
                i = j;
            }
        }
    }
}


/// Matches a conditional: `if (condition) { ... }`, optionally followed by
/// `else { ... }`.
fn branch<'a>(input: In<'a>) -> Out<'a, Expr> {
    map(
        tuple((
            kw_if,
            expect(open_paren, TokenType::OpenParen),
            required(expression),
            expect(close_paren, TokenType::CloseParen),
            expect(block, TokenType::OpenBrace),
            opt(preceded(kw_else, expect(block, TokenType::OpenBrace))),
        )),
        |(_, _, condition, _, consequence, alternative)| Expr::If {
            condition: Box::new(condition),
            consequence,
            alternative,
        },
    )(input)
}


/// Matches a function literal: `fn(x, y) { ... }`.
fn function<'a>(input: In<'a>) -> Out<'a, Expr> {
    map(
        preceded(
            kw_fn,
            tuple((
                expect(
                    seplist(TokenType::OpenParen, expect(identifier, TokenType::Ident), TokenType::CloseParen),
                    TokenType::OpenParen,
                ),
                expect(block, TokenType::OpenBrace),
            )),
        ),
        |(parameters, body)| Expr::function(parameters, body),
    )(input)
}


/// Matches an expression that can be an operand of a postfix operator.
fn postfixable<'a>(input: In<'a>) -> Out<'a, Expr> {
    alt((
        atomic,
        paren,
        array,
        hash,
        branch,
        function,
    ))(input)
}


/// A postfix operator, waiting for its operand.
enum Postfix {
    Call(Vec<Expr>),
    Index(Expr),
}


/// Matches a function call operator: a parenthesized argument list.
fn function_call<'a>(input: In<'a>) -> Out<'a, Postfix> {
    map(
        seplist(TokenType::OpenParen, required(expression), TokenType::CloseParen),
        Postfix::Call,
    ).parse(input)
}


/// Matches a subscripting operator: an expression in brackets.
fn object_index<'a>(input: In<'a>) -> Out<'a, Postfix> {
    map(
        tuple((
            token(TokenType::OpenBracket),
            required(expression),
            expect(token(TokenType::CloseBracket), TokenType::CloseBracket),
        )),
        |(_, expr, _)| Postfix::Index(expr),
    )(input)
}


/// Matches an operand followed by an arbitrary sequence of calls and
/// subscripts. These bind tighter than any prefix or infix operator.
fn postfixed<'a>(input: In<'a>) -> Out<'a, Expr> {
    map(
        tuple((
            postfixable,
            many0(alt((function_call, object_index))),
        )),
        |(expr, ops)| {
            ops.into_iter().fold(expr, |expr, op| match op {
                Postfix::Call(arguments) => Expr::call(expr, arguments),
                Postfix::Index(index) => Expr::index(expr, index),
            })
        },
    )(input)
}


/// Matches any prefixed operator expression.
fn prefixed<'a>(input: In<'a>) -> Out<'a, Expr> {
    alt((
        map(
            tuple((
                alt((
                    map(bang, |_| UnOp::LogicalNegate),
                    map(minus, |_| UnOp::ArithmeticalNegate),
                )),
                required(prefixed),
            )),
            |(operator, operand)| Expr::prefix(operator, operand),
        ),
        postfixed,
    ))(input)
}


/// Utility parser for matching a sequence of left-associative operators with
/// symmetric operands.
fn lbinop<'a>(
    operators: impl Parser<'a, BinOp>,
    operands: impl Parser<'a, Expr> + Copy,
) -> impl Parser<'a, Expr> {
    map(
        tuple((
            operands,
            many0(tuple((operators, required(operands)))),
        )),
        |(first, rest)| {
            rest.into_iter().fold(first, |left, (operator, right)| Expr::infix(left, operator, right))
        },
    )
}


/// Matches the multiplication precedence level.
fn product<'a>(input: In<'a>) -> Out<'a, Expr> {
    lbinop(
        alt((
            map(asterisk, |_| BinOp::Multiply),
            map(slash, |_| BinOp::Divide),
        )),
        prefixed,
    ).parse(input)
}


/// Matches the addition predecence level.
fn sum<'a>(input: In<'a>) -> Out<'a, Expr> {
    lbinop(
        alt((
            map(plus, |_| BinOp::Add),
            map(minus, |_| BinOp::Subtract),
        )),
        product,
    ).parse(input)
}


/// Matches the inequality comparison precedence level.
fn inequality<'a>(input: In<'a>) -> Out<'a, Expr> {
    lbinop(
        alt((
            map(less, |_| BinOp::Less),
            map(greater, |_| BinOp::Greater),
        )),
        sum,
    ).parse(input)
}


/// Matches the equality comparison precedence level.
fn equality<'a>(input: In<'a>) -> Out<'a, Expr> {
    lbinop(
        alt((
            map(double_eq, |_| BinOp::Equal),
            map(exclam_eq, |_| BinOp::NotEqual),
        )),
        inequality,
    ).parse(input)
}


/// Matches the ternary conditional, which is right-associative and binds
/// loosest of all operators.
fn ternary<'a>(input: In<'a>) -> Out<'a, Expr> {
    map(
        tuple((
            equality,
            opt(tuple((
                question,
                required(expression),
                expect(colon, TokenType::Colon),
                required(expression),
            ))),
        )),
        |(condition, branches)| match branches {
            None => condition,
            Some((_, consequence, _, alternative)) => Expr::Ternary {
                condition: Box::new(condition),
                consequence: Box::new(consequence),
                alternative: Box::new(alternative),
            },
        },
    )(input)
}


/// Matches any expression.
fn expression<'a>(input: In<'a>) -> Out<'a, Expr> {
    ternary(input)
}


/// Matches a let statement: `let name = value`.
fn let_statement<'a>(input: In<'a>) -> Out<'a, Statement> {
    map(
        tuple((
            kw_let,
            expect(identifier, TokenType::Ident),
            expect(assign, TokenType::Assign),
            required(expression),
        )),
        |(_, name, _, value)| Statement::Let { name, value },
    )(input)
}


/// Matches a return statement. The value may be omitted if the statement
/// ends right away.
fn return_statement<'a>(input: In<'a>) -> Out<'a, Statement> {
    let (i, _) = kw_return(input)?;
    match peek(i) {
        TokenType::SemiColon | TokenType::CloseBrace | TokenType::Eof => Ok((i, Statement::Return(None))),
        _ => map(required(expression), |expr| Statement::Return(Some(expr))).parse(i),
    }
}


/// Matches any statement, including an optional trailing semicolon.
fn statement<'a>(input: In<'a>) -> Out<'a, Statement> {
    map(
        tuple((
            alt((
                let_statement,
                return_statement,
                map(required(expression), Statement::Expression),
            )),
            opt(semicolon),
        )),
        |(stmt, _)| stmt,
    )(input)
}


/// Skip past the rest of a broken statement: up to and including the next
/// semicolon that isn't nested inside brackets, or up to EOF.
fn skip_statement<'a>(input: In<'a>) -> In<'a> {
    let mut depth: i32 = 0;
    for (i, tok) in input.iter().enumerate() {
        match tok.kind {
            TokenType::OpenParen | TokenType::OpenBrace | TokenType::OpenBracket => depth += 1,
            TokenType::CloseParen | TokenType::CloseBrace | TokenType::CloseBracket => depth -= 1,
            TokenType::SemiColon if depth <= 0 => return &input[i + 1..],
            TokenType::Eof => return &input[i..],
            _ => {}
        }
    }
    &input[input.len()..]
}


/// Parse a token sequence into a program. Statements that fail to parse are
/// reported and skipped; parsing always continues to the end of input.
pub fn parse_tokens(tokens: &[Token<'_>]) -> (Program, Vec<SyntaxError>) {
    let mut input = tokens;
    let mut statements = Vec::new();
    let mut errors = Vec::new();

    loop {
        match peek(input) {
            TokenType::Eof => break,
            TokenType::SemiColon => { input = &input[1..]; }
            _ => match statement(input) {
                Ok((rest, stmt)) => {
                    statements.push(stmt);
                    input = rest;
                }
                Err(NomError::Error(err) | NomError::Failure(err)) => {
                    errors.push(err);
                    input = skip_statement(input);
                }
                Err(NomError::Incomplete(_)) => {
                    errors.push(SyntaxError::Unexpected(peek(input)));
                    input = skip_statement(input);
                }
            },
        }
    }

    (Program { statements }, errors)
}


/// Parse source code and return the program together with a list of
/// human-readable parse error messages. The program contains every statement
/// that parsed successfully, even if there were errors.
pub fn parse(code: &str) -> (Program, Vec<String>) {
    let tokens = tokenize(code);
    let (program, errors) = parse_tokens(&tokens);
    (program, errors.iter().map(ToString::to_string).collect())
}
