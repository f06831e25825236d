use super::{Operator, Token};
use crate::error::MalformedQuery;

/// Entry on the shunting-yard operator stack.
#[derive(Debug, Clone, Copy)]
enum Pending {
    Op(Operator),
    Open,
}

/// Split a query on whitespace into tokens. Parentheses are tokens of their
/// own wherever they appear, so `(grado`, `master)` and `NOT(grado` all split.
pub fn lex(query: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    for word in query.split_whitespace() {
        let mut rest = word;
        while let Some(at) = rest.find(['(', ')']) {
            push_word(&rest[..at], &mut tokens);
            tokens.push(if rest[at..].starts_with('(') { Token::LParen } else { Token::RParen });
            rest = &rest[at + 1..];
        }
        push_word(rest, &mut tokens);
    }
    tokens
}

fn push_word(word: &str, tokens: &mut Vec<Token>) {
    if word.is_empty() {
        return;
    }
    tokens.push(match Operator::from_keyword(word) {
        Some(op) => op.into(),
        None => Token::term(word),
    });
}

/// Infix query string to postfix tokens.
pub fn parse(query: &str) -> Result<Vec<Token>, MalformedQuery> {
    to_postfix(lex(query))
}

/// Shunting-yard conversion of infix tokens to postfix.
pub fn to_postfix<I: IntoIterator<Item = Token>>(tokens: I) -> Result<Vec<Token>, MalformedQuery> {
    let mut output: Vec<Token> = Vec::new();
    let mut stack: Vec<Pending> = Vec::new();

    for token in tokens {
        match token {
            Token::Term(_) => output.push(token),
            Token::And => push_operator(Operator::And, &mut stack, &mut output),
            Token::Or => push_operator(Operator::Or, &mut stack, &mut output),
            Token::Not => push_operator(Operator::Not, &mut stack, &mut output),
            Token::LParen => stack.push(Pending::Open),
            Token::RParen => loop {
                match stack.pop() {
                    Some(Pending::Open) => break,
                    Some(Pending::Op(op)) => output.push(op.into()),
                    None => return Err(MalformedQuery::UnmatchedCloseParen),
                }
            },
        }
    }

    while let Some(pending) = stack.pop() {
        match pending {
            Pending::Op(op) => output.push(op.into()),
            Pending::Open => return Err(MalformedQuery::UnmatchedOpenParen),
        }
    }
    Ok(output)
}

fn push_operator(incoming: Operator, stack: &mut Vec<Pending>, output: &mut Vec<Token>) {
    while let Some(&Pending::Op(top)) = stack.last() {
        if !incoming.yields_to(top) {
            break;
        }
        stack.pop();
        output.push(top.into());
    }
    stack.push(Pending::Op(incoming));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::render;

    fn postfix(query: &str) -> String {
        render(&parse(query).unwrap())
    }

    #[test]
    fn and_binds_tighter_than_or() {
        assert_eq!(postfix("a OR b AND c"), "a b c AND OR");
        assert_eq!(postfix("a AND b OR c"), "a b AND c OR");
    }

    #[test]
    fn not_binds_to_next_operand_only() {
        assert_eq!(postfix("a AND NOT b OR c"), "a b NOT AND c OR");
        assert_eq!(
            parse("grado AND NOT master OR docencia").unwrap(),
            vec![
                Token::term("grado"),
                Token::term("master"),
                Token::Not,
                Token::And,
                Token::term("docencia"),
                Token::Or,
            ]
        );
    }

    #[test]
    fn binary_operators_are_left_associative() {
        assert_eq!(postfix("a AND b AND c"), "a b AND c AND");
        assert_eq!(postfix("a OR b OR c"), "a b OR c OR");
    }

    #[test]
    fn not_is_right_associative() {
        assert_eq!(postfix("NOT NOT a"), "a NOT NOT");
        assert_eq!(postfix("NOT a AND NOT NOT b"), "a NOT b NOT NOT AND");
    }

    #[test]
    fn parentheses_override_precedence() {
        assert_eq!(postfix("( a OR b ) AND c"), "a b OR c AND");
        assert_eq!(postfix("NOT (a OR b)"), "a b OR NOT");
        assert_eq!(postfix("((a))"), "a");
    }

    #[test]
    fn glued_parentheses_are_split() {
        assert_eq!(
            lex("(grado OR master))"),
            vec![
                Token::LParen,
                Token::term("grado"),
                Token::Or,
                Token::term("master"),
                Token::RParen,
                Token::RParen,
            ]
        );
    }

    #[test]
    fn parentheses_glued_to_operators_or_inside_words_are_split() {
        assert_eq!(
            lex("NOT(grado OR master)"),
            vec![Token::Not, Token::LParen, Token::term("grado"), Token::Or, Token::term("master"), Token::RParen]
        );
        assert_eq!(lex("a)AND(b"), vec![Token::term("a"), Token::RParen, Token::And, Token::LParen, Token::term("b")]);
        assert_eq!(postfix("NOT(grado OR master)"), "grado master OR NOT");
    }

    #[test]
    fn lowercase_keywords_are_terms() {
        assert_eq!(lex("and or not"), vec![Token::term("and"), Token::term("or"), Token::term("not")]);
    }

    #[test]
    fn unmatched_parentheses_are_malformed() {
        assert_eq!(parse("(a AND b"), Err(MalformedQuery::UnmatchedOpenParen));
        assert_eq!(parse("a AND b)"), Err(MalformedQuery::UnmatchedCloseParen));
        assert_eq!(parse(") a ("), Err(MalformedQuery::UnmatchedCloseParen));
    }

    #[test]
    fn empty_query_parses_to_nothing() {
        assert_eq!(parse("   "), Ok(vec![]));
    }
}
