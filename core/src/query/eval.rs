use super::{sets, Operator, Token};
use crate::error::MalformedQuery;
use crate::{DocId, Index};
use std::borrow::Cow;

/// Run postfix `tokens` against `index`.
///
/// Returns ascending, unique document ids. Unknown terms evaluate to the empty
/// set; a stack that does not reduce to exactly one value is malformed.
pub fn evaluate(tokens: &[Token], index: &Index) -> Result<Vec<DocId>, MalformedQuery> {
    let universe = index.num_docs();
    let mut stack: Vec<Cow<'_, [DocId]>> = Vec::new();

    for token in tokens {
        match token {
            Token::Term(term) => stack.push(Cow::Borrowed(index.postings(term))),
            Token::And => apply(Operator::And, &mut stack, universe)?,
            Token::Or => apply(Operator::Or, &mut stack, universe)?,
            Token::Not => apply(Operator::Not, &mut stack, universe)?,
            Token::LParen | Token::RParen => return Err(MalformedQuery::UnexpectedParen),
        }
        tracing::trace!(%token, depth = stack.len(), "evaluated token");
    }

    match stack.len() {
        0 => Err(MalformedQuery::EmptyQuery),
        1 => Ok(stack.pop().map(Cow::into_owned).unwrap_or_default()),
        count => Err(MalformedQuery::DanglingOperands { count }),
    }
}

/// Pop the operator's operands (right-most on top) and push its result.
fn apply(op: Operator, stack: &mut Vec<Cow<'_, [DocId]>>, universe: DocId) -> Result<(), MalformedQuery> {
    let missing = MalformedQuery::MissingOperand { operator: op };
    let Some(split) = stack.len().checked_sub(op.arity()) else {
        return Err(missing);
    };
    let operands = stack.split_off(split);
    let value = match (op, operands.as_slice()) {
        (Operator::Not, [operand]) => sets::complement(operand, universe),
        (Operator::And, [left, right]) => sets::intersect(left, right),
        (Operator::Or, [left, right]) => sets::union(left, right),
        _ => return Err(missing),
    };
    stack.push(Cow::Owned(value));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::IndexBuilder;
    use crate::query::parse;
    use crate::tokenizer::{StopWords, Tokenizer};
    use crate::DocumentRecord;

    fn index(texts: &[&str]) -> Index {
        let records = texts.iter().enumerate().map(|(i, t)| DocumentRecord::new(format!("doc{}", i + 1), None, *t));
        IndexBuilder::new(Tokenizer::new(StopWords::empty())).build(records)
    }

    fn run(query: &str, index: &Index) -> Result<Vec<DocId>, MalformedQuery> {
        evaluate(&parse(query)?, index)
    }

    #[test]
    fn unknown_term_is_empty_not_an_error() {
        let idx = index(&["alpha"]);
        assert_eq!(run("zeta", &idx), Ok(vec![]));
        assert_eq!(run("NOT zeta", &idx), Ok(vec![1]));
    }

    #[test]
    fn operators_apply_set_algebra() {
        let idx = index(&["a b", "b c", "c", "a c"]);
        assert_eq!(run("a AND c", &idx), Ok(vec![4]));
        assert_eq!(run("a OR b", &idx), Ok(vec![1, 2, 4]));
        assert_eq!(run("NOT c", &idx), Ok(vec![1]));
        assert_eq!(run("b AND NOT a", &idx), Ok(vec![2]));
        assert_eq!(run("( a OR b ) AND c", &idx), Ok(vec![2, 4]));
    }

    #[test]
    fn precedence_changes_the_result() {
        let idx = index(&["a", "b", "c"]);
        // a OR (b AND c) versus (a OR b) AND c
        assert_eq!(run("a OR b AND c", &idx), Ok(vec![1]));
        assert_eq!(run("(a OR b) AND c", &idx), Ok(vec![]));
    }

    #[test]
    fn missing_operands_are_malformed() {
        let idx = index(&["a"]);
        assert_eq!(run("AND a", &idx), Err(MalformedQuery::MissingOperand { operator: Operator::And }));
        assert_eq!(run("a OR", &idx), Err(MalformedQuery::MissingOperand { operator: Operator::Or }));
        assert_eq!(run("NOT", &idx), Err(MalformedQuery::MissingOperand { operator: Operator::Not }));
    }

    #[test]
    fn leftover_operands_are_malformed() {
        let idx = index(&["a b"]);
        assert_eq!(run("a b", &idx), Err(MalformedQuery::DanglingOperands { count: 2 }));
        assert_eq!(run("a NOT b", &idx), Err(MalformedQuery::DanglingOperands { count: 2 }));
    }

    #[test]
    fn empty_postfix_is_malformed() {
        assert_eq!(run("", &index(&["a"])), Err(MalformedQuery::EmptyQuery));
    }

    #[test]
    fn parentheses_in_postfix_are_rejected() {
        let tokens = vec![Token::LParen, Token::term("a")];
        assert_eq!(evaluate(&tokens, &index(&["a"])), Err(MalformedQuery::UnexpectedParen));
    }

    #[test]
    fn not_over_empty_index_is_empty() {
        assert_eq!(run("NOT a", &Index::new()), Ok(vec![]));
    }
}
