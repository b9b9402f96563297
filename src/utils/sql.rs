use sea_orm::Condition;
use sea_orm::sea_query::{Expr, ExprTrait, Func, IntoColumnRef, LikeExpr};

/// 转义 LIKE 通配符，配合 `ESCAPE '\'` 使用
pub fn escape_like_pattern(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// 不区分大小写的子串匹配：LOWER(col) LIKE '%term%' ESCAPE '\'
pub fn contains_ignore_case<C: IntoColumnRef>(column: C, term: &str) -> Condition {
    let pattern = format!("%{}%", escape_like_pattern(&term.to_lowercase()));
    Condition::all().add(Func::lower(Expr::col(column)).like(LikeExpr::new(pattern).escape('\\')))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_pattern() {
        assert_eq!(escape_like_pattern("phys"), "phys");
        assert_eq!(escape_like_pattern("100%"), "100\\%");
        assert_eq!(escape_like_pattern("a_b\\c"), "a\\_b\\\\c");
    }
}
