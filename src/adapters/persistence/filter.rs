//! Conditional WHERE-clause builder for list queries.
//!
//! Clauses are only added for filters that are present; every value is bound as a
//! numbered parameter (`?N`), so a search term can be referenced from several
//! `LIKE` comparisons with a single binding.

use super::rows::SqlValue;
use crate::domain::PageRequest;
use libsql::Value;

#[derive(Debug, Default)]
pub(crate) struct SqlFilter {
    clauses: Vec<String>,
    params: Vec<Value>,
}

impl SqlFilter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn bind(&mut self, value: Value) -> String {
        self.params.push(value);
        format!("?{}", self.params.len())
    }

    /// `column = value` when `value` is present.
    pub(crate) fn eq<T: SqlValue>(&mut self, column: &str, value: Option<T>) -> &mut Self {
        if let Some(value) = value {
            let p = self.bind(value.sql());
            self.clauses.push(format!("{column} = {p}"));
        }
        self
    }

    /// Arbitrary clause; every `{}` in `template` is replaced by the bound parameter.
    pub(crate) fn clause<T: SqlValue>(&mut self, template: &str, value: Option<T>) -> &mut Self {
        if let Some(value) = value {
            let p = self.bind(value.sql());
            self.clauses.push(template.replace("{}", &p));
        }
        self
    }

    /// Case-insensitive substring match OR-ed across `columns`.
    pub(crate) fn search(&mut self, columns: &[&str], term: Option<&str>) -> &mut Self {
        let Some(term) = term else {
            return self;
        };
        if columns.is_empty() {
            return self;
        }
        let p = self.bind(Value::Text(format!("%{}%", escape_like(term))));
        let any = columns
            .iter()
            .map(|c| format!("{c} LIKE {p} ESCAPE '\\'"))
            .collect::<Vec<_>>()
            .join(" OR ");
        self.clauses.push(format!("({any})"));
        self
    }

    /// ` WHERE a AND b`, or an empty string when no filter applies.
    pub(crate) fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    pub(crate) fn params(&self) -> Vec<Value> {
        self.params.clone()
    }

    /// ` LIMIT ?n OFFSET ?m` plus the parameter list extended with both values.
    pub(crate) fn paged(&self, page: PageRequest) -> (String, Vec<Value>) {
        let mut params = self.params.clone();
        params.push(Value::Integer(i64::from(page.limit)));
        let limit = params.len();
        params.push(Value::Integer(page.offset() as i64));
        let offset = params.len();
        (format!(" LIMIT ?{limit} OFFSET ?{offset}"), params)
    }
}

fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_has_no_where() {
        let f = SqlFilter::new();
        assert_eq!(f.where_sql(), "");
        assert!(f.params().is_empty());
    }

    #[test]
    fn absent_values_add_no_clause() {
        let mut f = SqlFilter::new();
        f.eq("client_id", None::<i64>)
            .eq("status", Some("active"))
            .search(&["name"], None);
        assert_eq!(f.where_sql(), " WHERE status = ?1");
        assert_eq!(f.params().len(), 1);
    }

    #[test]
    fn search_reuses_one_parameter() {
        let mut f = SqlFilter::new();
        f.eq("client_id", Some(4i64))
            .search(&["name", "email"], Some("50%_off"));
        assert_eq!(
            f.where_sql(),
            " WHERE client_id = ?1 AND (name LIKE ?2 ESCAPE '\\' OR email LIKE ?2 ESCAPE '\\')"
        );
        match &f.params()[1] {
            Value::Text(s) => assert_eq!(s, "%50\\%\\_off%"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn clause_template_and_paging() {
        let mut f = SqlFilter::new();
        f.clause(
            "id IN (SELECT project_id FROM project_tags WHERE tag_id = {})",
            Some(9i64),
        );
        let (sql, params) = f.paged(PageRequest { page: 3, limit: 10 });
        assert_eq!(sql, " LIMIT ?2 OFFSET ?3");
        assert_eq!(params.len(), 3);
        assert!(matches!(params[2], Value::Integer(20)));
        assert_eq!(
            f.where_sql(),
            " WHERE id IN (SELECT project_id FROM project_tags WHERE tag_id = ?1)"
        );
    }
}
