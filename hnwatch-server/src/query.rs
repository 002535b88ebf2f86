use hnwatch_api::{window, CommentQuery, Page, Sort, StreamQuery, SubmissionQuery, Time};

pub enum Bind {
    Bool(bool),
    I64(i64),
    String(String),
    Strings(Vec<String>),
    Time(Time),
}

pub struct Sql {
    pub where_clause: String,
    pub binds: Vec<Bind>,
    first_bind_idx: usize,
}

impl Sql {
    /// Empty filter, whose first bind will be `$first_bind_idx`
    pub fn new(first_bind_idx: usize) -> Sql {
        Sql {
            where_clause: String::from("true"),
            binds: Vec::new(),
            first_bind_idx,
        }
    }

    /// Adds a Bind, returning the index that should be used to refer to it
    fn add_bind(&mut self, b: Bind) -> usize {
        let res = self.first_bind_idx + self.binds.len();
        self.binds.push(b);
        res
    }

    fn and(&mut self, cond: &str) {
        self.where_clause.push_str(" AND ");
        self.where_clause.push_str(cond);
    }

    /// Adds `column op $idx` with `b` bound at `idx`
    fn and_bound(&mut self, column: &str, op: &str, b: Bind) {
        let idx = self.add_bind(b);
        self.and(&format!("{column} {op} ${idx}"));
    }

    fn and_any(&mut self, column: &str, values: Vec<String>) {
        let idx = self.add_bind(Bind::Strings(values));
        self.and(&format!("{column} = ANY(${idx})"));
    }
}

/// Binds all of `$binds`, in order, onto a `sqlx::query` or `sqlx::query_as`
macro_rules! bind_all {
    ( $query:expr, $binds:expr ) => {{
        let mut query = $query;
        for b in $binds {
            query = match b {
                $crate::query::Bind::Bool(b) => query.bind(b),
                $crate::query::Bind::I64(i) => query.bind(i),
                $crate::query::Bind::String(s) => query.bind(s),
                $crate::query::Bind::Strings(s) => query.bind(s),
                $crate::query::Bind::Time(t) => query.bind(t),
            };
        }
        query
    }};
}
pub(crate) use bind_all;

pub fn order_by(sort: Sort) -> &'static str {
    match sort {
        Sort::Natural => "seq",
        Sort::NewestFirst => "posted_at DESC, seq",
        Sort::MostPoints => "points DESC, seq",
    }
}

/// `LIMIT`/`OFFSET` suffix; numbers are inlined as they never come from strings
pub fn limit_offset(limit: Option<usize>, page: Option<Page>) -> String {
    let (offset, limit) = window(limit, page);
    match limit {
        Some(limit) => format!("LIMIT {limit} OFFSET {offset}"),
        None => format!("OFFSET {offset}"),
    }
}

pub fn submissions(q: &SubmissionQuery, first_bind_idx: usize) -> Sql {
    let mut res = Sql::new(first_bind_idx);
    if let Some(actor) = &q.actor {
        res.and_bound("actor", "=", Bind::String(actor.clone()));
    }
    if let Some(ids) = &q.ids {
        res.and_any("id", ids.iter().map(|id| id.0.clone()).collect());
    }
    if let Some(since) = q.posted_since {
        res.and_bound("posted_at", ">=", Bind::Time(since));
    }
    if q.valid_only {
        res.and_bound("valid", "=", Bind::Bool(true));
    }
    if q.missing_link_only {
        res.and("link IS NULL");
    }
    res
}

pub fn comments(q: &CommentQuery, first_bind_idx: usize) -> Sql {
    let mut res = Sql::new(first_bind_idx);
    if let Some(actor) = &q.actor {
        res.and_bound("actor", "=", Bind::String(actor.clone()));
    }
    if let Some(ids) = &q.ids {
        res.and_any("id", ids.iter().map(|id| id.0.clone()).collect());
    }
    if let Some(points) = q.min_points {
        res.and_bound("points", ">=", Bind::I64(points));
    }
    res
}

pub fn streams(q: &StreamQuery, first_bind_idx: usize) -> Sql {
    let mut res = Sql::new(first_bind_idx);
    if let Some(ids) = &q.ids {
        res.and_any("id", ids.iter().map(|id| id.0.clone()).collect());
    }
    if let Some(target) = &q.config_target {
        res.and_bound("target_actor", "=", Bind::String(target.clone()));
    }
    if let Some(target) = &q.cache_target {
        res.and_bound("cache_target_actor", "=", Bind::String(target.clone()));
    }
    res
}

#[cfg(test)]
mod tests {
    use hnwatch_api::SubmissionId;

    use super::*;

    #[test]
    fn binds_are_numbered_from_the_first_index() {
        let sql = submissions(
            &SubmissionQuery {
                actor: Some(String::from("pg")),
                ids: Some(vec![SubmissionId(String::from("1"))]),
                missing_link_only: true,
                ..SubmissionQuery::default()
            },
            3,
        );
        assert_eq!(
            sql.where_clause,
            "true AND actor = $3 AND id = ANY($4) AND link IS NULL"
        );
        assert_eq!(sql.binds.len(), 2);
    }

    #[test]
    fn empty_queries_match_everything() {
        let sql = streams(&StreamQuery::default(), 1);
        assert_eq!(sql.where_clause, "true");
        assert!(sql.binds.is_empty());
        assert_eq!(comments(&CommentQuery::default(), 1).where_clause, "true");
    }

    #[test]
    fn windows_render_as_limit_and_offset() {
        assert_eq!(limit_offset(None, None), "OFFSET 0");
        assert_eq!(limit_offset(Some(25), None), "LIMIT 25 OFFSET 0");
        assert_eq!(
            limit_offset(None, Some(Page::new(3, 10))),
            "LIMIT 10 OFFSET 20"
        );
    }
}
