use hnwatch_api::{Comment, FeedItem, Submission};

/// Merges two newest-first sequences into one newest-first feed.
///
/// The head with the strictly later timestamp goes first, and submissions win ties. The merge
/// stops as soon as either input runs out: the rest of the other input is dropped.
pub fn interleave_by_posted_at(
    comments: Vec<Comment>,
    submissions: Vec<Submission>,
) -> Vec<FeedItem> {
    let mut res = Vec::with_capacity(2 * comments.len().min(submissions.len()));
    let mut comments = comments.into_iter().peekable();
    let mut submissions = submissions.into_iter().peekable();
    loop {
        let comment_is_later = match (comments.peek(), submissions.peek()) {
            (Some(c), Some(s)) => c.posted_at > s.posted_at,
            _ => return res,
        };
        let item = match comment_is_later {
            true => comments.next().map(FeedItem::Comment),
            false => submissions.next().map(FeedItem::Submission),
        };
        res.extend(item);
    }
}
