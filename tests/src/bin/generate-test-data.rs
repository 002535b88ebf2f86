use chrono::{Duration, Utc};
use rand::{seq::SliceRandom, Rng};

const ACTORS: [&str; 6] = ["pg", "patio11", "tptacek", "sama", "jacquesm", "dang"];

const NUM_SUBMISSIONS: usize = 200;
const SUBMISSION_TITLE_WORDS: usize = 8;

const NUM_COMMENTS: usize = 1000;
const COMMENT_WORDS: usize = 40;
const MAX_CONTEXT_DEPTH: usize = 4;

const HISTORY_HOURS: i64 = 24 * 14;

fn gen_n_items(table: &str, n: usize, mut f: impl FnMut(usize) -> String) {
    println!("INSERT INTO {} VALUES", table);
    for i in 0..n {
        if i != 0 {
            println!(",");
        }
        print!("    {}", f(i));
    }
    println!();
    println!("ON CONFLICT DO NOTHING;");
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn gen_time(rng: &mut impl Rng) -> String {
    let t = Utc::now() - Duration::minutes(rng.gen_range(0..HISTORY_HOURS * 60));
    quote(&t.to_rfc3339())
}

fn main() {
    let mut rng = rand::thread_rng();

    // Generate actors, watched once each as if an explicit watch created them
    gen_n_items("actors (name, watch_count)", ACTORS.len(), |i| {
        format!("({}, 1)", quote(ACTORS[i]))
    });

    // Generate submissions, some of which have no link fetched yet
    let mut submissions = Vec::new();
    gen_n_items(
        "submissions (id, actor, title, link, points, comment_count, posted_at, valid)",
        NUM_SUBMISSIONS,
        |i| {
            let id = format!("{}", 30_000_000 + i);
            submissions.push(id.clone());
            let link = match rng.gen_bool(0.8) {
                true => quote(&format!("https://example.com/{id}")),
                false => String::from("NULL"),
            };
            format!(
                "({}, {}, {}, {}, {}, {}, {}, {})",
                quote(&id),
                quote(ACTORS.choose(&mut rng).unwrap()),
                quote(&lipsum::lipsum_words(SUBMISSION_TITLE_WORDS)),
                link,
                rng.gen_range(1..500),
                rng.gen_range(0..200),
                gen_time(&mut rng),
                rng.gen_bool(0.95),
            )
        },
    );

    // Generate comments, each answering a few earlier ones on the same submission
    let mut comments: Vec<(String, String)> = Vec::new();
    gen_n_items(
        "comments (id, submission_id, parent_id, contexts, actor, body, points, posted_at)",
        NUM_COMMENTS,
        |i| {
            let id = format!("{}", 40_000_000 + i);
            let submission = submissions.choose(&mut rng).unwrap().clone();
            let earlier: Vec<&String> = comments
                .iter()
                .filter(|(_, s)| *s == submission)
                .map(|(c, _)| c)
                .collect();
            let depth = rng.gen_range(0..=MAX_CONTEXT_DEPTH.min(earlier.len()));
            let contexts: Vec<String> = earlier
                .choose_multiple(&mut rng, depth)
                .map(|c| quote(c))
                .collect();
            let parent = contexts
                .last()
                .cloned()
                .unwrap_or_else(|| String::from("NULL"));
            // the last picked ancestor is the parent, the others are its context
            let contexts = format!(
                "ARRAY[{}]::TEXT[]",
                contexts[..contexts.len().saturating_sub(1)].join(", ")
            );
            let row = format!(
                "({}, {}, {}, {}, {}, {}, {}, {})",
                quote(&id),
                quote(&submission),
                parent,
                contexts,
                quote(ACTORS.choose(&mut rng).unwrap()),
                quote(&lipsum::lipsum_words(COMMENT_WORDS)),
                rng.gen_range(-5..100),
                gen_time(&mut rng),
            );
            comments.push((id, submission));
            row
        },
    );
}
