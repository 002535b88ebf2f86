use anyhow::Context;
use hnwatch_api::{
    Actor, Feed, NewStream, SetStatus, Stream, StreamFeed, StreamStatus, StreamUpdate, Submission,
    WatchOutcome, WatchRequest,
};

#[derive(structopt::StructOpt)]
struct Opt {
    /// Base url of the hnwatch server
    #[structopt(short, long, env = "HNWATCH_HOST", default_value = "http://127.0.0.1:3000")]
    host: String,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Start collecting the activity of an actor
    Watch { user: String },

    /// Stop one watch on an actor, invalidating its streams once nobody watches it
    Unwatch { user: String },

    /// List the actors currently watched
    Watched,

    /// Create a stream following an actor
    CreateStream {
        target_actor: String,

        #[structopt(short, long, default_value = "")]
        title: String,

        /// Only show comments with at least this many points
        #[structopt(short, long)]
        minimum_points: Option<i64>,
    },

    /// List streams, optionally only those following an actor
    ListStreams {
        #[structopt(short, long, default_value = "1")]
        page: u32,

        #[structopt(short, long)]
        user: Option<String>,
    },

    /// Print the feed of a stream
    Feed {
        stream: String,

        /// Print the plain comments and submissions instead of the merged feed
        #[structopt(long)]
        activity: bool,

        #[structopt(short, long, default_value = "1")]
        page: u32,
    },

    /// Change the title, target or minimum points of a stream
    Update {
        stream: String,

        #[structopt(short, long)]
        title: Option<String>,

        #[structopt(long)]
        target_actor: Option<String>,

        #[structopt(short, long)]
        minimum_points: Option<i64>,
    },

    /// Mark a stream as active again after its actor got unwatched
    Reactivate { stream: String },

    /// Delete a stream
    DeleteStream { stream: String },

    /// List the valid submissions whose link is still unknown
    Unfetched,

    /// Hide a submission from the top and unfetched listings
    InvalidateSubmission { submission: String },
}

/// Turns error responses back into the server's error type
async fn parse_response<T>(resp: reqwest::Response) -> anyhow::Result<T>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let status = resp.status();
    let body = resp.bytes().await.context("reading response body")?;
    if !status.is_success() {
        let err = hnwatch_api::Error::parse(&body)
            .with_context(|| format!("parsing error response with status {status}"))?;
        return Err(err.into());
    }
    // empty bodies stand for unit responses
    let body: &[u8] = match body.is_empty() {
        true => b"null",
        false => &body,
    };
    serde_json::from_slice(body).context("parsing response body")
}

fn print_json<T: serde::Serialize>(v: &T) -> anyhow::Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(v).context("serializing output")?
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opt = <Opt as structopt::StructOpt>::from_args();
    let host = opt.host.trim_end_matches('/');

    let client = reqwest::Client::new();

    match opt.cmd {
        Command::Watch { user } => {
            let outcome: WatchOutcome = parse_response(
                client
                    .post(format!("{host}/api/watch"))
                    .json(&WatchRequest {
                        user,
                        unwatch: false,
                    })
                    .send()
                    .await?,
            )
            .await?;
            println!(
                "{} is now watched {} times",
                outcome.actor.name, outcome.actor.watch_count
            );
        }
        Command::Unwatch { user } => {
            let outcome: WatchOutcome = parse_response(
                client
                    .post(format!("{host}/api/watch"))
                    .json(&WatchRequest {
                        user,
                        unwatch: true,
                    })
                    .send()
                    .await?,
            )
            .await?;
            println!(
                "{} is now watched {} times, {} streams invalidated",
                outcome.actor.name, outcome.actor.watch_count, outcome.invalidated_streams
            );
        }
        Command::Watched => {
            let actors: Vec<Actor> =
                parse_response(client.get(format!("{host}/api/watch")).send().await?).await?;
            for a in actors {
                println!("{}\t{}", a.name, a.watch_count);
            }
        }
        Command::CreateStream {
            target_actor,
            title,
            minimum_points,
        } => {
            let stream: Stream = parse_response(
                client
                    .post(format!("{host}/api/streams"))
                    .json(&NewStream {
                        title,
                        target_actor: Some(target_actor),
                        minimum_points,
                    })
                    .send()
                    .await?,
            )
            .await?;
            println!("{}", stream.id);
        }
        Command::ListStreams { page, user } => {
            let mut req = client
                .get(format!("{host}/api/streams"))
                .query(&[("page", page.to_string())]);
            if let Some(user) = user {
                req = req.query(&[("user", user)]);
            }
            let streams: Vec<Stream> = parse_response(req.send().await?).await?;
            for s in streams {
                println!(
                    "{}\t{}\t{}\t{}",
                    s.id,
                    s.status.as_str(),
                    s.config.target_actor,
                    s.title
                );
            }
        }
        Command::Feed {
            stream,
            activity,
            page,
        } => {
            let format = match activity {
                true => "activity",
                false => "tuples",
            };
            let page = page.to_string();
            let feed: StreamFeed = parse_response(
                client
                    .get(format!("{host}/api/streams/{stream}/feed"))
                    .query(&[("format", format), ("page", page.as_str())])
                    .send()
                    .await?,
            )
            .await?;
            if feed.status == StreamStatus::Invalid {
                eprintln!(
                    "warning: stream {} is invalid, its actor is no longer watched",
                    feed.id
                );
            }
            match &feed.feed {
                Feed::Tuples(t) => print_json(t)?,
                Feed::Activity(a) => print_json(a)?,
            }
        }
        Command::Update {
            stream,
            title,
            target_actor,
            minimum_points,
        } => {
            let _: Stream = parse_response(
                client
                    .put(format!("{host}/api/streams/{stream}"))
                    .json(&StreamUpdate {
                        title,
                        target_actor,
                        minimum_points,
                    })
                    .send()
                    .await?,
            )
            .await?;
        }
        Command::Reactivate { stream } => {
            let _: Stream = parse_response(
                client
                    .put(format!("{host}/api/streams/{stream}/status"))
                    .json(&SetStatus {
                        status: StreamStatus::Active,
                    })
                    .send()
                    .await?,
            )
            .await?;
        }
        Command::DeleteStream { stream } => {
            let () = parse_response(
                client
                    .delete(format!("{host}/api/streams/{stream}"))
                    .send()
                    .await?,
            )
            .await?;
        }
        Command::Unfetched => {
            let submissions: Vec<Submission> = parse_response(
                client
                    .get(format!("{host}/api/submissions/unfetched"))
                    .send()
                    .await?,
            )
            .await?;
            for s in submissions {
                println!("{}\t{}\t{}", s.id, s.actor, s.title);
            }
        }
        Command::InvalidateSubmission { submission } => {
            let () = parse_response(
                client
                    .put(format!("{host}/api/submissions/{submission}/invalid"))
                    .send()
                    .await?,
            )
            .await?;
        }
    }

    Ok(())
}
