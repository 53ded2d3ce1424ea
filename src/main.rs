use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use factpost::sources::{DirectoryTemplates, FactSource, SampleFacts};
use factpost::{PositionHints, PostBuilder, PostConfig, RenderRequest, RenderedPost, Topic};

#[derive(Parser)]
#[command(name = "factpost", version, about = "Compose square social posts from a headline and a background")]
struct Cli {
    /// JSON config file; missing keys keep their defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Template root with one sub-directory per topic
    #[arg(long, global = true)]
    templates: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct RequestArgs {
    #[arg(long, default_value = "general")]
    topic: String,
    /// Headline; a sample headline for the topic is used when omitted
    #[arg(long)]
    fact: Option<String>,
    #[arg(long)]
    brand: Option<String>,
    #[arg(long)]
    text_size: Option<f32>,
    #[arg(long)]
    brand_size: Option<f32>,
    /// Headline center, percent of width (0-100)
    #[arg(long)]
    text_x: Option<f32>,
    /// Band top, percent of height (0-100)
    #[arg(long)]
    text_y: Option<f32>,
    /// Background image; the template store is used when omitted
    #[arg(long)]
    background: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Render one post
    Render {
        #[command(flatten)]
        request: RequestArgs,
        /// Write the PNG here instead of printing a data URL
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
    /// Print the layout plan as JSON without drawing
    Plan {
        #[command(flatten)]
        request: RequestArgs,
    },
    /// Read JSON requests line by line from stdin, answer on stdout
    Worker,
    /// List topics
    Topics,
    /// Print a sample headline for a topic
    Fact {
        #[arg(long, default_value = "general")]
        topic: String,
    },
}

#[derive(Serialize, Default)]
struct PostResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    digest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
}

impl PostResponse {
    fn from_result(res: factpost::Result<RenderedPost>) -> Self {
        match res {
            Ok(post) => PostResponse {
                success: true,
                image: Some(post.to_data_url()),
                digest: Some(post.digest()),
                ..Default::default()
            },
            Err(e) => PostResponse {
                success: false,
                error: Some(e.to_string()),
                kind: Some(e.kind()),
                ..Default::default()
            },
        }
    }

    fn malformed(reason: String) -> Self {
        PostResponse {
            success: false,
            error: Some(reason),
            kind: Some("bad_request"),
            ..Default::default()
        }
    }
}

fn time_seed() -> Vec<u8> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default()
        .to_le_bytes()
        .to_vec()
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<PostConfig> {
    match path {
        Some(p) => {
            let json = std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?;
            Ok(PostConfig::from_json(&json)?)
        }
        None => Ok(PostConfig::default()),
    }
}

fn make_builder(cli: &Cli) -> anyhow::Result<PostBuilder> {
    let config = load_config(cli.config.as_ref())?;
    let builder = PostBuilder::new(config).context("initializing post builder")?;
    Ok(match &cli.templates {
        Some(root) => builder.with_templates(DirectoryTemplates::new(root)),
        None => builder,
    })
}

fn to_request(args: &RequestArgs) -> anyhow::Result<RenderRequest> {
    let topic = Topic::from(args.topic.as_str());
    let fact = match &args.fact {
        Some(f) => f.clone(),
        None => SampleFacts::new().fact(topic, &time_seed())?,
    };
    Ok(RenderRequest {
        topic,
        fact,
        brand: args.brand.clone(),
        headline_size: args.text_size,
        brand_size: args.brand_size,
        position: PositionHints {
            text_x: args.text_x,
            text_y: args.text_y,
        },
        background: args.background.clone(),
    })
}

fn worker_main(builder: &PostBuilder) -> io::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<RenderRequest>(&line) {
            Ok(request) => PostResponse::from_result(builder.build(&request)),
            Err(e) => PostResponse::malformed(format!("invalid request: {}", e)),
        };
        let js = serde_json::to_string(&response)
            .unwrap_or_else(|_| "{\"success\":false,\"error\":\"serialization failed\"}".to_string());
        writeln!(out, "{}", js)?;
        out.flush()?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Command::Render { request, out } => {
            let builder = make_builder(&cli)?;
            let request = to_request(request)?;
            let post = builder.build(&request)?;
            match out {
                Some(path) => {
                    std::fs::write(path, &post.png_data).with_context(|| format!("writing {}", path.display()))?;
                    eprintln!("Wrote {} ({} bytes, sha256 {})", path.display(), post.png_data.len(), post.digest());
                }
                None => println!("{}", post.to_data_url()),
            }
        }
        Command::Plan { request } => {
            let builder = make_builder(&cli)?;
            let (plan, _) = builder.plan(&to_request(request)?)?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Command::Worker => {
            let builder = make_builder(&cli)?;
            worker_main(&builder)?;
        }
        Command::Topics => {
            let topics: Vec<&str> = Topic::all().iter().map(Topic::as_str).collect();
            println!("{}", serde_json::json!({ "success": true, "topics": topics }));
        }
        Command::Fact { topic } => {
            let topic = Topic::from(topic.as_str());
            let fact = SampleFacts::new().fact(topic, &time_seed())?;
            println!("{}", serde_json::json!({ "success": true, "fact": fact, "topic": topic }));
        }
    }
    Ok(())
}
