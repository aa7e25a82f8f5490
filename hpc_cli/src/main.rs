use std::{
    env::current_dir,
    fs::{read_to_string, write},
    path::PathBuf,
};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use hpc_core::{
    feed_client::{self, FeedUrl},
    policy::PolicyConfig,
    serializer::FeedMetadata,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(about = "Prioritize the events of an iCalendar feed")]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write the prioritized calendar to a file
    Export {
        #[command(flatten)]
        source: SourceArgs,
        /// the file to write, relative to the current directory
        #[arg(long, default_value = "high_priority_events.ics")]
        output: PathBuf,
        #[command(flatten)]
        policy: PolicyArgs,
    },
    /// Print the URL to subscribe to on a running server
    Url {
        /// the base URL of the server
        base_url: String,
        #[command(flatten)]
        policy: PolicyArgs,
    },
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// read the upstream feed from a file instead of fetching it
    #[arg(long)]
    pub input: Option<PathBuf>,
    /// the upstream feed
    #[arg(long, env = "HPC_FEED_URL", hide_env_values = true)]
    pub feed_url: Option<FeedUrl>,
}

/// Unset options keep the default policy.
#[derive(Debug, Args)]
pub struct PolicyArgs {
    /// priority of Zoom meetings, 1 is the highest
    #[arg(long)]
    pub zoom_priority: Option<i32>,
    /// whether Zoom meetings get a reminder
    #[arg(long)]
    pub zoom_reminder: Option<bool>,
    /// minutes between the Zoom reminder and the meeting
    #[arg(long)]
    pub zoom_reminder_minutes: Option<u32>,
    /// priority of all other events
    #[arg(long)]
    pub other_priority: Option<i32>,
    /// whether other events get a reminder
    #[arg(long)]
    pub other_reminder: Option<bool>,
    /// minutes between the reminder and other events
    #[arg(long)]
    pub other_reminder_minutes: Option<u32>,
}

impl From<&PolicyArgs> for PolicyConfig {
    fn from(value: &PolicyArgs) -> Self {
        let defaults = PolicyConfig::default();
        PolicyConfig {
            zoom_priority: value.zoom_priority.unwrap_or(defaults.zoom_priority),
            zoom_reminder: value.zoom_reminder.unwrap_or(defaults.zoom_reminder),
            zoom_reminder_minutes: value
                .zoom_reminder_minutes
                .unwrap_or(defaults.zoom_reminder_minutes),
            other_priority: value.other_priority.unwrap_or(defaults.other_priority),
            other_reminder: value.other_reminder.unwrap_or(defaults.other_reminder),
            other_reminder_minutes: value
                .other_reminder_minutes
                .unwrap_or(defaults.other_reminder_minutes),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Arguments::parse();
    run(args.command).await
}

async fn run(command: Command) -> Result<()> {
    match command {
        Command::Export {
            source,
            output,
            policy,
        } => run_export(source, output, PolicyConfig::from(&policy)).await?,
        Command::Url { base_url, policy } => {
            println!("{}", PolicyConfig::from(&policy).subscription_url(&base_url));
        }
    };
    Ok(())
}

/// Transform the feed from `--input`, or else from `--feed-url`, and write it.
async fn run_export(source: SourceArgs, output: PathBuf, config: PolicyConfig) -> Result<()> {
    let metadata = FeedMetadata::default();
    let calendar = match (source.input, source.feed_url) {
        (Some(input), _) => {
            let text = read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            feed_client::transform(&text, &config, &metadata)
        }
        (None, Some(feed_url)) => feed_client::get(&feed_url, &config, &metadata).await?,
        (None, None) => bail!("either --input or --feed-url is required"),
    };
    let mut path = current_dir()?;
    path.push(output);
    write(&path, calendar).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "calendar written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs::{read_to_string, write};

    use clap::Parser;
    use hpc_core::policy::PolicyConfig;

    use crate::{run_export, Arguments, Command, PolicyArgs, SourceArgs};

    const FEED: &str = "BEGIN:VCALENDAR\n\
        BEGIN:VEVENT\nUID:zoom-1\nSUMMARY:Lecture\n\
        DESCRIPTION:Join https://futurense.zoom.us/j/123\n\
        DTSTART:20231201T143000Z\nEND:VEVENT\n\
        END:VCALENDAR\n";

    #[test]
    fn test_from_policy_args_for_policy_config() {
        let policy_args = PolicyArgs {
            zoom_priority: None,
            zoom_reminder: None,
            zoom_reminder_minutes: None,
            other_priority: None,
            other_reminder: None,
            other_reminder_minutes: None,
        };
        assert_eq!(PolicyConfig::from(&policy_args), PolicyConfig::default());
        let policy_args = PolicyArgs {
            zoom_priority: Some(2),
            zoom_reminder: Some(false),
            zoom_reminder_minutes: None,
            other_priority: None,
            other_reminder: Some(true),
            other_reminder_minutes: Some(45),
        };
        assert_eq!(
            PolicyConfig::from(&policy_args),
            PolicyConfig {
                zoom_priority: 2,
                zoom_reminder: false,
                other_reminder: true,
                other_reminder_minutes: 45,
                ..PolicyConfig::default()
            }
        );
    }

    #[test]
    fn test_parse_url_command() {
        let args = Arguments::try_parse_from([
            "hpc_cli",
            "url",
            "https://calendar.example.com",
            "--zoom-reminder",
            "false",
        ])
        .unwrap();
        let Command::Url { base_url, policy } = args.command else {
            panic!("expected the url command");
        };
        assert_eq!(base_url, "https://calendar.example.com");
        assert!(!PolicyConfig::from(&policy).zoom_reminder);
    }

    #[tokio::test]
    async fn test_run_export_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("icalexport.ics");
        let output = dir.path().join("high_priority_events.ics");
        write(&input, FEED).unwrap();
        let source = SourceArgs {
            input: Some(input),
            feed_url: None,
        };
        run_export(source, output.clone(), PolicyConfig::default())
            .await
            .unwrap();
        let calendar = read_to_string(output).unwrap();
        let lines: Vec<&str> = calendar.lines().collect();
        assert!(lines.contains(&"UID:zoom-1"));
        assert!(lines.contains(&"PRIORITY:1"));
        assert!(lines.contains(&"TRIGGER:-PT15M"));
    }

    #[tokio::test]
    async fn test_run_export_without_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = SourceArgs {
            input: None,
            feed_url: None,
        };
        let result = run_export(source, dir.path().join("out.ics"), PolicyConfig::default()).await;
        assert!(result.is_err());
    }
}
