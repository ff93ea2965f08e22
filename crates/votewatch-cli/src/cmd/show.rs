use crate::output::print_json;
use anyhow::Context;
use std::path::Path;
use votewatch_core::{lifecycle::format_ts, roster::VoteSnapshot};

pub fn run(root: &Path, resolution: &str, voters: bool, json: bool) -> anyhow::Result<()> {
    let roster = VoteSnapshot::load(root, resolution)
        .with_context(|| format!("failed to load roster for {resolution}"))?
        .with_context(|| format!("no roster recorded for resolution {resolution}"))?;

    if json {
        return print_json(&roster);
    }

    println!("Resolution: {} \"{}\"", roster.resolution_id, roster.resolution_name);
    if let Some(chamber) = &roster.chamber {
        println!("Chamber:    {chamber}");
    }
    if let Some(author) = &roster.proposed_by {
        println!("Author:     {author}");
    }
    if !roster.coauthors.is_empty() {
        println!("Co-authors: {}", roster.coauthors.join(", "));
    }
    if let Some(promoted) = roster.promoted {
        println!("Promoted:   {}", format_ts(promoted));
    }
    match roster.finalized_at {
        Some(ts) => println!("Status:     final (reconciled {})", format_ts(ts)),
        None => println!("Status:     live snapshot"),
    }
    println!("For:        {}", roster.votes_for.len());
    println!("Against:    {}", roster.votes_against.len());

    if voters {
        println!("\nVoted for:");
        for actor in &roster.votes_for {
            println!("  {actor}");
        }
        println!("\nVoted against:");
        for actor in &roster.votes_against {
            println!("  {actor}");
        }
    }
    Ok(())
}
