//! Plain-text rendering of debates, vote rounds and listings.
//!
//! Every function returns a `String` so output can be tested without a
//! terminal.

use std::fmt::Write;

use anyhow::Result;
use dialectic_core::{DebateConfig, DebateState, IterationRecord, RoundSummary, ScoreTrend};
use dialectic_store::DebateSummary;
use dialectic_voting::{ScoringTable, VoterReasoning, VotingSession};

const BAR_WIDTH: usize = 20;

/// `1st`, `2nd`, `3rd`, `4th`, ... `11th`, `21st`.
pub fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

/// One row per voter, one column per rank, with the points each rank earns.
pub fn vote_table(votes: &[VoterReasoning], scoring: &ScoringTable) -> String {
    let ranks = votes
        .iter()
        .map(|v| v.rankings.len())
        .max()
        .unwrap_or(0)
        .max(scoring.len());

    let mut header = vec!["Voter".to_string()];
    header.extend((1..=ranks).map(|r| format!("{} ({})", ordinal(r), scoring.points_for(r))));

    let rows: Vec<Vec<String>> = votes
        .iter()
        .map(|vote| {
            let voter = if vote.fallback {
                format!("{}*", vote.voter)
            } else {
                vote.voter.clone()
            };
            let mut row = vec![voter];
            row.extend((0..ranks).map(|i| vote.rankings.get(i).cloned().unwrap_or_else(|| "-".to_string())));
            row
        })
        .collect();

    let widths: Vec<usize> = (0..header.len())
        .map(|col| {
            rows.iter()
                .map(|r| r[col].chars().count())
                .chain(std::iter::once(header[col].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_row(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &rule, &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    if votes.iter().any(|v| v.fallback) {
        out.push_str("* fallback vote substituted by the moderator\n");
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

/// Point totals, highest first, with a bar and the share of the maximum.
pub fn score_totals(summary: &RoundSummary) -> String {
    let max = summary.consensus.max_score;
    let name_width = summary
        .ranking
        .iter()
        .map(|(name, _)| name.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for (participant, score) in &summary.ranking {
        let pct = percent(*score, max);
        let filled = ((pct / 100.0) * BAR_WIDTH as f64).floor() as usize;
        let filled = filled.min(BAR_WIDTH);
        let bar = format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled));
        let _ = writeln!(
            out,
            "{:<width$} {} {:>3} pts ({:>5.1}%)",
            participant,
            bar,
            score,
            pct,
            width = name_width
        );
    }
    out
}

/// One-line consensus verdict for a round.
pub fn consensus_status(summary: &RoundSummary) -> String {
    let outcome = &summary.consensus;
    match &outcome.winner {
        Some(winner) => format!(
            "✓ Consensus reached: {} with {}/{} points ({:.1}%)",
            winner,
            outcome.top_score,
            outcome.max_score,
            outcome.top_ratio() * 100.0
        ),
        None => format!(
            "✗ No consensus yet. Top scorer needs {:.0} more points ({:.0} of {} required)",
            outcome.shortfall().ceil(),
            outcome.threshold_score.ceil(),
            outcome.max_score
        ),
    }
}

/// Vote table, totals and status for one round.
pub fn round_summary(summary: &RoundSummary, scoring: &ScoringTable) -> String {
    let mut out = format!("Voting results - round {}\n\n", summary.iteration + 1);
    out.push_str(&vote_table(&summary.votes, scoring));
    out.push('\n');
    out.push_str(&score_totals(summary));
    out.push('\n');
    out.push_str(&consensus_status(summary));
    out.push('\n');
    out
}

/// Score progression per participant, e.g. `Visionary: 10 → 16`.
pub fn trends(trends: &[ScoreTrend]) -> String {
    let mut out = String::new();
    for trend in trends {
        let scores: Vec<String> = trend.scores.iter().map(u32::to_string).collect();
        let _ = writeln!(out, "{}: {}", trend.participant, scores.join(" → "));
    }
    out
}

/// Every argument of a round, in speaking order.
pub fn arguments(record: &IterationRecord) -> String {
    let mut out = String::new();
    for argument in &record.arguments {
        let marker = if argument.placeholder { " (placeholder)" } else { "" };
        let _ = writeln!(out, "[{}{}]\n{}\n", argument.speaker, marker, argument.content);
    }
    out
}

/// Full replay of a debate: arguments, re-scored vote rounds, trends and
/// verdict.
///
/// Votes are scored again from the stored rankings, so the output always
/// agrees with the saved record.
pub fn debate(state: &DebateState) -> Result<String> {
    let mut out = String::new();
    let _ = writeln!(out, "{}", state.display_title());
    let _ = writeln!(out, "Question: {}", state.question);
    let _ = writeln!(out, "Participants: {}", state.participants.join(", "));
    let _ = writeln!(out, "Started: {}", state.started_at.format("%Y-%m-%d %H:%M:%S UTC"));

    let voted = state.iterations.iter().any(|r| r.votes.is_some());
    let mut session = if voted {
        Some(VotingSession::new(
            state.config.voting.clone(),
            state.participants.clone(),
        )?)
    } else {
        None
    };

    for record in &state.iterations {
        let kind = record
            .arguments
            .first()
            .map(|a| format!("{:?}", a.kind))
            .unwrap_or_default();
        let _ = writeln!(out, "\n═══ Round {} {} ═══\n", record.iteration + 1, kind);
        out.push_str(&arguments(record));

        if let (Some(votes), Some(session)) = (&record.votes, session.as_mut()) {
            let summary = session.record_round(record.iteration, votes.clone())?;
            out.push_str(&round_summary(&summary, &state.config.voting.scoring));
        }
    }

    if let Some(session) = &session {
        out.push_str("\nScore progression\n");
        out.push_str(&trends(&session.trends()));
    }

    match &state.verdict {
        Some(verdict) => {
            let _ = writeln!(out, "\nVerdict\n{}", verdict);
        }
        None => out.push_str("\nNo verdict recorded.\n"),
    }
    Ok(out)
}

/// Table of saved debates.
pub fn debate_list(summaries: &[DebateSummary]) -> String {
    if summaries.is_empty() {
        return "No saved debates.\n".to_string();
    }

    let mut out = String::new();
    for summary in summaries {
        let status = match (&summary.winner, summary.has_verdict) {
            (Some(winner), _) => format!("consensus: {}", winner),
            (None, true) => "judged".to_string(),
            (None, false) => "unfinished".to_string(),
        };
        let _ = writeln!(
            out,
            "{}  {} ({} rounds, {})",
            summary.started_at.format("%Y-%m-%d %H:%M"),
            summary.title,
            summary.iterations,
            status
        );
        if let Some(file) = summary.file_name() {
            let _ = writeln!(out, "    {}", file);
        }
    }
    out
}

/// Effective configuration in the terms the debate uses.
pub fn config_summary(config: &DebateConfig) -> String {
    let points: Vec<String> = config
        .voting
        .scoring
        .iter()
        .map(|(rank, points)| format!("{}={}", ordinal(rank), points))
        .collect();

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Mode: {}",
        if config.classic_mode { "classic (3 rounds)" } else { "voting" }
    );
    let _ = writeln!(out, "Voting enabled: {}", config.voting_enabled);
    let _ = writeln!(
        out,
        "Consensus threshold: {:.0}%",
        config.voting.consensus_threshold * 100.0
    );
    let _ = writeln!(out, "Scoring: {}", points.join(", "));
    let _ = writeln!(
        out,
        "Voting starts at round {}, at most {} rounds",
        config.voting.voting_start_iteration + 1,
        config.voting.max_iterations
    );
    let _ = writeln!(out, "Agent timeout: {}s", config.agent_timeout_secs);
    if let Some(budget) = config.max_duration_secs {
        let _ = writeln!(out, "Time budget: {}s", budget);
    }
    let _ = writeln!(
        out,
        "Saving: {}",
        if config.save.enabled {
            config.save.directory.display().to_string()
        } else {
            "disabled".to_string()
        }
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use dialectic_core::{Argument, ArgumentKind, Vote, VotingConfig};

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn roster() -> Vec<String> {
        names(&["Optimist", "Skeptic", "Visionary", "Critic"])
    }

    fn converged_round(session: &mut VotingSession, iteration: u32) -> RoundSummary {
        let votes = roster()
            .into_iter()
            .map(|voter| {
                Vote::new(
                    voter,
                    names(&["Visionary", "Optimist", "Skeptic", "Critic"]),
                    "Balanced case",
                    iteration,
                )
            })
            .collect();
        session.record_round(iteration, votes).unwrap()
    }

    #[test]
    fn test_ordinal() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(22), "22nd");
    }

    #[test]
    fn test_vote_table_shows_points_per_rank() {
        let mut session = VotingSession::new(VotingConfig::default(), roster()).unwrap();
        let summary = converged_round(&mut session, 2);

        let table = vote_table(&summary.votes, &VotingConfig::default().scoring);
        let header = table.lines().next().unwrap();
        assert!(header.starts_with("Voter"));
        assert!(header.contains("1st (4)"));
        assert!(header.contains("4th (1)"));
        assert_eq!(table.lines().count(), 2 + 4);
        assert!(!table.contains('*'));
    }

    #[test]
    fn test_vote_table_marks_fallback() {
        let votes = vec![VoterReasoning {
            voter: "Skeptic".to_string(),
            rankings: roster(),
            reasoning: "vote could not be parsed".to_string(),
            fallback: true,
        }];
        let table = vote_table(&votes, &VotingConfig::default().scoring);
        assert!(table.contains("Skeptic*"));
        assert!(table.contains("fallback vote"));
    }

    #[test]
    fn test_totals_and_consensus() {
        let mut session = VotingSession::new(VotingConfig::default(), roster()).unwrap();
        let summary = converged_round(&mut session, 2);

        let totals = score_totals(&summary);
        let first = totals.lines().next().unwrap();
        assert!(first.starts_with("Visionary"));
        assert!(first.contains(" 16 pts (100.0%)"));
        assert!(first.contains(&"█".repeat(BAR_WIDTH)));

        let status = consensus_status(&summary);
        assert!(status.starts_with("✓ Consensus reached: Visionary"));
        assert!(status.contains("16/16"));
    }

    #[test]
    fn test_no_consensus_status() {
        let mut session = VotingSession::new(VotingConfig::default(), roster()).unwrap();
        let votes = roster()
            .into_iter()
            .enumerate()
            .map(|(i, voter)| {
                let mut ranking = roster();
                ranking.rotate_left(i);
                Vote::new(voter, ranking, "", 2)
            })
            .collect();
        let summary = session.record_round(2, votes).unwrap();

        let status = consensus_status(&summary);
        assert_eq!(
            status,
            "✗ No consensus yet. Top scorer needs 2 more points (12 of 16 required)"
        );
    }

    #[test]
    fn test_trends() {
        let rendered = trends(&[ScoreTrend {
            participant: "Visionary".to_string(),
            scores: vec![10, 16],
        }]);
        assert_eq!(rendered, "Visionary: 10 → 16\n");
    }

    #[test]
    fn test_debate_replay() {
        let mut state =
            DebateState::new("Is space worth it?", roster(), DebateConfig::default()).unwrap();
        for iteration in 0..3 {
            let arguments = roster()
                .into_iter()
                .map(|n| Argument::new(n.clone(), format!("{} argues.", n), iteration, ArgumentKind::General))
                .collect();
            let mut record = IterationRecord::new(iteration, arguments);
            if iteration == 2 {
                let mut scratch = VotingSession::new(VotingConfig::default(), roster()).unwrap();
                let summary = converged_round(&mut scratch, 2);
                let votes = summary
                    .votes
                    .iter()
                    .map(|v| Vote::new(v.voter.clone(), v.rankings.clone(), v.reasoning.clone(), 2))
                    .collect();
                record = record.with_votes(votes);
                record.set_winner("Visionary");
            }
            state.push_iteration(record).unwrap();
        }
        state.finalize(Some("Visionary carried the room.".to_string()));

        let text = debate(&state).unwrap();
        assert!(text.starts_with("Is space worth it\n"));
        assert!(text.contains("═══ Round 1 General ═══"));
        assert!(!text.contains("Round 0"));
        assert!(text.contains("Voting results - round 3"));
        assert!(text.contains("✓ Consensus reached: Visionary"));
        assert!(text.contains("Visionary: 16"));
        assert!(text.contains("Visionary carried the room."));
    }

    #[test]
    fn test_config_summary() {
        let text = config_summary(&DebateConfig::default());
        assert!(text.contains("Consensus threshold: 75%"));
        assert!(text.contains("Scoring: 1st=4, 2nd=3, 3rd=2, 4th=1"));
        assert!(text.contains("Voting starts at round 3, at most 10 rounds"));
        assert!(text.contains("Saving: debates"));
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(debate_list(&[]), "No saved debates.\n");
    }
}
