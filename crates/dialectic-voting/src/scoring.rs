//! Rank-to-points scoring.
//!
//! Pure function over one round of votes. Ties are not broken here;
//! see [`crate::consensus`] for winner selection.

use std::collections::BTreeMap;

use crate::config::ScoringTable;
use crate::vote::Vote;

/// Points per participant for one round.
///
/// Participants that received no points are absent, not zero.
pub type ScoreMap = BTreeMap<String, u32>;

/// Converts a round of rankings into point totals.
///
/// For each vote, the participant at 1-based position `r` earns
/// `table.points_for(r)`. Positions past the end of the table earn
/// nothing and do not create an entry.
///
/// # Example
///
/// ```rust
/// use dialectic_voting::{calculate_scores, ScoringTable, Vote};
///
/// let votes = vec![
///     Vote::new("A", vec!["B".into(), "A".into()], "", 0),
///     Vote::new("B", vec!["B".into(), "A".into()], "", 0),
/// ];
/// let table = ScoringTable::from_points(vec![2, 1]).unwrap();
/// let scores = calculate_scores(&votes, &table);
/// assert_eq!(scores["B"], 4);
/// assert_eq!(scores["A"], 2);
/// ```
pub fn calculate_scores(votes: &[Vote], table: &ScoringTable) -> ScoreMap {
    let mut scores = ScoreMap::new();

    for vote in votes {
        for (index, participant) in vote.rankings.iter().enumerate() {
            let points = table.points_for(index + 1);
            if points > 0 {
                let total = scores.entry(participant.clone()).or_insert(0);
                *total = total.saturating_add(points);
            }
        }
    }

    scores
}

/// Sorts `participants` by score, highest first.
///
/// Participants missing from `scores` count as zero. The sort is stable,
/// so equal scores keep the roster order.
pub fn rank_by_score(scores: &ScoreMap, participants: &[String]) -> Vec<(String, u32)> {
    let mut ranking: Vec<(String, u32)> = participants
        .iter()
        .map(|p| (p.clone(), scores.get(p).copied().unwrap_or(0)))
        .collect();

    // Entries outside the roster still show up, after it, in name order.
    ranking.extend(
        scores
            .iter()
            .filter(|(name, _)| !participants.contains(name))
            .map(|(name, score)| (name.clone(), *score)),
    );

    ranking.sort_by(|a, b| b.1.cmp(&a.1));
    ranking
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn vote(voter: &str, rankings: &[&str]) -> Vote {
        Vote::new(voter, names(rankings), "", 0)
    }

    #[test]
    fn test_empty_votes_give_empty_scores() {
        let scores = calculate_scores(&[], &ScoringTable::default());
        assert!(scores.is_empty());
    }

    #[test]
    fn test_unanimous_first_place() {
        let roster = ["Fair", "Bold", "Calm", "Wry"];
        let votes: Vec<Vote> = roster
            .iter()
            .map(|voter| {
                let mut ranking = vec!["Fair"];
                ranking.extend(roster.iter().filter(|n| **n != "Fair"));
                vote(voter, &ranking)
            })
            .collect();

        let scores = calculate_scores(&votes, &ScoringTable::default());
        assert_eq!(scores["Fair"], 16);
        assert_eq!(scores["Bold"], 12);
        assert_eq!(scores["Calm"], 8);
        assert_eq!(scores["Wry"], 4);
    }

    #[test]
    fn test_ranks_beyond_table_earn_nothing() {
        let table = ScoringTable::from_points(vec![3, 1]).unwrap();
        let votes = vec![vote("A", &["A", "B", "C"])];
        let scores = calculate_scores(&votes, &table);
        assert_eq!(scores.get("A"), Some(&3));
        assert_eq!(scores.get("B"), Some(&1));
        assert_eq!(scores.get("C"), None);
    }

    #[test]
    fn test_omitted_participant_is_absent() {
        let votes = vec![vote("A", &["A"]), vote("B", &["B", "A"])];
        let scores = calculate_scores(&votes, &ScoringTable::default());
        assert_eq!(scores["A"], 7);
        assert_eq!(scores["B"], 4);
        assert!(!scores.contains_key("C"));
    }

    #[test]
    fn test_score_never_exceeds_top_points_times_voters() {
        let table = ScoringTable::from_points(vec![5, 3, 1]).unwrap();
        let orderings: [&[&str]; 4] = [
            &["A", "B", "C"],
            &["B", "A", "C"],
            &["C", "B", "A"],
            &["A", "C"],
        ];
        let votes: Vec<Vote> = orderings
            .iter()
            .enumerate()
            .map(|(i, o)| vote(&format!("v{}", i), o))
            .collect();

        let scores = calculate_scores(&votes, &table);
        let bound = table.top_points() * votes.len() as u32;
        assert!(scores.values().all(|&s| s <= bound));
    }

    #[test]
    fn test_totals_saturate_instead_of_overflowing() {
        let table = ScoringTable::from_points(vec![u32::MAX, 1]).unwrap();
        let votes = vec![vote("A", &["A", "B"]), vote("B", &["A", "B"])];
        let scores = calculate_scores(&votes, &table);
        assert_eq!(scores["A"], u32::MAX);
        assert_eq!(scores["B"], 2);
    }

    #[test]
    fn test_rank_by_score_stable_on_ties() {
        let roster = names(&["A", "B", "C"]);
        let scores = ScoreMap::from([("C".to_string(), 5), ("B".to_string(), 5)]);
        let ranking = rank_by_score(&scores, &roster);
        assert_eq!(
            ranking,
            vec![
                ("B".to_string(), 5),
                ("C".to_string(), 5),
                ("A".to_string(), 0)
            ]
        );
    }
}
