//! Scripted four-personality panel for the `demo` command.
//!
//! No model calls: every argument and vote is canned. The first voting
//! round splits evenly because each personality ranks itself first; in
//! the next round everyone comes round to the Visionary.

use std::sync::Arc;

use dialectic_core::{Debater, ScriptedDebater, ScriptedVote};

pub const DEFAULT_QUESTION: &str = "Should cities ban private cars from their centers?";

struct Persona {
    name: &'static str,
    stance: &'static str,
    biased: [&'static str; 4],
    converged: [&'static str; 4],
}

const PANEL: [Persona; 4] = [
    Persona {
        name: "Optimist",
        stance: "the upside outweighs the disruption",
        biased: ["Optimist", "Visionary", "Skeptic", "Critic"],
        converged: ["Visionary", "Optimist", "Skeptic", "Critic"],
    },
    Persona {
        name: "Skeptic",
        stance: "the evidence is thinner than advocates admit",
        biased: ["Skeptic", "Critic", "Optimist", "Visionary"],
        converged: ["Visionary", "Skeptic", "Critic", "Optimist"],
    },
    Persona {
        name: "Visionary",
        stance: "a phased transition captures the gains and limits the risk",
        biased: ["Visionary", "Optimist", "Critic", "Skeptic"],
        converged: ["Visionary", "Optimist", "Critic", "Skeptic"],
    },
    Persona {
        name: "Critic",
        stance: "the costs land on the people least able to bear them",
        biased: ["Critic", "Skeptic", "Visionary", "Optimist"],
        converged: ["Visionary", "Critic", "Skeptic", "Optimist"],
    },
];

fn ranking(names: &[&str; 4]) -> ScriptedVote {
    ScriptedVote::Ranking(names.iter().map(|s| s.to_string()).collect())
}

/// Builds the demo panel. Votes split at `voting_start` and converge on
/// the Visionary from the round after.
pub fn panel(voting_start: u32, rounds: u32) -> Vec<Arc<dyn Debater>> {
    PANEL
        .iter()
        .map(|persona| {
            let arguments = (0..rounds.max(1)).map(|round| match round {
                0 => format!("My opening position: {}.", persona.stance),
                r if r < voting_start => {
                    format!("Having heard the others, I still hold that {}.", persona.stance)
                }
                _ => format!(
                    "Weighing the strongest points so far, {} remains my view.",
                    persona.stance
                ),
            });

            Arc::new(
                ScriptedDebater::new(persona.name)
                    .with_arguments(arguments)
                    .with_vote(voting_start, ranking(&persona.biased))
                    .with_default_vote(ranking(&persona.converged)),
            ) as Arc<dyn Debater>
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dialectic_core::{DebateConfig, DebateOrchestrator, ScriptedJudge, TerminationReason};
    use dialectic_store::DirectoryStore;
    use tempfile::TempDir;

    use crate::render;

    #[tokio::test]
    async fn test_demo_panel_converges_on_visionary() {
        let config = DebateConfig::default().with_saving(false);
        let panel = panel(
            config.voting.voting_start_iteration,
            config.round_limit(),
        );
        let mut orchestrator = DebateOrchestrator::new(config, panel)
            .unwrap()
            .with_judge(Arc::new(ScriptedJudge::new()));

        let outcome = orchestrator.run(DEFAULT_QUESTION).await.unwrap();

        assert_eq!(
            outcome.reason,
            TerminationReason::Consensus {
                winner: "Visionary".to_string()
            }
        );
        assert_eq!(outcome.state.rounds_completed(), 4);
        let visionary = outcome
            .trends
            .iter()
            .find(|t| t.participant == "Visionary")
            .unwrap();
        assert_eq!(visionary.scores, vec![10, 16]);
    }

    #[tokio::test]
    async fn test_saved_demo_lists_and_replays() {
        let dir = TempDir::new().unwrap();
        let mut config = DebateConfig::default();
        config.save.directory = dir.path().to_path_buf();

        let store = Arc::new(DirectoryStore::new(dir.path()));
        let panel = panel(config.voting.voting_start_iteration, config.round_limit());
        let mut orchestrator = DebateOrchestrator::new(config, panel)
            .unwrap()
            .with_judge(Arc::new(ScriptedJudge::new()))
            .with_persister(store.clone());
        let outcome = orchestrator.run(DEFAULT_QUESTION).await.unwrap();

        let saved = store.path_for(&outcome.state);
        assert!(saved.is_file());

        let summaries = store.list(None).unwrap();
        assert_eq!(summaries.len(), 1);
        let listing = render::debate_list(&summaries);
        assert!(listing.contains("consensus: Visionary"));
        assert!(listing.contains("(4 rounds"));

        let file = saved.file_name().unwrap();
        let loaded = store.load(file).unwrap();
        assert_eq!(loaded, outcome.state);

        let replay = render::debate(&loaded).unwrap();
        assert!(replay.contains("═══ Round 1 Opening ═══"));
        assert!(replay.contains("Voting results - round 4"));
        assert!(replay.contains("Visionary: 10 → 16"));
    }
}
